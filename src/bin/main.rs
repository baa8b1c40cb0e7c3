//! schemagram CLI - Introspect a database for ER diagrams
//!
//! Usage:
//!   schemagram serve [--host <host>] [--port <port>]
//!   schemagram test-connection [--url <url>]
//!   schemagram schemas [--url <url>]
//!   schemagram tables [--schema <schema>] [--url <url>]
//!   schemagram metadata <tables> [--schema <schema>] [--url <url>]
//!
//! Examples:
//!   schemagram schemas --url postgres://postgres@localhost/app
//!   schemagram metadata "users, user_roles, roles" --connection dev
//!   schemagram metadata users --fixture catalog.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use schemagram::config::{ConnectionConfig, Settings};
use schemagram::metadata::{
    MetadataList, MetadataProvider, MetadataProviderExt, SchemaList, SessionMetadataProvider,
    TableList,
};
use schemagram::session::{FixtureCatalog, FixtureOpener, PgSessionOpener};

/// Schema used when neither `--schema` nor the connection names one.
const FALLBACK_SCHEMA: &str = "public";

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "schemagram")]
#[command(about = "schemagram - Database introspection for entity-relationship diagrams")]
#[command(version)]
struct Cli {
    /// Path to a schemagram.toml settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Address to bind (overrides settings)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,

        /// Answer every request from a JSON fixture catalog
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Check that a session can be opened
    TestConnection {
        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// List non-system schemas
    Schemas {
        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// List tables in a schema
    Tables {
        /// Schema name
        #[arg(short, long)]
        schema: Option<String>,

        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// Describe tables, their keys and inferred relationships
    Metadata {
        /// Comma-separated table names
        tables: String,

        /// Schema name
        #[arg(short, long)]
        schema: Option<String>,

        #[command(flatten)]
        conn: ConnectionArgs,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// Database URL
    #[arg(long)]
    url: Option<String>,

    /// Named connection from the settings file
    #[arg(short, long)]
    connection: Option<String>,

    /// Answer from a JSON fixture catalog instead of a live database
    #[arg(long, conflicts_with_all = ["url", "connection"])]
    fixture: Option<PathBuf>,
}

/// A provider plus the schema to use when none is given.
struct Target {
    provider: SessionMetadataProvider,
    default_schema: Option<String>,
}

impl Target {
    fn schema(&self, explicit: Option<String>) -> String {
        explicit
            .or_else(|| self.default_schema.clone())
            .unwrap_or_else(|| FALLBACK_SCHEMA.to_string())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&settings.logging.level);

    match run(cli.command, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, schemagram::config::SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, settings: Settings) -> CliResult {
    match command {
        #[cfg(feature = "server")]
        Commands::Serve {
            host,
            port,
            fixture,
        } => cmd_serve(settings, host, port, fixture).await,
        Commands::TestConnection { conn } => {
            let target = target(&conn, &settings)?;
            target.provider.test_connection().await?;
            print_json(&serde_json::json!({}))
        }
        Commands::Schemas { conn } => {
            let target = target(&conn, &settings)?;
            let schemas = target.provider.list_schemas().await?;
            print_json(&SchemaList { schemas })
        }
        Commands::Tables { schema, conn } => {
            let target = target(&conn, &settings)?;
            let schema = target.schema(schema);
            let tables = target.provider.list_tables(&schema).await?;
            print_json(&TableList { tables })
        }
        Commands::Metadata {
            tables,
            schema,
            conn,
        } => {
            let target = target(&conn, &settings)?;
            let schema = target.schema(schema);
            let metadata = target.provider.fetch_metadata_for(&schema, &tables).await?;
            print_json(&MetadataList { metadata })
        }
    }
}

#[cfg(feature = "server")]
async fn cmd_serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
    fixture: Option<PathBuf>,
) -> CliResult {
    use schemagram::session::SessionOpener;
    use schemagram::web::{serve, AppState};

    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    let opener: Arc<dyn SessionOpener> = match fixture {
        Some(path) => Arc::new(FixtureOpener::new(FixtureCatalog::from_file(path)?)),
        None => Arc::new(PgSessionOpener::with_timeout(settings.session.connect_timeout())),
    };

    println!("schemagram API");
    println!("   URL: http://{}", settings.server.bind_addr());
    println!();
    println!("   Press Ctrl+C to stop");

    serve(Arc::new(AppState::new(opener, settings))).await
}

fn target(conn: &ConnectionArgs, settings: &Settings) -> Result<Target, Box<dyn std::error::Error>> {
    if let Some(path) = &conn.fixture {
        let opener = FixtureOpener::new(FixtureCatalog::from_file(path)?);
        return Ok(Target {
            provider: SessionMetadataProvider::new(
                Arc::new(opener),
                format!("fixture:{}", path.display()),
            ),
            default_schema: None,
        });
    }

    let config = ConnectionConfig::resolve(conn.url.as_deref(), conn.connection.as_deref(), settings)?;
    debug!(url = %config.redacted_url(), "resolved connection");

    let opener = PgSessionOpener::with_timeout(settings.session.connect_timeout());
    Ok(Target {
        provider: SessionMetadataProvider::new(Arc::new(opener), config.url),
        default_schema: config.default_schema,
    })
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
