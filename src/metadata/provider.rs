//! MetadataProvider trait and its session-backed implementation.
//!
//! Each call opens exactly one catalog session, runs one enumerator or the
//! aggregator against it, and releases the session before returning. The
//! session is released on every path except a failed open, where there is
//! nothing to release. If the call itself is cancelled, the
//! [`SessionGuard`] releases the session in the background.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::aggregator;
use super::enumerate;
use super::table_names::parse_table_names;
use super::types::TableMetadata;
use crate::error::{IntrospectError, IntrospectResult};
use crate::session::{SessionGuard, SessionOpener};

/// Read-only introspection of one database.
///
/// # Example
///
/// ```ignore
/// use schemagram::metadata::{MetadataProvider, SessionMetadataProvider};
/// use schemagram::session::PgSessionOpener;
///
/// let provider = SessionMetadataProvider::new(
///     Arc::new(PgSessionOpener::new()),
///     "postgres://localhost/app",
/// );
///
/// let schemas = provider.list_schemas().await?;
/// let tables = provider.list_tables("public").await?;
/// let metadata = provider.fetch_metadata("public", &tables).await?;
/// ```
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Open and release a session, returning nothing on success.
    async fn test_connection(&self) -> IntrospectResult<()>;

    /// List all non-system schemas.
    async fn list_schemas(&self) -> IntrospectResult<Vec<String>>;

    /// List all tables in `schema`.
    async fn list_tables(&self, schema: &str) -> IntrospectResult<Vec<String>>;

    /// Describe `tables`, in the order given.
    async fn fetch_metadata(
        &self,
        schema: &str,
        tables: &[String],
    ) -> IntrospectResult<Vec<TableMetadata>>;
}

/// Extension trait for MetadataProvider with additional convenience methods.
#[async_trait]
pub trait MetadataProviderExt: MetadataProvider {
    /// Describe tables given as a comma-separated (or single) name list.
    async fn fetch_metadata_for(
        &self,
        schema: &str,
        table_names: &str,
    ) -> IntrospectResult<Vec<TableMetadata>> {
        let tables = parse_table_names(table_names);
        self.fetch_metadata(schema, &tables).await
    }
}

impl<T: MetadataProvider + ?Sized> MetadataProviderExt for T {}

/// MetadataProvider that opens a fresh session per call.
///
/// No session, pool or result survives between calls, so concurrent calls
/// are fully isolated.
pub struct SessionMetadataProvider {
    opener: Arc<dyn SessionOpener>,
    connection_string: String,
}

impl SessionMetadataProvider {
    /// Create a provider for `connection_string`.
    pub fn new(opener: Arc<dyn SessionOpener>, connection_string: impl Into<String>) -> Self {
        Self {
            opener,
            connection_string: connection_string.into(),
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    async fn open(&self) -> IntrospectResult<SessionGuard> {
        self.opener
            .open(&self.connection_string)
            .await
            .map(SessionGuard::new)
            .map_err(|e| {
                error!(error = %e, "failed to connect to the database");
                IntrospectError::connection(e)
            })
    }
}

fn log_failure<T>(operation: &str, result: &IntrospectResult<T>) {
    if let Err(e) = result {
        error!(operation, error = %e, "catalog operation failed");
    }
}

#[async_trait]
impl MetadataProvider for SessionMetadataProvider {
    async fn test_connection(&self) -> IntrospectResult<()> {
        self.open().await?.release().await;

        info!("database connection successful");
        Ok(())
    }

    async fn list_schemas(&self) -> IntrospectResult<Vec<String>> {
        let mut session = self.open().await?;
        let result = enumerate::list_schemas(session.session()).await;
        session.release().await;

        log_failure("list_schemas", &result);
        let schemas = result?;
        info!(count = schemas.len(), "schemas fetched");
        Ok(schemas)
    }

    async fn list_tables(&self, schema: &str) -> IntrospectResult<Vec<String>> {
        let mut session = self.open().await?;
        let result = enumerate::list_tables(session.session(), schema).await;
        session.release().await;

        log_failure("list_tables", &result);
        let tables = result?;
        info!(schema, count = tables.len(), "tables fetched");
        Ok(tables)
    }

    async fn fetch_metadata(
        &self,
        schema: &str,
        tables: &[String],
    ) -> IntrospectResult<Vec<TableMetadata>> {
        let mut session = self.open().await?;
        let result = aggregator::aggregate(session.session(), schema, tables).await;
        session.release().await;

        log_failure("fetch_metadata", &result);
        let metadata = result?;
        info!(schema, tables = metadata.len(), "metadata fetched");
        Ok(metadata)
    }
}
