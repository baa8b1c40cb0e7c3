//! In-memory catalog sessions.
//!
//! A [`FixtureCatalog`] describes schemas, tables, columns and constraints as
//! plain data and answers every [`StatementKind`] with the same row shapes the
//! PostgreSQL templates produce. It backs the CLI's `--fixture` mode and the
//! test suite, and can inject failures at open, at a given statement, or at
//! close, or stall a statement so callers can be cancelled mid-read.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CatalogRow, CatalogSession, SessionOpener};
use crate::catalog::{CatalogStatement, ConstraintKind, StatementKind};
use crate::error::{SessionError, SessionResult};

/// Error loading a fixture file.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse fixture file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A whole database catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureCatalog {
    #[serde(default)]
    pub schemas: Vec<FixtureSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSchema {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<FixtureTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<FixtureColumn>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub unique: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<FixtureForeignKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureColumn {
    pub name: String,
    /// Native catalog type name, e.g. `character varying`.
    pub data_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

impl FixtureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Add a schema with the given tables.
    pub fn with_schema(mut self, name: impl Into<String>, tables: Vec<FixtureTable>) -> Self {
        self.schemas.push(FixtureSchema {
            name: name.into(),
            tables,
        });
        self
    }

    fn schema(&self, name: &str) -> Option<&FixtureSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Requested tables of `schema`, ordered by name like the templates.
    fn selected_tables(&self, schema: &str, names: &[String]) -> Vec<&FixtureTable> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut tables: Vec<&FixtureTable> = self
            .schema(schema)
            .map(|s| s.tables.iter().filter(|t| wanted.contains(t.name.as_str())).collect())
            .unwrap_or_default();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }

    /// Answer a statement the way the PostgreSQL catalog would.
    pub fn answer(&self, statement: &CatalogStatement) -> SessionResult<Vec<CatalogRow>> {
        let rows = match statement.kind() {
            StatementKind::Schemas => {
                let mut names: Vec<&str> = self.schemas.iter().map(|s| s.name.as_str()).collect();
                names.sort_unstable();
                names.into_iter().map(|n| CatalogRow::from_texts([n])).collect()
            }
            StatementKind::Tables => {
                let schema = required_text(statement, 0)?;
                self.schema(schema)
                    .map(|s| {
                        s.tables
                            .iter()
                            .map(|t| CatalogRow::from_texts([t.name.as_str()]))
                            .collect()
                    })
                    .unwrap_or_default()
            }
            StatementKind::Columns => {
                let schema = required_text(statement, 0)?;
                let names = required_list(statement, 1)?;
                self.selected_tables(schema, names)
                    .into_iter()
                    .flat_map(|t| {
                        t.columns.iter().map(move |c| {
                            CatalogRow::from_texts([
                                t.name.as_str(),
                                c.name.as_str(),
                                c.data_type.as_str(),
                            ])
                        })
                    })
                    .collect()
            }
            StatementKind::ConstraintColumns(kind) => {
                let schema = required_text(statement, 1)?;
                let names = required_list(statement, 2)?;
                self.selected_tables(schema, names)
                    .into_iter()
                    .flat_map(|t| {
                        let columns = match kind {
                            ConstraintKind::PrimaryKey => &t.primary_key,
                            ConstraintKind::Unique => &t.unique,
                        };
                        columns
                            .iter()
                            .map(move |c| CatalogRow::from_texts([t.name.as_str(), c.as_str()]))
                    })
                    .collect()
            }
            StatementKind::ForeignKeys => {
                let schema = required_text(statement, 0)?;
                let names = required_list(statement, 1)?;
                self.selected_tables(schema, names)
                    .into_iter()
                    .flat_map(|t| {
                        t.foreign_keys.iter().map(move |fk| {
                            CatalogRow::from_texts([
                                t.name.as_str(),
                                fk.column.as_str(),
                                fk.references_table.as_str(),
                                fk.references_column.as_str(),
                            ])
                        })
                    })
                    .collect()
            }
        };

        Ok(rows)
    }
}

fn required_text(statement: &CatalogStatement, idx: usize) -> SessionResult<&str> {
    statement
        .text_param(idx)
        .ok_or_else(|| SessionError::rejected(format!("expected text parameter ${}", idx + 1)))
}

fn required_list(statement: &CatalogStatement, idx: usize) -> SessionResult<&[String]> {
    statement
        .list_param(idx)
        .ok_or_else(|| SessionError::rejected(format!("expected list parameter ${}", idx + 1)))
}

impl FixtureTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(FixtureColumn {
            name: name.into(),
            data_type: data_type.into(),
        });
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn unique(mut self, columns: &[&str]) -> Self {
        self.unique = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn foreign_key(
        mut self,
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(FixtureForeignKey {
            column: column.into(),
            references_table: references_table.into(),
            references_column: references_column.into(),
        });
        self
    }
}

/// Counters shared by an opener and every session it opened.
#[derive(Debug, Default)]
pub struct SessionStats {
    opens: AtomicUsize,
    closes: AtomicUsize,
    executed: Mutex<Vec<StatementKind>>,
}

impl SessionStats {
    /// Sessions successfully opened.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Close attempts, successful or not.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Statement kinds executed, in order.
    pub fn executed(&self) -> Vec<StatementKind> {
        self.executed
            .lock()
            .map(|kinds| kinds.clone())
            .unwrap_or_default()
    }

    fn record(&self, kind: StatementKind) {
        if let Ok(mut kinds) = self.executed.lock() {
            kinds.push(kind);
        }
    }
}

/// Opens sessions over a shared [`FixtureCatalog`].
#[derive(Debug, Clone)]
pub struct FixtureOpener {
    catalog: Arc<FixtureCatalog>,
    fail_open: Option<String>,
    fail_on: Option<(StatementKind, String)>,
    fail_close: Option<String>,
    stall_on: Option<StatementKind>,
    stats: Arc<SessionStats>,
}

impl FixtureOpener {
    pub fn new(catalog: FixtureCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            fail_open: None,
            fail_on: None,
            fail_close: None,
            stall_on: None,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// Refuse every open with `message`.
    pub fn fail_open(mut self, message: impl Into<String>) -> Self {
        self.fail_open = Some(message.into());
        self
    }

    /// Fail any statement of `kind` with `message`.
    pub fn fail_on(mut self, kind: StatementKind, message: impl Into<String>) -> Self {
        self.fail_on = Some((kind, message.into()));
        self
    }

    /// Fail every close with `message`.
    pub fn fail_close(mut self, message: impl Into<String>) -> Self {
        self.fail_close = Some(message.into());
        self
    }

    /// Never complete any statement of `kind`.
    pub fn stall_on(mut self, kind: StatementKind) -> Self {
        self.stall_on = Some(kind);
        self
    }

    pub fn stats(&self) -> Arc<SessionStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl SessionOpener for FixtureOpener {
    async fn open(&self, _connection_string: &str) -> SessionResult<Box<dyn CatalogSession>> {
        if let Some(message) = &self.fail_open {
            return Err(SessionError::rejected(message.clone()));
        }
        self.stats.opens.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FixtureSession {
            opener: self.clone(),
        }))
    }
}

struct FixtureSession {
    opener: FixtureOpener,
}

#[async_trait]
impl CatalogSession for FixtureSession {
    async fn execute(&mut self, statement: &CatalogStatement) -> SessionResult<Vec<CatalogRow>> {
        self.opener.stats.record(statement.kind());

        if self.opener.stall_on == Some(statement.kind()) {
            std::future::pending::<()>().await;
        }

        if let Some((kind, message)) = &self.opener.fail_on {
            if *kind == statement.kind() {
                return Err(SessionError::rejected(message.clone()));
            }
        }

        self.opener.catalog.answer(statement)
    }

    async fn close(self: Box<Self>) -> SessionResult<()> {
        self.opener.stats.closes.fetch_add(1, Ordering::SeqCst);
        match &self.opener.fail_close {
            Some(message) => Err(SessionError::rejected(message.clone())),
            None => Ok(()),
        }
    }
}
