//! PostgreSQL sessions backed by a single sqlx connection.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Connection, Row};

use super::{CatalogRow, CatalogSession, SessionOpener};
use crate::catalog::{CatalogStatement, QueryParam};
use crate::error::{SessionError, SessionResult};

/// Default connect timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Opens one unpooled `PgConnection` per session.
#[derive(Debug, Clone)]
pub struct PgSessionOpener {
    connect_timeout: Duration,
}

impl PgSessionOpener {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    pub fn with_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for PgSessionOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionOpener for PgSessionOpener {
    async fn open(&self, connection_string: &str) -> SessionResult<Box<dyn CatalogSession>> {
        let conn = tokio::time::timeout(self.connect_timeout, PgConnection::connect(connection_string))
            .await
            .map_err(|_| SessionError::Timeout(self.connect_timeout))??;

        Ok(Box::new(PgSession { conn }))
    }
}

struct PgSession {
    conn: PgConnection,
}

#[async_trait]
impl CatalogSession for PgSession {
    async fn execute(&mut self, statement: &CatalogStatement) -> SessionResult<Vec<CatalogRow>> {
        let mut query = sqlx::query(statement.sql());
        for param in statement.params() {
            query = match param {
                QueryParam::Text(value) => query.bind(value.clone()),
                QueryParam::TextList(values) => query.bind(values.clone()),
            };
        }

        let rows = query.fetch_all(&mut self.conn).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn close(self: Box<Self>) -> SessionResult<()> {
        self.conn.close().await?;
        Ok(())
    }
}

fn decode_row(row: &PgRow) -> SessionResult<CatalogRow> {
    let values = (0..row.len())
        .map(|idx| {
            row.try_get::<Option<String>, _>(idx)
                .map_err(|e| SessionError::Decode(e.to_string()))
        })
        .collect::<SessionResult<Vec<_>>>()?;

    Ok(CatalogRow::new(values))
}
