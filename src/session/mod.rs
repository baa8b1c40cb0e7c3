//! Catalog sessions.
//!
//! A session is one live connection to a database, opened per logical
//! operation and closed when the operation completes or fails. The
//! introspection core only depends on the two capabilities below: execute a
//! [`CatalogStatement`] and close.
//!
//! ```text
//! SessionOpener::open(url) ──► Box<dyn CatalogSession>
//!                                 │ execute(stmt) → rows   (0..n times)
//!                                 ▼
//!                              release()  (close, errors logged only)
//! ```
//!
//! [`SessionGuard`] ties the two together for callers whose future may be
//! dropped mid-operation.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::catalog::CatalogStatement;
use crate::error::{SessionError, SessionResult};

pub mod fixture;
pub mod postgres;

pub use fixture::{FixtureCatalog, FixtureOpener, FixtureTable, SessionStats};
pub use postgres::PgSessionOpener;

/// One row returned by a catalog statement: nullable text values in
/// select-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow(Vec<Option<String>>);

impl CatalogRow {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self(values)
    }

    /// Build a row of non-null values.
    pub fn from_texts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(|v| Some(v.into())).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The non-null text value at `idx`.
    pub fn text(&self, idx: usize) -> SessionResult<&str> {
        match self.0.get(idx) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(SessionError::Decode(format!("column {} is null", idx))),
            None => Err(SessionError::Decode(format!(
                "column {} out of range for row of {}",
                idx,
                self.0.len()
            ))),
        }
    }
}

/// An open connection able to run catalog statements.
#[async_trait]
pub trait CatalogSession: Send {
    /// Execute a statement and return all rows.
    async fn execute(&mut self, statement: &CatalogStatement) -> SessionResult<Vec<CatalogRow>>;

    /// Close the session.
    async fn close(self: Box<Self>) -> SessionResult<()>;
}

/// Opens catalog sessions from a connection string.
#[async_trait]
pub trait SessionOpener: Send + Sync {
    async fn open(&self, connection_string: &str) -> SessionResult<Box<dyn CatalogSession>>;
}

/// Close a session, logging rather than propagating any failure.
pub async fn release(session: Box<dyn CatalogSession>) {
    match session.close().await {
        Ok(()) => debug!("catalog session closed"),
        Err(e) => warn!(error = %e, "failed to close catalog session"),
    }
}

/// Owns an open session until [`SessionGuard::release`] is awaited.
///
/// A guard dropped while still armed, e.g. when a client disconnects and the
/// request future is cancelled, releases its session on a spawned task.
/// Outside a Tokio runtime the session is simply dropped, which for sqlx
/// closes the socket.
pub struct SessionGuard {
    session: Box<dyn CatalogSession>,
    armed: bool,
}

impl SessionGuard {
    pub fn new(session: Box<dyn CatalogSession>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    /// The guarded session.
    pub fn session(&mut self) -> &mut dyn CatalogSession {
        self.session.as_mut()
    }

    /// Release the session now.
    pub async fn release(mut self) {
        self.armed = false;
        release(self.take()).await;
    }

    fn take(&mut self) -> Box<dyn CatalogSession> {
        std::mem::replace(&mut self.session, Box::new(Released))
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let session = self.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("releasing abandoned catalog session");
                handle.spawn(release(session));
            }
            Err(_) => warn!("catalog session dropped outside a runtime"),
        }
    }
}

/// Placeholder left in a guard after its session was taken.
struct Released;

#[async_trait]
impl CatalogSession for Released {
    async fn execute(&mut self, _statement: &CatalogStatement) -> SessionResult<Vec<CatalogRow>> {
        Err(SessionError::rejected("catalog session already released"))
    }

    async fn close(self: Box<Self>) -> SessionResult<()> {
        Ok(())
    }
}
