//! # schemagram
//!
//! Read-only introspection of a live relational database for rendering
//! entity-relationship diagrams.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Transport (axum routes / CLI subcommands)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │  MetadataProvider: list_schemas, list_tables,            │
//! │  fetch_metadata (aggregation + relationship inference)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Parameterized information_schema statements         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [session]
//! ┌─────────────────────────────────────────────────────────┐
//! │   CatalogSession: one connection per operation           │
//! │   (PostgreSQL via sqlx, or an in-memory fixture)         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached or pooled: every operation opens its own session and
//! releases it before returning.

pub mod catalog;
pub mod config;
pub mod error;
pub mod metadata;
pub mod session;

#[cfg(feature = "server")]
pub mod web;

pub use error::{ErrorKind, IntrospectError, IntrospectResult, SessionError};
pub use metadata::{
    parse_table_names, MetadataProvider, MetadataProviderExt, SessionMetadataProvider,
    TableMetadata,
};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{CatalogStatement, ConstraintKind, StatementKind};
    pub use crate::error::{ErrorKind, IntrospectError, IntrospectResult};
    pub use crate::metadata::{
        normalize_type, parse_table_names, ColumnDescriptor, ForeignKey, MetadataProvider,
        MetadataProviderExt, RelationshipType, SessionMetadataProvider, TableMetadata,
        TableRelationship,
    };
    pub use crate::session::{CatalogSession, PgSessionOpener, SessionOpener};
}
