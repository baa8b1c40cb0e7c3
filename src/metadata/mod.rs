//! Metadata module.
//!
//! Enumerates schemas and tables and aggregates per-table metadata with
//! inferred relationship kinds.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   SessionMetadataProvider                       │
//! │   open session ─► enumerate / aggregate ─► release session      │
//! │                                                                 │
//! │  ┌──────────────────────┐   ┌────────────────────────────────┐  │
//! │  │ enumerate            │   │ aggregator                     │  │
//! │  │  - list_schemas()    │   │  columns ─► normalize_type()   │  │
//! │  │  - list_tables()     │   │  primary keys ┐                │  │
//! │  │                      │   │  unique       ├─► classify()   │  │
//! │  │                      │   │  foreign keys ┘   join tables  │  │
//! │  └──────────────────────┘   └────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              CatalogSession (information_schema)                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use schemagram::metadata::{MetadataProviderExt, SessionMetadataProvider};
//! use schemagram::session::PgSessionOpener;
//!
//! let provider = SessionMetadataProvider::new(Arc::new(PgSessionOpener::new()), url);
//! let metadata = provider.fetch_metadata_for("public", "users, user_roles").await?;
//! ```

pub mod aggregator;
pub mod enumerate;
mod provider;
mod table_names;
mod type_map;
mod types;

pub use provider::{MetadataProvider, MetadataProviderExt, SessionMetadataProvider};
pub use table_names::parse_table_names;
pub use type_map::normalize_type;
pub use types::*;
