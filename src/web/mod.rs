//! HTTP transport for schemagram.
//!
//! Translates requests into [`MetadataProvider`](crate::metadata::MetadataProvider)
//! calls and results into JSON envelopes. Status codes for core failures come
//! from [`response::status_for`].

pub mod response;
pub mod routes;
pub mod server;

pub use response::{status_for, ApiError, Envelope};
pub use server::{router, serve, AppState};
