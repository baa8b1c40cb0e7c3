//! Introspection API handlers.
//!
//! Every handler builds a [`SessionMetadataProvider`] for the request's
//! connection URL, so no session outlives its request.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::response::{ApiError, ApiResult, Envelope, NoPayload};
use super::server::AppState;
use crate::metadata::{MetadataList, MetadataProvider, MetadataProviderExt, SchemaList, TableList};

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /api/v1/db/test-connection`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionRequest {
    pub db_url: String,
}

/// Query of `GET /api/v1/db/get-schemas`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemasQuery {
    pub db_url: String,
}

/// Query of `GET /api/v1/db/get-tables`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesQuery {
    pub db_url: String,
    pub table_schema: String,
}

/// Query of `GET /api/v1/db/get-diagram-data`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramQuery {
    pub db_url: String,
    pub table_schema: String,
    /// Comma-separated or single table name.
    pub table_names: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/health - Liveness check.
pub async fn health() -> Envelope<NoPayload> {
    Envelope::ok("API is running", NoPayload::default())
}

/// POST /api/v1/db/test-connection - Open and release a session.
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TestConnectionRequest>, JsonRejection>,
) -> ApiResult<Envelope<NoPayload>> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    state.provider(&req.db_url).test_connection().await?;
    Ok(Envelope::ok("Database connection successful", NoPayload::default()))
}

/// GET /api/v1/db/get-schemas - List non-system schemas.
pub async fn get_schemas(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SchemasQuery>, QueryRejection>,
) -> ApiResult<Envelope<SchemaList>> {
    let Query(q) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let schemas = state.provider(&q.db_url).list_schemas().await?;
    Ok(Envelope::ok("Schemas fetched successfully", SchemaList { schemas }))
}

/// GET /api/v1/db/get-tables - List tables of one schema.
pub async fn get_tables(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TablesQuery>, QueryRejection>,
) -> ApiResult<Envelope<TableList>> {
    let Query(q) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let tables = state.provider(&q.db_url).list_tables(&q.table_schema).await?;
    Ok(Envelope::ok("Tables fetched successfully", TableList { tables }))
}

/// GET /api/v1/db/get-diagram-data - Aggregate metadata for a table list.
pub async fn get_diagram_data(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DiagramQuery>, QueryRejection>,
) -> ApiResult<Envelope<MetadataList>> {
    let Query(q) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let metadata = state
        .provider(&q.db_url)
        .fetch_metadata_for(&q.table_schema, &q.table_names)
        .await?;
    Ok(Envelope::ok("Metadata fetched successfully", MetadataList { metadata }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
