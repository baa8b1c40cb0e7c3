//! Schema and table enumeration.

use tracing::debug;

use crate::catalog;
use crate::error::{IntrospectError, IntrospectResult};
use crate::session::CatalogSession;

/// List non-system schema names. An empty catalog yields an empty list.
pub async fn list_schemas(session: &mut dyn CatalogSession) -> IntrospectResult<Vec<String>> {
    let rows = session
        .execute(&catalog::schemas())
        .await
        .map_err(IntrospectError::query)?;

    let schemas = rows
        .iter()
        .map(|row| row.text(0).map(str::to_string))
        .collect::<Result<Vec<_>, _>>()
        .map_err(IntrospectError::query)?;

    debug!(count = schemas.len(), "schemas read");
    Ok(schemas)
}

/// List table names in `schema`, in catalog order.
pub async fn list_tables(
    session: &mut dyn CatalogSession,
    schema: &str,
) -> IntrospectResult<Vec<String>> {
    let rows = session
        .execute(&catalog::tables(schema))
        .await
        .map_err(IntrospectError::query)?;

    let tables = rows
        .iter()
        .map(|row| row.text(0).map(str::to_string))
        .collect::<Result<Vec<_>, _>>()
        .map_err(IntrospectError::query)?;

    debug!(schema, count = tables.len(), "tables read");
    Ok(tables)
}
