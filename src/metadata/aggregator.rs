//! Metadata aggregation and relationship inference.
//!
//! Four independent catalog reads (columns, primary keys, unique
//! constraints, foreign keys) are merged into one [`TableMetadata`] per
//! requested table:
//!
//! - an edge is `OneToOne` when its source column is in the source table's
//!   primary key or a unique constraint, otherwise `OneToMany`. The target
//!   side is never consulted.
//! - a table with exactly two primary key columns and exactly two outgoing
//!   foreign keys is additionally flagged `ManyToMany` (a join table).
//!
//! Output order always follows the requested table list, never catalog row
//! order. Any failed read aborts the whole aggregation.

use std::collections::HashMap;

use tracing::debug;

use super::type_map::normalize_type;
use super::types::{
    ColumnDescriptor, ConstraintMap, FkMap, ForeignKey, ForeignKeyEdge, RelationshipType,
    TableMetadata, TableRelationship,
};
use crate::catalog::{self, ConstraintKind};
use crate::error::{IntrospectError, IntrospectResult, SessionResult};
use crate::session::{CatalogRow, CatalogSession};

/// Read, merge and classify metadata for `tables` in `schema`.
pub async fn aggregate(
    session: &mut dyn CatalogSession,
    schema: &str,
    tables: &[String],
) -> IntrospectResult<Vec<TableMetadata>> {
    let columns = read_columns(session, schema, tables).await?;
    let pk = read_constraint(session, ConstraintKind::PrimaryKey, schema, tables).await?;
    let uniq = read_constraint(session, ConstraintKind::Unique, schema, tables).await?;
    let fk_map = read_foreign_keys(session, schema, tables).await?;

    Ok(assemble(tables, columns, &pk, &uniq, &fk_map))
}

async fn read_columns(
    session: &mut dyn CatalogSession,
    schema: &str,
    tables: &[String],
) -> IntrospectResult<Vec<ColumnDescriptor>> {
    let rows = session
        .execute(&catalog::columns(schema, tables))
        .await
        .map_err(IntrospectError::query)?;

    let columns = decode(&rows, |row| {
        Ok(ColumnDescriptor {
            table_name: row.text(0)?.to_string(),
            column_name: row.text(1)?.to_string(),
            data_type: normalize_type(row.text(2)?),
        })
    })?;

    debug!(schema, count = columns.len(), "columns read");
    Ok(columns)
}

async fn read_constraint(
    session: &mut dyn CatalogSession,
    kind: ConstraintKind,
    schema: &str,
    tables: &[String],
) -> IntrospectResult<ConstraintMap> {
    let rows = session
        .execute(&catalog::constraint_columns(kind, schema, tables))
        .await
        .map_err(IntrospectError::query)?;

    let mut map = ConstraintMap::new();
    for row in &rows {
        let table = row.text(0).map_err(IntrospectError::query)?;
        let column = row.text(1).map_err(IntrospectError::query)?;
        map.insert(table, column);
    }

    debug!(schema, constraint = kind.as_sql(), count = rows.len(), "constraint columns read");
    Ok(map)
}

async fn read_foreign_keys(
    session: &mut dyn CatalogSession,
    schema: &str,
    tables: &[String],
) -> IntrospectResult<FkMap> {
    let rows = session
        .execute(&catalog::foreign_keys(schema, tables))
        .await
        .map_err(IntrospectError::query)?;

    let edges = decode(&rows, |row| {
        Ok(ForeignKeyEdge {
            source_table: row.text(0)?.to_string(),
            source_column: row.text(1)?.to_string(),
            target_table: row.text(2)?.to_string(),
            target_column: row.text(3)?.to_string(),
        })
    })?;

    debug!(schema, count = edges.len(), "foreign keys read");
    Ok(edges.into_iter().collect())
}

fn decode<T>(
    rows: &[CatalogRow],
    f: impl Fn(&CatalogRow) -> SessionResult<T>,
) -> IntrospectResult<Vec<T>> {
    rows.iter()
        .map(f)
        .collect::<SessionResult<Vec<_>>>()
        .map_err(IntrospectError::query)
}

/// Classify one edge against its source table's constraint membership.
pub fn classify(edge: &ForeignKeyEdge, pk: &ConstraintMap, uniq: &ConstraintMap) -> RelationshipType {
    let is_unique = pk.contains(&edge.source_table, &edge.source_column)
        || uniq.contains(&edge.source_table, &edge.source_column);

    if is_unique {
        RelationshipType::OneToOne
    } else {
        RelationshipType::OneToMany
    }
}

/// Whether a table with this key and edge count looks like a join table.
pub fn is_join_table(pk_columns: usize, outgoing_edges: usize) -> bool {
    pk_columns == 2 && outgoing_edges == 2
}

/// Merge already-read catalog data into one descriptor per requested table.
///
/// `columns` must be in catalog order; that order is kept within each table.
pub fn assemble(
    tables: &[String],
    columns: Vec<ColumnDescriptor>,
    pk: &ConstraintMap,
    uniq: &ConstraintMap,
    fk_map: &FkMap,
) -> Vec<TableMetadata> {
    let mut columns_by_table: HashMap<String, Vec<ColumnDescriptor>> = HashMap::new();
    for column in columns {
        columns_by_table
            .entry(column.table_name.clone())
            .or_default()
            .push(column);
    }

    tables
        .iter()
        .map(|table| {
            let edges = fk_map.edges(table);
            let foreign_keys = edges
                .iter()
                .map(|edge| ForeignKey {
                    source_column: edge.source_column.clone(),
                    target_table: edge.target_table.clone(),
                    target_column: edge.target_column.clone(),
                    relationship_type: classify(edge, pk, uniq),
                })
                .collect();

            let primary_key = pk.columns(table).to_vec();
            let relationship_type = is_join_table(primary_key.len(), edges.len())
                .then_some(TableRelationship::ManyToMany);

            TableMetadata {
                table_name: table.clone(),
                columns: columns_by_table.get(table).cloned().unwrap_or_default(),
                primary_key,
                foreign_keys,
                relationship_type,
            }
        })
        .collect()
}
