//! Metadata types returned by the introspection core.
//!
//! Field names of the serialized forms are part of the external contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One physical column of a requested table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Owning table.
    pub table_name: String,
    /// Column name.
    pub column_name: String,
    /// Canonical type label (see [`normalize_type`](super::normalize_type)).
    pub data_type: String,
}

/// A catalog-declared foreign key, as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyEdge {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Cardinality of a single foreign key edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
}

/// Table-level relationship flag, set only on join tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableRelationship {
    ManyToMany,
}

/// An outgoing foreign key of a table, after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub relationship_type: RelationshipType,
}

/// Complete descriptor for one requested table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Primary key columns in catalog order. Empty when there is none.
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Present only when the table looks like a join table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<TableRelationship>,
}

impl TableMetadata {
    /// An empty descriptor for `table_name`.
    pub fn empty(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            relationship_type: None,
        }
    }

    pub fn is_join_table(&self) -> bool {
        self.relationship_type == Some(TableRelationship::ManyToMany)
    }
}

/// Table name → columns participating in one constraint kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintMap {
    members: HashMap<String, Vec<String>>,
}

impl ConstraintMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `column` as a member for `table`. Repeats are ignored.
    pub fn insert(&mut self, table: impl Into<String>, column: impl Into<String>) {
        let column = column.into();
        let columns = self.members.entry(table.into()).or_default();
        if !columns.contains(&column) {
            columns.push(column);
        }
    }

    /// Member columns of `table`, empty if it has none.
    pub fn columns(&self, table: &str) -> &[String] {
        self.members.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, table: &str, column: &str) -> bool {
        self.columns(table).iter().any(|c| c == column)
    }
}

/// Source table name → outgoing foreign key edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FkMap {
    edges: HashMap<String, Vec<ForeignKeyEdge>>,
}

impl FkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edge: ForeignKeyEdge) {
        self.edges
            .entry(edge.source_table.clone())
            .or_default()
            .push(edge);
    }

    /// Outgoing edges of `table`, empty if it has none.
    pub fn edges(&self, table: &str) -> &[ForeignKeyEdge] {
        self.edges.get(table).map(Vec::as_slice).unwrap_or_default()
    }
}

impl FromIterator<ForeignKeyEdge> for FkMap {
    fn from_iter<I: IntoIterator<Item = ForeignKeyEdge>>(iter: I) -> Self {
        let mut map = FkMap::new();
        for edge in iter {
            map.push(edge);
        }
        map
    }
}

/// Payload of the schema listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaList {
    pub schemas: Vec<String>,
}

/// Payload of the table listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableList {
    pub tables: Vec<String>,
}

/// Payload of the metadata aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataList {
    pub metadata: Vec<TableMetadata>,
}
