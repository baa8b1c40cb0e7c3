//! Parameterized read-only queries against the relational catalog.
//!
//! Templates target the PostgreSQL `information_schema` views, except the
//! foreign key read which needs `pg_catalog`. Text columns are cast to
//! `text` so sessions decode them as plain strings regardless of the
//! catalog's identifier domains.
//!
//! Statements are pure values: building one performs no I/O. A
//! [`CatalogSession`](crate::session::CatalogSession) executes them.

mod validate;

pub use validate::validate_sql;

/// Non-system schema names, ordered by name.
const SCHEMAS_SQL: &str = "\
SELECT schema_name::text AS schema_name
FROM information_schema.schemata
WHERE schema_name NOT IN ('information_schema', 'pg_catalog')
  AND schema_name NOT LIKE 'pg_toast%'
  AND schema_name NOT LIKE 'pg_temp%'
ORDER BY schema_name";

/// Table names for one schema, in catalog order.
const TABLES_SQL: &str = "\
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_schema = $1";

const COLUMNS_SQL: &str = "\
SELECT c.table_name::text AS table_name,
       c.column_name::text AS column_name,
       c.data_type::text AS data_type
FROM information_schema.columns AS c
WHERE c.table_schema = $1
  AND c.table_name::text = ANY($2)
ORDER BY c.table_name, c.ordinal_position";

const CONSTRAINT_COLUMNS_SQL: &str = "\
SELECT tc.table_name::text AS table_name,
       kcu.column_name::text AS column_name
FROM information_schema.table_constraints AS tc
JOIN information_schema.key_column_usage AS kcu
  ON tc.constraint_schema = kcu.constraint_schema
 AND tc.constraint_name = kcu.constraint_name
 AND tc.table_name = kcu.table_name
WHERE tc.constraint_type = $1
  AND tc.table_schema = $2
  AND tc.table_name::text = ANY($3)
ORDER BY tc.table_name, kcu.ordinal_position";

/// One row per referencing column of each foreign key. Constraints are
/// addressed by owning relation, and `conkey`/`confkey` pair columns by
/// position.
const FOREIGN_KEYS_SQL: &str = "\
SELECT src.relname::text AS source_table,
       sa.attname::text AS source_column,
       tgt.relname::text AS target_table,
       ta.attname::text AS target_column
FROM pg_catalog.pg_constraint AS con
CROSS JOIN unnest(con.conkey, con.confkey) AS k(src_attnum, tgt_attnum)
JOIN pg_catalog.pg_class AS src ON src.oid = con.conrelid
JOIN pg_catalog.pg_namespace AS ns ON ns.oid = src.relnamespace
JOIN pg_catalog.pg_class AS tgt ON tgt.oid = con.confrelid
JOIN pg_catalog.pg_attribute AS sa
  ON sa.attrelid = con.conrelid
 AND sa.attnum = k.src_attnum
JOIN pg_catalog.pg_attribute AS ta
  ON ta.attrelid = con.confrelid
 AND ta.attnum = k.tgt_attnum
WHERE con.contype = 'f'
  AND ns.nspname = $1
  AND src.relname::text = ANY($2)
ORDER BY src.relname, con.conname, array_position(con.conkey, k.src_attnum)";

/// Constraint kinds whose column membership drives classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

impl ConstraintKind {
    /// The `constraint_type` value used by the catalog.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
        }
    }
}

/// Identifies which template a statement was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Rows: `(schema_name)`.
    Schemas,
    /// Rows: `(table_name)`.
    Tables,
    /// Rows: `(table_name, column_name, data_type)`.
    Columns,
    /// Rows: `(table_name, column_name)`.
    ConstraintColumns(ConstraintKind),
    /// Rows: `(source_table, source_column, target_table, target_column)`.
    ForeignKeys,
}

impl StatementKind {
    /// Number of text columns each returned row carries.
    pub fn arity(&self) -> usize {
        match self {
            StatementKind::Schemas | StatementKind::Tables => 1,
            StatementKind::ConstraintColumns(_) => 2,
            StatementKind::Columns => 3,
            StatementKind::ForeignKeys => 4,
        }
    }
}

/// A bound query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Text(String),
    TextList(Vec<String>),
}

/// A catalog template together with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatement {
    kind: StatementKind,
    sql: &'static str,
    params: Vec<QueryParam>,
}

impl CatalogStatement {
    fn new(kind: StatementKind, sql: &'static str, params: Vec<QueryParam>) -> Self {
        Self { kind, sql, params }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    /// Parameters in placeholder order (`$1`, `$2`, ...).
    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// The text parameter at `idx`, if it is one.
    pub fn text_param(&self, idx: usize) -> Option<&str> {
        match self.params.get(idx) {
            Some(QueryParam::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// The list parameter at `idx`, if it is one.
    pub fn list_param(&self, idx: usize) -> Option<&[String]> {
        match self.params.get(idx) {
            Some(QueryParam::TextList(v)) => Some(v),
            _ => None,
        }
    }
}

/// All non-system schemas.
pub fn schemas() -> CatalogStatement {
    CatalogStatement::new(StatementKind::Schemas, SCHEMAS_SQL, Vec::new())
}

/// Tables in `schema`.
pub fn tables(schema: &str) -> CatalogStatement {
    CatalogStatement::new(
        StatementKind::Tables,
        TABLES_SQL,
        vec![QueryParam::Text(schema.to_string())],
    )
}

/// Columns of the given tables in `schema`.
pub fn columns(schema: &str, tables: &[String]) -> CatalogStatement {
    CatalogStatement::new(
        StatementKind::Columns,
        COLUMNS_SQL,
        vec![
            QueryParam::Text(schema.to_string()),
            QueryParam::TextList(tables.to_vec()),
        ],
    )
}

/// Columns participating in constraints of `kind` on the given tables.
pub fn constraint_columns(kind: ConstraintKind, schema: &str, tables: &[String]) -> CatalogStatement {
    CatalogStatement::new(
        StatementKind::ConstraintColumns(kind),
        CONSTRAINT_COLUMNS_SQL,
        vec![
            QueryParam::Text(kind.as_sql().to_string()),
            QueryParam::Text(schema.to_string()),
            QueryParam::TextList(tables.to_vec()),
        ],
    )
}

/// Foreign keys whose source table is one of the given tables.
pub fn foreign_keys(schema: &str, tables: &[String]) -> CatalogStatement {
    CatalogStatement::new(
        StatementKind::ForeignKeys,
        FOREIGN_KEYS_SQL,
        vec![
            QueryParam::Text(schema.to_string()),
            QueryParam::TextList(tables.to_vec()),
        ],
    )
}
