//! Syntax validation for catalog templates.
//!
//! Uses sqlparser-rs to confirm a template parses as PostgreSQL before it is
//! ever sent to a server.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Validates that a SQL string is syntactically valid PostgreSQL.
///
/// # Example
///
/// ```
/// use schemagram::catalog::validate_sql;
///
/// validate_sql("SELECT schema_name FROM information_schema.schemata").unwrap();
/// ```
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for Postgres: {}\nSQL: {}", e, sql))
}
