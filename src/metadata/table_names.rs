//! Parsing of caller-supplied table name lists.

/// Split a comma-separated (or single) table name list, trimming each name.
///
/// Order is preserved and nothing is deduplicated or dropped: an empty input
/// yields a single empty name.
pub fn parse_table_names(input: &str) -> Vec<String> {
    input.split(',').map(|name| name.trim().to_string()).collect()
}
