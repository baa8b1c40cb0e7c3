//! Native catalog type names → canonical labels.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Static lookup, loaded once and never mutated.
static TYPE_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("integer", "int"),
        ("timestamp without time zone", "timestamp"),
        ("timestamp with time zone", "timestamptz"),
        ("character varying", "varchar"),
        ("character", "char"),
        ("boolean", "bool"),
        ("double precision", "double"),
        ("real", "float"),
        ("numeric", "decimal"),
    ]
    .into_iter()
    .collect()
});

/// Map a native type name to its canonical label.
///
/// Unmapped names pass through unchanged, so normalizing a canonical label
/// is a no-op.
pub fn normalize_type(native: &str) -> String {
    TYPE_MAP.get(native).copied().unwrap_or(native).to_string()
}
