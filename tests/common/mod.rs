//! Shared catalog fixtures for integration tests.

#![allow(dead_code)]

use schemagram::session::{FixtureCatalog, FixtureTable};

/// `public` schema with users, profiles, documents and a roles join table.
pub fn app_catalog() -> FixtureCatalog {
    FixtureCatalog::new()
        .with_schema(
            "public",
            vec![
                FixtureTable::new("users")
                    .column("id", "integer")
                    .column("name", "character varying")
                    .column("age", "integer")
                    .column("email", "character varying")
                    .primary_key(&["id"])
                    .unique(&["email"]),
                FixtureTable::new("user_profiles")
                    .column("user_id", "integer")
                    .column("bio", "text")
                    .primary_key(&["user_id"])
                    .unique(&["user_id"])
                    .foreign_key("user_id", "users", "id"),
                FixtureTable::new("user_documents")
                    .column("id", "integer")
                    .column("user_id", "integer")
                    .column("document_name", "character varying")
                    .column("created_at", "timestamp without time zone")
                    .primary_key(&["id"])
                    .foreign_key("user_id", "users", "id"),
                FixtureTable::new("roles")
                    .column("id", "integer")
                    .column("name", "character varying")
                    .primary_key(&["id"]),
                FixtureTable::new("user_roles")
                    .column("user_id", "integer")
                    .column("role_id", "integer")
                    .column("granted_at", "timestamp with time zone")
                    .primary_key(&["user_id", "role_id"])
                    .foreign_key("user_id", "users", "id")
                    .foreign_key("role_id", "roles", "id"),
                // Two key columns but only one outgoing edge.
                FixtureTable::new("user_settings")
                    .column("user_id", "integer")
                    .column("key", "character varying")
                    .column("value", "jsonb")
                    .primary_key(&["user_id", "key"])
                    .foreign_key("user_id", "users", "id"),
                // Two outgoing edges but a single key column.
                FixtureTable::new("audit_events")
                    .column("id", "bigint")
                    .column("actor_id", "integer")
                    .column("role_id", "integer")
                    .primary_key(&["id"])
                    .foreign_key("actor_id", "users", "id")
                    .foreign_key("role_id", "roles", "id"),
            ],
        )
        .with_schema("reporting", vec![])
}

pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
