//! Schema and table enumeration.

#[path = "../common/mod.rs"]
mod common;

use common::app_catalog;
use schemagram::catalog::StatementKind;
use schemagram::metadata::enumerate::{list_schemas, list_tables};
use schemagram::session::{FixtureCatalog, FixtureOpener, SessionOpener};
use schemagram::IntrospectError;

#[tokio::test]
async fn test_list_schemas() {
    let opener = FixtureOpener::new(app_catalog());
    let mut session = opener.open("fixture://").await.unwrap();

    let schemas = list_schemas(session.as_mut()).await.unwrap();
    assert_eq!(schemas, vec!["public", "reporting"]);
}

#[tokio::test]
async fn test_list_tables_in_catalog_order() {
    let opener = FixtureOpener::new(app_catalog());
    let mut session = opener.open("fixture://").await.unwrap();

    let tables = list_tables(session.as_mut(), "public").await.unwrap();
    assert_eq!(
        tables,
        vec![
            "users",
            "user_profiles",
            "user_documents",
            "roles",
            "user_roles",
            "user_settings",
            "audit_events",
        ]
    );
}

#[tokio::test]
async fn test_empty_results_are_not_errors() {
    let opener = FixtureOpener::new(FixtureCatalog::new());
    let mut session = opener.open("fixture://").await.unwrap();

    assert!(list_schemas(session.as_mut()).await.unwrap().is_empty());
    assert!(list_tables(session.as_mut(), "public").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_schema() {
    let opener = FixtureOpener::new(app_catalog());
    let mut session = opener.open("fixture://").await.unwrap();

    assert!(list_tables(session.as_mut(), "reporting").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_read_failure_is_query_failure() {
    let opener = FixtureOpener::new(app_catalog()).fail_on(StatementKind::Schemas, "boom");
    let mut session = opener.open("fixture://").await.unwrap();

    let err = list_schemas(session.as_mut()).await.unwrap_err();
    assert_eq!(err, IntrospectError::QueryFailure("boom".to_string()));
}
