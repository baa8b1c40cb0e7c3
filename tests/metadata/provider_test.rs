//! Session lifecycle of SessionMetadataProvider.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{app_catalog, names};
use schemagram::catalog::{ConstraintKind, StatementKind};
use schemagram::metadata::{MetadataProvider, MetadataProviderExt, SessionMetadataProvider};
use schemagram::session::FixtureOpener;
use schemagram::{ErrorKind, IntrospectError};

fn provider(opener: &FixtureOpener) -> SessionMetadataProvider {
    SessionMetadataProvider::new(Arc::new(opener.clone()), "postgres://fixture/app")
}

#[tokio::test]
async fn test_each_call_opens_and_releases_one_session() {
    let opener = FixtureOpener::new(app_catalog());
    let stats = opener.stats();
    let provider = provider(&opener);

    provider.test_connection().await.unwrap();
    provider.list_schemas().await.unwrap();
    provider.list_tables("public").await.unwrap();
    provider
        .fetch_metadata("public", &names(&["users", "user_roles"]))
        .await
        .unwrap();

    assert_eq!(stats.opens(), 4);
    assert_eq!(stats.closes(), 4);
}

#[tokio::test]
async fn test_read_failure_releases_once_then_propagates() {
    let opener = FixtureOpener::new(app_catalog()).fail_on(
        StatementKind::ConstraintColumns(ConstraintKind::Unique),
        "canceling statement due to statement timeout",
    );
    let stats = opener.stats();

    let err = provider(&opener)
        .fetch_metadata("public", &names(&["users"]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::QueryFailure);
    assert_eq!(err.message(), "canceling statement due to statement timeout");
    assert_eq!(stats.opens(), 1);
    assert_eq!(stats.closes(), 1);
    // Foreign keys are never read once an earlier read fails.
    assert!(!stats.executed().contains(&StatementKind::ForeignKeys));
}

#[tokio::test]
async fn test_open_failure_never_releases() {
    let opener = FixtureOpener::new(app_catalog()).fail_open("password authentication failed");
    let stats = opener.stats();
    let provider = provider(&opener);

    let err = provider.list_schemas().await.unwrap_err();
    assert_eq!(
        err,
        IntrospectError::ConnectionFailure("password authentication failed".to_string())
    );

    let err = provider.test_connection().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionFailure);

    let err = provider
        .fetch_metadata("public", &names(&["users"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionFailure);

    assert_eq!(stats.opens(), 0);
    assert_eq!(stats.closes(), 0);
    assert!(stats.executed().is_empty());
}

#[tokio::test]
async fn test_release_failure_is_swallowed() {
    let opener = FixtureOpener::new(app_catalog()).fail_close("connection reset by peer");
    let stats = opener.stats();
    let provider = provider(&opener);

    provider.test_connection().await.unwrap();
    let schemas = provider.list_schemas().await.unwrap();

    assert_eq!(schemas, vec!["public", "reporting"]);
    assert_eq!(stats.closes(), 2);
}

#[tokio::test]
async fn test_release_failure_does_not_mask_read_failure() {
    let opener = FixtureOpener::new(app_catalog())
        .fail_on(StatementKind::Tables, "relation does not exist")
        .fail_close("connection reset by peer");

    let err = provider(&opener).list_tables("public").await.unwrap_err();
    assert_eq!(
        err,
        IntrospectError::QueryFailure("relation does not exist".to_string())
    );
}

#[tokio::test]
async fn test_fetch_metadata_for_parses_names() {
    let opener = FixtureOpener::new(app_catalog());

    let metadata = provider(&opener)
        .fetch_metadata_for("public", " user_roles , users ")
        .await
        .unwrap();

    let order: Vec<&str> = metadata.iter().map(|t| t.table_name.as_str()).collect();
    assert_eq!(order, vec!["user_roles", "users"]);
    assert!(metadata[0].is_join_table());
}

#[tokio::test]
async fn test_concurrent_calls_are_isolated() {
    let opener = FixtureOpener::new(app_catalog());
    let stats = opener.stats();
    let provider = Arc::new(provider(&opener));

    let handles: Vec<_> = ["users", "roles", "user_roles", "user_documents"]
        .into_iter()
        .map(|table| {
            let provider = provider.clone();
            tokio::spawn(async move {
                provider
                    .fetch_metadata("public", &[table.to_string()])
                    .await
                    .map(|mut m| m.remove(0).table_name)
            })
        })
        .collect();

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(seen, vec!["users", "roles", "user_roles", "user_documents"]);
    assert_eq!(stats.opens(), 4);
    assert_eq!(stats.closes(), 4);
}

#[tokio::test]
async fn test_cancelled_call_still_releases_session() {
    let opener = FixtureOpener::new(app_catalog()).stall_on(StatementKind::ForeignKeys);
    let stats = opener.stats();
    let provider = provider(&opener);

    let result = tokio::time::timeout(
        std::time::Duration::from_millis(20),
        provider.fetch_metadata("public", &names(&["users"])),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(stats.opens(), 1);

    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    assert_eq!(stats.closes(), 1);
    assert_eq!(stats.executed().last(), Some(&StatementKind::ForeignKeys));
}
