//! HTTP routes driven through the router with a fixture catalog.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::app_catalog;
use schemagram::catalog::StatementKind;
use schemagram::config::Settings;
use schemagram::session::FixtureOpener;
use schemagram::web::{router, AppState};

fn app(opener: FixtureOpener) -> Router {
    router(Arc::new(AppState::new(Arc::new(opener), Settings::default())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(FixtureOpener::new(app_catalog())), get("/api/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"statusCode": 200, "message": "API is running"}));
}

#[tokio::test]
async fn test_test_connection() {
    let opener = FixtureOpener::new(app_catalog());
    let stats = opener.stats();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/db/test-connection")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"dbUrl": "postgres://fixture/app"}"#))
        .unwrap();

    let (status, body) = send(app(opener), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"statusCode": 200, "message": "Database connection successful"})
    );
    assert_eq!(stats.closes(), 1);
}

#[tokio::test]
async fn test_test_connection_failure() {
    let opener = FixtureOpener::new(app_catalog()).fail_open("could not translate host name");
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/db/test-connection")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"dbUrl": "postgres://nowhere/app"}"#))
        .unwrap();

    let (status, body) = send(app(opener), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"statusCode": 500, "message": "could not translate host name"})
    );
}

#[tokio::test]
async fn test_get_schemas() {
    let (status, body) = send(
        app(FixtureOpener::new(app_catalog())),
        get("/api/v1/db/get-schemas?dbUrl=postgres%3A%2F%2Ffixture%2Fapp"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Schemas fetched successfully");
    assert_eq!(body["schemas"], json!(["public", "reporting"]));
}

#[tokio::test]
async fn test_get_tables() {
    let (status, body) = send(
        app(FixtureOpener::new(app_catalog())),
        get("/api/v1/db/get-tables?dbUrl=x&tableSchema=reporting"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Tables fetched successfully");
    assert_eq!(body["tables"], json!([]));
}

#[tokio::test]
async fn test_get_diagram_data() {
    let (status, body) = send(
        app(FixtureOpener::new(app_catalog())),
        get("/api/v1/db/get-diagram-data?dbUrl=x&tableSchema=public&tableNames=users,%20user_roles"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Metadata fetched successfully");

    let metadata = body["metadata"].as_array().unwrap();
    assert_eq!(metadata.len(), 2);
    assert_eq!(metadata[0]["table_name"], "users");
    assert_eq!(metadata[0]["primary_key"], json!(["id"]));
    assert_eq!(metadata[0]["foreign_keys"], json!([]));
    assert!(metadata[0].get("relationship_type").is_none());

    assert_eq!(metadata[1]["table_name"], "user_roles");
    assert_eq!(metadata[1]["relationship_type"], "ManyToMany");
    assert_eq!(
        metadata[1]["foreign_keys"][0],
        json!({
            "source_column": "user_id",
            "target_table": "users",
            "target_column": "id",
            "relationship_type": "OneToOne"
        })
    );
}

#[tokio::test]
async fn test_query_failure_maps_to_500() {
    let opener = FixtureOpener::new(app_catalog()).fail_on(StatementKind::ForeignKeys, "");

    let (status, body) = send(
        app(opener),
        get("/api/v1/db/get-diagram-data?dbUrl=x&tableSchema=public&tableNames=users"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"statusCode": 500, "message": "Failed to execute the database query"})
    );
}

#[tokio::test]
async fn test_missing_parameter_is_bad_request() {
    let (status, body) = send(
        app(FixtureOpener::new(app_catalog())),
        get("/api/v1/db/get-tables?dbUrl=x"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert!(body["message"].as_str().unwrap().contains("tableSchema"));
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(app(FixtureOpener::new(app_catalog())), get("/api/v2/nothing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"statusCode": 404, "message": "Route not found"}));
}
