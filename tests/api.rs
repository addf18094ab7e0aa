//! HTTP surface tests against a router backed by in-memory SQLite.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use nodeflow::{server::router, workflow::SqliteGraphStore};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let store = SqliteGraphStore::in_memory().await.expect("in-memory store");
    router(store)
}

/// Send one request and decode the JSON body (`Null` when empty or not JSON).
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn create_workflow(app: &Router, name: &str) -> String {
    let (status, workflow) = send(app, Method::POST, "/api/workflows", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    workflow["id"].as_str().unwrap().to_string()
}

async fn create_node(app: &Router, workflow_id: &str, body: Value) -> String {
    let uri = format!("/api/workflows/{workflow_id}/nodes");
    let (status, node) = send(app, Method::POST, &uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    node["id"].as_str().unwrap().to_string()
}

async fn connect(app: &Router, workflow_id: &str, source: &str, target: &str) -> StatusCode {
    let uri = format!("/api/workflows/{workflow_id}/edges");
    let body = json!({ "source_id": source, "target_id": target });
    send(app, Method::POST, &uri, Some(body)).await.0
}

#[tokio::test]
async fn health_check_answers_ok() {
    let app = app().await;
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn built_workflow_runs_and_is_recorded() {
    let app = app().await;
    let workflow_id = create_workflow(&app, "weather alert").await;
    let trigger = create_node(&app, &workflow_id, json!({ "category": "trigger", "label": "Every morning" })).await;
    let weather = create_node(
        &app,
        &workflow_id,
        json!({
            "category": "data",
            "label": "Weather",
            "config": { "source": "weather", "location": "Berlin" },
            "position": { "x": 120.0, "y": 40.0 }
        }),
    )
    .await;
    assert_eq!(connect(&app, &workflow_id, &trigger, &weather).await, StatusCode::CREATED);

    let (status, detail) = send(&app, Method::GET, &format!("/api/workflows/{workflow_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(detail["edges"].as_array().unwrap().len(), 1);
    assert_eq!(detail["nodes"][1]["position"]["x"], json!(120.0));

    let (status, outcome) = send(&app, Method::POST, &format!("/api/workflows/{workflow_id}/run"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["success"], json!(true));
    assert_eq!(outcome["visited"], json!([&trigger, &weather]));
    let entry = &outcome["context"][&weather];
    assert_eq!(entry["type"], json!("data"));
    assert_eq!(entry["data"]["temperature"], json!(72));
    assert_eq!(entry["data"]["location"], json!("Berlin"));

    let (status, history) = send(&app, Method::GET, &format!("/api/workflows/{workflow_id}/executions"), None).await;
    assert_eq!(status, StatusCode::OK);
    let executions = history["executions"].as_array().unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0]["status"], json!("completed"));

    let execution_id = outcome["execution_id"].as_str().unwrap();
    let (status, record) = send(&app, Method::GET, &format!("/api/executions/{execution_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["context"][&weather]["data"]["condition"], json!("Sunny"));
}

#[tokio::test]
async fn failed_run_is_unprocessable() {
    let app = app().await;
    let workflow_id = create_workflow(&app, "no entry point").await;
    create_node(&app, &workflow_id, json!({ "category": "transform", "label": "Summary" })).await;

    let (status, outcome) = send(&app, Method::POST, &format!("/api/workflows/{workflow_id}/run"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["success"], json!(false));
    assert_eq!(outcome["error"], json!("workflow has no trigger node"));
    assert_eq!(outcome["context"], Value::Null);

    let (_, history) = send(&app, Method::GET, &format!("/api/workflows/{workflow_id}/executions"), None).await;
    assert_eq!(history["executions"][0]["status"], json!("failed"));
}

#[tokio::test]
async fn disabled_workflow_does_not_run() {
    let app = app().await;
    let workflow_id = create_workflow(&app, "paused").await;
    create_node(&app, &workflow_id, json!({ "category": "trigger", "label": "Start" })).await;

    let (status, workflow) = send(
        &app,
        Method::PATCH,
        &format!("/api/workflows/{workflow_id}"),
        Some(json!({ "enabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(workflow["enabled"], json!(false));

    let (status, outcome) = send(&app, Method::POST, &format!("/api/workflows/{workflow_id}/run"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["error"], json!(format!("workflow is disabled: {workflow_id}")));
}

#[tokio::test]
async fn self_loop_edge_is_bad_request() {
    let app = app().await;
    let workflow_id = create_workflow(&app, "loops").await;
    let node = create_node(&app, &workflow_id, json!({ "category": "trigger", "label": "Start" })).await;

    assert_eq!(connect(&app, &workflow_id, &node, &node).await, StatusCode::BAD_REQUEST);

    let (_, detail) = send(&app, Method::GET, &format!("/api/workflows/{workflow_id}"), None).await;
    assert!(detail["edges"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_resources_are_not_found() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/workflows/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/executions/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body = json!({ "category": "trigger", "label": "Start" });
    let (status, _) = send(&app, Method::POST, "/api/workflows/nope/nodes", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PATCH, "/api/workflows/nope", Some(json!({ "enabled": true }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn workflows_are_listed_and_blank_names_refused() {
    let app = app().await;
    create_workflow(&app, "first").await;
    create_workflow(&app, "second").await;

    let (status, _) = send(&app, Method::POST, "/api/workflows", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = send(&app, Method::GET, "/api/workflows", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list["workflows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|workflow| workflow["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["first", "second"]);
}

#[tokio::test]
async fn malformed_node_config_fails_the_run() {
    let app = app().await;

    for config in [json!(42), json!("weather"), json!(["weather"])] {
        let workflow_id = create_workflow(&app, "malformed").await;
        let trigger = create_node(&app, &workflow_id, json!({ "category": "trigger", "label": "Start" })).await;
        let data = create_node(
            &app,
            &workflow_id,
            json!({ "category": "data", "label": "Fetch", "config": config }),
        )
        .await;
        assert_eq!(connect(&app, &workflow_id, &trigger, &data).await, StatusCode::CREATED);

        let (status, outcome) = send(&app, Method::POST, &format!("/api/workflows/{workflow_id}/run"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "config {config}");
        let error = outcome["error"].as_str().unwrap();
        assert!(error.starts_with(&format!("invalid configuration on node {data}")), "{error}");

        let (_, history) = send(&app, Method::GET, &format!("/api/workflows/{workflow_id}/executions"), None).await;
        let executions = history["executions"].as_array().unwrap();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0]["status"], json!("failed"));
    }
}
