//! Integration tests for the HTTP API.
//!
//! Router-level tests drive the service with `oneshot`; the client tests bind
//! a real listener and talk to it through `HttpTodoClient`.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use common::{create_test_app, create_test_app_state, seed_todos};
use todo_app::client::{ClientConfig, ClientError, HttpTodoClient, TodoApi};
use todo_app::domain::{NewTodo, TodoId, TodoPatch};

// =============================================================================
// Helpers
// =============================================================================

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn spawn_server() -> HttpTodoClient {
    let state = create_test_app_state();
    let app = create_test_app(&state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    HttpTodoClient::new(&ClientConfig::new(format!("http://{address}/api"))).unwrap()
}

// =============================================================================
// Router Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_applies_defaults_and_get_returns_it() {
    let state = create_test_app_state();
    let app = create_test_app(&state);

    let (status, created) = send(&app, "POST", "/api/todos", Some(json!({ "title": "Buy milk" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["description"], "");
    assert_eq!(created["completed"], false);
    assert!(created["createdAt"].is_string());

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/todos/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[rstest]
#[tokio::test]
async fn test_create_keeps_all_given_fields() {
    let state = create_test_app_state();
    let app = create_test_app(&state);

    let (_, created) = send(
        &app,
        "POST",
        "/api/todos",
        Some(json!({ "title": "Report", "description": "<p>draft</p>", "completed": true })),
    )
    .await;

    assert_eq!(created["description"], "<p>draft</p>");
    assert_eq!(created["completed"], true);
}

#[rstest]
#[tokio::test]
async fn test_pagination_with_nine_items() {
    let state = create_test_app_state();
    let app = create_test_app(&state);
    seed_todos(state.todo_repository.as_ref(), 9).await;

    let (status, first) = send(&app, "GET", "/api/todos?page=1&limit=8", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["todos"].as_array().unwrap().len(), 8);
    assert_eq!(first["totalPages"], 2);
    assert_eq!(first["currentPage"], 1);
    assert_eq!(first["totalTodos"], 9);
    // Newest first.
    assert_eq!(first["todos"][0]["title"], "Todo 8");

    let (_, second) = send(&app, "GET", "/api/todos?page=2&limit=8", None).await;
    let todos = second["todos"].as_array().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["title"], "Todo 0");
}

#[rstest]
#[case("/api/todos")]
#[case("/api/todos?page=abc&limit=")]
#[case("/api/todos?page=0&limit=0")]
#[tokio::test]
async fn test_list_falls_back_to_defaults(#[case] uri: &str) {
    let state = create_test_app_state();
    let app = create_test_app(&state);
    seed_todos(state.todo_repository.as_ref(), 9).await;

    let (status, body) = send(&app, "GET", uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["todos"].as_array().unwrap().len(), 8);
}

#[rstest]
#[tokio::test]
async fn test_update_distinguishes_empty_and_absent_description() {
    let state = create_test_app_state();
    let app = create_test_app(&state);
    let item = state
        .todo_repository
        .create(NewTodo {
            description: Some("<p>notes</p>".to_string()),
            ..NewTodo::new("Report")
        })
        .await
        .unwrap();
    let uri = format!("/api/todos/{}", item.todo_id);

    let (_, unchanged) = send(&app, "PUT", &uri, Some(json!({}))).await;
    assert_eq!(unchanged["description"], "<p>notes</p>");

    let (_, cleared) = send(&app, "PUT", &uri, Some(json!({ "description": "" }))).await;
    assert_eq!(cleared["description"], "");

    let (_, again) = send(&app, "PUT", &uri, Some(json!({ "description": "" }))).await;
    assert_eq!(again["description"], cleared["description"]);
    assert_eq!(again["title"], cleared["title"]);
    assert_eq!(again["completed"], cleared["completed"]);
}

#[rstest]
#[tokio::test]
async fn test_update_rejects_blank_title_without_mutation() {
    let state = create_test_app_state();
    let app = create_test_app(&state);
    let item = state
        .todo_repository
        .create(NewTodo::new("Report"))
        .await
        .unwrap();
    let uri = format!("/api/todos/{}", item.todo_id);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "title": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let stored = state
        .todo_repository
        .find_by_id(&item.todo_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Report");
}

#[rstest]
#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let state = create_test_app_state();
    let app = create_test_app(&state);
    let item = state
        .todo_repository
        .create(NewTodo::new("Report"))
        .await
        .unwrap();
    let uri = format!("/api/todos/{}", item.todo_id);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Todo deleted" }));

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Todo not found");
}

// =============================================================================
// HTTP Client Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_client_round_trip() {
    let client = spawn_server().await;

    let created = client.create(NewTodo::new("Buy milk")).await.unwrap();
    assert_eq!(created.description, "");
    assert!(!created.completed);

    let page = client.list(1, 8).await.unwrap();
    assert_eq!(page.todos, vec![created.clone()]);
    assert_eq!(page.total_pages, 1);

    let updated = client
        .update(
            &created.todo_id,
            TodoPatch {
                completed: Some(true),
                ..TodoPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "Buy milk");
    assert_eq!(client.get(&created.todo_id).await.unwrap(), updated);

    let message = client.delete(&created.todo_id).await.unwrap();
    assert_eq!(message, "Todo deleted");
}

#[rstest]
#[tokio::test]
async fn test_client_maps_error_statuses() {
    let client = spawn_server().await;

    let error = client.create(NewTodo::new(" ")).await.unwrap_err();
    assert_eq!(error, ClientError::Validation("Title is required".to_string()));

    let error = client.get(&TodoId::generate()).await.unwrap_err();
    assert_eq!(error, ClientError::NotFound("Todo not found".to_string()));

    let error = client.delete(&TodoId::generate()).await.unwrap_err();
    assert!(error.is_not_found());
}
