//! HTTP handlers for the Todo API.
//!
//! Handlers are stateless: everything they need lives in [`AppState`], and
//! every store operation goes through the `TodoRepository` trait object.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;

use super::dto::{
    CreateTodoRequest, DEFAULT_PAGE_SIZE, DeleteResponse, ListTodosQuery, TodoListResponse,
    TodoResponse, UpdateTodoRequest,
};
use super::error::ApiErrorResponse;
use crate::domain::TodoId;
use crate::infrastructure::{Pagination, TodoRepository};

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration for runtime settings.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Page size used when the request has no usable `limit`.
    pub default_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// The repository is a trait object so the backend can be chosen at startup
/// by `RepositoryFactory`.
#[derive(Clone)]
pub struct AppState {
    pub todo_repository: Arc<dyn TodoRepository + Send + Sync>,
    pub config: AppConfig,
}

impl AppState {
    #[must_use]
    pub fn new(todo_repository: Arc<dyn TodoRepository + Send + Sync>) -> Self {
        Self {
            todo_repository,
            config: AppConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(
        todo_repository: Arc<dyn TodoRepository + Send + Sync>,
        config: AppConfig,
    ) -> Self {
        Self {
            todo_repository,
            config,
        }
    }
}

/// Parses a path id. Malformed ids are reported as not found.
fn parse_todo_id(raw: &str) -> Result<TodoId, ApiErrorResponse> {
    TodoId::parse(raw).ok_or_else(|| {
        tracing::debug!(id = raw, "Rejected malformed todo id");
        ApiErrorResponse::todo_not_found()
    })
}

fn json_rejection(rejection: &JsonRejection) -> ApiErrorResponse {
    tracing::debug!(%rejection, "Rejected request body");
    ApiErrorResponse::bad_request("INVALID_REQUEST", rejection.body_text())
}

// =============================================================================
// GET /todos
// =============================================================================

/// Lists one page of todos, newest first.
///
/// # Query Parameters
///
/// - `page`: 1-based page number (default: 1)
/// - `limit`: page size (default: 8, max: 100)
///
/// # Response
///
/// ```json
/// {
///   "todos": [ ... ],
///   "totalPages": 2,
///   "currentPage": 1,
///   "totalTodos": 9
/// }
/// ```
///
/// # Errors
///
/// Returns 500 when the store fails.
pub async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<TodoListResponse>, ApiErrorResponse> {
    let (page, limit) = query.resolve(state.config.default_page_size);
    tracing::debug!(page, limit, "Listing todos");

    let result = state
        .todo_repository
        .list(Pagination::for_page(page, limit))
        .await?;

    let total_pages = result.total_pages();
    let total_todos = result.total;
    tracing::debug!(
        returned = result.items.len(),
        total_todos,
        total_pages,
        "Listed todos"
    );

    Ok(Json(TodoListResponse {
        todos: result.items.into_iter().map(TodoResponse::from).collect(),
        total_pages,
        current_page: page,
        total_todos,
    }))
}

// =============================================================================
// GET /todos/{id}
// =============================================================================

/// Fetches a single todo.
///
/// # Errors
///
/// - 404 when the id is malformed or unknown
/// - 500 when the store fails
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoResponse>, ApiErrorResponse> {
    let todo_id = parse_todo_id(&id)?;

    state
        .todo_repository
        .find_by_id(&todo_id)
        .await?
        .map(|item| Json(TodoResponse::from(item)))
        .ok_or_else(ApiErrorResponse::todo_not_found)
}

// =============================================================================
// POST /todos
// =============================================================================

/// Creates a todo.
///
/// # Request Body
///
/// ```json
/// { "title": "Buy milk", "description": "<p>2 litres</p>", "completed": false }
/// ```
///
/// Only `title` is required.
///
/// # Errors
///
/// - 400 when the body is not JSON or the title is missing or blank
/// - 500 when the store fails
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiErrorResponse> {
    let Json(request) = payload.map_err(|rejection| json_rejection(&rejection))?;
    let todo = request.validate()?;

    let item = state.todo_repository.create(todo).await?;
    tracing::info!(todo_id = %item.todo_id, "Created todo");

    Ok((StatusCode::CREATED, Json(TodoResponse::from(item))))
}

// =============================================================================
// PUT /todos/{id}
// =============================================================================

/// Partially updates a todo. Absent fields are left unchanged.
///
/// # Errors
///
/// - 400 when the body is not JSON or a present title is blank
/// - 404 when the id is malformed or unknown
/// - 500 when the store fails
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiErrorResponse> {
    let todo_id = parse_todo_id(&id)?;
    let Json(request) = payload.map_err(|rejection| json_rejection(&rejection))?;
    let patch = request.validate()?;

    let updated = state
        .todo_repository
        .update(&todo_id, patch)
        .await?
        .ok_or_else(ApiErrorResponse::todo_not_found)?;
    tracing::info!(%todo_id, "Updated todo");

    Ok(Json(TodoResponse::from(updated)))
}

// =============================================================================
// DELETE /todos/{id}
// =============================================================================

/// Deletes a todo.
///
/// # Errors
///
/// - 404 when the id is malformed or unknown
/// - 500 when the store fails
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    let todo_id = parse_todo_id(&id)?;

    if !state.todo_repository.delete(&todo_id).await? {
        return Err(ApiErrorResponse::todo_not_found());
    }
    tracing::info!(%todo_id, "Deleted todo");

    Ok(Json(DeleteResponse {
        message: "Todo deleted".to_string(),
    }))
}

// =============================================================================
// Health Check Handler
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewTodo;
    use crate::infrastructure::InMemoryTodoRepository;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> AppState {
        AppState::new(Arc::new(InMemoryTodoRepository::new()))
    }

    async fn seed(state: &AppState, count: usize) {
        for index in 0..count {
            state
                .todo_repository
                .create(NewTodo::new(format!("Todo {index}")))
                .await
                .unwrap();
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_todos_second_page(state: AppState) {
        seed(&state, 9).await;
        let query = ListTodosQuery {
            page: Some("2".to_string()),
            limit: None,
        };

        let Json(response) = list_todos(State(state), Query(query)).await.unwrap();

        assert_eq!(response.todos.len(), 1);
        assert_eq!(response.total_pages, 2);
        assert_eq!(response.current_page, 2);
        assert_eq!(response.total_todos, 9);
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_todos_empty_store(state: AppState) {
        let Json(response) = list_todos(State(state), Query(ListTodosQuery::default()))
            .await
            .unwrap();

        assert!(response.todos.is_empty());
        assert_eq!(response.total_pages, 0);
        assert_eq!(response.current_page, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_todo_applies_defaults(state: AppState) {
        let request = CreateTodoRequest::new("Buy milk");

        let (status, Json(response)) = create_todo(State(state.clone()), Ok(Json(request)))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.description, "");
        assert!(!response.completed);
        assert_eq!(state.todo_repository.count().await.unwrap(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_todo_rejects_blank_title(state: AppState) {
        let request = CreateTodoRequest::new("  ");

        let error = create_todo(State(state.clone()), Ok(Json(request)))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error.code, "VALIDATION_ERROR");
        assert_eq!(state.todo_repository.count().await.unwrap(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_todo_unknown_id(state: AppState) {
        let request = UpdateTodoRequest {
            completed: Some(true),
            ..UpdateTodoRequest::default()
        };

        let error = update_todo(
            State(state),
            Path(TodoId::generate().to_string()),
            Ok(Json(request)),
        )
        .await
        .unwrap_err();

        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.error.message, "Todo not found");
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_todo_malformed_id_is_not_found(state: AppState) {
        let error = get_todo(State(state), Path("not-an-id".to_string()))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_todo_twice(state: AppState) {
        let item = state
            .todo_repository
            .create(NewTodo::new("Buy milk"))
            .await
            .unwrap();

        let Json(response) = delete_todo(State(state.clone()), Path(item.todo_id.to_string()))
            .await
            .unwrap();
        assert_eq!(response.message, "Todo deleted");

        let error = delete_todo(State(state), Path(item.todo_id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn test_health_check() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
    }
}
