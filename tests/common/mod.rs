//! Common test helpers for integration tests.
//!
//! # Note
//!
//! `#![allow(dead_code)]` is needed because each integration test file is
//! compiled as a separate crate and uses only part of these helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use futures::future::BoxFuture;

use todo_app::api::{AppState, create_router};
use todo_app::client::{ClientError, ClientResult, CreateTodo, TodoApi, TodoPage};
use todo_app::domain::{NewTodo, TodoId, TodoItem, TodoPatch};
use todo_app::infrastructure::{InMemoryTodoRepository, Pagination, TodoRepository};

// =============================================================================
// Server Helpers
// =============================================================================

/// Creates a test `AppState` backed by an in-memory repository.
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(InMemoryTodoRepository::new()))
}

/// Creates the full router over `state`.
pub fn create_test_app(state: &AppState) -> Router {
    create_router(state.clone())
}

/// Inserts `count` todos titled `Todo 0`, `Todo 1`, ... in that order.
pub async fn seed_todos(repository: &dyn TodoRepository, count: usize) -> Vec<TodoItem> {
    let mut items = Vec::with_capacity(count);
    for index in 0..count {
        items.push(
            repository
                .create(NewTodo::new(format!("Todo {index}")))
                .await
                .unwrap(),
        );
    }
    items
}

// =============================================================================
// Recording API
// =============================================================================

/// A call made through [`RecordingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List { page: u32, limit: u32 },
    Get(TodoId),
    Create(CreateTodo),
    Update(TodoId, TodoPatch),
    Delete(TodoId),
}

/// In-process `TodoApi` over an in-memory repository that records every
/// call.
///
/// Mirrors the server's rules: blank titles are rejected and unknown ids are
/// not found. `fail_writes` makes create, update and delete fail with the
/// given error.
#[derive(Debug, Clone, Default)]
pub struct RecordingApi {
    repository: InMemoryTodoRepository,
    calls: Arc<Mutex<Vec<ApiCall>>>,
    write_failure: Arc<Mutex<Option<ClientError>>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repository(&self) -> &InMemoryTodoRepository {
        &self.repository
    }

    pub async fn seed(&self, count: usize) -> Vec<TodoItem> {
        seed_todos(&self.repository, count).await
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(TodoId, TodoPatch)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::Update(id, patch) => Some((id, patch)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_writes(&self, error: ClientError) {
        *self.write_failure.lock().unwrap() = Some(error);
    }

    pub fn restore_writes(&self) {
        *self.write_failure.lock().unwrap() = None;
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_failure(&self) -> Option<ClientError> {
        self.write_failure.lock().unwrap().clone()
    }
}

fn store_error(error: impl std::fmt::Display) -> ClientError {
    ClientError::Server {
        status: 500,
        message: error.to_string(),
    }
}

fn not_found() -> ClientError {
    ClientError::NotFound("Todo not found".to_string())
}

fn title_required() -> ClientError {
    ClientError::Validation("Title is required".to_string())
}

impl TodoApi for RecordingApi {
    fn list(&self, page: u32, limit: u32) -> BoxFuture<'static, ClientResult<TodoPage>> {
        self.record(ApiCall::List { page, limit });
        let repository = self.repository.clone();
        Box::pin(async move {
            let result = repository
                .list(Pagination::for_page(page, limit))
                .await
                .map_err(store_error)?;
            Ok(TodoPage {
                total_pages: result.total_pages(),
                total_todos: result.total,
                todos: result.items,
                current_page: page,
            })
        })
    }

    fn get(&self, id: &TodoId) -> BoxFuture<'static, ClientResult<TodoItem>> {
        self.record(ApiCall::Get(id.clone()));
        let repository = self.repository.clone();
        let id = id.clone();
        Box::pin(async move {
            repository
                .find_by_id(&id)
                .await
                .map_err(store_error)?
                .ok_or_else(not_found)
        })
    }

    fn create(&self, todo: CreateTodo) -> BoxFuture<'static, ClientResult<TodoItem>> {
        self.record(ApiCall::Create(todo.clone()));
        let repository = self.repository.clone();
        let failure = self.write_failure();
        Box::pin(async move {
            if let Some(error) = failure {
                return Err(error);
            }
            if todo.title.trim().is_empty() {
                return Err(title_required());
            }
            repository.create(todo).await.map_err(store_error)
        })
    }

    fn update(
        &self,
        id: &TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'static, ClientResult<TodoItem>> {
        self.record(ApiCall::Update(id.clone(), patch.clone()));
        let repository = self.repository.clone();
        let failure = self.write_failure();
        let id = id.clone();
        Box::pin(async move {
            if let Some(error) = failure {
                return Err(error);
            }
            if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
                return Err(title_required());
            }
            repository
                .update(&id, patch)
                .await
                .map_err(store_error)?
                .ok_or_else(not_found)
        })
    }

    fn delete(&self, id: &TodoId) -> BoxFuture<'static, ClientResult<String>> {
        self.record(ApiCall::Delete(id.clone()));
        let repository = self.repository.clone();
        let failure = self.write_failure();
        let id = id.clone();
        Box::pin(async move {
            if let Some(error) = failure {
                return Err(error);
            }
            if repository.delete(&id).await.map_err(store_error)? {
                Ok("Todo deleted".to_string())
            } else {
                Err(not_found())
            }
        })
    }
}
