//! The API client seam and its HTTP implementation.

use futures::future::BoxFuture;
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};

use super::config::ClientConfig;
use super::error::{ClientError, ClientResult};
use crate::api::dto::{
    CreateTodoRequest, DeleteResponse, TodoListResponse, TodoResponse, UpdateTodoRequest,
};
use crate::domain::{NewTodo, TodoId, TodoItem, TodoPatch};

/// Input for [`TodoApi::create`].
pub type CreateTodo = NewTodo;

/// One page of todos as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPage {
    pub todos: Vec<TodoItem>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total_todos: u64,
}

impl From<TodoListResponse> for TodoPage {
    fn from(response: TodoListResponse) -> Self {
        Self {
            todos: response.todos.into_iter().map(TodoItem::from).collect(),
            total_pages: response.total_pages,
            current_page: response.current_page,
            total_todos: response.total_todos,
        }
    }
}

/// Operations the UI needs from the server.
///
/// Each call is a single round trip with no retry.
pub trait TodoApi: Send + Sync {
    fn list(&self, page: u32, limit: u32) -> BoxFuture<'static, ClientResult<TodoPage>>;

    fn get(&self, id: &TodoId) -> BoxFuture<'static, ClientResult<TodoItem>>;

    fn create(&self, todo: CreateTodo) -> BoxFuture<'static, ClientResult<TodoItem>>;

    fn update(&self, id: &TodoId, patch: TodoPatch)
    -> BoxFuture<'static, ClientResult<TodoItem>>;

    /// Returns the server's confirmation message.
    fn delete(&self, id: &TodoId) -> BoxFuture<'static, ClientResult<String>>;
}

/// `reqwest` implementation of [`TodoApi`].
#[derive(Debug, Clone)]
pub struct HttpTodoClient {
    client: Client,
    base_url: String,
}

impl HttpTodoClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl TodoApi for HttpTodoClient {
    fn list(&self, page: u32, limit: u32) -> BoxFuture<'static, ClientResult<TodoPage>> {
        let request = self
            .client
            .get(self.url(&format!("/todos?page={page}&limit={limit}")));
        Box::pin(async move {
            let response: TodoListResponse = parse_response(request.send().await?).await?;
            Ok(TodoPage::from(response))
        })
    }

    fn get(&self, id: &TodoId) -> BoxFuture<'static, ClientResult<TodoItem>> {
        let request = self.client.get(self.url(&format!("/todos/{id}")));
        Box::pin(async move {
            let response: TodoResponse = parse_response(request.send().await?).await?;
            Ok(TodoItem::from(response))
        })
    }

    fn create(&self, todo: CreateTodo) -> BoxFuture<'static, ClientResult<TodoItem>> {
        let body = CreateTodoRequest {
            title: Some(todo.title),
            description: todo.description,
            completed: todo.completed,
        };
        let request = self.client.post(self.url("/todos")).json(&body);
        Box::pin(async move {
            let response: TodoResponse = parse_response(request.send().await?).await?;
            Ok(TodoItem::from(response))
        })
    }

    fn update(
        &self,
        id: &TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'static, ClientResult<TodoItem>> {
        let body = UpdateTodoRequest::from(patch);
        let request = self
            .client
            .put(self.url(&format!("/todos/{id}")))
            .json(&body);
        Box::pin(async move {
            let response: TodoResponse = parse_response(request.send().await?).await?;
            Ok(TodoItem::from(response))
        })
    }

    fn delete(&self, id: &TodoId) -> BoxFuture<'static, ClientResult<String>> {
        let request = self.client.delete(self.url(&format!("/todos/{id}")));
        Box::pin(async move {
            let response: DeleteResponse = parse_response(request.send().await?).await?;
            Ok(response.message)
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();

    if status.is_success() {
        return response.json().await.map_err(ClientError::from);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status.as_u16(), &body);
    tracing::warn!(status = status.as_u16(), %message, "API request failed");
    Err(ClientError::from_status(status.as_u16(), message))
}

/// Extracts `message` from an error body, falling back to the status reason.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("Request failed")
                .to_string()
        },
        |error| error.message,
    )
}
