//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use dto::{
    CreateTodoRequest, DeleteResponse, ListTodosQuery, TodoListResponse, TodoResponse,
    UpdateTodoRequest,
};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use handlers::{AppConfig, AppState, HealthResponse, health_check};
pub use routes::create_router;
pub use server::ServerConfig;
