//! API client used by the UI layer.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{CreateTodo, HttpTodoClient, TodoApi, TodoPage};
