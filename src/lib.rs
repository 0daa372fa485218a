//! Todo App Library
//!
//! A paginated todo list: a REST API over a document store, an HTTP client
//! for it, and a UI core (controller, timers and view models) with debounced
//! auto-save.

pub mod api;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod ui;
