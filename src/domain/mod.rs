//! Domain module for the todo list.
//!
//! This module contains the todo entity, its value objects and the patch
//! type used for partial updates.

pub mod todo;

pub use todo::{NewTodo, Timestamp, TodoId, TodoItem, TodoPatch};
