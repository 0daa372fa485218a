//! Repository trait for todo documents.
//!
//! Every operation returns a boxed `'static` future so that implementations
//! clone their handles into the future and the trait stays object safe.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{NewTodo, TodoId, TodoItem, TodoPatch};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result alias for repository futures.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// =============================================================================
// Pagination
// =============================================================================

/// Offset/limit window over the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of items to skip.
    pub offset: u64,
    /// Maximum number of items to return.
    pub limit: u32,
}

impl Pagination {
    /// Creates pagination from a raw offset and limit.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is 0.
    #[must_use]
    pub const fn new(offset: u64, limit: u32) -> Self {
        assert!(limit > 0, "limit must be greater than 0");
        Self { offset, limit }
    }

    /// Creates pagination for a 1-indexed page: `offset = (page - 1) * limit`.
    ///
    /// Page 0 is treated as page 1.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is 0.
    #[must_use]
    pub const fn for_page(page: u32, limit: u32) -> Self {
        let skipped_pages = page.saturating_sub(1) as u64;
        Self::new(skipped_pages.saturating_mul(limit as u64), limit)
    }
}

/// A page of items together with the collection size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResult<T> {
    /// The items in the requested window.
    pub items: Vec<T>,
    /// Total number of items in the collection.
    pub total: u64,
    /// The window that produced `items`.
    pub pagination: Pagination,
}

impl<T> PaginatedResult<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            pagination,
        }
    }

    /// Returns `ceil(total / limit)`; 0 for an empty collection.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        total_pages(self.total, self.pagination.limit)
    }
}

/// `ceil(total / limit)`, with a zero limit yielding zero pages.
#[must_use]
pub const fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit as u64)
}

// =============================================================================
// Todo Repository
// =============================================================================

/// Persistence contract for todo items.
///
/// Each call is atomic for a single document only; there are no transactions
/// spanning calls and concurrent updates are last-write-wins.
pub trait TodoRepository: Send + Sync {
    /// Stores a new todo, assigning its id and timestamps.
    fn create(&self, todo: NewTodo) -> BoxFuture<'static, RepositoryResult<TodoItem>>;

    /// Finds a todo by id. `Ok(None)` when it does not exist.
    fn find_by_id(&self, id: &TodoId) -> BoxFuture<'static, RepositoryResult<Option<TodoItem>>>;

    /// Lists todos ordered by creation time, newest first.
    fn list(
        &self,
        pagination: Pagination,
    ) -> BoxFuture<'static, RepositoryResult<PaginatedResult<TodoItem>>>;

    /// Applies a partial update. `Ok(None)` when the todo does not exist.
    fn update(
        &self,
        id: &TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'static, RepositoryResult<Option<TodoItem>>>;

    /// Hard-deletes a todo. `Ok(false)` when it did not exist.
    fn delete(&self, id: &TodoId) -> BoxFuture<'static, RepositoryResult<bool>>;

    /// Counts all todos.
    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>>;
}

// =============================================================================
// Tests
// =============================================================================
