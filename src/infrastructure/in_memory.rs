//! In-memory repository implementation.
//!
//! Suitable for development and tests. Documents live in a `HashMap` behind
//! `Arc<RwLock<...>>`; each stored document also carries an insertion
//! sequence so that items created within the same clock tick still list in a
//! stable newest-first order.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{NewTodo, Timestamp, TodoId, TodoItem, TodoPatch};
use crate::infrastructure::{
    PaginatedResult, Pagination, RepositoryError, RepositoryResult, TodoRepository,
};

/// A stored document plus its insertion sequence.
#[derive(Debug, Clone)]
struct StoredTodo {
    sequence: u64,
    item: TodoItem,
}

#[derive(Debug, Default)]
struct Collection {
    documents: HashMap<TodoId, StoredTodo>,
    next_sequence: u64,
}

/// In-memory implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = InMemoryTodoRepository::new();
/// let item = repository.create(NewTodo::new("Buy milk")).await?;
/// let found = repository.find_by_id(&item.todo_id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    collection: Arc<RwLock<Collection>>,
}

impl InMemoryTodoRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TodoRepository for InMemoryTodoRepository {
    fn create(&self, todo: NewTodo) -> BoxFuture<'static, RepositoryResult<TodoItem>> {
        let collection = Arc::clone(&self.collection);
        Box::pin(async move {
            let item = todo.into_item(TodoId::generate(), Timestamp::now());
            let mut guard = collection.write().await;
            let sequence = guard.next_sequence;
            guard.next_sequence += 1;
            guard.documents.insert(
                item.todo_id.clone(),
                StoredTodo {
                    sequence,
                    item: item.clone(),
                },
            );
            Ok(item)
        })
    }

    fn find_by_id(&self, id: &TodoId) -> BoxFuture<'static, RepositoryResult<Option<TodoItem>>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        Box::pin(async move {
            let guard = collection.read().await;
            Ok(guard.documents.get(&id).map(|stored| stored.item.clone()))
        })
    }

    fn list(
        &self,
        pagination: Pagination,
    ) -> BoxFuture<'static, RepositoryResult<PaginatedResult<TodoItem>>> {
        let collection = Arc::clone(&self.collection);
        Box::pin(async move {
            let guard = collection.read().await;
            let mut documents: Vec<&StoredTodo> = guard.documents.values().collect();
            documents.sort_by(|left, right| {
                right
                    .item
                    .created_at
                    .cmp(&left.item.created_at)
                    .then_with(|| right.sequence.cmp(&left.sequence))
            });

            let total = documents.len() as u64;
            let offset = usize::try_from(pagination.offset).map_err(|_| {
                RepositoryError::DatabaseError(format!(
                    "offset {} out of range",
                    pagination.offset
                ))
            })?;
            let items = documents
                .into_iter()
                .skip(offset)
                .take(pagination.limit as usize)
                .map(|stored| stored.item.clone())
                .collect();

            Ok(PaginatedResult::new(items, total, pagination))
        })
    }

    fn update(
        &self,
        id: &TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'static, RepositoryResult<Option<TodoItem>>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        Box::pin(async move {
            let mut guard = collection.write().await;
            let Some(stored) = guard.documents.get_mut(&id) else {
                return Ok(None);
            };
            stored.item = stored.item.clone().apply(&patch, Timestamp::now());
            Ok(Some(stored.item.clone()))
        })
    }

    fn delete(&self, id: &TodoId) -> BoxFuture<'static, RepositoryResult<bool>> {
        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        Box::pin(async move {
            let mut guard = collection.write().await;
            Ok(guard.documents.remove(&id).is_some())
        })
    }

    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>> {
        let collection = Arc::clone(&self.collection);
        Box::pin(async move {
            let guard = collection.read().await;
            Ok(guard.documents.len() as u64)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
