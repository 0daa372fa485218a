//! `PostgreSQL` repository implementation.
//!
//! Todos are stored as JSONB documents, one row per todo. The `created_at`
//! column duplicates the document field so the default ordering can use an
//! index.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todos (
//!     id UUID PRIMARY KEY,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at DESC, id DESC);
//! ```

use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::domain::{NewTodo, Timestamp, TodoId, TodoItem, TodoPatch};
use crate::infrastructure::{
    PaginatedResult, Pagination, RepositoryError, RepositoryResult, TodoRepository,
};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (
    id UUID PRIMARY KEY,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at DESC, id DESC)";

fn database_error(error: &sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn serialize(item: &TodoItem) -> RepositoryResult<serde_json::Value> {
    serde_json::to_value(item).map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

fn deserialize(data: serde_json::Value) -> RepositoryResult<TodoItem> {
    serde_json::from_value(data)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

/// `PostgreSQL` implementation of `TodoRepository`.
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/todos").await?;
/// let repository = PostgresTodoRepository::new(pool);
/// repository.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// Creates a repository over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `todos` table and its ordering index when missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if a DDL statement fails.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        Ok(())
    }
}

impl TodoRepository for PostgresTodoRepository {
    fn create(&self, todo: NewTodo) -> BoxFuture<'static, RepositoryResult<TodoItem>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let item = todo.into_item(TodoId::generate(), Timestamp::now());
            let data = serialize(&item)?;

            sqlx::query(
                "INSERT INTO todos (id, data, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(item.todo_id.as_uuid())
            .bind(&data)
            .bind(item.created_at.as_datetime())
            .bind(item.updated_at.as_datetime())
            .execute(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Ok(item)
        })
    }

    fn find_by_id(&self, id: &TodoId) -> BoxFuture<'static, RepositoryResult<Option<TodoItem>>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM todos WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&pool)
                    .await
                    .map_err(|error| database_error(&error))?;

            row.map(|(data,)| deserialize(data)).transpose()
        })
    }

    fn list(
        &self,
        pagination: Pagination,
    ) -> BoxFuture<'static, RepositoryResult<PaginatedResult<TodoItem>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let count_row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
                .fetch_one(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            #[allow(clippy::cast_sign_loss)]
            let total = count_row.0 as u64;

            if total == 0 {
                return Ok(PaginatedResult::new(vec![], 0, pagination));
            }

            let offset = i64::try_from(pagination.offset).map_err(|_| {
                RepositoryError::DatabaseError(format!(
                    "offset {} out of range",
                    pagination.offset
                ))
            })?;
            let limit = i64::from(pagination.limit);

            let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
                "SELECT data FROM todos ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            let items = rows
                .into_iter()
                .map(|(data,)| deserialize(data))
                .collect::<RepositoryResult<Vec<_>>>()?;

            Ok(PaginatedResult::new(items, total, pagination))
        })
    }

    fn update(
        &self,
        id: &TodoId,
        patch: TodoPatch,
    ) -> BoxFuture<'static, RepositoryResult<Option<TodoItem>>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move {
            // Read-modify-write without a version check: last write wins.
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM todos WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&pool)
                    .await
                    .map_err(|error| database_error(&error))?;

            let Some((data,)) = row else {
                return Ok(None);
            };

            let updated = deserialize(data)?.apply(&patch, Timestamp::now());
            let data = serialize(&updated)?;

            let result = sqlx::query("UPDATE todos SET data = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(&data)
                .bind(updated.updated_at.as_datetime())
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            if result.rows_affected() == 0 {
                // Deleted between the read and the write.
                return Ok(None);
            }

            Ok(Some(updated))
        })
    }

    fn delete(&self, id: &TodoId) -> BoxFuture<'static, RepositoryResult<bool>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM todos WHERE id = $1")
                .bind(id)
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn count(&self) -> BoxFuture<'static, RepositoryResult<u64>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
                .fetch_one(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            #[allow(clippy::cast_sign_loss)]
            Ok(row.0 as u64)
        })
    }
}
