//! Infrastructure module for persistence.
//!
//! This module contains the repository contract, its in-memory and
//! `PostgreSQL` implementations, and the factory that picks one at startup.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTodoRepository;
pub use postgres::PostgresTodoRepository;
pub use repository::{
    PaginatedResult, Pagination, RepositoryError, RepositoryResult, TodoRepository, total_pages,
};
