//! Todo domain model.
//!
//! A todo is a flat document: no relationships, no version token. Updates are
//! expressed as a [`TodoPatch`] where every absent field means "unchanged".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a todo item.
///
/// Assigned by the store on creation and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a `TodoId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new time-ordered `TodoId` (UUID v7).
    ///
    /// **Note**: This is an impure function (side effect: time + random).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses an identifier received from the outside world.
    ///
    /// Returns `None` for anything that is not a UUID; callers treat that the
    /// same as an unknown id.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_rfc3339())
    }
}

// =============================================================================
// Todo Item
// =============================================================================

/// The single persisted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Store-assigned identifier.
    pub todo_id: TodoId,
    /// Non-empty title.
    pub title: String,
    /// Rich-text markup. Never absent; empty string when unset.
    pub description: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation time, used for the default list order.
    pub created_at: Timestamp,
    /// Time of the last successful update.
    pub updated_at: Timestamp,
}

impl TodoItem {
    /// Creates a new todo with default `description` and `completed`.
    #[must_use]
    pub fn new(todo_id: TodoId, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            todo_id,
            title: title.into(),
            description: String::new(),
            completed: false,
            created_at,
            updated_at: created_at,
        }
    }

    /// Returns a copy with the given description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    /// Returns a copy with the given completion flag.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Applies a patch. Fields absent from the patch are left untouched.
    ///
    /// This is a pure function; the caller supplies the update time.
    #[must_use]
    pub fn apply(self, patch: &TodoPatch, updated_at: Timestamp) -> Self {
        Self {
            title: patch.title.clone().unwrap_or(self.title),
            description: patch.description.clone().unwrap_or(self.description),
            completed: patch.completed.unwrap_or(self.completed),
            updated_at,
            ..self
        }
    }
}

/// Input for creating a todo. Defaults are applied by [`NewTodo::into_item`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl NewTodo {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builds the stored item from store-assigned identity and time.
    #[must_use]
    pub fn into_item(self, todo_id: TodoId, created_at: Timestamp) -> TodoItem {
        TodoItem::new(todo_id, self.title, created_at)
            .with_description(self.description.unwrap_or_default())
            .with_completed(self.completed.unwrap_or(false))
    }
}

/// Partial update of a todo.
///
/// `description: Some(String::new())` clears the description, which is
/// different from `description: None` (leave it alone).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// A patch that sets all three editable fields.
    #[must_use]
    pub fn full(title: impl Into<String>, description: impl Into<String>, completed: bool) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            completed: Some(completed),
        }
    }

    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================
