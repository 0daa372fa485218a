//! Data Transfer Objects for API requests and responses.
//!
//! The wire format uses camelCase keys. The same types are used by the HTTP
//! client, so responses derive both `Serialize` and `Deserialize`.

use serde::{Deserialize, Deserializer, Serialize};

use super::error::ValidationError;
use crate::domain::{NewTodo, Timestamp, TodoId, TodoItem, TodoPatch};

/// Default page size for `GET /todos`.
pub const DEFAULT_PAGE_SIZE: u32 = 8;

/// Upper bound for the `limit` query parameter.
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// Todo DTOs
// =============================================================================

/// Request DTO for creating a todo.
///
/// `title` is optional at the serde level so that a missing title becomes a
/// validation error (400) instead of a deserialization rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl CreateTodoRequest {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Validates the request and converts it into domain input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the title is missing or blank.
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        let title = validate_title(self.title.as_deref().unwrap_or_default())?;
        Ok(NewTodo {
            title,
            description: self.description,
            completed: self.completed,
        })
    }
}

/// Request DTO for updating a todo. Every field is optional.
///
/// `description` distinguishes three cases: key absent (unchanged), `null`
/// (cleared) and a string (replaced).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodoRequest {
    /// Validates the request and converts it into a patch.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when a title is present but blank.
    pub fn validate(self) -> Result<TodoPatch, ValidationError> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        Ok(TodoPatch {
            title,
            description: self.description.map(Option::unwrap_or_default),
            completed: self.completed,
        })
    }
}

impl From<TodoPatch> for UpdateTodoRequest {
    fn from(patch: TodoPatch) -> Self {
        Self {
            title: patch.title,
            description: patch.description.map(Some),
            completed: patch.completed,
        }
    }
}

/// Marks a present key as `Some`, even when its value is `null`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Response DTO for a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TodoItem> for TodoResponse {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.todo_id,
            title: item.title,
            description: item.description,
            completed: item.completed,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<TodoResponse> for TodoItem {
    fn from(response: TodoResponse) -> Self {
        Self {
            todo_id: response.id,
            title: response.title,
            description: response.description,
            completed: response.completed,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}

/// Response DTO for `GET /todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListResponse {
    pub todos: Vec<TodoResponse>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total_todos: u64,
}

/// Response DTO for `DELETE /todos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for `GET /todos`.
///
/// Kept as raw strings: malformed values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTodosQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListTodosQuery {
    /// Resolves `(page, limit)`: page defaults to 1, limit to `default_limit`
    /// and is capped at [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn resolve(&self, default_limit: u32) -> (u32, u32) {
        let page = parse_leading_integer(self.page.as_deref()).map_or(1, |page| page.max(1));
        let limit = parse_leading_integer(self.limit.as_deref())
            .filter(|limit| *limit > 0)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE);
        (page, limit)
    }
}

/// Reads the leading decimal digits of a parameter.
///
/// `"2"` and `"2abc"` give 2; zero, negative and non-numeric input give
/// `None`.
fn parse_leading_integer(raw: Option<&str>) -> Option<u32> {
    let trimmed = raw?.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let digits = &trimmed[..digits_end];
    if digits.is_empty() {
        return None;
    }
    // Saturate instead of failing on huge values.
    let value = digits.parse::<u32>().unwrap_or(u32::MAX);
    (value > 0).then_some(value)
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a todo title.
///
/// # Errors
///
/// Returns `ValidationError` if the title is empty or whitespace only. The
/// title is returned unchanged otherwise.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::single("title", "Title is required"));
    }
    Ok(title.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_create_request_defaults() {
        let request: CreateTodoRequest = serde_json::from_str(r#"{"title":"Buy milk"}"#).unwrap();
        let todo = request.validate().unwrap();

        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, None);
        assert_eq!(todo.completed, None);
    }

    #[rstest]
    #[case(r"{}")]
    #[case(r#"{"title":""}"#)]
    #[case(r#"{"title":"   "}"#)]
    #[case(r#"{"title":null}"#)]
    fn test_create_request_requires_title(#[case] body: &str) {
        let request: CreateTodoRequest = serde_json::from_str(body).unwrap();
        let error = request.validate().unwrap_err();
        assert_eq!(error.errors[0].field, "title");
    }

    #[rstest]
    fn test_update_request_absent_description_is_unchanged() {
        let request: UpdateTodoRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        let patch = request.validate().unwrap();

        assert_eq!(patch.description, None);
        assert_eq!(patch.completed, Some(true));
    }

    #[rstest]
    #[case(r#"{"description":""}"#)]
    #[case(r#"{"description":null}"#)]
    fn test_update_request_clears_description(#[case] body: &str) {
        let request: UpdateTodoRequest = serde_json::from_str(body).unwrap();
        let patch = request.validate().unwrap();

        assert_eq!(patch.description, Some(String::new()));
    }

    #[rstest]
    fn test_update_request_rejects_blank_title() {
        let request: UpdateTodoRequest = serde_json::from_str(r#"{"title":" "}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[rstest]
    fn test_update_request_from_patch_serializes_only_present_fields() {
        let patch = TodoPatch {
            description: Some(String::new()),
            ..TodoPatch::default()
        };

        let json = serde_json::to_value(UpdateTodoRequest::from(patch)).unwrap();

        assert_eq!(json, serde_json::json!({ "description": "" }));
    }

    #[rstest]
    fn test_todo_response_uses_camel_case() {
        let item = NewTodo::new("Buy milk").into_item(TodoId::generate(), Timestamp::now());
        let json = serde_json::to_value(TodoResponse::from(item.clone())).unwrap();

        assert_eq!(json["id"], item.todo_id.to_string());
        assert_eq!(json["description"], "");
        assert_eq!(json["completed"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[rstest]
    #[case(None, None, (1, 8))]
    #[case(Some("2"), Some("8"), (2, 8))]
    #[case(Some("0"), Some("0"), (1, 8))]
    #[case(Some("-3"), Some("abc"), (1, 8))]
    #[case(Some("3x"), Some("5"), (3, 5))]
    #[case(Some("1"), Some("1000"), (1, MAX_PAGE_SIZE))]
    fn test_list_query_resolve(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] expected: (u32, u32),
    ) {
        let query = ListTodosQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        };
        assert_eq!(query.resolve(DEFAULT_PAGE_SIZE), expected);
    }
}
