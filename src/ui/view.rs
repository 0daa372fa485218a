//! View models.
//!
//! Plain data derived from [`ControllerState`]; a renderer only needs to draw
//! these and forward user events back as actions.

use super::controller::{ControllerState, Mode};
use super::rich_text::RichText;
use crate::domain::{Timestamp, TodoId, TodoItem};

pub const EMPTY_LIST_MESSAGE: &str = "No todos found. Add a new one to get started!";
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this todo?";

const CREATED_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

// =============================================================================
// List View
// =============================================================================

/// One row of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: TodoId,
    pub title: String,
    /// Description as plain text.
    pub preview: String,
    pub completed: bool,
    pub badge: &'static str,
    pub created_label: String,
    pub selected: bool,
}

impl RowView {
    fn new(item: &TodoItem, selected: Option<&TodoId>) -> Self {
        Self {
            id: item.todo_id.clone(),
            title: item.title.clone(),
            preview: RichText::new(item.description.clone()).plain_text(),
            completed: item.completed,
            badge: if item.completed { "Completed" } else { "Pending" },
            created_label: created_label(item.created_at),
            selected: selected == Some(&item.todo_id),
        }
    }
}

fn created_label(created_at: Timestamp) -> String {
    format!("Created: {}", created_at.as_datetime().format(CREATED_FORMAT))
}

/// Pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: u64,
    pub first_enabled: bool,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub last_enabled: bool,
    pub label: String,
}

impl PaginationView {
    #[must_use]
    pub fn new(current_page: u32, total_pages: u64) -> Self {
        let total_pages = total_pages.max(1);
        let has_previous = current_page > 1;
        let has_next = u64::from(current_page) < total_pages;
        Self {
            current_page,
            total_pages,
            first_enabled: has_previous,
            previous_enabled: has_previous,
            next_enabled: has_next,
            last_enabled: has_next,
            label: format!("Page {current_page} of {total_pages}"),
        }
    }
}

/// The list panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<RowView>,
    /// Shown instead of rows when the page is empty and nothing is loading.
    pub empty_message: Option<&'static str>,
    pub pagination: PaginationView,
    pub loading: bool,
    pub banner: Option<String>,
}

impl ListView {
    #[must_use]
    pub fn from_state(state: &ControllerState) -> Self {
        let rows: Vec<RowView> = state
            .todos
            .iter()
            .map(|item| RowView::new(item, state.selected.as_ref()))
            .collect();
        let empty_message = (rows.is_empty() && !state.loading).then_some(EMPTY_LIST_MESSAGE);
        Self {
            rows,
            empty_message,
            pagination: PaginationView::new(state.current_page, state.total_pages),
            loading: state.loading,
            banner: state.banner.clone(),
        }
    }
}

// =============================================================================
// Form View
// =============================================================================

/// The form panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub title: String,
    pub description: RichText,
    pub completed: bool,
    /// Cancel and delete only apply to an existing item.
    pub show_cancel: bool,
    pub show_delete: bool,
    pub status: Option<&'static str>,
    pub submit_disabled: bool,
    pub alert: Option<String>,
}

impl FormView {
    #[must_use]
    pub fn from_state(state: &ControllerState) -> Self {
        let form = &state.form;
        let editing = form.is_editing();
        Self {
            heading: if editing { "Edit Todo" } else { "Add New Todo" },
            submit_label: if editing { "Update" } else { "Add Todo" },
            title: form.title.clone(),
            description: form.description.clone(),
            completed: form.completed,
            show_cancel: editing,
            show_delete: editing,
            status: form.status.label(),
            submit_disabled: form.save_in_flight || state.mode == Mode::Submitting,
            alert: form.alert.clone(),
        }
    }
}
