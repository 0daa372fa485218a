//! Form state: the fields being edited plus auto-save bookkeeping.

use super::rich_text::RichText;
use crate::domain::{NewTodo, TodoId, TodoItem, TodoPatch};

/// Identity of one population of the form.
///
/// A new instance is issued on every selection change, cancel and successful
/// submit. Timers and save results carry the instance they were started for
/// and are ignored once it is no longer current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormInstance(u64);

impl FormInstance {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Transient auto-save status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed,
}

impl SaveStatus {
    /// Text shown next to the form, if any.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Saving => Some("Saving..."),
            Self::Saved => Some("Saved"),
            Self::Failed => Some("Save failed"),
        }
    }
}

/// A change coming from one of the form controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Title(String),
    Description(RichText),
    Completed(bool),
}

/// Contents of the form and its auto-save state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub instance: FormInstance,
    /// The item being edited, `None` for a new-item form.
    pub editing: Option<TodoId>,
    pub title: String,
    pub description: RichText,
    pub completed: bool,
    pub status: SaveStatus,
    /// Blocking message shown before submit, e.g. a missing title.
    pub alert: Option<String>,
    pub save_in_flight: bool,
    /// Another auto-save is due once the in-flight one finishes.
    pub save_queued: bool,
}

impl FormState {
    /// An empty form for entering a new item.
    #[must_use]
    pub fn blank(instance: FormInstance) -> Self {
        Self {
            instance,
            editing: None,
            title: String::new(),
            description: RichText::default(),
            completed: false,
            status: SaveStatus::Idle,
            alert: None,
            save_in_flight: false,
            save_queued: false,
        }
    }

    /// A form populated from an existing item.
    #[must_use]
    pub fn for_item(instance: FormInstance, item: &TodoItem) -> Self {
        Self {
            editing: Some(item.todo_id.clone()),
            title: item.title.clone(),
            description: RichText::new(item.description.clone()),
            completed: item.completed,
            ..Self::blank(instance)
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    #[must_use]
    pub fn title_is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }

    /// Applies an edit. Returns `false` when the value did not change.
    pub fn apply(&mut self, edit: FieldEdit) -> bool {
        match edit {
            FieldEdit::Title(title) if title != self.title => self.title = title,
            FieldEdit::Description(description) if description != self.description => {
                self.description = description;
            }
            FieldEdit::Completed(completed) if completed != self.completed => {
                self.completed = completed;
            }
            _ => return false,
        }
        true
    }

    /// Patch carrying every editable field.
    #[must_use]
    pub fn patch(&self) -> TodoPatch {
        TodoPatch::full(
            self.title.clone(),
            self.description.as_markup(),
            self.completed,
        )
    }

    /// Create input from the current fields.
    #[must_use]
    pub fn new_todo(&self) -> NewTodo {
        NewTodo {
            title: self.title.clone(),
            description: Some(self.description.as_markup().to_string()),
            completed: Some(self.completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;
    use rstest::rstest;

    fn item() -> TodoItem {
        TodoItem::new(TodoId::generate(), "Write report", Timestamp::now())
            .with_description("<p>draft</p>")
            .with_completed(true)
    }

    #[rstest]
    fn test_for_item_populates_fields() {
        let item = item();
        let form = FormState::for_item(FormInstance::new(3), &item);

        assert_eq!(form.editing, Some(item.todo_id));
        assert_eq!(form.title, "Write report");
        assert_eq!(form.description.as_markup(), "<p>draft</p>");
        assert!(form.completed);
        assert_eq!(form.status, SaveStatus::Idle);
    }

    #[rstest]
    #[case(FieldEdit::Title("Write report".to_string()), false)]
    #[case(FieldEdit::Title("Write summary".to_string()), true)]
    #[case(FieldEdit::Description(RichText::new("<p>draft</p>")), false)]
    #[case(FieldEdit::Completed(true), false)]
    #[case(FieldEdit::Completed(false), true)]
    fn test_apply_reports_changes(#[case] edit: FieldEdit, #[case] changed: bool) {
        let mut form = FormState::for_item(FormInstance::new(1), &item());
        assert_eq!(form.apply(edit), changed);
    }

    #[rstest]
    #[case("", true)]
    #[case("  ", true)]
    #[case("a", false)]
    fn test_title_is_blank(#[case] title: &str, #[case] blank: bool) {
        let mut form = FormState::blank(FormInstance::new(1));
        form.title = title.to_string();
        assert_eq!(form.title_is_blank(), blank);
    }

    #[rstest]
    fn test_status_labels() {
        assert_eq!(SaveStatus::Idle.label(), None);
        assert_eq!(SaveStatus::Saving.label(), Some("Saving..."));
        assert_eq!(SaveStatus::Saved.label(), Some("Saved"));
        assert_eq!(SaveStatus::Failed.label(), Some("Save failed"));
    }
}
