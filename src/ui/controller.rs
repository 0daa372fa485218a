//! List/form controller.
//!
//! The controller is a pure state machine: [`Controller::handle`] applies one
//! [`Action`] to [`ControllerState`] and returns the [`Command`]s the driver
//! must execute. It performs no I/O and never waits, so every transition can
//! be tested without a runtime.
//!
//! Two counters keep late results from doing damage:
//! - every page fetch bumps `generation`, and `PageLoaded` carrying an older
//!   generation is dropped;
//! - every selection change, cancel and successful submit issues a fresh
//!   [`FormInstance`], and timers or auto-save results for an older instance
//!   are ignored.

use std::time::Duration;

use super::form::{FieldEdit, FormInstance, FormState, SaveStatus};
use super::timer::TimerSlot;
use crate::client::{ClientError, ClientResult, CreateTodo, TodoPage};
use crate::domain::{TodoId, TodoItem, TodoPatch};
use crate::infrastructure::total_pages;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load todos. Please try again later.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save todo. Please try again.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete todo. Please try again.";
pub const TITLE_REQUIRED_MESSAGE: &str = "Title is required";

// =============================================================================
// Configuration
// =============================================================================

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub page_size: u32,
    /// Quiet period after the last edit before an auto-save.
    pub auto_save_delay: Duration,
    /// How long `Saved` stays visible.
    pub status_clear_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: 8,
            auto_save_delay: Duration::from_secs(1),
            status_clear_delay: Duration::from_secs(2),
        }
    }
}

// =============================================================================
// State
// =============================================================================

/// What the controller is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No selection; the form is for a new item.
    #[default]
    Browsing,
    /// An existing item is selected and auto-save is armed.
    Editing,
    /// An explicit create or update is in flight.
    Submitting,
    /// A delete is in flight.
    Deleting,
}

impl Mode {
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Submitting | Self::Deleting)
    }
}

/// Everything the views render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    /// Items of the current page, newest first.
    pub todos: Vec<TodoItem>,
    pub current_page: u32,
    /// Never below 1, even for an empty list.
    pub total_pages: u64,
    pub total_todos: u64,
    pub limit: u32,
    pub selected: Option<TodoId>,
    pub form: FormState,
    pub mode: Mode,
    /// Dismissible error banner.
    pub banner: Option<String>,
    pub loading: bool,
    /// Generation of the latest page fetch.
    pub generation: u64,
}

impl ControllerState {
    fn new(limit: u32) -> Self {
        Self {
            todos: Vec::new(),
            current_page: 1,
            total_pages: 1,
            total_todos: 0,
            limit,
            selected: None,
            form: FormState::blank(FormInstance::new(0)),
            mode: Mode::Browsing,
            banner: None,
            loading: false,
            generation: 0,
        }
    }

    /// Looks up an item of the current page.
    #[must_use]
    pub fn find(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|item| &item.todo_id == id)
    }

    fn replace(&mut self, item: TodoItem) {
        if let Some(slot) = self
            .todos
            .iter_mut()
            .find(|existing| existing.todo_id == item.todo_id)
        {
            *slot = item;
        }
    }

    /// Like `replace`, but keeps the entry if it was updated after `item`.
    fn merge(&mut self, item: TodoItem) {
        if let Some(slot) = self
            .todos
            .iter_mut()
            .find(|existing| existing.todo_id == item.todo_id)
            && slot.updated_at <= item.updated_at
        {
            *slot = item;
        }
    }

    fn remove(&mut self, id: &TodoId) -> bool {
        let before = self.todos.len();
        self.todos.retain(|item| &item.todo_id != id);
        let removed = self.todos.len() < before;
        if removed {
            self.total_todos = self.total_todos.saturating_sub(1);
            self.total_pages = total_pages(self.total_todos, self.limit).max(1);
        }
        removed
    }

    /// Mode to return to when nothing is in flight.
    const fn resting_mode(&self) -> Mode {
        if self.form.is_editing() {
            Mode::Editing
        } else {
            Mode::Browsing
        }
    }
}

// =============================================================================
// Actions and Commands
// =============================================================================

/// Inputs: user intents, timer expiries and API results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PageLoaded {
        generation: u64,
        result: ClientResult<TodoPage>,
    },
    ChangePage(u32),
    Refresh,
    Select(TodoId),
    Edit(FieldEdit),
    AutoSaveElapsed {
        instance: FormInstance,
    },
    AutoSaveFinished {
        instance: FormInstance,
        result: ClientResult<TodoItem>,
    },
    StatusClearElapsed {
        instance: FormInstance,
    },
    Submit,
    /// `id` is the updated item, `None` for a create.
    SubmitFinished {
        id: Option<TodoId>,
        result: ClientResult<TodoItem>,
    },
    Cancel,
    /// A delete the user has already confirmed.
    Delete(TodoId),
    DeleteFinished {
        id: TodoId,
        result: ClientResult<String>,
    },
    DismissBanner,
    DismissAlert,
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchPage {
        generation: u64,
        page: u32,
        limit: u32,
    },
    Create {
        todo: CreateTodo,
    },
    Update {
        id: TodoId,
        patch: TodoPatch,
    },
    AutoSave {
        instance: FormInstance,
        id: TodoId,
        patch: TodoPatch,
    },
    Delete {
        id: TodoId,
    },
    ScheduleTimer {
        slot: TimerSlot,
        delay: Duration,
    },
    CancelTimer {
        slot: TimerSlot,
    },
}

// =============================================================================
// Controller
// =============================================================================

/// Owns [`ControllerState`] and applies actions to it.
#[derive(Debug, Clone)]
pub struct Controller {
    config: ControllerConfig,
    state: ControllerState,
    next_instance: u64,
}

impl Controller {
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            state: ControllerState::new(config.page_size),
            next_instance: 1,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ControllerState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Enters `Browsing` and loads page 1.
    pub fn start(&mut self) -> Vec<Command> {
        self.state.mode = Mode::Browsing;
        self.state.current_page = 1;
        vec![self.fetch_current_page()]
    }

    /// Applies one action and returns the commands it produces.
    pub fn handle(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::PageLoaded { generation, result } => self.page_loaded(generation, result),
            Action::ChangePage(page) => self.change_page(page),
            Action::Refresh => self.refresh(),
            Action::Select(id) => self.select(&id),
            Action::Edit(edit) => self.edit(edit),
            Action::AutoSaveElapsed { instance } => self.auto_save_elapsed(instance),
            Action::AutoSaveFinished { instance, result } => {
                self.auto_save_finished(instance, result)
            }
            Action::StatusClearElapsed { instance } => {
                self.status_clear_elapsed(instance);
                Vec::new()
            }
            Action::Submit => self.submit(),
            Action::SubmitFinished { id, result } => self.submit_finished(id, result),
            Action::Cancel => self.cancel(),
            Action::Delete(id) => self.delete(id),
            Action::DeleteFinished { id, result } => self.delete_finished(&id, result),
            Action::DismissBanner => {
                self.state.banner = None;
                Vec::new()
            }
            Action::DismissAlert => {
                self.state.form.alert = None;
                Vec::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // List
    // -------------------------------------------------------------------------

    fn fetch_current_page(&mut self) -> Command {
        self.state.generation += 1;
        self.state.loading = true;
        tracing::debug!(
            generation = self.state.generation,
            page = self.state.current_page,
            "Fetching page"
        );
        Command::FetchPage {
            generation: self.state.generation,
            page: self.state.current_page,
            limit: self.state.limit,
        }
    }

    fn page_loaded(&mut self, generation: u64, result: ClientResult<TodoPage>) -> Vec<Command> {
        if generation != self.state.generation {
            tracing::debug!(
                generation,
                current = self.state.generation,
                "Dropping stale page"
            );
            return Vec::new();
        }
        self.state.loading = false;

        match result {
            Ok(page) => {
                self.state.todos = page.todos;
                self.state.total_todos = page.total_todos;
                self.state.total_pages = page.total_pages.max(1);
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to load todos");
                self.state.banner = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
        Vec::new()
    }

    fn change_page(&mut self, page: u32) -> Vec<Command> {
        let in_range = page >= 1 && u64::from(page) <= self.state.total_pages;
        if self.state.mode == Mode::Deleting || !in_range || page == self.state.current_page {
            return Vec::new();
        }
        self.state.current_page = page;
        vec![self.fetch_current_page()]
    }

    fn refresh(&mut self) -> Vec<Command> {
        if self.state.mode == Mode::Deleting {
            return Vec::new();
        }
        vec![self.fetch_current_page()]
    }

    // -------------------------------------------------------------------------
    // Form
    // -------------------------------------------------------------------------

    fn issue_instance(&mut self) -> FormInstance {
        let instance = FormInstance::new(self.next_instance);
        self.next_instance += 1;
        instance
    }

    /// Cancels both timers of the current form instance.
    fn cancel_timers(&self) -> [Command; 2] {
        let instance = self.state.form.instance;
        [
            Command::CancelTimer {
                slot: TimerSlot::auto_save(instance),
            },
            Command::CancelTimer {
                slot: TimerSlot::status_clear(instance),
            },
        ]
    }

    /// Drops the current form and shows a blank one.
    fn reset_form(&mut self) -> Vec<Command> {
        let commands = self.cancel_timers().to_vec();
        let instance = self.issue_instance();
        self.state.form = FormState::blank(instance);
        self.state.selected = None;
        commands
    }

    fn select(&mut self, id: &TodoId) -> Vec<Command> {
        if self.state.mode.is_busy() {
            return Vec::new();
        }
        let Some(item) = self.state.find(id).cloned() else {
            tracing::debug!(%id, "Ignoring selection of an item not on this page");
            return Vec::new();
        };

        let commands = self.cancel_timers().to_vec();
        let instance = self.issue_instance();
        self.state.form = FormState::for_item(instance, &item);
        self.state.selected = Some(item.todo_id);
        self.state.mode = Mode::Editing;
        commands
    }

    fn edit(&mut self, edit: FieldEdit) -> Vec<Command> {
        if self.state.mode == Mode::Submitting || !self.state.form.apply(edit) {
            return Vec::new();
        }
        if !self.state.form.is_editing() {
            return Vec::new();
        }

        let slot = TimerSlot::auto_save(self.state.form.instance);
        if self.state.form.title_is_blank() {
            if !self.state.form.save_in_flight {
                self.state.form.status = SaveStatus::Idle;
            }
            return vec![Command::CancelTimer { slot }];
        }

        self.state.form.status = SaveStatus::Saving;
        vec![
            Command::CancelTimer {
                slot: TimerSlot::status_clear(self.state.form.instance),
            },
            Command::ScheduleTimer {
                slot,
                delay: self.config.auto_save_delay,
            },
        ]
    }

    fn auto_save_command(&mut self) -> Option<Command> {
        let form = &mut self.state.form;
        let id = form.editing.clone()?;
        if form.title_is_blank() {
            form.status = SaveStatus::Idle;
            return None;
        }
        form.save_in_flight = true;
        form.status = SaveStatus::Saving;
        Some(Command::AutoSave {
            instance: form.instance,
            id,
            patch: form.patch(),
        })
    }

    fn auto_save_elapsed(&mut self, instance: FormInstance) -> Vec<Command> {
        if instance != self.state.form.instance || !self.state.form.is_editing() {
            return Vec::new();
        }
        // A delete of another item holds the save until it finishes.
        if self.state.form.save_in_flight || self.state.mode == Mode::Deleting {
            self.state.form.save_queued = true;
            return Vec::new();
        }
        self.auto_save_command().into_iter().collect()
    }

    fn auto_save_finished(
        &mut self,
        instance: FormInstance,
        result: ClientResult<TodoItem>,
    ) -> Vec<Command> {
        if instance != self.state.form.instance {
            // The form moved on, but the list can still show the saved values.
            if let Ok(item) = result {
                self.state.merge(item);
            }
            return Vec::new();
        }

        let form = &mut self.state.form;
        form.save_in_flight = false;
        let queued = std::mem::take(&mut form.save_queued);

        match result {
            Ok(item) => {
                self.state.merge(item);
                self.state.form.status = SaveStatus::Saved;
            }
            Err(error) => {
                tracing::warn!(%error, "Auto-save failed");
                self.state.form.status = SaveStatus::Failed;
            }
        }

        if queued {
            if self.state.mode == Mode::Deleting {
                self.state.form.save_queued = true;
                self.state.form.status = SaveStatus::Saving;
                return Vec::new();
            }
            if let Some(command) = self.auto_save_command() {
                return vec![command];
            }
        }

        if self.state.form.status == SaveStatus::Saved {
            return vec![Command::ScheduleTimer {
                slot: TimerSlot::status_clear(instance),
                delay: self.config.status_clear_delay,
            }];
        }
        Vec::new()
    }

    fn status_clear_elapsed(&mut self, instance: FormInstance) {
        if instance == self.state.form.instance && self.state.form.status == SaveStatus::Saved {
            self.state.form.status = SaveStatus::Idle;
        }
    }

    fn submit(&mut self) -> Vec<Command> {
        if self.state.mode.is_busy() || self.state.form.save_in_flight {
            return Vec::new();
        }
        if self.state.form.title_is_blank() {
            self.state.form.alert = Some(TITLE_REQUIRED_MESSAGE.to_string());
            return Vec::new();
        }

        let mut commands = self.cancel_timers().to_vec();
        let form = &mut self.state.form;
        form.alert = None;
        form.save_queued = false;

        let command = match form.editing.clone() {
            Some(id) => Command::Update {
                id,
                patch: form.patch(),
            },
            None => Command::Create {
                todo: form.new_todo(),
            },
        };
        self.state.mode = Mode::Submitting;
        commands.push(command);
        commands
    }

    fn submit_finished(
        &mut self,
        id: Option<TodoId>,
        result: ClientResult<TodoItem>,
    ) -> Vec<Command> {
        if self.state.mode != Mode::Submitting {
            return Vec::new();
        }

        match (id, result) {
            (Some(_), Ok(item)) => {
                tracing::info!(todo_id = %item.todo_id, "Updated todo");
                self.state.replace(item);
                self.state.mode = Mode::Browsing;
                self.reset_form()
            }
            (None, Ok(item)) => {
                tracing::info!(todo_id = %item.todo_id, "Created todo");
                self.state.mode = Mode::Browsing;
                let mut commands = self.reset_form();
                if self.state.current_page == 1 {
                    self.prepend(item);
                } else {
                    self.state.current_page = 1;
                    commands.push(self.fetch_current_page());
                }
                commands
            }
            (Some(id), Err(ClientError::NotFound(_))) => {
                tracing::warn!(%id, "Todo vanished before update");
                self.state.remove(&id);
                self.state.banner = Some(SAVE_FAILED_MESSAGE.to_string());
                self.state.mode = Mode::Browsing;
                self.reset_form()
            }
            (_, Err(error)) => {
                tracing::warn!(%error, "Failed to save todo");
                self.state.banner = Some(SAVE_FAILED_MESSAGE.to_string());
                self.state.mode = self.state.resting_mode();
                Vec::new()
            }
        }
    }

    fn prepend(&mut self, item: TodoItem) {
        let limit = usize::try_from(self.state.limit).unwrap_or(usize::MAX);
        self.state.todos.insert(0, item);
        self.state.todos.truncate(limit);
        self.state.total_todos += 1;
        self.state.total_pages = total_pages(self.state.total_todos, self.state.limit).max(1);
    }

    fn cancel(&mut self) -> Vec<Command> {
        if self.state.mode.is_busy() {
            return Vec::new();
        }
        self.state.mode = Mode::Browsing;
        self.reset_form()
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    fn delete(&mut self, id: TodoId) -> Vec<Command> {
        if self.state.mode.is_busy() {
            return Vec::new();
        }

        let mut commands = Vec::new();
        if self.state.form.editing.as_ref() == Some(&id) {
            commands.extend(self.cancel_timers());
            self.state.form.save_queued = false;
        }
        self.state.mode = Mode::Deleting;
        commands.push(Command::Delete { id });
        commands
    }

    fn delete_finished(&mut self, id: &TodoId, result: ClientResult<String>) -> Vec<Command> {
        if self.state.mode != Mode::Deleting {
            return Vec::new();
        }

        if let Err(error) = &result
            && !error.is_not_found()
        {
            tracing::warn!(%error, %id, "Failed to delete todo");
            self.state.banner = Some(DELETE_FAILED_MESSAGE.to_string());
            self.state.mode = self.state.resting_mode();
            return self.resume_held_save().into_iter().collect();
        }

        tracing::info!(%id, "Deleted todo");
        self.state.remove(id);

        let mut commands = Vec::new();
        if self.state.selected.as_ref() == Some(id) {
            commands.extend(self.reset_form());
        }
        self.state.mode = self.state.resting_mode();
        commands.extend(self.resume_held_save());

        if self.state.todos.is_empty() && self.state.current_page > 1 {
            self.state.current_page -= 1;
        }
        commands.push(self.fetch_current_page());
        commands
    }

    /// Sends the auto-save that elapsed during a delete.
    fn resume_held_save(&mut self) -> Option<Command> {
        let form = &mut self.state.form;
        if self.state.mode != Mode::Editing || form.save_in_flight || !form.save_queued {
            return None;
        }
        form.save_queued = false;
        self.auto_save_command()
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
