//! Async driver for the controller.
//!
//! A [`Session`] owns the controller and executes its commands: API calls
//! run on spawned tasks and timers on the [`Timers`] registry. Both report
//! back through one channel, so the controller only ever sees one action at a
//! time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::controller::{Action, Command, Controller, ControllerConfig, ControllerState};
use super::timer::{TimerKind, TimerSlot, Timers};
use super::view::{FormView, ListView};
use crate::client::TodoApi;

/// A long-lived UI session.
///
/// Must be created and driven inside a tokio runtime.
pub struct Session {
    api: Arc<dyn TodoApi>,
    controller: Controller,
    timers: Timers<Action>,
    sender: UnboundedSender<Action>,
    receiver: UnboundedReceiver<Action>,
}

impl Session {
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, config: ControllerConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            api,
            controller: Controller::new(config),
            timers: Timers::new(sender.clone()),
            sender,
            receiver,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ControllerState {
        self.controller.state()
    }

    #[must_use]
    pub fn list_view(&self) -> ListView {
        ListView::from_state(self.state())
    }

    #[must_use]
    pub fn form_view(&self) -> FormView {
        FormView::from_state(self.state())
    }

    /// Loads the first page.
    pub fn start(&mut self) {
        let commands = self.controller.start();
        self.execute(commands);
    }

    /// Applies a user action immediately.
    pub fn dispatch(&mut self, action: Action) {
        let commands = self.controller.handle(action);
        self.execute(commands);
    }

    /// Waits for the next API result or timer and applies it.
    ///
    /// Returns the applied action.
    pub async fn step(&mut self) -> Option<Action> {
        let action = self.receiver.recv().await?;
        self.dispatch(action.clone());
        Some(action)
    }

    /// Like [`Session::step`], but gives up after `limit`.
    pub async fn step_within(&mut self, limit: Duration) -> Option<Action> {
        let action = tokio::time::timeout(limit, self.receiver.recv())
            .await
            .ok()??;
        self.dispatch(action.clone());
        Some(action)
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            self.execute_one(command);
        }
    }

    fn execute_one(&mut self, command: Command) {
        match command {
            Command::FetchPage {
                generation,
                page,
                limit,
            } => {
                let call = self.api.list(page, limit);
                self.spawn(async move {
                    Action::PageLoaded {
                        generation,
                        result: call.await,
                    }
                });
            }
            Command::Create { todo } => {
                let call = self.api.create(todo);
                self.spawn(async move {
                    Action::SubmitFinished {
                        id: None,
                        result: call.await,
                    }
                });
            }
            Command::Update { id, patch } => {
                let call = self.api.update(&id, patch);
                self.spawn(async move {
                    Action::SubmitFinished {
                        id: Some(id),
                        result: call.await,
                    }
                });
            }
            Command::AutoSave {
                instance,
                id,
                patch,
            } => {
                let call = self.api.update(&id, patch);
                self.spawn(async move {
                    Action::AutoSaveFinished {
                        instance,
                        result: call.await,
                    }
                });
            }
            Command::Delete { id } => {
                let call = self.api.delete(&id);
                self.spawn(async move {
                    Action::DeleteFinished {
                        id,
                        result: call.await,
                    }
                });
            }
            Command::ScheduleTimer { slot, delay } => {
                self.timers.schedule(slot, delay, timer_action(slot));
            }
            Command::CancelTimer { slot } => self.timers.cancel(slot),
        }
    }

    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let _ = sender.send(future.await);
        });
    }
}

const fn timer_action(slot: TimerSlot) -> Action {
    match slot.kind {
        TimerKind::AutoSave => Action::AutoSaveElapsed {
            instance: slot.instance,
        },
        TimerKind::StatusClear => Action::StatusClearElapsed {
            instance: slot.instance,
        },
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Session")
            .field("controller", &self.controller)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}
