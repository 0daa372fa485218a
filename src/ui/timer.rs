//! Cancellable one-shot timers keyed by slot.
//!
//! A fired timer delivers its message into the session's channel. Scheduling
//! into an occupied slot replaces the previous timer.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use super::form::FormInstance;

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Debounce before an auto-save.
    AutoSave,
    /// Hides the `Saved` status.
    StatusClear,
}

/// A timer belongs to one form instance and has one purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerSlot {
    pub instance: FormInstance,
    pub kind: TimerKind,
}

impl TimerSlot {
    #[must_use]
    pub const fn new(instance: FormInstance, kind: TimerKind) -> Self {
        Self { instance, kind }
    }

    #[must_use]
    pub const fn auto_save(instance: FormInstance) -> Self {
        Self::new(instance, TimerKind::AutoSave)
    }

    #[must_use]
    pub const fn status_clear(instance: FormInstance) -> Self {
        Self::new(instance, TimerKind::StatusClear)
    }
}

/// Registry of pending timers.
///
/// Must be used inside a tokio runtime. Dropping the registry aborts every
/// pending timer.
#[derive(Debug)]
pub struct Timers<M> {
    sender: UnboundedSender<M>,
    pending: HashMap<TimerSlot, AbortHandle>,
}

impl<M: Send + 'static> Timers<M> {
    #[must_use]
    pub fn new(sender: UnboundedSender<M>) -> Self {
        Self {
            sender,
            pending: HashMap::new(),
        }
    }

    /// Delivers `message` after `delay`, replacing any timer in `slot`.
    pub fn schedule(&mut self, slot: TimerSlot, delay: Duration, message: M) {
        self.cancel(slot);

        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone once the session is dropped.
            let _ = sender.send(message);
        });
        self.pending.insert(slot, handle.abort_handle());
    }

    /// Cancels the timer in `slot`. Safe on empty, fired and cancelled slots.
    pub fn cancel(&mut self, slot: TimerSlot) {
        if let Some(handle) = self.pending.remove(&slot) {
            handle.abort();
        }
    }

    /// Returns true while the timer in `slot` has not fired.
    #[must_use]
    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.pending
            .get(&slot)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of timers that have not fired yet.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl<M> Drop for Timers<M> {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tokio::sync::mpsc;

    const SLOT: TimerSlot = TimerSlot::auto_save(FormInstance::new(1));

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut timers = Timers::new(sender);

        timers.schedule(SLOT, Duration::from_secs(1), "fired");
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(receiver.try_recv().is_err());

        assert_eq!(receiver.recv().await, Some("fired"));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_previous_timer() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut timers = Timers::new(sender);

        timers.schedule(SLOT, Duration::from_secs(1), "first");
        tokio::time::sleep(Duration::from_millis(500)).await;
        timers.schedule(SLOT, Duration::from_secs(1), "second");

        assert_eq!(receiver.recv().await, Some("second"));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(receiver.try_recv().is_err());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut timers = Timers::new(sender);

        timers.cancel(SLOT);
        timers.schedule(SLOT, Duration::from_secs(1), "never");
        timers.cancel(SLOT);
        timers.cancel(SLOT);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(receiver.try_recv().is_err());
        assert!(!timers.is_pending(SLOT));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_harmless() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut timers = Timers::new(sender);

        timers.schedule(SLOT, Duration::from_secs(1), "fired");
        assert_eq!(receiver.recv().await, Some("fired"));

        timers.cancel(SLOT);
        assert_eq!(timers.pending_count(), 0);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_slots_are_independent() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut timers = Timers::new(sender);
        let other = TimerSlot::status_clear(FormInstance::new(1));

        timers.schedule(SLOT, Duration::from_secs(1), "save");
        timers.schedule(other, Duration::from_secs(2), "clear");
        timers.cancel(SLOT);

        assert_eq!(receiver.recv().await, Some("clear"));
    }
}
