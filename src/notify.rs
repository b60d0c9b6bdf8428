//! Single transient toast with a cancellable dismissal timer.
//!
//! `show` replaces the current toast and restarts the countdown. The timer is
//! a tokio task; superseding, hiding or dropping the controller aborts it.
//! A generation counter guards against a timer that already woke up when it
//! was superseded.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// How long a toast stays up.
pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    toast: Option<Toast>,
}

/// Owns the visible toast and its timer. Must be used inside a tokio runtime.
#[derive(Debug)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    timer: Option<JoinHandle<()>>,
    display_for: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_duration(TOAST_DURATION)
    }

    pub fn with_duration(display_for: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timer: None,
            display_for,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.cancel_timer();
        let message = message.into();
        debug!(?kind, %message, "toast shown");
        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.toast = Some(Toast { kind, message });
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        let display_for = self.display_for;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(display_for).await;
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.generation == generation {
                slot.toast = None;
            }
        }));
    }

    pub fn hide(&mut self) {
        self.cancel_timer();
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.toast = None;
    }

    /// Snapshot of the visible toast, if any.
    pub fn current(&self) -> Option<Toast> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .toast
            .clone()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn toast_hides_after_duration() {
        let mut n = Notifier::new();
        n.success("saved");
        assert_eq!(n.current().map(|t| t.kind), Some(ToastKind::Success));

        sleep(Duration::from_millis(2999)).await;
        assert!(n.current().is_some());
        sleep(Duration::from_millis(2)).await;
        assert!(n.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn second_show_supersedes_and_restarts_timer() {
        let mut n = Notifier::new();
        n.success("first");
        sleep(Duration::from_millis(2000)).await;
        n.error("second");

        // past the first toast's deadline
        sleep(Duration::from_millis(1500)).await;
        let t = n.current().expect("second toast still visible");
        assert_eq!(t.message, "second");
        assert_eq!(t.kind, ToastKind::Error);

        // past the second toast's deadline
        sleep(Duration::from_millis(1501)).await;
        assert!(n.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn hide_is_immediate_and_cancels_timer() {
        let mut n = Notifier::new();
        n.error("boom");
        n.hide();
        assert!(n.current().is_none());
        assert!(n.timer.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_pending_timer() {
        let n = {
            let mut n = Notifier::new();
            n.success("bye");
            n
        };
        let slot = Arc::clone(&n.slot);
        drop(n);
        sleep(Duration::from_millis(3500)).await;
        // timer never ran, so the toast was never cleared
        assert!(slot.lock().unwrap().toast.is_some());
    }
}
