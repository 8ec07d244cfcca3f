//! Single-slot toast display
//!
//! State machine:
//!
//! ```text
//! show()      Idle|any ──> Entering ──ENTER_DELAY──> Visible ──duration──> Dismissing ──DISMISS_DELAY──> Idle
//! dismiss()   Entering|Visible ──> Dismissing ──DISMISS_DELAY──> Idle
//! ```
//!
//! Exactly one timer task is pending at any time. Showing or dismissing
//! aborts it, and a generation counter makes a late wakeup from an aborted
//! task a no-op.

use super::{Notifier, Toast};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Delay before an entering toast becomes visible
pub const ENTER_DELAY: Duration = Duration::from_millis(10);

/// Length of the leave transition before the slot is cleared
pub const DISMISS_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Entering,
    Visible,
    Dismissing,
}

struct Slot {
    generation: u64,
    toast: Option<Toast>,
    timer: Option<JoinHandle<()>>,
}

struct DisplayInner {
    slot: Mutex<Slot>,
    state: watch::Sender<DisplayState>,
    handle: Option<Handle>,
}

impl DisplayInner {
    /// Apply `state` if no newer show/dismiss happened since `generation`
    fn transition(&self, generation: u64, state: DisplayState) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != generation {
            return false;
        }
        if state == DisplayState::Idle {
            slot.toast = None;
            slot.timer = None;
        }
        self.state.send_replace(state);
        debug!(generation, ?state, "Toast display transition");
        true
    }
}

/// The one place toasts are shown
///
/// Cheap to clone. Timers run on the Tokio runtime captured at construction
/// (or given to [`ToastDisplay::with_handle`]), falling back to the runtime
/// of the caller. Without any runtime a toast stays visible until it is
/// dismissed or replaced, and dismissal is immediate.
#[derive(Clone)]
pub struct ToastDisplay {
    inner: Arc<DisplayInner>,
}

impl ToastDisplay {
    pub fn new() -> Self {
        Self::build(Handle::try_current().ok())
    }

    /// Display whose timers run on `handle`
    pub fn with_handle(handle: Handle) -> Self {
        Self::build(Some(handle))
    }

    fn build(handle: Option<Handle>) -> Self {
        let (state, _) = watch::channel(DisplayState::Idle);
        Self {
            inner: Arc::new(DisplayInner {
                slot: Mutex::new(Slot {
                    generation: 0,
                    toast: None,
                    timer: None,
                }),
                state,
                handle,
            }),
        }
    }

    pub fn state(&self) -> DisplayState {
        *self.inner.state.borrow()
    }

    pub fn state_receiver(&self) -> watch::Receiver<DisplayState> {
        self.inner.state.subscribe()
    }

    /// Toast occupying the slot, if any
    pub fn current(&self) -> Option<Toast> {
        self.inner.slot.lock().toast.clone()
    }

    fn runtime(&self) -> Option<Handle> {
        self.inner
            .handle
            .clone()
            .or_else(|| Handle::try_current().ok())
    }

    /// Show `toast`, pre-empting whatever is on screen
    pub fn show(&self, toast: Toast) {
        let duration = toast.duration;
        let mut slot = self.inner.slot.lock();

        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;
        debug!(generation, kind = %toast.kind, title = %toast.title, "Showing toast");
        slot.toast = Some(toast);

        let Some(runtime) = self.runtime() else {
            warn!(generation, "No runtime for toast timers, showing until dismissed");
            self.inner.state.send_replace(DisplayState::Visible);
            return;
        };
        self.inner.state.send_replace(DisplayState::Entering);

        let inner = self.inner.clone();
        slot.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(ENTER_DELAY).await;
            if !inner.transition(generation, DisplayState::Visible) {
                return;
            }

            tokio::time::sleep(duration.saturating_sub(ENTER_DELAY)).await;
            if !inner.transition(generation, DisplayState::Dismissing) {
                return;
            }

            tokio::time::sleep(DISMISS_DELAY).await;
            inner.transition(generation, DisplayState::Idle);
        }));
    }

    /// Dismiss the current toast early
    pub fn dismiss(&self) {
        let mut slot = self.inner.slot.lock();
        if slot.toast.is_none() {
            return;
        }

        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;

        let Some(runtime) = self.runtime() else {
            slot.toast = None;
            self.inner.state.send_replace(DisplayState::Idle);
            return;
        };
        self.inner.state.send_replace(DisplayState::Dismissing);

        let inner = self.inner.clone();
        slot.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(DISMISS_DELAY).await;
            inner.transition(generation, DisplayState::Idle);
        }));
    }
}

impl Default for ToastDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Never panics outside a runtime; see [`ToastDisplay`] for the fallback.
impl Notifier for ToastDisplay {
    fn notify(&self, toast: Toast) {
        self.show(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn toast_for(ms: u64) -> Toast {
        Toast::info("title", "message").with_duration(Duration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_lifecycle() {
        let display = ToastDisplay::new();
        assert_eq!(display.state(), DisplayState::Idle);

        display.show(toast_for(1000));
        assert_eq!(display.state(), DisplayState::Entering);
        assert!(display.current().is_some());

        sleep(Duration::from_millis(5)).await;
        assert_eq!(display.state(), DisplayState::Entering);

        sleep(Duration::from_millis(495)).await; // t = 500
        assert_eq!(display.state(), DisplayState::Visible);

        sleep(Duration::from_millis(600)).await; // t = 1100
        assert_eq!(display.state(), DisplayState::Dismissing);
        assert!(display.current().is_some());

        sleep(Duration::from_millis(300)).await; // t = 1400
        assert_eq!(display.state(), DisplayState::Idle);
        assert!(display.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_toast_preempts_old_timers() {
        let display = ToastDisplay::new();

        display.show(toast_for(1000));
        sleep(Duration::from_millis(800)).await;
        assert_eq!(display.state(), DisplayState::Visible);

        let second = toast_for(1000);
        let second_id = second.id;
        display.show(second);
        assert_eq!(display.state(), DisplayState::Entering);

        // The first toast's dismiss deadline (t = 1000) must not fire
        sleep(Duration::from_millis(400)).await; // t = 1200
        assert_eq!(display.state(), DisplayState::Visible);
        assert_eq!(display.current().unwrap().id, second_id);

        sleep(Duration::from_millis(700)).await; // t = 1900, second dismisses at 1800
        assert_eq!(display.state(), DisplayState::Dismissing);

        sleep(Duration::from_millis(300)).await; // t = 2200, idle since 2100
        assert_eq!(display.state(), DisplayState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dismiss() {
        let display = ToastDisplay::new();

        display.show(toast_for(5000));
        sleep(Duration::from_millis(100)).await;
        assert_eq!(display.state(), DisplayState::Visible);

        display.dismiss();
        assert_eq!(display.state(), DisplayState::Dismissing);

        sleep(Duration::from_millis(250)).await;
        assert_eq!(display.state(), DisplayState::Dismissing);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(display.state(), DisplayState::Idle);

        // Auto-dismiss timers of the original toast are gone
        sleep(Duration::from_millis(6000)).await;
        assert_eq!(display.state(), DisplayState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_when_idle_is_noop() {
        let display = ToastDisplay::new();
        display.dismiss();
        assert_eq!(display.state(), DisplayState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_receiver_observes_transitions() {
        let display = ToastDisplay::new();
        let mut rx = display.state_receiver();

        display.notify(toast_for(50));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), DisplayState::Entering);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), DisplayState::Visible);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), DisplayState::Dismissing);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), DisplayState::Idle);
    }

    #[test]
    fn test_show_outside_runtime_uses_captured_handle() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let display = ToastDisplay::with_handle(rt.handle().clone());

        display.notify(toast_for(5000));
        assert_eq!(display.state(), DisplayState::Entering);

        rt.block_on(async { sleep(Duration::from_millis(50)).await });
        assert_eq!(display.state(), DisplayState::Visible);
    }

    #[test]
    fn test_show_without_runtime_does_not_panic() {
        let display = ToastDisplay::new();

        display.notify(toast_for(50));
        assert_eq!(display.state(), DisplayState::Visible);
        assert!(display.current().is_some());

        display.dismiss();
        assert_eq!(display.state(), DisplayState::Idle);
        assert!(display.current().is_none());
    }
}
