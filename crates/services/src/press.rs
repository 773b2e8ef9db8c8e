//! Tokio driver for `PressGesture`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use deck_core::gesture::{PressAction, PressGesture};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::trace;

pub type PressHandler = Arc<dyn Fn() + Send + Sync>;

/// A control with separate short-press and long-press actions.
///
/// Holding past the delay fires the long action once, while still held;
/// the following release does nothing. Releasing earlier fires the short
/// action. A cancelled press fires nothing.
pub struct LongPressButton {
    gesture: Arc<Mutex<PressGesture>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    on_short: PressHandler,
    on_long: PressHandler,
}

fn lock_gesture(gesture: &Mutex<PressGesture>) -> MutexGuard<'_, PressGesture> {
    gesture.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

impl LongPressButton {
    #[must_use]
    pub fn new(
        on_short: impl Fn() + Send + Sync + 'static,
        on_long: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::from_gesture(PressGesture::new(), Arc::new(on_short), Arc::new(on_long))
    }

    #[must_use]
    pub fn with_delay(
        delay: Duration,
        on_short: impl Fn() + Send + Sync + 'static,
        on_long: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::from_gesture(
            PressGesture::with_delay(delay),
            Arc::new(on_short),
            Arc::new(on_long),
        )
    }

    fn from_gesture(gesture: PressGesture, on_short: PressHandler, on_long: PressHandler) -> Self {
        Self {
            gesture: Arc::new(Mutex::new(gesture)),
            timer: Mutex::new(None),
            on_short,
            on_long,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        lock_gesture(&self.gesture).delay()
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        lock_gesture(&self.gesture).is_armed()
    }

    /// Pointer went down. Must be called inside a Tokio runtime.
    pub fn press(&self) {
        let ticket = lock_gesture(&self.gesture).press(now());
        let gesture = Arc::clone(&self.gesture);
        let on_long = Arc::clone(&self.on_long);
        let timer = tokio::spawn(async move {
            time::sleep_until(Instant::from_std(ticket.deadline())).await;
            let fired = lock_gesture(&gesture).timer_elapsed(ticket);
            if fired == Some(PressAction::Long) {
                trace!("long press fired by timer");
                on_long();
            }
        });
        self.replace_timer(Some(timer));
    }

    /// Pointer went up over the control.
    pub fn release(&self) -> Option<PressAction> {
        self.replace_timer(None);
        let action = lock_gesture(&self.gesture).release(now());
        match action {
            Some(PressAction::Short) => (self.on_short)(),
            Some(PressAction::Long) => (self.on_long)(),
            None => {}
        }
        action
    }

    /// Pointer left the control or the gesture was interrupted.
    pub fn cancel(&self) {
        self.replace_timer(None);
        lock_gesture(&self.gesture).cancel();
    }

    fn replace_timer(&self, next: Option<JoinHandle<()>>) {
        let previous = {
            let mut slot = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, next)
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for LongPressButton {
    fn drop(&mut self) {
        self.replace_timer(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counters {
        short: Arc<AtomicUsize>,
        long: Arc<AtomicUsize>,
    }

    impl Counters {
        fn short(&self) -> usize {
            self.short.load(Ordering::SeqCst)
        }

        fn long(&self) -> usize {
            self.long.load(Ordering::SeqCst)
        }
    }

    fn counting_button() -> (LongPressButton, Counters) {
        let short = Arc::new(AtomicUsize::new(0));
        let long = Arc::new(AtomicUsize::new(0));
        let button = LongPressButton::new(
            {
                let short = Arc::clone(&short);
                move || {
                    short.fetch_add(1, Ordering::SeqCst);
                }
            },
            {
                let long = Arc::clone(&long);
                move || {
                    long.fetch_add(1, Ordering::SeqCst);
                }
            },
        );
        (button, Counters { short, long })
    }

    #[tokio::test(start_paused = true)]
    async fn holding_fires_long_while_still_pressed() {
        let (button, counts) = counting_button();

        button.press();
        time::sleep(Duration::from_millis(700)).await;

        assert_eq!(counts.long(), 1);
        assert!(!button.is_held());

        assert_eq!(button.release(), None);
        assert_eq!(counts.long(), 1);
        assert_eq!(counts.short(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn quick_tap_fires_short_only() {
        let (button, counts) = counting_button();

        button.press();
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(button.release(), Some(PressAction::Short));

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counts.short(), 1);
        assert_eq!(counts.long(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_press_fires_nothing() {
        let (button, counts) = counting_button();

        button.press();
        time::sleep(Duration::from_millis(300)).await;
        button.cancel();
        time::sleep(Duration::from_secs(1)).await;

        assert_eq!(button.release(), None);
        assert_eq!(counts.short(), 0);
        assert_eq!(counts.long(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repress_restarts_the_timer() {
        let (button, counts) = counting_button();

        button.press();
        time::sleep(Duration::from_millis(400)).await;
        button.release();
        button.press();
        time::sleep(Duration::from_millis(400)).await;

        assert_eq!(counts.long(), 0);
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(counts.long(), 1);
        assert_eq!(counts.short(), 1);
    }
}
