//! Short-press / long-press classification for a single control.
//!
//! `PressGesture` is a pure state machine: callers feed it press, release,
//! cancel and timer events together with the current instant, and it answers
//! with at most one `PressAction` per press/release cycle. Driving the timer
//! is left to the caller.

use std::time::{Duration, Instant};

/// Hold time after which a press counts as a long press.
pub const LONG_PRESS_DELAY: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressAction {
    Short,
    Long,
}

/// Identifies one armed press and the instant its long-press timer is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTicket {
    generation: u64,
    deadline: Instant,
}

impl PressTicket {
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

#[derive(Debug, Clone)]
pub struct PressGesture {
    delay: Duration,
    armed: Option<PressTicket>,
    fired: bool,
    generation: u64,
}

impl Default for PressGesture {
    fn default() -> Self {
        Self::new()
    }
}

impl PressGesture {
    #[must_use]
    pub fn new() -> Self {
        Self::with_delay(LONG_PRESS_DELAY)
    }

    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            armed: None,
            fired: false,
            generation: 0,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Start a press. Any previous cycle is forgotten.
    pub fn press(&mut self, now: Instant) -> PressTicket {
        self.generation = self.generation.wrapping_add(1);
        self.fired = false;
        let ticket = PressTicket {
            generation: self.generation,
            deadline: now + self.delay,
        };
        self.armed = Some(ticket);
        ticket
    }

    /// The long-press timer for `ticket` elapsed.
    ///
    /// Timers belonging to an earlier, released or cancelled press are ignored.
    pub fn timer_elapsed(&mut self, ticket: PressTicket) -> Option<PressAction> {
        if self.armed != Some(ticket) || self.fired {
            return None;
        }
        self.armed = None;
        self.fired = true;
        Some(PressAction::Long)
    }

    /// Poll-style alternative to a timer callback.
    pub fn tick(&mut self, now: Instant) -> Option<PressAction> {
        let ticket = self.armed?;
        if now < ticket.deadline {
            return None;
        }
        self.timer_elapsed(ticket)
    }

    /// The press ended over the control.
    ///
    /// Fires `Short` before the deadline. A release at or past the deadline
    /// whose timer has not been delivered yet fires `Long` in its place.
    pub fn release(&mut self, now: Instant) -> Option<PressAction> {
        let ticket = self.armed.take()?;
        if self.fired {
            return None;
        }
        if now >= ticket.deadline {
            self.fired = true;
            return Some(PressAction::Long);
        }
        Some(PressAction::Short)
    }

    /// The pointer left the control or the input was interrupted.
    pub fn cancel(&mut self) {
        self.armed = None;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
