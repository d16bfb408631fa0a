//! Latest-wins throttling with an explicit cancel handle.
//!
//! A `ThrottleGate` enforces a minimum interval between applied updates of
//! one kind. Within a window, later offers overwrite the pending value —
//! earlier ones are dropped, not queued. The pending value and its deadline
//! are held by the gate itself, so teardown can cancel every outstanding
//! deferred update deterministically.

use std::time::Duration;
use tokio::time::Instant;

/// Coalesces bursts of updates into bounded-rate applications.
#[derive(Debug)]
pub struct ThrottleGate<T> {
    window: Duration,
    last_applied: Option<Instant>,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> ThrottleGate<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_applied: None,
            pending: None,
            deadline: None,
        }
    }

    /// Offer a value at `now`.
    ///
    /// Returns `Some(value)` if the window has elapsed since the last
    /// application — the caller applies it immediately. Otherwise the value
    /// is held as the sole pending item (replacing any earlier one) and
    /// `None` is returned; the caller should re-check at [`deadline`].
    ///
    /// [`deadline`]: ThrottleGate::deadline
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        match self.last_applied {
            Some(last) if now.duration_since(last) < self.window => {
                self.pending = Some(value);
                self.deadline = Some(last + self.window);
                None
            }
            _ => {
                self.last_applied = Some(now);
                self.pending = None;
                self.deadline = None;
                Some(value)
            }
        }
    }

    /// Release the pending value if its deadline has passed.
    ///
    /// Releasing counts as an application for subsequent window math.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.last_applied = Some(now);
                self.pending.take()
            }
            _ => None,
        }
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        if self.pending.is_some() {
            self.deadline
        } else {
            None
        }
    }

    /// Discard the pending value and its deadline.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[test]
    fn test_first_offer_applies_immediately() {
        let mut gate = ThrottleGate::new(WINDOW);
        let now = Instant::now();
        assert_eq!(gate.offer(1, now), Some(1));
        assert!(!gate.has_pending());
    }

    #[test]
    fn test_burst_within_window_coalesces_latest_wins() {
        let mut gate = ThrottleGate::new(WINDOW);
        let start = Instant::now();

        assert_eq!(gate.offer(1, start), Some(1));
        // Three more within the window: only the last survives.
        assert_eq!(gate.offer(2, start + Duration::from_millis(50)), None);
        assert_eq!(gate.offer(3, start + Duration::from_millis(100)), None);
        assert_eq!(gate.offer(4, start + Duration::from_millis(150)), None);

        // Not due before the boundary.
        assert_eq!(gate.take_due(start + Duration::from_millis(199)), None);
        // Exactly one application at the boundary, reflecting the last offer.
        assert_eq!(gate.take_due(start + Duration::from_millis(200)), Some(4));
        // Nothing left.
        assert_eq!(gate.take_due(start + Duration::from_millis(400)), None);
    }

    #[test]
    fn test_offer_after_window_applies_again() {
        let mut gate = ThrottleGate::new(WINDOW);
        let start = Instant::now();
        assert_eq!(gate.offer(1, start), Some(1));
        assert_eq!(gate.offer(2, start + Duration::from_millis(201)), Some(2));
    }

    #[test]
    fn test_release_counts_as_application() {
        let mut gate = ThrottleGate::new(WINDOW);
        let start = Instant::now();
        gate.offer(1, start);
        gate.offer(2, start + Duration::from_millis(100));
        assert_eq!(gate.take_due(start + Duration::from_millis(200)), Some(2));
        // A new offer 100ms after the release is inside the next window.
        assert_eq!(gate.offer(3, start + Duration::from_millis(300)), None);
        assert_eq!(gate.take_due(start + Duration::from_millis(400)), Some(3));
    }

    #[test]
    fn test_cancel_discards_pending() {
        let mut gate = ThrottleGate::new(WINDOW);
        let start = Instant::now();
        gate.offer(1, start);
        gate.offer(2, start + Duration::from_millis(50));
        assert!(gate.has_pending());

        gate.cancel();
        assert!(!gate.has_pending());
        assert_eq!(gate.deadline(), None);
        // The window elapsing must not resurrect the cancelled value.
        assert_eq!(gate.take_due(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_deadline_only_while_pending() {
        let mut gate = ThrottleGate::new(WINDOW);
        let start = Instant::now();
        assert_eq!(gate.deadline(), None);
        gate.offer(1, start);
        assert_eq!(gate.deadline(), None);
        gate.offer(2, start + Duration::from_millis(50));
        assert_eq!(gate.deadline(), Some(start + WINDOW));
    }
}
