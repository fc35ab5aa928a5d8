//! Trailing-edge debounce timer.

use std::time::Duration;

use tokio::time::Instant;

/// Every poke pushes the deadline out to `now + quiet`; the caller fires
/// once the deadline passes with no further pokes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Start or restart the quiet window.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return true if the window has elapsed at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poke_resets_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(!debouncer.is_armed());

        debouncer.poke(start);
        debouncer.poke(start + Duration::from_millis(60));
        assert!(!debouncer.fire(start + Duration::from_millis(120)));
        assert!(debouncer.fire(start + Duration::from_millis(160)));
        // Fires once per window
        assert!(!debouncer.fire(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel_disarms() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.poke(start);
        debouncer.cancel();
        assert_eq!(debouncer.deadline(), None);
        assert!(!debouncer.fire(start + Duration::from_secs(1)));
    }
}
