//! Countdown timer driven by tick deltas
//!
//! All values are milliseconds. The timer is signed so callers can push the
//! expiry around (pause extensions) without special-casing underflow.

/// A countdown that expires once its remaining time drops to zero or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownTimer {
    /// Remaining time in milliseconds
    expiry: i32,
}

impl CountdownTimer {
    /// Create a timer with the given remaining time.
    #[must_use]
    pub const fn new(expiry: i32) -> Self {
        Self { expiry }
    }

    /// Advance the timer by `diff` milliseconds.
    pub fn update(&mut self, diff: u32) {
        let diff = i32::try_from(diff).unwrap_or(i32::MAX);
        self.expiry = self.expiry.saturating_sub(diff);
    }

    /// Whether the timer has run out.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.expiry <= 0
    }

    /// Restart the countdown with a new remaining time.
    pub fn reset(&mut self, expiry: i32) {
        self.expiry = expiry;
    }

    /// Remaining time in milliseconds (non-positive once passed).
    #[must_use]
    pub const fn expiry(&self) -> i32 {
        self.expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_down() {
        let mut timer = CountdownTimer::new(100);
        timer.update(40);
        assert_eq!(timer.expiry(), 60);
        assert!(!timer.passed());

        timer.update(60);
        assert!(timer.passed());
    }

    #[test]
    fn test_zero_timer_is_passed() {
        assert!(CountdownTimer::default().passed());
        assert!(CountdownTimer::new(0).passed());
    }

    #[test]
    fn test_large_diff_saturates() {
        let mut timer = CountdownTimer::new(-5);
        timer.update(u32::MAX);
        assert_eq!(timer.expiry(), i32::MIN);
        assert!(timer.passed());
    }

    #[test]
    fn test_reset_restarts() {
        let mut timer = CountdownTimer::new(0);
        timer.reset(250);
        assert!(!timer.passed());
        assert_eq!(timer.expiry(), 250);
    }
}
