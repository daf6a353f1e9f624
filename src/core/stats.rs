//! Replanning statistics

/// Counters collected by a generator across its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionStats {
    /// Destination attempts made after the replan timer expired
    attempts: u64,
    /// Attempts that launched a path
    successes: u64,
    /// Attempts rejected because the pathfinder found nothing
    no_path: u64,
    /// Attempts rejected by slope or step validation
    bad_slope: u64,
    /// Attempts whose path played back with zero duration
    empty_launch: u64,
    /// Burst delays drawn
    delays_drawn: u64,
    /// Duration of the last launched path (ms)
    last_duration: u32,
    /// Sum of all launched durations (ms)
    total_duration: u64,
}

impl MotionStats {
    /// Create an empty stats tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub(crate) fn record_success(&mut self, duration: u32) {
        self.successes += 1;
        self.last_duration = duration;
        self.total_duration += u64::from(duration);
    }

    pub(crate) fn record_no_path(&mut self) {
        self.no_path += 1;
    }

    pub(crate) fn record_bad_slope(&mut self) {
        self.bad_slope += 1;
    }

    pub(crate) fn record_empty_launch(&mut self) {
        self.empty_launch += 1;
    }

    pub(crate) fn record_delay_drawn(&mut self) {
        self.delays_drawn += 1;
    }

    /// Number of destination attempts
    #[must_use]
    pub const fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Number of launched paths
    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successes
    }

    /// Number of failed attempts, whatever the reason
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.no_path + self.bad_slope + self.empty_launch
    }

    /// Attempts that found no path
    #[must_use]
    pub const fn no_path(&self) -> u64 {
        self.no_path
    }

    /// Attempts rejected by slope validation
    #[must_use]
    pub const fn bad_slope(&self) -> u64 {
        self.bad_slope
    }

    /// Number of burst delays drawn
    #[must_use]
    pub const fn delays_drawn(&self) -> u64 {
        self.delays_drawn
    }

    /// Duration of the last launched path in milliseconds
    #[must_use]
    pub const fn last_duration(&self) -> u32 {
        self.last_duration
    }

    /// Total launched duration in milliseconds
    #[must_use]
    pub const fn total_duration(&self) -> u64 {
        self.total_duration
    }

    /// Get a formatted stats string
    #[must_use]
    pub fn format_stats(&self) -> String {
        format!(
            "replans: {}/{} ok | no path: {} | slope: {} | empty: {} | delays: {} | moved: {}ms",
            self.successes,
            self.attempts,
            self.no_path,
            self.bad_slope,
            self.empty_launch,
            self.delays_drawn,
            self.total_duration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_sum_reasons() {
        let mut stats = MotionStats::new();
        stats.record_no_path();
        stats.record_bad_slope();
        stats.record_bad_slope();
        stats.record_empty_launch();

        assert_eq!(stats.failures(), 4);
        assert_eq!(stats.bad_slope(), 2);
    }

    #[test]
    fn test_success_tracks_durations() {
        let mut stats = MotionStats::new();
        stats.record_success(1200);
        stats.record_success(800);

        assert_eq!(stats.successes(), 2);
        assert_eq!(stats.last_duration(), 800);
        assert_eq!(stats.total_duration(), 2000);
        assert!(stats.format_stats().contains("moved: 2000ms"));
    }
}
