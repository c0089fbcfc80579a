//! Block stopwatch implementation.
//!
//! The stopwatch is wall-clock based and has no internal thread: `start`
//! records an anchor timestamp, `stop` folds the elapsed wall time into the
//! accumulated total. Restarting continues accumulation; the total never
//! resets across stop/start cycles.

use serde::{Deserialize, Serialize};

/// Accumulating stopwatch for a time block.
///
/// Commands are idempotent: starting a running stopwatch and stopping a
/// stopped one are no-ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stopwatch {
    /// Total accumulated milliseconds across completed run segments.
    accumulated_ms: u64,
    /// Anchor (ms since epoch) of the running segment, if any.
    #[serde(default)]
    started_at_epoch_ms: Option<u64>,
}

impl Stopwatch {
    /// Rebuild from persisted fields.
    pub fn from_parts(accumulated_ms: u64, started_at_epoch_ms: Option<u64>) -> Self {
        Self {
            accumulated_ms,
            started_at_epoch_ms,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at_epoch_ms.is_some()
    }

    /// Accumulated total, not counting any segment still running.
    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    pub fn started_at_epoch_ms(&self) -> Option<u64> {
        self.started_at_epoch_ms
    }

    /// Start the stopwatch now. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        self.start_at(now_ms())
    }

    /// Stop the stopwatch now, folding the running segment into the total.
    /// Returns the new total, or `None` if it was not running.
    pub fn stop(&mut self) -> Option<u64> {
        self.stop_at(now_ms())
    }

    /// Live total: accumulated plus the running segment as of `now`.
    pub fn elapsed_ms(&self) -> u64 {
        match self.started_at_epoch_ms {
            Some(anchor) => self.accumulated_ms + now_ms().saturating_sub(anchor),
            None => self.accumulated_ms,
        }
    }

    /// Start with an explicit anchor timestamp.
    pub fn start_at(&mut self, now_epoch_ms: u64) -> bool {
        if self.started_at_epoch_ms.is_some() {
            return false;
        }
        self.started_at_epoch_ms = Some(now_epoch_ms);
        true
    }

    /// Stop with an explicit timestamp. A clock that went backwards
    /// contributes zero, never a negative segment.
    pub fn stop_at(&mut self, now_epoch_ms: u64) -> Option<u64> {
        let anchor = self.started_at_epoch_ms.take()?;
        self.accumulated_ms += now_epoch_ms.saturating_sub(anchor);
        Some(self.accumulated_ms)
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_cycles() {
        let mut sw = Stopwatch::default();
        assert!(sw.start_at(1_000));
        assert_eq!(sw.stop_at(4_000), Some(3_000));
        assert!(sw.start_at(10_000));
        assert_eq!(sw.stop_at(12_000), Some(5_000));
        assert_eq!(sw.accumulated_ms(), 5_000);
    }

    #[test]
    fn restart_never_resets() {
        let mut sw = Stopwatch::default();
        sw.start_at(0);
        let before = sw.stop_at(7_500).unwrap();
        sw.start_at(8_000);
        assert!(sw.elapsed_ms() >= before);
        let after = sw.stop_at(8_000).unwrap();
        assert!(after >= before);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut sw = Stopwatch::default();
        assert!(sw.start_at(1_000));
        assert!(!sw.start_at(2_000));
        // Anchor unchanged by the second start.
        assert_eq!(sw.stop_at(3_000), Some(2_000));
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let mut sw = Stopwatch::default();
        assert_eq!(sw.stop_at(5_000), None);
        assert_eq!(sw.accumulated_ms(), 0);
    }

    #[test]
    fn backwards_clock_contributes_zero() {
        let mut sw = Stopwatch::default();
        sw.start_at(10_000);
        assert_eq!(sw.stop_at(9_000), Some(0));
    }

    #[test]
    fn serde_defaults_to_idle() {
        let sw: Stopwatch = serde_json::from_str("{\"accumulated_ms\": 1234}").unwrap();
        assert!(!sw.is_running());
        assert_eq!(sw.accumulated_ms(), 1234);
    }
}
