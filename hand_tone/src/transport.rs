//! Transport clock: start on pinch, pause on fist, report running seconds.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState { Stopped, Started, Paused }

/// Tracks how long the loop has been running, excluding paused spans.
#[derive(Debug, Clone)]
pub struct Transport {
    state:      TransportState,
    elapsed:    Duration,
    started_at: Option<Instant>,
}

impl Default for Transport {
    fn default() -> Self { Transport::new() }
}

impl Transport {
    pub fn new() -> Self {
        Transport { state: TransportState::Stopped, elapsed: Duration::ZERO, started_at: None }
    }

    pub fn state(&self) -> TransportState { self.state }
    pub fn is_started(&self) -> bool { self.state == TransportState::Started }

    /// Start or resume.  Returns `true` if the state changed.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_started() { return false; }
        self.state = TransportState::Started;
        self.started_at = Some(now);
        true
    }

    /// Pause a running transport.  Returns `true` if the state changed.
    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.is_started() { return false; }
        if let Some(t0) = self.started_at.take() {
            self.elapsed += now.saturating_duration_since(t0);
        }
        self.state = TransportState::Paused;
        true
    }

    pub fn seconds(&self, now: Instant) -> f64 {
        let running = match self.started_at {
            Some(t0) => now.saturating_duration_since(t0),
            None     => Duration::ZERO,
        };
        (self.elapsed + running).as_secs_f64()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn stopped_reads_zero() {
        let t0 = Instant::now();
        let t = Transport::new();
        assert_eq!(t.state(), TransportState::Stopped);
        assert_eq!(t.seconds(t0 + ms(500)), 0.0);
    }

    #[test]
    fn start_then_pause_accumulates() {
        let t0 = Instant::now();
        let mut t = Transport::new();
        assert!(t.start(t0));
        assert_eq!(t.seconds(t0 + ms(250)), 0.25);
        assert!(t.pause(t0 + ms(1000)));
        assert_eq!(t.state(), TransportState::Paused);
        // Frozen while paused.
        assert_eq!(t.seconds(t0 + ms(5000)), 1.0);
    }

    #[test]
    fn resume_adds_to_elapsed() {
        let t0 = Instant::now();
        let mut t = Transport::new();
        t.start(t0);
        t.pause(t0 + ms(1000));
        t.start(t0 + ms(3000));
        assert_eq!(t.seconds(t0 + ms(3500)), 1.5);
    }

    #[test]
    fn start_only_when_not_started() {
        let t0 = Instant::now();
        let mut t = Transport::new();
        assert!(t.start(t0));
        assert!(!t.start(t0 + ms(100)));
        // The second start did not reset the origin.
        assert_eq!(t.seconds(t0 + ms(200)), 0.2);
    }

    #[test]
    fn pause_only_when_started() {
        let t0 = Instant::now();
        let mut t = Transport::new();
        assert!(!t.pause(t0));
        assert_eq!(t.state(), TransportState::Stopped);
        t.start(t0);
        assert!(t.pause(t0));
        assert!(!t.pause(t0));
    }
}
