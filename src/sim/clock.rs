//! Play/break duty cycle
//!
//! Transitions depend on elapsed time only. Messages, input and score never
//! move the clock.

use serde::{Deserialize, Serialize};

use crate::consts::{BREAK_DURATION_MS, PLAY_DURATION_MS};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Targets visible, slicing enabled
    Playing,
    /// Screen frozen behind the break overlay
    OnBreak,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    phase: SessionPhase,
    phase_start: f64,
    play_ms: f64,
    break_ms: f64,
}

impl SessionClock {
    /// Start in `Playing` at `now`
    pub fn new(now: f64) -> Self {
        Self::with_durations(now, PLAY_DURATION_MS, BREAK_DURATION_MS)
    }

    pub fn with_durations(now: f64, play_ms: f64, break_ms: f64) -> Self {
        Self {
            phase: SessionPhase::Playing,
            phase_start: now,
            play_ms,
            break_ms,
        }
    }

    pub fn current_phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn phase_start(&self) -> f64 {
        self.phase_start
    }

    /// Milliseconds spent in the current phase
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.phase_start).max(0.0)
    }

    /// Advance the clock. Returns the new phase if a transition happened.
    ///
    /// At most one transition per call: the new phase starts at `now`.
    pub fn tick(&mut self, now: f64) -> Option<SessionPhase> {
        let limit = match self.phase {
            SessionPhase::Playing => self.play_ms,
            SessionPhase::OnBreak => self.break_ms,
        };
        if now - self.phase_start < limit {
            return None;
        }

        self.phase = match self.phase {
            SessionPhase::Playing => SessionPhase::OnBreak,
            SessionPhase::OnBreak => SessionPhase::Playing,
        };
        self.phase_start = now;
        match self.phase {
            SessionPhase::OnBreak => log::info!("Break started"),
            SessionPhase::Playing => log::info!("Break ended, game resumed"),
        }
        Some(self.phase)
    }

    /// Whole seconds left on the break countdown, `None` while playing
    pub fn time_remaining(&self, now: f64) -> Option<u32> {
        if self.phase != SessionPhase::OnBreak {
            return None;
        }
        let total_secs = (self.break_ms / 1000.0).floor();
        let elapsed_secs = (self.elapsed(now) / 1000.0).floor();
        Some((total_secs - elapsed_secs).max(0.0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_to_break_at_threshold() {
        let mut clock = SessionClock::new(1000.0);
        assert_eq!(clock.tick(60_999.0), None);
        assert_eq!(clock.current_phase(), SessionPhase::Playing);
        assert_eq!(clock.tick(61_000.0), Some(SessionPhase::OnBreak));
        assert_eq!(clock.phase_start(), 61_000.0);
    }

    #[test]
    fn test_break_to_play() {
        let mut clock = SessionClock::new(0.0);
        clock.tick(60_000.0);
        assert_eq!(clock.tick(119_999.0), None);
        assert_eq!(clock.tick(120_000.0), Some(SessionPhase::Playing));
        assert_eq!(clock.phase_start(), 120_000.0);
        // Next break is a full play period later
        assert_eq!(clock.tick(179_999.0), None);
        assert_eq!(clock.tick(180_000.0), Some(SessionPhase::OnBreak));
    }

    #[test]
    fn test_one_transition_per_tick() {
        // A long stall (hidden tab) still only flips once
        let mut clock = SessionClock::new(0.0);
        assert_eq!(clock.tick(500_000.0), Some(SessionPhase::OnBreak));
        assert_eq!(clock.phase_start(), 500_000.0);
    }

    #[test]
    fn test_time_remaining() {
        let mut clock = SessionClock::new(0.0);
        assert_eq!(clock.time_remaining(10.0), None);

        clock.tick(60_000.0);
        assert_eq!(clock.time_remaining(60_000.0), Some(60));
        assert_eq!(clock.time_remaining(60_999.0), Some(60));
        assert_eq!(clock.time_remaining(61_000.0), Some(59));
        assert_eq!(clock.time_remaining(119_500.0), Some(1));
        assert_eq!(clock.time_remaining(200_000.0), Some(0));
    }

    #[test]
    fn test_custom_durations() {
        let mut clock = SessionClock::with_durations(0.0, 5000.0, 2000.0);
        assert_eq!(clock.tick(5000.0), Some(SessionPhase::OnBreak));
        assert_eq!(clock.time_remaining(5000.0), Some(2));
        assert_eq!(clock.tick(7000.0), Some(SessionPhase::Playing));
    }
}
