//! Engine configuration
//!
//! Plain data with defaults and builder methods; the binary fills it in
//! from command-line flags and validates it before the engine starts.

use anyhow::{ensure, Result};
use std::time::Duration;
use strand_core::TempoRange;

/// Longest synthesized voice (the kick); voices must not be released
/// before they finish playing
pub const LONGEST_VOICE: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Delay between submitting a voice and releasing it
    pub grace_period: Duration,
    /// Tempos outside this range are clamped before scheduling
    pub tempo_range: TempoRange,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(1),
            tempo_range: TempoRange::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_tempo_range(mut self, min_bpm: u32, max_bpm: u32) -> Self {
        self.tempo_range = TempoRange {
            min_bpm,
            max_bpm,
        };
        self
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grace_period > LONGEST_VOICE,
            "grace period {:?} must be longer than the longest voice ({:?})",
            self.grace_period,
            LONGEST_VOICE
        );
        ensure!(
            self.tempo_range.min_bpm > 0,
            "minimum tempo must be positive"
        );
        ensure!(
            self.tempo_range.min_bpm <= self.tempo_range.max_bpm,
            "minimum tempo {} is above maximum tempo {}",
            self.tempo_range.min_bpm,
            self.tempo_range.max_bpm
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.grace_period, Duration::from_secs(1));
        assert_eq!(config.tempo_range.min_bpm, 20);
        assert_eq!(config.tempo_range.max_bpm, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_grace_period_rejected() {
        let config = EngineConfig::new().with_grace_period(Duration::from_millis(400));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("grace period"));

        let config = EngineConfig::new().with_grace_period(Duration::from_millis(500));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tempo_bounds_rejected() {
        assert!(EngineConfig::new().with_tempo_range(0, 100).validate().is_err());
        assert!(EngineConfig::new().with_tempo_range(200, 100).validate().is_err());
        assert!(EngineConfig::new().with_tempo_range(60, 60).validate().is_ok());
    }
}
