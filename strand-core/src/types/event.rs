//! Trigger events produced by the scheduler
//!
//! A trigger event is one instruction to play one sound at one offset from
//! the moment its pattern was dispatched.

use crate::types::Instrument;
use std::time::Duration;

/// Velocity the scheduler assigns to every event
pub const DEFAULT_VELOCITY: f64 = 0.8;

/// One scheduled sound
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerEvent {
    /// Category resolved by the classifier
    pub instrument: Instrument,
    /// The source token, e.g. `bd` or `c4`
    pub note: String,
    /// Loudness in [0, 1]
    pub velocity: f64,
    /// Nominal length of the step in seconds
    #[cfg_attr(feature = "serde", serde(rename = "duration"))]
    pub duration_seconds: f64,
    /// When to fire, in seconds after dispatch
    #[cfg_attr(feature = "serde", serde(rename = "time"))]
    pub offset_seconds: f64,
}

impl TriggerEvent {
    pub fn new(
        instrument: Instrument,
        note: impl Into<String>,
        offset_seconds: f64,
        duration_seconds: f64,
    ) -> Self {
        Self {
            instrument,
            note: note.into(),
            velocity: DEFAULT_VELOCITY,
            duration_seconds: duration_seconds.max(0.0),
            offset_seconds: offset_seconds.max(0.0),
        }
    }

    /// Offset as a `std::time::Duration`, `None` if `offset_seconds` is
    /// NaN, negative or too large to represent
    pub fn offset(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.offset_seconds).ok()
    }
}
