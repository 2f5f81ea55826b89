//! Evaluation: pattern text in, `EvaluationResult` out
//!
//! The evaluator never fails. Parse errors become a result with
//! `success = false`, and tempos outside the accepted range are clamped
//! before scheduling so a tiny `bpm` cannot stretch a pattern over minutes.

use crate::parser::parse;
use crate::scheduler::schedule;
use crate::types::{EvaluationResult, Pattern};
use tracing::{debug, warn};

/// Inclusive tempo bounds applied before scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoRange {
    pub min_bpm: u32,
    pub max_bpm: u32,
}

impl TempoRange {
    pub const DEFAULT_MIN_BPM: u32 = 20;
    pub const DEFAULT_MAX_BPM: u32 = 400;

    /// Bounds are reordered if given backwards; zero is lifted to 1
    pub fn new(min_bpm: u32, max_bpm: u32) -> Self {
        let (lo, hi) = if min_bpm <= max_bpm {
            (min_bpm, max_bpm)
        } else {
            (max_bpm, min_bpm)
        };
        Self {
            min_bpm: lo.max(1),
            max_bpm: hi.max(1),
        }
    }

    pub fn clamp(&self, bpm: u32) -> u32 {
        bpm.clamp(self.min_bpm, self.max_bpm)
    }

    pub fn contains(&self, bpm: u32) -> bool {
        (self.min_bpm..=self.max_bpm).contains(&bpm)
    }
}

impl Default for TempoRange {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_BPM, Self::DEFAULT_MAX_BPM)
    }
}

/// Runs parse → tempo clamp → schedule for one input string
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    tempo_range: TempoRange,
}

impl Evaluator {
    pub fn new(tempo_range: TempoRange) -> Self {
        Self { tempo_range }
    }

    pub fn tempo_range(&self) -> TempoRange {
        self.tempo_range
    }

    /// Evaluate one pattern string
    pub fn evaluate(&self, text: &str) -> EvaluationResult {
        debug!("Evaluating pattern: {}", text);

        match parse(text) {
            Ok(pattern) => {
                let pattern = self.clamp_tempo(pattern);
                let events = schedule(&pattern);
                EvaluationResult::success(pattern, events)
            }
            Err(e) => EvaluationResult::failure(e),
        }
    }

    /// Clamp `tempo_bpm` into the accepted range, warning when it changes
    pub fn clamp_tempo(&self, mut pattern: Pattern) -> Pattern {
        let clamped = self.tempo_range.clamp(pattern.tempo_bpm);
        if clamped != pattern.tempo_bpm {
            warn!(
                "Pattern '{}' tempo {} bpm outside {}-{}, using {}",
                pattern.name,
                pattern.tempo_bpm,
                self.tempo_range.min_bpm,
                self.tempo_range.max_bpm,
                clamped
            );
            pattern.tempo_bpm = clamped;
        }
        pattern
    }
}

/// Evaluate with the default tempo range
pub fn evaluate(text: &str) -> EvaluationResult {
    Evaluator::default().evaluate(text)
}
