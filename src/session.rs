//! One evaluation session: text in, result out, events off to the engine
//!
//! `submit` is the whole request path. It evaluates the text, hands any
//! events to the playback engine and returns the result straight away;
//! audio happens later on the dispatcher thread.

use crate::audio::{PlaybackEngine, RequestId};
use crate::config::EngineConfig;
use strand_core::{EvaluationResult, Evaluator};
use tracing::info;

/// Result of one submission
#[derive(Debug, Clone)]
pub struct Submission {
    pub result: EvaluationResult,
    /// Set when events were handed to the engine
    pub request: Option<RequestId>,
}

pub struct Session {
    evaluator: Evaluator,
    engine: PlaybackEngine,
}

impl Session {
    pub fn new(engine: PlaybackEngine) -> Self {
        let evaluator = Evaluator::new(engine.config().tempo_range);
        Self { evaluator, engine }
    }

    /// Evaluate `text` and schedule its events. Never blocks on playback.
    pub fn submit(&self, text: &str) -> Submission {
        let result = self.evaluator.evaluate(text);

        let request = if result.success && !result.events.is_empty() {
            let request = self.engine.schedule_events(result.events.clone());
            info!(
                "Request {}: {} ({} events)",
                request,
                result
                    .pattern
                    .as_ref()
                    .map_or("?", |pattern| pattern.name.as_str()),
                result.events.len()
            );
            Some(request)
        } else {
            None
        };

        Submission { result, request }
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }
}
