// strand-core/src/types/mod.rs

pub mod evaluation;
pub mod event;
pub mod instrument;
pub mod pattern;

pub use evaluation::EvaluationResult;
pub use event::TriggerEvent;
pub use instrument::{classify, Instrument};
pub use pattern::{is_rest, Pattern, DEFAULT_TEMPO_BPM, REST};
