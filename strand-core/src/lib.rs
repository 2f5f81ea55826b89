//! # Strand Core
//!
//! Audio-free core of the Strand live-coding backend. Turns a short pattern
//! string into a structured [`Pattern`] and then into a time-ordered list of
//! [`TriggerEvent`]s, without touching any audio device.
//!
//! ## Features
//!
//! - **serde**: Enable JSON serialization of patterns, events and
//!   evaluation results
//!
//! ## Example
//!
//! ```
//! use strand_core::{parse, schedule, Instrument};
//!
//! let pattern = parse("d1 $ sound \"bd sn\" bpm 90").unwrap();
//! let events = schedule(&pattern);
//! assert_eq!(events[0].instrument, Instrument::Kick);
//! assert_eq!(events[1].instrument, Instrument::Snare);
//! ```

pub mod evaluator;
pub mod parser;
pub mod scheduler;
pub mod types;

// Re-export commonly used types
pub use evaluator::{evaluate, Evaluator, TempoRange};
pub use parser::{parse, ParseError};
pub use scheduler::schedule;
pub use types::{classify, EvaluationResult, Instrument, Pattern, TriggerEvent};
