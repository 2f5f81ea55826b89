//! # Strand
//!
//! Strand turns short live-coding patterns such as `bd ~ sn hh` into timed
//! trigger events and plays them with procedurally synthesized drums and a
//! small sawtooth synth.
//!
//! ## Modules
//!
//! - `audio`: PCM buffers, the waveform synthesizer, the output device
//!   boundary, and the playback engine with its event dispatcher thread.
//! - `config`: Engine settings (grace period, tempo range).
//! - `session`: Evaluates pattern text and hands the events to the engine.
//! - `commands`: REPL command registry.
//! - `repl`: Interactive front end with file watching.
//!
//! Parsing and scheduling live in the audio-free `strand-core` crate.

pub mod audio;
pub mod commands;
pub mod config;
pub mod repl;
pub mod session;

// Re-export commonly used types and functions for convenience
pub use crate::audio::{PlaybackEngine, PlaybackError};
pub use crate::config::EngineConfig;
pub use crate::session::{Session, Submission};
pub use strand_core::{evaluate, parse, schedule, EvaluationResult, Instrument, TriggerEvent};
