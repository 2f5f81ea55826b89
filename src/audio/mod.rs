pub mod envelope;
pub mod error;
pub mod event_dispatcher;
pub mod output;
pub mod pcm;
pub mod playback_engine;
pub mod synth;

pub use error::{PlaybackError, SynthError};
pub use event_dispatcher::RequestId;
pub use output::{AudioOutput, CpalOutput, NullOutput, VoiceHandle};
pub use pcm::{PcmBuffer, SAMPLE_RATE};
pub use playback_engine::{ActiveVoice, PlaybackEngine};
pub use synth::synthesize;
