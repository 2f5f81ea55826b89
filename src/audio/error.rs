use strand_core::Instrument;
use thiserror::Error;

/// Errors from the waveform synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("unsupported instrument '{0}'")]
    UnsupportedInstrument(Instrument),
}

/// Errors from the playback engine and the output device
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No usable output device; fatal at startup
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
    /// A single buffer could not be handed to the device
    #[error("failed to submit buffer: {0}")]
    SubmitFailed(String),
    #[error(transparent)]
    Unsupported(#[from] SynthError),
}
