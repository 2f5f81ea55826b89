//! Piecewise-linear ADSR envelope for one-shot synth voices
//!
//! Unlike a held-note envelope there is no note-off: the release is pinned
//! to the end of the voice, so the level is a pure function of time.
//!
//! # Example
//! ```ignore
//! let env = AdsrEnvelope::new(AdsrParams::default(), 0.3);
//! let amplitude = env.level(0.1);
//! ```

/// ADSR envelope stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Rising from 0 to peak (1.0)
    Attack,
    /// Falling from peak to sustain level
    Decay,
    /// Holding at sustain level
    Sustain,
    /// Falling from sustain level to 0 at the end of the voice
    Release,
}

/// ADSR envelope parameters
///
/// - `attack`: Time in seconds to rise from 0 to peak (1.0)
/// - `decay`: Time in seconds to fall from peak to sustain level
/// - `sustain`: Level to hold (0.0-1.0, NOT time!)
/// - `release`: Time in seconds to fall from sustain to 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl AdsrParams {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for AdsrParams {
    /// Short pluck: 50 ms attack, 100 ms decay to half level, 150 ms release
    fn default() -> Self {
        Self::new(0.05, 0.1, 0.5, 0.15)
    }
}

/// Envelope for a voice of fixed length
#[derive(Debug, Clone, Copy)]
pub struct AdsrEnvelope {
    params: AdsrParams,
    duration: f64,
}

impl AdsrEnvelope {
    pub fn new(params: AdsrParams, duration: f64) -> Self {
        Self { params, duration }
    }

    pub fn params(&self) -> AdsrParams {
        self.params
    }

    /// Stage at `t` seconds after onset
    pub fn stage(&self, t: f64) -> EnvelopeStage {
        let p = &self.params;
        if t < p.attack {
            EnvelopeStage::Attack
        } else if t < p.attack + p.decay {
            EnvelopeStage::Decay
        } else if t < self.duration - p.release {
            EnvelopeStage::Sustain
        } else {
            EnvelopeStage::Release
        }
    }

    /// Amplitude at `t` seconds after onset
    pub fn level(&self, t: f64) -> f64 {
        let p = &self.params;
        match self.stage(t) {
            EnvelopeStage::Attack => t / p.attack,
            EnvelopeStage::Decay => 1.0 - (1.0 - p.sustain) * (t - p.attack) / p.decay,
            EnvelopeStage::Sustain => p.sustain,
            EnvelopeStage::Release => p.sustain * (self.duration - t) / p.release,
        }
    }
}
