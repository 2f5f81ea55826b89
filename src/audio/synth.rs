//! Procedural waveform synthesizer
//!
//! Renders one-shot kick, snare, hi-hat and synth voices into `PcmBuffer`s.
//! Rendering is deterministic: the drum "noise" is a sum of sines at
//! incommensurate angular rates rather than a random source, so the same
//! instrument and note always give the same bytes.

use super::envelope::{AdsrEnvelope, AdsrParams};
use super::error::SynthError;
use super::pcm::{PcmBuffer, SAMPLE_RATE};
use std::f64::consts::PI;
use strand_core::Instrument;

/// Frequency used for note names outside the lookup table (A4)
pub const DEFAULT_FREQUENCY: f64 = 440.0;

/// Note table, c4 through e5. Deliberately small: anything else plays A4.
const NOTE_FREQUENCIES: &[(&str, f64)] = &[
    ("c4", 261.63),
    ("d4", 293.66),
    ("e4", 329.63),
    ("f4", 349.23),
    ("g4", 392.00),
    ("a4", 440.00),
    ("b4", 493.88),
    ("c5", 523.25),
    ("d5", 587.33),
    ("e5", 659.25),
];

/// Frequency for a note name (case-insensitive), A4 if unknown
pub fn note_to_frequency(note: &str) -> f64 {
    let note = note.to_lowercase();
    NOTE_FREQUENCIES
        .iter()
        .find(|(name, _)| *name == note)
        .map(|(_, freq)| *freq)
        .unwrap_or(DEFAULT_FREQUENCY)
}

/// Length in seconds of the voice for `instrument`, `None` if it has none
pub fn duration_seconds(instrument: Instrument) -> Option<f64> {
    Voice::for_instrument(instrument).map(Voice::duration)
}

/// Render the voice for `instrument`. `note` picks the pitch of synth
/// voices and is ignored by drums.
pub fn synthesize(instrument: Instrument, note: Option<&str>) -> Result<PcmBuffer, SynthError> {
    Ok(ToneGenerator::new(instrument, note)?.render())
}

/// Instruments with a waveform. Built only through `Voice::for_instrument`,
/// so rendering never sees an instrument without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Voice {
    Kick,
    Snare,
    HiHat,
    Synth,
}

impl Voice {
    fn for_instrument(instrument: Instrument) -> Option<Self> {
        match instrument {
            Instrument::Kick => Some(Voice::Kick),
            Instrument::Snare => Some(Voice::Snare),
            Instrument::HiHat => Some(Voice::HiHat),
            Instrument::Synth => Some(Voice::Synth),
            Instrument::OpenHat | Instrument::Clap | Instrument::Cymbal | Instrument::Sample => None,
        }
    }

    fn duration(self) -> f64 {
        match self {
            Voice::Kick => 0.5,
            Voice::Snare => 0.2,
            Voice::HiHat => 0.1,
            Voice::Synth => 0.3,
        }
    }
}

/// A one-shot voice generator, one sample at a time
pub struct ToneGenerator {
    voice: Voice,
    /// Pitch for synth voices
    frequency: f64,
    envelope: AdsrEnvelope,
    sample_rate: f64,
    /// Current sample count (for time calculation)
    sample_count: usize,
    /// Samples until the voice is finished
    max_samples: usize,
}

impl ToneGenerator {
    pub fn new(instrument: Instrument, note: Option<&str>) -> Result<Self, SynthError> {
        let voice = Voice::for_instrument(instrument)
            .ok_or(SynthError::UnsupportedInstrument(instrument))?;
        let duration = voice.duration();
        let sample_rate = SAMPLE_RATE as f64;

        Ok(Self {
            voice,
            frequency: note.map_or(DEFAULT_FREQUENCY, note_to_frequency),
            envelope: AdsrEnvelope::new(AdsrParams::default(), duration),
            sample_rate,
            sample_count: 0,
            max_samples: (sample_rate * duration) as usize,
        })
    }

    /// Current time in seconds
    #[inline]
    fn time(&self) -> f64 {
        self.sample_count as f64 / self.sample_rate
    }

    pub fn is_finished(&self) -> bool {
        self.sample_count >= self.max_samples
    }

    /// Total length in samples
    pub fn len(&self) -> usize {
        self.max_samples
    }

    pub fn is_empty(&self) -> bool {
        self.max_samples == 0
    }

    /// Next sample in [-1, 1]; 0.0 once finished
    pub fn next_sample(&mut self) -> f64 {
        if self.is_finished() {
            return 0.0;
        }

        let t = self.time();
        let sample = match self.voice {
            Voice::Kick => kick(t),
            Voice::Snare => snare(t),
            Voice::HiHat => hihat(t),
            Voice::Synth => self.synth(t),
        };

        self.sample_count += 1;
        sample
    }

    /// Render the remaining samples into a buffer
    pub fn render(mut self) -> PcmBuffer {
        let mut buffer = PcmBuffer::with_frames(self.max_samples - self.sample_count);
        while !self.is_finished() {
            let sample = self.next_sample();
            buffer.push_mono(sample);
        }
        buffer
    }

    /// Sawtooth through the ADSR envelope
    fn synth(&self, t: f64) -> f64 {
        let phase = self.frequency * t;
        let saw = 2.0 * (phase - phase.floor()) - 1.0;
        self.envelope.level(t) * saw * 0.2
    }
}

/// Kick: sine whose pitch sweeps down from 60 Hz
fn kick(t: f64) -> f64 {
    let freq = 60.0 * (-t * 8.0).exp();
    let envelope = (-t * 5.0).exp();
    envelope * (2.0 * PI * freq * t).sin() * 0.5
}

/// Snare: sine-sum noise plus a 200 Hz body
fn snare(t: f64) -> f64 {
    let noise = ((t * 12345.0).sin() + (t * 23456.0).sin() + (t * 34567.0).sin()) / 3.0;
    let tone = (2.0 * PI * 200.0 * t).sin();
    let envelope = (-t * 15.0).exp();
    envelope * (0.7 * noise + 0.3 * tone) * 0.3
}

/// Hi-hat: higher sine-sum noise with a very short decay
fn hihat(t: f64) -> f64 {
    let noise = ((t * 54321.0).sin() + (t * 65432.0).sin() + (t * 76543.0).sin()) / 3.0;
    let envelope = (-t * 25.0).exp();
    envelope * noise * 0.2
}
