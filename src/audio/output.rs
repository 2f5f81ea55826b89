//! Audio device boundary
//!
//! `AudioOutput` is the only thing the playback engine knows about the
//! device: hand it a buffer, get a voice handle back, release the handle
//! later. `CpalOutput` is the real device, `NullOutput` discards audio.

use super::error::PlaybackError;
use super::pcm::{PcmBuffer, CHANNELS, SAMPLE_RATE};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, SizedSample, Stream, StreamConfig, SupportedStreamConfig};
use crossbeam_channel::{bounded, Sender};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, error, info};

/// Identifies one submitted buffer until it is released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub u64);

impl fmt::Display for VoiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

/// A sink for PCM buffers
pub trait AudioOutput: Send + Sync {
    /// Start playing `buffer`; the returned handle stays valid until released
    fn submit(&self, buffer: PcmBuffer) -> Result<VoiceHandle, PlaybackError>;

    /// Stop and free a voice. Unknown handles are ignored.
    fn release(&self, handle: VoiceHandle);

    /// Human-readable name for logs
    fn name(&self) -> &str {
        "output"
    }
}

/// One buffer being mixed into the device stream
struct Voice {
    frames: Vec<[f32; 2]>,
    position: usize,
}

/// Sums every live voice into the output callback. Voices that have played
/// out stay silent until released.
#[derive(Default)]
struct Mixer {
    voices: HashMap<VoiceHandle, Voice>,
}

impl Mixer {
    fn process_audio<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: SizedSample + cpal::FromSample<f32>,
    {
        for frame in output.chunks_mut(channels) {
            let mut mixed = [0.0f32; 2];
            for voice in self.voices.values_mut() {
                if let Some(sample) = voice.frames.get(voice.position) {
                    mixed[0] += sample[0];
                    mixed[1] += sample[1];
                    voice.position += 1;
                }
            }

            if channels == 1 {
                frame[0] = T::from_sample(((mixed[0] + mixed[1]) * 0.5).clamp(-1.0, 1.0));
            } else {
                for (i, sample) in frame.iter_mut().enumerate() {
                    *sample = T::from_sample(mixed[i % 2].clamp(-1.0, 1.0));
                }
            }
        }
    }
}

/// Output on the system's default device through cpal.
///
/// The cpal stream is not `Send`, so it is built and owned by a dedicated
/// audio thread that lives until this value is dropped.
pub struct CpalOutput {
    mixer: Arc<Mutex<Mixer>>,
    next_handle: AtomicU64,
    shutdown_tx: Sender<()>,
    device_name: String,
}

impl CpalOutput {
    /// Open the default output device at `SAMPLE_RATE`
    pub fn new() -> Result<Self, PlaybackError> {
        let mixer = Arc::new(Mutex::new(Mixer::default()));
        let (ready_tx, ready_rx) = bounded(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let stream_mixer = mixer.clone();
        thread::Builder::new()
            .name("strand-audio".into())
            .spawn(move || match open_stream(stream_mixer) {
                Ok((stream, name)) => {
                    let _ = ready_tx.send(Ok(name));
                    // Blocks until the output is dropped; the stream goes with it
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    debug!("Audio thread stopped");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))?;

        let device_name = ready_rx.recv().map_err(|_| {
            PlaybackError::DeviceUnavailable("audio thread exited during setup".into())
        })??;

        info!("Audio output ready on '{}' at {} Hz", device_name, SAMPLE_RATE);

        Ok(Self {
            mixer,
            next_handle: AtomicU64::new(1),
            shutdown_tx,
            device_name,
        })
    }
}

impl AudioOutput for CpalOutput {
    fn submit(&self, buffer: PcmBuffer) -> Result<VoiceHandle, PlaybackError> {
        let frames = buffer.to_f32_frames();
        let handle = VoiceHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let mut mixer = self
            .mixer
            .lock()
            .map_err(|e| PlaybackError::SubmitFailed(format!("mixer lock poisoned: {}", e)))?;
        mixer.voices.insert(handle, Voice { frames, position: 0 });

        Ok(handle)
    }

    fn release(&self, handle: VoiceHandle) {
        match self.mixer.lock() {
            Ok(mut mixer) => {
                mixer.voices.remove(&handle);
            }
            Err(e) => error!("Could not release {}: {}", handle, e),
        }
    }

    fn name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Build and start the stream; runs on the audio thread
fn open_stream(mixer: Arc<Mutex<Mixer>>) -> Result<(Stream, String), PlaybackError> {
    let host = cpal::default_host();
    debug!("Audio host: {:?}", host.id());

    let device = host
        .default_output_device()
        .ok_or_else(|| PlaybackError::DeviceUnavailable("no output device available".into()))?;
    let name = device.name().unwrap_or_else(|_| "unknown device".into());

    let supported = pick_config(&device)?;
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();
    debug!("Stream config: {:?} ({:?})", config, sample_format);

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, mixer)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, mixer)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, mixer)?,
        other => {
            return Err(PlaybackError::DeviceUnavailable(format!(
                "unsupported sample format: {:?}",
                other
            )))
        }
    };

    stream
        .play()
        .map_err(|e| PlaybackError::DeviceUnavailable(format!("failed to start stream: {}", e)))?;

    Ok((stream, name))
}

/// Choose a device config that runs at `SAMPLE_RATE`, preferring stereo
/// and then f32 samples
fn pick_config(device: &cpal::Device) -> Result<SupportedStreamConfig, PlaybackError> {
    let rate = SampleRate(SAMPLE_RATE);
    let configs = device
        .supported_output_configs()
        .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))?;

    configs
        .filter(|c| c.min_sample_rate() <= rate && rate <= c.max_sample_rate())
        .max_by_key(|c| {
            (
                c.channels() == CHANNELS,
                c.sample_format() == SampleFormat::F32,
            )
        })
        .map(|c| c.with_sample_rate(rate))
        .ok_or_else(|| {
            PlaybackError::DeviceUnavailable(format!("no output config at {} Hz", SAMPLE_RATE))
        })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<Stream, PlaybackError>
where
    T: SizedSample + cpal::FromSample<f32> + Send + 'static,
{
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| match mixer.lock() {
                Ok(mut mixer) => mixer.process_audio(data, channels),
                Err(_) => data.fill(T::EQUILIBRIUM),
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| PlaybackError::DeviceUnavailable(format!("failed to build stream: {}", e)))
}

/// Accepts and discards every buffer. Used with `--no-audio`.
#[derive(Debug, Default)]
pub struct NullOutput {
    next_handle: AtomicU64,
    submitted: AtomicUsize,
    released: AtomicUsize,
}

impl NullOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl AudioOutput for NullOutput {
    fn submit(&self, _buffer: PcmBuffer) -> Result<VoiceHandle, PlaybackError> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(VoiceHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
    }

    fn release(&self, _handle: VoiceHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "null"
    }
}
