//! Playback engine
//!
//! Owns the one output context for the process, the registry of voices
//! currently on the device, and the dispatcher thread that fires scheduled
//! events. Nothing here is global: the engine is created once at startup
//! and passed to whoever needs it.

use super::error::PlaybackError;
use super::event_dispatcher::{DispatcherHandle, EventDispatcher, RequestId};
use super::output::{AudioOutput, CpalOutput, VoiceHandle};
use super::synth::synthesize;
use crate::config::EngineConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use strand_core::{Instrument, TriggerEvent};
use tracing::{debug, info};

/// What a live voice is playing
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveVoice {
    pub instrument: Instrument,
    pub note: Option<String>,
    pub started: Instant,
}

/// Voices submitted to the output and not yet released
#[derive(Debug, Default)]
pub struct VoiceRegistry {
    voices: Mutex<HashMap<VoiceHandle, ActiveVoice>>,
}

impl VoiceRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<VoiceHandle, ActiveVoice>> {
        // The map is valid after any panic, so a poisoned lock is still usable
        self.voices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, handle: VoiceHandle, voice: ActiveVoice) {
        self.lock().insert(handle, voice);
    }

    pub fn remove(&self, handle: VoiceHandle) -> Option<ActiveVoice> {
        self.lock().remove(&handle)
    }

    /// Remove every entry, returning the handles that were live
    pub fn drain(&self) -> Vec<VoiceHandle> {
        self.lock().drain().map(|(handle, _)| handle).collect()
    }

    pub fn snapshot(&self) -> Vec<(VoiceHandle, ActiveVoice)> {
        let mut voices: Vec<_> = self
            .lock()
            .iter()
            .map(|(handle, voice)| (*handle, voice.clone()))
            .collect();
        voices.sort_by_key(|(handle, _)| *handle);
        voices
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Synthesizes and submits voices, one at a time
pub struct Player {
    output: Arc<dyn AudioOutput>,
    /// Serializes synthesis and submit
    play_lock: Mutex<()>,
    registry: VoiceRegistry,
}

impl Player {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            play_lock: Mutex::new(()),
            registry: VoiceRegistry::default(),
        }
    }

    /// Render `instrument` and hand it to the output. The voice stays
    /// registered until `release` is called.
    pub fn play(
        &self,
        instrument: Instrument,
        note: Option<&str>,
    ) -> Result<VoiceHandle, PlaybackError> {
        let _guard = self.play_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let buffer = synthesize(instrument, note)?;
        let handle = self.output.submit(buffer)?;
        self.registry.insert(
            handle,
            ActiveVoice {
                instrument,
                note: note.map(str::to_string),
                started: Instant::now(),
            },
        );
        Ok(handle)
    }

    /// Release one voice; a handle that is already gone is ignored
    pub fn release(&self, handle: VoiceHandle) {
        if self.registry.remove(handle).is_some() {
            self.output.release(handle);
        }
    }

    /// Release every live voice, returning how many there were
    pub fn release_all(&self) -> usize {
        let handles = self.registry.drain();
        for handle in &handles {
            self.output.release(*handle);
        }
        handles.len()
    }

    pub fn active_voices(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    pub fn output_name(&self) -> &str {
        self.output.name()
    }
}

/// Front door for all audio: direct plays and scheduled event batches
pub struct PlaybackEngine {
    player: Arc<Player>,
    dispatcher: DispatcherHandle,
    thread: Option<JoinHandle<()>>,
    config: EngineConfig,
}

impl PlaybackEngine {
    /// Engine on top of an existing output
    pub fn new(output: Arc<dyn AudioOutput>, config: EngineConfig) -> Result<Self, PlaybackError> {
        let player = Arc::new(Player::new(output));
        let (dispatcher, thread) = EventDispatcher::spawn(player.clone(), config.grace_period)
            .map_err(|e| {
                PlaybackError::DeviceUnavailable(format!("failed to start dispatcher: {}", e))
            })?;

        info!(
            "Playback engine started on '{}' (grace period {:?})",
            player.output_name(),
            config.grace_period
        );

        Ok(Self {
            player,
            dispatcher,
            thread: Some(thread),
            config,
        })
    }

    /// Engine on the system's default audio device
    pub fn with_default_output(config: EngineConfig) -> Result<Self, PlaybackError> {
        let output = CpalOutput::new()?;
        Self::new(Arc::new(output), config)
    }

    /// Play one sound now; it is released after the grace period
    pub fn play(
        &self,
        instrument: Instrument,
        note: Option<&str>,
    ) -> Result<VoiceHandle, PlaybackError> {
        let handle = self.player.play(instrument, note)?;
        self.dispatcher
            .release_after(handle, self.config.grace_period);
        Ok(handle)
    }

    /// Queue events to fire at their offsets from now. Returns immediately.
    pub fn schedule_events(&self, events: Vec<TriggerEvent>) -> RequestId {
        self.dispatcher.schedule(events, Instant::now())
    }

    /// Withdraw the not-yet-fired events of one request
    pub fn cancel(&self, request: RequestId) {
        self.dispatcher.cancel(request);
    }

    /// Withdraw every pending event and silence every voice
    pub fn stop_all(&self) {
        self.dispatcher.stop_all();
    }

    pub fn active_voices(&self) -> usize {
        self.player.active_voices()
    }

    pub fn voices(&self) -> Vec<(VoiceHandle, ActiveVoice)> {
        self.player.registry().snapshot()
    }

    pub fn pending_events(&self) -> usize {
        self.dispatcher.pending_events()
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }

    pub fn output_name(&self) -> &str {
        self.player.output_name()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Block until nothing is queued and every voice has been released, or
    /// until `timeout`. Returns whether the engine went idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.pending_events() == 0 && self.active_voices() == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Stop the dispatcher thread, releasing every voice. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.dispatcher.shutdown();
            if thread.join().is_err() {
                debug!("Dispatcher thread panicked during shutdown");
            }
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::NullOutput;

    fn engine(grace_ms: u64) -> (PlaybackEngine, Arc<NullOutput>) {
        let output = Arc::new(NullOutput::new());
        let config = EngineConfig::new().with_grace_period(Duration::from_millis(grace_ms));
        (PlaybackEngine::new(output.clone(), config).unwrap(), output)
    }

    #[test]
    fn test_player_registry() {
        let output = Arc::new(NullOutput::new());
        let player = Player::new(output.clone());

        let a = player.play(Instrument::Kick, None).unwrap();
        let b = player.play(Instrument::Synth, Some("c4")).unwrap();
        assert_eq!(player.active_voices(), 2);

        let voices = player.registry().snapshot();
        assert_eq!(voices[1].1.note.as_deref(), Some("c4"));

        player.release(a);
        player.release(a);
        assert_eq!(player.active_voices(), 1);
        assert_eq!(output.released(), 1);

        assert_eq!(player.release_all(), 1);
        assert_eq!(output.released(), 2);
        let _ = b;
    }

    #[test]
    fn test_unsupported_play_is_an_error() {
        let (engine, output) = engine(600);
        let err = engine.play(Instrument::Cymbal, None).unwrap_err();
        assert!(matches!(err, PlaybackError::Unsupported(_)));
        assert_eq!(output.submitted(), 0);
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn test_direct_play_is_released() {
        let (engine, output) = engine(600);
        engine.play(Instrument::Snare, None).unwrap();
        assert_eq!(engine.active_voices(), 1);

        assert!(engine.wait_until_idle(Duration::from_secs(3)));
        assert_eq!(output.released(), 1);
    }

    #[test]
    fn test_stop_all_releases_everything() {
        let (engine, output) = engine(10_000);
        engine.play(Instrument::Kick, None).unwrap();
        engine.schedule_events(vec![TriggerEvent::new(Instrument::Kick, "bd", 10.0, 0.1)]);
        assert_eq!(engine.pending_events(), 1);

        engine.stop_all();
        assert!(engine.wait_until_idle(Duration::from_secs(1)));
        assert_eq!(output.submitted(), 1);
        assert_eq!(output.released(), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (mut engine, _output) = engine(600);
        engine.shutdown();
        engine.shutdown();
        assert!(!engine.is_running());
    }
}
