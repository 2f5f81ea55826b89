//! Tempo math: pattern → trigger events
//!
//! One pattern spans exactly one beat. Every element gets an equal step of
//! that beat, and each non-rest element fires at the start of its step.

use crate::types::{classify, is_rest, Pattern, TriggerEvent};

/// Share of a step an event's nominal duration covers
pub const GATE: f64 = 0.9;

/// Seconds per beat at `tempo_bpm`
pub fn beat_duration(tempo_bpm: u32) -> f64 {
    60.0 / tempo_bpm.max(1) as f64
}

/// Seconds allotted to each element of `pattern`
pub fn step_duration(pattern: &Pattern) -> f64 {
    beat_duration(pattern.tempo_bpm) / pattern.len().max(1) as f64
}

/// Turn a pattern into trigger events, ordered by offset.
///
/// Rests keep their slot but emit nothing, so a pattern of only rests yields
/// an empty list.
pub fn schedule(pattern: &Pattern) -> Vec<TriggerEvent> {
    let step = step_duration(pattern);

    pattern
        .elements
        .iter()
        .enumerate()
        .filter(|(_, element)| !is_rest(element))
        .map(|(i, element)| {
            TriggerEvent::new(classify(element), element.as_str(), i as f64 * step, step * GATE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Instrument;

    fn pattern(bpm: u32, elements: &[&str]) -> Pattern {
        Pattern::new("test", elements.join(" "))
            .with_tempo(bpm)
            .with_elements(elements.iter().copied())
    }

    #[test]
    fn test_beat_duration() {
        assert_eq!(beat_duration(120), 0.5);
        assert_eq!(beat_duration(60), 1.0);
    }

    #[test]
    fn test_four_steps_at_120() {
        let events = schedule(&pattern(120, &["bd", "sn", "hh", "c4"]));
        let offsets: Vec<f64> = events.iter().map(|e| e.offset_seconds).collect();
        assert_eq!(offsets, vec![0.0, 0.125, 0.25, 0.375]);

        for event in &events {
            assert!((event.duration_seconds - 0.1125).abs() < 1e-12);
            assert_eq!(event.velocity, 0.8);
        }
        assert_eq!(events[3].instrument, Instrument::Synth);
        assert_eq!(events[3].note, "c4");
    }

    #[test]
    fn test_rests_keep_their_slot() {
        let events = schedule(&pattern(60, &["bd", "~", "sn", "~"]));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].offset_seconds, 0.0);
        assert_eq!(events[1].offset_seconds, 0.5);
    }

    #[test]
    fn test_only_rests_is_empty() {
        assert!(schedule(&pattern(120, &["~", "~", "~"])).is_empty());
        assert!(schedule(&pattern(120, &[])).is_empty());
    }

    #[test]
    fn test_sample_tokens_still_scheduled() {
        let events = schedule(&pattern(120, &["arpy"]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].instrument, Instrument::Sample);
    }
}
