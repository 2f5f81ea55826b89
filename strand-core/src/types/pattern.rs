//! Structured form of a parsed pattern string

use std::fmt;

/// Tempo used when a pattern does not carry a usable `bpm` value
pub const DEFAULT_TEMPO_BPM: u32 = 120;

/// Rest marker: keeps its step slot but never produces audio
pub const REST: &str = "~";

/// A parsed pattern, e.g. `d1 $ sound "bd ~ sn hh" bpm 90`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    /// Name from a `name $ body` assignment, `"unnamed"` otherwise
    pub name: String,
    /// Text after the assignment prefix (the whole input if there is none)
    #[cfg_attr(feature = "serde", serde(rename = "pattern"))]
    pub raw_body: String,
    /// Tempo in beats per minute, always > 0
    #[cfg_attr(feature = "serde", serde(rename = "bpm"))]
    pub tempo_bpm: u32,
    /// Step tokens in source order, rests included
    pub elements: Vec<String>,
}

impl Pattern {
    /// Name given to patterns without an assignment prefix
    pub const UNNAMED: &'static str = "unnamed";

    pub fn new(name: impl Into<String>, raw_body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_body: raw_body.into(),
            tempo_bpm: DEFAULT_TEMPO_BPM,
            elements: Vec::new(),
        }
    }

    /// Set the tempo; zero falls back to the default
    pub fn with_tempo(mut self, bpm: u32) -> Self {
        self.tempo_bpm = if bpm > 0 { bpm } else { DEFAULT_TEMPO_BPM };
        self
    }

    pub fn with_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements = elements.into_iter().map(Into::into).collect();
        self
    }

    /// Number of step slots (rests count)
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements that will produce a trigger event
    pub fn playable_count(&self) -> usize {
        self.elements.iter().filter(|e| !is_rest(e)).count()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} bpm: [{}]",
            self.name,
            self.tempo_bpm,
            self.elements.join(" ")
        )
    }
}

/// True for rest markers and empty placeholders
pub fn is_rest(element: &str) -> bool {
    element.is_empty() || element == REST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let pattern = Pattern::new(Pattern::UNNAMED, "bd sn");
        assert_eq!(pattern.tempo_bpm, DEFAULT_TEMPO_BPM);
        assert!(pattern.is_empty());
    }

    #[test]
    fn test_zero_tempo_falls_back() {
        let pattern = Pattern::new("d1", "").with_tempo(0);
        assert_eq!(pattern.tempo_bpm, 120);
    }

    #[test]
    fn test_playable_count_skips_rests() {
        let pattern = Pattern::new("d1", "").with_elements(["bd", "~", "sn", "~"]);
        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern.playable_count(), 2);
    }

    #[test]
    fn test_display() {
        let pattern = Pattern::new("d1", "")
            .with_tempo(90)
            .with_elements(["bd", "sn"]);
        assert_eq!(pattern.to_string(), "d1 @ 90 bpm: [bd sn]");
    }
}
