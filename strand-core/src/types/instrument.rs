//! Instrument categories and token classification
//!
//! Provides `Instrument` with TidalCycles-style drum aliases and the total
//! `classify` function that maps any pattern token to a category.

use std::fmt;

/// Instrument category a pattern token resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Instrument {
    /// Bass drum (`bd`, `kick`)
    Kick,
    /// Snare drum (`sn`, `snare`)
    Snare,
    /// Closed hi-hat (`hh`, `hihat`)
    #[cfg_attr(feature = "serde", serde(rename = "hihat"))]
    HiHat,
    /// Open hi-hat (`oh`, `openhat`)
    #[cfg_attr(feature = "serde", serde(rename = "openhat"))]
    OpenHat,
    /// Hand clap (`cp`, `clap`)
    Clap,
    /// Cymbal (`cy`, `cymbal`)
    Cymbal,
    /// Tonal synth voice, triggered by note names like `c4` or `f#`
    Synth,
    /// Anything else: a named sample we do not synthesize
    Sample,
}

impl Instrument {
    /// Look up a drum alias (case-insensitive)
    pub fn from_alias(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bd" | "kick" => Some(Instrument::Kick),
            "sn" | "snare" => Some(Instrument::Snare),
            "hh" | "hihat" => Some(Instrument::HiHat),
            "oh" | "openhat" => Some(Instrument::OpenHat),
            "cp" | "clap" => Some(Instrument::Clap),
            "cy" | "cymbal" => Some(Instrument::Cymbal),
            _ => None,
        }
    }

    /// Stable lower-case name, matches the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Kick => "kick",
            Instrument::Snare => "snare",
            Instrument::HiHat => "hihat",
            Instrument::OpenHat => "openhat",
            Instrument::Clap => "clap",
            Instrument::Cymbal => "cymbal",
            Instrument::Synth => "synth",
            Instrument::Sample => "sample",
        }
    }

    /// Whether the procedural synthesizer has a voice for this category
    pub fn is_synthesizable(&self) -> bool {
        matches!(
            self,
            Instrument::Kick | Instrument::Snare | Instrument::HiHat | Instrument::Synth
        )
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a pattern token. Never fails: unknown tokens become `Sample`.
pub fn classify(token: &str) -> Instrument {
    if let Some(instrument) = Instrument::from_alias(token) {
        return instrument;
    }

    if is_note_name(&token.to_lowercase()) {
        return Instrument::Synth;
    }

    Instrument::Sample
}

/// Note-name shape: one of `a..g`, optional `#`/`b`, optional octave digit
fn is_note_name(s: &str) -> bool {
    let mut chars = s.chars().peekable();

    match chars.next() {
        Some('a'..='g') => {}
        _ => return false,
    }
    if matches!(chars.peek(), Some('#') | Some('b')) {
        chars.next();
    }
    if matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
        chars.next();
    }

    chars.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drum_aliases() {
        assert_eq!(classify("bd"), Instrument::Kick);
        assert_eq!(classify("kick"), Instrument::Kick);
        assert_eq!(classify("sn"), Instrument::Snare);
        assert_eq!(classify("hh"), Instrument::HiHat);
        assert_eq!(classify("oh"), Instrument::OpenHat);
        assert_eq!(classify("cp"), Instrument::Clap);
        assert_eq!(classify("cymbal"), Instrument::Cymbal);
        assert_eq!(classify("KICK"), Instrument::Kick); // case insensitive
    }

    #[test]
    fn test_note_names() {
        assert_eq!(classify("c#4"), Instrument::Synth);
        assert_eq!(classify("a"), Instrument::Synth);
        assert_eq!(classify("eb"), Instrument::Synth);
        assert_eq!(classify("G5"), Instrument::Synth);
        assert_eq!(classify("bb3"), Instrument::Synth);
    }

    #[test]
    fn test_everything_else_is_sample() {
        assert_eq!(classify("xyz"), Instrument::Sample);
        assert_eq!(classify("h4"), Instrument::Sample);
        assert_eq!(classify("c44"), Instrument::Sample);
        assert_eq!(classify("c#b"), Instrument::Sample);
        assert_eq!(classify(""), Instrument::Sample);
        assert_eq!(classify("~"), Instrument::Sample);
    }

    #[test]
    fn test_synthesizable() {
        assert!(Instrument::Kick.is_synthesizable());
        assert!(Instrument::Synth.is_synthesizable());
        assert!(!Instrument::Clap.is_synthesizable());
        assert!(!Instrument::Sample.is_synthesizable());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Instrument::HiHat), "hihat");
        assert_eq!(format!("{}", Instrument::OpenHat), "openhat");
    }
}
