use thiserror::Error;

/// Errors produced while parsing a pattern string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// Nothing left after trimming whitespace
    #[error("empty pattern")]
    EmptyInput,
    /// A `bpm` keyword without a usable positive integer. Recovered inside
    /// the parser by keeping the default tempo.
    #[error("malformed bpm value '{0}'")]
    MalformedBpm(String),
}
