//! Pattern text parser
//!
//! Best-effort lexing of strings such as `d1 $ sound "bd ~ sn" bpm 90`:
//!
//! - an optional `name $` assignment prefix,
//! - a `bpm <integer>` tempo anywhere in the body,
//! - step elements taken from the quoted runs, or from the whole body when
//!   there are none.
//!
//! This is not a grammar. There is no precedence, nesting or escaping, and
//! an unquoted body keeps keyword arguments (the `90` in `bd sn bpm 90`) as
//! elements.

pub mod error;
pub mod lexer;

pub use error::ParseError;
pub use lexer::{Lexer, Token};

use crate::types::{Pattern, DEFAULT_TEMPO_BPM};
use tracing::debug;

/// Words that belong to the surrounding notation, never to the step list
pub const RESERVED_KEYWORDS: &[&str] = &[
    "sound", "note", "gain", "pan", "delay", "reverb", "$", "|", "fast", "slow", "rev", "bpm",
];

/// Characters stripped from both ends of every element
const BRACKETS: &[char] = &['(', ')', '[', ']', '{', '}'];

/// Parse a pattern string
pub fn parse(text: &str) -> Result<Pattern, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let (name, body) = split_assignment(text).unwrap_or((Pattern::UNNAMED, text));
    let tokens = Lexer::new(body).tokenize();

    let tempo = match find_tempo(&tokens) {
        Ok(Some(bpm)) => bpm,
        Ok(None) => DEFAULT_TEMPO_BPM,
        Err(e) => {
            debug!("{}, using {} bpm", e, DEFAULT_TEMPO_BPM);
            DEFAULT_TEMPO_BPM
        }
    };

    Ok(Pattern::new(name, body)
        .with_tempo(tempo)
        .with_elements(extract_elements(body, &tokens)))
}

/// Split `name $ body`. The name is one or more ASCII word characters and
/// the body must not be empty.
fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let name_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    if name_len == 0 {
        return None;
    }

    let (name, rest) = text.split_at(name_len);
    let body = rest.trim_start().strip_prefix('$')?.trim_start();
    if body.is_empty() {
        return None;
    }
    Some((name, body))
}

/// First `bpm` keyword followed by a word starting with digits.
///
/// Both words are bracket-stripped first, and only the leading digit run of
/// the value counts, so `[bpm 140]` and `bpm 140,` both give 140.
/// `Ok(None)` when the body has no `bpm` at all; `MalformedBpm` when it does
/// but no usable positive value follows.
fn find_tempo(tokens: &[Token]) -> Result<Option<u32>, ParseError> {
    let mut malformed = None;

    for pair in tokens.windows(2) {
        if pair[0].text().trim_matches(BRACKETS) != "bpm" {
            continue;
        }
        let value = pair[1].text().trim_matches(BRACKETS);
        let digits = leading_digits(value);
        if digits.is_empty() {
            malformed.get_or_insert_with(|| value.to_string());
            continue;
        }
        return match digits.parse::<u32>() {
            Ok(bpm) if bpm > 0 => Ok(Some(bpm)),
            _ => Err(ParseError::MalformedBpm(value.to_string())),
        };
    }

    match malformed {
        Some(value) => Err(ParseError::MalformedBpm(value)),
        None if tokens
            .last()
            .is_some_and(|t| t.text().trim_matches(BRACKETS) == "bpm") =>
        {
            Err(ParseError::MalformedBpm(String::new()))
        }
        None => Ok(None),
    }
}

fn leading_digits(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    &s[..end]
}

fn extract_elements(body: &str, tokens: &[Token]) -> Vec<String> {
    let quoted: Vec<&str> = tokens.iter().filter_map(Token::as_quoted).collect();
    let raw: Vec<&str> = if quoted.is_empty() {
        body.split_whitespace().collect()
    } else {
        quoted
    };

    raw.into_iter()
        .map(|token| token.trim_matches(BRACKETS))
        .filter(|token| !token.is_empty() && !is_keyword(token))
        .map(String::from)
        .collect()
}

fn is_keyword(token: &str) -> bool {
    RESERVED_KEYWORDS.contains(&token)
}
