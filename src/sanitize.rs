//! Text cleanup for speech output.
//!
//! Bot text arrives in all sorts of shapes: plain prose, a JSON-encoded string
//! (sometimes encoded twice), a whole JSON object, or a string with literal
//! escape sequences the service forgot to decode. [`sanitize`] turns any of
//! those into a single line a voice synthesizer can read without tripping over
//! timestamps, session ids or markdown markers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static BACKSLASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\+").unwrap());
static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)[0-9]{2}:[0-9]{2}:[0-9]{2}(?-u:\b)").unwrap());
static UUID_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-fA-F-]{36}").unwrap());
static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{3,}").unwrap());
static SESSION_STARTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Session started\s*—*").unwrap());
static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-–—]{2,}").unwrap());
static BEHAVIORAL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\*\*Behavioral Question:\*\*").unwrap());
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());

/// Outcome of the decode step.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The input parsed as JSON. May still be a plain string value.
    Structured(Value),
    /// The input was not JSON; literal escape sequences were unescaped instead.
    RawUnescaped(String),
}

impl Decoded {
    /// Collapse the decode result back to text, pretty-printing anything that
    /// is not a bare string.
    pub fn into_text(self) -> String {
        match self {
            Decoded::Structured(Value::String(text)) => text,
            Decoded::Structured(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
            Decoded::RawUnescaped(text) => text,
        }
    }
}

/// Parse `raw` as JSON, or fall back to unescaping it by hand.
pub fn decode(raw: &str) -> Decoded {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Decoded::Structured(value),
        Err(_) => Decoded::RawUnescaped(unescape_literal(raw)),
    }
}

fn unescape_literal(raw: &str) -> String {
    let text = raw
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\t", " ")
        .replace("\\r", " ");
    BACKSLASH_RUN.replace_all(&text, "").trim().to_string()
}

/// Remove timestamps, ids, separator runs and markdown labels, in that order.
pub fn strip_noise(text: &str) -> String {
    let text = TIMESTAMP.replace_all(text, "");
    let text = UUID_TOKEN.replace_all(&text, "");
    let text = HYPHEN_RUN.replace_all(&text, "");
    let text = SESSION_STARTED.replace_all(&text, "");
    let text = DASH_RUN.replace_all(&text, "");
    let text = BEHAVIORAL_MARKER.replace_all(&text, "Behavioral Question:");
    text.into_owned()
}

/// Fold the text onto a single line with single spaces.
pub fn normalize_for_speech(text: &str) -> String {
    let text = NEWLINE_RUN.replace_all(text, " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

fn sanitize_once(raw: &str) -> String {
    let decoded = decode(raw).into_text();
    normalize_for_speech(&strip_noise(&decoded))
}

/// Run the full pipeline until the text stops changing.
///
/// A single pass can expose new work for the next one (a string that was
/// JSON-encoded twice, or a dash run joined up by a removed timestamp), so the
/// result is driven to a fixed point. That makes the function idempotent:
/// `sanitize(&sanitize(x)) == sanitize(x)`.
///
/// Every pass that changes the text peels an encoding layer or removes
/// characters, so the number of passes is bounded by the input length.
pub fn sanitize(raw: &str) -> String {
    let mut current = sanitize_once(raw);
    for _ in 0..=raw.len() {
        let next = sanitize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}
