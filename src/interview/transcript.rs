use serde::{Serialize, Deserialize};
use chrono::{DateTime, Local, Utc};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => f.write_str("You"),
            Speaker::Bot => f.write_str("Interviewer"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TranscriptEntry {
    pub text: String,
    pub speaker: Speaker,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn render(&self) -> String {
        let local: DateTime<Local> = self.timestamp.with_timezone(&Local);
        format!("[{}] {}: {}", local.format("%H:%M:%S"), self.speaker, self.text)
    }
}

/// Append-only conversation log. Entries are never edited or removed
/// individually; the only way to drop them is a full [`Transcript::clear`].
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) -> &TranscriptEntry {
        self.entries.push(TranscriptEntry {
            text: text.into(),
            speaker,
            timestamp: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries appended at or after `index`.
    pub fn since(&self, index: usize) -> &[TranscriptEntry] {
        &self.entries[index.min(self.entries.len())..]
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Plain-text export used for saving the conversation to disk.
    pub fn to_plain_text(&self) -> String {
        self.entries
            .iter()
            .map(TranscriptEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
