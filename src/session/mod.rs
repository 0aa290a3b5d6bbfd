pub mod controller;

pub use controller::*;

use thiserror::Error;

use crate::api::ApiError;
use crate::interview::Session;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Start a session first.")]
    NoActiveSession,
    #[error("A session has already been started. Reset to begin a new one.")]
    SessionAlreadyStarted,
    #[error("{0}")]
    Transport(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Where the conversation currently stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    NoSession,
    Active(Session),
    /// Feedback has been delivered; the session id is kept for display only.
    Ended(Session),
}

impl SessionState {
    pub fn active(&self) -> Option<&Session> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::NoSession => "no session",
            SessionState::Active(session) if session.awaiting_followup => {
                "active (follow-up pending)"
            }
            SessionState::Active(_) => "active",
            SessionState::Ended(_) => "ended",
        }
    }
}
