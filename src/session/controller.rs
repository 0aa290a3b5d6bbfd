use std::sync::Arc;
use log::{error, info};

use super::{Result, SessionError, SessionState};
use crate::api::InterviewApi;
use crate::interview::{
    format_feedback, Difficulty, FeedbackReport, Role, Session, Speaker, Transcript,
};
use crate::speech::SpeechOutput;

pub const WELCOME_MESSAGE: &str = "Welcome! Your interview practice session has started.";
pub const NO_FOLLOW_UP_MESSAGE: &str =
    "No follow-up. You can request next question or end session.";
pub const ERROR_PREFIX: &str = "Error: ";
pub const VOICE_CAPTURE_PREFIX: &str = "[Voice captured] ";

/// What a user action produced, besides the transcript entries it appended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { session_id: String },
    Question(String),
    FollowUp(String),
    NoFollowUp,
    Feedback(FeedbackReport),
    /// The action was a no-op (blank answer).
    Ignored,
}

/// Drives one interview conversation against the remote service.
///
/// Every failure is written to the transcript as an `Error: ` entry and also
/// returned to the caller; the state is left exactly as it was before the
/// call. Bot-authored entries are read aloud through [`SpeechOutput`].
pub struct SessionController {
    api: Arc<dyn InterviewApi>,
    speech: SpeechOutput,
    state: SessionState,
    transcript: Transcript,
}

impl SessionController {
    pub fn new(api: Arc<dyn InterviewApi>, speech: SpeechOutput) -> Self {
        Self {
            api,
            speech,
            state: SessionState::NoSession,
            transcript: Transcript::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.active()
    }

    pub fn session_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active(session) | SessionState::Ended(session) => Some(&session.id),
            SessionState::NoSession => None,
        }
    }

    pub fn awaiting_followup(&self) -> bool {
        self.session().map_or(false, |s| s.awaiting_followup)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn speech(&self) -> &SpeechOutput {
        &self.speech
    }

    pub async fn start(&mut self, role: Role, difficulty: Difficulty) -> Result<SessionEvent> {
        if !matches!(self.state, SessionState::NoSession) {
            return Err(self.report_error(SessionError::SessionAlreadyStarted));
        }

        match self.api.create_session(role, difficulty).await {
            Ok(response) => {
                info!("✅ Session {} started for {} ({})", response.session_id, role, difficulty);
                let session_id = response.session_id.clone();
                self.state =
                    SessionState::Active(Session::new(response.session_id, role, difficulty));
                self.say(WELCOME_MESSAGE);
                Ok(SessionEvent::Started { session_id })
            }
            Err(e) => Err(self.report_error(e.into())),
        }
    }

    pub async fn request_next_question(&mut self) -> Result<SessionEvent> {
        let session_id = self.require_session()?.id.clone();

        match self.api.next_question(&session_id).await {
            Ok(response) => {
                if let SessionState::Active(session) = &mut self.state {
                    session.awaiting_followup = false;
                }
                info!("🎯 Next question received for session {}", session_id);
                self.say(response.question.clone());
                Ok(SessionEvent::Question(response.question))
            }
            Err(e) => Err(self.report_error(e.into())),
        }
    }

    /// Submit an answer. Blank input is ignored without touching the
    /// transcript or the network.
    pub async fn submit_answer(&mut self, text: &str) -> Result<SessionEvent> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SessionEvent::Ignored);
        }

        let session = self.require_session()?;
        let session_id = session.id.clone();
        let followup_answer = session.awaiting_followup;

        self.transcript.push(Speaker::User, text);
        info!(
            "📝 Submitting {} for session {}",
            if followup_answer { "follow-up answer" } else { "answer" },
            session_id
        );

        match self.api.submit_answer(&session_id, text, followup_answer).await {
            Ok(response) => {
                let follow_up = response.follow_up().map(String::from);
                if let SessionState::Active(session) = &mut self.state {
                    session.awaiting_followup = follow_up.is_some();
                }

                match follow_up {
                    Some(question) => {
                        self.say(question.clone());
                        Ok(SessionEvent::FollowUp(question))
                    }
                    None => {
                        self.say(NO_FOLLOW_UP_MESSAGE);
                        Ok(SessionEvent::NoFollowUp)
                    }
                }
            }
            Err(e) => Err(self.report_error(e.into())),
        }
    }

    pub async fn end_session(&mut self) -> Result<SessionEvent> {
        let session_id = self.require_session()?.id.clone();

        match self.api.end_session(&session_id).await {
            Ok(report) => {
                let state = std::mem::take(&mut self.state);
                if let SessionState::Active(mut session) = state {
                    session.awaiting_followup = false;
                    self.state = SessionState::Ended(session);
                }
                info!("🏁 Session {} ended, feedback received", session_id);
                self.say(format_feedback(&report));
                Ok(SessionEvent::Feedback(report))
            }
            Err(e) => Err(self.report_error(e.into())),
        }
    }

    /// Record text captured by voice input as a user entry.
    pub fn note_voice_capture(&mut self, text: &str) {
        self.transcript.push(Speaker::User, format!("{}{}", VOICE_CAPTURE_PREFIX, text));
    }

    /// Drop the session and transcript, as a page reload would.
    pub fn reset(&mut self) {
        self.speech.cancel();
        self.state = SessionState::NoSession;
        self.transcript.clear();
        info!("🔄 Session state reset");
    }

    fn require_session(&mut self) -> Result<&Session> {
        if self.state.active().is_none() {
            return Err(self.report_error(SessionError::NoActiveSession));
        }
        self.state.active().ok_or(SessionError::NoActiveSession)
    }

    fn say(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.speech.speak(&text);
        self.transcript.push(Speaker::Bot, text);
    }

    fn report_error(&mut self, err: SessionError) -> SessionError {
        error!("❌ {}", err);
        self.say(format!("{}{}", ERROR_PREFIX, err));
        err
    }
}
