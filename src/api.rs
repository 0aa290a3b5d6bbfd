use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::interview::{Difficulty, FeedbackReport, Role};
use crate::sanitize::{decode, Decoded};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{status} {reason} - {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Serialize, Debug)]
struct CreateSessionRequest {
    role: Role,
    difficulty: Difficulty,
}

#[derive(Serialize, Debug)]
struct SubmitAnswerRequest<'a> {
    text: &'a str,
    followup_answer: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CreateSessionResponse {
    #[serde(alias = "sessionId")]
    pub session_id: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NextQuestionResponse {
    pub question: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SubmitAnswerResponse {
    #[serde(default)]
    pub follow_up: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl SubmitAnswerResponse {
    pub fn with_follow_up(question: impl Into<String>) -> Self {
        Self {
            follow_up: Some(question.into()),
            reason: None,
        }
    }

    /// The follow-up prompt, if the service asked one. Blank strings count as none.
    pub fn follow_up(&self) -> Option<&str> {
        self.follow_up
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// The remote interview service, as seen by the session controller.
#[async_trait]
pub trait InterviewApi: Send + Sync {
    async fn create_session(
        &self,
        role: Role,
        difficulty: Difficulty,
    ) -> Result<CreateSessionResponse>;

    async fn next_question(&self, session_id: &str) -> Result<NextQuestionResponse>;

    async fn submit_answer(
        &self,
        session_id: &str,
        text: &str,
        followup_answer: bool,
    ) -> Result<SubmitAnswerResponse>;

    async fn end_session(&self, session_id: &str) -> Result<FeedbackReport>;
}

/// Extract a [`FeedbackReport`] from an end-of-session body.
///
/// The service may return the report bare, or wrapped as `{"feedback": ...}`.
/// The wrapped value may itself be a JSON-encoded string.
pub fn parse_feedback(body: Value) -> Result<FeedbackReport> {
    let mut payload = match body {
        Value::Object(mut map) if map.contains_key("feedback") => {
            map.remove("feedback").unwrap_or(Value::Null)
        }
        other => other,
    };

    // Model output is forwarded as a string, occasionally encoded more than once
    let mut depth = 0;
    while let Value::String(text) = &payload {
        if depth == 3 {
            break;
        }
        depth += 1;
        let next = match decode(text) {
            Decoded::Structured(value) => value,
            Decoded::RawUnescaped(unescaped) => serde_json::from_str(&unescaped).map_err(|e| {
                ApiError::Malformed(format!("feedback is not valid JSON: {}", e))
            })?,
        };
        payload = next;
    }

    serde_json::from_value(payload)
        .map_err(|e| ApiError::Malformed(format!("unexpected feedback shape: {}", e)))
}

#[derive(Clone)]
pub struct HttpInterviewApi {
    client: Client,
    base_url: Url,
}

impl HttpInterviewApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve path segments under the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_value<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url);

        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Interview service error from {}: {} {}", url, status, body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::Malformed(format!("{} returned invalid JSON: {}", url, e)))
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.post_value(segments, body).await?;
        serde_json::from_value(value).map_err(|e| {
            ApiError::Malformed(format!("unexpected response from /{}: {}", segments.join("/"), e))
        })
    }
}

#[async_trait]
impl InterviewApi for HttpInterviewApi {
    async fn create_session(
        &self,
        role: Role,
        difficulty: Difficulty,
    ) -> Result<CreateSessionResponse> {
        info!("🎬 Requesting new {} session ({})", role, difficulty);
        self.post_json(&["start"], &CreateSessionRequest { role, difficulty }).await
    }

    async fn next_question(&self, session_id: &str) -> Result<NextQuestionResponse> {
        self.post_json(&["next_question", session_id], &serde_json::json!({})).await
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        text: &str,
        followup_answer: bool,
    ) -> Result<SubmitAnswerResponse> {
        let body = SubmitAnswerRequest { text, followup_answer };
        self.post_json(&["submit_answer", session_id], &body).await
    }

    async fn end_session(&self, session_id: &str) -> Result<FeedbackReport> {
        let body = self.post_value(&["end", session_id], &serde_json::json!({})).await?;
        parse_feedback(body)
    }
}
