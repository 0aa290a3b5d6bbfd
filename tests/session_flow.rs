use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use mockprep_lib::api::{
    self, ApiError, CreateSessionResponse, InterviewApi, NextQuestionResponse,
    SubmitAnswerResponse,
};
use mockprep_lib::interview::{
    Difficulty, FeedbackCategory, FeedbackReport, Role, Speaker, FEEDBACK_HEADER,
};
use mockprep_lib::session::{
    SessionController, SessionError, SessionEvent, SessionState, NO_FOLLOW_UP_MESSAGE,
    WELCOME_MESSAGE,
};
use mockprep_lib::speech::{SpeechError, SpeechOutput, SpeechSynthesizer, Utterance};

#[derive(Default)]
struct FakeService {
    requests: Mutex<Vec<String>>,
    submit_replies: Mutex<VecDeque<SubmitAnswerResponse>>,
    fail_start: bool,
    fail_end: bool,
}

#[async_trait]
impl InterviewApi for FakeService {
    async fn create_session(
        &self,
        role: Role,
        difficulty: Difficulty,
    ) -> api::Result<CreateSessionResponse> {
        self.requests.lock().push(format!("start/{}/{}", role, difficulty));
        if self.fail_start {
            return Err(ApiError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
                body: "try later".to_string(),
            });
        }
        Ok(CreateSessionResponse {
            session_id: "0b5e8a2c-6d1f-4c47-9a7e-2f4d3c1b9e80".to_string(),
        })
    }

    async fn next_question(&self, session_id: &str) -> api::Result<NextQuestionResponse> {
        self.requests.lock().push(format!("next_question/{}", session_id));
        Ok(NextQuestionResponse {
            question: "Tell me about a challenging bug.".to_string(),
        })
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        text: &str,
        followup_answer: bool,
    ) -> api::Result<SubmitAnswerResponse> {
        self.requests
            .lock()
            .push(format!("submit_answer/{}/{}/{}", session_id, text, followup_answer));
        Ok(self.submit_replies.lock().pop_front().unwrap_or_default())
    }

    async fn end_session(&self, session_id: &str) -> api::Result<FeedbackReport> {
        self.requests.lock().push(format!("end/{}", session_id));
        if self.fail_end {
            return Err(ApiError::Status {
                status: 502,
                reason: "Bad Gateway".to_string(),
                body: "model timeout".to_string(),
            });
        }
        Ok(FeedbackReport {
            communication: FeedbackCategory {
                score: 8.0,
                reason: "Clear and structured.".to_string(),
                suggestions: vec!["Quantify impact".to_string()],
            },
            technical: FeedbackCategory {
                score: 7.0,
                reason: "Identified the race.".to_string(),
                suggestions: vec![
                    "Explain memory ordering".to_string(),
                    "Mention tooling".to_string(),
                ],
            },
            problem_solving: FeedbackCategory {
                score: 7.5,
                reason: "Methodical.".to_string(),
                suggestions: vec![],
            },
            summary: "Strong debugging story.".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingVoice {
    spoken: Mutex<Vec<String>>,
    cancels: Mutex<usize>,
}

impl SpeechSynthesizer for RecordingVoice {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.spoken.lock().push(utterance.text.clone());
        Ok(())
    }

    fn cancel(&self) -> Result<(), SpeechError> {
        *self.cancels.lock() += 1;
        Ok(())
    }
}

fn setup(service: FakeService) -> (Arc<FakeService>, Arc<RecordingVoice>, SessionController) {
    let service = Arc::new(service);
    let voice = Arc::new(RecordingVoice::default());
    let speech = SpeechOutput::new(Some(voice.clone()));
    let controller = SessionController::new(service.clone(), speech);
    (service, voice, controller)
}

#[tokio::test]
async fn test_full_interview_flow() {
    let service = FakeService::default();
    service.submit_replies.lock().extend([
        SubmitAnswerResponse::with_follow_up("What was the root cause?"),
        SubmitAnswerResponse::default(),
    ]);
    let (service, voice, mut controller) = setup(service);

    let started = controller.start(Role::Backend, Difficulty::Medium).await.unwrap();
    assert_eq!(
        started,
        SessionEvent::Started {
            session_id: "0b5e8a2c-6d1f-4c47-9a7e-2f4d3c1b9e80".to_string()
        }
    );
    assert!(matches!(controller.state(), SessionState::Active(s) if !s.awaiting_followup));

    controller.request_next_question().await.unwrap();
    assert!(!controller.awaiting_followup());

    let follow_up = controller.submit_answer("I once...").await.unwrap();
    assert_eq!(follow_up, SessionEvent::FollowUp("What was the root cause?".to_string()));
    assert!(controller.awaiting_followup());

    let no_follow_up = controller.submit_answer("It was a race condition").await.unwrap();
    assert_eq!(no_follow_up, SessionEvent::NoFollowUp);
    assert!(!controller.awaiting_followup());

    let feedback = controller.end_session().await.unwrap();
    assert!(matches!(
        feedback,
        SessionEvent::Feedback(ref r) if r.summary == "Strong debugging story."
    ));
    assert!(matches!(controller.state(), SessionState::Ended(_)));

    let requests = service.requests.lock().clone();
    let id = "0b5e8a2c-6d1f-4c47-9a7e-2f4d3c1b9e80";
    assert_eq!(
        requests,
        vec![
            "start/backend/medium".to_string(),
            format!("next_question/{}", id),
            format!("submit_answer/{}/I once.../false", id),
            format!("submit_answer/{}/It was a race condition/true", id),
            format!("end/{}", id),
        ]
    );

    let entries = controller.transcript().entries();
    let texts: Vec<(Speaker, &str)> =
        entries.iter().map(|e| (e.speaker, e.text.as_str())).collect();
    assert_eq!(texts[0], (Speaker::Bot, WELCOME_MESSAGE));
    assert_eq!(texts[1], (Speaker::Bot, "Tell me about a challenging bug."));
    assert_eq!(texts[2], (Speaker::User, "I once..."));
    assert_eq!(texts[3], (Speaker::Bot, "What was the root cause?"));
    assert_eq!(texts[4], (Speaker::User, "It was a race condition"));
    assert_eq!(texts[5], (Speaker::Bot, NO_FOLLOW_UP_MESSAGE));
    assert_eq!(texts[6].0, Speaker::Bot);
    assert!(texts[6].1.starts_with(FEEDBACK_HEADER));
    assert!(texts[6].1.contains("    - Explain memory ordering\n    - Mention tooling\n"));
    assert_eq!(texts.len(), 7);

    // Every bot entry is spoken once, sanitized; user entries never are
    let spoken = voice.spoken.lock().clone();
    assert_eq!(spoken.len(), 5);
    assert_eq!(spoken[2], "What was the root cause?");
    assert!(spoken[4].starts_with("Final Feedback Communication: Score: 8"));
    assert!(!spoken[4].contains('\n'));
    assert!(!spoken[4].contains("---"));
    assert_eq!(*voice.cancels.lock(), 5);
}

#[tokio::test]
async fn test_failed_start_keeps_no_session() {
    let (service, voice, mut controller) = setup(FakeService {
        fail_start: true,
        ..Default::default()
    });

    let err = controller.start(Role::Frontend, Difficulty::Easy).await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert_eq!(controller.state(), &SessionState::NoSession);
    assert_eq!(controller.session_id(), None);

    let last = controller.transcript().last().unwrap();
    assert_eq!(last.text, "Error: 503 Service Unavailable - try later");
    assert_eq!(
        voice.spoken.lock().last().unwrap(),
        "Error: 503 Service Unavailable - try later"
    );

    // A retry is a fresh, user-triggered call
    assert_eq!(service.requests.lock().len(), 1);
}

#[tokio::test]
async fn test_failed_end_keeps_session_active() {
    let service = FakeService {
        fail_end: true,
        ..Default::default()
    };
    service
        .submit_replies
        .lock()
        .push_back(SubmitAnswerResponse::with_follow_up("What was the root cause?"));
    let (service, _voice, mut controller) = setup(service);

    controller.start(Role::Backend, Difficulty::Medium).await.unwrap();
    controller.submit_answer("I once...").await.unwrap();
    assert!(controller.awaiting_followup());
    let before = controller.state().clone();
    let entries_before = controller.transcript().len();

    let err = controller.end_session().await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));

    assert_eq!(controller.state(), &before);
    assert!(controller.awaiting_followup());
    assert_eq!(controller.session_id(), Some("0b5e8a2c-6d1f-4c47-9a7e-2f4d3c1b9e80"));
    assert_eq!(controller.transcript().len(), entries_before + 1);
    let last = controller.transcript().last().unwrap();
    assert_eq!(last.speaker, Speaker::Bot);
    assert_eq!(last.text, "Error: 502 Bad Gateway - model timeout");

    // Still active: the pending follow-up is answered with the flag set
    controller.submit_answer("A race condition").await.unwrap();
    let requests = service.requests.lock();
    assert_eq!(
        requests.last().unwrap(),
        "submit_answer/0b5e8a2c-6d1f-4c47-9a7e-2f4d3c1b9e80/A race condition/true"
    );
}

#[tokio::test]
async fn test_rejections_issue_no_requests() {
    let (service, _voice, mut controller) = setup(FakeService::default());

    for result in [
        controller.request_next_question().await,
        controller.submit_answer("answer").await,
        controller.end_session().await,
    ] {
        assert!(matches!(result, Err(SessionError::NoActiveSession)));
    }
    assert!(service.requests.lock().is_empty());

    controller.start(Role::Backend, Difficulty::Medium).await.unwrap();
    controller.end_session().await.unwrap();
    let after_end = service.requests.lock().len();

    assert!(matches!(
        controller.request_next_question().await,
        Err(SessionError::NoActiveSession)
    ));
    assert!(matches!(
        controller.submit_answer("late").await,
        Err(SessionError::NoActiveSession)
    ));
    assert_eq!(service.requests.lock().len(), after_end);
}

#[tokio::test]
async fn test_voice_capture_is_recorded_as_user_entry() {
    let (_service, voice, mut controller) = setup(FakeService::default());
    controller.start(Role::Mobile, Difficulty::Hard).await.unwrap();
    let spoken_before = voice.spoken.lock().len();

    controller.note_voice_capture("It was a race condition");

    let last = controller.transcript().last().unwrap();
    assert_eq!(last.speaker, Speaker::User);
    assert_eq!(last.text, "[Voice captured] It was a race condition");
    assert_eq!(voice.spoken.lock().len(), spoken_before);
}
