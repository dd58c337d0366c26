// Tests for the session controller against a scripted voice agent

mod common;

use castingfit::agent::{AgentEvent, StartedCall};
use castingfit::error::{CastingFitError, BENIGN_FAULT_MESSAGE};
use castingfit::feedback::{FeedbackResult, FeedbackState};
use castingfit::session::{
    Originator, Phase, SessionConfig, SessionController, SessionStatus, CONNECTION_ERROR_MESSAGE,
    MISSING_INPUT_MESSAGE, START_FAILED_MESSAGE,
};
use castingfit::{ResourceRegistry, VoiceAgent};
use common::{settle, FakeAgent, ScriptedFeedback};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const REQUIREMENTS: &str = "MUST: React, Node\nSHOULD: Vercel\nCOULD: CI/CD";
const SKILLS: &str = "6 years React, some Node, deployed on Vercel";

struct Harness {
    controller: SessionController,
    agent: Arc<FakeAgent>,
    feedback: Arc<ScriptedFeedback>,
}

fn harness(feedback: ScriptedFeedback) -> Harness {
    let agent = Arc::new(FakeAgent::new());
    let feedback = Arc::new(feedback);
    let controller = SessionController::new(
        SessionConfig::default(),
        agent.clone(),
        feedback.clone(),
        Arc::new(ResourceRegistry::new()),
    );
    Harness {
        controller,
        agent,
        feedback,
    }
}

async fn wait_settled(controller: &SessionController) -> FeedbackState {
    let mut updates = controller.feedback_updates();
    let state = updates.wait_for(|s| s.is_settled()).await.unwrap().clone();
    state
}

#[tokio::test(start_paused = true)]
async fn test_full_interview_ends_with_feedback() {
    let h = harness(ScriptedFeedback::new(vec![
        Ok(json!({"processing": true})),
        Ok(json!({
            "role": "Frontend Lead",
            "skills": {"must": [{"name": "React", "status": "good"}], "should": [], "could": []},
            "summary": {"take": "Strong", "strong": ["React"], "ok": [], "weak": []}
        })),
    ]));

    let pending = h.agent.defer_start();
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    assert!(h.controller.is_active().await);
    assert_eq!(h.controller.phase().await, Phase::Starting);

    let options = h.agent.last_options().expect("agent was started");
    let prompt = options.instructions().unwrap();
    assert!(prompt.contains(REQUIREMENTS));
    assert!(prompt.contains(SKILLS));

    pending
        .send(Ok(StartedCall {
            id: Some("call-42".into()),
        }))
        .unwrap();
    settle().await;

    assert_eq!(h.controller.phase().await, Phase::Active);
    assert_eq!(h.controller.identifier().await.as_deref(), Some("call-42"));

    h.agent.emit(AgentEvent::Terminated);
    let state = wait_settled(&h.controller).await;

    assert!(!h.controller.is_active().await);
    assert_eq!(h.feedback.calls(), 2);
    match state {
        FeedbackState::Ready {
            result: FeedbackResult::Structured(feedback),
        } => assert_eq!(feedback.coverage(), 100),
        other => panic!("Expected structured feedback, got {:?}", other),
    }

    let messages = h.controller.messages().await;
    assert_eq!(messages.len(), 2, "Welcome and closing messages");
    assert_eq!(messages[0].content, SessionConfig::default().welcome_message);
    assert_eq!(messages[1].content, SessionConfig::default().closing_message);
}

#[tokio::test]
async fn test_blank_input_is_rejected_without_starting_agent() {
    let h = harness(ScriptedFeedback::always(json!(null)));

    for (requirements, skills) in [("", SKILLS), (REQUIREMENTS, "   "), ("\n", "\t")] {
        let err = h.controller.start(requirements, skills).await.unwrap_err();
        assert!(matches!(err, CastingFitError::Validation(ref m) if m == MISSING_INPUT_MESSAGE));
    }

    assert_eq!(h.agent.start_count(), 0);
    assert!(!h.controller.is_active().await);
    assert_eq!(h.controller.error().await.as_deref(), Some(MISSING_INPUT_MESSAGE));
}

#[tokio::test]
async fn test_second_start_while_live_is_rejected() {
    let h = harness(ScriptedFeedback::always(json!(null)));

    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    assert!(h.controller.start(REQUIREMENTS, SKILLS).await.is_err());
    assert_eq!(h.agent.start_count(), 1);
    assert_eq!(h.controller.phase().await, Phase::Active);
}

#[tokio::test]
async fn test_start_failure_reports_error_and_deactivates() {
    let h = harness(ScriptedFeedback::always(json!(null)));

    let pending = h.agent.defer_start();
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;
    pending
        .send(Err(CastingFitError::Transport("vendor unavailable".into())))
        .unwrap();
    settle().await;

    assert!(!h.controller.is_active().await);
    assert_eq!(h.controller.error().await.as_deref(), Some(START_FAILED_MESSAGE));
    assert_eq!(h.controller.feedback_state(), FeedbackState::NoIdentifier);
    assert_eq!(h.feedback.calls(), 0);

    h.controller.dismiss_error().await;
    assert!(h.controller.error().await.is_none());
}

#[tokio::test]
async fn test_benign_fault_is_ignored() {
    let h = harness(ScriptedFeedback::always(json!(null)));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.agent.emit(AgentEvent::Fault {
        message: BENIGN_FAULT_MESSAGE.into(),
    });
    settle().await;

    assert!(h.controller.error().await.is_none());
    assert!(h.controller.is_active().await);
}

#[tokio::test]
async fn test_other_fault_shows_connection_error() {
    let h = harness(ScriptedFeedback::always(json!(null)));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.agent.emit(AgentEvent::Fault {
        message: "socket closed".into(),
    });
    settle().await;

    assert_eq!(h.controller.error().await.as_deref(), Some(CONNECTION_ERROR_MESSAGE));
    assert!(h.controller.is_active().await, "A fault alone does not end the call");
}

#[tokio::test]
async fn test_leave_without_identifier_skips_feedback() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "unused"})));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.controller.leave(None).await;
    settle().await;

    assert!(!h.controller.is_active().await);
    assert_eq!(h.controller.feedback_state(), FeedbackState::NoIdentifier);
    assert_eq!(
        h.controller.feedback_state().message(),
        Some("No call ID available to fetch feedback.")
    );
    assert_eq!(h.feedback.calls(), 0);
}

#[tokio::test]
async fn test_termination_before_identifier_gives_no_identifier() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "unused"})));

    let pending = h.agent.defer_start();
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.agent.emit(AgentEvent::Terminated);
    settle().await;
    let _ = pending.send(Ok(StartedCall {
        id: Some("too-late".into()),
    }));
    settle().await;

    assert_eq!(h.controller.phase().await, Phase::Ended);
    assert!(h.controller.identifier().await.is_none());
    assert_eq!(h.controller.feedback_state(), FeedbackState::NoIdentifier);
    assert_eq!(h.feedback.calls(), 0);
}

#[tokio::test]
async fn test_closed_event_stream_ends_session() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "Fine"})));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    // A fresh subscription drops the driver's sender
    drop(h.agent.subscribe());
    let state = wait_settled(&h.controller).await;

    assert_eq!(h.controller.phase().await, Phase::Ended);
    assert_eq!(state.message(), Some("Fine"));
}

#[tokio::test]
async fn test_hang_up_stops_agent_and_fetches_feedback() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "Good fit"})));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.controller.hang_up().await;
    let state = wait_settled(&h.controller).await;

    assert_eq!(h.agent.stop_count(), 1);
    assert_eq!(h.controller.phase().await, Phase::Ended);
    assert_eq!(state.message(), Some("Good fit"));

    h.controller.hang_up().await;
    assert_eq!(h.agent.stop_count(), 1, "Nothing to stop once ended");
}

#[tokio::test(start_paused = true)]
async fn test_no_feedback_after_retries_are_exhausted() {
    let h = harness(ScriptedFeedback::always(json!({"processing": true})));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.agent.emit(AgentEvent::Terminated);
    let state = wait_settled(&h.controller).await;

    assert_eq!(h.feedback.calls(), 11);
    assert_eq!(state.message(), Some("No feedback available for this call."));
}

#[tokio::test]
async fn test_transcript_drives_status() {
    let h = harness(ScriptedFeedback::always(json!(null)));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.agent.emit(AgentEvent::SpeechStarted);
    settle().await;
    assert_eq!(h.controller.snapshot().await.status, SessionStatus::Speaking);

    h.agent.emit(AgentEvent::Transcript {
        originator: Originator::User,
        text: "I have six years of React".into(),
    });
    settle().await;
    assert_eq!(h.controller.snapshot().await.status, SessionStatus::Analyzing);

    h.agent.emit(AgentEvent::Transcript {
        originator: Originator::Agent,
        text: "Tell me about Node".into(),
    });
    settle().await;
    assert_eq!(h.controller.snapshot().await.status, SessionStatus::Next);

    h.agent.emit(AgentEvent::SpeechEnded);
    settle().await;
    assert_eq!(h.controller.snapshot().await.status, SessionStatus::Listening);

    // Repeated lines collapse in the view
    h.agent.emit(AgentEvent::Transcript {
        originator: Originator::User,
        text: "I have six years of React".into(),
    });
    settle().await;

    let messages = h.controller.messages().await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].sender.name, "Candidate");
    assert_eq!(messages[2].sender.name, "Bot");
}

#[tokio::test]
async fn test_shutdown_releases_everything() {
    let h = harness(ScriptedFeedback::always(json!(null)));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;
    assert!(h.controller.registry().has_session().await);

    h.controller.shutdown().await;

    assert_eq!(h.agent.stop_count(), 1);
    assert!(h.controller.registry().is_empty().await);
    assert!(!h.controller.is_active().await);
    assert!(h.controller.messages().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_discards_previous_feedback_poll() {
    let h = harness(ScriptedFeedback::always(json!({"processing": true})));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.controller.hang_up().await;
    settle().await;
    assert_eq!(h.feedback.calls(), 1);
    assert!(h.controller.feedback_state().is_loading());

    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;
    assert_eq!(h.controller.feedback_state(), FeedbackState::Idle);

    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(h.feedback.calls(), 1, "Old poll stops at its next retry");
    assert_eq!(h.controller.feedback_state(), FeedbackState::Idle);
    assert!(h.controller.is_active().await);
}

#[tokio::test]
async fn test_hang_up_then_shutdown_stops_once() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "Good fit"})));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.controller.hang_up().await;
    assert_eq!(h.agent.stop_count(), 1);
    assert!(!h.controller.registry().has_session().await);

    h.controller.shutdown().await;
    assert_eq!(h.agent.stop_count(), 1);
}

#[tokio::test]
async fn test_call_ended_by_vendor_is_not_stopped() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "Good fit"})));
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.agent.emit(AgentEvent::Terminated);
    wait_settled(&h.controller).await;
    assert!(!h.controller.registry().has_session().await);

    h.controller.shutdown().await;
    assert_eq!(h.agent.stop_count(), 0);
}

#[tokio::test]
async fn test_hang_up_while_starting_stops_the_late_call() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "Late but fine"})));

    let pending = h.agent.defer_start();
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.controller.hang_up().await;
    settle().await;
    assert_eq!(h.agent.stop_count(), 0, "Nothing to stop until the call opens");
    assert_eq!(h.controller.phase().await, Phase::Ending);

    pending
        .send(Ok(StartedCall {
            id: Some("late-call".into()),
        }))
        .unwrap();
    let state = wait_settled(&h.controller).await;

    assert_eq!(h.agent.stop_count(), 1);
    assert_eq!(h.controller.phase().await, Phase::Ended);
    assert_eq!(h.controller.identifier().await.as_deref(), Some("late-call"));
    assert_eq!(state.message(), Some("Late but fine"));

    h.controller.shutdown().await;
    assert_eq!(h.agent.stop_count(), 1);
}

#[tokio::test]
async fn test_hang_up_while_starting_then_start_fails() {
    let h = harness(ScriptedFeedback::always(json!({"feedback_summary": "unused"})));

    let pending = h.agent.defer_start();
    h.controller.start(REQUIREMENTS, SKILLS).await.unwrap();
    settle().await;

    h.controller.hang_up().await;
    pending
        .send(Err(CastingFitError::Transport("vendor unavailable".into())))
        .unwrap();
    settle().await;

    assert_eq!(h.agent.stop_count(), 0);
    assert!(!h.controller.is_active().await);
    assert_eq!(h.controller.feedback_state(), FeedbackState::NoIdentifier);
    assert_eq!(h.feedback.calls(), 0);
}
