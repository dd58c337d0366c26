use crate::error::BENIGN_FAULT_MESSAGE;
use serde::{Deserialize, Serialize};

pub const START_FAILED_MESSAGE: &str = "Failed to start CastingFit session. Please try again.";
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please try again.";

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Starting,
    Active,
    Ending,
    Ended,
}

/// Conversational status shown to the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Listening,
    Analyzing,
    Speaking,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Started(Option<String>),
    StartFailed,
    Fault(String),
    Terminated,
    /// User asked to leave
    Leave,
}

/// Side effect the controller runs after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Start rejected: a session is already live
    Rejected,
    /// Stop the voice agent
    StopAgent,
    /// Surface a user-visible error
    ShowError(&'static str),
    /// Leave requested before the call opened; the stop waits for the start result
    AwaitStart,
    /// Stop the call that opened after a leave request, then leave with its id
    Close(Option<String>),
    /// Close the session and hand off to feedback retrieval
    Leave(Option<String>),
}

/// Session state machine
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub identifier: Option<String>,
    pub status: SessionStatus,
    pub error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Starting | Phase::Active | Phase::Ending)
    }

    pub fn apply(&mut self, event: SessionEvent) -> Effect {
        match (self.phase, event) {
            (_, SessionEvent::Start) if self.is_active() => Effect::Rejected,
            (_, SessionEvent::Start) => {
                self.phase = Phase::Starting;
                self.identifier = None;
                self.status = SessionStatus::Idle;
                self.error = None;
                Effect::None
            }

            (Phase::Starting, SessionEvent::Started(id)) => {
                self.phase = Phase::Active;
                self.identifier = id;
                Effect::None
            }
            // Hang-up raced ahead of the start result; keep the id for feedback
            (Phase::Ending, SessionEvent::Started(id)) => {
                self.identifier = id.clone();
                self.end();
                Effect::Close(id)
            }
            (_, SessionEvent::Started(_)) => Effect::None,

            (Phase::Starting | Phase::Ending, SessionEvent::StartFailed) => {
                self.error = Some(START_FAILED_MESSAGE.to_string());
                self.end();
                Effect::Leave(None)
            }
            (_, SessionEvent::StartFailed) => {
                self.error = Some(START_FAILED_MESSAGE.to_string());
                Effect::ShowError(START_FAILED_MESSAGE)
            }

            (_, SessionEvent::Fault(message)) if message == BENIGN_FAULT_MESSAGE => Effect::None,
            (_, SessionEvent::Fault(_)) => {
                self.error = Some(CONNECTION_ERROR_MESSAGE.to_string());
                Effect::ShowError(CONNECTION_ERROR_MESSAGE)
            }

            (Phase::Starting | Phase::Active | Phase::Ending, SessionEvent::Terminated) => {
                self.end();
                Effect::Leave(self.identifier.clone())
            }
            (_, SessionEvent::Terminated) => Effect::None,

            (Phase::Starting, SessionEvent::Leave) => {
                self.phase = Phase::Ending;
                Effect::AwaitStart
            }
            (Phase::Active, SessionEvent::Leave) => {
                self.phase = Phase::Ending;
                Effect::StopAgent
            }
            (_, SessionEvent::Leave) => Effect::None,
        }
    }

    /// Force the session closed, whatever the current phase
    pub fn end(&mut self) {
        self.phase = Phase::Ended;
        self.status = SessionStatus::Idle;
    }
}
