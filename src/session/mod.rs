//! Interview session management
//!
//! This module provides the `SessionController` that manages:
//! - Session lifecycle as an explicit state machine
//! - Voice agent start/stop and event handling
//! - The live transcript
//! - Feedback retrieval once the call ends

mod config;
mod controller;
mod state;
mod transcript;

pub use config::SessionConfig;
pub use controller::{
    SessionController, SessionView, AGENT_RESOURCE_KEY, ALREADY_RUNNING_MESSAGE,
    DRIVER_RESOURCE_KEY, GUARD_RESOURCE_KEY, MISSING_INPUT_MESSAGE,
};
pub use state::{
    Effect, Phase, SessionEvent, SessionState, SessionStatus, CONNECTION_ERROR_MESSAGE,
    START_FAILED_MESSAGE,
};
pub use transcript::{Message, Originator, Sender, TranscriptStore};
