use thiserror::Error;

/// Fault message the voice agent emits when a call is closed normally
pub const BENIGN_FAULT_MESSAGE: &str = "Meeting has ended";

#[derive(Error, Debug)]
pub enum CastingFitError {
    /// Missing or invalid user input; blocks the action
    #[error("{0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Backend returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Session fault: {message}")]
    SessionFault { message: String },

    #[error("Failed to parse payload: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CastingFitError {
    /// Whether a feedback fetch failing with this error should be attempted again
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            CastingFitError::Transport(_)
                | CastingFitError::Timeout
                | CastingFitError::Http { .. }
                | CastingFitError::Parse(_)
        )
    }

    /// Session faults carrying the normal end-of-call message are not surfaced
    pub fn is_benign_fault(&self) -> bool {
        matches!(self, CastingFitError::SessionFault { message } if message == BENIGN_FAULT_MESSAGE)
    }
}

impl From<reqwest::Error> for CastingFitError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CastingFitError::Timeout
        } else if e.is_decode() {
            CastingFitError::Parse(e.to_string())
        } else {
            CastingFitError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for CastingFitError {
    fn from(e: serde_json::Error) -> Self {
        CastingFitError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CastingFitError>;
