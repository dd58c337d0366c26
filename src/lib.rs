pub mod agent;
pub mod audio;
pub mod backend;
pub mod config;
pub mod error;
pub mod feedback;
pub mod http;
pub mod registry;
pub mod session;

pub use agent::{AgentEvent, AgentOptions, StartedCall, VoiceAgent};
pub use audio::AudioClip;
pub use backend::BackendClient;
pub use config::Config;
pub use error::{CastingFitError, Result};
pub use feedback::{
    FeedbackPoller, FeedbackResult, FeedbackSource, FeedbackState, StructuredFeedback,
};
pub use http::{create_router, AppState};
pub use registry::{Resource, ResourceRegistry};
pub use session::{
    Message, Originator, SessionConfig, SessionController, SessionStatus, SessionView,
    TranscriptStore,
};
