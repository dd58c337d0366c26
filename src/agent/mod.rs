//! Voice agent seam
//!
//! The real-time voice SDK (transport, speech recognition, dialogue, speech
//! synthesis) stays external. Sessions only need to:
//! - start a call with an instruction payload
//! - stop it
//! - observe its events

mod options;

pub use options::{
    instruction_payload, AgentOptions, ModelOptions, PromptMessage, TranscriberOptions,
    VoiceOptions,
};

use crate::error::Result;
use crate::session::Originator;
use futures::stream::BoxStream;

/// Events emitted by the voice agent during a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// The call ended (hang-up on either side or remote close)
    Terminated,
    /// Transport or vendor fault; `message` is the vendor's error text
    Fault { message: String },
    /// The agent began speaking
    SpeechStarted,
    /// The agent finished speaking
    SpeechEnded,
    /// A final transcript line
    Transcript { originator: Originator, text: String },
}

/// Result of a successful start; the vendor may not assign an id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartedCall {
    pub id: Option<String>,
}

/// A real-time voice agent session handle
#[async_trait::async_trait]
pub trait VoiceAgent: Send + Sync {
    /// Subscribe to call events. Events may arrive before `start` resolves.
    fn subscribe(&self) -> BoxStream<'static, AgentEvent>;

    /// Open the call
    async fn start(&self, options: AgentOptions) -> Result<StartedCall>;

    /// Close the call
    async fn stop(&self) -> Result<()>;
}
