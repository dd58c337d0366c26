pub mod cache;
pub mod client;
pub mod messages;

pub use cache::ResponseCache;
pub use client::{decode_audio, BackendClient};
pub use messages::{
    ParseProfileResponse, SpeechToTextResponse, TextToSpeechRequest, TextToSpeechResponse,
};
