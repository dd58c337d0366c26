use serde::{Deserialize, Serialize};

/// Response of `POST /speech-to-text`
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechToTextResponse {
    pub text: String,
}

/// Response of `POST /parse-profile`
#[derive(Debug, Serialize, Deserialize)]
pub struct ParseProfileResponse {
    pub skills: String,
}

/// Body of `POST /text-to-speech`
#[derive(Debug, Serialize, Deserialize)]
pub struct TextToSpeechRequest {
    pub text: String,
}

/// Response of `POST /text-to-speech`
#[derive(Debug, Serialize, Deserialize)]
pub struct TextToSpeechResponse {
    pub audio: String, // Base64-encoded audio
}
