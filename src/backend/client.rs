use super::cache::ResponseCache;
use super::messages::{
    ParseProfileResponse, SpeechToTextResponse, TextToSpeechRequest, TextToSpeechResponse,
};
use crate::audio::AudioClip;
use crate::config::BackendConfig;
use crate::error::{CastingFitError, Result};
use crate::feedback::{is_pending, FeedbackSource};
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info};

/// Client for the CastingFit backend API
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
    cache: ResponseCache<Value>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            cache: ResponseCache::new(config.cache_ttl()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET /call-feedback?call_id=<id>
    ///
    /// Settled responses are cached for the configured window; pending ones
    /// (empty or still processing) always go back to the backend.
    pub async fn call_feedback(&self, call_id: &str) -> Result<Value> {
        let cache_key = format!("feedback-{}", call_id);
        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Feedback for {} served from cache", call_id);
            return Ok(cached);
        }

        let url = Url::parse_with_params(&self.endpoint("call-feedback"), &[("call_id", call_id)])
            .map_err(|e| CastingFitError::Transport(format!("Invalid backend URL: {}", e)))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Error fetching feedback: {}", e);
            CastingFitError::from(e)
        })?;
        let value: Value = ensure_success(response, "Failed to fetch feedback")?
            .json()
            .await?;

        if !is_pending(&value) {
            self.cache.insert(cache_key, value.clone());
        }

        Ok(value)
    }

    /// POST /speech-to-text with the clip as multipart `file`
    pub async fn speech_to_text(&self, clip: &AudioClip) -> Result<String> {
        info!("Transcribing {} ({} bytes)", clip.file_name, clip.size_bytes);

        let part = Part::bytes(clip.read_bytes().await?)
            .file_name(clip.file_name.clone())
            .mime_str(clip.mime_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("speech-to-text"))
            .multipart(form)
            .send()
            .await?;
        let body: SpeechToTextResponse = ensure_success(response, "Failed to convert speech to text")?
            .json()
            .await?;

        Ok(body.text)
    }

    /// POST /parse-profile with the role requirements and a profile document
    pub async fn parse_profile(&self, requirements: &str, profile: impl AsRef<Path>) -> Result<String> {
        let profile = profile.as_ref();
        info!("Parsing profile {}", profile.display());

        let bytes = tokio::fs::read(profile).await?;
        let file_name = profile
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile".to_string());

        let form = Form::new()
            .text("requirements", requirements.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.endpoint("parse-profile"))
            .multipart(form)
            .send()
            .await?;
        let body: ParseProfileResponse = ensure_success(response, "Failed to parse profile")?
            .json()
            .await?;

        Ok(body.skills)
    }

    /// POST /text-to-speech; returns the base64 audio payload
    pub async fn text_to_speech(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("text-to-speech"))
            .json(&TextToSpeechRequest {
                text: text.to_string(),
            })
            .send()
            .await?;
        let body: TextToSpeechResponse = ensure_success(response, "Failed to convert text to speech")?
            .json()
            .await?;

        Ok(body.audio)
    }

    /// Synthesize `text` and decode the audio bytes
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let encoded = self.text_to_speech(text).await?;
        decode_audio(&encoded)
    }
}

#[async_trait::async_trait]
impl FeedbackSource for BackendClient {
    async fn call_feedback(&self, call_id: &str) -> Result<Value> {
        BackendClient::call_feedback(self, call_id).await
    }
}

/// Decode a base64 audio payload, tolerating a `data:` URL prefix
pub fn decode_audio(encoded: &str) -> Result<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((_, data)) => data,
        None => encoded,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CastingFitError::Parse(format!("Invalid audio payload: {}", e)))
}

fn ensure_success(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(CastingFitError::Http {
        status: status.as_u16(),
        message: format!(
            "{}: {}",
            context,
            status.canonical_reason().unwrap_or("unknown status")
        ),
    })
}
