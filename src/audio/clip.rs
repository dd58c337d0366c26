use crate::config::AudioConfig;
use crate::error::{CastingFitError, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// Format details read from a WAV header
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// A recorded answer, validated for upload to speech-to-text
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: &'static str,
    pub size_bytes: u64,
    /// Present for WAV recordings
    pub wav: Option<WavInfo>,
}

impl AudioClip {
    pub fn open(path: impl AsRef<Path>, config: &AudioConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio clip: {}", path.display());

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if !config.supported_types.iter().any(|t| *t == extension) {
            return Err(CastingFitError::Validation(format!(
                "Unsupported audio type '{}' (expected one of: {})",
                extension,
                config.supported_types.join(", ")
            )));
        }

        let size_bytes = std::fs::metadata(path)?.len();
        if size_bytes > config.max_file_size {
            return Err(CastingFitError::Validation(format!(
                "Audio file is {} bytes, limit is {} bytes",
                size_bytes, config.max_file_size
            )));
        }

        let wav = if extension == "wav" {
            Some(probe_wav(path)?)
        } else {
            None
        };

        if let Some(wav) = &wav {
            info!(
                "Audio clip loaded: {:.1}s, {}Hz, {} channels",
                wav.duration_seconds, wav.sample_rate, wav.channels
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "recording".to_string()),
            mime_type: mime_for(&extension),
            size_bytes,
            wav,
        })
    }

    /// Whether the clip already matches the format the transcriber expects
    pub fn matches_format(&self, config: &AudioConfig) -> bool {
        self.wav
            .as_ref()
            .is_some_and(|w| w.sample_rate == config.sample_rate && w.channels == config.channels)
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

fn probe_wav(path: &Path) -> Result<WavInfo> {
    let reader = WavReader::open(path)
        .map_err(|e| CastingFitError::Validation(format!("Invalid WAV file: {}", e)))?;

    let spec = reader.spec();
    let duration_seconds = if spec.sample_rate == 0 {
        0.0
    } else {
        reader.duration() as f64 / spec.sample_rate as f64
    };

    Ok(WavInfo {
        duration_seconds,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

pub fn mime_for(extension: &str) -> &'static str {
    match extension {
        "wav" => "audio/wav",
        "mp3" | "mpeg" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}
