use anyhow::{Context, Result};
use castingfit::feedback::{FeedbackPoller, FeedbackResult, FeedbackSkill, FeedbackState};
use castingfit::{AgentOptions, AudioClip, BackendClient, Config};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "castingfit", version, about = "CastingFit interview session tools")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/castingfit")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the backend for a finished call's feedback
    Feedback {
        call_id: String,
        /// Override the configured retry count
        #[arg(long)]
        retries: Option<u32>,
    },
    /// Transcribe a recorded answer
    Transcribe { file: PathBuf },
    /// Extract candidate skills from a profile document
    ParseProfile {
        requirements: PathBuf,
        profile: PathBuf,
    },
    /// Synthesize speech to an audio file
    Speak {
        text: String,
        #[arg(long, short)]
        out: PathBuf,
    },
    /// Print the start payload the voice agent would receive
    Prompt {
        requirements: PathBuf,
        skills: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", cfg.backend.base_url);

    match cli.command {
        Command::Feedback { call_id, retries } => {
            let client = Arc::new(BackendClient::new(&cfg.backend)?);
            let (tx, rx) = watch::channel(FeedbackState::Idle);
            let poller = FeedbackPoller::new(client, Arc::new(tx), &cfg.feedback);

            poller
                .fetch(&call_id, retries.unwrap_or(cfg.feedback.max_retries))
                .await;

            let state = rx.borrow().clone();
            print_feedback(&state);
        }
        Command::Transcribe { file } => {
            let client = BackendClient::new(&cfg.backend)?;
            let clip = AudioClip::open(&file, &cfg.audio)?;
            if clip.wav.is_some() && !clip.matches_format(&cfg.audio) {
                info!(
                    "Clip is not {}Hz/{}ch; the backend will resample",
                    cfg.audio.sample_rate, cfg.audio.channels
                );
            }
            let text = client.speech_to_text(&clip).await?;
            println!("{}", text);
        }
        Command::ParseProfile {
            requirements,
            profile,
        } => {
            let client = BackendClient::new(&cfg.backend)?;
            let requirements = read_text(&requirements)?;
            let skills = client.parse_profile(&requirements, &profile).await?;
            println!("{}", skills);
        }
        Command::Speak { text, out } => {
            let client = BackendClient::new(&cfg.backend)?;
            let audio = client.synthesize(&text).await?;
            std::fs::write(&out, &audio)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Wrote {} bytes to {}", audio.len(), out.display());
        }
        Command::Prompt {
            requirements,
            skills,
        } => {
            let options = AgentOptions::for_interview(
                &cfg.agent,
                &read_text(&requirements)?,
                &read_text(&skills)?,
            );
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_feedback(state: &FeedbackState) {
    match state {
        FeedbackState::Ready {
            result: FeedbackResult::Structured(feedback),
        } => {
            println!("Role: {}", feedback.role);
            println!("Overall skill match: {}% rated good", feedback.coverage());
            print_tier("MUST", &feedback.skills.must);
            print_tier("SHOULD", &feedback.skills.should);
            print_tier("COULD", &feedback.skills.could);
            println!();
            println!("Summary: {}", feedback.summary.take);
            println!("  Strong: {}", feedback.summary.strong.join(", "));
            println!("  OK:     {}", feedback.summary.ok.join(", "));
            println!("  Weak:   {}", feedback.summary.weak.join(", "));
        }
        other => match other.message() {
            Some(message) => println!("{}", message),
            None => println!("Feedback still pending"),
        },
    }
}

fn print_tier(label: &str, skills: &[FeedbackSkill]) {
    if skills.is_empty() {
        return;
    }
    println!("{}:", label);
    for skill in skills {
        println!("  - {} ({:?})", skill.name, skill.status);
    }
}
