use crate::config::AgentConfig;
use serde::{Deserialize, Serialize};

/// Start payload handed to the voice agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOptions {
    pub name: String,
    pub first_message: String,
    pub transcriber: TranscriberOptions,
    pub voice: VoiceOptions,
    pub model: ModelOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberOptions {
    pub provider: String,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOptions {
    pub provider: String,
    pub voice_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOptions {
    pub provider: String,
    pub model: String,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl AgentOptions {
    /// Build the interview payload, embedding both inputs verbatim in the system prompt
    pub fn for_interview(config: &AgentConfig, requirements: &str, skills_context: &str) -> Self {
        Self {
            name: config.name.clone(),
            first_message: config.first_message.clone(),
            transcriber: TranscriberOptions {
                provider: config.transcriber.provider.clone(),
                model: config.transcriber.model.clone(),
                language: config.transcriber.language.clone(),
            },
            voice: VoiceOptions {
                provider: config.voice.provider.clone(),
                voice_id: config.voice.voice_id.clone(),
            },
            model: ModelOptions {
                provider: config.model.provider.clone(),
                model: config.model.model.clone(),
                messages: vec![PromptMessage {
                    role: "system".to_string(),
                    content: instruction_payload(requirements, skills_context),
                }],
            },
        }
    }

    /// The system prompt, if present
    pub fn instructions(&self) -> Option<&str> {
        self.model
            .messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
    }
}

/// Render the recruiter system prompt for one interview
pub fn instruction_payload(requirements: &str, skills_context: &str) -> String {
    format!(
        "You are an AI Technical Recruiter.

ROLE REQUIREMENTS:
{requirements}

CANDIDATE PROFILE SKILLS/CONTEXT:
{skills_context}

Your job is to conduct a professional, adaptive discussion with the candidate.
- Ask only one question at a time, and make each question specific to the candidate's profile and the role requirements.
- After the candidate answers, analyze their response and then ask the next most relevant, specific question.
- Do not ask the next question until the candidate has responded.
- Use the candidate's answers to guide your follow-up questions.
- If the candidate shows intent to 'leave' or 'end', politely end the session and thank them.
- Before ending the discussion, give a warm thank you, wish them the best, and let them know that feedback will be shared by their manager.
Begin the discussion with a friendly greeting and your first question."
    )
}
