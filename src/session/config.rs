use crate::config::{AgentConfig, Config, FeedbackConfig};

/// Configuration for interview sessions
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Vendor settings for the voice agent
    pub agent: AgentConfig,

    /// Feedback polling after the call ends
    pub feedback: FeedbackConfig,

    /// Sender name for agent and scripted messages
    pub agent_display_name: String,

    /// Sender name for candidate messages
    pub candidate_display_name: String,

    /// First transcript entry of every session
    pub welcome_message: String,

    /// Last transcript entry, appended on leave
    pub closing_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            feedback: FeedbackConfig::default(),
            agent_display_name: "Bot".to_string(),
            candidate_display_name: "Candidate".to_string(),
            welcome_message: "This conversation is intended to understand how your approach and thinking align with the objectives of the project. It's an opportunity to exchange ideas, share perspectives, and learn more about your experience and interests. Please feel free to ask any questions you may have about the opportunity at any point during our discussion.".to_string(),
            closing_message: "We truly appreciate your time and the insights you shared. Wishing you all the best on your career journey ahead. Your manager will follow up with feedback shortly.".to_string(),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            agent: config.agent.clone(),
            feedback: config.feedback.clone(),
            ..Self::default()
        }
    }
}
