use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Who produced an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Originator {
    Agent,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A single exchanged utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub originator: Originator,
    pub sender: Sender,
}

impl Message {
    pub fn new(content: impl Into<String>, originator: Originator, sender_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now(),
            originator,
            sender: Sender {
                name: sender_name.into(),
                avatar: None,
            },
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.sender.avatar = Some(avatar.into());
        self
    }
}

/// Append-only transcript of a session
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    messages: Vec<Message>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Messages in insertion order, keeping only the first occurrence of each
    /// (content, sender name) pair. Computed on every call.
    pub fn deduped_view(&self) -> Vec<Message> {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        self.messages
            .iter()
            .filter(|m| seen.insert((m.content.as_str(), m.sender.name.as_str())))
            .cloned()
            .collect()
    }

    pub fn raw(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
