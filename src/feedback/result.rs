use super::repair::decode_lenient;
use super::types::StructuredFeedback;
use serde::Serialize;
use serde_json::Value;

pub const NO_FEEDBACK_MESSAGE: &str = "No feedback available for this call.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch feedback summary.";
pub const NO_IDENTIFIER_MESSAGE: &str = "No call ID available to fetch feedback.";

/// Normalized feedback for a finished call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum FeedbackResult {
    Structured(StructuredFeedback),
    PlainText(String),
    /// Nothing was produced for the call
    Empty,
    Error(String),
}

impl FeedbackResult {
    /// Interpret feedback text, accepting a structured document when the text
    /// decodes (possibly after delimiter repair) to the structured shape
    pub fn from_text(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            if let Some(feedback) = decode_lenient(text)
                .value()
                .and_then(|v| StructuredFeedback::from_value(&v))
            {
                return FeedbackResult::Structured(feedback);
            }
        }
        FeedbackResult::PlainText(text.to_string())
    }

    /// Text shown when there is no structured assessment
    pub fn message(&self) -> Option<&str> {
        match self {
            FeedbackResult::Structured(_) => None,
            FeedbackResult::PlainText(text) => Some(text),
            FeedbackResult::Empty => Some(NO_FEEDBACK_MESSAGE),
            FeedbackResult::Error(message) => Some(message),
        }
    }

    pub fn coverage(&self) -> Option<u8> {
        match self {
            FeedbackResult::Structured(feedback) => Some(feedback.coverage()),
            _ => None,
        }
    }
}

/// Observable state of feedback retrieval
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedbackState {
    #[default]
    Idle,
    Loading { retries_remaining: u32 },
    Ready { result: FeedbackResult },
    /// The session ended before the agent assigned a call id
    NoIdentifier,
}

impl FeedbackState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FeedbackState::Loading { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, FeedbackState::Ready { .. } | FeedbackState::NoIdentifier)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            FeedbackState::Ready { result } => result.message(),
            FeedbackState::NoIdentifier => Some(NO_IDENTIFIER_MESSAGE),
            _ => None,
        }
    }
}

/// How one backend payload should be handled
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Nothing usable yet; poll again
    Pending,
    Settled(FeedbackResult),
}

/// Whether a payload carries no feedback yet: null, blank text, or a processing marker
pub fn is_pending(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(obj) => obj.get("processing").is_some_and(is_truthy),
        _ => false,
    }
}

/// Classify a raw backend payload.
///
/// Precedence: pending markers, structured shape, `feedback_summary` /
/// `feedback_fallback` text, JSON-looking strings, then the serialized value.
pub fn classify(value: &Value) -> Classified {
    if is_pending(value) {
        return Classified::Pending;
    }

    if let Some(feedback) = StructuredFeedback::from_value(value) {
        return Classified::Settled(FeedbackResult::Structured(feedback));
    }

    if let Some(text) = fallback_text(value) {
        return Classified::Settled(FeedbackResult::from_text(text));
    }

    if let Value::String(raw) = value {
        if raw.trim_start().starts_with('{') {
            let result = match serde_json::from_str::<Value>(raw) {
                Ok(parsed) => match StructuredFeedback::from_value(&parsed) {
                    Some(feedback) => FeedbackResult::Structured(feedback),
                    None => FeedbackResult::PlainText(raw.clone()),
                },
                Err(_) => FeedbackResult::from_text(raw),
            };
            return Classified::Settled(result);
        }
    }

    Classified::Settled(FeedbackResult::PlainText(value.to_string()))
}

fn fallback_text(value: &Value) -> Option<&str> {
    let obj = value.as_object()?;
    ["feedback_summary", "feedback_fallback"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
