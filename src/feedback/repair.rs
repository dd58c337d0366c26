//! Best-effort decoding of possibly truncated feedback JSON
//!
//! The feedback generator occasionally stops mid-document. The only repair
//! attempted is appending the missing closing `}` / `]` delimiters; anything
//! else (cut inside a string, dangling key) fails.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Parsed as-is
    Decoded(Value),
    /// Parsed after closing unbalanced delimiters
    Repaired(Value),
    Failed(String),
}

impl DecodeOutcome {
    pub fn value(self) -> Option<Value> {
        match self {
            DecodeOutcome::Decoded(v) | DecodeOutcome::Repaired(v) => Some(v),
            DecodeOutcome::Failed(_) => None,
        }
    }
}

pub fn decode_lenient(text: &str) -> DecodeOutcome {
    let trimmed = text.trim();

    let err = match serde_json::from_str::<Value>(trimmed) {
        Ok(v) => return DecodeOutcome::Decoded(v),
        Err(e) => e,
    };

    match close_delimiters(trimmed) {
        Some(fixed) => match serde_json::from_str::<Value>(&fixed) {
            Ok(v) => DecodeOutcome::Repaired(v),
            Err(e) => DecodeOutcome::Failed(e.to_string()),
        },
        None => DecodeOutcome::Failed(err.to_string()),
    }
}

/// Append the closers for every delimiter left open outside string literals.
///
/// Returns `None` when there is nothing to close, the text ends inside a
/// string, or a closer does not match its opener.
pub fn close_delimiters(text: &str) -> Option<String> {
    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' => {
                if open.pop() != Some(c) {
                    return None;
                }
            }
            _ => {}
        }
    }

    if in_string || open.is_empty() {
        return None;
    }

    let mut fixed = String::with_capacity(text.len() + open.len());
    fixed.push_str(text);
    fixed.extend(open.iter().rev());
    Some(fixed)
}
