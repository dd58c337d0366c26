//! Post-call feedback retrieval
//!
//! - `types`: structured skill assessment and coverage
//! - `repair`: lenient decoding of truncated JSON
//! - `result`: classification of raw backend payloads
//! - `poller`: retry-with-delay polling loop

mod poller;
mod repair;
mod result;
mod types;

pub use poller::{FeedbackPoller, FeedbackSource, SessionGuard};
pub use repair::{close_delimiters, decode_lenient, DecodeOutcome};
pub use result::{
    classify, is_pending, Classified, FeedbackResult, FeedbackState, FETCH_FAILED_MESSAGE,
    NO_FEEDBACK_MESSAGE, NO_IDENTIFIER_MESSAGE,
};
pub use types::{FeedbackSkill, FeedbackSummary, SkillStatus, SkillTiers, StructuredFeedback};
