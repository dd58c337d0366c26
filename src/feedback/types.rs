use serde::{Deserialize, Serialize};

/// Rating given to a single skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Good,
    Ok,
    Weak,
    #[default]
    #[serde(other)]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSkill {
    pub name: String,
    #[serde(default)]
    pub status: SkillStatus,
}

/// Skills grouped by priority tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTiers {
    pub must: Vec<FeedbackSkill>,
    pub should: Vec<FeedbackSkill>,
    pub could: Vec<FeedbackSkill>,
}

impl SkillTiers {
    pub fn iter(&self) -> impl Iterator<Item = &FeedbackSkill> {
        self.must.iter().chain(&self.should).chain(&self.could)
    }

    pub fn len(&self) -> usize {
        self.must.len() + self.should.len() + self.could.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSummary {
    pub take: String,
    pub strong: Vec<String>,
    pub ok: Vec<String>,
    pub weak: Vec<String>,
}

/// Skill assessment produced by the backend after a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFeedback {
    pub role: String,
    pub skills: SkillTiers,
    pub summary: FeedbackSummary,
}

impl StructuredFeedback {
    /// Percentage of listed skills rated good, rounded; 0 when nothing is listed
    pub fn coverage(&self) -> u8 {
        let total = self.skills.len();
        if total == 0 {
            return 0;
        }
        let good = self
            .skills
            .iter()
            .filter(|s| s.status == SkillStatus::Good)
            .count();
        ((good as f64 / total as f64) * 100.0).round() as u8
    }

    /// Whether a JSON value has the fields of a structured assessment
    pub fn has_shape(value: &serde_json::Value) -> bool {
        value.as_object().is_some_and(|obj| {
            obj.contains_key("role") && obj.contains_key("skills") && obj.contains_key("summary")
        })
    }

    /// Decode a value with the structured shape; `None` when fields are missing or mistyped
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        if !Self::has_shape(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}
