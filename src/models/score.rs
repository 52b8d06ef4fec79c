use super::issue::IssuesBySeverity;
use crate::config::Thresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Letter grade derived from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    F,
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Fixed breakpoints: ≥90 A+, ≥80 A, ≥70 B, ≥60 C, ≥50 D, else F
    pub fn from_score(total: f64) -> Self {
        if total >= 90.0 {
            Grade::APlus
        } else if total >= 80.0 {
            Grade::A
        } else if total >= 70.0 {
            Grade::B
        } else if total >= 60.0 {
            Grade::C
        } else if total >= 50.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to one decimal place for reporting
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Output of one scoring pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub structure: f64,
    pub keyword_optimization: f64,
    pub readability: f64,
    pub technical_seo: f64,
    pub content_quality: f64,

    /// Sum of awarded bonuses
    pub bonus: f64,

    /// Grand total, clamped to [0, 100]
    pub total: f64,

    pub grade: Grade,
}

/// A bonus awarded by the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    #[serde(rename = "type")]
    pub name: String,
    pub points: f64,
}

/// Internal/external link counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub internal: usize,
    pub external: usize,
}

/// Measurements reported next to the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub word_count: usize,
    pub title_length: usize,
    pub meta_length: usize,

    /// "block" or "markup"
    pub parser_mode: String,

    pub block_count: usize,

    /// Heading tag → heading texts in document order
    pub headings: BTreeMap<String, Vec<String>>,

    pub images_count: usize,

    pub links: LinkStats,
}

/// Configuration actually applied to an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigUsed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub thresholds: Thresholds,
}

/// Full result of a single analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub score_breakdown: ScoreBreakdown,
    pub issues: IssuesBySeverity,
    pub bonuses: Vec<Bonus>,
    pub stats: AnalysisStats,
    pub config_used: ConfigUsed,
}

impl AnalysisReport {
    pub fn total(&self) -> f64 {
        self.score_breakdown.total
    }

    pub fn grade(&self) -> Grade {
        self.score_breakdown.grade
    }
}

/// Envelope returned to the result consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
}

impl CheckResponse {
    pub fn ok(report: AnalysisReport) -> Self {
        Self {
            success: true,
            message: "SEO analysis completed".to_string(),
            report: Some(report),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            report: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_breakpoints() {
        assert_eq!(Grade::from_score(100.0), Grade::APlus);
        assert_eq!(Grade::from_score(90.0), Grade::APlus);
        assert_eq!(Grade::from_score(89.9), Grade::A);
        assert_eq!(Grade::from_score(70.0), Grade::B);
        assert_eq!(Grade::from_score(60.0), Grade::C);
        assert_eq!(Grade::from_score(50.0), Grade::D);
        assert_eq!(Grade::from_score(49.9), Grade::F);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&Grade::C).unwrap(), "\"C\"");
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round1(7.0), 7.0);
    }
}
