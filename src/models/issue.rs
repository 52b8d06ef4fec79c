use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for analyzer findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed, heavy score impact
    Critical,
    /// Should be fixed
    Warning,
    /// Nice to fix
    Info,
}

impl Severity {
    /// Processing rank: critical(0) < warning(1) < info(2)
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }

    /// Get display symbol for severity
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::Warning => "🟡",
            Severity::Info => "🔵",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

/// Scoring category an issue belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Structure,
    KeywordOptimization,
    Readability,
    TechnicalSeo,
    ContentQuality,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Structure => "structure",
            Category::KeywordOptimization => "keyword_optimization",
            Category::Readability => "readability",
            Category::TechnicalSeo => "technical_seo",
            Category::ContentQuality => "content_quality",
        }
    }
}

/// Closed taxonomy of analyzer findings
///
/// Serialized names are the wire keys used in reports and in the penalty table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    // Structure
    MissingH1,
    MultipleH1,
    FewH2,
    TooManyH3,

    // Keyword
    KeywordNotInTitle,
    KeywordNotInMeta,
    KeywordNotInFirstParagraph,
    KeywordNotInH1,
    KeywordNotInH2,
    KeywordStuffing,

    // Readability
    ParagraphTooLong,
    ManyLongSentencesInParagraph,

    // Technical
    TitleTooShort,
    TitleTooLong,
    MetaTooShort,
    MissingAltText,
    NoInternalLinks,

    // Content quality
    ContentTooShort,
}

impl IssueKind {
    pub const ALL: [IssueKind; 18] = [
        IssueKind::MissingH1,
        IssueKind::MultipleH1,
        IssueKind::FewH2,
        IssueKind::TooManyH3,
        IssueKind::KeywordNotInTitle,
        IssueKind::KeywordNotInMeta,
        IssueKind::KeywordNotInFirstParagraph,
        IssueKind::KeywordNotInH1,
        IssueKind::KeywordNotInH2,
        IssueKind::KeywordStuffing,
        IssueKind::ParagraphTooLong,
        IssueKind::ManyLongSentencesInParagraph,
        IssueKind::TitleTooShort,
        IssueKind::TitleTooLong,
        IssueKind::MetaTooShort,
        IssueKind::MissingAltText,
        IssueKind::NoInternalLinks,
        IssueKind::ContentTooShort,
    ];

    /// Wire key (matches the serde representation)
    pub fn key(&self) -> &'static str {
        match self {
            IssueKind::MissingH1 => "missing_h1",
            IssueKind::MultipleH1 => "multiple_h1",
            IssueKind::FewH2 => "few_h2",
            IssueKind::TooManyH3 => "too_many_h3",
            IssueKind::KeywordNotInTitle => "keyword_not_in_title",
            IssueKind::KeywordNotInMeta => "keyword_not_in_meta",
            IssueKind::KeywordNotInFirstParagraph => "keyword_not_in_first_paragraph",
            IssueKind::KeywordNotInH1 => "keyword_not_in_h1",
            IssueKind::KeywordNotInH2 => "keyword_not_in_h2",
            IssueKind::KeywordStuffing => "keyword_stuffing",
            IssueKind::ParagraphTooLong => "paragraph_too_long",
            IssueKind::ManyLongSentencesInParagraph => "many_long_sentences_in_paragraph",
            IssueKind::TitleTooShort => "title_too_short",
            IssueKind::TitleTooLong => "title_too_long",
            IssueKind::MetaTooShort => "meta_too_short",
            IssueKind::MissingAltText => "missing_alt_text",
            IssueKind::NoInternalLinks => "no_internal_links",
            IssueKind::ContentTooShort => "content_too_short",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.key() == key)
    }

    pub fn category(&self) -> Category {
        match self {
            IssueKind::MissingH1
            | IssueKind::MultipleH1
            | IssueKind::FewH2
            | IssueKind::TooManyH3 => Category::Structure,
            IssueKind::KeywordNotInTitle
            | IssueKind::KeywordNotInMeta
            | IssueKind::KeywordNotInFirstParagraph
            | IssueKind::KeywordNotInH1
            | IssueKind::KeywordNotInH2
            | IssueKind::KeywordStuffing => Category::KeywordOptimization,
            IssueKind::ParagraphTooLong | IssueKind::ManyLongSentencesInParagraph => {
                Category::Readability
            }
            IssueKind::TitleTooShort
            | IssueKind::TitleTooLong
            | IssueKind::MetaTooShort
            | IssueKind::MissingAltText
            | IssueKind::NoInternalLinks => Category::TechnicalSeo,
            IssueKind::ContentTooShort => Category::ContentQuality,
        }
    }

    /// Penalty used when the penalty table has no entry for this kind
    pub fn default_penalty(&self) -> u32 {
        match self {
            IssueKind::MissingH1 => 10,
            IssueKind::MultipleH1 => 5,
            IssueKind::FewH2 => 5,
            IssueKind::TooManyH3 => 2,
            IssueKind::KeywordNotInTitle => 5,
            IssueKind::KeywordNotInMeta => 3,
            IssueKind::KeywordNotInFirstParagraph => 2,
            IssueKind::KeywordNotInH1 => 3,
            IssueKind::KeywordNotInH2 => 1,
            IssueKind::KeywordStuffing => 8,
            IssueKind::ParagraphTooLong => 3,
            IssueKind::ManyLongSentencesInParagraph => 2,
            IssueKind::TitleTooShort | IssueKind::TitleTooLong => 5,
            IssueKind::MetaTooShort => 3,
            IssueKind::MissingAltText => 1,
            IssueKind::NoInternalLinks => 3,
            IssueKind::ContentTooShort => 10,
        }
    }

    /// Keyword-driven kinds carry a keyword in their payload
    pub fn is_keyword_issue(&self) -> bool {
        self.category() == Category::KeywordOptimization
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Structured parameters emitted alongside the human-readable text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuePayload {
    /// Implicated keyword
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    /// Target bound the fix should reach (chars or words, depending on the kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<usize>,

    /// Measured value that triggered the issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<usize>,
}

impl IssuePayload {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn bounds(expected: usize, actual: usize) -> Self {
        Self {
            keyword: None,
            expected: Some(expected),
            actual: Some(actual),
        }
    }
}

/// An analyzer finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,

    /// Responsible block, empty for whole-article findings
    #[serde(default)]
    pub block_id: String,

    pub severity: Severity,

    pub penalty: u32,

    pub detail: String,

    pub recommendation: String,

    #[serde(default)]
    pub payload: IssuePayload,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        penalty: u32,
        detail: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            block_id: String::new(),
            severity,
            penalty,
            detail: detail.into(),
            recommendation: recommendation.into(),
            payload: IssuePayload::default(),
        }
    }

    /// Attach the responsible block (ignored when `None`)
    pub fn at(mut self, block_id: Option<&str>) -> Self {
        self.block_id = block_id.unwrap_or_default().to_string();
        self
    }

    pub fn with_payload(mut self, payload: IssuePayload) -> Self {
        self.payload = payload;
        self
    }

    /// Block this issue points at, if any
    pub fn target_block(&self) -> Option<&str> {
        if self.block_id.is_empty() {
            None
        } else {
            Some(&self.block_id)
        }
    }

    /// Format issue for display
    pub fn format(&self) -> String {
        let location = self.target_block().unwrap_or("article");
        format!(
            "{} [{}] {} @ {} (-{}) - {}",
            self.severity.symbol(),
            self.severity.name(),
            self.kind,
            location,
            self.penalty,
            self.detail
        )
    }
}

/// Issues grouped the way the result consumer receives them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuesBySeverity {
    #[serde(default)]
    pub critical: Vec<Issue>,
    #[serde(default)]
    pub warning: Vec<Issue>,
    #[serde(default)]
    pub info: Vec<Issue>,
}

impl IssuesBySeverity {
    pub fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Critical => self.critical.push(issue),
            Severity::Warning => self.warning.push(issue),
            Severity::Info => self.info.push(issue),
        }
    }

    /// Iterate critical → warning → info, discovery order within a group
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.critical
            .iter()
            .chain(self.warning.iter())
            .chain(self.info.iter())
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.warning.len() + self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical.len(),
            Severity::Warning => self.warning.len(),
            Severity::Info => self.info.len(),
        }
    }

    pub fn of_kind(&self, kind: IssueKind) -> Vec<&Issue> {
        self.iter().filter(|issue| issue.kind == kind).collect()
    }
}

impl FromIterator<Issue> for IssuesBySeverity {
    fn from_iter<T: IntoIterator<Item = Issue>>(iter: T) -> Self {
        let mut grouped = Self::default();
        for issue in iter {
            grouped.push(issue);
        }
        grouped
    }
}
