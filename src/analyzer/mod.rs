//! Scoring analyzers and the aggregator that combines them.
//!
//! Each analyzer owns one [`Category`]: it starts at the category's maximum
//! weight, deducts a penalty per finding, and returns the raw score together
//! with its block-addressed issues. Clamping happens in the aggregator.

pub mod content;
pub mod keyword;
pub mod readability;
pub mod scoring;
pub mod structure;
pub mod technical;

pub use content::ContentQualityAnalyzer;
pub use keyword::{keyword_density, KeywordAnalyzer};
pub use readability::ReadabilityAnalyzer;
pub use scoring::SeoChecker;
pub use structure::StructureAnalyzer;
pub use technical::TechnicalAnalyzer;

use crate::config::{ScoringConfig, Thresholds};
use crate::models::{Category, Issue, SeoArticle};
use crate::parser::ContentParser;

/// Everything an analyzer may read during one analysis call
pub struct AnalysisContext<'a> {
    pub article: &'a SeoArticle,
    pub parser: &'a dyn ContentParser,
    pub config: &'a ScoringConfig,
    pub thresholds: &'a Thresholds,
}

/// Raw result of one analyzer (score not yet clamped)
#[derive(Debug, Clone)]
pub struct CategoryResult {
    pub category: Category,
    pub max: f64,
    pub score: f64,
    pub issues: Vec<Issue>,
}

impl CategoryResult {
    /// Score clamped to `[0, max]`
    pub fn clamped(&self) -> f64 {
        self.score.clamp(0.0, self.max.max(0.0))
    }
}

pub trait Analyzer: Send + Sync {
    fn category(&self) -> Category;

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> CategoryResult;
}

/// Running tally used inside analyzers
pub(crate) struct Scorecard {
    category: Category,
    max: f64,
    score: f64,
    issues: Vec<Issue>,
}

impl Scorecard {
    pub(crate) fn new(category: Category, ctx: &AnalysisContext<'_>) -> Self {
        let max = ctx.config.scoring_weights().max_for(category);
        Self {
            category,
            max,
            score: max,
            issues: Vec::new(),
        }
    }

    /// Record an issue and deduct its penalty
    pub(crate) fn penalize(&mut self, issue: Issue) {
        self.score -= f64::from(issue.penalty);
        self.issues.push(issue);
    }

    /// Record an issue whose penalty was already deducted as part of a group
    pub(crate) fn record(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub(crate) fn deduct(&mut self, points: u32) {
        self.score -= f64::from(points);
    }

    pub(crate) fn finish(self) -> CategoryResult {
        CategoryResult {
            category: self.category,
            max: self.max,
            score: self.score,
            issues: self.issues,
        }
    }
}

/// First `n` characters of `text`, with an ellipsis when cut
pub(crate) fn snippet(text: &str, n: usize) -> String {
    if text.chars().count() > n {
        format!("{}...", text.chars().take(n).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{ArticleBlock, BlockTag};

    pub fn words(prefix: &str, n: usize) -> String {
        (0..n)
            .map(|i| format!("{}{}", prefix, i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn block(id: &str, tag: BlockTag, text: impl Into<String>) -> ArticleBlock {
        ArticleBlock::new(id, tag, text)
    }
}
