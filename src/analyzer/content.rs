use super::{AnalysisContext, Analyzer, CategoryResult, Scorecard};
use crate::models::{Category, Issue, IssueKind, IssuePayload, Severity};

/// Total length check
pub struct ContentQualityAnalyzer;

impl Analyzer for ContentQualityAnalyzer {
    fn category(&self) -> Category {
        Category::ContentQuality
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> CategoryResult {
        let mut card = Scorecard::new(self.category(), ctx);
        let bounds = &ctx.thresholds.word_count;
        let word_count = ctx.parser.total_word_count();

        if word_count < bounds.min {
            card.penalize(
                Issue::new(
                    IssueKind::ContentTooShort,
                    Severity::Critical,
                    IssueKind::ContentTooShort.default_penalty(),
                    format!("Article has only {} words", word_count),
                    format!("Expand the article to at least {} words", bounds.optimal_min),
                )
                .with_payload(IssuePayload::bounds(bounds.optimal_min, word_count)),
            );
        }

        card.finish()
    }
}
