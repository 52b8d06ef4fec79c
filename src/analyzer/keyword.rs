use super::{AnalysisContext, Analyzer, CategoryResult, Scorecard};
use crate::models::{BlockTag, Category, Issue, IssueKind, IssuePayload, Severity};
use crate::parser::{count_occurrences, keyword_hotspot};

/// Keyword density as a percentage of `word_count` (at least one word)
pub fn keyword_density(text: &str, keyword: &str, word_count: usize) -> f64 {
    let count = count_occurrences(text, keyword);
    count as f64 * 100.0 / word_count.max(1) as f64
}

/// Per-keyword presence and density checks
pub struct KeywordAnalyzer;

impl Analyzer for KeywordAnalyzer {
    fn category(&self) -> Category {
        Category::KeywordOptimization
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> CategoryResult {
        let mut card = Scorecard::new(self.category(), ctx);

        let title = ctx.article.title.to_lowercase();
        let meta = ctx.article.meta_description.to_lowercase();
        let first_paragraph = ctx.parser.first_paragraph();
        let h1s = ctx.parser.headings(BlockTag::H1);
        let h2s = ctx.parser.headings(BlockTag::H2);
        let word_count = ctx.parser.total_word_count();
        let stuffing_threshold = ctx.thresholds.keyword_density.stuffing_threshold;

        for keyword in ctx.article.keywords.iter().filter(|k| !k.trim().is_empty()) {
            let needle = keyword.to_lowercase();
            let payload = IssuePayload::keyword(keyword.as_str());

            if !title.contains(&needle) {
                card.penalize(
                    Issue::new(
                        IssueKind::KeywordNotInTitle,
                        Severity::Warning,
                        IssueKind::KeywordNotInTitle.default_penalty(),
                        format!("Keyword '{}' is missing from the title", keyword),
                        format!("Add keyword '{}' to the title, ideally near the start", keyword),
                    )
                    .with_payload(payload.clone()),
                );
            }

            if !meta.contains(&needle) {
                card.penalize(
                    Issue::new(
                        IssueKind::KeywordNotInMeta,
                        Severity::Warning,
                        IssueKind::KeywordNotInMeta.default_penalty(),
                        format!("Keyword '{}' is missing from the meta description", keyword),
                        format!("Add keyword '{}' to the meta description", keyword),
                    )
                    .with_payload(payload.clone()),
                );
            }

            if let Some(paragraph) = first_paragraph {
                if !paragraph.text.to_lowercase().contains(&needle) {
                    card.penalize(
                        Issue::new(
                            IssueKind::KeywordNotInFirstParagraph,
                            Severity::Info,
                            IssueKind::KeywordNotInFirstParagraph.default_penalty(),
                            format!("Keyword '{}' does not appear in the opening paragraph", keyword),
                            format!("Work keyword '{}' into this opening paragraph", keyword),
                        )
                        .at(paragraph.block_id())
                        .with_payload(payload.clone()),
                    );
                }
            }

            if let Some(h1) = h1s.first() {
                if !h1.text.to_lowercase().contains(&needle) {
                    card.penalize(
                        Issue::new(
                            IssueKind::KeywordNotInH1,
                            Severity::Warning,
                            IssueKind::KeywordNotInH1.default_penalty(),
                            format!("Keyword '{}' is missing from the main H1", keyword),
                            format!("Add keyword '{}' to this H1 heading", keyword),
                        )
                        .at(h1.block_id())
                        .with_payload(payload.clone()),
                    );
                }
            }

            if let Some(first_h2) = h2s.first() {
                let in_any_h2 = h2s.iter().any(|h2| h2.text.to_lowercase().contains(&needle));
                if !in_any_h2 {
                    card.penalize(
                        Issue::new(
                            IssueKind::KeywordNotInH2,
                            Severity::Info,
                            IssueKind::KeywordNotInH2.default_penalty(),
                            format!("Keyword '{}' does not appear in any H2 heading", keyword),
                            format!("Add keyword '{}' to this H2 or another H2 heading", keyword),
                        )
                        .at(first_h2.block_id())
                        .with_payload(payload.clone()),
                    );
                }
            }

            // Detection is global, the fix target is the densest paragraph
            let density = keyword_density(ctx.parser.clean_text(), keyword, word_count);
            if density > stuffing_threshold {
                let hotspot = keyword_hotspot(ctx.parser.paragraphs(), keyword);
                let detail = match hotspot {
                    Some(p) => format!(
                        "Keyword '{}' is overused ({:.1}% of the article, {:.1}% in this paragraph)",
                        keyword,
                        density,
                        keyword_density(&p.text, keyword, p.word_count)
                    ),
                    None => format!("Keyword '{}' is overused ({:.1}% of the article)", keyword, density),
                };
                card.penalize(
                    Issue::new(
                        IssueKind::KeywordStuffing,
                        Severity::Critical,
                        ctx.config.penalty(IssueKind::KeywordStuffing),
                        detail,
                        format!("Reduce occurrences of keyword '{}' in this paragraph", keyword),
                    )
                    .at(hotspot.and_then(|p| p.block_id()))
                    .with_payload(IssuePayload {
                        keyword: Some(keyword.clone()),
                        expected: Some(stuffing_threshold.floor() as usize),
                        actual: Some(density.round() as usize),
                    }),
                );
            }
        }

        card.finish()
    }
}
