use super::{AnalysisContext, Analyzer, CategoryResult, Scorecard};
use crate::models::{count_words, Category, Issue, IssueKind, IssuePayload, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

/// Long paragraphs reported per pass
const MAX_LONG_PARAGRAPH_ISSUES: usize = 3;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Punctuation-based sentence split (no abbreviation handling)
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Paragraph and sentence length checks
pub struct ReadabilityAnalyzer;

impl Analyzer for ReadabilityAnalyzer {
    fn category(&self) -> Category {
        Category::Readability
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> CategoryResult {
        let mut card = Scorecard::new(self.category(), ctx);
        let max_words = ctx.thresholds.paragraph.max_words;
        let sentence = &ctx.thresholds.sentence;

        let long_paragraphs = ctx
            .parser
            .paragraphs()
            .iter()
            .filter(|p| p.word_count > max_words)
            .take(MAX_LONG_PARAGRAPH_ISSUES);
        for paragraph in long_paragraphs {
            card.penalize(
                Issue::new(
                    IssueKind::ParagraphTooLong,
                    Severity::Warning,
                    ctx.config.penalty(IssueKind::ParagraphTooLong),
                    format!(
                        "Paragraph has {} words (limit {})",
                        paragraph.word_count, max_words
                    ),
                    format!(
                        "Split this paragraph into 2-3 shorter ones of at most {} words each",
                        max_words
                    ),
                )
                .at(paragraph.block_id())
                .with_payload(IssuePayload::bounds(max_words, paragraph.word_count)),
            );
        }

        for paragraph in ctx.parser.paragraphs() {
            let long_sentences = split_sentences(&paragraph.text)
                .into_iter()
                .filter(|s| count_words(s) > sentence.max_words)
                .count();
            if long_sentences > sentence.max_long_per_paragraph {
                card.penalize(
                    Issue::new(
                        IssueKind::ManyLongSentencesInParagraph,
                        Severity::Warning,
                        IssueKind::ManyLongSentencesInParagraph.default_penalty(),
                        format!(
                            "Paragraph has {} sentences longer than {} words",
                            long_sentences, sentence.max_words
                        ),
                        format!(
                            "Shorten the sentences in this paragraph to at most {} words",
                            sentence.max_words
                        ),
                    )
                    .at(paragraph.block_id())
                    .with_payload(IssuePayload::bounds(sentence.max_words, long_sentences)),
                );
            }
        }

        card.finish()
    }
}
