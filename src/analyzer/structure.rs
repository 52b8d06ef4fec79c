use super::{snippet, AnalysisContext, Analyzer, CategoryResult, Scorecard};
use crate::models::{BlockTag, Category, Issue, IssueKind, IssuePayload, Severity};

/// Heading-count correctness
pub struct StructureAnalyzer;

impl Analyzer for StructureAnalyzer {
    fn category(&self) -> Category {
        Category::Structure
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> CategoryResult {
        let mut card = Scorecard::new(self.category(), ctx);
        let headings = &ctx.thresholds.headings;

        // Step 1: H1 presence and uniqueness
        let h1s = ctx.parser.headings(BlockTag::H1);
        if h1s.is_empty() {
            card.penalize(
                Issue::new(
                    IssueKind::MissingH1,
                    Severity::Critical,
                    ctx.config.penalty(IssueKind::MissingH1),
                    "Article has no H1 heading",
                    "Add a single H1 heading that contains the main keyword",
                )
                .with_payload(IssuePayload::bounds(1, 0)),
            );
        } else if h1s.len() > 1 {
            let penalty = ctx.config.penalty(IssueKind::MultipleH1);
            let extras = &h1s[1..];
            let share = penalty / extras.len() as u32;
            card.deduct(penalty);
            for extra in extras {
                card.record(
                    Issue::new(
                        IssueKind::MultipleH1,
                        Severity::Critical,
                        share,
                        format!("Extra H1 heading: '{}'", snippet(&extra.text, 50)),
                        "Turn this heading into an H2 or remove it",
                    )
                    .at(extra.block_id())
                    .with_payload(IssuePayload::bounds(1, h1s.len())),
                );
            }
        }

        // Step 2: enough H2 sections
        let h2_count = ctx.parser.headings(BlockTag::H2).len();
        if h2_count < headings.h2_min {
            card.penalize(
                Issue::new(
                    IssueKind::FewH2,
                    Severity::Warning,
                    ctx.config.penalty(IssueKind::FewH2),
                    format!(
                        "Only {} H2 headings, at least {} expected",
                        h2_count, headings.h2_min
                    ),
                    format!(
                        "Add {} more H2 headings to structure the article",
                        headings.h2_min - h2_count
                    ),
                )
                .with_payload(IssuePayload::bounds(headings.h2_min, h2_count)),
            );
        }

        // Step 3: not too many H3 subsections
        let h3s = ctx.parser.headings(BlockTag::H3);
        if h3s.len() > headings.h3_max {
            let penalty = ctx.config.penalty(IssueKind::TooManyH3);
            let excess = &h3s[headings.h3_max..];
            let share = penalty / excess.len() as u32;
            card.deduct(penalty);
            for (offset, h3) in excess.iter().enumerate() {
                card.record(
                    Issue::new(
                        IssueKind::TooManyH3,
                        Severity::Info,
                        share,
                        format!(
                            "H3 heading #{}: '{}'",
                            headings.h3_max + offset + 1,
                            snippet(&h3.text, 50)
                        ),
                        "Group this content under an H2 or drop the subheading",
                    )
                    .at(h3.block_id())
                    .with_payload(IssuePayload::bounds(headings.h3_max, h3s.len())),
                );
            }
        }

        card.finish()
    }
}
