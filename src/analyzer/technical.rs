use super::{AnalysisContext, Analyzer, CategoryResult, Scorecard};
use crate::models::{Category, Issue, IssueKind, IssuePayload, Severity};

/// Title/meta length, image alt text and internal links (whole-article scope)
pub struct TechnicalAnalyzer;

impl Analyzer for TechnicalAnalyzer {
    fn category(&self) -> Category {
        Category::TechnicalSeo
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> CategoryResult {
        let mut card = Scorecard::new(self.category(), ctx);
        let title = &ctx.thresholds.title;
        let meta = &ctx.thresholds.meta_description;

        let title_len = ctx.article.title.chars().count();
        if title_len < title.min_chars {
            card.penalize(
                Issue::new(
                    IssueKind::TitleTooShort,
                    Severity::Critical,
                    IssueKind::TitleTooShort.default_penalty(),
                    format!("Title is only {} characters", title_len),
                    format!(
                        "Lengthen the title to {}-{} characters",
                        title.optimal_min, title.optimal_max
                    ),
                )
                .with_payload(IssuePayload::bounds(title.optimal_min, title_len)),
            );
        } else if title_len > title.max_chars {
            card.penalize(
                Issue::new(
                    IssueKind::TitleTooLong,
                    Severity::Critical,
                    IssueKind::TitleTooLong.default_penalty(),
                    format!("Title has {} characters and will be truncated", title_len),
                    format!("Shorten the title to at most {} characters", title.max_chars),
                )
                .with_payload(IssuePayload::bounds(title.max_chars, title_len)),
            );
        }

        let meta_len = ctx.article.meta_description.chars().count();
        if meta_len < meta.min_chars {
            card.penalize(
                Issue::new(
                    IssueKind::MetaTooShort,
                    Severity::Warning,
                    IssueKind::MetaTooShort.default_penalty(),
                    format!("Meta description is only {} characters", meta_len),
                    format!(
                        "Expand the meta description to {}-{} characters",
                        meta.min_chars, meta.max_chars
                    ),
                )
                .with_payload(IssuePayload::bounds(meta.min_chars, meta_len)),
            );
        }

        let images = ctx.parser.images();
        let missing_alt = images.iter().filter(|img| !img.has_alt()).count();
        if missing_alt > 0 {
            card.penalize(
                Issue::new(
                    IssueKind::MissingAltText,
                    Severity::Info,
                    missing_alt as u32 * IssueKind::MissingAltText.default_penalty(),
                    format!("{}/{} images have no alt text", missing_alt, images.len()),
                    "Add descriptive alt text to every image",
                )
                .with_payload(IssuePayload::bounds(0, missing_alt)),
            );
        }

        if ctx.parser.links().internal.is_empty() {
            card.penalize(
                Issue::new(
                    IssueKind::NoInternalLinks,
                    Severity::Warning,
                    IssueKind::NoInternalLinks.default_penalty(),
                    "Article has no internal links",
                    "Add 3-5 relevant internal links",
                )
                .with_payload(IssuePayload::bounds(3, 0)),
            );
        }

        card.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::test_support::block;
    use crate::config::ScoringConfig;
    use crate::models::{ArticleImage, BlockTag, SeoArticle};
    use crate::parser::BlockParser;

    fn run(article: &SeoArticle) -> CategoryResult {
        let config = ScoringConfig::builtin().unwrap();
        let parser = BlockParser::new(article);
        let ctx = AnalysisContext {
            article,
            parser: &parser,
            config: &config,
            thresholds: config.thresholds(None),
        };
        TechnicalAnalyzer.analyze(&ctx)
    }

    fn kinds(result: &CategoryResult) -> Vec<IssueKind> {
        result.issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_short_title_and_meta_without_links() {
        let article = SeoArticle::new("Short", "Brief")
            .with_blocks(vec![block("p-1", BlockTag::P, "text")]);
        let result = run(&article);
        assert_eq!(
            kinds(&result),
            vec![
                IssueKind::TitleTooShort,
                IssueKind::MetaTooShort,
                IssueKind::NoInternalLinks
            ]
        );
        assert!(result.issues.iter().all(|i| i.block_id.is_empty()));
        assert_eq!(result.issues[0].payload.expected, Some(50));
        assert_eq!(result.score, 15.0 - 5.0 - 3.0 - 3.0);
    }

    #[test]
    fn test_long_title_and_missing_alt() {
        let mut article = SeoArticle::new("T".repeat(61), "M".repeat(130)).with_blocks(vec![
            block("p-1", BlockTag::P, r#"Read <a href="/more">more</a> <img src="a.png">"#),
        ]);
        article.images.push(ArticleImage {
            src: "b.png".to_string(),
            alt: Some(" ".to_string()),
        });
        let result = run(&article);
        assert_eq!(
            kinds(&result),
            vec![IssueKind::TitleTooLong, IssueKind::MissingAltText]
        );
        assert_eq!(result.issues[1].penalty, 2);
    }
}
