use super::{
    AnalysisContext, Analyzer, CategoryResult, ContentQualityAnalyzer, KeywordAnalyzer,
    ReadabilityAnalyzer, StructureAnalyzer, TechnicalAnalyzer,
};
use crate::config::{BonusKind, ScoringConfig, Thresholds};
use crate::models::{
    score::round1, AnalysisReport, AnalysisStats, BlockTag, Bonus, Category, CheckResponse,
    ConfigUsed, Grade, InputError, IssuesBySeverity, LinkStats, ScoreBreakdown, SeoArticle,
};
use crate::parser::{parser_for, ContentParser};
use std::sync::Arc;

/// Runs the analyzer set and aggregates the result
pub struct SeoChecker {
    config: Arc<ScoringConfig>,
    industry: Option<String>,
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl SeoChecker {
    pub fn new(config: Arc<ScoringConfig>) -> Self {
        Self {
            config,
            industry: None,
            analyzers: vec![
                Box::new(StructureAnalyzer),
                Box::new(KeywordAnalyzer),
                Box::new(ReadabilityAnalyzer),
                Box::new(TechnicalAnalyzer),
                Box::new(ContentQualityAnalyzer),
            ],
        }
    }

    /// Apply an industry's threshold overrides
    pub fn with_industry(mut self, industry: Option<String>) -> Self {
        self.industry = industry;
        self
    }

    pub fn config(&self) -> &Arc<ScoringConfig> {
        &self.config
    }

    pub fn thresholds(&self) -> &Thresholds {
        self.config.thresholds(self.industry.as_deref())
    }

    /// Score one article
    pub fn analyze(&self, article: &SeoArticle) -> Result<AnalysisReport, InputError> {
        let parser = parser_for(article)?;
        let thresholds = self.thresholds();
        let ctx = AnalysisContext {
            article,
            parser: parser.as_ref(),
            config: &self.config,
            thresholds,
        };

        let results: Vec<CategoryResult> = self
            .analyzers
            .iter()
            .map(|analyzer| analyzer.analyze(&ctx))
            .collect();

        let bonuses = self.bonuses(&ctx);
        let bonus_total: f64 = bonuses.iter().map(|b| b.points).sum();

        let sub_score = |category: Category| {
            results
                .iter()
                .filter(|r| r.category == category)
                .map(CategoryResult::clamped)
                .sum::<f64>()
        };
        let structure = sub_score(Category::Structure);
        let keyword_optimization = sub_score(Category::KeywordOptimization);
        let readability = sub_score(Category::Readability);
        let technical_seo = sub_score(Category::TechnicalSeo);
        let content_quality = sub_score(Category::ContentQuality);

        let total = (structure
            + keyword_optimization
            + readability
            + technical_seo
            + content_quality
            + bonus_total)
            .clamp(0.0, 100.0);

        let score_breakdown = ScoreBreakdown {
            structure: round1(structure),
            keyword_optimization: round1(keyword_optimization),
            readability: round1(readability),
            technical_seo: round1(technical_seo),
            content_quality: round1(content_quality),
            bonus: round1(bonus_total),
            total: round1(total),
            grade: Grade::from_score(total),
        };

        let issues: IssuesBySeverity = results.into_iter().flat_map(|r| r.issues).collect();

        tracing::debug!(
            total = score_breakdown.total,
            grade = %score_breakdown.grade,
            issues = issues.len(),
            mode = %parser.mode(),
            "Scored article"
        );

        Ok(AnalysisReport {
            score_breakdown,
            issues,
            bonuses,
            stats: self.stats(article, parser.as_ref()),
            config_used: ConfigUsed {
                industry: self.industry.clone(),
                thresholds: thresholds.clone(),
            },
        })
    }

    /// Score one article, folding input errors into the response
    pub fn check(&self, article: &SeoArticle) -> CheckResponse {
        match self.analyze(article) {
            Ok(report) => CheckResponse::ok(report),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected article");
                CheckResponse::failed(e.to_string())
            }
        }
    }

    fn bonuses(&self, ctx: &AnalysisContext<'_>) -> Vec<Bonus> {
        let mut bonuses = Vec::new();
        let mut award = |kind: BonusKind, name: String| {
            let points = self.config.bonus(kind);
            if points > 0.0 {
                bonuses.push(Bonus { name, points });
            }
        };

        let h1_count = ctx.parser.headings(BlockTag::H1).len();
        let h2_count = ctx.parser.headings(BlockTag::H2).len();
        if h1_count == 1 && h2_count >= ctx.thresholds.headings.h2_min {
            award(
                BonusKind::GoodHeadingStructure,
                BonusKind::GoodHeadingStructure.key().to_string(),
            );
        }

        if let Some(first) = ctx.parser.first_paragraph() {
            let text = first.text.to_lowercase();
            for keyword in ctx.article.keywords.iter().filter(|k| !k.trim().is_empty()) {
                if text.contains(&keyword.to_lowercase()) {
                    award(
                        BonusKind::KeywordInFirstParagraph,
                        format!("{}:{}", BonusKind::KeywordInFirstParagraph.key(), keyword),
                    );
                }
            }
        }

        let images = ctx.parser.images();
        if !images.is_empty() && images.iter().all(|img| img.has_alt()) {
            award(
                BonusKind::AllImagesHaveAlt,
                BonusKind::AllImagesHaveAlt.key().to_string(),
            );
        }

        let bounds = &ctx.thresholds.word_count;
        let word_count = ctx.parser.total_word_count();
        if (bounds.optimal_min..=bounds.optimal_max).contains(&word_count) {
            award(
                BonusKind::OptimalWordCount,
                BonusKind::OptimalWordCount.key().to_string(),
            );
        }

        bonuses
    }

    fn stats(&self, article: &SeoArticle, parser: &dyn ContentParser) -> AnalysisStats {
        let links = parser.links();
        AnalysisStats {
            word_count: parser.total_word_count(),
            title_length: article.title.chars().count(),
            meta_length: article.meta_description.chars().count(),
            parser_mode: parser.mode().as_str().to_string(),
            block_count: parser.segments().len(),
            headings: parser.heading_texts(),
            images_count: parser.images().len(),
            links: LinkStats {
                internal: links.internal.len(),
                external: links.external.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::test_support::{block, words};
    use crate::models::{ArticleImage, IssueKind};

    fn checker() -> SeoChecker {
        SeoChecker::new(Arc::new(ScoringConfig::builtin().unwrap()))
    }

    fn well_formed() -> SeoArticle {
        let mut blocks = vec![
            block("h1-1", BlockTag::H1, "Rust ownership explained"),
            block(
                "p-1",
                BlockTag::P,
                format!("Rust ownership is simple once it clicks. {}", words("a", 20)),
            ),
        ];
        for i in 1..=3 {
            blocks.push(block(&format!("h2-{}", i), BlockTag::H2, format!("Rust ownership part {}", i)));
            for j in 0..4 {
                blocks.push(block(
                    &format!("p-{}-{}", i, j),
                    BlockTag::P,
                    format!("See <a href=\"/docs\">docs</a>. {}", words("w", 120)),
                ));
            }
        }
        SeoArticle::new(
            "Rust ownership explained for working engineers today",
            "A practical guide to rust ownership: moves, borrows and lifetimes, with examples you can apply to your own code this week.",
        )
        .with_blocks(blocks)
        .with_keywords(["rust ownership"])
    }

    #[test]
    fn test_well_formed_article_scores_high() {
        let mut article = well_formed();
        article.images.push(ArticleImage {
            src: "a.png".into(),
            alt: Some("diagram".into()),
        });
        let report = checker().analyze(&article).unwrap();

        assert!(report.issues.is_empty(), "unexpected issues: {:?}", report.issues);
        let names: Vec<&str> = report.bonuses.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "good_heading_structure",
                "keyword_in_first_paragraph:rust ownership",
                "all_images_have_alt",
                "optimal_word_count",
            ]
        );
        assert_eq!(report.score_breakdown.total, 100.0);
        assert_eq!(report.grade(), Grade::APlus);
        assert_eq!(report.stats.parser_mode, "block");
        assert_eq!(report.stats.links.internal, 12);
    }

    #[test]
    fn test_missing_h1_reduces_structure() {
        let mut article = well_formed();
        article.blocks.retain(|b| b.tag != BlockTag::H1);
        let report = checker().analyze(&article).unwrap();

        let structure: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.kind.category() == Category::Structure)
            .collect();
        assert_eq!(structure.len(), 1);
        assert_eq!(structure[0].kind, IssueKind::MissingH1);
        assert_eq!(structure[0].block_id, "");
        assert_eq!(report.score_breakdown.structure, 10.0);
    }

    #[test]
    fn test_check_wraps_input_errors() {
        let response = checker().check(&SeoArticle::new("t", "m"));
        assert!(!response.success);
        assert!(response.report.is_none());
        assert!(response.message.contains("blocks or html_content"));
    }

    #[test]
    fn test_markup_mode_issues_are_unaddressed() {
        let article = SeoArticle::new("Short", "Short")
            .with_html("<h2>Only</h2><p>tiny body text</p>")
            .with_keywords(["absent"]);
        let report = checker().analyze(&article).unwrap();
        assert_eq!(report.stats.parser_mode, "markup");
        assert!(report.issues.iter().all(|i| i.block_id.is_empty()));
    }

    #[test]
    fn test_industry_thresholds_are_reported() {
        let report = checker()
            .with_industry(Some("news".to_string()))
            .analyze(&well_formed())
            .unwrap();
        assert_eq!(report.config_used.industry.as_deref(), Some("news"));
        assert_eq!(report.config_used.thresholds.headings.h2_min, 2);
    }
}
