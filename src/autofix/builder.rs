use crate::models::{
    AnalysisReport, BlockTag, FixAction, FixScope, FixTarget, FixTask, Issue, IssueKind,
    MetaField, SeoArticle, TaskPayload, TaskStatus,
};
use crate::parser::{keyword_hotspot, BlockParser, ContentParser};
use std::collections::HashSet;

/// Where an issue kind is fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// Rewrite an existing block located by `BlockLookup` when the issue has no id
    Block(BlockLookup),
    Meta(MetaField),
    /// Insert a new block of this tag
    Structural(BlockTag),
    /// Not fixable by a text rewrite
    Unsupported(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockLookup {
    FirstParagraph,
    FirstH1,
    FirstH2,
    LongestParagraph,
    KeywordHotspot,
    IssueOnly,
}

fn route(kind: IssueKind) -> Route {
    match kind {
        IssueKind::KeywordNotInFirstParagraph => Route::Block(BlockLookup::FirstParagraph),
        IssueKind::KeywordNotInH1 => Route::Block(BlockLookup::FirstH1),
        IssueKind::KeywordNotInH2 => Route::Block(BlockLookup::FirstH2),
        IssueKind::KeywordStuffing => Route::Block(BlockLookup::KeywordHotspot),
        IssueKind::ParagraphTooLong => Route::Block(BlockLookup::LongestParagraph),
        IssueKind::ManyLongSentencesInParagraph => Route::Block(BlockLookup::IssueOnly),

        IssueKind::KeywordNotInTitle | IssueKind::TitleTooShort | IssueKind::TitleTooLong => {
            Route::Meta(MetaField::Title)
        }
        IssueKind::KeywordNotInMeta | IssueKind::MetaTooShort => {
            Route::Meta(MetaField::MetaDescription)
        }

        IssueKind::MissingH1 => Route::Structural(BlockTag::H1),
        IssueKind::FewH2 => Route::Structural(BlockTag::H2),
        IssueKind::NoInternalLinks | IssueKind::ContentTooShort => {
            Route::Structural(BlockTag::P)
        }

        IssueKind::MultipleH1 | IssueKind::TooManyH3 => {
            Route::Unsupported("heading levels cannot be changed by a text rewrite")
        }
        IssueKind::MissingAltText => Route::Unsupported("images are not blocks"),
    }
}

/// Maps analysis issues to an ordered list of fix tasks
///
/// Task ids keep counting across calls, so one builder per auto-fix run
/// yields ids that are unique for the whole run.
#[derive(Debug, Default)]
pub struct FixTaskBuilder {
    task_counter: usize,
}

impl FixTaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tasks for every actionable issue in the report
    pub fn build_tasks(&mut self, report: &AnalysisReport, article: &SeoArticle) -> Vec<FixTask> {
        let parser = BlockParser::new(article);
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for issue in report.issues.iter() {
            let Some(mut task) = self.build_single_task(issue, article, &parser) else {
                continue;
            };

            // Ids are not assigned yet, so structural keys collapse per kind
            let key = (
                task.kind,
                task.lane_key(),
                task.payload.keyword.as_ref().map(|k| k.to_lowercase()),
            );
            if !seen.insert(key) {
                tracing::debug!(kind = %task.kind, "Dropping duplicate fix task");
                continue;
            }

            self.task_counter += 1;
            task.task_id = format!("fix-{:03}", self.task_counter);
            tasks.push(task);
        }

        tasks.sort_by_key(|task| task.severity.rank());

        tracing::info!(
            tasks = tasks.len(),
            issues = report.issues.len(),
            "Built fix tasks"
        );
        tasks
    }

    fn build_single_task(
        &self,
        issue: &Issue,
        article: &SeoArticle,
        parser: &BlockParser,
    ) -> Option<FixTask> {
        let keyword = issue.payload.keyword.clone();

        let (target, current_text) = match route(issue.kind) {
            Route::Block(lookup) => {
                let block_id = match issue.target_block() {
                    Some(id) => Some(id.to_string()),
                    None => find_block(lookup, parser, keyword.as_deref()),
                };
                let Some(block) = block_id.as_deref().and_then(|id| article.block(id)) else {
                    tracing::warn!(kind = %issue.kind, block_id = %issue.block_id, "No block to fix for issue");
                    return None;
                };
                (FixTarget::block(&block.id), Some(block.text.clone()))
            }
            Route::Meta(field) => (FixTarget::meta(field), Some(field.value(article).to_string())),
            Route::Structural(_) if article.blocks.is_empty() => {
                tracing::warn!(kind = %issue.kind, "Structural fixes need a block-based article");
                return None;
            }
            Route::Structural(_) => (FixTarget::structural(), None),
            Route::Unsupported(reason) => {
                tracing::warn!(kind = %issue.kind, reason, "Issue is not actionable");
                return None;
            }
        };

        let payload = build_payload(issue, &target);
        let recommendation = match issue.kind {
            // A block patch cannot split a block
            IssueKind::ParagraphTooLong => format!(
                "Condense this paragraph to at most {} words while keeping its key facts",
                issue.payload.expected.unwrap_or_default()
            ),
            _ => issue.recommendation.clone(),
        };

        Some(FixTask {
            task_id: String::new(),
            kind: issue.kind,
            target,
            payload,
            current_text,
            recommendation,
            severity: issue.severity,
            status: TaskStatus::Pending,
            skip_reason: None,
        })
    }
}

fn find_block(lookup: BlockLookup, parser: &BlockParser, keyword: Option<&str>) -> Option<String> {
    let id = match lookup {
        BlockLookup::FirstParagraph => parser
            .first_paragraph()
            .or_else(|| parser.paragraphs().first())
            .and_then(|s| s.block_id()),
        BlockLookup::FirstH1 => parser.headings(BlockTag::H1).first().and_then(|s| s.block_id()),
        BlockLookup::FirstH2 => parser.headings(BlockTag::H2).first().and_then(|s| s.block_id()),
        BlockLookup::LongestParagraph => parser
            .paragraphs()
            .iter()
            .rev()
            .max_by_key(|p| p.word_count)
            .and_then(|s| s.block_id()),
        BlockLookup::KeywordHotspot => {
            keyword.and_then(|k| keyword_hotspot(parser.paragraphs(), k).and_then(|s| s.block_id()))
        }
        BlockLookup::IssueOnly => None,
    };
    id.map(str::to_string)
}

fn build_payload(issue: &Issue, target: &FixTarget) -> TaskPayload {
    let mut payload = TaskPayload {
        keyword: issue.payload.keyword.clone(),
        ..TaskPayload::default()
    };

    payload.action = Some(match issue.kind {
        IssueKind::KeywordStuffing => FixAction::ReduceKeyword,
        kind if kind.is_keyword_issue() => FixAction::InsertKeyword,
        IssueKind::TitleTooShort | IssueKind::TitleTooLong | IssueKind::MetaTooShort
        | IssueKind::ParagraphTooLong => FixAction::AdjustLength,
        _ if target.scope == FixScope::Structural => FixAction::AddElement,
        _ => FixAction::Rewrite,
    });

    if matches!(payload.action, Some(FixAction::AdjustLength)) {
        payload.target_length = issue.payload.expected;
        payload.current_length = issue.payload.actual;
    }

    if let Route::Structural(tag) = route(issue.kind) {
        payload.element_type = Some(tag);
        payload.target_length = issue.payload.expected;
        payload.current_length = issue.payload.actual;
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::SeoChecker;
    use crate::config::ScoringConfig;
    use crate::models::{ArticleBlock, IssuePayload, IssuesBySeverity, Severity};
    use std::sync::Arc;

    fn words(prefix: &str, n: usize) -> String {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect::<Vec<_>>().join(" ")
    }

    fn report_with(issues: Vec<Issue>, article: &SeoArticle) -> AnalysisReport {
        let checker = SeoChecker::new(Arc::new(ScoringConfig::builtin().unwrap()));
        let mut report = checker.analyze(article).unwrap();
        report.issues = issues.into_iter().collect::<IssuesBySeverity>();
        report
    }

    fn article() -> SeoArticle {
        SeoArticle::new("Plain title", "Plain meta").with_blocks(vec![
            ArticleBlock::new("h1-1", BlockTag::H1, "Heading"),
            ArticleBlock::new("p-1", BlockTag::P, words("a", 12)),
            ArticleBlock::new("h2-1", BlockTag::H2, "Section"),
            ArticleBlock::new("p-2", BlockTag::P, format!("seo seo seo {}", words("b", 30))),
            ArticleBlock::new("p-3", BlockTag::P, words("c", 40)),
        ])
    }

    fn issue(kind: IssueKind, severity: Severity) -> Issue {
        Issue::new(kind, severity, 1, "detail", "recommendation")
    }

    #[test]
    fn test_tasks_sorted_by_severity_with_sequential_ids() {
        let article = article();
        let report = report_with(
            vec![
                issue(IssueKind::KeywordNotInH2, Severity::Info)
                    .with_payload(IssuePayload::keyword("seo")),
                issue(IssueKind::MissingH1, Severity::Critical),
                issue(IssueKind::KeywordNotInTitle, Severity::Warning)
                    .with_payload(IssuePayload::keyword("seo")),
            ],
            &article,
        );
        let tasks = FixTaskBuilder::new().build_tasks(&report, &article);

        let summary: Vec<(&str, IssueKind)> =
            tasks.iter().map(|t| (t.task_id.as_str(), t.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("fix-001", IssueKind::MissingH1),
                ("fix-002", IssueKind::KeywordNotInTitle),
                ("fix-003", IssueKind::KeywordNotInH2),
            ]
        );
        assert_eq!(tasks[0].target.scope, FixScope::Structural);
        assert_eq!(tasks[0].payload.element_type, Some(BlockTag::H1));
        assert_eq!(tasks[1].target.field_name, Some(MetaField::Title));
        assert_eq!(tasks[1].current_text.as_deref(), Some("Plain title"));
        assert_eq!(tasks[2].target.block_id.as_deref(), Some("h2-1"));
        assert_eq!(tasks[2].payload.action, Some(FixAction::InsertKeyword));
    }

    #[test]
    fn test_issue_block_id_wins_over_lookup() {
        let article = article();
        let report = report_with(
            vec![issue(IssueKind::ParagraphTooLong, Severity::Warning)
                .at(Some("p-2"))
                .with_payload(IssuePayload::bounds(150, 160))],
            &article,
        );
        let tasks = FixTaskBuilder::new().build_tasks(&report, &article);
        assert_eq!(tasks[0].target.block_id.as_deref(), Some("p-2"));
        assert_eq!(tasks[0].payload.target_length, Some(150));
        assert!(tasks[0].recommendation.contains("at most 150 words"));
    }

    #[test]
    fn test_lookup_fallbacks() {
        let article = article();
        let report = report_with(
            vec![
                issue(IssueKind::ParagraphTooLong, Severity::Warning),
                issue(IssueKind::KeywordStuffing, Severity::Critical)
                    .with_payload(IssuePayload::keyword("SEO")),
                issue(IssueKind::KeywordNotInFirstParagraph, Severity::Info)
                    .with_payload(IssuePayload::keyword("seo")),
            ],
            &article,
        );
        let tasks = FixTaskBuilder::new().build_tasks(&report, &article);
        let targets: Vec<(IssueKind, &str)> = tasks
            .iter()
            .map(|t| (t.kind, t.target.block_id.as_deref().unwrap_or("")))
            .collect();
        assert_eq!(
            targets,
            vec![
                (IssueKind::KeywordStuffing, "p-2"),
                (IssueKind::ParagraphTooLong, "p-3"),
                (IssueKind::KeywordNotInFirstParagraph, "p-1"),
            ]
        );
        assert_eq!(tasks[0].payload.action, Some(FixAction::ReduceKeyword));
    }

    #[test]
    fn test_unactionable_and_duplicate_issues_are_dropped() {
        let article = article();
        let report = report_with(
            vec![
                issue(IssueKind::MissingAltText, Severity::Info),
                issue(IssueKind::MultipleH1, Severity::Warning).at(Some("h1-1")),
                issue(IssueKind::KeywordNotInH1, Severity::Warning)
                    .at(Some("h1-1"))
                    .with_payload(IssuePayload::keyword("seo")),
                issue(IssueKind::KeywordNotInH1, Severity::Warning)
                    .at(Some("h1-1"))
                    .with_payload(IssuePayload::keyword("seo")),
                issue(IssueKind::KeywordNotInH2, Severity::Info)
                    .at(Some("h2-404"))
                    .with_payload(IssuePayload::keyword("seo")),
            ],
            &article,
        );
        let tasks = FixTaskBuilder::new().build_tasks(&report, &article);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_id, "fix-001");
        assert_eq!(tasks[0].kind, IssueKind::KeywordNotInH1);
    }

    #[test]
    fn test_ids_continue_across_rounds() {
        let article = article();
        let report = report_with(
            vec![issue(IssueKind::MetaTooShort, Severity::Warning)
                .with_payload(IssuePayload::bounds(120, 10))],
            &article,
        );
        let mut builder = FixTaskBuilder::new();
        assert_eq!(builder.build_tasks(&report, &article)[0].task_id, "fix-001");
        let second = builder.build_tasks(&report, &article);
        assert_eq!(second[0].task_id, "fix-002");
        assert_eq!(second[0].payload.action, Some(FixAction::AdjustLength));
        assert_eq!(second[0].payload.target_length, Some(120));
    }

    #[test]
    fn test_structural_needs_blocks() {
        let article = SeoArticle::new("t", "m").with_html("<p>body text</p>");
        let report = report_with(vec![issue(IssueKind::FewH2, Severity::Warning)], &article);
        assert!(FixTaskBuilder::new().build_tasks(&report, &article).is_empty());
    }
}
