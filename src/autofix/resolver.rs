use crate::models::{
    BlockPatch, BlockTag, FixScope, FixTask, IssueKind, MetaField, MetaPatch, Patch,
    PatchOperation, PositionHint, SeoArticle, StructuralPatch, TaskStatus,
};
use crate::orchestrator::{prompts, Rewriter};
use crate::parser::inline;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a task produced no patch
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Task has no {0} target")]
    MissingTarget(&'static str),

    #[error("Block '{0}' not found in article")]
    BlockNotFound(String),

    #[error("Rewriter timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rewriter failed: {0}")]
    Rewriter(String),

    #[error("Rewriter returned an empty reply")]
    EmptyReply,

    #[error("Malformed reply: {0}")]
    MalformedJson(String),

    #[error("Reply violates the contract: {0}")]
    ContractViolation(String),
}

#[derive(Debug, Deserialize)]
struct BlockReply {
    block_id: String,
    new_text: String,
}

#[derive(Debug, Deserialize)]
struct MetaReply {
    field: String,
    new_value: String,
}

#[derive(Debug, Deserialize)]
struct StructuralReply {
    element_type: String,
    new_text: String,
}

/// Turns one fix task into a patch operation via the rewriter
pub struct FixResolver {
    rewriter: Arc<dyn Rewriter>,
    timeout: Duration,
}

impl FixResolver {
    pub fn new(rewriter: Arc<dyn Rewriter>, timeout: Duration) -> Self {
        Self { rewriter, timeout }
    }

    /// Resolve a task against an article snapshot
    ///
    /// Failures never propagate: the task is marked skipped with a reason and
    /// `None` is returned.
    pub async fn process_task(
        &self,
        task: &mut FixTask,
        article: &SeoArticle,
    ) -> Option<PatchOperation> {
        task.status = TaskStatus::Processing;

        let result = match task.target.scope {
            FixScope::Block => self.resolve_block(task, article).await,
            FixScope::Meta => self.resolve_meta(task, article).await,
            FixScope::Structural => self.resolve_structural(task, article).await,
        };

        match result {
            Ok(operation) => {
                tracing::debug!(task_id = %task.task_id, operation_id = %operation.operation_id, "Resolved task");
                Some(operation)
            }
            Err(e) => {
                tracing::warn!(task_id = %task.task_id, kind = %task.kind, error = %e, "Task skipped");
                task.skip(e.to_string());
                None
            }
        }
    }

    async fn resolve_block(
        &self,
        task: &FixTask,
        article: &SeoArticle,
    ) -> Result<PatchOperation, ResolveError> {
        let block_id = task
            .target
            .block_id
            .as_deref()
            .ok_or(ResolveError::MissingTarget("block"))?;
        let block = article
            .block(block_id)
            .ok_or_else(|| ResolveError::BlockNotFound(block_id.to_string()))?;

        let keyword = task.payload.keyword.as_deref();
        let prompt = match (task.kind, keyword) {
            (IssueKind::KeywordStuffing, Some(keyword)) => prompts::keyword_reduction_prompt(
                block_id,
                &block.text,
                keyword,
                &task.recommendation,
            ),
            _ => prompts::block_fix_prompt(
                block_id,
                block.tag,
                keyword,
                &block.text,
                &task.recommendation,
            ),
        };

        let reply: BlockReply = parse_reply(&self.call(&prompt).await?)?;
        if reply.block_id.trim() != block_id {
            return Err(ResolveError::ContractViolation(format!(
                "expected block '{}', got '{}'",
                block_id, reply.block_id
            )));
        }
        let new_text = checked_text(&reply.new_text, block.tag)?;

        Ok(PatchOperation::new(
            &task.task_id,
            Patch::BlockPatch(BlockPatch {
                block_id: block_id.to_string(),
                old_text: block.text.clone(),
                new_text,
                tag: block.tag,
            }),
            format!("Fix block {}: {}", block_id, task.kind),
        ))
    }

    async fn resolve_meta(
        &self,
        task: &FixTask,
        article: &SeoArticle,
    ) -> Result<PatchOperation, ResolveError> {
        let field = task
            .target
            .field_name
            .ok_or(ResolveError::MissingTarget("meta field"))?;
        let current_value = field.value(article);

        let prompt = prompts::meta_fix_prompt(
            field,
            current_value,
            &task.recommendation,
            &article.keywords,
        );

        let reply: MetaReply = parse_reply(&self.call(&prompt).await?)?;
        if MetaField::parse(&reply.field) != Some(field) {
            return Err(ResolveError::ContractViolation(format!(
                "expected field '{}', got '{}'",
                field, reply.field
            )));
        }
        let new_value = reply.new_value.trim();
        if new_value.is_empty() {
            return Err(ResolveError::EmptyReply);
        }
        if new_value.contains('\n') || inline::has_block_markup(new_value) {
            return Err(ResolveError::ContractViolation(format!(
                "{} must be a single line of plain text",
                field
            )));
        }

        Ok(PatchOperation::new(
            &task.task_id,
            Patch::MetaPatch(MetaPatch {
                field,
                old_value: current_value.to_string(),
                new_value: new_value.to_string(),
            }),
            format!("Fix {}: {}", field, task.kind),
        ))
    }

    async fn resolve_structural(
        &self,
        task: &FixTask,
        article: &SeoArticle,
    ) -> Result<PatchOperation, ResolveError> {
        let element = task
            .payload
            .element_type
            .ok_or(ResolveError::MissingTarget("element type"))?;

        let prompt = prompts::structural_fix_prompt(
            task.kind,
            element,
            &task.recommendation,
            &article.title,
            &article.keywords,
        );

        let reply: StructuralReply = parse_reply(&self.call(&prompt).await?)?;
        if BlockTag::parse(&reply.element_type) != Some(element) {
            return Err(ResolveError::ContractViolation(format!(
                "expected element '{}', got '{}'",
                prompts::element_name(element),
                reply.element_type
            )));
        }
        let new_text = checked_text(&reply.new_text, element)?;

        Ok(PatchOperation::new(
            &task.task_id,
            Patch::StructuralPatch(StructuralPatch {
                element_type: element,
                new_text,
                position_hint: PositionHint::for_kind(task.kind),
                added_block_id: None,
                insert_index: None,
            }),
            format!("Add {}", task.kind.key().replace('_', " ")),
        ))
    }

    async fn call(&self, prompt: &str) -> Result<String, ResolveError> {
        let reply = tokio::time::timeout(self.timeout, self.rewriter.rewrite(prompt))
            .await
            .map_err(|_| ResolveError::Timeout(self.timeout))?
            .map_err(|e| ResolveError::Rewriter(format!("{:#}", e)))?;

        if reply.trim().is_empty() {
            return Err(ResolveError::EmptyReply);
        }
        Ok(reply)
    }
}

/// Validate replacement text for a block of `tag`
fn checked_text(text: &str, tag: BlockTag) -> Result<String, ResolveError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ResolveError::EmptyReply);
    }
    if tag.is_heading() && text.contains('\n') {
        return Err(ResolveError::ContractViolation(
            "heading text must be a single line".to_string(),
        ));
    }
    if inline::has_block_markup(text) {
        return Err(ResolveError::ContractViolation(
            "text must not contain block-level markup".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// Strip a surrounding code fence (```json ... ```)
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_reply<T: DeserializeOwned>(raw: &str) -> Result<T, ResolveError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| ResolveError::MalformedJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleBlock, FixTarget, TaskPayload};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a fixed string and records prompts
    struct Canned {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Rewriter for Canned {
        async fn rewrite(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct Slow;

    #[async_trait]
    impl Rewriter for Slow {
        async fn rewrite(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(String::new())
        }
    }

    fn article() -> SeoArticle {
        SeoArticle::new("Old title", "Old meta")
            .with_blocks(vec![
                ArticleBlock::new("h1-1", BlockTag::H1, "Heading"),
                ArticleBlock::new("p-1", BlockTag::P, "seo seo seo text"),
            ])
            .with_keywords(["seo"])
    }

    fn task(kind: IssueKind, target: FixTarget, payload: TaskPayload) -> FixTask {
        FixTask {
            task_id: "fix-001".to_string(),
            kind,
            target,
            payload,
            current_text: None,
            recommendation: "do it".to_string(),
            severity: crate::models::Severity::Warning,
            status: TaskStatus::Pending,
            skip_reason: None,
        }
    }

    fn keyword(k: &str) -> TaskPayload {
        TaskPayload {
            keyword: Some(k.to_string()),
            ..TaskPayload::default()
        }
    }

    fn resolver(rewriter: Arc<dyn Rewriter>) -> FixResolver {
        FixResolver::new(rewriter, Duration::from_secs(1))
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
    }

    #[tokio::test]
    async fn test_block_patch_from_fenced_reply() {
        let canned = Canned::new("```json\n{\"block_id\": \"h1-1\", \"new_text\": \"SEO heading\"}\n```");
        let mut t = task(IssueKind::KeywordNotInH1, FixTarget::block("h1-1"), keyword("seo"));

        let op = resolver(canned.clone()).process_task(&mut t, &article()).await.unwrap();
        assert_eq!(op.operation_id, "op-fix-001");
        assert_eq!(op.description, "Fix block h1-1: keyword_not_in_h1");
        match op.patch {
            Patch::BlockPatch(patch) => {
                assert_eq!(patch.old_text, "Heading");
                assert_eq!(patch.new_text, "SEO heading");
                assert_eq!(patch.tag, BlockTag::H1);
            }
            other => panic!("unexpected patch {:?}", other),
        }
        assert_eq!(t.status, TaskStatus::Processing);
        assert!(canned.prompts.lock().unwrap()[0].contains("Block ID: h1-1"));
    }

    #[tokio::test]
    async fn test_stuffing_uses_reduction_prompt() {
        let canned = Canned::new(r#"{"block_id": "p-1", "new_text": "seo text"}"#);
        let mut t = task(IssueKind::KeywordStuffing, FixTarget::block("p-1"), keyword("seo"));
        assert!(resolver(canned.clone()).process_task(&mut t, &article()).await.is_some());
        assert!(canned.prompts.lock().unwrap()[0].contains("removing keyword stuffing"));
    }

    #[tokio::test]
    async fn test_contract_violations_skip_task() {
        let cases = [
            r#"{"block_id": "p-9", "new_text": "x"}"#,
            r#"{"block_id": "h1-1", "new_text": "two\nlines"}"#,
            r#"{"block_id": "h1-1", "new_text": "<h2>nested</h2>"}"#,
            r#"{"block_id": "h1-1"}"#,
            "Sure! Here is the JSON you asked for.",
            "   ",
        ];
        for reply in cases {
            let mut t = task(IssueKind::KeywordNotInH1, FixTarget::block("h1-1"), keyword("seo"));
            let op = resolver(Canned::new(reply)).process_task(&mut t, &article()).await;
            assert!(op.is_none(), "reply accepted: {}", reply);
            assert_eq!(t.status, TaskStatus::Skipped);
            assert!(t.skip_reason.is_some());
        }
    }

    #[tokio::test]
    async fn test_inline_link_is_allowed() {
        let canned = Canned::new(r#"{"block_id": "p-1", "new_text": "See <a href=\"/guide\">the guide</a>."}"#);
        let mut t = task(IssueKind::ManyLongSentencesInParagraph, FixTarget::block("p-1"), TaskPayload::default());
        assert!(resolver(canned).process_task(&mut t, &article()).await.is_some());
    }

    #[tokio::test]
    async fn test_meta_reply() {
        let canned = Canned::new(r#"{"field": "meta_description", "new_value": "A new meta"}"#);
        let mut t = task(
            IssueKind::MetaTooShort,
            FixTarget::meta(MetaField::MetaDescription),
            TaskPayload::default(),
        );
        let op = resolver(canned).process_task(&mut t, &article()).await.unwrap();
        assert_eq!(op.scope, FixScope::Meta);
        match op.patch {
            Patch::MetaPatch(patch) => {
                assert_eq!(patch.old_value, "Old meta");
                assert_eq!(patch.new_value, "A new meta");
            }
            other => panic!("unexpected patch {:?}", other),
        }

        let wrong = Canned::new(r#"{"field": "title", "new_value": "A new meta"}"#);
        let mut t = task(
            IssueKind::MetaTooShort,
            FixTarget::meta(MetaField::MetaDescription),
            TaskPayload::default(),
        );
        assert!(resolver(wrong).process_task(&mut t, &article()).await.is_none());
    }

    #[tokio::test]
    async fn test_structural_paragraph_alias() {
        let canned = Canned::new(r#"{"element_type": "paragraph", "new_text": "Read <a href=\"/more\">more</a>."}"#);
        let payload = TaskPayload {
            element_type: Some(BlockTag::P),
            ..TaskPayload::default()
        };
        let mut t = task(IssueKind::NoInternalLinks, FixTarget::structural(), payload);
        let op = resolver(canned).process_task(&mut t, &article()).await.unwrap();
        assert_eq!(op.description, "Add no internal links");
        match op.patch {
            Patch::StructuralPatch(patch) => {
                assert_eq!(patch.element_type, BlockTag::P);
                assert_eq!(patch.position_hint, PositionHint::NearRelatedContent);
            }
            other => panic!("unexpected patch {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_skips_task() {
        let resolver = FixResolver::new(Arc::new(Slow), Duration::from_millis(20));
        let mut t = task(IssueKind::KeywordNotInH1, FixTarget::block("h1-1"), keyword("seo"));
        assert!(resolver.process_task(&mut t, &article()).await.is_none());
        let reason = t.skip_reason.unwrap();
        assert!(reason.contains("timed out after 20ms"), "{}", reason);
    }

    #[tokio::test]
    async fn test_vanished_block_skips_task() {
        let canned = Canned::new(r#"{"block_id": "p-7", "new_text": "x"}"#);
        let mut t = task(IssueKind::KeywordNotInFirstParagraph, FixTarget::block("p-7"), keyword("seo"));
        assert!(resolver(canned.clone()).process_task(&mut t, &article()).await.is_none());
        assert!(canned.prompts.lock().unwrap().is_empty());
    }
}
