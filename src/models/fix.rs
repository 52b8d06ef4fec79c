use super::article::{BlockTag, SeoArticle};
use super::issue::{IssueKind, Severity};
use super::score::AnalysisReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Fix targets
// =============================================================================

/// What a fix task edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixScope {
    /// One existing block
    Block,
    /// Title or meta description
    Meta,
    /// Insert a new block
    Structural,
}

impl FixScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixScope::Block => "block",
            FixScope::Meta => "meta",
            FixScope::Structural => "structural",
        }
    }
}

impl fmt::Display for FixScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article-level text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaField {
    Title,
    MetaDescription,
}

impl MetaField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaField::Title => "title",
            MetaField::MetaDescription => "meta_description",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "title" => Some(MetaField::Title),
            "meta_description" | "meta" => Some(MetaField::MetaDescription),
            _ => None,
        }
    }

    pub fn value<'a>(&self, article: &'a SeoArticle) -> &'a str {
        match self {
            MetaField::Title => &article.title,
            MetaField::MetaDescription => &article.meta_description,
        }
    }

    /// Accepted character range for a rewritten value
    pub fn length_contract(&self) -> (usize, usize) {
        match self {
            MetaField::Title => (50, 60),
            MetaField::MetaDescription => (120, 160),
        }
    }
}

impl fmt::Display for MetaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixTarget {
    pub scope: FixScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<MetaField>,
}

impl FixTarget {
    pub fn block(block_id: impl Into<String>) -> Self {
        Self {
            scope: FixScope::Block,
            block_id: Some(block_id.into()),
            field_name: None,
        }
    }

    pub fn meta(field: MetaField) -> Self {
        Self {
            scope: FixScope::Meta,
            block_id: None,
            field_name: Some(field),
        }
    }

    pub fn structural() -> Self {
        Self {
            scope: FixScope::Structural,
            block_id: None,
            field_name: None,
        }
    }

    /// Serialization key for the edited location: tasks sharing a key must not run concurrently
    pub fn lane_key(&self, task_id: &str) -> String {
        match (self.scope, &self.block_id, self.field_name) {
            (FixScope::Block, Some(block_id), _) => format!("block:{}", block_id),
            (FixScope::Meta, _, Some(field)) => format!("meta:{}", field),
            _ => format!("task:{}", task_id),
        }
    }
}

// =============================================================================
// Fix tasks
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixAction {
    InsertKeyword,
    ReduceKeyword,
    AddElement,
    AdjustLength,
    Rewrite,
}

/// Where a structural insertion lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionHint {
    Beginning,
    End,
    AfterLastH2,
    NearRelatedContent,
}

impl PositionHint {
    pub fn for_kind(kind: IssueKind) -> Self {
        match kind {
            IssueKind::MissingH1 => PositionHint::Beginning,
            IssueKind::FewH2 => PositionHint::AfterLastH2,
            IssueKind::NoInternalLinks => PositionHint::NearRelatedContent,
            _ => PositionHint::End,
        }
    }
}

/// Structured parameters a resolver needs for one task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<FixAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<BlockTag>,
}

/// One unit of remediation work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixTask {
    pub task_id: String,

    #[serde(rename = "type")]
    pub kind: IssueKind,

    pub target: FixTarget,

    #[serde(default)]
    pub payload: TaskPayload,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_text: Option<String>,

    pub recommendation: String,

    pub severity: Severity,

    pub status: TaskStatus,

    /// Why the task produced no applied patch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl FixTask {
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.status = TaskStatus::Skipped;
        self.skip_reason = Some(reason.into());
    }

    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.skip_reason = None;
    }

    pub fn lane_key(&self) -> String {
        self.target.lane_key(&self.task_id)
    }
}

// =============================================================================
// Patches
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPatch {
    pub block_id: String,
    pub old_text: String,
    pub new_text: String,
    pub tag: BlockTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPatch {
    pub field: MetaField,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralPatch {
    pub element_type: BlockTag,
    pub new_text: String,
    pub position_hint: PositionHint,

    /// Filled in once the block is inserted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_index: Option<usize>,
}

/// Exactly one patch shape per operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Patch {
    BlockPatch(BlockPatch),
    MetaPatch(MetaPatch),
    StructuralPatch(StructuralPatch),
}

impl Patch {
    pub fn scope(&self) -> FixScope {
        match self {
            Patch::BlockPatch(_) => FixScope::Block,
            Patch::MetaPatch(_) => FixScope::Meta,
            Patch::StructuralPatch(_) => FixScope::Structural,
        }
    }
}

/// Resolved, appliable effect of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub operation_id: String,
    pub task_id: String,
    pub scope: FixScope,
    #[serde(flatten)]
    pub patch: Patch,
    pub description: String,
    #[serde(default)]
    pub applied: bool,
}

impl PatchOperation {
    pub fn new(task_id: &str, patch: Patch, description: impl Into<String>) -> Self {
        Self {
            operation_id: format!("op-{}", task_id),
            task_id: task_id.to_string(),
            scope: patch.scope(),
            patch,
            description: description.into(),
            applied: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCounts {
    pub block: usize,
    pub meta: usize,
    pub structural: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedOperation {
    pub operation_id: String,
    pub task_id: String,
    pub scope: FixScope,
    pub description: String,
}

/// Reporting view over a batch of patch operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    pub total: usize,
    pub applied: usize,
    pub skipped: usize,
    pub by_scope: ScopeCounts,
    pub applied_operations: Vec<AppliedOperation>,
}

impl PatchSummary {
    pub fn from_operations(operations: &[PatchOperation]) -> Self {
        let mut summary = Self {
            total: operations.len(),
            ..Self::default()
        };

        for op in operations {
            if !op.applied {
                summary.skipped += 1;
                continue;
            }
            summary.applied += 1;
            match op.scope {
                FixScope::Block => summary.by_scope.block += 1,
                FixScope::Meta => summary.by_scope.meta += 1,
                FixScope::Structural => summary.by_scope.structural += 1,
            }
            summary.applied_operations.push(AppliedOperation {
                operation_id: op.operation_id.clone(),
                task_id: op.task_id.clone(),
                scope: op.scope,
                description: op.description.clone(),
            });
        }

        summary
    }
}

// =============================================================================
// Auto-fix results
// =============================================================================

/// Why the iteration loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ThresholdReached,
    NoTasksApplied,
    IterationLimit,
    Cancelled,
    DeadlineExceeded,
    InvalidInput,
}

impl StopReason {
    pub fn describe(&self) -> &'static str {
        match self {
            StopReason::ThresholdReached => "score threshold reached",
            StopReason::NoTasksApplied => "no tasks applied",
            StopReason::IterationLimit => "iteration limit reached",
            StopReason::Cancelled => "cancelled",
            StopReason::DeadlineExceeded => "deadline exceeded",
            StopReason::InvalidInput => "invalid input",
        }
    }
}

/// One round of the auto-fix loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub score_before: f64,
    pub score_after: f64,
    pub applied_count: usize,
    pub skipped_count: usize,
    pub patch_summary: PatchSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFixResult {
    pub run_id: Uuid,
    pub success: bool,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stop_reason: StopReason,

    pub final_article: SeoArticle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<AnalysisReport>,

    pub initial_score: f64,
    pub final_score_total: f64,
    pub score_improvement: f64,

    pub iterations: usize,
    pub history: Vec<IterationRecord>,

    pub applied_tasks: Vec<FixTask>,
    pub skipped_tasks: Vec<FixTask>,
    pub total_applied: usize,
    pub total_skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(task_id: &str, patch: Patch, applied: bool) -> PatchOperation {
        let mut op = PatchOperation::new(task_id, patch, format!("fix {}", task_id));
        op.applied = applied;
        op
    }

    #[test]
    fn test_patch_operation_serializes_single_shape() {
        let operation = PatchOperation::new(
            "fix-001",
            Patch::MetaPatch(MetaPatch {
                field: MetaField::Title,
                old_value: "a".into(),
                new_value: "b".into(),
            }),
            "title",
        );
        let value = serde_json::to_value(&operation).unwrap();
        assert_eq!(value["operation_id"], "op-fix-001");
        assert_eq!(value["scope"], "meta");
        assert_eq!(value["meta_patch"]["field"], "title");
        assert!(value.get("block_patch").is_none());
        assert!(value.get("structural_patch").is_none());
    }

    #[test]
    fn test_patch_summary_counts() {
        let ops = vec![
            op(
                "fix-001",
                Patch::BlockPatch(BlockPatch {
                    block_id: "p-1".into(),
                    old_text: "x".into(),
                    new_text: "y".into(),
                    tag: BlockTag::P,
                }),
                true,
            ),
            op(
                "fix-002",
                Patch::StructuralPatch(StructuralPatch {
                    element_type: BlockTag::H2,
                    new_text: "New".into(),
                    position_hint: PositionHint::AfterLastH2,
                    added_block_id: None,
                    insert_index: None,
                }),
                false,
            ),
        ];
        let summary = PatchSummary::from_operations(&ops);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.by_scope.block, 1);
        assert_eq!(summary.by_scope.structural, 0);
        assert_eq!(summary.applied_operations[0].task_id, "fix-001");
    }

    #[test]
    fn test_lane_keys() {
        assert_eq!(FixTarget::block("p-3").lane_key("fix-1"), "block:p-3");
        assert_eq!(
            FixTarget::meta(MetaField::MetaDescription).lane_key("fix-1"),
            "meta:meta_description"
        );
        assert_eq!(FixTarget::structural().lane_key("fix-9"), "task:fix-9");
    }

    #[test]
    fn test_position_hints() {
        assert_eq!(PositionHint::for_kind(IssueKind::MissingH1), PositionHint::Beginning);
        assert_eq!(PositionHint::for_kind(IssueKind::FewH2), PositionHint::AfterLastH2);
        assert_eq!(
            PositionHint::for_kind(IssueKind::NoInternalLinks),
            PositionHint::NearRelatedContent
        );
        assert_eq!(PositionHint::for_kind(IssueKind::ContentTooShort), PositionHint::End);
    }
}
