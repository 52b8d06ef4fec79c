pub mod article;
pub mod fix;
pub mod issue;
pub mod score;

pub use article::{count_words, ArticleBlock, ArticleImage, BlockTag, InputError, SeoArticle};
pub use fix::{
    AutoFixResult, BlockPatch, FixAction, FixScope, FixTarget, FixTask, IterationRecord,
    MetaField, MetaPatch, Patch, PatchOperation, PatchSummary, PositionHint, StopReason,
    StructuralPatch, TaskPayload, TaskStatus,
};
pub use issue::{Category, Issue, IssueKind, IssuePayload, IssuesBySeverity, Severity};
pub use score::{
    AnalysisReport, AnalysisStats, Bonus, CheckResponse, ConfigUsed, Grade, LinkStats,
    ScoreBreakdown,
};
