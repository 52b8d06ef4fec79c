use super::builder::FixTaskBuilder;
use super::patch::PatchApplier;
use super::resolver::FixResolver;
use crate::analyzer::SeoChecker;
use crate::config::AutoFixConfig;
use crate::models::{
    score::round1, AnalysisReport, AutoFixResult, FixScope, FixTask, IterationRecord,
    PatchOperation, SeoArticle, StopReason, TaskStatus,
};
use crate::orchestrator::Rewriter;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Tasks that edit the same location, resolved in order
struct Lane {
    tasks: Vec<(usize, FixTask)>,
}

/// Outcome of one resolved task, tagged with its position in the round
struct Resolved {
    order: usize,
    task: FixTask,
    operation: Option<PatchOperation>,
}

/// Score, fix, re-score until the article is good enough or the loop gives up
pub struct AutoFixEngine {
    checker: SeoChecker,
    resolver: FixResolver,
    applier: PatchApplier,
    config: AutoFixConfig,
}

impl AutoFixEngine {
    pub fn new(checker: SeoChecker, rewriter: Arc<dyn Rewriter>, config: AutoFixConfig) -> Self {
        let timeout = Duration::from_secs(config.task_timeout_secs.max(1));
        Self {
            checker,
            resolver: FixResolver::new(rewriter, timeout),
            applier: PatchApplier::new(),
            config,
        }
    }

    /// Run the auto-fix loop
    ///
    /// `initial` is reused as the round-one score when the caller already has it.
    /// The input article is never mutated; `final_article` is the last article
    /// that was successfully re-scored.
    pub async fn run(
        &self,
        article: &SeoArticle,
        initial: Option<AnalysisReport>,
        cancel: &CancellationToken,
    ) -> AutoFixResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let deadline = self
            .config
            .deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        // Step 1: Initial score
        let mut report = match initial {
            Some(report) => report,
            None => match self.checker.analyze(article) {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!(error = %e, "Auto-fix rejected article");
                    return AutoFixResult {
                        run_id,
                        success: false,
                        message: e.to_string(),
                        started_at,
                        finished_at: Utc::now(),
                        stop_reason: StopReason::InvalidInput,
                        final_article: article.clone(),
                        final_score: None,
                        initial_score: 0.0,
                        final_score_total: 0.0,
                        score_improvement: 0.0,
                        iterations: 0,
                        history: Vec::new(),
                        applied_tasks: Vec::new(),
                        skipped_tasks: Vec::new(),
                        total_applied: 0,
                        total_skipped: 0,
                    };
                }
            },
        };

        let initial_score = report.total();
        let mut current = article.clone();
        let mut builder = FixTaskBuilder::new();
        let mut history = Vec::new();
        let mut applied_tasks = Vec::new();
        let mut skipped_tasks = Vec::new();

        tracing::info!(
            %run_id,
            score = initial_score,
            min_score = self.config.min_score,
            max_iterations = self.config.max_iterations,
            "Starting auto-fix"
        );

        // Threshold is only checked after a round; a passing article still gets one
        let mut stop_reason =
            (self.config.max_iterations == 0).then_some(StopReason::IterationLimit);

        let mut iteration = 0;
        while stop_reason.is_none() {
            if cancel.is_cancelled() {
                stop_reason = Some(StopReason::Cancelled);
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                stop_reason = Some(StopReason::DeadlineExceeded);
                break;
            }

            iteration += 1;
            let score_before = report.total();

            // Step 2: Build tasks from the current score
            let tasks = builder.build_tasks(&report, &current);

            // Step 3: Resolve (cancellation abandons the round)
            let resolved = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(iteration, "Auto-fix cancelled mid-round");
                    stop_reason = Some(StopReason::Cancelled);
                    break;
                }
                resolved = self.resolve_round(tasks, &current) => resolved,
            };

            // Step 4: Patch, structural inserts first
            let (mut operations, mut round_tasks) = order_operations(resolved);
            let patched = self.applier.apply_patches(&current, &mut operations);
            let summary = self.applier.summary(&operations);

            let mut applied_count = 0;
            let mut skipped_count = 0;
            for task in &mut round_tasks {
                let applied = operations
                    .iter()
                    .any(|op| op.task_id == task.task_id && op.applied);
                if applied {
                    task.complete();
                    applied_count += 1;
                } else {
                    if task.status != TaskStatus::Skipped {
                        task.skip("Patch could not be applied");
                    }
                    skipped_count += 1;
                }
            }
            for task in round_tasks {
                if task.status == TaskStatus::Completed {
                    applied_tasks.push(task);
                } else {
                    skipped_tasks.push(task);
                }
            }

            // Step 5: Re-score
            if applied_count > 0 {
                match self.checker.analyze(&patched) {
                    Ok(next) => {
                        current = patched;
                        report = next;
                    }
                    Err(e) => {
                        tracing::error!(iteration, error = %e, "Patched article failed validation, keeping previous round");
                        stop_reason = Some(StopReason::InvalidInput);
                    }
                }
            }

            let score_after = report.total();
            tracing::info!(
                iteration,
                score_before,
                score_after,
                applied = applied_count,
                skipped = skipped_count,
                "Auto-fix round finished"
            );
            history.push(IterationRecord {
                iteration,
                score_before,
                score_after,
                applied_count,
                skipped_count,
                patch_summary: summary,
            });

            if stop_reason.is_none() {
                stop_reason = if score_after >= self.config.min_score {
                    Some(StopReason::ThresholdReached)
                } else if applied_count == 0 {
                    Some(StopReason::NoTasksApplied)
                } else if iteration >= self.config.max_iterations {
                    Some(StopReason::IterationLimit)
                } else {
                    None
                };
            }
        }

        let stop_reason = stop_reason.unwrap_or(StopReason::IterationLimit);
        let final_score_total = report.total();
        let total_applied = applied_tasks.len();
        let total_skipped = skipped_tasks.len();

        tracing::info!(
            %run_id,
            reason = stop_reason.describe(),
            iterations = iteration,
            final_score = final_score_total,
            "Auto-fix finished"
        );

        AutoFixResult {
            run_id,
            success: stop_reason != StopReason::InvalidInput,
            message: format!(
                "Applied {} of {} tasks in {} iteration(s): {}",
                total_applied,
                total_applied + total_skipped,
                iteration,
                stop_reason.describe()
            ),
            started_at,
            finished_at: Utc::now(),
            stop_reason,
            final_article: current,
            final_score: Some(report),
            initial_score,
            final_score_total,
            score_improvement: round1(final_score_total - initial_score),
            iterations: iteration,
            history,
            applied_tasks,
            skipped_tasks,
            total_applied,
            total_skipped,
        }
    }

    /// Resolve one round of tasks; disjoint lanes run concurrently
    async fn resolve_round(&self, tasks: Vec<FixTask>, article: &SeoArticle) -> Vec<Resolved> {
        let lanes = group_lanes(tasks);
        let limit = self.config.max_concurrent_tasks.max(1);

        let per_lane: Vec<Vec<Resolved>> = stream::iter(lanes)
            .map(|lane| self.resolve_lane(lane, article))
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut resolved: Vec<Resolved> = per_lane.into_iter().flatten().collect();
        resolved.sort_by_key(|r| r.order);
        resolved
    }

    /// Resolve a lane in order, each task seeing the previous tasks' edits
    async fn resolve_lane(&self, lane: Lane, article: &SeoArticle) -> Vec<Resolved> {
        let mut snapshot: Option<SeoArticle> = None;
        let mut out = Vec::with_capacity(lane.tasks.len());

        for (order, mut task) in lane.tasks {
            let view = snapshot.as_ref().unwrap_or(article);
            let operation = self.resolver.process_task(&mut task, view).await;

            if let Some(op) = &operation {
                if op.scope != FixScope::Structural {
                    let mut pending = [op.clone()];
                    snapshot = Some(self.applier.apply_patches(view, &mut pending));
                }
            }
            out.push(Resolved {
                order,
                task,
                operation,
            });
        }

        out
    }
}

/// Group tasks by edited location, keeping first-seen lane order
fn group_lanes(tasks: Vec<FixTask>) -> Vec<Lane> {
    let mut lanes: Vec<(String, Lane)> = Vec::new();
    for (order, task) in tasks.into_iter().enumerate() {
        let key = task.lane_key();
        match lanes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, lane)) => lane.tasks.push((order, task)),
            None => lanes.push((
                key,
                Lane {
                    tasks: vec![(order, task)],
                },
            )),
        }
    }
    lanes.into_iter().map(|(_, lane)| lane).collect()
}

/// Split resolved tasks into the patch batch (structural first) and the task list
fn order_operations(resolved: Vec<Resolved>) -> (Vec<PatchOperation>, Vec<FixTask>) {
    let mut structural = Vec::new();
    let mut edits = Vec::new();
    let mut tasks = Vec::with_capacity(resolved.len());

    for r in resolved {
        if let Some(op) = r.operation {
            if op.scope == FixScope::Structural {
                structural.push(op);
            } else {
                edits.push(op);
            }
        }
        tasks.push(r.task);
    }

    structural.extend(edits);
    (structural, tasks)
}
