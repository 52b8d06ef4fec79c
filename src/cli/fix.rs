use super::score::grade_label;
use super::{load_article, resolve_industry};
use crate::analyzer::SeoChecker;
use crate::autofix::AutoFixEngine;
use crate::config::SeoFixConfig;
use crate::models::{AutoFixResult, StopReason};
use crate::orchestrator::CommandRewriter;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct FixOptions<'a> {
    pub industry: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub max_iterations: Option<usize>,
    pub min_score: Option<f64>,
    pub json: bool,
}

pub async fn run(article_path: &Path, options: FixOptions<'_>) -> Result<()> {
    let project_root = env::current_dir()?;
    let mut config = SeoFixConfig::load(&project_root)?;
    if let Some(max_iterations) = options.max_iterations {
        config.autofix.max_iterations = max_iterations;
    }
    if let Some(min_score) = options.min_score {
        config.autofix.min_score = min_score;
    }

    let scoring = Arc::new(config.scoring_config(&project_root)?);
    let industry = resolve_industry(options.industry, &config, &scoring);
    let checker = SeoChecker::new(scoring).with_industry(industry);
    let rewriter = CommandRewriter::from_config(&config.rewriter)?;
    let engine = AutoFixEngine::new(checker, Arc::new(rewriter), config.autofix.clone());

    let article = load_article(article_path)?;

    // Ctrl-C stops the loop and keeps the last good article
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    if !options.json {
        println!(
            "{}",
            format!(
                "🔧 Auto-fixing {} (target {:.0}, up to {} rounds)...",
                article_path.display(),
                config.autofix.min_score,
                config.autofix.max_iterations
            )
            .cyan()
        );
    }

    let result = engine.run(&article, None, &cancel).await;
    cancel.cancel();

    if let Some(output) = options.output {
        let content = serde_json::to_string_pretty(&result.final_article)?;
        std::fs::write(output, content)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, options.output);
    }

    if !result.success {
        anyhow::bail!("{}", result.message);
    }
    Ok(())
}

fn print_result(result: &AutoFixResult, output: Option<&Path>) {
    if result.stop_reason == StopReason::InvalidInput && result.history.is_empty() {
        println!("{}", format!("✗ {}", result.message).red());
        return;
    }

    println!();
    for record in &result.history {
        println!(
            "   Round {}: {:.1} → {:.1}  ({} applied, {} skipped)",
            record.iteration,
            record.score_before,
            record.score_after,
            record.applied_count,
            record.skipped_count
        );
        for op in &record.patch_summary.applied_operations {
            println!("     {} {}", "✓".green(), op.description);
        }
    }

    for task in &result.skipped_tasks {
        println!(
            "     {} {} {} - {}",
            "⊘".yellow(),
            task.task_id,
            task.kind,
            task.skip_reason.as_deref().unwrap_or("skipped")
        );
    }

    if let Some(report) = &result.final_score {
        println!();
        println!(
            "   Score:  {:.1} → {}  ({:+.1})",
            result.initial_score,
            grade_label(report.grade(), report.total()),
            result.score_improvement
        );
    }

    println!(
        "   Stop:   {} after {} round(s), {} edit(s)",
        result.stop_reason.describe(),
        result.iterations,
        result.total_applied
    );

    match output {
        Some(path) => println!("{}", format!("✅ Fixed article written to {}", path.display()).green()),
        None => println!(
            "{}",
            "   (use --output to save the fixed article)".bright_black()
        ),
    }
}
