use super::{load_article, resolve_industry};
use crate::analyzer::SeoChecker;
use crate::config::{ScoringWeights, SeoFixConfig};
use crate::models::{AnalysisReport, Category, Grade, Severity};
use crate::Result;
use colored::{ColoredString, Colorize};
use std::env;
use std::path::Path;
use std::sync::Arc;

pub fn run(article_path: &Path, industry: Option<&str>, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    let config = SeoFixConfig::load(&project_root)?;
    let scoring = Arc::new(config.scoring_config(&project_root)?);
    let industry = resolve_industry(industry, &config, &scoring);

    let article = load_article(article_path)?;
    let checker = SeoChecker::new(scoring).with_industry(industry);
    let response = checker.check(&article);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match &response.report {
        Some(report) => print_report(report, checker.config().scoring_weights()),
        None => println!("{}", format!("✗ {}", response.message).red()),
    }

    Ok(())
}

pub(crate) fn grade_label(grade: Grade, total: f64) -> ColoredString {
    let label = format!("{:.1}/100 ({})", total, grade);
    match grade {
        Grade::APlus | Grade::A => label.green().bold(),
        Grade::B | Grade::C => label.yellow().bold(),
        Grade::D | Grade::F => label.red().bold(),
    }
}

pub(crate) fn print_report(report: &AnalysisReport, weights: &ScoringWeights) {
    let breakdown = &report.score_breakdown;

    println!("{}", "📊 SEO Score".cyan().bold());
    println!();
    println!("   Total:  {}", grade_label(breakdown.grade, breakdown.total));
    println!();

    let categories = [
        (Category::Structure, breakdown.structure),
        (Category::KeywordOptimization, breakdown.keyword_optimization),
        (Category::Readability, breakdown.readability),
        (Category::TechnicalSeo, breakdown.technical_seo),
        (Category::ContentQuality, breakdown.content_quality),
    ];
    for (category, score) in categories {
        println!(
            "   {:<22} {:>5.1} / {:<4}",
            category.name(),
            score,
            weights.max_for(category)
        );
    }
    if breakdown.bonus > 0.0 {
        println!("   {:<22} {:>5}", "bonus", format!("+{:.1}", breakdown.bonus).green());
    }

    if !report.issues.is_empty() {
        println!();
        println!(
            "{}",
            format!(
                "🔍 Issues ({} critical, {} warning, {} info)",
                report.issues.count_by_severity(Severity::Critical),
                report.issues.count_by_severity(Severity::Warning),
                report.issues.count_by_severity(Severity::Info)
            )
            .cyan()
        );
        for issue in report.issues.iter() {
            let line = issue.format();
            let line = match issue.severity {
                Severity::Critical => line.red(),
                Severity::Warning => line.yellow(),
                Severity::Info => line.normal(),
            };
            println!("   {}", line);
            println!("     {}", format!("→ {}", issue.recommendation).bright_black());
        }
    }

    if !report.bonuses.is_empty() {
        println!();
        println!("{}", "✨ Bonuses".cyan());
        for bonus in &report.bonuses {
            println!("   {} +{:.1}", bonus.name, bonus.points);
        }
    }

    let stats = &report.stats;
    println!();
    println!(
        "{}",
        format!(
            "   {} words · {} blocks ({} mode) · {} images · {} internal / {} external links",
            stats.word_count,
            stats.block_count,
            stats.parser_mode,
            stats.images_count,
            stats.links.internal,
            stats.links.external
        )
        .bright_black()
    );
}
