pub mod fix;
pub mod init;
pub mod score;

use crate::config::{ScoringConfig, SeoFixConfig};
use crate::models::SeoArticle;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

/// Read an article JSON document
pub fn load_article(path: &Path) -> Result<SeoArticle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let article: SeoArticle = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse article {}", path.display()))?;
    Ok(article)
}

/// Resolve the effective industry, warning when it has no overrides
pub(crate) fn resolve_industry(
    cli_industry: Option<&str>,
    config: &SeoFixConfig,
    scoring: &ScoringConfig,
) -> Option<String> {
    let industry = cli_industry
        .map(str::to_string)
        .or_else(|| config.industry.clone())?;

    if !scoring.industries().any(|known| known == industry) {
        eprintln!(
            "{}",
            format!(
                "⚠ Unknown industry '{}', using default thresholds",
                industry
            )
            .yellow()
        );
    }
    Some(industry)
}
