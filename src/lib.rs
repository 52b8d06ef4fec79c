// Seofix - Block-addressable SEO scoring and iterative auto-fix
// Scores structured articles and rewrites the blocks behind each issue through an external LLM CLI

pub mod analyzer;
pub mod autofix;
pub mod cli;
pub mod config;
pub mod models;
pub mod orchestrator;
pub mod parser;

pub use anyhow::{Context, Result};

// Re-export commonly used types
pub use analyzer::SeoChecker;
pub use autofix::AutoFixEngine;
pub use config::{ScoringConfig, SeoFixConfig};
pub use models::{AnalysisReport, AutoFixResult, FixTask, Issue, SeoArticle};
pub use orchestrator::{CommandRewriter, Rewriter};
