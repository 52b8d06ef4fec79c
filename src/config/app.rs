use super::scoring::ScoringConfig;
use crate::orchestrator::LlmProvider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "seofix.toml";

/// Application configuration (seofix.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoFixConfig {
    /// Directory holding the YAML scoring tables (built-in tables when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_dir: Option<PathBuf>,

    /// Industry whose threshold overrides apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(default)]
    pub autofix: AutoFixConfig,

    #[serde(default)]
    pub rewriter: RewriterConfig,
}

impl Default for SeoFixConfig {
    fn default() -> Self {
        Self {
            scoring_dir: None,
            industry: None,
            autofix: AutoFixConfig::default(),
            rewriter: RewriterConfig::default(),
        }
    }
}

/// Iteration controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFixConfig {
    /// Stop once the total score reaches this value
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Hard ceiling on fix rounds
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Per-task timeout for the rewrite call
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    /// Overall deadline for one auto-fix run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,

    /// Independent targets resolved in parallel
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
}

fn default_min_score() -> f64 {
    70.0
}

fn default_max_iterations() -> usize {
    3
}

fn default_task_timeout_secs() -> u64 {
    60
}

fn default_max_concurrent_tasks() -> usize {
    4
}

impl Default for AutoFixConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_iterations: default_max_iterations(),
            task_timeout_secs: default_task_timeout_secs(),
            deadline_secs: None,
            max_concurrent_tasks: default_max_concurrent_tasks(),
        }
    }
}

/// External rewrite CLI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriterConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Command override (required for the custom provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Claude,
            command: None,
            model: None,
            extra_args: Vec::new(),
        }
    }
}

impl SeoFixConfig {
    /// Load config from seofix.toml, defaults when the file is absent
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: SeoFixConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        Ok(config)
    }

    /// Save config to seofix.toml
    pub fn save(&self, project_root: &Path) -> Result<()> {
        std::fs::create_dir_all(project_root)?;
        let config_path = project_root.join(CONFIG_FILE);

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(())
    }

    /// Scoring tables this config points at, resolved relative to the project root
    pub fn scoring_config(&self, project_root: &Path) -> Result<ScoringConfig> {
        let config = match &self.scoring_dir {
            Some(dir) => {
                let dir = if dir.is_absolute() {
                    dir.clone()
                } else {
                    project_root.join(dir)
                };
                ScoringConfig::load(&dir)
                    .with_context(|| format!("Failed to load scoring tables from {}", dir.display()))?
            }
            None => ScoringConfig::builtin().context("Built-in scoring tables are invalid")?,
        };
        Ok(config)
    }
}
