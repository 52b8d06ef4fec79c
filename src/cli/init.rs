use crate::config::{
    scoring::{
        BUILTIN_SCORING_RULES, BUILTIN_THRESHOLDS, BUILTIN_WEIGHTS, SCORING_RULES_FILE,
        THRESHOLDS_FILE, WEIGHTS_FILE,
    },
    SeoFixConfig, CONFIG_FILE,
};
use crate::Result;
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};

const SCORING_DIR: &str = "config";

pub fn run(force: bool) -> Result<()> {
    let project_root = env::current_dir()?;
    install(&project_root, force)
}

/// Write seofix.toml and editable copies of the scoring tables
pub fn install(project_root: &Path, force: bool) -> Result<()> {
    let config_path = project_root.join(CONFIG_FILE);
    if config_path.exists() && !force {
        println!("{}", "⚠️  seofix is already initialized".yellow());
        println!("   Run with --force to overwrite the scoring tables");
        return Ok(());
    }

    // Step 1: Application config
    let mut config = if config_path.exists() {
        SeoFixConfig::load(project_root)?
    } else {
        SeoFixConfig::default()
    };
    config.scoring_dir = Some(PathBuf::from(SCORING_DIR));
    config.save(project_root)?;
    println!("   ✓ {}", CONFIG_FILE);

    // Step 2: Scoring tables
    let scoring_dir = project_root.join(SCORING_DIR);
    std::fs::create_dir_all(&scoring_dir)?;
    for (name, content) in [
        (SCORING_RULES_FILE, BUILTIN_SCORING_RULES),
        (THRESHOLDS_FILE, BUILTIN_THRESHOLDS),
        (WEIGHTS_FILE, BUILTIN_WEIGHTS),
    ] {
        std::fs::write(scoring_dir.join(name), content)?;
        println!("   ✓ {}/{}", SCORING_DIR, name);
    }

    println!();
    println!("{}", "✅ seofix initialized successfully!".green().bold());
    println!("   Edit {}/*.yaml to tune thresholds, weights and bonuses", SCORING_DIR);
    Ok(())
}
