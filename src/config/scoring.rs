//! Scoring tables: thresholds, category weights, penalties and bonuses.
//!
//! Three YAML documents feed one immutable [`ScoringConfig`]:
//!
//! - `scoring_rules.yaml`: `default_thresholds`
//! - `thresholds.yaml`: `industry_thresholds` (optional)
//! - `weights.yaml`: `scoring_weights`, `issue_penalties`, `bonus_points`
//!
//! Industry overrides are deep-merged onto the defaults and resolved into typed
//! [`Thresholds`] at construction, so a bad override fails at boot rather than
//! in the middle of an analysis.

use crate::models::{Category, IssueKind};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const SCORING_RULES_FILE: &str = "scoring_rules.yaml";
pub const THRESHOLDS_FILE: &str = "thresholds.yaml";
pub const WEIGHTS_FILE: &str = "weights.yaml";

pub const BUILTIN_SCORING_RULES: &str = include_str!("../../config/scoring_rules.yaml");
pub const BUILTIN_THRESHOLDS: &str = include_str!("../../config/thresholds.yaml");
pub const BUILTIN_WEIGHTS: &str = include_str!("../../config/weights.yaml");

const REQUIRED_TABLES: [&str; 3] = ["default_thresholds", "scoring_weights", "issue_penalties"];

/// Scoring configuration failures (raised at construction only)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing required config tables: {}", .0.join(", "))]
    MissingTables(Vec<&'static str>),

    #[error("Invalid table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("Invalid thresholds for '{scope}': {source}")]
    InvalidThresholds {
        scope: String,
        #[source]
        source: serde_yaml::Error,
    },
}

// =============================================================================
// Typed thresholds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphThresholds {
    pub max_words: usize,
}

impl Default for ParagraphThresholds {
    fn default() -> Self {
        Self { max_words: 150 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceThresholds {
    pub max_words: usize,
    /// Long sentences tolerated in one paragraph before it is flagged
    pub max_long_per_paragraph: usize,
}

impl Default for SentenceThresholds {
    fn default() -> Self {
        Self {
            max_words: 25,
            max_long_per_paragraph: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleThresholds {
    pub min_chars: usize,
    pub max_chars: usize,
    pub optimal_min: usize,
    pub optimal_max: usize,
}

impl Default for TitleThresholds {
    fn default() -> Self {
        Self {
            min_chars: 30,
            max_chars: 60,
            optimal_min: 50,
            optimal_max: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaThresholds {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for MetaThresholds {
    fn default() -> Self {
        Self {
            min_chars: 120,
            max_chars: 160,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordDensityThresholds {
    pub min: f64,
    pub max: f64,
    /// Percentage above which a keyword counts as stuffed
    pub stuffing_threshold: f64,
}

impl Default for KeywordDensityThresholds {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.5,
            stuffing_threshold: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingThresholds {
    pub h2_min: usize,
    pub h3_max: usize,
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self {
            h2_min: 3,
            h3_max: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCountThresholds {
    pub min: usize,
    pub optimal_min: usize,
    pub optimal_max: usize,
}

impl Default for WordCountThresholds {
    fn default() -> Self {
        Self {
            min: 900,
            optimal_min: 1500,
            optimal_max: 3000,
        }
    }
}

/// Resolved thresholds for one industry (or the defaults)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub paragraph: ParagraphThresholds,
    pub sentence: SentenceThresholds,
    pub title: TitleThresholds,
    pub meta_description: MetaThresholds,
    pub keyword_density: KeywordDensityThresholds,
    pub headings: HeadingThresholds,
    pub word_count: WordCountThresholds,
}

// =============================================================================
// Weights and bonuses
// =============================================================================

/// Maximum points per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub structure: f64,
    pub keyword_optimization: f64,
    pub readability: f64,
    pub technical_seo: f64,
    pub content_quality: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            structure: 20.0,
            keyword_optimization: 25.0,
            readability: 20.0,
            technical_seo: 15.0,
            content_quality: 20.0,
        }
    }
}

impl ScoringWeights {
    pub fn max_for(&self, category: Category) -> f64 {
        match category {
            Category::Structure => self.structure,
            Category::KeywordOptimization => self.keyword_optimization,
            Category::Readability => self.readability,
            Category::TechnicalSeo => self.technical_seo,
            Category::ContentQuality => self.content_quality,
        }
    }

    pub fn sum(&self) -> f64 {
        self.structure
            + self.keyword_optimization
            + self.readability
            + self.technical_seo
            + self.content_quality
    }
}

/// Bonuses the aggregator may award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BonusKind {
    GoodHeadingStructure,
    KeywordInFirstParagraph,
    AllImagesHaveAlt,
    OptimalWordCount,
}

impl BonusKind {
    pub fn key(&self) -> &'static str {
        match self {
            BonusKind::GoodHeadingStructure => "good_heading_structure",
            BonusKind::KeywordInFirstParagraph => "keyword_in_first_paragraph",
            BonusKind::AllImagesHaveAlt => "all_images_have_alt",
            BonusKind::OptimalWordCount => "optimal_word_count",
        }
    }
}

// =============================================================================
// ScoringConfig
// =============================================================================

/// Immutable scoring configuration, safe to share across analyses
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    defaults: Thresholds,
    industries: BTreeMap<String, Thresholds>,
    weights: ScoringWeights,
    penalties: HashMap<IssueKind, u32>,
    bonuses: HashMap<String, f64>,
}

impl ScoringConfig {
    /// Parse the tables shipped with the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_documents(
            Some(BUILTIN_SCORING_RULES),
            Some(BUILTIN_THRESHOLDS),
            Some(BUILTIN_WEIGHTS),
        )
    }

    /// Load the three YAML files from a directory; absent files are skipped
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let read = |name: &str| -> Result<Option<String>, ConfigError> {
            let path = dir.join(name);
            if !path.exists() {
                tracing::warn!(path = %path.display(), "Config file not found");
                return Ok(None);
            }
            std::fs::read_to_string(&path)
                .map(Some)
                .map_err(|source| ConfigError::Read { path, source })
        };

        let rules = read(SCORING_RULES_FILE)?;
        let thresholds = read(THRESHOLDS_FILE)?;
        let weights = read(WEIGHTS_FILE)?;

        let config = Self::from_documents(rules.as_deref(), thresholds.as_deref(), weights.as_deref())?;
        tracing::info!(
            dir = %dir.display(),
            industries = config.industries.len(),
            "Loaded scoring config"
        );
        Ok(config)
    }

    /// Build from YAML document contents
    pub fn from_documents(
        scoring_rules: Option<&str>,
        thresholds: Option<&str>,
        weights: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut tables = Mapping::new();
        let documents = [
            (SCORING_RULES_FILE, scoring_rules, &["default_thresholds"][..]),
            (THRESHOLDS_FILE, thresholds, &["industry_thresholds"][..]),
            (
                WEIGHTS_FILE,
                weights,
                &["scoring_weights", "issue_penalties", "bonus_points"][..],
            ),
        ];

        for (file, content, keys) in documents {
            let Some(content) = content else { continue };
            let document = parse_document(file, content)?;
            for key in keys {
                match document.get(*key) {
                    Some(value) => {
                        tables.insert(Value::from(*key), value.clone());
                    }
                    None => tracing::warn!(file, key, "Config key not found"),
                }
            }
        }

        let missing: Vec<&'static str> = REQUIRED_TABLES
            .iter()
            .copied()
            .filter(|key| !tables.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingTables(missing));
        }

        let default_value = table(&tables, "default_thresholds").cloned().unwrap_or_default();
        let defaults = resolve_thresholds("default", &default_value)?;

        let mut industries = BTreeMap::new();
        if let Some(Value::Mapping(overrides)) = table(&tables, "industry_thresholds") {
            for (name, overlay) in overrides {
                let name = name.as_str().ok_or_else(|| ConfigError::InvalidTable {
                    table: "industry_thresholds".to_string(),
                    reason: "industry keys must be strings".to_string(),
                })?;
                let mut merged = default_value.clone();
                deep_merge(&mut merged, overlay);
                industries.insert(name.to_string(), resolve_thresholds(name, &merged)?);
            }
        }

        let weights = match table(&tables, "scoring_weights") {
            Some(value) => serde_yaml::from_value(value.clone()).map_err(|e| {
                ConfigError::InvalidTable {
                    table: "scoring_weights".to_string(),
                    reason: e.to_string(),
                }
            })?,
            None => ScoringWeights::default(),
        };

        let penalties = parse_penalties(table(&tables, "issue_penalties"))?;
        let bonuses = parse_points("bonus_points", table(&tables, "bonus_points"))?;

        Ok(Self {
            defaults,
            industries,
            weights,
            penalties,
            bonuses,
        })
    }

    /// Thresholds for an industry, falling back to the defaults
    pub fn thresholds(&self, industry: Option<&str>) -> &Thresholds {
        match industry {
            Some(name) => self.industries.get(name).unwrap_or_else(|| {
                tracing::debug!(industry = name, "Unknown industry, using default thresholds");
                &self.defaults
            }),
            None => &self.defaults,
        }
    }

    /// Penalty for an issue kind, always non-negative
    pub fn penalty(&self, kind: IssueKind) -> u32 {
        self.penalties
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_penalty())
    }

    /// Bonus points, zero when not configured
    pub fn bonus(&self, kind: BonusKind) -> f64 {
        self.bonuses.get(kind.key()).copied().unwrap_or(0.0)
    }

    pub fn scoring_weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn industries(&self) -> impl Iterator<Item = &str> {
        self.industries.keys().map(String::as_str)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_document(file: &str, content: &str) -> Result<Mapping, ConfigError> {
    let value: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        file: file.to_string(),
        source,
    })?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ConfigError::InvalidTable {
            table: file.to_string(),
            reason: "top level must be a mapping".to_string(),
        }),
    }
}

fn table<'a>(tables: &'a Mapping, key: &str) -> Option<&'a Value> {
    tables.get(key)
}

/// Recursive merge: mappings merge key-by-key, anything else replaces
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

fn resolve_thresholds(scope: &str, value: &Value) -> Result<Thresholds, ConfigError> {
    serde_yaml::from_value(value.clone()).map_err(|source| ConfigError::InvalidThresholds {
        scope: scope.to_string(),
        source,
    })
}

fn parse_points(name: &str, value: Option<&Value>) -> Result<HashMap<String, f64>, ConfigError> {
    let mut points = HashMap::new();
    let Some(value) = value else {
        return Ok(points);
    };
    let Value::Mapping(mapping) = value else {
        return Err(ConfigError::InvalidTable {
            table: name.to_string(),
            reason: "expected a mapping".to_string(),
        });
    };

    for (key, value) in mapping {
        let key = key.as_str().unwrap_or_default();
        let number = value.as_f64().ok_or_else(|| ConfigError::InvalidTable {
            table: name.to_string(),
            reason: format!("'{}' is not a number", key),
        })?;
        points.insert(key.to_string(), number);
    }
    Ok(points)
}

fn parse_penalties(value: Option<&Value>) -> Result<HashMap<IssueKind, u32>, ConfigError> {
    let mut penalties = HashMap::new();
    for (key, points) in parse_points("issue_penalties", value)? {
        match IssueKind::from_key(&key) {
            Some(kind) => {
                penalties.insert(kind, points.abs().round() as u32);
            }
            None => tracing::warn!(issue_type = %key, "Ignoring penalty for unknown issue type"),
        }
    }
    Ok(penalties)
}
