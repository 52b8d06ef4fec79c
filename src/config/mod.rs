pub mod app;
pub mod scoring;

pub use app::{AutoFixConfig, RewriterConfig, SeoFixConfig, CONFIG_FILE};
pub use scoring::{
    BonusKind, ConfigError, HeadingThresholds, KeywordDensityThresholds, MetaThresholds,
    ParagraphThresholds, ScoringConfig, ScoringWeights, SentenceThresholds, Thresholds,
    TitleThresholds, WordCountThresholds,
};
