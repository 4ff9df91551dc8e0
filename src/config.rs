use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputSettings {
    /// Questionnaire roster (JSON); when set, scores are computed from it
    #[serde(default)]
    pub roster: Option<String>,
    /// Precomputed score matrix, one whitespace-separated row per line
    #[serde(default)]
    pub scores: Option<String>,
    /// Gender identities, one label per line
    #[serde(default)]
    pub genders: Option<String>,
    /// Gender preferences, one label per line
    #[serde(default)]
    pub preferences: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub partition: PartitionStrategy,
    /// Seed for the shuffled partition strategy
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            partition: PartitionStrategy::default(),
            seed: default_seed(),
        }
    }
}

/// How the population is split into proposers and acceptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionStrategy {
    /// First half of the population proposes, in index order
    Ordered,
    /// Seeded shuffle before the split
    #[default]
    Shuffled,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSettings {
    /// Optional path for a JSON report of the run
    #[serde(default)]
    pub report: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Sources, in order of increasing priority:
    /// 1. config/default.toml
    /// 2. config/local.toml (gitignored, for local overrides)
    /// 3. DUET__ prefixed environment variables (e.g. DUET__MATCHING__SEED)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("DUET")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("DUET")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
