use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use crate::evaluator::MIN_SAMPLES;

const DEFAULT_RUN_ID: &str = "stats";
const DEFAULT_HANDS: usize = 8;
const DEFAULT_SAMPLES_PER_HAND: usize = 1_000;
const DEFAULT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_OUTPUT: &str = "out/{run_id}/hands.csv";
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Settings for a parallel hand-statistics run, loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StatsConfig {
    #[serde(default = "default_run_id")]
    pub run_id: String,
    /// Master seed; each worker's seed is drawn from it. Absent means a fresh
    /// seed is picked (and logged) at start-up.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_hands")]
    pub hands: usize,
    #[serde(default = "default_samples_per_hand")]
    pub samples_per_hand: usize,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            run_id: default_run_id(),
            seed: None,
            hands: default_hands(),
            samples_per_hand: default_samples_per_hand(),
            workers: default_workers(),
            channel_capacity: default_channel_capacity(),
            output: default_output(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StatsConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: StatsConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;

        if self.hands == 0 {
            return Err(ValidationError::InvalidField {
                field: "hands".to_string(),
                message: "number of hands must be greater than zero".to_string(),
            });
        }

        if self.samples_per_hand < MIN_SAMPLES {
            return Err(ValidationError::InvalidField {
                field: "samples_per_hand".to_string(),
                message: format!("at least {MIN_SAMPLES} samples are needed for a deviation"),
            });
        }

        if self.workers == 0 {
            return Err(ValidationError::InvalidField {
                field: "workers".to_string(),
                message: "at least one worker is required".to_string(),
            });
        }

        if self.channel_capacity == 0 {
            return Err(ValidationError::InvalidField {
                field: "channel_capacity".to_string(),
                message: "channel capacity must be greater than zero".to_string(),
            });
        }

        validate_path("output", &self.run_id, &self.output)?;
        if let Some(file) = self.logging.file.as_deref() {
            validate_path("logging.file", &self.run_id, file)?;
        }
        self.logging.normalize();
        Ok(())
    }

    pub fn resolved_output(&self) -> PathBuf {
        resolve_template(&self.run_id, &self.output)
    }

    pub fn resolved_log_file(&self) -> Option<PathBuf> {
        self.logging
            .file
            .as_deref()
            .map(|file| resolve_template(&self.run_id, file))
    }
}

fn default_run_id() -> String {
    DEFAULT_RUN_ID.to_string()
}

fn default_hands() -> usize {
    DEFAULT_HANDS
}

fn default_samples_per_hand() -> usize {
    DEFAULT_SAMPLES_PER_HAND
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

/// Human-readable events always go to stderr; `file` adds a JSON log.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            tracing_level: default_tracing_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_path(field: &str, run_id: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: field.to_string(),
            message: "path must not be empty".to_string(),
        });
    }

    if resolve_template(run_id, value).file_name().is_none() {
        return Err(ValidationError::InvalidField {
            field: field.to_string(),
            message: "resolved path does not name a file".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "nightly_01"
seed: 2024
hands: 500
samples_per_hand: 200
workers: 6
output: "out/{run_id}/hands.csv"
logging:
  tracing_level: "debug"
  file: "out/{run_id}/stats.log"
"#;

    fn parse(yaml: &str) -> StatsConfig {
        serde_yaml::from_str(yaml).expect("parse yaml")
    }

    fn invalid_field(yaml: &str) -> String {
        let mut cfg = parse(yaml);
        match cfg.validate().expect_err("should fail") {
            ValidationError::InvalidField { field, .. } => field,
        }
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg = parse(BASIC_YAML);
        cfg.validate().expect("validate");

        assert_eq!(cfg.seed, Some(2024));
        assert_eq!(cfg.workers, 6);
        assert_eq!(cfg.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(
            cfg.resolved_output(),
            PathBuf::from("out/nightly_01/hands.csv")
        );
        assert_eq!(
            cfg.resolved_log_file(),
            Some(PathBuf::from("out/nightly_01/stats.log"))
        );
    }

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg = parse("{}");
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg.run_id, DEFAULT_RUN_ID);
        assert_eq!(cfg.hands, DEFAULT_HANDS);
        assert_eq!(cfg.samples_per_hand, DEFAULT_SAMPLES_PER_HAND);
        assert!(cfg.workers >= 1);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.resolved_log_file(), None);
        assert_eq!(cfg, StatsConfig { workers: cfg.workers, ..StatsConfig::default() });
    }

    #[test]
    fn rejects_single_sample() {
        let yaml = BASIC_YAML.replace("samples_per_hand: 200", "samples_per_hand: 1");
        assert_eq!(invalid_field(&yaml), "samples_per_hand");
    }

    #[test]
    fn rejects_zero_workers_and_hands() {
        let yaml = BASIC_YAML.replace("workers: 6", "workers: 0");
        assert_eq!(invalid_field(&yaml), "workers");
        let yaml = BASIC_YAML.replace("hands: 500", "hands: 0");
        assert_eq!(invalid_field(&yaml), "hands");
    }

    #[test]
    fn rejects_bad_run_id_and_paths() {
        let yaml = BASIC_YAML.replace("nightly_01", "nightly 01");
        assert_eq!(invalid_field(&yaml), "run_id");
        let yaml = BASIC_YAML.replace("out/{run_id}/hands.csv", " ");
        assert_eq!(invalid_field(&yaml), "output");
    }

    #[test]
    fn blank_tracing_level_falls_back_to_info() {
        let yaml = BASIC_YAML.replace("tracing_level: \"debug\"", "tracing_level: \"\"");
        let mut cfg = parse(&yaml);
        cfg.validate().expect("validate");
        assert_eq!(cfg.logging.level(), Some(Level::INFO));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = StatsConfig::from_path("does/not/exist.yaml").expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), Path::new("does/not/exist.yaml"));
    }
}
