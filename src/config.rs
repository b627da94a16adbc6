use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Model artifact locations
    pub artifacts: ArtifactsConfig,

    /// State backend configuration
    pub state: StateConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: TRIAGE_)
            .add_source(
                config::Environment::with_prefix("TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Where the six trained artifact files live.
///
/// Per stage: a vectorizer (vocabulary + idf), a one-vs-rest classifier
/// (weights + intercepts) and the multi-label binarizer classes. All three are
/// exported to JSON by the training pipeline and loaded exactly once at
/// process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Base directory for artifact files
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,

    /// Ministry stage artifacts
    #[serde(default = "default_ministry_artifacts")]
    pub ministry: StageArtifactConfig,

    /// Department stage artifacts
    #[serde(default = "default_department_artifacts")]
    pub department: StageArtifactConfig,
}

impl ArtifactsConfig {
    /// Resolve a stage's file names against the base directory
    pub fn stage_paths(&self, stage: &StageArtifactConfig) -> StageArtifactPaths {
        StageArtifactPaths {
            vectorizer: self.dir.join(&stage.vectorizer),
            model: self.dir.join(&stage.model),
            labels: self.dir.join(&stage.labels),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageArtifactConfig {
    pub vectorizer: String,
    pub model: String,
    pub labels: String,
}

/// Absolute paths for one stage's artifact triple
#[derive(Debug, Clone)]
pub struct StageArtifactPaths {
    pub vectorizer: PathBuf,
    pub model: PathBuf,
    pub labels: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// State backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database (sled)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    #[default]
    Memory,
    Sled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_ministry_artifacts() -> StageArtifactConfig {
    StageArtifactConfig {
        vectorizer: "vectorizer_ministry.json".to_string(),
        model: "model_ministry.json".to_string(),
        labels: "mlb_ministry.json".to_string(),
    }
}

fn default_department_artifacts() -> StageArtifactConfig {
    StageArtifactConfig {
        vectorizer: "vectorizer_department.json".to_string(),
        model: "model_department.json".to_string(),
        labels: "mlb_department.json".to_string(),
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "complaint-triage".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
    }

    #[test]
    fn test_default_state_backend() {
        assert_eq!(StateBackend::default(), StateBackend::Memory);
    }

    #[test]
    fn test_stage_paths_resolution() {
        let artifacts = ArtifactsConfig {
            dir: PathBuf::from("/opt/models"),
            ministry: default_ministry_artifacts(),
            department: default_department_artifacts(),
        };

        let paths = artifacts.stage_paths(&artifacts.ministry);
        assert_eq!(
            paths.vectorizer,
            PathBuf::from("/opt/models/vectorizer_ministry.json")
        );
        assert_eq!(paths.model, PathBuf::from("/opt/models/model_ministry.json"));
        assert_eq!(paths.labels, PathBuf::from("/opt/models/mlb_ministry.json"));
    }
}
