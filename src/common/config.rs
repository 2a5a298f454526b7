//! Runtime configuration loaded from an optional JSON file and the environment.
//!
//! Precedence: built-in defaults, then the file named by `CSTRENGTH_CONFIG`,
//! then individual `CSTRENGTH_*` variables.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

/// Output format of the log subscriber.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(Error::Config(format!("unknown log format `{other}`"))),
        }
    }
}

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppCfg {
    /// Serialised regression artifact loaded at startup.
    pub model_path: PathBuf,
    /// Historical mixes used for descriptive statistics only.
    pub dataset_path: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `info` or `concrete_strength=debug`.
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Threads used for batch predictions.
    pub workers: usize,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./model.json"),
            dataset_path: None,
            log_filter: "info".to_string(),
            log_format: LogFormat::Json,
            workers: 4,
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Result<Self> {
        let base = match env::var_os("CSTRENGTH_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(|key| env::var(key).ok())
    }

    /// Load config from a JSON file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))?;
        let cfg: AppCfg = serde_json::from_str(&content)?;
        cfg.validate()
    }

    /// Apply `CSTRENGTH_*` overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CSTRENGTH_MODEL_PATH") {
            self.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CSTRENGTH_DATASET_PATH") {
            self.dataset_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = lookup("CSTRENGTH_LOG") {
            self.log_filter = filter;
        }
        if let Some(format) = lookup("CSTRENGTH_LOG_FORMAT") {
            self.log_format = LogFormat::parse(&format)?;
        }
        if let Some(workers) = lookup("CSTRENGTH_WORKERS") {
            self.workers = workers
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("CSTRENGTH_WORKERS=`{workers}` is not a count")))?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(Error::Config("model_path is empty".to_string()));
        }
        Ok(self)
    }
}
