//! Runtime configuration for the concierge binary.
//!
//! Values come from an optional TOML file (named by `TRAVEL_CONCIERGE_CONFIG`)
//! and are then overridden by environment variables. A missing file is not an
//! error; the defaults describe a local Ollama install.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Env var naming the TOML configuration file.
pub const CONFIG_ENV: &str = "TRAVEL_CONCIERGE_CONFIG";
/// Env var naming a profile document that replaces the bundled default.
pub const SCENARIO_ENV: &str = "TRAVEL_CONCIERGE_SCENARIO";
/// Env var overriding the model name.
pub const MODEL_ENV: &str = "TRAVEL_CONCIERGE_MODEL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConciergeConfig {
    /// Application name sessions are created under.
    pub app_name: String,
    /// User the interactive session belongs to.
    pub user_id: String,
    /// Ollama model name, e.g. "llama3.2" or "qwen3:8b".
    pub model: String,
    pub ollama_host: String,
    pub ollama_port: u16,
    /// Upper bound of LLM round-trips per turn.
    pub max_iterations: usize,
    /// Profile document seeding session state. `None` uses the bundled default.
    pub scenario_path: Option<PathBuf>,
    /// Instruction prompt file. `None` uses the bundled prompt.
    pub instruction_path: Option<PathBuf>,
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            app_name: "multi_tool_agent".to_string(),
            user_id: "student".to_string(),
            model: crate::llm::ollama::DEFAULT_MODEL.to_string(),
            ollama_host: "http://localhost".to_string(),
            ollama_port: 11434,
            max_iterations: 10,
            scenario_path: None,
            instruction_path: None,
        }
    }
}

impl ConciergeConfig {
    /// Load from the process environment: the file named by
    /// [`CONFIG_ENV`] (if any), then env overrides, then validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Same as [`ConciergeConfig::from_env`] with an injectable variable lookup.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config found at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(path) = non_blank(SCENARIO_ENV) {
            self.scenario_path = Some(PathBuf::from(path));
        }
        if let Some(model) = non_blank(MODEL_ENV) {
            self.model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingConfig("model".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ConciergeConfig::resolve(env(&[])).unwrap();
        assert_eq!(config, ConciergeConfig::default());
        assert_eq!(config.user_id, "student");
        assert_eq!(config.app_name, "multi_tool_agent");
    }

    #[test]
    fn file_values_then_env_overrides() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("concierge.toml");
        std::fs::write(
            &path,
            r#"
model = "qwen3:8b"
max_iterations = 4
scenario_path = "/from/file.json"
"#,
        )
        .unwrap();

        let config = ConciergeConfig::resolve(env(&[
            (CONFIG_ENV, path.to_str().unwrap()),
            (SCENARIO_ENV, "/from/env.json"),
        ]))
        .unwrap();
        assert_eq!(config.model, "qwen3:8b");
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.scenario_path, Some(PathBuf::from("/from/env.json")));
        assert_eq!(config.ollama_port, 11434);
    }

    #[test]
    fn blank_scenario_is_ignored() {
        let config = ConciergeConfig::resolve(env(&[(SCENARIO_ENV, "   ")])).unwrap();
        assert!(config.scenario_path.is_none());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ConciergeConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config, ConciergeConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "this is not { valid toml").unwrap();
        let err = ConciergeConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = ConciergeConfig {
            max_iterations: 0,
            ..ConciergeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));
    }
}
