//! Model parameters and their configuration loading
//!
//! Parameters come from a named block of a YAML document:
//!
//! ```yaml
//! default:
//!   model: gpt-4o-mini
//!   temperature: 0.7
//! creative_writing:
//!   model: gpt-4o
//!   temperature: 1.2
//! ```
//!
//! Selected fields can then be overridden with [`ParamOverrides`].

use crate::error::{Error, Result};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Block loaded when no profile name is given
pub const DEFAULT_PROFILE: &str = "default";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_n() -> u32 {
    1
}

/// Generation parameters shared by every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Model identifier, must be present in the price table
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Stop sequences
    #[serde(default)]
    pub stop: Option<Vec<String>>,
    /// Number of completions to generate
    #[serde(default = "default_n")]
    pub n: u32,
    /// Streaming flag (accepted, responses are always returned whole)
    #[serde(default)]
    pub stream: bool,
    /// Number of top log probabilities to return
    #[serde(default)]
    pub logprobs: Option<u32>,
    /// Echo flag from legacy completion APIs
    #[serde(default)]
    pub echo: bool,
    /// End-user identifier forwarded to the vendor
    #[serde(default)]
    pub user: Option<String>,
    /// Nucleus sampling
    #[serde(default)]
    pub top_p: Option<f32>,
    /// Top-k sampling
    #[serde(default)]
    pub top_k: Option<f32>,
    /// Frequency penalty
    #[serde(default)]
    pub frequency_penalty: f32,
    /// Presence penalty
    #[serde(default)]
    pub presence_penalty: f32,
}

impl ModelParams {
    /// Parameters for `model` with every other field at its default
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stop: None,
            n: 1,
            stream: false,
            logprobs: None,
            echo: false,
            user: None,
            top_p: None,
            top_k: None,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }

    /// Load block `name` from a YAML file
    ///
    /// # Errors
    /// `MissingConfig` if the block is absent, `InvalidConfig` if the file
    /// cannot be read or the block does not describe valid parameters
    pub fn load(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let config = Config::builder()
            .add_source(File::new(&source_name, FileFormat::Yaml))
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Self::from_config(&config, name, &source_name)
    }

    /// Load block `name` from an in-memory YAML document
    ///
    /// # Errors
    /// Same as [`ModelParams::load`]
    pub fn from_yaml_str(yaml: &str, name: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Self::from_config(&config, name, "embedded defaults")
    }

    fn from_config(config: &Config, name: &str, source_name: &str) -> Result<Self> {
        let block = match config.get::<config::Value>(name) {
            Ok(block) => block,
            Err(ConfigError::NotFound(_)) => {
                return Err(Error::MissingConfig {
                    name: name.to_string(),
                    source_name: source_name.to_string(),
                })
            }
            Err(e) => return Err(Error::InvalidConfig(e.to_string())),
        };

        let params: Self = block
            .try_deserialize()
            .map_err(|e| Error::InvalidConfig(format!("{name}: {e}")))?;
        params.validate()?;

        info!(profile = name, model = %params.model, "Loaded LLM parameters");
        Ok(params)
    }

    /// Apply overrides on top of these parameters
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the result fails validation
    pub fn with_overrides(mut self, overrides: &ParamOverrides) -> Result<Self> {
        let o = overrides.clone();
        if let Some(model) = o.model {
            self.model = model;
        }
        if let Some(temperature) = o.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = o.max_tokens {
            self.max_tokens = max_tokens;
        }
        if o.stop.is_some() {
            self.stop = o.stop;
        }
        if let Some(n) = o.n {
            self.n = n;
        }
        if let Some(stream) = o.stream {
            self.stream = stream;
        }
        if o.logprobs.is_some() {
            self.logprobs = o.logprobs;
        }
        if let Some(echo) = o.echo {
            self.echo = echo;
        }
        if o.user.is_some() {
            self.user = o.user;
        }
        if o.top_p.is_some() {
            self.top_p = o.top_p;
        }
        if o.top_k.is_some() {
            self.top_k = o.top_k;
        }
        if let Some(penalty) = o.frequency_penalty {
            self.frequency_penalty = penalty;
        }
        if let Some(penalty) = o.presence_penalty {
            self.presence_penalty = penalty;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::InvalidConfig("model must not be empty".to_string()));
        }
        if self.n == 0 {
            return Err(Error::InvalidConfig("n must be at least 1".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(Error::InvalidConfig(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        if self.temperature.is_nan() || self.temperature < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "temperature must be non-negative, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Per-field overrides applied after a profile is loaded
#[derive(Debug, Clone, Default)]
pub struct ParamOverrides {
    /// Model identifier
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
    /// Number of completions
    pub n: Option<u32>,
    /// Streaming flag
    pub stream: Option<bool>,
    /// Top log probabilities
    pub logprobs: Option<u32>,
    /// Echo flag
    pub echo: Option<bool>,
    /// End-user identifier
    pub user: Option<String>,
    /// Nucleus sampling
    pub top_p: Option<f32>,
    /// Top-k sampling
    pub top_k: Option<f32>,
    /// Frequency penalty
    pub frequency_penalty: Option<f32>,
    /// Presence penalty
    pub presence_penalty: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
default:
  model: gpt-4o-mini
  temperature: 0.7
  max_tokens: 512
creative_writing:
  model: gpt-4o
  temperature: 1.2
  top_p: 0.95
  presence_penalty: 0.6
  stop: ["THE END"]
  n: 2
broken:
  model: gpt-4o
  n: 0
"#;

    #[test]
    fn test_defaults() {
        let params = ModelParams::new("gpt-4o");
        assert_eq!(params.temperature, 1.0);
        assert_eq!(params.max_tokens, 1024);
        assert_eq!(params.n, 1);
        assert!(!params.stream);
        assert!(!params.echo);
        assert_eq!(params.frequency_penalty, 0.0);
        assert!(params.stop.is_none());
    }

    #[test]
    fn test_load_named_blocks() {
        let default = ModelParams::from_yaml_str(YAML, "default").unwrap();
        assert_eq!(default.model, "gpt-4o-mini");
        assert_eq!(default.max_tokens, 512);
        assert_eq!(default.n, 1);

        let creative = ModelParams::from_yaml_str(YAML, "creative_writing").unwrap();
        assert_eq!(creative.model, "gpt-4o");
        assert_eq!(creative.top_p, Some(0.95));
        assert_eq!(creative.stop, Some(vec!["THE END".to_string()]));
        assert_eq!(creative.n, 2);
        assert_eq!(creative.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_missing_block() {
        let err = ModelParams::from_yaml_str(YAML, "code_generation").unwrap_err();
        assert!(matches!(err, Error::MissingConfig { ref name, .. } if name == "code_generation"));
    }

    #[test]
    fn test_invalid_block() {
        let err = ModelParams::from_yaml_str(YAML, "broken").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let params = ModelParams::load(file.path(), "creative_writing").unwrap();
        assert_eq!(params.presence_penalty, 0.6);

        let err = ModelParams::load(file.path(), "nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_overrides() {
        let params = ModelParams::from_yaml_str(YAML, "default").unwrap();
        let overrides = ParamOverrides {
            model: Some("gpt-4o".to_string()),
            temperature: Some(0.0),
            user: Some("student-42".to_string()),
            ..Default::default()
        };

        let params = params.with_overrides(&overrides).unwrap();
        assert_eq!(params.model, "gpt-4o");
        assert_eq!(params.temperature, 0.0);
        assert_eq!(params.user.as_deref(), Some("student-42"));
        assert_eq!(params.max_tokens, 512);
    }

    #[test]
    fn test_overrides_validated() {
        let overrides = ParamOverrides {
            n: Some(0),
            ..Default::default()
        };
        assert!(ModelParams::new("gpt-4o").with_overrides(&overrides).is_err());
    }
}
