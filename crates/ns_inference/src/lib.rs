use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub mod device;
pub mod engine;
pub mod models;
pub mod service;

pub use device::{Device, DevicePreference};
pub use engine::{EngineState, InferenceEngine};
pub use models::create_model;
pub use ns_core::SummarizationModel;
pub use service::SummarizationService;

/// Which implementation backs the summarization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    HuggingFace,
    Lead,
    Ollama,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Backend::HuggingFace),
            "lead" => Ok(Backend::Lead),
            "ollama" => Ok(Backend::Ollama),
            other => Err(format!(
                "Unknown backend: {}. Available backends: huggingface, lead, ollama",
                other
            )),
        }
    }
}

impl Backend {
    /// Whether generation runs in this process rather than on a remote server.
    pub fn runs_locally(&self) -> bool {
        matches!(self, Backend::Lead)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::HuggingFace => "huggingface",
            Backend::Lead => "lead",
            Backend::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct Config {
    pub backend: Backend,
    pub model_name: String,
    pub model_url: Option<String>,
    pub api_key: Option<String>,
    pub device: DevicePreference,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("backend", &self.backend)
            .field("model_name", &self.model_name)
            .field("model_url", &self.model_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("device", &self.device)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model_name: ns_core::DEFAULT_MODEL.to_string(),
            model_url: None,
            api_key: None,
            device: DevicePreference::Auto,
            timeout: Duration::from_secs(120),
        }
    }
}

impl Config {
    /// Short label of the configured model, e.g. `rut5_base_sum_gazeta`.
    pub fn model_label(&self) -> &str {
        self.model_name
            .rsplit('/')
            .next()
            .filter(|label| !label.is_empty())
            .unwrap_or(self.model_name.as_str())
    }
}

pub mod prelude {
    pub use super::{Backend, Config};
    pub use super::engine::{EngineState, InferenceEngine};
    pub use super::service::SummarizationService;
    pub use ns_core::{Error, Result, SummarizeRequest, SummarizeResponse};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("huggingface".parse::<Backend>().unwrap(), Backend::HuggingFace);
        assert_eq!("HF".parse::<Backend>().unwrap(), Backend::HuggingFace);
        assert_eq!("lead".parse::<Backend>().unwrap(), Backend::Lead);
        assert_eq!("ollama".parse::<Backend>().unwrap(), Backend::Ollama);
        assert!("gpt".parse::<Backend>().is_err());
        assert_eq!(Backend::Lead.to_string(), "lead");
    }

    #[test]
    fn test_only_lead_runs_locally() {
        assert!(Backend::Lead.runs_locally());
        assert!(!Backend::HuggingFace.runs_locally());
        assert!(!Backend::Ollama.runs_locally());
    }

    #[test]
    fn test_model_label() {
        let config = Config::default();
        assert_eq!(config.model_label(), "rut5_base_sum_gazeta");

        let config = Config {
            model_name: "local-model".to_string(),
            ..Config::default()
        };
        assert_eq!(config.model_label(), "local-model");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: Some("hf_secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hf_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
