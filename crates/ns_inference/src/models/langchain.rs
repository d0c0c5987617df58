use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use langchain_rust::language_models::llm::LLM;
use langchain_rust::llm::client::GenerationOptions;
use langchain_rust::llm::ollama::client::{Ollama, OllamaClient};
use ns_core::{Error, GenerationParams, Result, SummarizationModel};
use url::Url;

use crate::Config;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "gemma3:12b";

#[derive(Debug)]
pub struct LangChainModelConfig {
    ollama_host: String,
    ollama_port: u16,
    model_name: String,
}

impl LangChainModelConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        let raw = config.model_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
        let url = Url::parse(raw)
            .map_err(|e| Error::EngineLoad(format!("Invalid Ollama URL {}: {}", raw, e)))?;

        // The pretrained summarizer id means nothing to Ollama
        let model_name = if config.model_name == ns_core::DEFAULT_MODEL {
            DEFAULT_OLLAMA_MODEL.to_string()
        } else {
            config.model_name.clone()
        };

        Ok(Self {
            ollama_host: format!("{}://{}", url.scheme(), url.host_str().unwrap_or("localhost")),
            ollama_port: url.port().unwrap_or(11434),
            model_name,
        })
    }
}

pub struct LangChainModel {
    client: Arc<OllamaClient>,
    model_name: String,
}

impl fmt::Debug for LangChainModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangChainModel")
            .field("ollama_client", &"<Ollama>")
            .field("model_name", &self.model_name)
            .finish()
    }
}

fn prompt(text: &str, params: &GenerationParams) -> String {
    format!(
        "Кратко перескажи следующую новость на русском языке, не менее {} и не более {} слов. \
         Ответь только пересказом.\n\n{}",
        params.min_length, params.max_length, text
    )
}

impl LangChainModel {
    pub async fn new(config: &Config) -> Result<Self> {
        let model_config = LangChainModelConfig::from_config(config)?;
        let client = Arc::new(OllamaClient::new(
            model_config.ollama_host.clone(),
            model_config.ollama_port,
        ));
        let model = Self {
            client,
            model_name: model_config.model_name,
        };

        // Check if Ollama is available by making a test request
        model.llm(&GenerationParams::from_char_budget(30)).invoke("test").await.map_err(|e| {
            Error::EngineLoad(format!(
                "Ollama is not available at {}:{}: {}. Please ensure Ollama is running and the model '{}' is installed.",
                model_config.ollama_host, model_config.ollama_port, e, model.model_name
            ))
        })?;

        Ok(model)
    }

    fn llm(&self, params: &GenerationParams) -> Ollama {
        let options = GenerationOptions::default()
            .temperature(0.0)
            .seed(0)
            .num_predict(params.max_length as i32);
        Ollama::new(self.client.clone(), self.model_name.clone(), Some(options))
    }
}

#[async_trait::async_trait]
impl SummarizationModel for LangChainModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String> {
        let response = self
            .llm(params)
            .invoke(&prompt(text, params))
            .await
            .map_err(|e| Error::External(anyhow!("Failed to generate summary: {}", e)))?;
        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_url() {
        let config = Config {
            model_url: Some("http://gpu-box:11500".to_string()),
            ..Config::default()
        };
        let model_config = LangChainModelConfig::from_config(&config).unwrap();
        assert_eq!(model_config.ollama_host, "http://gpu-box");
        assert_eq!(model_config.ollama_port, 11500);
        assert_eq!(model_config.model_name, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_prompt_carries_budget() {
        let params = GenerationParams::from_char_budget(150);
        let text = prompt("Новость.", &params);
        assert!(text.contains("не более 50 слов"));
        assert!(text.ends_with("Новость."));
    }
}
