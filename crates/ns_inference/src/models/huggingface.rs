use std::fmt;

use ns_core::{Error, GenerationParams, Result, SummarizationModel};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Config;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";

const WARMUP_TEXT: &str = "Правительство утвердило новый бюджет на следующий год.";

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
    use_cache: bool,
}

#[derive(Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

#[derive(Deserialize)]
struct EndpointError {
    error: String,
}

/// Summarization pipeline served by a Hugging Face inference endpoint.
pub struct HuggingFaceModel {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    label: String,
}

impl fmt::Debug for HuggingFaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceModel")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("label", &self.label)
            .finish()
    }
}

/// `{base}/models/{model}` with exactly one slash between the parts.
pub fn endpoint_url(base: &str, model_name: &str) -> Result<Url> {
    let base = format!("{}/", base.trim_end_matches('/'));
    Url::parse(&base)
        .and_then(|url| url.join(&format!("models/{}", model_name)))
        .map_err(|e| Error::EngineLoad(format!("Invalid model URL {}: {}", base, e)))
}

impl HuggingFaceModel {
    /// Binds to the configured model and runs one warm-up generation so a
    /// missing model or unreachable endpoint surfaces at load time.
    pub async fn new(config: &Config) -> Result<Self> {
        let endpoint = endpoint_url(
            config.model_url.as_deref().unwrap_or(DEFAULT_ENDPOINT),
            &config.model_name,
        )?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::EngineLoad(format!("Failed to build HTTP client: {}", e)))?;

        let model = Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            label: config.model_label().to_string(),
        };

        model
            .generate(WARMUP_TEXT, &GenerationParams::from_char_budget(90))
            .await
            .map_err(|e| {
                Error::EngineLoad(format!(
                    "Model {} is not available at {}: {}",
                    config.model_name,
                    model.endpoint,
                    e.detail()
                ))
            })?;
        tracing::debug!("Warm-up generation succeeded on {}", model.endpoint);

        Ok(model)
    }

    async fn generate(&self, text: &str, params: &GenerationParams) -> Result<String> {
        let request = SummarizationRequest {
            inputs: text,
            parameters: params,
            options: RequestOptions {
                wait_for_model: true,
                use_cache: false,
            },
        };

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Inference(describe_failure(status, &body)));
        }

        let outputs: Vec<SummarizationOutput> = serde_json::from_str(&body)?;
        outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text.trim().to_string())
            .ok_or_else(|| Error::Inference("endpoint returned no summary".to_string()))
    }
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<EndpointError>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    format!("endpoint returned {}: {}", status, message)
}

#[async_trait::async_trait]
impl SummarizationModel for HuggingFaceModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String> {
        self.generate(text, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let url = endpoint_url(DEFAULT_ENDPOINT, ns_core::DEFAULT_MODEL).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api-inference.huggingface.co/models/IlyaGusev/rut5_base_sum_gazeta"
        );

        let url = endpoint_url("http://localhost:8080/hf/", "m").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/hf/models/m");

        assert!(endpoint_url("not a url", "m").is_err());
    }

    #[test]
    fn test_request_shape() {
        let params = GenerationParams::from_char_budget(120);
        let request = SummarizationRequest {
            inputs: "текст",
            parameters: &params,
            options: RequestOptions {
                wait_for_model: true,
                use_cache: false,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["inputs"], "текст");
        assert_eq!(value["parameters"]["max_length"], 40);
        assert_eq!(value["parameters"]["min_length"], 20);
        assert_eq!(value["parameters"]["do_sample"], false);
    }

    #[test]
    fn test_describe_failure() {
        let message = describe_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error": "Model is currently loading"}"#,
        );
        assert_eq!(message, "endpoint returned 503 Service Unavailable: Model is currently loading");

        let message = describe_failure(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(message.ends_with("upstream down"));
    }
}
