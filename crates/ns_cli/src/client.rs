use std::time::Duration;

use anyhow::{Context, Result};
use ns_core::{HealthStatus, SummarizeRequest, SummarizeResponse};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(30);

/// Local statistics shown before a text is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub sentences: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            sentences: text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count(),
        }
    }
}

#[derive(Debug)]
pub enum SummarizeOutcome {
    Success(SummarizeResponse),
    Unavailable(String),
    Failed { status: StatusCode, body: String },
}

#[derive(Deserialize)]
struct Detail {
    detail: String,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Could not connect to API at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("API unavailable, status code: {}", status);
        }
        Ok(response.json::<HealthStatus>().await?)
    }

    pub async fn summarize(&self, text: &str, max_length: i64) -> Result<SummarizeOutcome> {
        let request = SummarizeRequest::new(text, Some(max_length));
        let response = self
            .client
            .post(format!("{}/summarize", self.base_url))
            .json(&request)
            .timeout(SUMMARIZE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out. The model may still be loading or the text is too long.")
                } else {
                    anyhow::anyhow!("Request to {} failed: {}", self.base_url, e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;
        let outcome = match status {
            StatusCode::OK => SummarizeOutcome::Success(serde_json::from_str(&body)?),
            StatusCode::SERVICE_UNAVAILABLE => SummarizeOutcome::Unavailable(
                serde_json::from_str::<Detail>(&body)
                    .map(|d| d.detail)
                    .unwrap_or(body),
            ),
            _ => SummarizeOutcome::Failed { status, body },
        };
        Ok(outcome)
    }
}

/// Renders a successful response for the terminal.
pub fn render_summary(response: &SummarizeResponse) -> String {
    let reduction = if response.compression_ratio > 0.0 {
        100.0 - 100.0 / response.compression_ratio
    } else {
        0.0
    };
    let model: String = response
        .model_identifier
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .chars()
        .take(10)
        .collect();

    format!(
        "{}\n\nCompression ratio: {:.1}x\nProcessing time:   {:.2}s\nText reduction:    {:.0}%\nModel:             {}",
        response.summary,
        response.compression_ratio,
        response.processing_time_seconds,
        reduction,
        model
    )
}

/// Full response as pretty JSON, with the same field names the API uses.
pub fn render_details(response: &SummarizeResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

pub fn render_stats(stats: &TextStats) -> String {
    format!(
        "Characters: {}  Words: {}  Sentences: {}",
        stats.characters, stats.words, stats.sentences
    )
}
