use chrono::{Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::metrics::Metrics;
use crate::{char_len, Error, Result};

pub const MIN_TEXT_LENGTH: usize = 50;
pub const MAX_TEXT_LENGTH: usize = 5000;
pub const MIN_SUMMARY_LENGTH: i64 = 30;
pub const MAX_SUMMARY_LENGTH: i64 = 300;
pub const DEFAULT_SUMMARY_LENGTH: i64 = 100;

/// A single summarization call as received from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummarizeRequest {
    /// News text to summarize
    #[schema(
        min_length = 50,
        max_length = 5000,
        example = "Россия запустила новую ракету в космос. Это важное достижение для отрасли."
    )]
    pub text: String,
    /// Desired summary length in characters
    #[serde(default)]
    #[schema(minimum = 30, maximum = 300, default = 100)]
    pub max_length: Option<i64>,
}

impl SummarizeRequest {
    pub fn new(text: impl Into<String>, max_length: Option<i64>) -> Self {
        Self {
            text: text.into(),
            max_length,
        }
    }

    /// Requested length with the default applied.
    pub fn max_length(&self) -> i64 {
        self.max_length.unwrap_or(DEFAULT_SUMMARY_LENGTH)
    }

    /// Checks the length and range bounds. Never touches the engine.
    pub fn validate(&self) -> Result<()> {
        let len = char_len(&self.text);
        if len < MIN_TEXT_LENGTH {
            return Err(Error::Validation(format!(
                "text must be at least {} characters, got {}",
                MIN_TEXT_LENGTH, len
            )));
        }
        if len > MAX_TEXT_LENGTH {
            return Err(Error::Validation(format!(
                "text must be at most {} characters, got {}",
                MAX_TEXT_LENGTH, len
            )));
        }

        let max_length = self.max_length();
        if !(MIN_SUMMARY_LENGTH..=MAX_SUMMARY_LENGTH).contains(&max_length) {
            return Err(Error::Validation(format!(
                "max_length must be between {} and {}, got {}",
                MIN_SUMMARY_LENGTH, MAX_SUMMARY_LENGTH, max_length
            )));
        }
        Ok(())
    }
}

/// Result of a successful summarization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummarizeResponse {
    /// Generated summary
    pub summary: String,
    /// Length of the input text in characters
    pub original_length: usize,
    /// Length of the summary in characters
    pub summary_length: usize,
    /// original_length / max(summary_length, 1), two decimals
    pub compression_ratio: f64,
    /// Processing time in seconds, three decimals
    #[serde(rename = "processing_time")]
    pub processing_time_seconds: f64,
    /// Label of the model that produced the summary
    #[serde(rename = "model_used")]
    pub model_identifier: String,
    /// Moment the response was assembled
    pub timestamp: String,
}

impl SummarizeResponse {
    pub fn new(summary: String, metrics: Metrics, model_identifier: impl Into<String>) -> Self {
        Self {
            summary,
            original_length: metrics.original_length,
            summary_length: metrics.summary_length,
            compression_ratio: metrics.compression_ratio,
            processing_time_seconds: metrics.processing_time_seconds,
            model_identifier: model_identifier.into(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// "healthy" or "unhealthy"
    #[schema(example = "healthy")]
    pub status: String,
    pub model_loaded: bool,
    /// ISO-8601 timestamp
    pub timestamp: String,
}

impl HealthStatus {
    pub fn new(model_loaded: bool) -> Self {
        Self {
            status: if model_loaded { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Static descriptor served at the API root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub docs: String,
    pub openapi: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            message: "Russian News Summarizer API".to_string(),
            version: "1.0.0".to_string(),
            docs: "/docs".to_string(),
            openapi: "/openapi.json".to_string(),
        }
    }
}
