use std::sync::Arc;
use std::time::Instant;

use ns_core::{
    Error, HealthStatus, MetricsCalculator, Result, SummarizeRequest, SummarizeResponse,
};
use tracing::{info, warn};

use crate::engine::InferenceEngine;

/// Validates requests, drives the engine and assembles responses.
#[derive(Debug, Clone)]
pub struct SummarizationService {
    engine: Arc<InferenceEngine>,
}

impl SummarizationService {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<InferenceEngine> {
        &self.engine
    }

    /// Reports readiness from the engine state alone; never waits on inference.
    pub fn health_check(&self) -> HealthStatus {
        HealthStatus::new(self.engine.is_ready())
    }

    pub async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeResponse> {
        request.validate()?;
        let model = self.engine.ready_model()?;
        let max_length = request.max_length() as usize;

        let start = Instant::now();
        let summary = self
            .engine
            .summarize(&request.text, max_length)
            .await
            .map_err(|e| match e {
                Error::Inference(cause) => {
                    warn!("⚠️ Summarization failed: {}", cause);
                    Error::Processing(format!("Error while processing text: {}", cause))
                }
                other => other,
            })?;

        let metrics = MetricsCalculator::compute(&request.text, &summary, start.elapsed());
        info!(
            "📝 Summarized {} chars into {} chars (x{:.2}) in {:.3}s",
            metrics.original_length,
            metrics.summary_length,
            metrics.compression_ratio,
            metrics.processing_time_seconds
        );

        Ok(SummarizeResponse::new(summary, metrics, model.name()))
    }
}
