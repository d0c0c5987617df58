pub mod error;
pub mod metrics;
pub mod models;
pub mod types;

pub use error::{Error, Result};
pub use metrics::{Metrics, MetricsCalculator};
pub use models::{GenerationParams, SummarizationModel};
pub use types::{HealthStatus, ServiceInfo, SummarizeRequest, SummarizeResponse};

/// Label of the pretrained model the service is built around.
pub const DEFAULT_MODEL: &str = "IlyaGusev/rut5_base_sum_gazeta";

/// Number of characters in `text`, counted as Unicode scalar values.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
