use std::sync::Arc;

use ns_core::{Error, Result, SummarizationModel};
use tracing::info;

use crate::device::Device;
use crate::{Backend, Config};

pub mod huggingface;
#[cfg(feature = "ollama")]
pub mod langchain;
pub mod lead;

pub use huggingface::HuggingFaceModel;
pub use lead::{LeadModel, LEAD_LABEL};

/// Builds the model for `config` on `device`. Any error here is a load failure.
pub async fn create_model(config: &Config, device: Device) -> Result<Arc<dyn SummarizationModel>> {
    if !config.backend.runs_locally() && device.is_accelerator() {
        info!(
            "ℹ️ {} backend generates on its own server; local {} stays unused",
            config.backend, device
        );
    }
    let model: Arc<dyn SummarizationModel> = match config.backend {
        Backend::HuggingFace => Arc::new(HuggingFaceModel::new(config).await?),
        Backend::Lead => Arc::new(LeadModel::new(LEAD_LABEL)),
        #[cfg(feature = "ollama")]
        Backend::Ollama => Arc::new(langchain::LangChainModel::new(config).await?),
        #[cfg(not(feature = "ollama"))]
        Backend::Ollama => {
            return Err(Error::EngineLoad(
                "ollama backend requires building with the `ollama` feature".to_string(),
            ))
        }
    };
    Ok(model)
}
