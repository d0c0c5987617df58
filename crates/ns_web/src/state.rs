use std::sync::Arc;

use ns_core::ServiceInfo;
use ns_inference::{InferenceEngine, SummarizationService};

pub struct AppState {
    pub service: SummarizationService,
    pub info: ServiceInfo,
}

impl AppState {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self {
            service: SummarizationService::new(engine),
            info: ServiceInfo::default(),
        }
    }
}
