use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use ns_core::{Error, GenerationParams, Result, SummarizationModel};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::device::Device;
use crate::{models, Config};

/// Lifecycle of the engine. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    Loading = 0,
    Ready = 1,
    Failed = 2,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineState::Ready,
            2 => EngineState::Failed,
            _ => EngineState::Loading,
        }
    }
}

/// Owns the loaded summarization model and the device it runs on.
pub struct InferenceEngine {
    state: AtomicU8,
    load_started: AtomicBool,
    model: OnceLock<Arc<dyn SummarizationModel>>,
    device: OnceLock<Device>,
    failure: OnceLock<String>,
    // Held for the duration of a generation when the model is not reentrant
    gate: Mutex<()>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("state", &self.state())
            .field("device", &self.device.get())
            .field("model", &self.model_name())
            .finish()
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(EngineState::Loading as u8),
            load_started: AtomicBool::new(false),
            model: OnceLock::new(),
            device: OnceLock::new(),
            failure: OnceLock::new(),
            gate: Mutex::new(()),
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    pub fn device(&self) -> Option<Device> {
        self.device.get().copied()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.get().map(|model| model.name())
    }

    /// Cause of the load failure, once the engine is `Failed`.
    pub fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }

    /// Selects a device and builds the configured model. Runs at most once.
    pub async fn load(&self, config: &Config) -> Result<()> {
        self.load_with(async {
            let device = Device::select(config.device)?;
            info!("🖥️ Using device: {}", device);
            let _ = self.device.set(device);
            models::create_model(config, device).await
        })
        .await
    }

    /// Runs `loader` as the one and only load attempt.
    pub async fn load_with<F>(&self, loader: F) -> Result<()>
    where
        F: Future<Output = Result<Arc<dyn SummarizationModel>>>,
    {
        if self
            .load_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::EngineLoad("model load was already attempted".to_string()));
        }

        info!("🧠 Loading summarization model...");
        let outcome = match AssertUnwindSafe(loader).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::EngineLoad("model loader panicked".to_string())),
        };

        match outcome {
            Ok(model) => {
                info!("✨ Model loaded successfully ({})", model.name());
                let _ = self.model.set(model);
                self.state.store(EngineState::Ready as u8, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                let cause = e.detail();
                error!("❌ Failed to load model: {}", cause);
                let _ = self.failure.set(cause.clone());
                self.state.store(EngineState::Failed as u8, Ordering::Release);
                Err(Error::EngineLoad(cause))
            }
        }
    }

    /// Starts the load on the runtime and returns immediately.
    pub fn spawn_load(self: &Arc<Self>, config: Config) -> JoinHandle<Result<()>> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.load(&config).await })
    }

    /// The loaded model, or `ServiceUnavailable` unless the engine is `Ready`.
    pub fn ready_model(&self) -> Result<Arc<dyn SummarizationModel>> {
        match self.state() {
            EngineState::Ready => self.model.get().cloned().ok_or_else(|| {
                Error::ServiceUnavailable("model is not loaded".to_string())
            }),
            EngineState::Loading => Err(Error::ServiceUnavailable(
                "model is still loading, try again later".to_string(),
            )),
            EngineState::Failed => Err(Error::ServiceUnavailable(
                "model failed to load, service is unavailable".to_string(),
            )),
        }
    }

    /// Summarizes `text` within a character budget. Failures of the model are
    /// reported as `Inference` errors and leave the engine `Ready`.
    pub async fn summarize(&self, text: &str, max_chars: usize) -> Result<String> {
        let model = self.ready_model()?;
        if text.trim().is_empty() {
            return Err(Error::Inference("input text is empty".to_string()));
        }

        let params = GenerationParams::from_char_budget(max_chars);
        let _guard = if model.is_reentrant() {
            None
        } else {
            Some(self.gate.lock().await)
        };

        debug!(
            "Generating summary: max_length={} min_length={}",
            params.max_length, params.min_length
        );
        match AssertUnwindSafe(model.summarize(text, &params)).catch_unwind().await {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(e)) => Err(Error::Inference(e.detail())),
            Err(_) => Err(Error::Inference("model panicked during generation".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Debug)]
    struct EchoModel;

    #[async_trait::async_trait]
    impl SummarizationModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String> {
            Ok(text.split_whitespace().take(params.max_length).collect::<Vec<_>>().join(" "))
        }
    }

    #[derive(Debug)]
    struct FlakyModel;

    #[async_trait::async_trait]
    impl SummarizationModel for FlakyModel {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn summarize(&self, text: &str, _params: &GenerationParams) -> Result<String> {
            if text.contains("boom") {
                return Err(Error::Inference("cannot tokenize input".to_string()));
            }
            if text.contains("panic") {
                panic!("numerical failure");
            }
            Ok("ok".to_string())
        }
    }

    #[derive(Debug, Default)]
    struct CountingModel {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SummarizationModel for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        async fn summarize(&self, _text: &str, _params: &GenerationParams) -> Result<String> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok("done".to_string())
        }
    }

    async fn ready_engine(model: Arc<dyn SummarizationModel>) -> InferenceEngine {
        let engine = InferenceEngine::new();
        engine.load_with(async move { Ok(model) }).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_starts_loading_and_refuses_work() {
        let engine = InferenceEngine::new();
        assert_eq!(engine.state(), EngineState::Loading);
        let err = engine.summarize("some text", 100).await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_successful_load_is_ready() {
        let engine = ready_engine(Arc::new(EchoModel)).await;
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.model_name(), Some("echo"));
        assert!(engine.failure().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_is_terminal() {
        let engine = InferenceEngine::new();
        let err = engine
            .load_with(async { Err(Error::EngineLoad("weights not found".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EngineLoad(_)));
        assert_eq!(engine.state(), EngineState::Failed);
        assert_eq!(engine.failure(), Some("weights not found"));

        // No second attempt, even with a working loader
        let err = engine
            .load_with(async { Ok(Arc::new(EchoModel) as Arc<dyn SummarizationModel>) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EngineLoad(_)));
        assert_eq!(engine.state(), EngineState::Failed);

        let err = engine.summarize("some text", 100).await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_loader_panic_becomes_failed_state() {
        let engine = InferenceEngine::new();
        let result = engine
            .load_with(async {
                if true {
                    panic!("out of memory");
                }
                Ok(Arc::new(EchoModel) as Arc<dyn SummarizationModel>)
            })
            .await;
        assert!(matches!(result, Err(Error::EngineLoad(_))));
        assert_eq!(engine.state(), EngineState::Failed);
    }

    #[tokio::test]
    async fn test_ready_engine_cannot_reload() {
        let engine = ready_engine(Arc::new(EchoModel)).await;
        let result = engine
            .load_with(async { Err(Error::EngineLoad("late failure".to_string())) })
            .await;
        assert!(result.is_err());
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn test_word_budget_reaches_model() {
        let engine = ready_engine(Arc::new(EchoModel)).await;
        let text = (0..200).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");

        let summary = engine.summarize(&text, 30).await.unwrap();
        assert_eq!(summary.split_whitespace().count(), 10);

        let summary = engine.summarize(&text, 300).await.unwrap();
        assert_eq!(summary.split_whitespace().count(), 100);
    }

    #[tokio::test]
    async fn test_empty_text_is_inference_error() {
        let engine = ready_engine(Arc::new(EchoModel)).await;
        let err = engine.summarize("   ", 100).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn test_failures_do_not_degrade_engine() {
        let engine = ready_engine(Arc::new(FlakyModel)).await;

        let err = engine.summarize("boom", 100).await.unwrap_err();
        assert!(matches!(err, Error::Inference(ref cause) if cause == "cannot tokenize input"));
        assert_eq!(engine.state(), EngineState::Ready);

        let err = engine.summarize("panic", 100).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert_eq!(engine.state(), EngineState::Ready);

        assert_eq!(engine.summarize("fine", 100).await.unwrap(), "ok");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_non_reentrant_model_is_serialized() {
        let model = Arc::new(CountingModel::default());
        let engine = Arc::new(ready_engine(model.clone()).await);

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move { engine.summarize("text", 100).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "done");
        }
        assert_eq!(model.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawn_load_with_lead_backend() {
        let engine = Arc::new(InferenceEngine::new());
        let config = Config {
            backend: crate::Backend::Lead,
            device: crate::DevicePreference::Cpu,
            ..Config::default()
        };
        engine.spawn_load(config).await.unwrap().unwrap();
        assert!(engine.is_ready());
        assert_eq!(engine.device(), Some(Device::Cpu));
    }
}
