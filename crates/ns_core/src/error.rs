use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Engine load error: {0}")]
    EngineLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Message without the variant prefix, suitable for a `detail` field.
    pub fn detail(&self) -> String {
        match self {
            Error::Validation(msg)
            | Error::ServiceUnavailable(msg)
            | Error::Processing(msg)
            | Error::EngineLoad(msg)
            | Error::Inference(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Whether a client may sensibly retry the same request later.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::ServiceUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
