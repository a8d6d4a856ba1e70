use devspace_engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Container engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Workspace image not found: {image}")]
    ImageMissing { image: String },

    /// Any other engine failure, with the engine's own message.
    #[error("{0}")]
    Engine(String),

    #[error("Port allocation failed: {0:#}")]
    PortAllocation(anyhow::Error),

    #[error("Failed to prepare workspace volume {}: {source}", .path.display())]
    Volume {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<EngineError> for OrchestratorError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unreachable(reason) => OrchestratorError::EngineUnavailable(reason),
            EngineError::ImageMissing(image) => OrchestratorError::ImageMissing { image },
            other => OrchestratorError::Engine(other.to_string()),
        }
    }
}
