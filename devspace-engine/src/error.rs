//! Error kinds surfaced by container engine adapters.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures an engine adapter reports back to the lifecycle controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No live connection to the container runtime.
    #[error("Container engine is unreachable: {0}")]
    Unreachable(String),

    #[error("No such container: {0}")]
    NotFound(String),

    /// The image referenced by a create request is not present in the runtime.
    #[error("Image not found: {0}")]
    ImageMissing(String),

    /// Another container already holds the requested name.
    #[error("Container name already in use: {0}")]
    NameConflict(String),

    /// Anything else; carries the runtime's raw message.
    #[error("{0}")]
    Unknown(String),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}
