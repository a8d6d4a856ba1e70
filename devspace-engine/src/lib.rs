//! Container engine adapter.
//!
//! The lifecycle controller only ever talks to a container runtime through the
//! narrow [`ContainerEngine`] capability. The runtime itself stays external; the
//! Docker implementation drives the `docker` CLI.

pub mod container;
pub mod docker;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub use container::{BindMount, Container, ContainerSpec, RestartPolicy};
pub use docker::DockerEngine;
pub use error::{EngineError, Result};

/// Operations the lifecycle controller needs from a container runtime.
///
/// Calls block on the runtime; callers that need a deadline run them on a
/// blocking pool.
pub trait ContainerEngine: Send + Sync {
    /// Looks a container up by exact name. `Ok(None)` when it does not exist.
    fn find(&self, name: &str) -> Result<Option<Container>>;

    /// Creates (but does not start) a container.
    fn create(&self, spec: &ContainerSpec) -> Result<Container>;

    fn start(&self, container: &Container) -> Result<()>;

    /// Host port bound to `internal_port/tcp`, if the engine reports one.
    fn inspect_port_binding(&self, container: &Container, internal_port: u16)
        -> Result<Option<u16>>;
}

/// Handle the controller is constructed with.
///
/// `Unreachable` means no connection could be established when the service
/// started; every workspace request short-circuits on it.
#[derive(Clone)]
pub enum EngineAdapter {
    Connected(Arc<dyn ContainerEngine>),
    Unreachable { reason: String },
}

impl EngineAdapter {
    pub fn connected<E>(engine: E) -> Self
    where
        E: ContainerEngine + 'static,
    {
        EngineAdapter::Connected(Arc::new(engine))
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        EngineAdapter::Unreachable {
            reason: reason.into(),
        }
    }

    /// Probes the Docker daemon once through `binary` and wraps the result.
    pub fn docker(binary: &str) -> Self {
        match DockerEngine::connect(binary) {
            Ok(engine) => Self::connected(engine),
            Err(e) => {
                warn!("Docker not available: {}", e);
                Self::unreachable(e.to_string())
            }
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, EngineAdapter::Connected(_))
    }
}

impl fmt::Debug for EngineAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineAdapter::Connected(_) => f.write_str("EngineAdapter::Connected"),
            EngineAdapter::Unreachable { reason } => f
                .debug_struct("EngineAdapter::Unreachable")
                .field("reason", reason)
                .finish(),
        }
    }
}
