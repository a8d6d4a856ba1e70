//! The `ensure workspace` state machine.
//!
//! ```text
//! Absent --create--> Created --start--> Running
//! ```
//!
//! State is derived from the engine on every call and never cached. An
//! unreachable engine bypasses the machine entirely.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn};

use devspace_engine::{
    BindMount, Container, ContainerEngine, ContainerSpec, EngineAdapter, EngineError,
    RestartPolicy,
};
use devspace_ports::PortAllocator;

use crate::error::{OrchestratorError, Result};
use crate::lock::IdentityLocks;
use crate::naming::{workspace_password, Identity, WorkspaceNamer};
use crate::url::{resolve, UrlMode};

/// Which transition the call performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspacePhase {
    AlreadyRunning,
    Started,
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredWorkspace {
    pub url: String,
    pub port: u16,
    pub phase: WorkspacePhase,
}

/// Fixed parts of every workspace container.
#[derive(Debug, Clone)]
pub struct WorkspaceTemplate {
    pub image: String,
    pub internal_port: u16,
    pub network: String,
    pub mount_target: String,
    pub credential_seed: String,
    pub restart_policy: RestartPolicy,
}

impl Default for WorkspaceTemplate {
    fn default() -> Self {
        Self {
            image: "apra-nova-code-server:latest".to_string(),
            internal_port: 8080,
            network: "apranova_network".to_string(),
            mount_target: "/home/coder/project".to_string(),
            credential_seed: "workspace".to_string(),
            restart_policy: RestartPolicy::UnlessStopped,
        }
    }
}

pub struct WorkspaceController {
    engine: EngineAdapter,
    allocator: Arc<dyn PortAllocator>,
    namer: WorkspaceNamer,
    template: WorkspaceTemplate,
    locks: Option<IdentityLocks>,
}

impl WorkspaceController {
    pub fn new(
        engine: EngineAdapter,
        allocator: Arc<dyn PortAllocator>,
        namer: WorkspaceNamer,
        template: WorkspaceTemplate,
    ) -> Self {
        Self {
            engine,
            allocator,
            namer,
            template,
            locks: None,
        }
    }

    /// Serializes the lookup-and-create path per identity inside this process.
    pub fn with_identity_locks(mut self) -> Self {
        self.locks = Some(IdentityLocks::new());
        self
    }

    pub fn engine(&self) -> &EngineAdapter {
        &self.engine
    }

    /// Makes sure `id` has exactly one running workspace and returns its address.
    pub fn ensure_workspace(&self, id: &Identity, mode: UrlMode) -> Result<EnsuredWorkspace> {
        let engine = match &self.engine {
            EngineAdapter::Connected(engine) => engine.as_ref(),
            EngineAdapter::Unreachable { reason } => {
                warn!(identity = %id, "Workspace requested but container engine is unreachable");
                return Err(OrchestratorError::EngineUnavailable(reason.clone()));
            }
        };

        let span = info_span!("ensure_workspace", identity = %id, %mode);
        let _enter = span.enter();

        let name = self.namer.container_name(id);
        if let Some(container) = engine.find(&name)? {
            return self.resume(engine, container, id, mode);
        }

        match &self.locks {
            Some(locks) => {
                let slot = locks.slot(id);
                let _guard = slot.lock().unwrap_or_else(|e| e.into_inner());

                // Another request may have created it while we waited.
                if let Some(container) = engine.find(&name)? {
                    return self.resume(engine, container, id, mode);
                }
                self.create(engine, id, mode)
            }
            None => self.create(engine, id, mode),
        }
    }

    /// Deadline-bounded variant for async callers.
    ///
    /// The blocking sequence runs on the blocking pool. When the deadline
    /// expires the caller gets an engine error; the in-flight engine call is
    /// not cancelled.
    pub async fn ensure_workspace_with_deadline(
        self: &Arc<Self>,
        id: Identity,
        mode: UrlMode,
        deadline: Duration,
    ) -> Result<EnsuredWorkspace> {
        let controller = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || controller.ensure_workspace(&id, mode));

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                error!("Workspace task failed: {}", join_err);
                Err(OrchestratorError::Engine(format!(
                    "Workspace task failed: {}",
                    join_err
                )))
            }
            Err(_) => {
                error!("Workspace request timed out after {:?}", deadline);
                Err(OrchestratorError::Engine(format!(
                    "Container engine did not respond within {}s",
                    deadline.as_secs()
                )))
            }
        }
    }

    fn resume(
        &self,
        engine: &dyn ContainerEngine,
        container: Container,
        id: &Identity,
        mode: UrlMode,
    ) -> Result<EnsuredWorkspace> {
        let phase = if container.running {
            WorkspacePhase::AlreadyRunning
        } else {
            info!(container = %container.name, "Starting stopped workspace");
            engine.start(&container)?;
            WorkspacePhase::Started
        };

        let port = self.bound_port(engine, &container);
        debug!(container = %container.name, port, ?phase, "Workspace resumed");

        Ok(EnsuredWorkspace {
            url: resolve(mode, &self.namer, id, port),
            port,
            phase,
        })
    }

    /// Host port recorded by the engine, or the internal port when the
    /// binding cannot be read.
    fn bound_port(&self, engine: &dyn ContainerEngine, container: &Container) -> u16 {
        let internal = self.template.internal_port;

        match engine.inspect_port_binding(container, internal) {
            Ok(Some(port)) => port,
            Ok(None) => {
                warn!(
                    container = %container.name,
                    "No host binding for {}/tcp, falling back to internal port", internal
                );
                internal
            }
            Err(e) => {
                warn!(
                    container = %container.name,
                    "Failed to read port binding ({}), falling back to internal port {}", e, internal
                );
                internal
            }
        }
    }

    fn create(
        &self,
        engine: &dyn ContainerEngine,
        id: &Identity,
        mode: UrlMode,
    ) -> Result<EnsuredWorkspace> {
        let port = self
            .allocator
            .allocate()
            .map_err(OrchestratorError::PortAllocation)?;

        // Left in place if anything below fails.
        let volume = self.namer.volume_path(id);
        fs::create_dir_all(&volume).map_err(|source| OrchestratorError::Volume {
            path: volume.clone(),
            source,
        })?;

        let spec = self.container_spec(id, port, volume);
        info!(container = %spec.name, port, image = %spec.image, "Creating workspace container");

        let container = match engine.create(&spec) {
            Ok(container) => container,
            Err(EngineError::NameConflict(_)) => {
                warn!(container = %spec.name, "Lost creation race, re-reading engine state");
                let container = engine.find(&spec.name)?.ok_or_else(|| {
                    OrchestratorError::Engine(format!(
                        "Container {} reported a name conflict but could not be found",
                        spec.name
                    ))
                })?;
                return self.resume(engine, container, id, mode);
            }
            Err(EngineError::ImageMissing(_)) => {
                error!(image = %spec.image, "Workspace image is missing from the engine");
                return Err(OrchestratorError::ImageMissing {
                    image: spec.image.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        engine.start(&container)?;
        info!(container = %spec.name, port, "Workspace created");

        Ok(EnsuredWorkspace {
            url: resolve(mode, &self.namer, id, port),
            port,
            phase: WorkspacePhase::Created,
        })
    }

    fn container_spec(&self, id: &Identity, host_port: u16, volume: PathBuf) -> ContainerSpec {
        let mut env = BTreeMap::new();
        env.insert(
            "PASSWORD".to_string(),
            workspace_password(id, &self.template.credential_seed),
        );

        ContainerSpec {
            name: self.namer.container_name(id),
            image: self.template.image.clone(),
            internal_port: self.template.internal_port,
            host_port,
            env,
            mount: BindMount {
                host_path: volume,
                container_path: self.template.mount_target.clone(),
            },
            network: self.template.network.clone(),
            restart_policy: self.template.restart_policy,
        }
    }
}
