//! Docker-backed [`ContainerEngine`].

mod command;

pub use command::{classify_stderr, DockerCommand};

use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::container::{Container, ContainerSpec};
use crate::error::{EngineError, Result};
use crate::ContainerEngine;

/// Drives the Docker daemon through the `docker` CLI.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    binary: String,
}

impl DockerEngine {
    /// Verifies the daemon answers before handing out an engine.
    pub fn connect(binary: &str) -> Result<Self> {
        let version = DockerCommand::new(binary, "info")
            .args(["--format", "{{.ServerVersion}}"])
            .execute_with_output("daemon")?;

        info!("Connected to Docker daemon (server version {})", version.trim());
        Ok(Self {
            binary: binary.to_string(),
        })
    }

    fn command(&self, subcommand: &str) -> DockerCommand {
        DockerCommand::new(&self.binary, subcommand)
    }

    fn inspect(&self, name: &str) -> Result<InspectRecord> {
        let stdout = self
            .command("inspect")
            .args(["--type", "container", name])
            .execute_with_output(name)?;

        parse_inspect(&stdout)?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NotFound(name.to_string()))
    }
}

impl ContainerEngine for DockerEngine {
    fn find(&self, name: &str) -> Result<Option<Container>> {
        match self.inspect(name) {
            Ok(record) => Ok(Some(record.into_container())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn create(&self, spec: &ContainerSpec) -> Result<Container> {
        let mut cmd = self
            .command("create")
            .args(["--pull", "never"])
            .args(["--name", spec.name.as_str()])
            .args(["--publish".to_string(), spec.publish_arg()])
            .args(["--volume".to_string(), spec.volume_arg()])
            .args(["--network", spec.network.as_str()])
            .args(["--restart".to_string(), spec.restart_policy.to_string()]);

        for (key, value) in &spec.env {
            cmd = cmd.args(["--env".to_string(), format!("{}={}", key, value)]);
        }

        let stdout = cmd.arg(spec.image.as_str()).execute_with_output(&spec.name);

        // Only the create call knows which subject a missing-image error is about.
        let stdout = match stdout {
            Err(EngineError::ImageMissing(_)) => {
                return Err(EngineError::ImageMissing(spec.image.clone()))
            }
            other => other?,
        };

        let id = stdout.trim().to_string();
        debug!(container = %spec.name, id = %id, "Created container");

        Ok(Container {
            id,
            name: spec.name.clone(),
            running: false,
        })
    }

    fn start(&self, container: &Container) -> Result<()> {
        self.command("start")
            .arg(container.name.as_str())
            .execute_with_output(&container.name)?;
        Ok(())
    }

    fn inspect_port_binding(
        &self,
        container: &Container,
        internal_port: u16,
    ) -> Result<Option<u16>> {
        let record = self.inspect(&container.name)?;
        Ok(record.host_port(internal_port))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectRecord {
    id: String,
    name: String,
    state: InspectState,
    #[serde(default)]
    host_config: Option<InspectHostConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectState {
    #[serde(default)]
    running: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectHostConfig {
    #[serde(default)]
    port_bindings: Option<HashMap<String, Option<Vec<PortBinding>>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PortBinding {
    #[serde(default)]
    host_port: Option<String>,
}

impl InspectRecord {
    fn into_container(self) -> Container {
        Container {
            id: self.id,
            name: self.name.trim_start_matches('/').to_string(),
            running: self.state.running,
        }
    }

    fn host_port(&self, internal_port: u16) -> Option<u16> {
        let key = format!("{}/tcp", internal_port);
        self.host_config
            .as_ref()?
            .port_bindings
            .as_ref()?
            .get(&key)?
            .as_ref()?
            .iter()
            .filter_map(|b| b.host_port.as_deref())
            .find_map(|p| p.parse::<u16>().ok())
    }
}

fn parse_inspect(stdout: &str) -> Result<Vec<InspectRecord>> {
    serde_json::from_str(stdout)
        .map_err(|e| EngineError::Unknown(format!("Failed to parse container info: {}", e)))
}
