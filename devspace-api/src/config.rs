use anyhow::{Context, Result};
use devspace_engine::RestartPolicy;
use devspace_orchestrator::{UrlMode, WorkspaceNamer, WorkspaceTemplate};
use devspace_ports::{EphemeralPortAllocator, PortAllocator, PortRange, RangePortAllocator};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub url_mode: UrlMode,
    pub domain: String,
    pub workspace_base_path: PathBuf,
    pub image: String,
    pub image_build_context: String,
    pub network: String,
    pub internal_port: u16,
    pub mount_target: String,
    pub credential_seed: String,
    pub restart_policy: RestartPolicy,
    pub port_range: Option<PortRange>,
    pub port_bind_host: IpAddr,
    pub engine_timeout_secs: u64,
    pub serialize_per_identity: bool,
    pub docker_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        let template = WorkspaceTemplate::default();
        Self {
            bind_addr: "0.0.0.0:3121".to_string(),
            url_mode: UrlMode::Public,
            domain: "apranova.com".to_string(),
            workspace_base_path: PathBuf::from("/app/workspaces"),
            image: template.image,
            image_build_context: "./backend/apra-nova-code-server".to_string(),
            network: template.network,
            internal_port: template.internal_port,
            mount_target: template.mount_target,
            credential_seed: template.credential_seed,
            restart_policy: template.restart_policy,
            port_range: None,
            port_bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            engine_timeout_secs: 60,
            serialize_per_identity: false,
            docker_bin: "docker".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; unset keys keep
    /// their defaults, malformed values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("DEVSPACE_BIND") {
            config.bind_addr = v;
        }

        // DEBUG=true is the legacy switch for localhost URLs.
        if lookup("DEBUG").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            config.url_mode = UrlMode::Local;
        }
        if let Some(v) = lookup("DEVSPACE_URL_MODE") {
            config.url_mode = v
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("DEVSPACE_URL_MODE")?;
        }

        if let Some(v) = lookup("DEVSPACE_DOMAIN") {
            config.domain = v;
        }
        if let Some(v) = lookup("WORKSPACE_BASE_PATH") {
            config.workspace_base_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("DEVSPACE_IMAGE") {
            config.image = v;
        }
        if let Some(v) = lookup("DEVSPACE_IMAGE_BUILD_CONTEXT") {
            config.image_build_context = v;
        }
        if let Some(v) = lookup("DEVSPACE_NETWORK") {
            config.network = v;
        }
        if let Some(v) = lookup("DEVSPACE_INTERNAL_PORT") {
            config.internal_port = v
                .parse()
                .with_context(|| format!("Invalid DEVSPACE_INTERNAL_PORT: {}", v))?;
        }
        if let Some(v) = lookup("DEVSPACE_MOUNT_TARGET") {
            config.mount_target = v;
        }
        if let Some(v) = lookup("DEVSPACE_CREDENTIAL_SEED") {
            config.credential_seed = v;
        }
        if let Some(v) = lookup("DEVSPACE_RESTART_POLICY") {
            config.restart_policy = v
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("DEVSPACE_RESTART_POLICY")?;
        }
        if let Some(v) = lookup("DEVSPACE_PORT_RANGE").filter(|v| !v.trim().is_empty()) {
            config.port_range = Some(PortRange::parse(&v).context("DEVSPACE_PORT_RANGE")?);
        }
        if let Some(v) = lookup("DEVSPACE_PORT_BIND_HOST") {
            config.port_bind_host = v
                .parse()
                .with_context(|| format!("Invalid DEVSPACE_PORT_BIND_HOST: {}", v))?;
        }
        if let Some(v) = lookup("DEVSPACE_ENGINE_TIMEOUT_SECS") {
            config.engine_timeout_secs = v
                .parse()
                .with_context(|| format!("Invalid DEVSPACE_ENGINE_TIMEOUT_SECS: {}", v))?;
        }
        if let Some(v) = lookup("DEVSPACE_SERIALIZE_PER_IDENTITY") {
            config.serialize_per_identity = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = lookup("DEVSPACE_DOCKER_BIN") {
            config.docker_bin = v;
        }

        Ok(config)
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }

    pub fn namer(&self) -> WorkspaceNamer {
        WorkspaceNamer::new(self.workspace_base_path.clone(), self.domain.clone())
    }

    pub fn template(&self) -> WorkspaceTemplate {
        WorkspaceTemplate {
            image: self.image.clone(),
            internal_port: self.internal_port,
            network: self.network.clone(),
            mount_target: self.mount_target.clone(),
            credential_seed: self.credential_seed.clone(),
            restart_policy: self.restart_policy,
        }
    }

    pub fn allocator(&self) -> Arc<dyn PortAllocator> {
        match self.port_range {
            Some(range) => Arc::new(RangePortAllocator::new(self.port_bind_host, range)),
            None => Arc::new(EphemeralPortAllocator::new(self.port_bind_host)),
        }
    }
}
