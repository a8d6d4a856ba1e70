use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A container as currently reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    No,
    Always,
    #[default]
    UnlessStopped,
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestartPolicy::No => "no",
            RestartPolicy::Always => "always",
            RestartPolicy::UnlessStopped => "unless-stopped",
        };
        f.write_str(s)
    }
}

impl FromStr for RestartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no" => Ok(RestartPolicy::No),
            "always" => Ok(RestartPolicy::Always),
            "unless-stopped" => Ok(RestartPolicy::UnlessStopped),
            other => Err(format!(
                "Unknown restart policy '{}' (expected 'no', 'always' or 'unless-stopped')",
                other
            )),
        }
    }
}

/// Read-write bind mount of a host directory into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub host_path: PathBuf,
    pub container_path: String,
}

/// Everything needed to create a workspace container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub internal_port: u16,
    pub host_port: u16,
    pub env: BTreeMap<String, String>,
    pub mount: BindMount,
    pub network: String,
    pub restart_policy: RestartPolicy,
}

impl ContainerSpec {
    /// `HOST:CONTAINER/tcp` publish argument.
    pub fn publish_arg(&self) -> String {
        format!("{}:{}/tcp", self.host_port, self.internal_port)
    }

    pub fn volume_arg(&self) -> String {
        format!(
            "{}:{}:rw",
            self.mount.host_path.display(),
            self.mount.container_path
        )
    }
}
