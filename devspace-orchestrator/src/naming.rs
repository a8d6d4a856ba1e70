//! Deterministic names derived from a user identity.
//!
//! The container name is the join key between this crate and engine-held
//! state, so every function here is pure and injective over identities.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Authenticated user id as handed over by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidIdentity {
    #[error("identity is empty")]
    Empty,

    #[error("identity {0:?} contains characters outside [A-Za-z0-9-]")]
    Characters(String),

    #[error("identity {0:?} must not end with '-'")]
    TrailingHyphen(String),

    #[error("identity is longer than {} characters", MAX_IDENTITY_LEN)]
    TooLong,
}

/// `workspace-` plus the id has to fit in one 63-byte DNS label.
pub const MAX_IDENTITY_LEN: usize = 63 - "workspace-".len();

impl Identity {
    /// Accepts ids that are valid in a path segment, a container name and a
    /// DNS label alike: ASCII alphanumerics and `-`, not ending in `-`.
    pub fn parse(id: &str) -> Result<Self, InvalidIdentity> {
        if id.is_empty() {
            return Err(InvalidIdentity::Empty);
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(InvalidIdentity::Characters(id.to_string()));
        }
        if id.ends_with('-') {
            return Err(InvalidIdentity::TrailingHyphen(id.to_string()));
        }
        if id.len() > MAX_IDENTITY_LEN {
            return Err(InvalidIdentity::TooLong);
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for Identity {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceNamer {
    volume_root: PathBuf,
    domain: String,
}

impl WorkspaceNamer {
    pub fn new(volume_root: impl Into<PathBuf>, domain: impl Into<String>) -> Self {
        Self {
            volume_root: volume_root.into(),
            domain: domain.into(),
        }
    }

    /// `workspace_<id>`
    pub fn container_name(&self, id: &Identity) -> String {
        format!("workspace_{}", id)
    }

    /// `<volume_root>/<id>`
    pub fn volume_path(&self, id: &Identity) -> PathBuf {
        self.volume_root.join(id.as_str())
    }

    /// `workspace-<id>.<domain>`
    pub fn hostname(&self, id: &Identity) -> String {
        format!("workspace-{}.{}", id, self.domain)
    }
}

/// Password handed to the workspace container: `<id>_<seed>`.
///
/// Anyone who knows a user id and the seed can derive it. Replace with a
/// random secret stored alongside the container before exposing workspaces
/// beyond a trusted network.
pub fn workspace_password(id: &Identity, seed: &str) -> String {
    format!("{}_{}", id, seed)
}
