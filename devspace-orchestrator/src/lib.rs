//! Workspace lifecycle orchestration
//!
//! Guarantees exactly one running container-backed workspace per identity and
//! returns a reachable address for it. The container engine is the only system
//! of record: every request re-derives workspace state from engine inspection.

pub mod controller;
pub mod error;
pub mod lock;
pub mod naming;
pub mod url;

pub use controller::{EnsuredWorkspace, WorkspaceController, WorkspacePhase, WorkspaceTemplate};
pub use error::{OrchestratorError, Result};
pub use naming::{workspace_password, Identity, InvalidIdentity, WorkspaceNamer};
pub use url::{resolve, UrlMode};
