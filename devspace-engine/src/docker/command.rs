//! Docker CLI invocation and error classification.
//!
//! Every call goes through [`DockerCommand`] so that spawn failures and daemon
//! errors map onto [`EngineError`] in one place.

use std::io;
use std::process::{Command, Output};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Builder for one `docker <subcommand> [args...]` invocation.
#[derive(Debug, Clone)]
pub struct DockerCommand {
    binary: String,
    subcommand: String,
    args: Vec<String>,
}

impl DockerCommand {
    pub fn new(binary: &str, subcommand: &str) -> Self {
        Self {
            binary: binary.to_string(),
            subcommand: subcommand.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the command and returns stdout, classifying failures by stderr.
    ///
    /// `subject` names the container or image the command is about and ends
    /// up in `NotFound`, `ImageMissing` and `NameConflict` errors.
    pub fn execute_with_output(self, subject: &str) -> Result<String> {
        let output = self.execute_raw()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(classify_stderr(&stderr, subject))
        }
    }

    pub fn execute_raw(self) -> Result<Output> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(&self.subcommand).args(&self.args);

        debug!("Executing Docker command: {:?}", cmd);

        cmd.output().map_err(|e| spawn_error(&self.binary, e))
    }
}

fn spawn_error(binary: &str, err: io::Error) -> EngineError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            EngineError::Unreachable(format!("{} executable not found", binary))
        }
        io::ErrorKind::PermissionDenied => {
            EngineError::Unreachable(format!("permission denied executing {}", binary))
        }
        _ => EngineError::Unknown(format!("Failed to execute {}: {}", binary, err)),
    }
}

/// Maps Docker CLI stderr onto an engine error kind.
pub fn classify_stderr(stderr: &str, subject: &str) -> EngineError {
    let lower = stderr.to_lowercase();

    if lower.contains("cannot connect to the docker daemon")
        || lower.contains("is the docker daemon running")
        || lower.contains("error during connect")
        || lower.contains("permission denied while trying to connect")
    {
        return EngineError::Unreachable(stderr.trim().to_string());
    }

    if lower.contains("unable to find image")
        || lower.contains("no such image")
        || lower.contains("pull access denied")
        || lower.contains("repository does not exist")
    {
        return EngineError::ImageMissing(subject.to_string());
    }

    if lower.contains("no such object") || lower.contains("no such container") {
        return EngineError::NotFound(subject.to_string());
    }

    if lower.contains("is already in use") || lower.contains("conflict.") {
        return EngineError::NameConflict(subject.to_string());
    }

    EngineError::Unknown(stderr.trim().to_string())
}
