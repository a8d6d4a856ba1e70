use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::naming::{Identity, WorkspaceNamer};

/// How workspace addresses are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMode {
    /// Development: straight to the published host port.
    Local,
    /// Production: per-user hostname routed by an external reverse proxy.
    Public,
}

impl FromStr for UrlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(UrlMode::Local),
            "public" => Ok(UrlMode::Public),
            other => Err(format!(
                "Unknown URL mode '{}' (expected 'local' or 'public')",
                other
            )),
        }
    }
}

impl fmt::Display for UrlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlMode::Local => f.write_str("local"),
            UrlMode::Public => f.write_str("public"),
        }
    }
}

/// Externally reachable address of a workspace.
///
/// Public URLs carry no port: the proxy maps the hostname to the host port.
pub fn resolve(mode: UrlMode, namer: &WorkspaceNamer, id: &Identity, port: u16) -> String {
    match mode {
        UrlMode::Local => format!("http://localhost:{}", port),
        UrlMode::Public => format!("http://{}", namer.hostname(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_urls_carry_the_port() {
        let namer = WorkspaceNamer::new("/w", "apranova.com");
        for (id, port) in [(1u64, 1024u16), (42, 41234), (999, 65535)] {
            assert_eq!(
                resolve(UrlMode::Local, &namer, &Identity::from(id), port),
                format!("http://localhost:{}", port)
            );
        }
    }

    #[test]
    fn test_public_urls_omit_the_port() {
        let namer = WorkspaceNamer::new("/w", "apranova.com");
        for port in [1024u16, 8080, 41234] {
            let url = resolve(UrlMode::Public, &namer, &Identity::from(42), port);
            assert_eq!(url, "http://workspace-42.apranova.com");
            assert!(!url.contains(&port.to_string()));
        }
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("local".parse::<UrlMode>(), Ok(UrlMode::Local));
        assert_eq!(" Public ".parse::<UrlMode>(), Ok(UrlMode::Public));
        assert!("staging".parse::<UrlMode>().is_err());
        assert_eq!(UrlMode::Local.to_string(), "local");
    }
}
