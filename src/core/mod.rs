use serde::{Deserialize, Serialize};

pub mod errors;

pub use errors::*;

/// Docker connection information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub version: String,
    pub api_version: String,
    pub os: String,
    pub arch: String,
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            version: "unknown".to_string(),
            api_version: "unknown".to_string(),
            os: "unknown".to_string(),
            arch: "unknown".to_string(),
        }
    }
}

/// Transport protocol for a port binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// A container-port to host-port mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    pub container_port: u16,
    pub host_port: u16,
    pub protocol: Protocol,
}

impl PortBinding {
    /// Map the same port on both sides, TCP
    pub fn new(port: u16) -> Self {
        Self::tcp(port, port)
    }

    pub fn tcp(container_port: u16, host_port: u16) -> Self {
        Self {
            container_port,
            host_port,
            protocol: Protocol::Tcp,
        }
    }

    pub fn udp(container_port: u16, host_port: u16) -> Self {
        Self {
            container_port,
            host_port,
            protocol: Protocol::Udp,
        }
    }

    /// The exposed-port key the Docker API expects, e.g. "5432/tcp"
    pub fn port_key(&self) -> String {
        format!("{}/{}", self.container_port, self.protocol)
    }
}

/// A host-path to container-path bind mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    pub host_path: String,
    pub container_path: String,
}

impl VolumeBinding {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
        }
    }

    /// The bind string the Docker API expects, e.g. "/data/pg:/var/lib/postgresql/data"
    pub fn bind_spec(&self) -> String {
        format!("{}:{}", self.host_path, self.container_path)
    }
}

/// Reject blank values for required names
pub fn require_not_blank(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} is required", what)).into());
    }
    Ok(())
}
