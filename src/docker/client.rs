use std::sync::Arc;

use bollard::Docker;
use tracing::{debug, info};

use crate::core::{ConnectionInfo, DockerError, Result};

/// Docker client wrapper
///
/// Construction is lazy: no daemon round-trip happens until the first
/// operation, so a client can be built in environments without Docker.
#[derive(Clone)]
pub struct DockerClient {
    inner: Arc<Docker>,
}

impl DockerClient {
    /// Create a new client from environment (DOCKER_HOST, platform socket)
    pub fn from_env() -> Result<Self> {
        debug!("Creating Docker client from environment");

        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| DockerError::Connection(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(docker),
        })
    }

    /// Create a new client against an explicit HTTP daemon address
    pub fn with_host(host: &str) -> Result<Self> {
        debug!("Creating Docker client with host: {}", host);

        let docker = Docker::connect_with_http(host, 120, bollard::API_DEFAULT_VERSION)
            .map_err(|e| DockerError::Connection(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(docker),
        })
    }

    /// Ping the Docker daemon
    pub async fn ping(&self) -> Result<String> {
        debug!("Pinging Docker daemon");

        let response = self
            .inner
            .ping()
            .await
            .map_err(|e| DockerError::Connection(e.to_string()))?;

        Ok(response)
    }

    /// Fetch daemon version information
    pub async fn server_info(&self) -> Result<ConnectionInfo> {
        debug!("Fetching Docker version information");

        let version = self
            .inner
            .version()
            .await
            .map_err(|e| DockerError::Connection(e.to_string()))?;

        let info = ConnectionInfo {
            version: version.version.unwrap_or_else(|| "unknown".to_string()),
            api_version: version.api_version.unwrap_or_else(|| "unknown".to_string()),
            os: version.os.unwrap_or_else(|| "unknown".to_string()),
            arch: version.arch.unwrap_or_else(|| "unknown".to_string()),
        };

        info!(
            "Connected to Docker {} (API: {}) on {}/{}",
            info.version, info.api_version, info.os, info.arch
        );

        Ok(info)
    }

    /// Get the inner Docker client (for advanced usage)
    pub fn inner(&self) -> &Docker {
        &self.inner
    }
}
