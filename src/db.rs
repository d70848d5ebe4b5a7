//! Fluent facade for disposable database containers

use std::time::Duration;

use tracing::{debug, info};

use crate::core::{require_not_blank, PortBinding, Result};
use crate::docker::{DockerClient, DockerContainer, DockerImage};

/// Image used by the PostgreSQL preset
pub const POSTGRES_IMAGE: &str = "postgres:latest";
/// Image used by the MySQL preset
pub const MYSQL_IMAGE: &str = "mysql:latest";

/// How `start` treats a container that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Force-remove any existing container and create a fresh one
    Replace,
    /// Reuse the existing container, creating it only if missing
    Reuse,
}

/// A disposable database container
///
/// Configure fluently, then `start` runs the canonical sequence: ensure the
/// image is present (pulling it if needed), create or replace the container,
/// and start it with its logs redirected to the host logger.
///
/// ```no_run
/// use std::time::Duration;
/// use instadb::core::PortBinding;
/// use instadb::db::{InstaDb, StartMode};
/// use instadb::docker::find_free_port;
///
/// # async fn example() -> instadb::core::Result<()> {
/// let port = find_free_port()?;
/// let mut db = InstaDb::postgres("orders-it-pg")?
///     .port_binding(PortBinding::tcp(5432, port))
///     .env(format!("POSTGRES_PASSWORD={}", port));
///
/// db.start(StartMode::Replace, Duration::from_secs(60)).await?;
/// // ... run tests against localhost:port ...
/// db.stop(Duration::from_secs(30)).await?;
/// db.remove().await?;
/// # Ok(())
/// # }
/// ```
pub struct InstaDb {
    image: String,
    name: String,
    client: Option<DockerClient>,
    stream_logs: bool,
    hostname: Option<String>,
    network_mode: Option<String>,
    ports: Vec<PortBinding>,
    volumes: Vec<(String, String)>,
    env: Vec<String>,
    cmd: Vec<String>,
    container: Option<DockerContainer>,
}

impl InstaDb {
    /// Create a helper for any image
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let image = image.into();
        let name = name.into();
        require_not_blank(&image, "image name")?;
        require_not_blank(&name, "container name")?;
        Ok(Self {
            image,
            name,
            client: None,
            stream_logs: true,
            hostname: None,
            network_mode: None,
            ports: Vec::new(),
            volumes: Vec::new(),
            env: Vec::new(),
            cmd: Vec::new(),
            container: None,
        })
    }

    /// PostgreSQL preset
    pub fn postgres(name: impl Into<String>) -> Result<Self> {
        Self::new(POSTGRES_IMAGE, name)
    }

    /// MySQL preset
    pub fn mysql(name: impl Into<String>) -> Result<Self> {
        Self::new(MYSQL_IMAGE, name)
    }

    // --- configuration ---

    /// Use a pre-built Docker client instead of environment defaults
    pub fn client(mut self, client: DockerClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Toggle redirection of container output into the host logger (default on)
    pub fn stream_logs(mut self, stream_logs: bool) -> Self {
        self.stream_logs = stream_logs;
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn network_mode(mut self, network_mode: impl Into<String>) -> Self {
        self.network_mode = Some(network_mode.into());
        self
    }

    pub fn port_binding(mut self, binding: PortBinding) -> Self {
        self.ports.push(binding);
        self
    }

    pub fn volume_binding(
        mut self,
        host_path: impl Into<String>,
        container_path: impl Into<String>,
    ) -> Self {
        self.volumes.push((host_path.into(), container_path.into()));
        self
    }

    /// Add a `KEY=VALUE` environment variable
    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env.push(var.into());
        self
    }

    /// Override the image's default command
    pub fn cmd(mut self, cmd: impl IntoIterator<Item = String>) -> Self {
        self.cmd = cmd.into_iter().collect();
        self
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // --- lifecycle ---

    /// Pull the image if missing, create the container and run it
    pub async fn start(&mut self, mode: StartMode, pull_timeout: Duration) -> Result<()> {
        let client = match &self.client {
            Some(client) => client.clone(),
            None => {
                let client = DockerClient::from_env()?;
                self.client = Some(client.clone());
                client
            }
        };

        let image = DockerImage::new(client.clone(), self.image.clone())?;
        image.ensure_exists(pull_timeout).await?;

        let mut container = self.build_container(client)?;

        match mode {
            StartMode::Replace => container.create_or_replace().await?,
            StartMode::Reuse => {
                let created = container.ensure_exists().await?;
                if !created {
                    info!("Reusing existing container {}", self.name);
                }
            }
        }

        container.ensure_running().await?;
        self.container = Some(container);

        info!("{} is up (container: {})", self.image, self.name);
        Ok(())
    }

    /// Access the live container handle, available after `start`
    pub fn container(&self) -> Option<&DockerContainer> {
        self.container.as_ref()
    }

    /// Mutable access to the live container handle, available after `start`
    pub fn container_mut(&mut self) -> Option<&mut DockerContainer> {
        self.container.as_mut()
    }

    /// Stop the container; a no-op when it was never started
    pub async fn stop(&mut self, timeout: Duration) -> Result<()> {
        match &mut self.container {
            Some(container) => container.ensure_stopped(timeout).await,
            None => {
                debug!("Container {} was never started, nothing to stop", self.name);
                Ok(())
            }
        }
    }

    /// Remove the container; a no-op when it was never started
    pub async fn remove(&mut self) -> Result<()> {
        match &mut self.container {
            Some(container) => container.ensure_not_exists().await,
            None => {
                debug!(
                    "Container {} was never started, nothing to remove",
                    self.name
                );
                Ok(())
            }
        }
    }

    fn build_container(&self, client: DockerClient) -> Result<DockerContainer> {
        let mut container = DockerContainer::new(client, self.image.clone(), self.name.clone())?
            .port_bindings(self.ports.iter().cloned())
            .envs(self.env.iter().cloned())
            .stream_logs(self.stream_logs);

        if let Some(hostname) = &self.hostname {
            container = container.hostname(hostname.clone());
        }
        if let Some(network_mode) = &self.network_mode {
            container = container.network_mode(network_mode.clone());
        }
        for (host_path, container_path) in &self.volumes {
            container = container.volume_binding(host_path.clone(), container_path.clone());
        }
        if !self.cmd.is_empty() {
            container = container.cmd(self.cmd.iter().cloned());
        }

        Ok(container)
    }
}
