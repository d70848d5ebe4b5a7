//! Container lifecycle operations

use std::collections::HashMap;
use std::time::Duration;

use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    StopContainerOptions,
};
use bollard::models::HostConfig;
use tracing::{debug, info, warn};

use crate::core::{require_not_blank, DockerError, PortBinding, Result, VolumeBinding};
use crate::docker::{ContainerLogger, DockerClient};

/// A named container handle
///
/// Carries the desired configuration and drives the container through its
/// lifecycle: `exists → create/replace → run → stop → remove`. Every state
/// change is verified by a follow-up inspect rather than assumed. All
/// operations address the container by name, so a handle stays valid across
/// create/remove cycles.
pub struct DockerContainer {
    client: DockerClient,
    image: String,
    name: String,
    hostname: Option<String>,
    network_mode: Option<String>,
    ports: Vec<PortBinding>,
    volumes: Vec<VolumeBinding>,
    env: Vec<String>,
    cmd: Vec<String>,
    stream_logs: bool,
    container_id: Option<String>,
    logger: Option<ContainerLogger>,
}

impl DockerContainer {
    pub fn new(
        client: DockerClient,
        image: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let image = image.into();
        let name = name.into();
        require_not_blank(&image, "image name")?;
        require_not_blank(&name, "container name")?;
        Ok(Self {
            client,
            image,
            name,
            hostname: None,
            network_mode: None,
            ports: Vec::new(),
            volumes: Vec::new(),
            env: Vec::new(),
            cmd: Vec::new(),
            stream_logs: true,
            container_id: None,
            logger: None,
        })
    }

    // --- configuration ---

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

    pub fn port_bindings(mut self, bindings: impl IntoIterator<Item = PortBinding>) -> Self {
        self.ports.extend(bindings);
        self
    }

    /// Bind-mount a host path into the container
    pub fn volume_binding(
        mut self,
        host_path: impl Into<String>,
        container_path: impl Into<String>,
    ) -> Self {
        self.volumes.push(VolumeBinding::new(host_path, container_path));
        self
    }

    /// Add a `KEY=VALUE` environment variable
    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env.push(var.into());
        self
    }

    pub fn envs(mut self, vars: impl IntoIterator<Item = String>) -> Self {
        self.env.extend(vars);
        self
    }

    /// Override the image's default command
    pub fn cmd(mut self, cmd: impl IntoIterator<Item = String>) -> Self {
        self.cmd = cmd.into_iter().collect();
        self
    }

    /// Toggle redirection of container output into the host logger (default on)
    pub fn stream_logs(mut self, stream_logs: bool) -> Self {
        self.stream_logs = stream_logs;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// The engine-assigned container id, available after creation
    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    // --- state queries ---

    /// Check if the container exists locally
    pub async fn exists(&self) -> Result<bool> {
        match self
            .client
            .inner()
            .inspect_container(&self.name, None::<InspectContainerOptions>)
            .await
        {
            Ok(_) => {
                debug!("Container {} exists", self.name);
                Ok(true)
            }
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!("Container {} not found", self.name);
                Ok(false)
            }
            Err(e) => Err(DockerError::Container(format!(
                "Failed to inspect {}: {}",
                self.name, e
            ))
            .into()),
        }
    }

    /// Check if the container is currently running
    ///
    /// A missing container reports `Ok(false)`.
    pub async fn is_running(&self) -> Result<bool> {
        match self
            .client
            .inner()
            .inspect_container(&self.name, None::<InspectContainerOptions>)
            .await
        {
            Ok(inspect) => Ok(inspect.state.and_then(|s| s.running).unwrap_or(false)),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(DockerError::Container(format!(
                "Failed to inspect {}: {}",
                self.name, e
            ))
            .into()),
        }
    }

    // --- state changes ---

    /// Create the container, force-removing any existing one with the same name
    pub async fn create_or_replace(&mut self) -> Result<()> {
        info!(
            "Replacing container {} (image: {})",
            self.name, self.image
        );
        if self.exists().await? {
            self.ensure_not_exists().await?;
        }
        self.create().await
    }

    /// Create the container only if it does not exist yet
    ///
    /// Returns `true` only if the container was actually created by this call.
    pub async fn ensure_exists(&mut self) -> Result<bool> {
        if self.exists().await? {
            debug!("Container {} already exists", self.name);
            return Ok(false);
        }
        self.create().await?;
        Ok(true)
    }

    /// Force-remove the container if it exists
    ///
    /// Absence is success; removal is verified by a follow-up inspect.
    pub async fn ensure_not_exists(&mut self) -> Result<()> {
        if let Some(logger) = self.logger.take() {
            logger.detach();
        }

        if !self.exists().await? {
            return Ok(());
        }

        let options = RemoveContainerOptions {
            force: true,
            v: false,
            link: false,
        };

        match self
            .client
            .inner()
            .remove_container(&self.name, Some(options))
            .await
        {
            Ok(()) => {}
            // Lost a race with another remover, which is still the goal state
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {}
            Err(e) => {
                return Err(DockerError::Container(format!(
                    "Failed to remove {}: {}",
                    self.name, e
                ))
                .into())
            }
        }

        if self.exists().await? {
            warn!("Container {} still exists after remove", self.name);
            return Err(DockerError::Container(format!(
                "{} still exists after remove",
                self.name
            ))
            .into());
        }

        self.container_id = None;
        info!("Container {} removed", self.name);
        Ok(())
    }

    /// Start the container if it is not already running
    ///
    /// The container must exist (create it first). On an actual start the
    /// container's logs are attached to the host logger when streaming is
    /// enabled.
    pub async fn ensure_running(&mut self) -> Result<()> {
        if self.is_running().await? {
            debug!("Container {} already running", self.name);
            return Ok(());
        }

        if !self.exists().await? {
            return Err(DockerError::NotFound {
                resource: format!("container {}", self.name),
            }
            .into());
        }

        debug!("Starting container {}", self.name);

        match self
            .client
            .inner()
            .start_container::<String>(&self.name, None)
            .await
        {
            Ok(()) => {}
            // 304: already started
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => {}
            Err(e) => {
                return Err(DockerError::Container(format!(
                    "Failed to start {}: {}",
                    self.name, e
                ))
                .into())
            }
        }

        if !self.is_running().await? {
            return Err(DockerError::Container(format!(
                "{} not running after start",
                self.name
            ))
            .into());
        }

        if self.stream_logs && self.logger.is_none() {
            self.logger = Some(ContainerLogger::attach(&self.client, &self.name));
        }

        info!("Container {} started", self.name);
        Ok(())
    }

    /// Stop the container gracefully, verified by a follow-up inspect
    pub async fn ensure_stopped(&mut self, timeout: Duration) -> Result<()> {
        if let Some(logger) = self.logger.take() {
            logger.detach();
        }

        let options = StopContainerOptions {
            t: timeout.as_secs() as i64,
        };

        match self
            .client
            .inner()
            .stop_container(&self.name, Some(options))
            .await
        {
            Ok(()) => {}
            // 304: already stopped
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => {
                debug!("Container {} was already stopped", self.name);
            }
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                return Err(DockerError::NotFound {
                    resource: format!("container {}", self.name),
                }
                .into())
            }
            Err(e) => {
                return Err(DockerError::Container(format!(
                    "Failed to stop {}: {}",
                    self.name, e
                ))
                .into())
            }
        }

        if self.is_running().await? {
            warn!("Container {} still running after stop", self.name);
            return Err(DockerError::Container(format!(
                "{} still running after stop",
                self.name
            ))
            .into());
        }

        info!("Container {} stopped", self.name);
        Ok(())
    }

    /// Poll until the container reports running or the deadline passes
    pub async fn wait_until_running(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.is_running().await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DockerError::Timeout {
                    operation: format!("wait for container {}", self.name),
                    duration: timeout.as_secs(),
                }
                .into());
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    // --- internals ---

    async fn create(&mut self) -> Result<()> {
        for binding in &self.ports {
            debug!(
                "Binding port for {}: container={} host={}",
                self.name,
                binding.port_key(),
                binding.host_port
            );
        }
        for binding in &self.volumes {
            debug!("Binding volume for {}: {}", self.name, binding.bind_spec());
        }

        let options = CreateContainerOptions {
            name: self.name.clone(),
            platform: None,
        };

        let response = self
            .client
            .inner()
            .create_container(Some(options), self.build_config())
            .await
            .map_err(|e| {
                DockerError::Container(format!(
                    "Failed to create {} from image {}: {}",
                    self.name, self.image, e
                ))
            })?;

        let short_id: String = response.id.chars().take(12).collect();
        self.container_id = Some(response.id);

        if !self.exists().await? {
            return Err(DockerError::Container(format!(
                "{} not found after create",
                self.name
            ))
            .into());
        }

        info!("Container {} created (id: {})", self.name, short_id);
        Ok(())
    }

    fn build_config(&self) -> Config<String> {
        let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();
        let mut port_map: HashMap<String, Option<Vec<bollard::models::PortBinding>>> =
            HashMap::new();

        for binding in &self.ports {
            let key = binding.port_key();
            exposed_ports.insert(key.clone(), HashMap::new());
            port_map
                .entry(key)
                .or_default()
                .get_or_insert_with(Vec::new)
                .push(bollard::models::PortBinding {
                    host_ip: None,
                    host_port: Some(binding.host_port.to_string()),
                });
        }

        let binds: Vec<String> = self.volumes.iter().map(|v| v.bind_spec()).collect();

        let host_config = HostConfig {
            port_bindings: if port_map.is_empty() {
                None
            } else {
                Some(port_map)
            },
            binds: if binds.is_empty() { None } else { Some(binds) },
            network_mode: self.network_mode.clone(),
            ..Default::default()
        };

        Config {
            image: Some(self.image.clone()),
            hostname: self.hostname.clone(),
            env: if self.env.is_empty() {
                None
            } else {
                Some(self.env.clone())
            },
            cmd: if self.cmd.is_empty() {
                None
            } else {
                Some(self.cmd.clone())
            },
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            host_config: Some(host_config),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for DockerContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerContainer")
            .field("image", &self.image)
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("network_mode", &self.network_mode)
            .field("ports", &self.ports)
            .field("volumes", &self.volumes)
            .field("env", &self.env)
            .field("cmd", &self.cmd)
            .field("container_id", &self.container_id)
            .finish()
    }
}
