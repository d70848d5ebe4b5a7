//! Image presence management

use std::time::Duration;

use bollard::image::{CreateImageOptions, RemoveImageOptions};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::core::{require_not_blank, DockerError, Result};
use crate::docker::DockerClient;

/// A named image handle
///
/// Wraps the inspect/pull/remove calls needed to guarantee an image is
/// present (or absent) before containers are created from it.
#[derive(Clone)]
pub struct DockerImage {
    client: DockerClient,
    image: String,
}

impl DockerImage {
    pub fn new(client: DockerClient, image: impl Into<String>) -> Result<Self> {
        let image = image.into();
        require_not_blank(&image, "image name")?;
        Ok(Self { client, image })
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Check if the image is present locally
    pub async fn exists(&self) -> Result<bool> {
        match self.client.inner().inspect_image(&self.image).await {
            Ok(_) => {
                debug!("Image {} exists locally", self.image);
                Ok(true)
            }
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!("Image {} not found locally", self.image);
                Ok(false)
            }
            Err(e) => Err(DockerError::Image(format!(
                "Failed to inspect {}: {}",
                self.image, e
            ))
            .into()),
        }
    }

    /// Pull the image from its registry, bounded by `timeout`
    pub async fn pull(&self, timeout: Duration) -> Result<()> {
        info!("Pulling image: {}", self.image);

        let options = CreateImageOptions {
            from_image: self.image.clone(),
            ..Default::default()
        };

        let mut stream = self.client.inner().create_image(Some(options), None, None);

        let drain = async {
            while let Some(result) = stream.next().await {
                let progress = result.map_err(|e| {
                    DockerError::Image(format!("Failed to pull {}: {}", self.image, e))
                })?;
                if let Some(status) = progress.status {
                    debug!("Pull status for {}: {}", self.image, status);
                }
            }
            Ok::<(), DockerError>(())
        };

        tokio::time::timeout(timeout, drain)
            .await
            .map_err(|_| DockerError::Timeout {
                operation: format!("pull {}", self.image),
                duration: timeout.as_secs(),
            })??;

        info!("Image {} pulled successfully", self.image);
        Ok(())
    }

    /// Make sure the image is present, pulling it if missing
    pub async fn ensure_exists(&self, timeout: Duration) -> Result<()> {
        if self.exists().await? {
            return Ok(());
        }
        self.pull(timeout).await
    }

    /// Make sure the image is absent, force-removing it if present
    ///
    /// Removal is verified by a follow-up inspect.
    pub async fn ensure_not_exists(&self) -> Result<()> {
        if !self.exists().await? {
            return Ok(());
        }

        info!("Removing image: {}", self.image);

        let options = RemoveImageOptions {
            force: true,
            ..Default::default()
        };

        self.client
            .inner()
            .remove_image(&self.image, Some(options), None)
            .await
            .map_err(|e| DockerError::Image(format!("Failed to remove {}: {}", self.image, e)))?;

        if self.exists().await? {
            warn!("Image {} still exists after remove", self.image);
            return Err(DockerError::Image(format!(
                "{} still exists after remove",
                self.image
            ))
            .into());
        }

        info!("Image {} removed successfully", self.image);
        Ok(())
    }
}

impl std::fmt::Debug for DockerImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerImage")
            .field("image", &self.image)
            .finish()
    }
}
