//! Container log redirection

use bollard::container::{LogOutput, LogsOptions};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::docker::DockerClient;

/// Log entry from a container
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub message: String,
    pub is_stderr: bool,
}

/// Redirects a container's console output into the host logger
///
/// One background task per attached container follows the engine log stream
/// (stdout + stderr, full tail) and re-emits each line as a `tracing` event
/// tagged with the container name. The task ends when the stream ends and is
/// aborted when the logger is dropped.
#[derive(Debug)]
pub struct ContainerLogger {
    container: String,
    handle: JoinHandle<()>,
}

impl ContainerLogger {
    /// Start following the container's logs
    pub fn attach(client: &DockerClient, container: &str) -> Self {
        info!("Redirecting logs from container {}", container);

        let docker = client.clone();
        let name = container.to_string();

        let handle = tokio::spawn({
            let name = name.clone();
            async move {
                let options = LogsOptions::<String> {
                    stdout: true,
                    stderr: true,
                    timestamps: true,
                    follow: true,
                    tail: "all".to_string(),
                    ..Default::default()
                };

                let mut stream = docker.inner().logs(&name, Some(options));

                while let Some(result) = stream.next().await {
                    match result {
                        Ok(output) => {
                            if let Some(entry) = parse_log_output(output) {
                                info!(
                                    target: "instadb::container",
                                    container = %name,
                                    stderr = entry.is_stderr,
                                    "{}",
                                    entry.message
                                );
                            }
                        }
                        Err(e) => {
                            warn!("Failed to read logs from container {}: {}", name, e);
                            break;
                        }
                    }
                }

                debug!("Log stream ended for container {}", name);
            }
        });

        Self {
            container: name,
            handle,
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Stop following the container's logs
    pub fn detach(&self) {
        self.handle.abort();
    }
}

impl Drop for ContainerLogger {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Parse a raw log frame into a `LogEntry`, dropping empty frames
///
/// With `timestamps: true` the engine prefixes every line with an RFC3339
/// timestamp; it is split off into the `timestamp` field.
pub fn parse_log_output(output: LogOutput) -> Option<LogEntry> {
    let (raw, is_stderr) = match output {
        LogOutput::StdOut { message } => (String::from_utf8_lossy(&message).to_string(), false),
        LogOutput::Console { message } => (String::from_utf8_lossy(&message).to_string(), false),
        LogOutput::StdErr { message } => (String::from_utf8_lossy(&message).to_string(), true),
        LogOutput::StdIn { .. } => return None,
    };

    let line = raw.trim_end();
    if line.is_empty() {
        return None;
    }

    let (timestamp, message) = match line.split_once(' ') {
        Some((prefix, rest)) => match chrono::DateTime::parse_from_rfc3339(prefix) {
            Ok(ts) => (Some(ts.with_timezone(&chrono::Utc)), rest.to_string()),
            Err(_) => (None, line.to_string()),
        },
        None => (None, line.to_string()),
    };

    if message.trim().is_empty() {
        return None;
    }

    Some(LogEntry {
        timestamp,
        message,
        is_stderr,
    })
}
