pub mod client;
pub mod container;
pub mod image;
pub mod logs;
pub mod ports;

pub use client::DockerClient;
pub use container::DockerContainer;
pub use image::DockerImage;
pub use logs::{ContainerLogger, LogEntry};
pub use ports::find_free_port;
