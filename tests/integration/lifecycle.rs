//! Container lifecycle tests against a throwaway busybox container

use std::time::Duration;

use instadb::core::PortBinding;
use instadb::docker::{find_free_port, DockerClient, DockerContainer, DockerImage};

use crate::common;

const BUSYBOX: &str = "busybox:latest";

/// Build a busybox container handle, pulling the image if needed
async fn busybox_container(name: &str) -> DockerContainer {
    let client = DockerClient::from_env().unwrap();

    let image = DockerImage::new(client.clone(), BUSYBOX).unwrap();
    image.ensure_exists(Duration::from_secs(60)).await.unwrap();

    DockerContainer::new(client, BUSYBOX, name).unwrap()
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_container_lifecycle() {
    common::init_logging();
    let name = common::unique_name("instadb-lifecycle");

    let mut subject = busybox_container(&name)
        .await
        .cmd(["/bin/sleep".to_string(), "30".to_string()]);

    subject.ensure_not_exists().await.unwrap();
    assert!(!subject.exists().await.unwrap(), "container should not exist");

    assert!(
        subject.ensure_exists().await.unwrap(),
        "first ensure_exists should create the container"
    );
    assert!(
        !subject.ensure_exists().await.unwrap(),
        "second ensure_exists should find it already there"
    );

    subject.create_or_replace().await.unwrap();
    assert!(subject.exists().await.unwrap());

    subject.ensure_running().await.unwrap();
    // idempotent on an already running container
    subject.ensure_running().await.unwrap();
    assert!(subject.is_running().await.unwrap());

    subject.ensure_stopped(Duration::from_secs(30)).await.unwrap();
    assert!(!subject.is_running().await.unwrap());

    // a stopped container can be replaced
    subject.create_or_replace().await.unwrap();

    subject.ensure_not_exists().await.unwrap();
    assert!(!subject.exists().await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_replace_creates_fresh_container() {
    common::init_logging();
    let name = common::unique_name("instadb-replace");

    let mut subject = busybox_container(&name)
        .await
        .cmd(["/bin/sleep".to_string(), "30".to_string()]);

    subject.ensure_not_exists().await.unwrap();
    subject.create_or_replace().await.unwrap();
    let first_id = subject.container_id().unwrap().to_string();

    assert!(
        !subject.ensure_exists().await.unwrap(),
        "ensure_exists must not recreate an existing container"
    );

    subject.create_or_replace().await.unwrap();
    let second_id = subject.container_id().unwrap().to_string();
    assert_ne!(first_id, second_id, "replace must create a fresh container");

    subject.ensure_not_exists().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_ensure_running_requires_container() {
    common::init_logging();
    let name = common::unique_name("instadb-missing");

    let mut subject = busybox_container(&name).await;
    subject.ensure_not_exists().await.unwrap();

    let err = subject.ensure_running().await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_container_configuration_applied() {
    common::init_logging();
    let name = common::unique_name("instadb-config");

    let mut subject = busybox_container(&name)
        .await
        .envs(["VAR1=value1".to_string(), "VAR2=value2".to_string()])
        .cmd(["/bin/sleep".to_string(), "30".to_string()])
        .hostname("insta-host");

    subject.create_or_replace().await.unwrap();
    subject.ensure_running().await.unwrap();

    let client = DockerClient::from_env().unwrap();
    let inspect = client
        .inner()
        .inspect_container(&name, None::<bollard::container::InspectContainerOptions>)
        .await
        .unwrap();

    let config = inspect.config.unwrap();
    let env = config.env.unwrap();
    assert!(env.contains(&"VAR1=value1".to_string()));
    assert!(env.contains(&"VAR2=value2".to_string()));
    assert_eq!(
        config.cmd.unwrap(),
        vec!["/bin/sleep".to_string(), "30".to_string()]
    );
    assert_eq!(config.hostname.as_deref(), Some("insta-host"));

    subject.ensure_not_exists().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_port_bindings_applied() {
    common::init_logging();
    let name = common::unique_name("instadb-ports");
    let host_port = find_free_port().unwrap();

    let mut subject = busybox_container(&name)
        .await
        .cmd(["/bin/sleep".to_string(), "30".to_string()])
        .port_binding(PortBinding::tcp(65432, host_port));

    subject.create_or_replace().await.unwrap();
    subject.ensure_running().await.unwrap();

    let client = DockerClient::from_env().unwrap();
    let inspect = client
        .inner()
        .inspect_container(&name, None::<bollard::container::InspectContainerOptions>)
        .await
        .unwrap();

    let ports = inspect.network_settings.unwrap().ports.unwrap();
    let bindings = ports.get("65432/tcp").unwrap().as_ref().unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].host_port.as_deref(), Some(host_port.to_string().as_str()));

    subject.ensure_not_exists().await.unwrap();
}
