//! Docker client connection tests

use instadb::docker::DockerClient;

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_docker_connection() {
    let client = DockerClient::from_env().unwrap();
    let response = client.ping().await;
    assert!(response.is_ok());
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_server_info() {
    let client = DockerClient::from_env().unwrap();
    let info = client.server_info().await.unwrap();
    assert!(!info.version.is_empty());
    assert!(!info.api_version.is_empty());
}
