//! Database facade round-trips (PostgreSQL, MySQL)

use std::time::Duration;

use instadb::core::PortBinding;
use instadb::db::{InstaDb, StartMode};
use instadb::docker::find_free_port;

use crate::common;

/// Start the database, wait for the port to accept connections, tear down
async fn round_trip(mut db: InstaDb, host_port: u16) -> anyhow::Result<()> {
    db.start(StartMode::Replace, Duration::from_secs(120)).await?;

    let readiness = async {
        let container = db.container().expect("container handle after start");
        container.wait_until_running(Duration::from_secs(30)).await?;
        common::wait_for_tcp(host_port, 20, Duration::from_secs(3)).await
    }
    .await;

    // tear down regardless of readiness outcome
    db.stop(Duration::from_secs(60)).await?;
    db.remove().await?;

    readiness
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_postgres_round_trip() -> anyhow::Result<()> {
    common::init_logging();
    let name = common::unique_name("instadb-pg");
    let host_port = find_free_port()?;

    let db = InstaDb::postgres(&name)?
        .port_binding(PortBinding::tcp(5432, host_port))
        .env(format!("POSTGRES_PASSWORD={}", host_port));

    round_trip(db, host_port).await
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_mysql_round_trip() -> anyhow::Result<()> {
    common::init_logging();
    let name = common::unique_name("instadb-mysql");
    let host_port = find_free_port()?;
    let mysqlx_port = find_free_port()?;

    let db = InstaDb::mysql(&name)?
        .port_binding(PortBinding::tcp(3306, host_port))
        .port_binding(PortBinding::tcp(33060, mysqlx_port))
        .env("MYSQL_ROOT_PASSWORD=123".to_string());

    round_trip(db, host_port).await
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_reuse_mode_restarts_existing_container() -> anyhow::Result<()> {
    common::init_logging();
    let name = common::unique_name("instadb-reuse");
    let host_port = find_free_port()?;

    let mut db = InstaDb::new("busybox:latest", &name)?
        .port_binding(PortBinding::tcp(65432, host_port))
        .cmd(["/bin/sleep".to_string(), "60".to_string()]);

    db.start(StartMode::Replace, Duration::from_secs(60)).await?;
    db.stop(Duration::from_secs(10)).await?;

    // Reuse must start the same container rather than creating a new one
    db.start(StartMode::Reuse, Duration::from_secs(60)).await?;
    let container = db.container_mut().expect("container handle after start");
    assert!(container.is_running().await?);

    container.ensure_stopped(Duration::from_secs(10)).await?;
    container.ensure_not_exists().await?;
    Ok(())
}
