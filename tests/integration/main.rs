//! Integration tests for instadb
//!
//! These tests require a Docker daemon.
//! Run with: `cargo test --test integration -- --ignored`


mod client;
mod databases;
mod lifecycle;
