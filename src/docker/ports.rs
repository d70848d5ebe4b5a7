//! Free-port search for host port bindings

use std::net::TcpListener;

use crate::core::{DockerError, Result};

const MAX_ATTEMPTS: u32 = 10;

/// Find a free host port by asking the OS for an ephemeral port
///
/// Note the port is released before returning, so another process may grab
/// it in the window before the container binds it.
pub fn find_free_port() -> Result<u16> {
    for _ in 0..MAX_ATTEMPTS {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", 0)) {
            if let Ok(addr) = listener.local_addr() {
                return Ok(addr.port());
            }
        }
    }
    Err(DockerError::NoFreePort {
        attempts: MAX_ATTEMPTS,
    }
    .into())
}
