//! Server module
//!
//! Binds the listener and runs the accept loop. The gateway has two phases:
//! `Initializing` until the listener is bound, then `Serving` until the
//! process is killed.

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::wait_for_termination;

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Gateway lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Serving,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "INITIALIZING"),
            Self::Serving => write!(f, "SERVING"),
        }
    }
}

/// A bound gateway, ready to serve
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the configured address
    ///
    /// A bind failure is returned with the address in the message; the
    /// caller treats it as fatal.
    pub fn bind(state: Arc<AppState>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let addr = state.config.get_socket_addr()?;
        let listener = create_listener(addr).map_err(|e| {
            logger::log_bind_failed(&addr, &e);
            format!("Failed to bind {addr}: {e}")
        })?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the process is killed
    pub async fn run(self) {
        if let Ok(addr) = self.local_addr() {
            logger::log_server_start(&addr, &self.state);
        }
        logger::log_phase(Phase::Serving);
        start_server_loop(self.listener, self.state, Arc::new(AtomicUsize::new(0))).await;
    }
}
