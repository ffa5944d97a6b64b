//! Request handler module
//!
//! Method checks and access logging in `router`, root-chain file lookup in
//! `static_files`.

pub mod router;
pub mod static_files;

pub use router::handle_request;
pub use static_files::{Served, ServeError, StaticFile};
