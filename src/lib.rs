//! Local static-file gateway
//!
//! Serves a build-output directory and an HTML harness directory on one HTTP
//! listener. The build output is checked first, without directory index
//! serving; the harness second, with `index.html` served for bare directory
//! requests. `.wasm` files can be forced to `application/wasm` through the
//! MIME override table.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
