// Command line options
// The gateway takes at most one positional argument: the build-output root

use clap::Parser;
use std::path::PathBuf;

/// Serve wasm build output and its HTML harness on one local HTTP port
#[derive(Debug, Parser, PartialEq, Eq)]
#[command(name = "static-gateway", version, about)]
pub struct Cli {
    /// Build-output directory, checked before the harness directory.
    /// Relative paths are taken from the current directory. Defaults to
    /// ../../../target/wasm32-unknown-unknown/release from the harness directory.
    #[arg(value_name = "BUILD_OUTPUT_ROOT")]
    pub build_root: Option<PathBuf>,
}
