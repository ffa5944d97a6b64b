// Application state module
// Immutable state shared by every connection after startup

use std::path::Path;

use super::roots::{self, ServingRoot};
use super::types::Config;
use crate::http::MimeTable;

/// Application state
///
/// Built once during initialization and only read afterwards, so it is
/// shared across tasks behind an `Arc` without locking.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Tried in order; the first root holding the file wins
    pub roots: Vec<ServingRoot>,
    pub mime: MimeTable,
}

impl AppState {
    pub fn new(config: Config, roots: Vec<ServingRoot>) -> Self {
        let mut mime = if config.mime.wasm_override {
            MimeTable::wasm()
        } else {
            MimeTable::default()
        };
        mime.extend(&config.mime.overrides);

        Self {
            config,
            roots,
            mime,
        }
    }

    /// Resolve roots from the optional command-line argument and check them
    pub fn from_config(config: Config, build_root: Option<&Path>) -> Result<Self, String> {
        let cwd = std::env::current_dir()
            .map_err(|e| format!("Cannot determine working directory: {e}"))?;
        let roots = roots::resolve_roots(build_root, &cwd, Path::new(roots::HARNESS_ROOT));
        roots::check_roots(&roots, config.server.strict_roots)?;
        Ok(Self::new(config, roots))
    }

    pub fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> Config {
        Config::load_from("definitely-not-a-config-file").unwrap()
    }

    #[test]
    fn test_wasm_variant() {
        let state = AppState::new(config(), Vec::new());
        assert_eq!(state.mime.content_type(Some("wasm")), "application/wasm");
    }

    #[test]
    fn test_empty_overrides_keep_selected_variant() {
        let mut cfg = config();
        cfg.mime.overrides = HashMap::new();
        let state = AppState::new(cfg.clone(), Vec::new());
        assert_eq!(state.mime.content_type(Some("wasm")), "application/wasm");

        cfg.mime.wasm_override = false;
        let state = AppState::new(cfg, Vec::new());
        assert_eq!(state.mime.content_type(Some("wasm")), "application/octet-stream");
        assert!(state.mime.is_empty());
    }

    #[test]
    fn test_plain_variant_with_extra_override() {
        let mut cfg = config();
        cfg.mime.wasm_override = false;
        cfg.mime.overrides = HashMap::from([("mjs".to_string(), "text/javascript".to_string())]);
        let state = AppState::new(cfg, Vec::new());

        assert_eq!(state.mime.content_type(Some("wasm")), "application/octet-stream");
        assert_eq!(state.mime.content_type(Some("mjs")), "text/javascript");
    }

    #[test]
    fn test_strict_roots_fail_fast() {
        let mut cfg = config();
        cfg.server.strict_roots = true;
        let missing = tempfile::tempdir().unwrap().path().join("missing");
        let err = AppState::from_config(cfg, Some(missing.as_path())).unwrap_err();
        assert!(err.contains("missing"));
    }
}
