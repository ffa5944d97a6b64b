// Serving roots
// Ordered (directory, index-serving) pairs tried in sequence for each request

use std::path::{Component, Path, PathBuf};

/// Build-output root used when no argument is given, relative to the harness root
///
/// Resolved from `<crate>/www`, this lands in `target/` two directories above
/// the crate, i.e. the shared target directory of a workspace laid out as
/// `<workspace>/<group>/static-gateway`. It is anchored to the harness rather
/// than the working directory so the result does not depend on where the
/// gateway is launched from. Pass a path argument for any other layout.
pub const DEFAULT_BUILD_ROOT: &str = "../../../target/wasm32-unknown-unknown/release";

/// Harness root, fixed at build time: the `www` directory beside the manifest
pub const HARNESS_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/www");

/// File served for a bare directory request when index serving is enabled
pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServingRoot {
    /// Absolute, lexically normalized directory path; may not exist
    pub path: PathBuf,
    pub serve_index: bool,
}

impl ServingRoot {
    pub fn new(path: impl Into<PathBuf>, serve_index: bool) -> Self {
        Self {
            path: path.into(),
            serve_index,
        }
    }

    /// Whether the root currently exists as a directory
    pub fn is_available(&self) -> bool {
        self.path.is_dir()
    }
}

/// Resolve the two serving roots in priority order
///
/// An argument is resolved against `cwd`; the default build-output root is
/// resolved against `harness`. Existence is not checked here.
pub fn resolve_roots(arg: Option<&Path>, cwd: &Path, harness: &Path) -> Vec<ServingRoot> {
    let harness = absolutize(harness, cwd);
    let build = match arg {
        Some(path) => absolutize(path, cwd),
        None => absolutize(Path::new(DEFAULT_BUILD_ROOT), &harness),
    };

    vec![ServingRoot::new(build, false), ServingRoot::new(harness, true)]
}

/// Join `path` onto `base` unless it is already absolute, then drop `.` and
/// fold `..` components without touching the filesystem
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the filesystem root leaves the root in place
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Report roots that are missing or not directories
///
/// Strict mode turns the first unusable root into a startup error; otherwise
/// each one is logged and simply never matches.
pub fn check_roots(roots: &[ServingRoot], strict: bool) -> Result<(), String> {
    for root in roots.iter().filter(|r| !r.is_available()) {
        let message = format!(
            "Serving root '{}' is missing or not a directory",
            root.path.display()
        );
        if strict {
            return Err(message);
        }
        crate::logger::log_warning(&format!("{message}; requests will not match it"));
    }
    Ok(())
}
