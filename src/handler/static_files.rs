//! Static file serving module
//!
//! Normalizes request paths, walks the ordered serving roots and builds the
//! file response.

use crate::config::roots::INDEX_FILE;
use crate::config::{AppState, ServingRoot};
use crate::handler::router::RequestContext;
use crate::http::range::ByteRange;
use crate::http::{self, cache, RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Why a request did not produce a file
#[derive(Debug)]
pub enum ServeError {
    NotFound,
    /// The path tried to leave its root
    Forbidden,
    Io(std::io::Error),
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::Forbidden => write!(f, "path escapes serving root"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// A request path split into safe segments relative to any root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    /// The raw path ended in `/` (or was `/`)
    directory: bool,
}

impl RequestPath {
    /// Percent-decode and normalize a URI path
    ///
    /// `.` segments are dropped and `..` folds into its parent. A `..` that
    /// would climb above the root, a NUL byte or a backslash is rejected as
    /// traversal.
    pub fn parse(raw: &str) -> Result<Self, ServeError> {
        let raw = raw.split(['?', '#']).next().unwrap_or_default();
        let decoded = percent_decode(raw).ok_or(ServeError::NotFound)?;
        if decoded.contains(['\0', '\\']) {
            return Err(ServeError::Forbidden);
        }

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(ServeError::Forbidden);
                    }
                }
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self {
            directory: segments.is_empty() || decoded.ends_with('/'),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub const fn is_directory(&self) -> bool {
        self.directory
    }
}

/// Decode `%XX` escapes; `None` for malformed escapes or invalid UTF-8
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// What a path names inside a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Canonical path of a regular file
    File(PathBuf),
    /// An index-serving directory requested without the trailing slash
    Directory,
}

/// Find the file for `path` inside a single root
///
/// A missing root, a missing file or a directory without index serving is
/// `NotFound`. The canonical result must stay inside the canonical root, so
/// symlinks pointing elsewhere are `Forbidden`.
pub async fn resolve(root: &ServingRoot, path: &RequestPath) -> Result<Resolved, ServeError> {
    let Ok(root_canonical) = fs::canonicalize(&root.path).await else {
        return Err(ServeError::NotFound);
    };

    let mut candidate = root_canonical.clone();
    candidate.extend(path.segments());

    let metadata = fs::metadata(&candidate)
        .await
        .map_err(|_| ServeError::NotFound)?;
    let redirect = metadata.is_dir() && !path.is_directory();
    if metadata.is_dir() {
        if !root.serve_index {
            return Err(ServeError::NotFound);
        }
        if !redirect {
            candidate.push(INDEX_FILE);
        }
    } else if path.is_directory() {
        return Err(ServeError::NotFound);
    }

    let canonical = fs::canonicalize(&candidate)
        .await
        .map_err(|_| ServeError::NotFound)?;
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            candidate.display(),
            canonical.display()
        ));
        return Err(ServeError::Forbidden);
    }
    if redirect {
        return Ok(Resolved::Directory);
    }

    match fs::metadata(&canonical).await {
        Ok(m) if m.is_file() => Ok(Resolved::File(canonical)),
        _ => Err(ServeError::NotFound),
    }
}

/// Walk the roots in order and return the first match with its root index
pub async fn lookup(
    roots: &[ServingRoot],
    path: &RequestPath,
) -> Result<(usize, Resolved), ServeError> {
    let mut outcome = ServeError::NotFound;
    for (index, root) in roots.iter().enumerate() {
        match resolve(root, path).await {
            Ok(found) => return Ok((index, found)),
            Err(ServeError::Forbidden) => outcome = ServeError::Forbidden,
            Err(_) => {}
        }
    }
    Err(outcome)
}

/// A file matched in one of the roots
///
/// Only metadata is collected here; the body is read when a response needs
/// it.
#[derive(Debug)]
pub struct StaticFile {
    pub path: PathBuf,
    /// Position of the matching root in the chain
    pub root: usize,
    pub content_type: String,
    pub size: u64,
    pub etag: String,
}

/// Outcome of looking a request path up in the root chain
#[derive(Debug)]
pub enum Served {
    File(StaticFile),
    /// Directory hit without a trailing slash
    Redirect,
}

/// Resolve a raw URI path against the state's roots
pub async fn load(state: &AppState, raw_path: &str) -> Result<Served, ServeError> {
    let request_path = RequestPath::parse(raw_path)?;
    let (root, path) = match lookup(&state.roots, &request_path).await? {
        (_, Resolved::Directory) => return Ok(Served::Redirect),
        (root, Resolved::File(path)) => (root, path),
    };

    let metadata = fs::metadata(&path).await.map_err(ServeError::Io)?;
    let size = metadata.len();
    let etag = cache::generate_etag(size, metadata.modified().ok());
    let content_type = state
        .mime
        .content_type(path.extension().and_then(|e| e.to_str()))
        .to_string();

    Ok(Served::File(StaticFile {
        path,
        root,
        content_type,
        size,
        etag,
    }))
}

/// Read `range` of the file at `path`
pub async fn read_range(path: &Path, range: ByteRange) -> std::io::Result<Bytes> {
    let mut file = fs::File::open(path).await?;
    file.seek(SeekFrom::Start(range.start)).await?;
    let len = usize::try_from(range.content_length())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let mut buf = vec![0; len];
    file.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}

/// Serve the request path from the root chain
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let result = match load(state, ctx.path).await {
        Ok(Served::File(file)) => build_static_file_response(ctx, &file).await,
        Ok(Served::Redirect) => Ok(http::build_301_response(&directory_location(ctx))),
        Err(err) => Err(err),
    };

    match result {
        Ok(resp) => resp,
        Err(ServeError::NotFound | ServeError::Forbidden) => http::build_404_response(),
        Err(err @ ServeError::Io(_)) => {
            logger::log_error(&format!("Failed to read '{}': {err}", ctx.path));
            http::build_500_response()
        }
    }
}

/// `Location` for a directory requested without its trailing slash
///
/// Leading slashes are collapsed so the target can never be read as a
/// network-path reference.
fn directory_location(ctx: &RequestContext<'_>) -> String {
    let path = ctx.path.trim_start_matches('/');
    match ctx.query {
        Some(query) => format!("/{path}/?{query}"),
        None => format!("/{path}/"),
    }
}

/// Build the file response with `ETag` and Range support
///
/// HEAD and 304 never touch the file contents; a range reads only its slice.
async fn build_static_file_response(
    ctx: &RequestContext<'_>,
    file: &StaticFile,
) -> Result<Response<Full<Bytes>>, ServeError> {
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &file.etag) {
        return Ok(http::build_304_response(&file.etag));
    }

    match http::parse_range_header(ctx.range_header.as_deref(), file.size) {
        RangeParseResult::Valid(range) => {
            let body = if ctx.is_head {
                None
            } else {
                Some(read_range(&file.path, range).await.map_err(ServeError::Io)?)
            };
            Ok(http::response::build_partial_response(
                body,
                range,
                file.size,
                &file.content_type,
                &file.etag,
            ))
        }
        RangeParseResult::NotSatisfiable => Ok(http::build_416_response(file.size)),
        RangeParseResult::None => {
            if ctx.is_head {
                return Ok(http::response::build_file_response(
                    None,
                    file.size,
                    &file.content_type,
                    &file.etag,
                ));
            }
            let data = Bytes::from(fs::read(&file.path).await.map_err(ServeError::Io)?);
            let size = data.len() as u64;
            Ok(http::response::build_file_response(
                Some(data),
                size,
                &file.content_type,
                &file.etag,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::Path;
    use tempfile::TempDir;

    fn segments(raw: &str) -> Vec<String> {
        RequestPath::parse(raw).unwrap().segments().to_vec()
    }

    #[test]
    fn test_parse_normalizes() {
        assert!(segments("/").is_empty());
        assert!(RequestPath::parse("/").unwrap().is_directory());
        assert_eq!(segments("/pkg/./app.js?x=1"), vec!["pkg", "app.js"]);
        assert_eq!(segments("/a/../b.txt"), vec!["b.txt"]);
        assert_eq!(segments("/my%20file.txt"), vec!["my file.txt"]);
        assert!(RequestPath::parse("/pkg/").unwrap().is_directory());
        assert!(!RequestPath::parse("/pkg").unwrap().is_directory());
    }

    #[test]
    fn test_parse_rejects_traversal() {
        for raw in ["/../secret", "/a/../../secret", "/%2e%2e/secret", "/a%5c..%5csecret", "/x%00"] {
            assert!(
                matches!(RequestPath::parse(raw), Err(ServeError::Forbidden)),
                "{raw} should be rejected"
            );
        }
        assert!(matches!(RequestPath::parse("/%zz"), Err(ServeError::NotFound)));
    }

    struct Fixture {
        _dir: TempDir,
        build: PathBuf,
        harness: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");
        let harness = dir.path().join("www");
        std::fs::create_dir_all(build.join("pkg")).unwrap();
        std::fs::create_dir_all(&harness).unwrap();
        std::fs::write(build.join("app.wasm"), b"0123456789").unwrap();
        std::fs::write(build.join("index.html"), b"build index").unwrap();
        std::fs::write(build.join("shared.js"), b"from build").unwrap();
        std::fs::write(harness.join("shared.js"), b"from harness").unwrap();
        std::fs::write(harness.join("index.html"), b"harness index").unwrap();
        std::fs::create_dir_all(harness.join("sub")).unwrap();
        std::fs::write(harness.join("sub").join("index.html"), b"sub index").unwrap();
        std::fs::write(dir.path().join("outside.txt"), b"secret").unwrap();
        Fixture {
            _dir: dir,
            build,
            harness,
        }
    }

    fn state(f: &Fixture) -> AppState {
        let config = Config::load_from("definitely-not-a-config-file").unwrap();
        AppState::new(
            config,
            vec![
                ServingRoot::new(&f.build, false),
                ServingRoot::new(&f.harness, true),
            ],
        )
    }

    async fn found(state: &AppState, raw: &str) -> StaticFile {
        match load(state, raw).await.unwrap() {
            Served::File(file) => file,
            Served::Redirect => panic!("{raw} was redirected"),
        }
    }

    fn contents(file: &StaticFile) -> Vec<u8> {
        std::fs::read(&file.path).unwrap()
    }

    fn context<'a>(path: &'a str, query: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            path,
            query,
            is_head: false,
            if_none_match: None,
            range_header: None,
        }
    }

    #[tokio::test]
    async fn test_build_root_shadows_harness() {
        let f = fixture();
        let file = found(&state(&f), "/shared.js").await;
        assert_eq!(contents(&file), b"from build");
        assert_eq!(file.root, 0);
    }

    #[tokio::test]
    async fn test_index_only_from_harness() {
        let f = fixture();
        let state = state(&f);

        let file = found(&state, "/").await;
        assert_eq!(contents(&file), b"harness index");
        assert_eq!(file.root, 1);

        // An explicit file name is not an index lookup
        let file = found(&state, "/index.html").await;
        assert_eq!(contents(&file), b"build index");

        // Directory in the build root without index serving falls through
        assert!(matches!(load(&state, "/pkg/").await, Err(ServeError::NotFound)));
        assert!(matches!(load(&state, "/pkg").await, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let f = fixture();
        let state = state(&f);

        assert!(matches!(load(&state, "/sub").await, Ok(Served::Redirect)));
        let file = found(&state, "/sub/").await;
        assert_eq!(contents(&file), b"sub index");

        let resp = serve(&context("/sub", Some("v=1")), &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[hyper::header::LOCATION], "/sub/?v=1");

        let resp = serve(&context("//sub", None), &state).await;
        assert_eq!(resp.headers()[hyper::header::LOCATION], "/sub/");
    }

    #[tokio::test]
    async fn test_wasm_content_type() {
        let f = fixture();
        let file = found(&state(&f), "/app.wasm").await;
        assert_eq!(file.content_type, "application/wasm");
        assert_eq!(file.size, 10);
    }

    #[tokio::test]
    async fn test_etag_follows_metadata() {
        let f = fixture();
        let state = state(&f);
        let before = found(&state, "/app.wasm").await.etag;
        assert_eq!(found(&state, "/app.wasm").await.etag, before);

        std::fs::write(f.build.join("app.wasm"), b"0123456789abc").unwrap();
        assert_ne!(found(&state, "/app.wasm").await.etag, before);
    }

    #[tokio::test]
    async fn test_range_reads_only_slice() {
        let f = fixture();
        let file = found(&state(&f), "/app.wasm").await;
        let slice = read_range(&file.path, ByteRange { start: 2, end: 4 })
            .await
            .unwrap();
        assert_eq!(&slice[..], b"234");

        let mut ctx = context("/app.wasm", None);
        ctx.range_header = Some("bytes=7-".to_string());
        let resp = serve(&ctx, &state(&f)).await;
        assert_eq!(resp.status(), hyper::StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[hyper::header::CONTENT_RANGE], "bytes 7-9/10");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_head_and_304_skip_reading() {
        use std::os::unix::fs::PermissionsExt;

        let f = fixture();
        let locked = f.build.join("app.wasm");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        // Root bypasses permission bits, nothing to observe there
        if std::fs::read(&locked).is_ok() {
            return;
        }
        let state = state(&f);

        let mut ctx = context("/app.wasm", None);
        ctx.is_head = true;
        let resp = serve(&ctx, &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::OK);
        assert_eq!(resp.headers()[hyper::header::CONTENT_LENGTH], "10");

        let etag = found(&state, "/app.wasm").await.etag;
        let mut ctx = context("/app.wasm", None);
        ctx.if_none_match = Some(etag);
        let resp = serve(&ctx, &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::NOT_MODIFIED);

        let resp = serve(&context("/app.wasm", None), &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_and_traversal() {
        let f = fixture();
        let state = state(&f);
        assert!(matches!(load(&state, "/missing.js").await, Err(ServeError::NotFound)));
        assert!(matches!(load(&state, "/app.wasm/").await, Err(ServeError::NotFound)));
        assert!(matches!(
            load(&state, "/../outside.txt").await,
            Err(ServeError::Forbidden)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_forbidden() {
        let f = fixture();
        let outside = f.build.parent().unwrap().join("outside.txt");
        std::os::unix::fs::symlink(&outside, f.harness.join("link.txt")).unwrap();

        std::os::unix::fs::symlink(f.build.parent().unwrap(), f.harness.join("up")).unwrap();

        let root = ServingRoot::new(&f.harness, true);
        let path = RequestPath::parse("/link.txt").unwrap();
        assert!(matches!(resolve(&root, &path).await, Err(ServeError::Forbidden)));
        // A directory outside the root is not redirected to either
        let path = RequestPath::parse("/up").unwrap();
        assert!(matches!(resolve(&root, &path).await, Err(ServeError::Forbidden)));
    }

    #[tokio::test]
    async fn test_missing_root_yields_no_matches() {
        let root = ServingRoot::new(Path::new("/nonexistent/static-gateway-root"), true);
        let path = RequestPath::parse("/").unwrap();
        assert!(matches!(resolve(&root, &path).await, Err(ServeError::NotFound)));
    }
}
