//! MIME type detection module
//!
//! Two-stage lookup: the configured override table first, then the built-in
//! extension table, then `application/octet-stream`.

use std::collections::HashMap;

/// Content type used when neither table knows the extension
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension to content-type table consulted before the built-in table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeTable {
    overrides: HashMap<String, String>,
}

impl MimeTable {
    /// Build a table from configured overrides
    ///
    /// Keys are matched case-insensitively and may be given with or without a
    /// leading dot (`wasm` and `.wasm` are the same entry).
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .map(|(ext, content_type)| (normalize_extension(ext), content_type.clone()))
            .collect();
        Self { overrides }
    }

    /// Add or replace entries; later entries win
    pub fn extend(&mut self, overrides: &HashMap<String, String>) {
        self.overrides.extend(
            overrides
                .iter()
                .map(|(ext, content_type)| (normalize_extension(ext), content_type.clone())),
        );
    }

    /// Table with the single `wasm` -> `application/wasm` entry
    pub fn wasm() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert("wasm".to_string(), "application/wasm".to_string());
        Self { overrides }
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Resolve the Content-Type for a file extension
    ///
    /// # Examples
    /// ```
    /// use static_gateway::http::mime::MimeTable;
    ///
    /// let table = MimeTable::wasm();
    /// assert_eq!(table.content_type(Some("wasm")), "application/wasm");
    /// assert_eq!(MimeTable::default().content_type(Some("wasm")), "application/octet-stream");
    /// ```
    pub fn content_type(&self, extension: Option<&str>) -> &str {
        if let Some(ext) = extension {
            if let Some(content_type) = self.overrides.get(&normalize_extension(ext)) {
                return content_type;
            }
        }
        get_content_type(extension)
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Get MIME Content-Type from the built-in extension table
///
/// `wasm` is deliberately absent: it is served as `application/wasm` only
/// through the override table.
///
/// # Examples
/// ```
/// use static_gateway::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
/// assert_eq!(get_content_type(Some("mp4")), "video/mp4");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "xml" => "application/xml",

        // Scripts and data
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Archives
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",

        _ => DEFAULT_CONTENT_TYPE,
    }
}
