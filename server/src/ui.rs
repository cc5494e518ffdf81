use std::path::Path;

use tower_http::services::ServeDir;

/// Serves stylesheets, scripts and images. Missing files are plain 404s.
#[must_use]
pub fn new_static_server(static_dir: &Path) -> ServeDir {
    ServeDir::new(static_dir).precompressed_gzip()
}
