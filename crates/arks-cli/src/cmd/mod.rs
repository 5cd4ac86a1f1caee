//! Command handlers.

pub mod commit;
pub mod completions;
pub mod conflicts;
pub mod diff;
pub mod query;
pub mod render;

use anyhow::{Context, Result};
use std::path::Path;

/// Run a synchronous tree operation on the blocking pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("port tree task failed")?
}

/// `dir` relative to the port root, `.` for the root itself.
pub(crate) fn relative(port: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(port).unwrap_or(dir).display().to_string();
    if rel.is_empty() { ".".to_string() } else { rel }
}
