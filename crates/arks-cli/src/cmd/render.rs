//! `arks render`

use anyhow::{Context, Result};
use arks_core::{Artifact, FsWalker, Helpers, RenderKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Render the whole port tree to stdout.
pub async fn render(port: PathBuf, kind: RenderKind, cancel: CancellationToken) -> Result<()> {
    super::blocking(move || render_to(&port, kind, &cancel, std::io::stdout().lock())).await
}

/// Render the whole port tree into `out`.
pub fn render_to<W: Write>(port: &Path, kind: RenderKind, cancel: &CancellationToken, out: W) -> Result<()> {
    let helpers = Helpers::standard();
    let mut renderer = kind.renderer(out);

    FsWalker::new(port)
        .with_cancel(cancel.clone())
        .walk(|config, _dir, app| {
            for group in Artifact::new(config, app, &helpers)?.items() {
                for item in group? {
                    renderer.render(config, &item)?;
                }
            }
            Ok(())
        })
        .with_context(|| format!("Failed to render {}", port.display()))?;

    renderer.flush().context("Failed to write output")?;
    Ok(())
}
