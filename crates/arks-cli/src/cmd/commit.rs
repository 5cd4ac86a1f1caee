//! `arks commit`

use anyhow::{Context, Result};
use arks_core::{Artifact, FsWalker, Helpers, Snapshot};
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Write a `snapshot` file into every artifact directory.
pub async fn commit(port: PathBuf, cancel: CancellationToken) -> Result<()> {
    super::blocking(move || {
        let written = commit_all(&port, &cancel)?;
        for dir in &written {
            println!("{} {dir}", "committed".green());
        }
        Ok(())
    })
    .await
}

/// Write all snapshots, returning the directories written.
pub fn commit_all(port: &Path, cancel: &CancellationToken) -> Result<Vec<String>> {
    let helpers = Helpers::standard();
    let mut written = Vec::new();

    FsWalker::new(port)
        .with_cancel(cancel.clone())
        .walk(|config, dir, app| {
            let snapshot = Snapshot::from_groups(Artifact::new(config, app, &helpers)?.items())?;
            snapshot.write(dir)?;
            tracing::debug!(dir = %dir.display(), targets = snapshot.len(), "snapshot written");
            written.push(super::relative(port, dir));
            Ok(())
        })
        .with_context(|| format!("Failed to commit {}", port.display()))?;

    Ok(written)
}
