//! `arks diff`

use anyhow::{Context, Result, bail};
use arks_core::snapshot::diff as diff_snapshots;
use arks_core::{Artifact, FsWalker, Helpers, Snapshot, SnapshotDiff};
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Print how each artifact's expansion differs from its snapshot. Fails when
/// anything differs.
pub async fn diff(port: PathBuf, cancel: CancellationToken) -> Result<()> {
    super::blocking(move || {
        let changes = diff_all(&port, &cancel)?;
        for (dir, change) in &changes {
            println!("{}", dir.as_str().bold());
            print!("{change}");
        }
        if !changes.is_empty() {
            bail!("{} artifact(s) differ from their snapshot", changes.len());
        }
        Ok(())
    })
    .await
}

/// Every artifact whose expansion differs from its stored snapshot.
pub fn diff_all(port: &Path, cancel: &CancellationToken) -> Result<Vec<(String, SnapshotDiff)>> {
    let helpers = Helpers::standard();
    let mut changes = Vec::new();

    FsWalker::new(port)
        .with_cancel(cancel.clone())
        .walk(|config, dir, app| {
            let current = Snapshot::from_groups(Artifact::new(config, app, &helpers)?.items())?;
            let stored = Snapshot::read(dir)?;
            let change = diff_snapshots(&stored, &current);
            if !change.is_empty() {
                changes.push((super::relative(port, dir), change));
            }
            Ok(())
        })
        .with_context(|| format!("Failed to diff {}", port.display()))?;

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::commit::commit_all;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_commit_then_diff() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a").join("tool");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("app.toml"),
            "path = \"{{.Version}}.zip\"\nplatforms = { \"_/_\" = \"linux/amd64\" }\n",
        )
        .unwrap();
        fs::write(dir.join("versions"), "1.0\n").unwrap();

        let cancel = CancellationToken::new();
        assert_eq!(diff_all(tmp.path(), &cancel).unwrap().len(), 1);

        assert_eq!(commit_all(tmp.path(), &cancel).unwrap(), vec!["a/tool"]);
        assert!(diff_all(tmp.path(), &cancel).unwrap().is_empty());

        fs::write(dir.join("versions"), "1.1\n1.0\n").unwrap();
        let changes = diff_all(tmp.path(), &cancel).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, "a/tool");
        assert_eq!(changes[0].1.added, vec!["a/tool/1.1.zip"]);
    }
}
