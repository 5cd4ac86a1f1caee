//! `arks test`: origin conflict check across the whole tree.

use anyhow::{Context, Result, bail};
use arks_core::{Artifact, ConflictChecker, FsWalker, Helpers};
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Fail if two artifact directories produce the same origin.
pub async fn test(port: PathBuf, cancel: CancellationToken) -> Result<()> {
    super::blocking(move || {
        let checker = check(&port, &cancel)?;
        for conflict in checker.conflicts() {
            println!(
                "{} {} ({} vs {})",
                "conflict".red().bold(),
                conflict.origin,
                conflict.first,
                conflict.second
            );
        }
        let count = checker.conflicts().len();
        if count > 0 {
            bail!("{count} conflicting origin(s)");
        }
        println!("{} {} origins", "ok".green(), checker.origins());
        Ok(())
    })
    .await
}

/// Feed every item in the tree through a [`ConflictChecker`].
pub fn check(port: &Path, cancel: &CancellationToken) -> Result<ConflictChecker> {
    let helpers = Helpers::standard();
    let mut checker = ConflictChecker::new();

    FsWalker::new(port)
        .with_cancel(cancel.clone())
        .walk(|config, dir, app| {
            let owner = super::relative(port, dir);
            for group in Artifact::new(config, app, &helpers)?.items() {
                for item in group? {
                    checker.check(&owner, &item);
                }
            }
            Ok(())
        })
        .with_context(|| format!("Failed to test {}", port.display()))?;

    Ok(checker)
}
