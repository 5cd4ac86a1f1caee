//! Port tree traversal with cascading configuration.

use crate::app::App;
use crate::config::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Effective state of one directory.
#[derive(Debug, Clone)]
pub struct Step {
    /// Effective configuration inherited by subdirectories.
    pub config: Config,
    /// The artifact declared here, with the configuration it renders under.
    pub artifact: Option<(Config, App)>,
}

/// Depth-first walker over a port tree on disk.
///
/// Directories are visited root first, children in name order. Hidden
/// directories (leading `.`) are skipped.
#[derive(Debug, Clone)]
pub struct FsWalker {
    root: PathBuf,
    cancel: Option<CancellationToken>,
}

struct Pending {
    dir: PathBuf,
    rel: String,
    parent: Config,
}

impl FsWalker {
    /// Walk the tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cancel: None,
        }
    }

    /// Abort with [`Error::Cancelled`] once `token` is cancelled. Checked at
    /// every directory boundary.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Root of the tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Merge the fragment of `dir` over `parent` and read its descriptor.
    ///
    /// An artifact named like its directory renders with the config path
    /// moved up one level, so the artifact's origin ends in `<dir>/<name>`
    /// once rather than twice.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.toml`, `app.toml` or `versions` exists
    /// but cannot be read or decoded.
    pub fn step(parent: &Config, dir: &Path, is_root: bool) -> Result<Step> {
        let dirname = dirname(dir);
        let fragment = Config::read(dir, (!is_root).then_some(dirname.as_str()))?;
        let config = parent.merge(&fragment);

        let artifact = App::read(dir, &dirname)?.map(|app| {
            let effective = if app.name == dirname {
                config.rebased()
            } else {
                config.clone()
            };
            (effective, app)
        });
        Ok(Step { config, artifact })
    }

    /// Visit every artifact in the tree.
    ///
    /// `visit` receives the artifact's effective config, its directory and
    /// its descriptor. The first failure stops the walk and is returned
    /// wrapped with the directory it happened in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Walk`] for read, decode and visitor failures, or
    /// [`Error::Cancelled`].
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Config, &Path, &App) -> Result<()>,
    {
        let mut stack = vec![Pending {
            dir: self.root.clone(),
            rel: String::new(),
            parent: Config::default(),
        }];

        while let Some(Pending { dir, rel, parent }) = stack.pop() {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                tracing::debug!(dir = %dir.display(), "walk cancelled");
                return Err(Error::Cancelled);
            }

            let label = if rel.is_empty() { "." } else { rel.as_str() };
            tracing::debug!(dir = label, "entering");

            let (config, children) =
                Self::visit_dir(&dir, rel.is_empty(), &parent, &mut visit).map_err(|e| Error::walk(label, e))?;

            for name in children.into_iter().rev() {
                let child_rel = if rel.is_empty() {
                    name.clone()
                } else {
                    format!("{rel}/{name}")
                };
                stack.push(Pending {
                    dir: dir.join(&name),
                    rel: child_rel,
                    parent: config.clone(),
                });
            }
        }
        Ok(())
    }

    fn visit_dir<F>(dir: &Path, is_root: bool, parent: &Config, visit: &mut F) -> Result<(Config, Vec<String>)>
    where
        F: FnMut(&Config, &Path, &App) -> Result<()>,
    {
        let step = Self::step(parent, dir, is_root)?;
        if let Some((config, app)) = &step.artifact {
            tracing::debug!(name = %app.name, path = %config.path, "artifact");
            visit(config, dir, app)?;
        }
        Ok((step.config, subdirs(dir)?))
    }
}

/// Visible subdirectory names of `dir`, sorted.
fn subdirs(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

fn dirname(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_default()
}
