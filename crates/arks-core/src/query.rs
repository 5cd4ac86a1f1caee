//! Point queries: resolve one request identifier to one item.

use crate::app::App;
use crate::builder::Artifact;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::template::Helpers;
use crate::walk::FsWalker;
use arks_schema::{Item, Request};
use std::path::PathBuf;

/// Resolves a single request to its item.
pub trait Querier {
    /// Resolve `request`.
    ///
    /// # Errors
    ///
    /// Returns an error for which [`Error::is_not_found`] holds when nothing
    /// matches, or any other error raised on the way.
    fn query(&self, request: &Request) -> Result<Item>;
}

/// Answers queries by descending a port tree on disk.
///
/// Every call performs its own descent, so one querier can serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct FsQuerier {
    root: PathBuf,
    helpers: Helpers,
}

impl FsQuerier {
    /// Query the tree rooted at `root` using the standard helpers.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_helpers(root, Helpers::standard())
    }

    /// Query with an explicit helper set.
    pub fn with_helpers(root: impl Into<PathBuf>, helpers: Helpers) -> Self {
        Self {
            root: root.into(),
            helpers,
        }
    }

    fn render(&self, config: &Config, app: &App, request: &Request) -> Result<Item> {
        let artifact = Artifact::new(config, app, &self.helpers)?;
        let target = artifact
            .bindings()
            .resolve(&request.platform)
            .ok_or_else(|| Error::NotFound(format!("no binding for {}", request.platform)))?
            .clone();
        let version = artifact.canonical(&request.version);
        artifact.item(version, &request.version, &target, &request.platform)
    }
}

impl Querier for FsQuerier {
    fn query(&self, request: &Request) -> Result<Item> {
        let mut dir = self.root.clone();
        let mut rel = String::new();
        let mut step = FsWalker::step(&Config::default(), &dir, true).map_err(|e| Error::walk(".", e))?;
        let mut segments = request.segments().chain(std::iter::once(request.name.as_str()));

        loop {
            if let Some((config, app)) = step.artifact.take() {
                if app.name == request.name {
                    let label = if rel.is_empty() { "." } else { rel.as_str() };
                    tracing::debug!(dir = label, name = %app.name, "found artifact");
                    let item = self.render(&config, &app, request).map_err(|e| Error::walk(label, e))?;
                    tracing::debug!(%request, target = %item.target, "resolved");
                    return Ok(item);
                }
            }

            let Some(segment) = segments.next() else {
                return Err(Error::NotFound(format!("no artifact {:?} along {:?}", request.name, request.path)));
            };
            if matches!(segment, "." | "..") {
                return Err(Error::NotFound(format!("invalid path segment {segment:?}")));
            }

            dir.push(segment);
            if !rel.is_empty() {
                rel.push('/');
            }
            rel.push_str(segment);
            if !dir.is_dir() {
                return Err(Error::NotFound(rel));
            }

            tracing::trace!(dir = %rel, "query step");
            step = FsWalker::step(&step.config, &dir, false).map_err(|e| Error::walk(rel.as_str(), e))?;
        }
    }
}
