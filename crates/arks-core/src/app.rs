//! Artifact descriptors (`app.toml` plus `versions`).

use crate::config::{CONFIG_FILE, Config, Resolver};
use crate::error::{Error, Result};
use arks_schema::{PlatformMap, Version};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the artifact descriptor file.
pub const APP_FILE: &str = "app.toml";

/// Name of the version listing kept beside the descriptor.
pub const VERSIONS_FILE: &str = "versions";

/// An artifact declared by a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct App {
    /// Artifact name. Defaults to the directory name.
    pub name: String,
    /// Path template. Falls back to the referenced resolver's template.
    pub path: String,
    /// Resolver to inherit the template and bindings from.
    pub resolver: String,
    /// Artifact-local bindings.
    pub platforms: PlatformMap,
    /// Declared versions, read from [`VERSIONS_FILE`].
    #[serde(skip)]
    pub versions: Vec<Version>,
    /// Descriptor file, for error messages.
    #[serde(skip)]
    pub source: PathBuf,
}

impl App {
    /// Read the descriptor of `dir`, if it declares one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Decode`] when `app.toml` or
    /// `versions` exists but cannot be read or decoded.
    pub fn read(dir: &Path, dirname: &str) -> Result<Option<Self>> {
        let file = dir.join(APP_FILE);
        let content = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(file, e)),
        };

        let mut app: App = toml::from_str(&content).map_err(|source| Error::Decode {
            path: file.clone(),
            source,
        })?;
        if app.name.is_empty() {
            app.name = dirname.to_string();
        }
        app.source = file;

        let versions = dir.join(VERSIONS_FILE);
        app.versions = match fs::read_to_string(&versions) {
            Ok(text) => Version::parse_list(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(Error::io(versions, e)),
        };

        tracing::trace!(name = %app.name, versions = app.versions.len(), "read descriptor");
        Ok(Some(app))
    }

    /// The resolver this artifact inherits from, if any.
    ///
    /// An explicit `resolver` must exist in `config`. Without one, a
    /// resolver named like the artifact is used when present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] if the explicitly named resolver is not
    /// defined anywhere up the tree.
    pub fn resolver<'a>(&self, config: &'a Config) -> Result<Option<&'a Resolver>> {
        if self.resolver.is_empty() {
            return Ok(config.resolvers.get(&self.name));
        }
        config
            .resolvers
            .get(&self.resolver)
            .map(Some)
            .ok_or_else(|| Error::Invalid {
                path: self.source.clone(),
                reason: format!(
                    "unknown resolver {:?} (declare it in a {CONFIG_FILE} above)",
                    self.resolver
                ),
            })
    }

    /// The path template in effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] when neither the descriptor nor a resolver
    /// supplies a template.
    pub fn template<'a>(&'a self, config: &'a Config) -> Result<&'a str> {
        if !self.path.is_empty() {
            return Ok(&self.path);
        }
        match self.resolver(config)? {
            Some(r) if !r.path.is_empty() => Ok(&r.path),
            _ => Err(Error::Invalid {
                path: self.source.clone(),
                reason: "no path template".to_string(),
            }),
        }
    }

    /// Effective bindings: tree-wide defaults, then the resolver's, then
    /// the descriptor's own, later entries overriding equal patterns.
    ///
    /// # Errors
    ///
    /// See [`App::resolver`].
    pub fn bindings(&self, config: &Config) -> Result<PlatformMap> {
        let mut bindings = config.platforms.clone();
        if let Some(resolver) = self.resolver(config)? {
            bindings.merge(&resolver.platforms);
        }
        bindings.merge(&self.platforms);
        Ok(bindings)
    }
}
