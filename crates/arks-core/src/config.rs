//! Per-directory configuration fragments and their inheritance.

use crate::error::{Error, Result};
use arks_schema::PlatformMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Name of the optional per-directory configuration fragment.
pub const CONFIG_FILE: &str = "config.toml";

/// Where rendered targets live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Target {
    /// Base location, joined in front of every rendered template.
    pub path: String,
    /// Appended to `path` before the rendered template.
    pub suffix: String,
}

/// A named, inheritable template plus bindings that artifacts can reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Resolver {
    /// Path template.
    pub path: String,
    /// Resolver-specific bindings.
    pub platforms: PlatformMap,
}

/// A configuration node: either a decoded `config.toml` fragment or the
/// effective configuration of a directory after inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base path used in origins.
    pub path: String,
    /// Target location settings.
    pub target: Target,
    /// Named resolvers, keyed by name.
    pub resolvers: IndexMap<String, Resolver>,
    /// Tree-wide default bindings.
    pub platforms: PlatformMap,
}

impl Config {
    /// Decode a fragment from TOML text. `path` is only used for errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed TOML or unknown keys.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the fragment of `dir`, treating a missing file as empty.
    ///
    /// For a non-root directory (`dirname` is `Some`), empty `path` and
    /// `target.path` default to `./<dirname>` so both mirror the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be read, or
    /// [`Error::Decode`] if it is malformed.
    pub fn read(dir: &Path, dirname: Option<&str>) -> Result<Self> {
        let file = dir.join(CONFIG_FILE);
        let mut config = match fs::read_to_string(&file) {
            Ok(content) => Self::parse(&content, &file)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(Error::io(file, e)),
        };

        if let Some(name) = dirname {
            if config.path.is_empty() {
                config.path = format!("./{name}");
            }
            if config.target.path.is_empty() {
                config.target.path = format!("./{name}");
            }
        }
        Ok(config)
    }

    /// Merge a child `fragment` over this (inherited) configuration.
    ///
    /// Paths beginning with `.` are joined onto the inherited value, any
    /// other non-empty path replaces it. A non-empty suffix replaces the
    /// inherited one. Resolvers and bindings merge key-wise.
    pub fn merge(&self, fragment: &Config) -> Config {
        let mut merged = self.clone();
        merged.path = join_path(&self.path, &fragment.path);
        merged.target.path = join_path(&self.target.path, &fragment.target.path);
        if !fragment.target.suffix.is_empty() {
            merged.target.suffix.clone_from(&fragment.target.suffix);
        }
        for (name, resolver) in &fragment.resolvers {
            merged.resolvers.insert(name.clone(), resolver.clone());
        }
        merged.platforms.merge(&fragment.platforms);
        merged
    }

    /// This configuration with `path` moved up one level.
    pub fn rebased(&self) -> Config {
        let mut config = self.clone();
        config.path = match self.path.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => String::new(),
        };
        config
    }

    /// `target.path` followed by `target.suffix`.
    pub fn target_base(&self) -> String {
        format!("{}{}", self.target.path, self.target.suffix)
    }
}

/// Apply a path fragment to an inherited path.
///
/// Empty fragments keep `base`; fragments starting with `.` are joined onto
/// it and cleaned lexically; anything else replaces it. `..` never climbs
/// above the start of `base`. A `scheme://` prefix on `base` is preserved.
pub fn join_path(base: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        return base.to_string();
    }
    if !fragment.starts_with('.') {
        return fragment.to_string();
    }

    let (prefix, rest) = match base.find("://") {
        Some(i) => base.split_at(i + 3),
        None if base.starts_with('/') => ("/", &base[1..]),
        None => ("", base),
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split('/').chain(fragment.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    format!("{prefix}{}", parts.join("/"))
}
