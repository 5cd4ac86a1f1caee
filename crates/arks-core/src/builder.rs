//! Item expansion: `version x platform` for one artifact.

use crate::app::App;
use crate::config::Config;
use crate::error::Result;
use crate::template::{Helpers, Template, Vars, join_target};
use arks_schema::{Item, Platform, PlatformMap, Version, origin};

/// An artifact ready to render: effective config values, compiled template
/// and effective bindings.
#[derive(Debug)]
pub struct Artifact {
    path: String,
    name: String,
    target_base: String,
    template: Template,
    bindings: PlatformMap,
    versions: Vec<Version>,
}

impl Artifact {
    /// Prepare `app` under its effective `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is missing or does not compile, or
    /// the descriptor names an unknown resolver.
    pub fn new(config: &Config, app: &App, helpers: &Helpers) -> Result<Self> {
        let template = Template::compile(app.template(config)?, helpers)?;
        Ok(Self {
            path: config.path.clone(),
            name: app.name.clone(),
            target_base: config.target_base(),
            template,
            bindings: app.bindings(config)?,
            versions: app.versions.clone(),
        })
    }

    /// Artifact name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective bindings.
    pub fn bindings(&self) -> &PlatformMap {
        &self.bindings
    }

    /// Canonical version for a requested value. Undeclared values are
    /// passed through unchanged.
    pub fn canonical<'a>(&'a self, requested: &'a str) -> &'a str {
        self.versions
            .iter()
            .find(|v| v.matches(requested))
            .map_or(requested, Version::value)
    }

    /// Render one item.
    ///
    /// `version` is the canonical version used for rendering, `requested`
    /// the value embedded in the origin. `source` is the concrete platform
    /// that maps to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Template`] if rendering fails.
    pub fn item(&self, version: &str, requested: &str, target: &Platform, source: &Platform) -> Result<Item> {
        let rendered = self.template.render(&Vars {
            path: &self.path,
            name: &self.name,
            version,
            platform: target,
        })?;
        Ok(Item {
            path: self.path.clone(),
            name: self.name.clone(),
            version: version.to_string(),
            platform: target.clone(),
            origin: origin(&self.path, &self.name, requested, source),
            target: join_target(&self.target_base, &rendered),
        })
    }

    /// Lazily expand every declared version value over every bound platform.
    pub fn items(self) -> ItemStream {
        let groups = self.bindings.expand();
        ItemStream {
            artifact: self,
            groups,
            version: 0,
            value: 0,
        }
    }
}

/// Pull-based sequence of item groups, one group per version value.
///
/// Values come in declaration order, the canonical value of a version line
/// before its aliases. Every value gets its own origins, so `tool@latest`
/// and `tool@1.2` are distinct keys that share a target. A group holds one
/// item per concrete source platform.
/// A render failure is yielded as `Err` for that group; pulling again moves
/// on to the next value.
#[derive(Debug)]
pub struct ItemStream {
    artifact: Artifact,
    groups: Vec<(Platform, Vec<Platform>)>,
    version: usize,
    value: usize,
}

impl ItemStream {
    /// The artifact being expanded.
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    fn next_value(&mut self) -> Option<(String, String)> {
        if self.groups.is_empty() {
            return None;
        }
        loop {
            let line = self.artifact.versions.get(self.version)?;
            if let Some(value) = line.values().nth(self.value) {
                self.value += 1;
                return Some((line.value().to_string(), value.to_string()));
            }
            self.version += 1;
            self.value = 0;
        }
    }

    fn group(&self, version: &str, requested: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        for (target, sources) in &self.groups {
            for source in sources {
                items.push(self.artifact.item(version, requested, target, source)?);
            }
        }
        Ok(items)
    }
}

impl Iterator for ItemStream {
    type Item = Result<Vec<Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (version, requested) = self.next_value()?;
        tracing::trace!(name = %self.artifact.name, %version, %requested, "expanding");
        Some(self.group(&version, &requested))
    }
}
