//! Resolved items and request identifiers.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A fully resolved artifact location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Inherited config path of the artifact.
    pub path: String,
    /// Artifact name.
    pub name: String,
    /// Canonical version.
    pub version: String,
    /// Resolved target platform.
    pub platform: Platform,
    /// Stable identity of the requested build, see [`origin`].
    pub origin: String,
    /// Rendered download location.
    pub target: String,
}

/// Identity string of one `(path, name, version, source platform)` build:
/// `path/name@version/os/arch`, with `/variant` appended only when the
/// source platform carries one.
///
/// ```
/// use arks_schema::{origin, Platform};
///
/// let o = origin("github.com/x", "tool", "1.0", &Platform::parse("linux/amd64"));
/// assert_eq!(o, "github.com/x/tool@1.0/linux/amd64");
/// ```
pub fn origin(path: &str, name: &str, version: &str, source: &Platform) -> String {
    let mut s = format!("{path}/{name}@{version}/{}/{}", source.os, source.arch);
    if !source.variant.is_empty() {
        s.push('/');
        s.push_str(&source.variant);
    }
    s
}

/// Errors from parsing a request identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// No `@` separating name and version.
    #[error("missing '@' in {0:?}")]
    MissingVersion(String),

    /// Nothing between the last `/` and `@`.
    #[error("missing artifact name in {0:?}")]
    MissingName(String),

    /// Empty version, or no `/` after it.
    #[error("missing platform in {0:?}")]
    MissingPlatform(String),

    /// The platform lacks an OS or an architecture, or names a wildcard.
    #[error("invalid platform {platform:?} in {id:?}")]
    InvalidPlatform {
        /// Offending identifier.
        id: String,
        /// Platform part as parsed.
        platform: String,
    },
}

/// A parsed `<path>/<name>@<version>/<os>/<arch>[/<variant>]` identifier.
///
/// The last `@` separates the version, so names may not contain one but the
/// version may. Path may be empty (`/tool@1.0/linux/amd64` or
/// `tool@1.0/linux/amd64`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Directory path, without the artifact name.
    pub path: String,
    /// Artifact name.
    pub name: String,
    /// Requested version or alias.
    pub version: String,
    /// Requested platform, as written.
    pub platform: Platform,
}

impl Request {
    /// Parse an identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] when any of the four parts is missing or
    /// the platform has no OS or architecture. Wildcard tokens only belong in
    /// binding patterns and are rejected too.
    pub fn parse(id: &str) -> Result<Self, RequestError> {
        let (head, tail) = id
            .rsplit_once('@')
            .ok_or_else(|| RequestError::MissingVersion(id.to_string()))?;

        let (path, name) = head.rsplit_once('/').unwrap_or(("", head));
        if name.is_empty() {
            return Err(RequestError::MissingName(id.to_string()));
        }

        let (version, platform) = tail
            .split_once('/')
            .filter(|(v, _)| !v.is_empty())
            .ok_or_else(|| RequestError::MissingPlatform(id.to_string()))?;

        let platform = Platform::parse(platform);
        if platform.os.is_empty() || platform.arch.is_empty() || platform.has_wildcard() {
            return Err(RequestError::InvalidPlatform {
                id: id.to_string(),
                platform: platform.to_string(),
            });
        }

        Ok(Self {
            path: path.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            platform,
        })
    }

    /// Path segments leading to the artifact, without empty segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }
}

impl FromStr for Request {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}/{}", self.path, self.name, self.version, self.platform)
    }
}
