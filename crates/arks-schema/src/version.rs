//! Version lines.

use std::fmt;

/// One line of a `versions` listing: a canonical version followed by any
/// number of aliases, separated by whitespace.
///
/// ```
/// use arks_schema::Version;
///
/// let v = Version::new("1.2.3 1.2 latest");
/// assert_eq!(v.value(), "1.2.3");
/// assert_eq!(v.aliases().collect::<Vec<_>>(), ["1.2", "latest"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Wrap a version line, trimming surrounding whitespace.
    pub fn new(line: impl AsRef<str>) -> Self {
        Self(line.as_ref().trim().to_string())
    }

    /// The canonical value: the first token, or `""` for a blank line.
    pub fn value(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or_default()
    }

    /// Every token after the canonical value.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace().skip(1)
    }

    /// The canonical value followed by its aliases.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    /// Whether `value` names this version, canonically or by alias.
    pub fn matches(&self, value: &str) -> bool {
        self.values().any(|v| v == value)
    }

    /// Parse a whole listing, skipping blank lines and `#` comments.
    pub fn parse_list(text: &str) -> Vec<Version> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Version::new)
            .collect()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
