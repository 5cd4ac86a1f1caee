//! Platform model: `os/arch/variant` triples, alias normalization and
//! wildcard expansion.
//!
//! Vendors disagree on architecture names (`x86_64` vs `amd64`, `aarch64`
//! vs `arm64`), so requests are normalized before matching while pattern
//! expansion deliberately produces every spelling a client might ask for.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! platform_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(String);

        impl $name {
            /// Create a token from the given string (stored as-is, case-sensitive).
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the token as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

platform_token!(
    /// Operating system token (`linux`, `windows`, `darwin`, or the wildcard `_`).
    Os
);
platform_token!(
    /// CPU architecture token, possibly a wildcard such as `_64` or `_arm`.
    Arch
);
platform_token!(
    /// Free-form architecture variant (`v6`, `v7`, ...). Never interpreted.
    Variant
);

/// The wildcard token matching any OS or any architecture.
pub const WILDCARD: &str = "_";

/// Reserved architecture wildcard tokens. Valid on the pattern side of a
/// binding only.
pub const ARCH_WILDCARDS: [&str; 9] = [
    "_", "_32", "_64", "_amd", "_arm", "_amd32", "_amd64", "_arm32", "_arm64",
];

impl Os {
    /// Linux.
    pub const LINUX: &'static str = "linux";
    /// Microsoft Windows.
    pub const WINDOWS: &'static str = "windows";
    /// Apple's kernel name, used for macOS builds.
    pub const DARWIN: &'static str = "darwin";

    /// Whether this is the OS wildcard `_`.
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }
}

impl Arch {
    /// Whether this is one of the reserved architecture wildcards.
    pub fn is_wildcard(&self) -> bool {
        ARCH_WILDCARDS.contains(&self.0.as_str())
    }

    /// Collapse vendor aliases onto one canonical name
    /// (`x86_64` -> `amd64`, `aarch32` -> `arm`, `aarch64` -> `arm64`).
    pub fn normalized(&self) -> Self {
        match self.as_str() {
            "x86_64" => Self::new("amd64"),
            "aarch32" => Self::new("arm"),
            "aarch64" => Self::new("arm64"),
            _ => self.clone(),
        }
    }

    /// 32-bit architecture (`arm`, `x86`).
    pub fn is_32(&self) -> bool {
        matches!(self.as_str(), "arm" | "x86")
    }

    /// 64-bit architecture (`arm64`, `amd64`).
    pub fn is_64(&self) -> bool {
        matches!(self.as_str(), "arm64" | "amd64")
    }

    /// Any Intel/AMD architecture.
    pub fn is_amd(&self) -> bool {
        matches!(self.as_str(), "x86" | "x86_64" | "amd64")
    }

    /// Any ARM architecture.
    pub fn is_arm(&self) -> bool {
        matches!(self.as_str(), "arm" | "arm64")
    }

    /// 32-bit Intel/AMD.
    pub fn is_amd32(&self) -> bool {
        self.as_str() == "x86"
    }

    /// 64-bit Intel/AMD.
    pub fn is_amd64(&self) -> bool {
        matches!(self.as_str(), "amd64" | "x86_64")
    }

    /// 32-bit ARM.
    pub fn is_arm32(&self) -> bool {
        self.as_str() == "arm"
    }

    /// 64-bit ARM.
    pub fn is_arm64(&self) -> bool {
        self.as_str() == "arm64"
    }
}

/// A build target: ordered `(os, arch, variant)` triple.
///
/// The textual form is `os/arch/variant` with trailing separators trimmed,
/// so `linux/amd64` and `linux/arm/v6` are both valid. Parsing never fails:
/// missing trailing tokens are simply empty.
///
/// # Example
///
/// ```
/// use arks_schema::Platform;
///
/// let p = Platform::parse("linux/x86_64/");
/// assert_eq!(p.normalized().to_string(), "linux/amd64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
    /// Architecture variant, empty when unspecified.
    pub variant: Variant,
}

impl Platform {
    /// Build a platform from its three tokens.
    pub fn new(os: impl Into<String>, arch: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            os: Os::new(os),
            arch: Arch::new(arch),
            variant: Variant::new(variant),
        }
    }

    /// Split `s` on `/` into at most three tokens.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(3, '/');
        let os = parts.next().unwrap_or_default();
        let arch = parts.next().unwrap_or_default();
        let variant = parts.next().unwrap_or_default();
        Self::new(os, arch, variant)
    }

    /// Canonical form of this platform.
    ///
    /// - empty OS yields the empty platform
    /// - empty arch yields an OS-only platform
    /// - architecture aliases are collapsed (see [`Arch::normalized`])
    pub fn normalized(&self) -> Self {
        if self.os.is_empty() {
            return Self::default();
        }
        if self.arch.is_empty() {
            return Self::new(self.os.as_str(), "", "");
        }
        Self {
            os: self.os.clone(),
            arch: self.arch.normalized(),
            variant: Variant::new(self.variant.trim_end_matches('/')),
        }
    }

    /// Whether all three tokens are empty.
    pub fn is_empty(&self) -> bool {
        self.os.is_empty() && self.arch.is_empty() && self.variant.is_empty()
    }

    /// Whether the OS or the arch token is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.os.is_wildcard() || self.arch.is_wildcard()
    }

    /// Expand a (possibly wildcarded) pattern into the concrete platforms it
    /// denotes.
    ///
    /// A pattern without wildcards yields exactly its normalized self. The
    /// OS wildcard expands to `linux`, `windows` and `darwin`; arch wildcards
    /// expand to the spellings each OS uses in the wild. The variant is
    /// carried through unchanged. A pattern whose OS or arch is empty yields
    /// nothing.
    pub fn expand(&self) -> impl Iterator<Item = Platform> {
        let p = self.normalized();
        let oses: Vec<Os> = if p.os.is_empty() || p.arch.is_empty() {
            Vec::new()
        } else if p.os.is_wildcard() {
            [Os::LINUX, Os::WINDOWS, Os::DARWIN].map(Os::from).to_vec()
        } else {
            vec![p.os.clone()]
        };

        let Platform { arch, variant, .. } = p;
        oses.into_iter().flat_map(move |os| {
            let variant = variant.clone();
            arch_candidates(&os, &arch)
                .into_iter()
                .map(move |arch| Platform {
                    os: os.clone(),
                    arch,
                    variant: variant.clone(),
                })
        })
    }
}

/// Concrete architecture spellings an arch token denotes on `os`.
fn arch_candidates(os: &Os, arch: &Arch) -> Vec<Arch> {
    if !arch.is_wildcard() {
        return vec![arch.clone()];
    }

    let names: &[&str] = match (os.as_str(), arch.as_str()) {
        (Os::LINUX, "_") => &["x86", "x86_64", "aarch32", "aarch64", "amd64", "arm64"],
        (Os::LINUX, "_32") => &["x86", "aarch32"],
        (Os::LINUX, "_64") => &["x86_64", "aarch64", "amd64", "arm64"],
        (Os::LINUX, "_amd") => &["x86", "x86_64", "amd64"],
        (Os::LINUX, "_arm") => &["aarch32", "aarch64", "arm64"],
        (Os::LINUX, "_amd32") => &["x86"],
        (Os::LINUX, "_arm32") => &["aarch32"],
        (Os::LINUX, "_amd64") => &["x86_64", "amd64"],
        (Os::LINUX, "_arm64") => &["aarch64", "arm64"],

        (Os::WINDOWS, "_") => &["AMD64", "x86", "ARM64", "ARM"],
        (Os::WINDOWS, "_32") => &["x86", "ARM"],
        (Os::WINDOWS, "_64") => &["AMD64", "ARM64"],
        (Os::WINDOWS, "_amd") => &["AMD64", "x86"],
        (Os::WINDOWS, "_arm") => &["ARM64", "ARM"],
        (Os::WINDOWS, "_amd32") => &["x86"],
        (Os::WINDOWS, "_arm32") => &["ARM"],
        (Os::WINDOWS, "_amd64") => &["AMD64"],
        (Os::WINDOWS, "_arm64") => &["ARM64"],

        (Os::DARWIN, "_" | "_64") => &["x86_64", "arm64"],
        (Os::DARWIN, "_amd" | "_amd64") => &["x86_64"],
        (Os::DARWIN, "_arm" | "_arm64") => &["arm64"],

        // No 32-bit darwin, and no table for other systems.
        _ => &[],
    };
    names.iter().copied().map(Arch::from).collect()
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{}/{}/{}", self.os, self.arch, self.variant);
        f.write_str(s.trim_end_matches('/'))
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn expanded(pattern: &str) -> BTreeSet<String> {
        Platform::parse(pattern)
            .expand()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn test_parse_splits_three_tokens() {
        let p = Platform::parse("linux/arm/v6");
        assert_eq!(p.os, "linux");
        assert_eq!(p.arch, "arm");
        assert_eq!(p.variant, "v6");

        let p = Platform::parse("linux");
        assert_eq!(p.os, "linux");
        assert!(p.arch.is_empty());
        assert!(p.variant.is_empty());
    }

    #[test]
    fn test_display_trims_trailing_separators() {
        assert_eq!(Platform::parse("linux/amd64/").to_string(), "linux/amd64");
        assert_eq!(Platform::parse("linux//").to_string(), "linux");
        assert_eq!(Platform::parse("linux/arm/v7").to_string(), "linux/arm/v7");
    }

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(Platform::parse("linux/x86_64").normalized().to_string(), "linux/amd64");
        assert_eq!(Platform::parse("linux/aarch64").normalized().to_string(), "linux/arm64");
        assert_eq!(Platform::parse("linux/aarch32/v7").normalized().to_string(), "linux/arm/v7");
        assert_eq!(Platform::parse("/amd64").normalized(), Platform::default());
        assert_eq!(Platform::parse("linux//v6").normalized().to_string(), "linux");
    }

    #[test]
    fn test_expand_non_wildcard_is_identity() {
        let all: Vec<_> = Platform::parse("linux/x86_64").expand().collect();
        assert_eq!(all, vec![Platform::parse("linux/amd64")]);
    }

    #[test]
    fn test_expand_linux_64() {
        let want: BTreeSet<String> = ["linux/x86_64", "linux/aarch64", "linux/amd64", "linux/arm64"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(expanded("linux/_64/"), want);
    }

    #[test]
    fn test_expand_os_wildcard_covers_each_os() {
        let got = expanded("_/_amd64");
        assert!(got.contains("linux/x86_64"));
        assert!(got.contains("linux/amd64"));
        assert!(got.contains("windows/AMD64"));
        assert!(got.contains("darwin/x86_64"));
        assert_eq!(got.len(), 4);
    }

    #[test]
    fn test_expand_carries_variant() {
        let got = expanded("linux/_32/v7");
        assert_eq!(
            got,
            ["linux/x86/v7", "linux/aarch32/v7"]
                .into_iter()
                .map(String::from)
                .collect()
        );
    }

    #[test]
    fn test_expand_empty_and_unknown() {
        assert_eq!(Platform::parse("linux").expand().count(), 0);
        assert_eq!(Platform::parse("").expand().count(), 0);
        assert_eq!(Platform::parse("freebsd/_").expand().count(), 0);
        assert_eq!(Platform::parse("darwin/_32").expand().count(), 0);
        assert_eq!(expanded("freebsd/riscv64").len(), 1);
    }

    #[test]
    fn test_arch_classes_on_normalized_names() {
        assert!(Arch::from("x86").is_32());
        assert!(Arch::from("amd64").is_64());
        assert!(!Arch::from("x86_64").is_64());
        assert!(Arch::from("x86_64").is_amd64());
        assert!(Arch::from("arm").is_arm32());
        assert!(!Arch::from("riscv64").is_arm());
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Deserialize, Serialize)]
        struct Doc {
            p: Platform,
        }
        let doc: Doc = toml::from_str(r#"p = "linux/arm/v6""#).unwrap();
        assert_eq!(doc.p, Platform::new("linux", "arm", "v6"));
        assert_eq!(toml::to_string(&doc).unwrap().trim(), r#"p = "linux/arm/v6""#);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            os in "(linux|windows|darwin|_|)",
            arch in "(x86|x86_64|aarch32|aarch64|amd64|arm64|arm|_64|)",
            variant in "(v6|v7|)",
        ) {
            let p = Platform::new(os, arch, variant);
            prop_assert_eq!(p.normalized().normalized(), p.normalized());
        }

        #[test]
        fn prop_concrete_expand_yields_normalized_self(
            os in "(linux|windows|darwin|plan9)",
            arch in "(x86|x86_64|aarch64|amd64|arm64|riscv64)",
        ) {
            let p = Platform::new(os, arch, "");
            let all: Vec<_> = p.expand().collect();
            prop_assert_eq!(all, vec![p.normalized()]);
        }
    }
}
