//! Ordered platform bindings and scored resolution.

use crate::platform::{Arch, Platform, WILDCARD};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered `pattern -> target` bindings.
///
/// Declaration order is evaluation order: it decides ties in
/// [`PlatformMap::resolve`], which [`PlatformMap::expand`] shares.
/// Decoded from a TOML/JSON table, it keeps the order keys appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformMap(IndexMap<Platform, Platform>);

impl PlatformMap {
    /// An empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one binding. A replaced pattern keeps its position.
    pub fn insert(&mut self, pattern: Platform, target: Platform) {
        self.0.insert(pattern, target);
    }

    /// Overlay `other` onto `self`: equal patterns are overwritten in place,
    /// new patterns are appended in `other`'s order.
    pub fn merge(&mut self, other: &PlatformMap) {
        for (pattern, target) in &other.0 {
            self.0.insert(pattern.clone(), target.clone());
        }
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&Platform, &Platform)> {
        self.0.iter()
    }

    /// Pick the target of the most specific binding for `request`.
    ///
    /// The request is normalized first; a request without OS or arch, or
    /// with a wildcard in either, never resolves. Every binding with a non-empty OS and arch is scored with
    /// [`score`]; the last binding whose score is equal to or higher than
    /// the best so far wins. Returns `None` when no binding is eligible.
    pub fn resolve(&self, request: &Platform) -> Option<&Platform> {
        let request = request.normalized();
        if request.os.is_empty() || request.arch.is_empty() || request.has_wildcard() {
            return None;
        }

        let mut best: Option<(u32, &Platform)> = None;
        for (pattern, target) in &self.0 {
            let Some(s) = score(pattern, &request) else {
                continue;
            };
            if best.is_none_or(|(top, _)| s >= top) {
                best = Some((s, target));
            }
        }
        best.map(|(_, target)| target)
    }

    /// Expand every pattern and group the concrete source platforms by the
    /// target [`PlatformMap::resolve`] picks for them.
    ///
    /// Bulk expansion and point resolution therefore always agree. Groups
    /// are sorted by target, sources within a group are sorted too.
    pub fn expand(&self) -> Vec<(Platform, Vec<Platform>)> {
        let sources: BTreeSet<Platform> = self.0.keys().flat_map(Platform::expand).collect();

        let mut groups: BTreeMap<Platform, Vec<Platform>> = BTreeMap::new();
        for source in sources {
            if let Some(target) = self.resolve(&source) {
                groups.entry(target.clone()).or_default().push(source);
            }
        }
        groups.into_iter().collect()
    }
}

impl FromIterator<(Platform, Platform)> for PlatformMap {
    fn from_iter<I: IntoIterator<Item = (Platform, Platform)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PlatformMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (Platform::parse(k), Platform::parse(v)))
            .collect()
    }
}

/// Specificity of `pattern` for an already normalized `request`.
///
/// Returns `None` for a pattern with an empty OS or arch, which is never
/// eligible. OS: `_` scores 1, an exact match 8. Arch: `_` scores 1, the
/// class wildcards `_amd`, `_arm`, `_32`, `_64` score 2 and the narrow ones
/// `_amd32`, `_arm32`, `_amd64`, `_arm64` score 4 when the request's class
/// matches, an exact match 8. Anything else adds nothing.
///
/// `_64` scores when the request is *not* 64-bit. Port trees in the wild
/// depend on that, so it is kept as is.
pub fn score(pattern: &Platform, request: &Platform) -> Option<u32> {
    if pattern.os.is_empty() || pattern.arch.is_empty() {
        return None;
    }

    let os = if pattern.os == WILDCARD {
        1
    } else if pattern.os == request.os {
        8
    } else {
        0
    };

    let arch: &Arch = &request.arch;
    let matched = match pattern.arch.as_str() {
        "_" => Some(1),
        "_amd" => arch.is_amd().then_some(2),
        "_arm" => arch.is_arm().then_some(2),
        "_32" => arch.is_32().then_some(2),
        "_64" => (!arch.is_64()).then_some(2),
        "_amd32" => arch.is_amd32().then_some(4),
        "_arm32" => arch.is_arm32().then_some(4),
        "_amd64" => arch.is_amd64().then_some(4),
        "_arm64" => arch.is_arm64().then_some(4),
        _ => (pattern.arch.normalized() == *arch).then_some(8),
    };

    Some(os + matched.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> PlatformMap {
        [
            ("_/_", "default"),
            ("linux/_", "linux-any"),
            ("linux/amd64", "linux-amd64"),
        ]
        .into_iter()
        .collect()
    }

    fn resolve(map: &PlatformMap, request: &str) -> Option<String> {
        map.resolve(&Platform::parse(request)).map(ToString::to_string)
    }

    #[test]
    fn test_exact_match_outranks_wildcards() {
        assert_eq!(resolve(&defaults(), "linux/amd64").as_deref(), Some("linux-amd64"));
        assert_eq!(resolve(&defaults(), "linux/x86_64").as_deref(), Some("linux-amd64"));
    }

    #[test]
    fn test_falls_back_to_default() {
        assert_eq!(resolve(&defaults(), "darwin/arm64").as_deref(), Some("default"));
        assert_eq!(resolve(&defaults(), "linux/arm64").as_deref(), Some("linux-any"));
    }

    #[test]
    fn test_ties_go_to_last_declared() {
        let map: PlatformMap = [("linux/_", "first"), ("linux/_", "ignored"), ("_/_", "low"), ("linux/_amd64", "narrow")]
            .into_iter()
            .collect();
        assert_eq!(resolve(&map, "linux/amd64").as_deref(), Some("narrow"));

        let map: PlatformMap = [("linux/_amd", "a"), ("linux/_32", "b")].into_iter().collect();
        assert_eq!(resolve(&map, "linux/x86").as_deref(), Some("b"));
    }

    #[test]
    fn test_64_wildcard_scores_on_non_64_requests() {
        let map: PlatformMap = [("linux/_", "any"), ("linux/_64", "sixty-four")].into_iter().collect();
        assert_eq!(resolve(&map, "linux/arm").as_deref(), Some("sixty-four"));
        assert_eq!(resolve(&map, "linux/arm64").as_deref(), Some("any"));
    }

    #[test]
    fn test_invalid_requests_and_patterns() {
        assert_eq!(resolve(&defaults(), "linux"), None);
        assert_eq!(resolve(&defaults(), ""), None);

        let map: PlatformMap = [("linux", "broken")].into_iter().collect();
        assert_eq!(resolve(&map, "linux/amd64"), None);
        assert_eq!(resolve(&PlatformMap::new(), "linux/amd64"), None);
    }

    #[test]
    fn test_zero_score_binding_still_eligible() {
        let map: PlatformMap = [("windows/arm64", "only")].into_iter().collect();
        assert_eq!(resolve(&map, "linux/amd64").as_deref(), Some("only"));
    }

    #[test]
    fn test_merge_overrides_in_place() {
        let mut base: PlatformMap = [("_/_", "a"), ("linux/_", "b")].into_iter().collect();
        let over: PlatformMap = [("darwin/_", "c"), ("_/_", "z")].into_iter().collect();
        base.merge(&over);

        let order: Vec<String> = base.iter().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(order, vec!["_/_=z", "linux/_=b", "darwin/_=c"]);
    }

    #[test]
    fn test_expand_groups_by_target() {
        let map: PlatformMap = [
            ("linux/_amd64", "linux/amd64"),
            ("linux/_arm64", "linux/arm64"),
        ]
        .into_iter()
        .collect();
        let groups = map.expand();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.to_string(), "linux/amd64");
        let amd: Vec<String> = groups[0].1.iter().map(ToString::to_string).collect();
        assert_eq!(amd, vec!["linux/amd64", "linux/x86_64"]);
        let arm: Vec<String> = groups[1].1.iter().map(ToString::to_string).collect();
        assert_eq!(arm, vec!["linux/aarch64", "linux/arm64"]);
    }

    #[test]
    fn test_expand_agrees_with_resolve() {
        let map: PlatformMap = [("linux/amd64", "linux/exact"), ("linux/_", "linux/any")]
            .into_iter()
            .collect();
        assert_eq!(resolve(&map, "linux/amd64").as_deref(), Some("linux/exact"));

        for (target, sources) in map.expand() {
            for source in sources {
                assert_eq!(map.resolve(&source), Some(&target), "{source}");
            }
        }
        let exact: Vec<String> = map
            .expand()
            .into_iter()
            .find(|(target, _)| target.to_string() == "linux/exact")
            .map(|(_, sources)| sources.iter().map(ToString::to_string).collect())
            .unwrap_or_default();
        assert_eq!(exact, vec!["linux/amd64", "linux/x86_64"]);
    }

    #[test]
    fn test_wildcard_requests_never_resolve() {
        assert_eq!(resolve(&defaults(), "_/_"), None);
        assert_eq!(resolve(&defaults(), "_/_64"), None);
        assert_eq!(resolve(&defaults(), "linux/_arm"), None);
        assert_eq!(resolve(&defaults(), "_/amd64"), None);
    }

    #[test]
    fn test_decodes_in_file_order() {
        #[derive(Deserialize)]
        struct Doc {
            platforms: PlatformMap,
        }
        let doc: Doc = toml::from_str(
            r#"
            platforms = { "linux/_" = "linux/amd64", "_/_" = "linux/arm64", "darwin/_" = "darwin/arm64" }
            "#,
        )
        .unwrap();
        let keys: Vec<String> = doc.platforms.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["linux/_", "_/_", "darwin/_"]);
    }
}
