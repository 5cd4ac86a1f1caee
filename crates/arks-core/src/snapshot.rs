//! Committed expansions (`snapshot` files) and their diffs.

use crate::error::{Error, Result};
use arks_schema::Item;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Name of the snapshot file kept in each artifact directory.
pub const SNAPSHOT_FILE: &str = "snapshot";

/// Target -> origins map of one artifact's expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(BTreeMap<String, BTreeSet<String>>);

impl Snapshot {
    /// Empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one item.
    pub fn insert(&mut self, item: &Item) {
        self.0
            .entry(item.target.clone())
            .or_default()
            .insert(item.origin.clone());
    }

    /// Collect a whole item stream.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `groups`.
    pub fn from_groups<I>(groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Vec<Item>>>,
    {
        let mut snapshot = Self::new();
        for group in groups {
            for item in group? {
                snapshot.insert(&item);
            }
        }
        Ok(snapshot)
    }

    /// Parse the text format: blank-line separated blocks, each a target
    /// followed by its origins.
    pub fn parse(text: &str) -> Self {
        let mut snapshot = Self::new();
        let mut target: Option<&str> = None;
        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                target = None;
                continue;
            }
            match target {
                None => {
                    snapshot.0.entry(line.to_string()).or_default();
                    target = Some(line);
                }
                Some(t) => {
                    snapshot.0.entry(t.to_string()).or_default().insert(line.to_string());
                }
            }
        }
        snapshot
    }

    /// Read `dir/snapshot`. A missing file reads as an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be read.
    pub fn read(dir: &Path) -> Result<Self> {
        let file = dir.join(SNAPSHOT_FILE);
        match fs::read_to_string(&file) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(Error::io(file, e)),
        }
    }

    /// Emit the canonical text format.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (i, (target, origins)) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "{target}")?;
            for origin in origins {
                writeln!(out, "{origin}")?;
            }
        }
        out.flush()
    }

    /// Write `dir/snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let file = dir.join(SNAPSHOT_FILE);
        let mut buf = Vec::new();
        self.write_to(&mut buf).map_err(Error::Output)?;
        fs::write(&file, buf).map_err(|e| Error::io(file, e))
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no targets.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Origins recorded for `target`.
    pub fn origins(&self, target: &str) -> Option<&BTreeSet<String>> {
        self.0.get(target)
    }
}

/// One target whose origins changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changed {
    /// The target.
    pub target: String,
    /// Origins only in the new snapshot.
    pub added: Vec<String>,
    /// Origins only in the old snapshot.
    pub removed: Vec<String>,
}

/// Differences between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Targets only in the new snapshot.
    pub added: Vec<String>,
    /// Targets only in the old snapshot.
    pub removed: Vec<String>,
    /// Targets in both with different origins.
    pub changed: Vec<Changed>,
}

impl SnapshotDiff {
    /// Whether the snapshots are identical.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compare `old` against `new`.
pub fn diff(old: &Snapshot, new: &Snapshot) -> SnapshotDiff {
    let mut out = SnapshotDiff::default();
    for (target, origins) in &new.0 {
        match old.0.get(target) {
            None => out.added.push(target.clone()),
            Some(before) if before != origins => out.changed.push(Changed {
                target: target.clone(),
                added: origins.difference(before).cloned().collect(),
                removed: before.difference(origins).cloned().collect(),
            }),
            Some(_) => {}
        }
    }
    out.removed = old
        .0
        .keys()
        .filter(|t| !new.0.contains_key(*t))
        .cloned()
        .collect();
    out
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for target in &self.removed {
            writeln!(f, "- {target}")?;
        }
        for target in &self.added {
            writeln!(f, "+ {target}")?;
        }
        for change in &self.changed {
            writeln!(f, "~ {}", change.target)?;
            for origin in &change.removed {
                writeln!(f, "  - {origin}")?;
            }
            for origin in &change.added {
                writeln!(f, "  + {origin}")?;
            }
        }
        Ok(())
    }
}
