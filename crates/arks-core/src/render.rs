//! Output renderers for expanded items.

use crate::config::Config;
use crate::error::{Error, Result};
use arks_schema::Item;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Consumes items as a walk produces them.
pub trait Renderer {
    /// Accept one item rendered under `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be written.
    fn render(&mut self, config: &Config, item: &Item) -> Result<()>;

    /// Write anything still buffered.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn flush(&mut self) -> Result<()>;
}

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderKind {
    /// Human-readable tree grouped by artifact version.
    #[default]
    Tree,
    /// `origin,target` lines.
    Kv,
    /// JSON array for Cloudflare KV bulk uploads.
    CfKv,
}

impl RenderKind {
    /// All kinds, in display order.
    pub const ALL: [RenderKind; 3] = [RenderKind::Tree, RenderKind::Kv, RenderKind::CfKv];

    /// Build a renderer of this kind writing to `out`.
    pub fn renderer<'a, W: Write + 'a>(self, out: W) -> Box<dyn Renderer + 'a> {
        match self {
            RenderKind::Tree => Box::new(TreeRenderer::new(out)),
            RenderKind::Kv => Box::new(KvRenderer::new(out)),
            RenderKind::CfKv => Box::new(CfKvRenderer::new(out)),
        }
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderKind::Tree => "tree",
            RenderKind::Kv => "kv",
            RenderKind::CfKv => "cfkv",
        })
    }
}

impl FromStr for RenderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(RenderKind::Tree),
            "kv" => Ok(RenderKind::Kv),
            "cfkv" => Ok(RenderKind::CfKv),
            other => Err(format!("unknown render kind {other:?} (expected tree, kv or cfkv)")),
        }
    }
}

type Block = BTreeMap<String, BTreeSet<String>>;

/// Buffers everything and prints one block per `path/name@version`:
/// targets sorted, their origins indented below them.
pub struct TreeRenderer<W> {
    out: W,
    blocks: BTreeMap<String, Block>,
}

impl<W: Write> TreeRenderer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            blocks: BTreeMap::new(),
        }
    }
}

impl<W: Write> Renderer for TreeRenderer<W> {
    fn render(&mut self, _config: &Config, item: &Item) -> Result<()> {
        let key = format!("{}/{}@{}", item.path, item.name, item.version);
        self.blocks
            .entry(key)
            .or_default()
            .entry(item.target.clone())
            .or_default()
            .insert(item.origin.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let blocks = std::mem::take(&mut self.blocks);
        for (i, (key, targets)) in blocks.iter().enumerate() {
            if i > 0 {
                writeln!(self.out).map_err(Error::Output)?;
            }
            writeln!(self.out, "{key}").map_err(Error::Output)?;
            for (target, origins) in targets {
                writeln!(self.out, "  {target}").map_err(Error::Output)?;
                for origin in origins {
                    writeln!(self.out, "    {origin}").map_err(Error::Output)?;
                }
            }
        }
        self.out.flush().map_err(Error::Output)
    }
}

impl<W> fmt::Debug for TreeRenderer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeRenderer").field("blocks", &self.blocks.len()).finish()
    }
}

/// Buffers `origin,target` lines and writes them on flush.
#[derive(Debug)]
pub struct KvRenderer<W> {
    out: W,
    lines: Vec<String>,
}

impl<W: Write> KvRenderer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out, lines: Vec::new() }
    }
}

impl<W: Write> Renderer for KvRenderer<W> {
    fn render(&mut self, _config: &Config, item: &Item) -> Result<()> {
        self.lines.push(format!("{},{}", item.origin, item.target));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for line in std::mem::take(&mut self.lines) {
            writeln!(self.out, "{line}").map_err(Error::Output)?;
        }
        self.out.flush().map_err(Error::Output)
    }
}

#[derive(Debug, Serialize)]
struct KvPair {
    key: String,
    value: String,
}

/// Collects items into a `[{"key": origin, "value": target}]` document.
#[derive(Debug)]
pub struct CfKvRenderer<W> {
    out: W,
    pairs: Vec<KvPair>,
}

impl<W: Write> CfKvRenderer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out, pairs: Vec::new() }
    }
}

impl<W: Write> Renderer for CfKvRenderer<W> {
    fn render(&mut self, _config: &Config, item: &Item) -> Result<()> {
        self.pairs.push(KvPair {
            key: item.origin.clone(),
            value: item.target.clone(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let pairs = std::mem::take(&mut self.pairs);
        serde_json::to_writer_pretty(&mut self.out, &pairs)?;
        writeln!(self.out).map_err(Error::Output)?;
        self.out.flush().map_err(Error::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arks_schema::Platform;

    fn item(version: &str, arch: &str, target: &str) -> Item {
        Item {
            path: "github.com/x".into(),
            name: "tool".into(),
            version: version.into(),
            platform: Platform::new("linux", arch, ""),
            origin: format!("github.com/x/tool@{version}/linux/{arch}"),
            target: target.into(),
        }
    }

    fn run(kind: RenderKind, items: &[Item]) -> String {
        let mut out = Vec::new();
        {
            let mut renderer = kind.renderer(&mut out);
            for item in items {
                renderer.render(&Config::default(), item).unwrap();
            }
            renderer.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_tree_is_sorted() {
        let items = [
            item("2", "x86_64", "/dl/2/amd64"),
            item("1", "amd64", "/dl/1/amd64"),
            item("2", "amd64", "/dl/2/amd64"),
        ];
        assert_eq!(
            run(RenderKind::Tree, &items),
            "github.com/x/tool@1\n  /dl/1/amd64\n    github.com/x/tool@1/linux/amd64\n\n\
             github.com/x/tool@2\n  /dl/2/amd64\n    github.com/x/tool@2/linux/amd64\n    github.com/x/tool@2/linux/x86_64\n"
        );
    }

    #[test]
    fn test_kv_lines() {
        let out = run(RenderKind::Kv, &[item("1", "amd64", "/dl/a,b")]);
        assert_eq!(out, "github.com/x/tool@1/linux/amd64,/dl/a,b\n");
    }

    #[test]
    fn test_nothing_written_before_flush() {
        for kind in RenderKind::ALL {
            let mut out = Vec::new();
            {
                let mut renderer = kind.renderer(&mut out);
                renderer.render(&Config::default(), &item("1", "amd64", "/dl")).unwrap();
            }
            assert!(out.is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_cfkv_json() {
        let out = run(RenderKind::CfKv, &[item("1", "amd64", "/dl/\"q\"")]);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["key"], "github.com/x/tool@1/linux/amd64");
        assert_eq!(parsed[0]["value"], "/dl/\"q\"");
        assert_eq!(run(RenderKind::CfKv, &[]).trim(), "[]");
    }

    #[test]
    fn test_kind_parsing() {
        for kind in RenderKind::ALL {
            assert_eq!(kind.to_string().parse::<RenderKind>().unwrap(), kind);
        }
        assert!("yaml".parse::<RenderKind>().is_err());
    }
}
