//! arks - artifact redirect keys
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Maps `path/name@version/os/arch` identifiers to concrete download
//! locations described by a port tree of `config.toml`, `app.toml` and
//! `versions` files.
//!
//! # Port tree
//!
//! ```text
//! port/
//! ├── config.toml             # tree-wide target, resolvers, bindings
//! └── github.com/
//!     └── owner/repo/
//!         └── tool/
//!             ├── app.toml    # path template, bindings
//!             ├── versions    # one version (plus aliases) per line
//!             └── snapshot    # written by `arks commit`
//! ```

pub mod cmd;
pub mod server;

use arks_core::RenderKind;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "arks")]
#[command(author, version, about = "arks - binary download redirects from a port tree")]
pub struct Cli {
    /// Root of the port tree
    #[arg(long, global = true, env = "ARKS_PORT", default_value = "./port")]
    pub port: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Expand every artifact and print the result
    Render {
        /// Output format: tree, kv or cfkv
        #[arg(long, default_value_t = RenderKind::Tree)]
        kind: RenderKind,
    },
    /// Resolve one identifier, e.g. /github.com/owner/repo/tool@1.0/linux/amd64
    Query {
        /// Request identifier
        id: String,
    },
    /// Write each artifact's current expansion to its snapshot file
    Commit,
    /// Compare each artifact's expansion with its snapshot file
    Diff,
    /// Check that no origin is produced by two artifacts
    Test,
    /// Serve redirects over HTTP
    Serve {
        /// Listen address
        #[arg(long, env = "ARKS_ADDR", default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
        /// Prepended to targets that carry no URL scheme
        #[arg(long, default_value = "https://")]
        redirect_prefix: String,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
