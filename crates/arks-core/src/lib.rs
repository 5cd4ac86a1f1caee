//! # arks-core
//!
//! The redirector's engine: cascading `config.toml` inheritance over a port
//! tree, artifact descriptors, path templates, lazy `version x platform`
//! expansion, point queries, and the consumers of expanded items
//! (renderers, snapshots, conflict checks).

pub mod app;
pub mod builder;
pub mod config;
pub mod conflict;
pub mod error;
pub mod query;
pub mod render;
pub mod snapshot;
pub mod template;
pub mod walk;

pub use app::App;
pub use builder::{Artifact, ItemStream};
pub use config::{Config, Resolver, Target};
pub use conflict::{Conflict, ConflictChecker};
pub use error::{Error, Result};
pub use query::{FsQuerier, Querier};
pub use render::{RenderKind, Renderer};
pub use snapshot::{Snapshot, SnapshotDiff};
pub use template::Helpers;
pub use walk::FsWalker;
