//! Error taxonomy shared by the walker, builder and query paths.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while walking a port tree, expanding items or answering a
/// point query.
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing is declared at the requested location, or no platform binding
    /// resolves. Recoverable: the serving boundary answers "not found".
    #[error("not found: {0}")]
    NotFound(String),

    /// A `config.toml` or `app.toml` could not be decoded.
    #[error("decode {}: {source}", path.display())]
    Decode {
        /// File being decoded.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A descriptor decoded fine but cannot be used as declared.
    #[error("invalid {}: {reason}", path.display())]
    Invalid {
        /// Offending file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A file or directory could not be read.
    #[error("read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Writing rendered output failed.
    #[error("write: {0}")]
    Output(#[source] io::Error),

    /// Serializing rendered output failed.
    #[error("encode: {0}")]
    Json(#[from] serde_json::Error),

    /// A path template failed to compile or render.
    #[error("template {template:?}: {source}")]
    Template {
        /// Template source as written in the descriptor.
        template: String,
        /// Underlying tera error.
        source: tera::Error,
    },

    /// An error raised below `path` in the tree. Carries the path exactly
    /// once, however deep the failure happened.
    #[error("{path}: {source}")]
    Walk {
        /// Directory relative to the walk root.
        path: String,
        /// The wrapped failure.
        source: Box<Error>,
    },

    /// The walk observed a cancellation request.
    #[error("cancelled")]
    Cancelled,

    /// A failure raised by a visitor or renderer.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Attach `path` to `err` unless it already carries one.
    pub fn walk(path: impl Into<String>, err: Error) -> Self {
        match err {
            Error::Walk { .. } | Error::Cancelled => err,
            err => Error::Walk {
                path: path.into(),
                source: Box::new(err),
            },
        }
    }

    /// Whether this is a not-found condition, looking through path wrappers.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            Error::Walk { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
