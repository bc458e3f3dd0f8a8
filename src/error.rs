//! Error types for heronet.
//!
//! Lookups that find nothing return `Option::None` and failed
//! connections are reported through [`crate::graph::ConnectionOutcome`],
//! so everything here is a rejected request or a real failure.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the store, the service and the renderers.
#[derive(Debug, Error)]
pub enum HeroNetError {
    /// A mutation request was rejected before any state changed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A table file could not be read, written or renamed into place.
    #[error("store I/O error at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table file exists but does not have the expected shape.
    #[error("corrupt table {path}: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    /// SVG parsing, rasterization or PNG encoding failed.
    #[error("render error: {0}")]
    Render(String),

    /// The config file exists but could not be read or parsed.
    #[error("config error at {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// The shared service mutex was poisoned by a panicking holder.
    #[error("hero network lock poisoned")]
    LockPoisoned,
}

impl HeroNetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HeroNetError::StoreIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        HeroNetError::StoreCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HeroNetError>;
