//! Core error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! via `From` impls or wrap it as one variant.  Per-request and per-subscriber
//! failures stay local to their crates; only configuration errors are fatal.

use thiserror::Error;

/// The top-level error type for `txs-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("path geometry codec error: {0}")]
    Geometry(#[from] serde_json::Error),
}

/// Shorthand result type for all `txs-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
