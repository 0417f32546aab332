//! Replay error type.

use thiserror::Error;
use txs_store::StoreError;

#[derive(Debug, Error)]
pub enum ReplayError {
    /// The store failed mid-tick.  Recoverable: the caller logs it and
    /// retries on the next tick.
    #[error("route store failed: {0}")]
    Store(#[from] StoreError),
}

pub type ReplayResult<T> = Result<T, ReplayError>;
