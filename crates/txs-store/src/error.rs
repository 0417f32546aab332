//! Store error type.
//!
//! Store failures are reported to the caller and never panic the pipeline;
//! the generator logs them and skips the tick.

use thiserror::Error;
use txs_core::error::CoreError;
use txs_core::ids::MovementId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persisted row failed to decode back into a movement.
    #[error("corrupt movement record {0}: {1}")]
    Corrupt(MovementId, String),
}

pub type StoreResult<T> = Result<T, StoreError>;
