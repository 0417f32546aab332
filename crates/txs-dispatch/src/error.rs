//! Dispatch error type.

use thiserror::Error;
use txs_core::ids::VehicleId;

use crate::resolver::ResolveError;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No vehicle is uninitialized or free-and-reachable for the request.
    #[error("no candidate vehicle for pickup at {0}")]
    NoCandidate(txs_core::Timestamp),

    #[error("route resolution failed: {0}")]
    Resolution(#[from] ResolveError),

    /// The resolver returned a drift route that does not advance the
    /// vehicle's free time, which would loop forever.
    #[error("drift route did not advance vehicle {0}")]
    DriftStalled(VehicleId),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
