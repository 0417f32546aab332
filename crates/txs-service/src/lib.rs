//! `txs-service` — assembles the taxistream pipeline.
//!
//! Construction order: a [`txs_store::RouteStore`] backend, a
//! [`StreamService`] over it, then [`StreamService::start`] to spawn the
//! generator and broadcaster tasks.  The ingestion side (dispatch) stays
//! synchronous and feeds the store through
//! [`ServiceHandle::record_movements`].

pub mod service;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use service::{ServiceHandle, StreamService};
