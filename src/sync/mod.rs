//! Reconciliation between the local replica and the remote store.
//!
//! Mutations always land locally first and are queued for the remote; the
//! engine drains the queue opportunistically whenever the connectivity
//! oracle reports the server reachable.

mod connectivity;
mod engine;

pub use connectivity::{check_server, Connectivity, HttpConnectivity, ManualConnectivity};
pub use engine::{SyncEngine, SyncState};
