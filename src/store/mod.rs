//! File-backed persistence for the local replica and the pending-action log.
//!
//! Two independent JSON blobs live under the data directory:
//! ```text
//! <DATA_DIR>/
//!   snapshot.json   the full local replica
//!   pending.json    mutations not yet confirmed against the remote store
//! ```
//! Both are treated as versionless JSON; a corrupt or missing file never
//! propagates an error to a mutating caller.

mod local;
mod pending;

pub use local::{LocalStore, StoreError};
pub use pending::{ActionPayload, PendingAction, PendingLog};
