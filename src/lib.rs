//! liftsync is an offline-first workout tracker.
//!
//! All reads and writes go through a durable local snapshot, so the app is
//! fully usable without a network. When a remote store is configured and
//! reachable, queued mutations are replayed to it opportunistically and the
//! remote state becomes the cache of record.

pub mod app;
pub mod commands;
pub mod config;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;

pub use app::App;
pub use config::{Config, SyncConfig};

/// The crate version, for the CLI `--version` output and diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
