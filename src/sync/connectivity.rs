//! Network reachability reporting.
//!
//! The oracle is the only conditional gate in front of remote operations:
//! `is_reachable` answers the current question and `watch` exposes the
//! transition edges the engine reacts to.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Reports whether the remote store is currently reachable.
pub trait Connectivity: Send + Sync + 'static {
    fn is_reachable(&self) -> bool;

    /// Event surface for became-reachable / became-unreachable edges.
    fn watch(&self) -> watch::Receiver<bool>;
}

/// Connectivity flipped explicitly by the embedder.
///
/// The one-shot CLI probes once at startup and pins the result here; tests
/// use it to script connectivity transitions.
#[derive(Debug, Clone)]
pub struct ManualConnectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl ManualConnectivity {
    pub fn new(reachable: bool) -> Self {
        let (tx, _rx) = watch::channel(reachable);
        Self { tx: Arc::new(tx) }
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.tx.send_if_modified(|current| {
            if *current != reachable {
                *current = reachable;
                true
            } else {
                false
            }
        });
    }
}

impl Connectivity for ManualConnectivity {
    fn is_reachable(&self) -> bool {
        *self.tx.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Single reachability probe: did the server answer at all?
///
/// Any HTTP response counts as reachable; only transport-level failures
/// (DNS, refused connection, timeout) count as unreachable.
pub async fn check_server(url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };
    client.get(url).send().await.is_ok()
}

/// Background probe loop for long-running embedders.
///
/// Re-probes on an interval and publishes transitions into the watch
/// channel. The loop stops once the oracle itself is dropped.
#[derive(Debug, Clone)]
pub struct HttpConnectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl HttpConnectivity {
    pub fn start(url: impl Into<String>, interval: Duration) -> Self {
        let url = url.into();
        let (tx, _rx) = watch::channel(false);
        let tx = Arc::new(tx);
        let weak = Arc::downgrade(&tx);

        tokio::spawn(async move {
            loop {
                let reachable = check_server(&url).await;
                let Some(tx) = weak.upgrade() else { break };
                let changed = tx.send_if_modified(|current| {
                    if *current != reachable {
                        *current = reachable;
                        true
                    } else {
                        false
                    }
                });
                if changed {
                    tracing::info!(reachable, "Connectivity changed");
                }
                drop(tx);
                tokio::time::sleep(interval).await;
            }
        });

        Self { tx }
    }
}

impl Connectivity for HttpConnectivity {
    fn is_reachable(&self) -> bool {
        *self.tx.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_connectivity_flag() {
        let conn = ManualConnectivity::offline();
        assert!(!conn.is_reachable());

        conn.set_reachable(true);
        assert!(conn.is_reachable());
    }

    #[tokio::test]
    async fn test_watch_sees_transition() {
        let conn = ManualConnectivity::offline();
        let mut rx = conn.watch();
        assert!(!*rx.borrow_and_update());

        conn.set_reachable(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_redundant_set_does_not_signal() {
        let conn = ManualConnectivity::new(true);
        let mut rx = conn.watch();
        rx.borrow_and_update();

        conn.set_reachable(true);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_check_server_unreachable_host() {
        // Reserved TEST-NET address, nothing listens there
        assert!(!check_server("http://192.0.2.1:1/").await);
    }
}
