//! Online/offline signal.
//!
//! The monitor wraps a [`watch`] channel: whoever observes connectivity
//! (the UI's browser events, a platform network probe, a test) pushes
//! transitions in, and any number of consumers subscribe. Dropping a
//! receiver unsubscribes it — the coordinator's dependency on the
//! connectivity source is explicit and testable with a fake source.

use tokio::sync::watch;
use tracing::{info, warn};

pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl ConnectivityMonitor {
    #[must_use]
    pub fn new(initially_online: bool) -> Self {
        let (tx, rx) = watch::channel(initially_online);
        Self { tx, rx }
    }

    pub fn set_online(&self) {
        let changed = self.tx.send_if_modified(|online| {
            if *online {
                false
            } else {
                *online = true;
                true
            }
        });
        if changed {
            info!("Connectivity restored");
        }
    }

    pub fn set_offline(&self) {
        let changed = self.tx.send_if_modified(|online| {
            if *online {
                *online = false;
                true
            } else {
                false
            }
        });
        if changed {
            warn!("Connectivity lost");
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.rx.borrow()
    }

    /// A receiver observing every subsequent transition. Drop it to
    /// unsubscribe.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
