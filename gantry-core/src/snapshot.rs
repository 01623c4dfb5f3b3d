//! Published options snapshot.
//!
//! Readers load the current `Arc<GatewayOptions>` without locking. Writers
//! publish a whole new value; a snapshot already handed out never changes.
//! Read-modify-write goes through [`OptionsStore::update`], which holds the
//! store's writer lock, so every holder of the store shares one writer.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::options::GatewayOptions;

/// Source of the current options snapshot.
pub trait OptionsStore: Send + Sync {
    /// The snapshot visible right now.
    fn current(&self) -> Arc<GatewayOptions>;

    /// Publish `next` atomically.
    fn swap(&self, next: GatewayOptions);

    /// Tell subscribers the options changed.
    fn notify_changed(&self);

    /// Derive the next snapshot from the current one and publish it.
    ///
    /// Updates never interleave: `f` sees the snapshot left by the previous
    /// update. Nothing is published when `f` fails.
    fn update(
        &self,
        f: &dyn Fn(&GatewayOptions) -> Result<GatewayOptions>,
    ) -> Result<Arc<GatewayOptions>>;
}

/// `ArcSwap`-backed store with change subscriptions.
pub struct SharedOptions {
    current: ArcSwap<GatewayOptions>,
    writer: Mutex<()>,
    listeners: Mutex<Vec<flume::Sender<Arc<GatewayOptions>>>>,
}

impl SharedOptions {
    pub fn new(opts: GatewayOptions) -> Self {
        Self {
            current: ArcSwap::from_pointee(opts),
            writer: Mutex::new(()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Receive every snapshot published after this call.
    ///
    /// Dropping the receiver unsubscribes on the next notification.
    pub fn subscribe(&self) -> flume::Receiver<Arc<GatewayOptions>> {
        let (tx, rx) = flume::unbounded();
        self.listeners.lock().push(tx);
        rx
    }
}

impl Default for SharedOptions {
    fn default() -> Self {
        Self::new(GatewayOptions::default())
    }
}

impl OptionsStore for SharedOptions {
    fn current(&self) -> Arc<GatewayOptions> {
        self.current.load_full()
    }

    fn swap(&self, next: GatewayOptions) {
        let _writer = self.writer.lock();
        self.current.store(Arc::new(next));
    }

    fn notify_changed(&self) {
        let snapshot = self.current.load_full();
        let mut listeners = self.listeners.lock();
        listeners.retain(|tx| tx.send(snapshot.clone()).is_ok());
        debug!("[OPTIONS] Notified {} listeners", listeners.len());
    }

    fn update(
        &self,
        f: &dyn Fn(&GatewayOptions) -> Result<GatewayOptions>,
    ) -> Result<Arc<GatewayOptions>> {
        let _writer = self.writer.lock();
        let next = Arc::new(f(&self.current.load())?);
        self.current.store(next.clone());
        self.notify_changed();
        Ok(next)
    }
}

impl std::fmt::Debug for SharedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOptions")
            .field("current", &self.current.load())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}
