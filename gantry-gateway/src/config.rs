//! Runtime option reads and writes by config name.
//!
//! Writes run through the store's `update`, so mutators of every gateway
//! sharing one store are serialized by the same writer lock. Readers of the
//! previous snapshot are never blocked and never see a partial update.

use futures::io::AsyncRead;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use gantry_core::decode::read_limited;
use gantry_core::error::{GatewayError, Result};
use gantry_core::options::GatewayOptions;
use gantry_core::registry::OptionRegistry;
use gantry_core::snapshot::OptionsStore;

/// Reads and writes named runtime options.
pub struct ConfigMutator {
    store: Arc<dyn OptionsStore>,
    registry: &'static OptionRegistry,
}

impl ConfigMutator {
    pub fn new(store: Arc<dyn OptionsStore>) -> Self {
        Self {
            store,
            registry: OptionRegistry::global(),
        }
    }

    /// Current value of an option.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.registry.read(&self.store.current(), name)
    }

    /// Set an option from a JSON-encoded body and return the value now in
    /// effect.
    ///
    /// The body may hold at most `max_msg_size` bytes.
    pub async fn set<R>(&self, name: &str, body: &mut R) -> Result<Value>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let read_max = self.store.current().max_msg_size.saturating_add(1);
        let mut raw = Vec::new();
        read_limited(body, &mut raw, read_max)
            .await
            .map_err(|e| GatewayError::internal(format!("config body read failed: {e}")))?;
        if raw.is_empty() || raw.len() == read_max {
            return Err(GatewayError::ValueBodyRejected);
        }

        let spec = self
            .registry
            .lookup(name)
            .filter(|spec| spec.is_writable())
            .ok_or_else(|| {
                debug!("[CONFIG] Refused write to {}", name);
                GatewayError::InvalidOption(name.to_string())
            })?;

        let next = self
            .store
            .update(&|current: &GatewayOptions| spec.apply(current, &raw))?;
        let value = spec.read(&next);
        info!("[CONFIG] {} set to {}", name, value);
        Ok(value)
    }
}

impl std::fmt::Debug for ConfigMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMutator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::io::Cursor;
    use gantry_core::snapshot::SharedOptions;

    fn mutator(opts: GatewayOptions) -> (Arc<SharedOptions>, ConfigMutator) {
        let store = Arc::new(SharedOptions::new(opts));
        let mutator = ConfigMutator::new(store.clone());
        (store, mutator)
    }

    #[test]
    fn test_write_then_read() {
        let (store, config) = mutator(GatewayOptions::default());
        let rx = store.subscribe();
        let value = block_on(config.set("log_level", &mut Cursor::new(b"3".to_vec()))).unwrap();
        assert_eq!(value, Value::from(3));
        assert_eq!(config.get("log_level").unwrap(), Value::from(3));
        assert_eq!(rx.try_recv().unwrap().log_level, 3);
    }

    #[test]
    fn test_body_at_limit_rejected() {
        let (store, config) = mutator(GatewayOptions::default().with_max_msg_size(4));
        let before = store.current();
        let err = block_on(config.set("verbose", &mut Cursor::new(b"false".to_vec()))).unwrap_err();
        assert!(matches!(err, GatewayError::ValueBodyRejected));
        assert_eq!(err.status(), 413);
        assert_eq!(*store.current(), *before);
    }

    #[test]
    fn test_empty_body_rejected() {
        let (_store, config) = mutator(GatewayOptions::default());
        let err = block_on(config.set("verbose", &mut Cursor::new(Vec::new()))).unwrap_err();
        assert!(matches!(err, GatewayError::ValueBodyRejected));
    }
}
