//! Gateway health, driven by the outcome of local batch commits.

use parking_lot::RwLock;
use std::fmt::Display;
use tracing::{info, warn};

const HEALTHY: &str = "OK";

/// Last commit error, if any.
#[derive(Debug, Default)]
pub struct Health {
    last_err: RwLock<Option<String>>,
}

impl Health {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a commit.
    pub fn set<E: Display>(&self, outcome: Result<(), &E>) {
        let mut last = self.last_err.write();
        match outcome {
            Ok(()) => {
                if last.take().is_some() {
                    info!("[GATEWAY] Health recovered");
                }
            }
            Err(e) => {
                if last.is_none() {
                    warn!("[GATEWAY] Health degraded: {}", e);
                }
                *last = Some(e.to_string());
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.last_err.read().is_none()
    }

    /// `OK`, or `NOK - <error>`.
    pub fn status(&self) -> String {
        match self.last_err.read().as_deref() {
            None => HEALTHY.to_string(),
            Some(err) => format!("NOK - {err}"),
        }
    }
}
