//! Partition-aware write routing.
//!
//! A write is routed once per request: the ownership check produces a
//! [`RoutingDecision`], and a single two-armed step either commits to the
//! local engine or forwards to the owning node. A batch is routed as a unit
//! and never split between the two paths.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::engine::Topic;
use crate::error::{GatewayError, Result};
use crate::message::WriteUnit;

/// Failure reported by the forwarding transport
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ForwardError(pub String);

impl ForwardError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Partition ownership and inter-node forwarding.
#[async_trait]
pub trait PartitionRouter: Send + Sync {
    /// Whether this node is authoritative for `topic/partition`.
    fn is_locally_owned(&self, topic: &str, partition: u32) -> bool;

    /// Relay a write to the owner of `topic/partition`.
    async fn forward(
        &self,
        topic: &str,
        partition: u32,
        unit: WriteUnit,
    ) -> std::result::Result<(), ForwardError>;
}

/// Router for single-node deployments: every partition is local.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnly;

#[async_trait]
impl PartitionRouter for LocalOnly {
    fn is_locally_owned(&self, _topic: &str, _partition: u32) -> bool {
        true
    }

    async fn forward(
        &self,
        topic: &str,
        partition: u32,
        _unit: WriteUnit,
    ) -> std::result::Result<(), ForwardError> {
        Err(ForwardError(format!(
            "no remote owner for {topic}/{partition} in local-only mode"
        )))
    }
}

/// Where a forwarded write goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTarget {
    pub topic: String,
    pub partition: u32,
}

/// Outcome of the ownership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Local,
    Forward(ForwardTarget),
}

/// Decides and executes local-commit vs forward for resolved topics.
#[derive(Clone)]
pub struct WriteRouter {
    router: Arc<dyn PartitionRouter>,
}

impl WriteRouter {
    pub fn new(router: Arc<dyn PartitionRouter>) -> Self {
        Self { router }
    }

    /// Check ownership of the topic's partition.
    pub fn decide(&self, topic: &dyn Topic) -> RoutingDecision {
        if self.router.is_locally_owned(topic.name(), topic.partition()) {
            RoutingDecision::Local
        } else {
            RoutingDecision::Forward(ForwardTarget {
                topic: topic.name().to_string(),
                partition: topic.partition(),
            })
        }
    }

    /// Carry out a decision. The decision is not re-checked here.
    pub async fn execute(
        &self,
        decision: RoutingDecision,
        topic: &dyn Topic,
        unit: WriteUnit,
    ) -> Result<()> {
        match decision {
            RoutingDecision::Local => {
                let res = match unit {
                    WriteUnit::Single(msg) => topic.put(msg).await,
                    WriteUnit::Batch(batch) => topic.put_batch(batch).await,
                };
                res.map_err(|e| {
                    error!(
                        "[ROUTER] Topic {}/{} put failed: {}",
                        topic.name(),
                        topic.partition(),
                        e
                    );
                    GatewayError::unavailable(e.to_string())
                })
            }
            RoutingDecision::Forward(target) => {
                debug!(
                    "[ROUTER] Forwarding {} messages ({} bytes) to owner of {}/{}",
                    unit.len(),
                    unit.payload_bytes(),
                    target.topic,
                    target.partition
                );
                self.router
                    .forward(&target.topic, target.partition, unit)
                    .await
                    .map_err(|e| {
                        warn!(
                            "[ROUTER] Forward to {}/{} failed: {}",
                            target.topic, target.partition, e
                        );
                        GatewayError::ForwardFailed {
                            topic: target.topic,
                            partition: target.partition,
                            message: e.0,
                        }
                    })
            }
        }
    }

    /// Decide once, then execute.
    pub async fn write(&self, topic: &dyn Topic, unit: WriteUnit) -> Result<RoutingDecision> {
        let decision = self.decide(topic);
        self.execute(decision.clone(), topic, unit).await?;
        Ok(decision)
    }
}

impl std::fmt::Debug for WriteRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteRouter").finish_non_exhaustive()
    }
}
