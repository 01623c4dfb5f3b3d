//! Queue engine collaborator interface.
//!
//! The gateway never stores messages itself. It talks to an engine that
//! owns topics, channels and delivery state through these traits. Puts are
//! async because a commit may wait on downstream backpressure; the gateway
//! imposes no timeout on them.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::message::{Batch, Message};
use crate::stats::TopicStats;

/// Engine-side failures
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("topic {topic} has no partition {partition}")]
    PartitionNotFound { topic: String, partition: u32 },

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// Engine is shutting down and refuses writes
    #[error("exiting")]
    Exiting,

    /// Store-level failure
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// The durable queue engine.
pub trait QueueEngine: Send + Sync {
    /// Look up a topic that must already exist.
    ///
    /// With `partition == None` the engine picks the topic's local partition.
    fn get_existing_topic(&self, name: &str, partition: Option<u32>) -> Result<Arc<dyn Topic>>;

    /// Look up a topic, creating it when missing.
    fn get_or_create_topic(&self, name: &str, partition: Option<u32>) -> Result<Arc<dyn Topic>>;

    fn delete_existing_topic(&self, name: &str) -> Result<()>;

    /// Point-in-time statistics for every topic.
    fn stats(&self) -> Vec<TopicStats>;

    /// Persist topic/channel metadata (paused flags, channel lists).
    fn persist_metadata(&self) -> Result<()>;
}

/// One partition of a topic.
#[async_trait]
pub trait Topic: Send + Sync {
    fn name(&self) -> &str;

    fn partition(&self) -> u32;

    async fn put(&self, msg: Message) -> Result<()>;

    /// Commit a batch as a unit, in order.
    async fn put_batch(&self, batch: Batch) -> Result<()>;

    /// Drop every queued message.
    fn empty(&self) -> Result<()>;

    /// Look up a channel, creating it when missing.
    fn get_channel(&self, name: &str) -> Arc<dyn Channel>;

    fn get_existing_channel(&self, name: &str) -> Result<Arc<dyn Channel>>;

    fn delete_existing_channel(&self, name: &str) -> Result<()>;

    /// One-line human-readable statistic for a channel.
    fn channel_stat(&self, channel: &str) -> String;
}

/// A consumption cursor over a topic.
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    fn pause(&self) -> Result<()>;

    fn unpause(&self) -> Result<()>;

    fn is_paused(&self) -> bool;
}
