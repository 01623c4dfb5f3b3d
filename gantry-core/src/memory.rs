//! In-memory queue engine.
//!
//! Not durable. Each topic owns a single local partition; messages published
//! while a topic has no channels wait in the topic backlog and move to the
//! first channel created. Every channel receives a copy of each message
//! published after it exists.
//!
//! Lock order is topic `channels` before topic `backlog`.

use async_trait::async_trait;
use dashmap::DashMap;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::engine::{Channel, EngineError, QueueEngine, Result, Topic};
use crate::message::{Batch, Message};
use crate::stats::{ChannelStats, TopicStats};

/// Engine holding every topic in process memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    topics: DashMap<String, Arc<MemoryTopic>>,
    exiting: Arc<AtomicBool>,
    metadata_persists: AtomicU64,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concrete handle to a topic, for inspection.
    pub fn topic(&self, name: &str) -> Option<Arc<MemoryTopic>> {
        self.topics.get(name).map(|t| t.value().clone())
    }

    /// Refuse further writes.
    pub fn close(&self) {
        info!("[ENGINE] Closing, {} topics", self.topics.len());
        self.exiting.store(true, Ordering::Release);
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::Acquire)
    }

    /// How many times metadata was persisted.
    pub fn metadata_persists(&self) -> u64 {
        self.metadata_persists.load(Ordering::Relaxed)
    }

    fn check_partition(topic: &MemoryTopic, partition: Option<u32>) -> Result<()> {
        match partition {
            Some(p) if p != topic.partition => Err(EngineError::PartitionNotFound {
                topic: topic.name.clone(),
                partition: p,
            }),
            _ => Ok(()),
        }
    }
}

impl QueueEngine for MemoryEngine {
    fn get_existing_topic(&self, name: &str, partition: Option<u32>) -> Result<Arc<dyn Topic>> {
        let topic = self
            .topic(name)
            .ok_or_else(|| EngineError::TopicNotFound(name.to_string()))?;
        Self::check_partition(&topic, partition)?;
        Ok(topic)
    }

    fn get_or_create_topic(&self, name: &str, partition: Option<u32>) -> Result<Arc<dyn Topic>> {
        if self.is_exiting() {
            return Err(EngineError::Exiting);
        }
        let topic = self
            .topics
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("[ENGINE] Created topic {}/{}", name, partition.unwrap_or(0));
                Arc::new(MemoryTopic::new(
                    name.to_string(),
                    partition.unwrap_or(0),
                    self.exiting.clone(),
                ))
            })
            .value()
            .clone();
        Self::check_partition(&topic, partition)?;
        Ok(topic)
    }

    fn delete_existing_topic(&self, name: &str) -> Result<()> {
        self.topics
            .remove(name)
            .map(|_| debug!("[ENGINE] Deleted topic {}", name))
            .ok_or_else(|| EngineError::TopicNotFound(name.to_string()))
    }

    fn stats(&self) -> Vec<TopicStats> {
        let mut out: Vec<TopicStats> = self.topics.iter().map(|t| t.value().stats()).collect();
        out.sort_by(|a, b| a.topic_name.cmp(&b.topic_name));
        out
    }

    fn persist_metadata(&self) -> Result<()> {
        self.metadata_persists.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// One topic partition held in memory.
#[derive(Debug)]
pub struct MemoryTopic {
    name: String,
    partition: u32,
    channels: RwLock<HashMap<String, Arc<MemoryChannel>>>,
    backlog: Mutex<VecDeque<Message>>,
    message_count: AtomicU64,
    exiting: Arc<AtomicBool>,
}

impl MemoryTopic {
    fn new(name: String, partition: u32, exiting: Arc<AtomicBool>) -> Self {
        Self {
            name,
            partition,
            channels: RwLock::new(HashMap::new()),
            backlog: Mutex::new(VecDeque::new()),
            message_count: AtomicU64::new(0),
            exiting,
        }
    }

    /// Messages waiting for a first channel.
    pub fn depth(&self) -> usize {
        self.backlog.lock().len()
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Relaxed)
    }

    /// Concrete handle to a channel, for inspection.
    pub fn channel(&self, name: &str) -> Option<Arc<MemoryChannel>> {
        self.channels.read().get(name).cloned()
    }

    /// Copy of the backlog, oldest first.
    pub fn backlog(&self) -> Vec<Message> {
        self.backlog.lock().iter().cloned().collect()
    }

    fn append<I>(&self, msgs: I) -> Result<()>
    where
        I: IntoIterator<Item = Message>,
    {
        if self.exiting.load(Ordering::Acquire) {
            return Err(EngineError::Exiting);
        }
        let channels = self.channels.read();
        let mut n = 0u64;
        if channels.is_empty() {
            let mut backlog = self.backlog.lock();
            for msg in msgs {
                backlog.push_back(msg);
                n += 1;
            }
        } else {
            for msg in msgs {
                for ch in channels.values() {
                    ch.push(msg.clone());
                }
                n += 1;
            }
        }
        self.message_count.fetch_add(n, Ordering::Relaxed);
        Ok(())
    }

    fn stats(&self) -> TopicStats {
        let channels = self.channels.read();
        let mut channel_stats: Vec<ChannelStats> = channels.values().map(|c| c.stats()).collect();
        channel_stats.sort_by(|a, b| a.channel_name.cmp(&b.channel_name));
        TopicStats {
            topic_name: self.name.clone(),
            topic_partition: self.partition,
            depth: self.depth() as i64,
            backend_depth: 0,
            message_count: self.message_count(),
            channels: channel_stats,
            e2e_processing_latency: Default::default(),
        }
    }
}

#[async_trait]
impl Topic for MemoryTopic {
    fn name(&self) -> &str {
        &self.name
    }

    fn partition(&self) -> u32 {
        self.partition
    }

    async fn put(&self, msg: Message) -> Result<()> {
        self.append(std::iter::once(msg))
    }

    async fn put_batch(&self, batch: Batch) -> Result<()> {
        self.append(batch)
    }

    fn empty(&self) -> Result<()> {
        let dropped = {
            let mut backlog = self.backlog.lock();
            let n = backlog.len();
            backlog.clear();
            n
        };
        debug!("[ENGINE] Emptied topic {}, dropped {}", self.name, dropped);
        Ok(())
    }

    fn get_channel(&self, name: &str) -> Arc<dyn Channel> {
        if let Some(ch) = self.channel(name) {
            return ch;
        }
        let mut channels = self.channels.write();
        let first = channels.is_empty();
        let ch = channels
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryChannel::new(name.to_string())))
            .clone();
        if first {
            let mut backlog = self.backlog.lock();
            for msg in backlog.drain(..) {
                ch.push(msg);
            }
        }
        ch
    }

    fn get_existing_channel(&self, name: &str) -> Result<Arc<dyn Channel>> {
        self.channel(name)
            .map(|c| c as Arc<dyn Channel>)
            .ok_or_else(|| EngineError::ChannelNotFound(name.to_string()))
    }

    fn delete_existing_channel(&self, name: &str) -> Result<()> {
        self.channels
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::ChannelNotFound(name.to_string()))
    }

    fn channel_stat(&self, channel: &str) -> String {
        match self.channel(channel) {
            Some(ch) => {
                let s = ch.stats();
                format!(
                    "{}/{} channel {}: depth {}, messages {}, paused {}",
                    self.name, self.partition, s.channel_name, s.depth, s.message_count, s.paused
                )
            }
            None => format!("{}/{} channel {}: not found", self.name, self.partition, channel),
        }
    }
}

/// A channel's in-memory queue.
#[derive(Debug)]
pub struct MemoryChannel {
    name: String,
    queue: Mutex<VecDeque<Message>>,
    message_count: AtomicU64,
    paused: AtomicBool,
}

impl MemoryChannel {
    fn new(name: String) -> Self {
        Self {
            name,
            queue: Mutex::new(VecDeque::new()),
            message_count: AtomicU64::new(0),
            paused: AtomicBool::new(false),
        }
    }

    fn push(&self, msg: Message) {
        self.queue.lock().push_back(msg);
        self.message_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the oldest message, unless paused.
    pub fn pop(&self) -> Option<Message> {
        if self.is_paused() {
            return None;
        }
        self.queue.lock().pop_front()
    }

    pub fn depth(&self) -> usize {
        self.queue.lock().len()
    }

    fn stats(&self) -> ChannelStats {
        ChannelStats {
            channel_name: self.name.clone(),
            depth: self.depth() as i64,
            message_count: self.message_count.load(Ordering::Relaxed),
            paused: self.is_paused(),
            ..Default::default()
        }
    }
}

impl Channel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn pause(&self) -> Result<()> {
        self.paused.store(true, Ordering::Release);
        Ok(())
    }

    fn unpause(&self) -> Result<()> {
        self.paused.store(false, Ordering::Release);
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}
