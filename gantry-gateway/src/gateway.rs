//! Request-level orchestration.
//!
//! Every operation checks the TLS policy first, before any argument parsing
//! or body read. Publishes then fast-reject on the declared length, resolve
//! the topic, decode the body and hand the result to the write router.
//! Options are read once per request from the current snapshot.

use futures::io::AsyncRead;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, trace, warn};

use gantry_core::admission::{check_declared_length, check_tls, PublishEndpoint};
use gantry_core::decode::{read_batch, read_single, BatchFormat};
use gantry_core::engine::{QueueEngine, Topic};
use gantry_core::error::{GatewayError, Result};
use gantry_core::message::WriteUnit;
use gantry_core::options::GatewayOptions;
use gantry_core::pool::BufferPool;
use gantry_core::routing::{PartitionRouter, RoutingDecision, WriteRouter};
use gantry_core::snapshot::OptionsStore;
use gantry_core::stats::{filter_topics, StatsReport};

use crate::config::ConfigMutator;
use crate::health::Health;
use crate::request::{QueryParams, RequestHead};
use crate::response::Response;
use crate::stats_text::render_stats;

/// Crate version reported by `info` and `stats`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process start, captured on first use.
static PROCESS_START: Lazy<(i64, Instant)> = Lazy::new(|| (unix_now(), Instant::now()));

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

/// Node identity served by `info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    pub version: String,
    pub broadcast_address: String,
    pub hostname: String,
    pub http_port: Option<u16>,
    pub tcp_port: Option<u16>,
    pub start_time: i64,
}

/// The message-ingestion gateway.
pub struct Gateway {
    engine: Arc<dyn QueueEngine>,
    router: WriteRouter,
    options: Arc<dyn OptionsStore>,
    config: ConfigMutator,
    pool: Arc<BufferPool>,
    health: Health,
}

impl Gateway {
    pub fn new(
        engine: Arc<dyn QueueEngine>,
        router: Arc<dyn PartitionRouter>,
        options: Arc<dyn OptionsStore>,
    ) -> Self {
        Lazy::force(&PROCESS_START);
        Self {
            engine,
            router: WriteRouter::new(router),
            config: ConfigMutator::new(options.clone()),
            options,
            pool: Arc::new(BufferPool::default()),
            health: Health::new(),
        }
    }

    /// Share a buffer pool with other gateways.
    pub fn with_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    /// Unix seconds at process start.
    pub fn start_time(&self) -> i64 {
        PROCESS_START.0
    }

    /// Publish the whole body as one message.
    pub async fn publish<R>(&self, head: &RequestHead, body: &mut R) -> Result<Response>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let opts = self.admit(head)?;
        let limits = opts.size_limits();
        check_declared_length(PublishEndpoint::Single, head.content_length, &limits)?;

        let topic = self.existing_topic(&head.params()?)?;
        let msg = read_single(body, head.content_length, &limits, &self.pool).await?;
        trace!("[GATEWAY] PUB {} bytes to {}", msg.len(), topic.name());

        let decision = self.router.decide(topic.as_ref());
        log_forward(&decision, head, "PUB");
        self.router
            .execute(decision, topic.as_ref(), msg.into())
            .await?;
        Ok(Response::text("OK"))
    }

    /// Publish a batch, newline-delimited or, with the `binary` flag,
    /// length-prefixed.
    pub async fn publish_batch<R>(&self, head: &RequestHead, body: &mut R) -> Result<Response>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let opts = self.admit(head)?;
        let limits = opts.size_limits();
        check_declared_length(PublishEndpoint::Batch, head.content_length, &limits)?;

        let params = head.params()?;
        let topic = self.existing_topic(&params)?;
        let format = if params.contains("binary") {
            BatchFormat::Binary
        } else {
            BatchFormat::Text
        };
        let batch = read_batch(format, body, &limits, &self.pool).await?;
        if batch.is_empty() {
            debug!("[GATEWAY] MPUB to {} carried no messages", topic.name());
            return Ok(Response::text("OK"));
        }
        trace!("[GATEWAY] MPUB {} messages to {}", batch.len(), topic.name());

        let decision = self.router.decide(topic.as_ref());
        let local = decision == RoutingDecision::Local;
        log_forward(&decision, head, "MPUB");
        let res = self
            .router
            .execute(decision, topic.as_ref(), WriteUnit::Batch(batch))
            .await;
        if local {
            self.health.set(res.as_ref().map(|_| ()));
        }
        res?;
        Ok(Response::text("OK"))
    }

    /// `OK` while healthy, otherwise the health string as an error.
    pub fn ping(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        if self.health.is_healthy() {
            Ok(Response::text("OK"))
        } else {
            Err(GatewayError::Unhealthy(self.health.status()))
        }
    }

    pub fn info(&self, head: &RequestHead) -> Result<Response> {
        let opts = self.admit(head)?;
        let info = NodeInfo {
            version: VERSION.to_string(),
            broadcast_address: opts.broadcast_address.clone(),
            hostname: opts.hostname.clone(),
            http_port: opts.http_port(),
            tcp_port: opts.tcp_port(),
            start_time: self.start_time(),
        };
        Ok(Response::json(to_json(&info)?))
    }

    /// Stats snapshot, optionally narrowed by `topic` and `channel`;
    /// `format=json` selects JSON over the text table.
    pub fn stats(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        let params = head.params()?;
        let report = self.stats_report(params.get("topic"), params.get("channel"));

        if params.get("format") == Some("json") {
            Ok(Response::json(to_json(&report)?))
        } else {
            let uptime = PROCESS_START.1.elapsed();
            Ok(Response::text(render_stats(&report, uptime, unix_now())))
        }
    }

    /// Filtered stats in structured form.
    pub fn stats_report(&self, topic: Option<&str>, channel: Option<&str>) -> StatsReport {
        StatsReport {
            version: format!("gantry v{VERSION}"),
            health: self.health.status(),
            start_time: self.start_time(),
            topics: filter_topics(self.engine.stats(), topic, channel),
        }
    }

    /// One channel's stat line, as reported by its topic.
    pub fn message_stats(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        let params = head.params()?;
        let name = params.get("topic").unwrap_or_default();
        let topic = self.engine.get_existing_topic(name, None)?;
        Ok(Response::text(
            topic.channel_stat(params.get("channel").unwrap_or_default()),
        ))
    }

    pub fn create_topic(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        let args = head.params()?.topic_args()?;
        self.engine.get_or_create_topic(&args.topic, args.partition)?;
        Ok(Response::ok())
    }

    pub fn delete_topic(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        let params = head.params()?;
        self.engine.delete_existing_topic(params.topic_arg()?)?;
        Ok(Response::ok())
    }

    /// Drop every queued message of a topic.
    pub fn empty_topic(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        let params = head.params()?;
        let topic = self.engine.get_existing_topic(params.topic_arg()?, None)?;
        topic.empty().map_err(|e| {
            error!("[GATEWAY] Failed to empty topic {}: {}", topic.name(), e);
            GatewayError::internal(e.to_string())
        })?;
        Ok(Response::ok())
    }

    pub fn create_channel(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        let (topic, channel) = self.existing_topic_channel(&head.params()?)?;
        topic.get_channel(&channel);
        Ok(Response::ok())
    }

    pub fn delete_channel(&self, head: &RequestHead) -> Result<Response> {
        self.admit(head)?;
        let (topic, channel) = self.existing_topic_channel(&head.params()?)?;
        topic.delete_existing_channel(&channel)?;
        Ok(Response::ok())
    }

    pub fn pause_channel(&self, head: &RequestHead) -> Result<Response> {
        self.set_channel_paused(head, true)
    }

    pub fn unpause_channel(&self, head: &RequestHead) -> Result<Response> {
        self.set_channel_paused(head, false)
    }

    /// Current value of a runtime option.
    pub fn get_config(&self, head: &RequestHead, name: &str) -> Result<Response> {
        self.admit(head)?;
        Ok(Response::json(self.config.get(name)?))
    }

    /// Set a runtime option from a JSON body.
    pub async fn set_config<R>(&self, head: &RequestHead, name: &str, body: &mut R) -> Result<Response>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.admit(head)?;
        Ok(Response::json(self.config.set(name, body).await?))
    }

    fn set_channel_paused(&self, head: &RequestHead, paused: bool) -> Result<Response> {
        self.admit(head)?;
        let (topic, name) = self.existing_topic_channel(&head.params()?)?;
        let channel = topic.get_existing_channel(&name)?;

        let res = if paused {
            channel.pause()
        } else {
            channel.unpause()
        };
        res.map_err(|e| {
            error!(
                "[GATEWAY] Failed to {} channel {}/{}: {}",
                if paused { "pause" } else { "unpause" },
                topic.name(),
                name,
                e
            );
            GatewayError::internal(e.to_string())
        })?;

        if let Err(e) = self.engine.persist_metadata() {
            warn!("[GATEWAY] Failed to persist metadata: {}", e);
        }
        Ok(Response::ok())
    }

    /// Load the options snapshot and apply the TLS policy.
    fn admit(&self, head: &RequestHead) -> Result<Arc<GatewayOptions>> {
        let opts = self.options.current();
        check_tls(&opts.admission_policy(), head.secure)?;
        Ok(opts)
    }

    fn existing_topic(&self, params: &QueryParams) -> Result<Arc<dyn Topic>> {
        let args = params.topic_args()?;
        self.engine
            .get_existing_topic(&args.topic, args.partition)
            .map_err(|e| {
                debug!("[GATEWAY] Topic lookup failed: {}", e);
                GatewayError::from(e)
            })
    }

    fn existing_topic_channel(&self, params: &QueryParams) -> Result<(Arc<dyn Topic>, String)> {
        let args = params.topic_args()?;
        let channel = params.channel_arg()?.to_string();
        let topic = self.engine.get_existing_topic(&args.topic, args.partition)?;
        Ok((topic, channel))
    }
}

fn log_forward(decision: &RoutingDecision, head: &RequestHead, op: &str) {
    if let RoutingDecision::Forward(target) = decision {
        debug!(
            "[GATEWAY] {} to {}/{} forwarded to owner, from {}",
            op,
            target.topic,
            target.partition,
            head.origin()
        );
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| GatewayError::internal(e.to_string()))
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("router", &self.router)
            .field("pool", &self.pool)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}
