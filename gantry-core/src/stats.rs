//! Runtime statistics model.
//!
//! The engine produces a `Vec<TopicStats>` snapshot; the gateway filters it
//! and renders the same filtered [`StatsReport`] either as JSON or as a
//! text table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// End-to-end processing latency percentiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct E2eLatency {
    /// Samples the percentiles were computed from
    pub count: u64,
    pub percentiles: Vec<Percentile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    /// Quantile in `0.0..=1.0`
    pub quantile: f64,
    /// Latency in nanoseconds
    pub value: u64,
}

impl fmt::Display for E2eLatency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.percentiles.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}: {}",
                p.quantile * 100.0,
                format_duration(Duration::from_nanos(p.value))
            )?;
        }
        Ok(())
    }
}

/// A connected consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientStats {
    pub name: String,
    pub version: String,
    pub remote_address: String,
    pub state: i32,
    pub ready_count: i64,
    pub in_flight_count: i64,
    pub message_count: u64,
    pub finish_count: u64,
    pub requeue_count: u64,
    /// Unix seconds
    pub connect_ts: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel_name: String,
    pub depth: i64,
    pub backend_depth: i64,
    pub in_flight_count: i64,
    pub deferred_count: i64,
    pub message_count: u64,
    pub requeue_count: u64,
    pub timeout_count: u64,
    pub paused: bool,
    pub clients: Vec<ClientStats>,
    pub e2e_processing_latency: E2eLatency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicStats {
    pub topic_name: String,
    pub topic_partition: u32,
    pub depth: i64,
    pub backend_depth: i64,
    pub message_count: u64,
    pub channels: Vec<ChannelStats>,
    pub e2e_processing_latency: E2eLatency,
}

/// The stats document served by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub version: String,
    pub health: String,
    /// Process start, Unix seconds
    pub start_time: i64,
    pub topics: Vec<TopicStats>,
}

/// Narrow a snapshot to one topic and, optionally, one of its channels.
///
/// The channel filter only applies together with a topic filter. A filter
/// that matches nothing leaves the list as it was.
#[must_use]
pub fn filter_topics(
    mut stats: Vec<TopicStats>,
    topic: Option<&str>,
    channel: Option<&str>,
) -> Vec<TopicStats> {
    let Some(topic) = topic.filter(|t| !t.is_empty()) else {
        return stats;
    };
    let Some(pos) = stats.iter().position(|t| t.topic_name == topic) else {
        return stats;
    };

    let mut selected = stats.swap_remove(pos);
    if let Some(channel) = channel.filter(|c| !c.is_empty()) {
        if let Some(cpos) = selected
            .channels
            .iter()
            .position(|c| c.channel_name == channel)
        {
            let kept = selected.channels.swap_remove(cpos);
            selected.channels = vec![kept];
        }
    }
    vec![selected]
}

/// Format a duration the way operators read uptimes: `1h2m3.5s`, `250ms`.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    if total == 0 {
        let nanos = d.subsec_nanos();
        return match nanos {
            0 => "0s".to_string(),
            n if n < 1_000 => format!("{n}ns"),
            n if n < 1_000_000 => trim_fraction(f64::from(n) / 1_000.0, "µs"),
            n => trim_fraction(f64::from(n) / 1_000_000.0, "ms"),
        };
    }

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = f64::from((total % 60) as u32) + f64::from(d.subsec_millis()) / 1_000.0;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&trim_fraction(secs, "s"));
    out
}

fn trim_fraction(value: f64, unit: &str) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{s}{unit}")
}
