//! Fixed-column text rendering of a stats report.

use chrono::{DateTime, SecondsFormat};
use std::fmt::Write;
use std::time::Duration;

use gantry_core::stats::{format_duration, StatsReport};

/// Render `report` as the operator-facing text table.
///
/// `now` is Unix seconds, used for client connection ages.
pub fn render_stats(report: &StatsReport, uptime: Duration, now: i64) -> String {
    let mut out = String::new();
    // Writes into a String cannot fail.
    let _ = write_report(&mut out, report, uptime, now);
    out
}

fn write_report(
    w: &mut String,
    report: &StatsReport,
    uptime: Duration,
    now: i64,
) -> std::fmt::Result {
    let start = DateTime::from_timestamp(report.start_time, 0)
        .map_or_else(|| report.start_time.to_string(), |t| t.to_rfc3339_opts(SecondsFormat::Secs, true));

    writeln!(w, "{}", report.version)?;
    writeln!(w, "start_time {start}")?;
    writeln!(w, "uptime {}", format_duration(uptime))?;
    if report.topics.is_empty() {
        w.push_str("\nNO_TOPICS\n");
        return Ok(());
    }
    writeln!(w, "\nHealth: {}", report.health)?;

    for t in &report.topics {
        writeln!(
            w,
            "\n   [{:<15}] depth: {:<5} be-depth: {:<5} msgs: {:<8} e2e%: {}",
            t.topic_name, t.depth, t.backend_depth, t.message_count, t.e2e_processing_latency
        )?;
        for c in &t.channels {
            let prefix = if c.paused { "   *P " } else { "      " };
            writeln!(
                w,
                "{prefix}[{:<25}] depth: {:<5} be-depth: {:<5} inflt: {:<4} def: {:<4} re-q: {:<5} timeout: {:<5} msgs: {:<8} e2e%: {}",
                c.channel_name,
                c.depth,
                c.backend_depth,
                c.in_flight_count,
                c.deferred_count,
                c.requeue_count,
                c.timeout_count,
                c.message_count,
                c.e2e_processing_latency
            )?;
            for client in &c.clients {
                let port = client
                    .remote_address
                    .rsplit_once(':')
                    .map_or("", |(_, port)| port);
                let connected = Duration::from_secs(u64::try_from(now - client.connect_ts).unwrap_or(0));
                writeln!(
                    w,
                    "        [{} {:<21}] state: {} inflt: {:<4} rdy: {:<4} fin: {:<8} re-q: {:<8} msgs: {:<8} connected: {}",
                    client.version,
                    format!("{}:{}", client.name, port),
                    client.state,
                    client.in_flight_count,
                    client.ready_count,
                    client.finish_count,
                    client.requeue_count,
                    client.message_count,
                    format_duration(connected)
                )?;
            }
        }
    }
    Ok(())
}
