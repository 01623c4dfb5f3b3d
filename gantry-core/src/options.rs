//! Gateway configuration options
//!
//! A `GatewayOptions` value is an immutable snapshot once published; runtime
//! changes build a new value and swap it in (see `snapshot`). Options that
//! can be read or written by name at runtime are listed in `registry`.

use std::time::Duration;

use crate::admission::AdmissionPolicy;
use crate::decode::SizeLimits;

/// Gateway configuration options.
///
/// # Examples
///
/// ```
/// use gantry_core::options::GatewayOptions;
///
/// let opts = GatewayOptions::default()
///     .with_max_msg_size(64 * 1024)
///     .with_tls_required(true);
/// assert_eq!(opts.size_limits().max_msg_size, 64 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOptions {
    /// Unique node identifier within the cluster
    pub node_id: u64,

    /// Logging verbosity switch (writable at runtime)
    pub verbose: bool,

    /// Log level, 0 (errors only) to 4 (trace) (writable at runtime)
    pub log_level: i32,

    /// Hostname reported by `info`
    pub hostname: String,

    /// Address advertised to lookup services and clients
    pub broadcast_address: String,

    /// TCP listener address for the native protocol
    pub tcp_address: String,

    /// Plain-text HTTP listener address
    pub http_address: String,

    /// TLS HTTP listener address; its port is the TLS redirect target
    pub https_address: String,

    /// Lookup service TCP addresses (writable at runtime)
    pub lookupd_tcp_addresses: Vec<String>,

    /// Reject plain-text requests
    pub tls_required: bool,

    /// Maximum size of a single message in bytes
    pub max_msg_size: usize,

    /// Maximum size of a batch request body in bytes
    pub max_body_size: usize,

    /// In-memory queue depth per topic/channel before spilling to disk
    pub mem_queue_size: i64,

    /// Default in-flight timeout for delivered messages
    pub msg_timeout: Duration,

    /// Directory for engine data
    pub data_path: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            node_id: 0,
            verbose: false,
            log_level: 1,
            hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string()),
            broadcast_address: "127.0.0.1".to_string(),
            tcp_address: "0.0.0.0:4150".to_string(),
            http_address: "0.0.0.0:4151".to_string(),
            https_address: "0.0.0.0:4152".to_string(),
            lookupd_tcp_addresses: Vec::new(),
            tls_required: false,
            max_msg_size: 1024 * 1024,       // 1MB
            max_body_size: 5 * 1024 * 1024,  // 5MB
            mem_queue_size: 10_000,
            msg_timeout: Duration::from_secs(60),
            data_path: String::new(),
        }
    }
}

impl GatewayOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_id(mut self, node_id: u64) -> Self {
        self.node_id = node_id;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_log_level(mut self, level: i32) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_broadcast_address(mut self, addr: impl Into<String>) -> Self {
        self.broadcast_address = addr.into();
        self
    }

    pub fn with_https_address(mut self, addr: impl Into<String>) -> Self {
        self.https_address = addr.into();
        self
    }

    pub fn with_lookupd_tcp_addresses(mut self, addrs: Vec<String>) -> Self {
        self.lookupd_tcp_addresses = addrs;
        self
    }

    pub fn with_tls_required(mut self, required: bool) -> Self {
        self.tls_required = required;
        self
    }

    /// Set the single-message ceiling.
    pub fn with_max_msg_size(mut self, size: usize) -> Self {
        self.max_msg_size = size;
        self
    }

    /// Set the batch body ceiling.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    pub fn with_msg_timeout(mut self, timeout: Duration) -> Self {
        self.msg_timeout = timeout;
        self
    }

    /// Size ceilings for one request.
    pub fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(self.max_msg_size, self.max_body_size)
    }

    /// Transport admission policy.
    pub fn admission_policy(&self) -> AdmissionPolicy {
        AdmissionPolicy {
            tls_required: self.tls_required,
            tls_port: self.https_port(),
        }
    }

    /// Port of `tcp_address`, if it has one.
    pub fn tcp_port(&self) -> Option<u16> {
        port_of(&self.tcp_address)
    }

    /// Port of `http_address`, if it has one.
    pub fn http_port(&self) -> Option<u16> {
        port_of(&self.http_address)
    }

    /// Port of `https_address`, if it has one.
    pub fn https_port(&self) -> Option<u16> {
        port_of(&self.https_address)
    }
}

fn port_of(addr: &str) -> Option<u16> {
    addr.rsplit_once(':').and_then(|(_, port)| port.parse().ok())
}
