//! Named option registry.
//!
//! Maps the external config name of each runtime-visible option to a getter
//! and, for the few options that may change at runtime, a setter. The table
//! is static; the name index is built once on first use.
//!
//! Config names default to the flag name with `-` replaced by `_`. An
//! explicit `cfg` name overrides that.

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::time::Duration;

use crate::error::{GatewayError, Result};
use crate::options::GatewayOptions;

type Getter = fn(&GatewayOptions) -> Value;
type Setter = fn(&mut GatewayOptions, &[u8]) -> serde_json::Result<()>;

/// Native type of an option value, as carried in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    UInt,
    Str,
    StrList,
    /// Duration exposed as integer milliseconds
    DurationMs,
}

/// One registered option.
pub struct OptionSpec {
    /// Command-line flag name
    pub flag: &'static str,
    /// Config name override
    pub cfg: Option<&'static str>,
    pub kind: ValueKind,
    get: Getter,
    set: Option<Setter>,
}

impl OptionSpec {
    /// External config name.
    #[must_use]
    pub fn config_name(&self) -> String {
        match self.cfg {
            Some(cfg) => cfg.to_string(),
            None => self.flag.replace('-', "_"),
        }
    }

    /// Whether the option can be changed at runtime.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    #[must_use]
    pub fn read(&self, opts: &GatewayOptions) -> Value {
        (self.get)(opts)
    }

    /// Build a new snapshot that differs from `opts` only in this option.
    pub fn apply(&self, opts: &GatewayOptions, raw: &[u8]) -> Result<GatewayOptions> {
        let Some(set) = self.set else {
            return Err(GatewayError::InvalidOption(self.config_name()));
        };
        let mut next = opts.clone();
        set(&mut next, raw).map_err(|e| {
            GatewayError::InvalidValue(format!("{} expects {:?}: {}", self.config_name(), self.kind, e))
        })?;
        Ok(next)
    }
}

impl std::fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionSpec")
            .field("flag", &self.flag)
            .field("cfg", &self.cfg)
            .field("kind", &self.kind)
            .field("writable", &self.is_writable())
            .finish()
    }
}

static OPTION_TABLE: &[OptionSpec] = &[
    OptionSpec {
        flag: "node-id",
        cfg: None,
        kind: ValueKind::UInt,
        get: |o| Value::from(o.node_id),
        set: None,
    },
    OptionSpec {
        flag: "verbose",
        cfg: None,
        kind: ValueKind::Bool,
        get: |o| Value::from(o.verbose),
        set: Some(|o, raw| {
            o.verbose = serde_json::from_slice(raw)?;
            Ok(())
        }),
    },
    OptionSpec {
        flag: "log-level",
        cfg: None,
        kind: ValueKind::Int,
        get: |o| Value::from(o.log_level),
        set: Some(|o, raw| {
            o.log_level = serde_json::from_slice(raw)?;
            Ok(())
        }),
    },
    OptionSpec {
        flag: "broadcast-address",
        cfg: None,
        kind: ValueKind::Str,
        get: |o| Value::from(o.broadcast_address.clone()),
        set: None,
    },
    OptionSpec {
        flag: "tcp-address",
        cfg: None,
        kind: ValueKind::Str,
        get: |o| Value::from(o.tcp_address.clone()),
        set: None,
    },
    OptionSpec {
        flag: "http-address",
        cfg: None,
        kind: ValueKind::Str,
        get: |o| Value::from(o.http_address.clone()),
        set: None,
    },
    OptionSpec {
        flag: "https-address",
        cfg: None,
        kind: ValueKind::Str,
        get: |o| Value::from(o.https_address.clone()),
        set: None,
    },
    OptionSpec {
        flag: "lookupd-tcp-address",
        cfg: Some("nsqlookupd_tcp_addresses"),
        kind: ValueKind::StrList,
        get: |o| Value::from(o.lookupd_tcp_addresses.clone()),
        set: Some(|o, raw| {
            o.lookupd_tcp_addresses = serde_json::from_slice(raw)?;
            Ok(())
        }),
    },
    OptionSpec {
        flag: "tls-required",
        cfg: None,
        kind: ValueKind::Bool,
        get: |o| Value::from(o.tls_required),
        set: None,
    },
    OptionSpec {
        flag: "max-msg-size",
        cfg: None,
        kind: ValueKind::UInt,
        get: |o| Value::from(o.max_msg_size),
        set: None,
    },
    OptionSpec {
        flag: "max-body-size",
        cfg: None,
        kind: ValueKind::UInt,
        get: |o| Value::from(o.max_body_size),
        set: None,
    },
    OptionSpec {
        flag: "mem-queue-size",
        cfg: None,
        kind: ValueKind::Int,
        get: |o| Value::from(o.mem_queue_size),
        set: None,
    },
    OptionSpec {
        flag: "msg-timeout",
        cfg: None,
        kind: ValueKind::DurationMs,
        get: |o| Value::from(duration_ms(o.msg_timeout)),
        set: None,
    },
    OptionSpec {
        flag: "data-path",
        cfg: None,
        kind: ValueKind::Str,
        get: |o| Value::from(o.data_path.clone()),
        set: None,
    },
];

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

static REGISTRY: Lazy<OptionRegistry> = Lazy::new(OptionRegistry::build);

/// Index from config name to option spec.
#[derive(Debug)]
pub struct OptionRegistry {
    by_name: HashMap<String, &'static OptionSpec>,
}

impl OptionRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    fn build() -> Self {
        let by_name = OPTION_TABLE
            .iter()
            .map(|spec| (spec.config_name(), spec))
            .collect();
        Self { by_name }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'static OptionSpec> {
        self.by_name.get(name).copied()
    }

    /// Read an option by config name.
    pub fn read(&self, opts: &GatewayOptions, name: &str) -> Result<Value> {
        self.lookup(name)
            .map(|spec| spec.read(opts))
            .ok_or_else(|| GatewayError::InvalidOption(name.to_string()))
    }

    /// Config names of every registered option.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}
