//! Gantry Core
//!
//! This crate contains the runtime-agnostic building blocks of the gateway:
//! - Reusable decode buffers (`pool`)
//! - Request body decoding, single and batch (`decode`)
//! - Transport admission checks (`admission`)
//! - Partition-aware write routing (`routing`)
//! - Queue engine collaborator traits (`engine`) and an in-memory engine (`memory`)
//! - Options, the config-name registry and the published snapshot
//!   (`options`, `registry`, `snapshot`)
//! - Statistics model and filtering (`stats`)
//! - Error types (`error`)

#![deny(unsafe_code)]
// Allow some pedantic lints that are intentional in this crate
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
pub mod admission;
pub mod decode;
pub mod engine;
pub mod error;
pub mod memory;
pub mod message;
pub mod names;
pub mod options;
pub mod pool;
pub mod registry;
pub mod routing;
pub mod snapshot;
pub mod stats;

pub mod prelude {
    pub use crate::admission::{check_declared_length, check_tls, AdmissionPolicy, PublishEndpoint};
    pub use crate::decode::{read_batch, read_single, BatchFormat, DecodeError, SizeLimits};
    pub use crate::engine::{Channel, EngineError, QueueEngine, Topic};
    pub use crate::error::{ErrorClass, GatewayError, Result};
    pub use crate::memory::MemoryEngine;
    pub use crate::message::{Batch, Message, WriteUnit};
    pub use crate::options::GatewayOptions;
    pub use crate::pool::{BufferPool, LeasedBuffer};
    pub use crate::registry::OptionRegistry;
    pub use crate::routing::{
        ForwardError, ForwardTarget, LocalOnly, PartitionRouter, RoutingDecision, WriteRouter,
    };
    pub use crate::snapshot::{OptionsStore, SharedOptions};
    pub use crate::stats::{StatsReport, TopicStats};
}
