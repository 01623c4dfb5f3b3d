//! # Gantry
//!
//! The message-ingestion gateway of a partitioned publish/subscribe broker.
//!
//! ## Architecture
//!
//! - **`gantry-core`**: buffer pool, body decoders, admission checks, write
//!   routing, engine collaborator traits, options and stats model
//! - **`gantry-gateway`**: the per-request orchestrator ([`Gateway`])
//! - **`gantry`**: public API surface (this crate)
//!
//! The gateway is transport-agnostic. An HTTP front end maps each route to a
//! [`Gateway`] operation, passing a [`RequestHead`] and the body as a
//! `futures::io::AsyncRead`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gantry::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(body: &mut (dyn futures::io::AsyncRead + Unpin)) {
//! let engine = Arc::new(MemoryEngine::new());
//! engine.get_or_create_topic("orders", None).unwrap();
//! let gateway = Gateway::new(engine, Arc::new(LocalOnly), Arc::new(SharedOptions::default()));
//!
//! let head = RequestHead::new("topic=orders&binary");
//! let resp = Response::from_result(gateway.publish_batch(&head, body).await);
//! println!("{} {:?}", resp.status, resp.body);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export core types
pub use bytes::Bytes;

pub use gantry_gateway::{Body, Gateway, RequestHead, Response};

pub mod dev_tracing;

/// Everything needed to embed a gateway.
pub mod prelude {
    pub use gantry_core::prelude::*;
    pub use gantry_gateway::{Body, ConfigMutator, Gateway, Health, RequestHead, Response};
}
