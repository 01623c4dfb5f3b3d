//! # Gantry Gateway
//!
//! Request-level orchestration for the Gantry message-ingestion gateway.
//!
//! ## Overview
//!
//! [`Gateway`] composes the core building blocks per request:
//! - **Publish**: TLS check, declared-length fast reject, topic resolution,
//!   bounded body decoding, then a local commit or a forward to the owner
//! - **Admin**: topic and channel create/delete/empty/pause
//! - **Stats**: filtered snapshot as JSON or a fixed-column text table
//! - **Config**: read and hot-write named runtime options
//!
//! The crate is transport-agnostic: callers supply a [`RequestHead`] and the
//! body as any `futures::io::AsyncRead`, and get a [`Response`] back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gantry_core::prelude::*;
//! use gantry_gateway::{Gateway, RequestHead, Response};
//! use futures::io::Cursor;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let engine = Arc::new(MemoryEngine::new());
//! let gateway = Gateway::new(
//!     engine.clone(),
//!     Arc::new(LocalOnly),
//!     Arc::new(SharedOptions::default()),
//! );
//! engine.get_or_create_topic("orders", None).unwrap();
//!
//! let head = RequestHead::new("topic=orders").with_content_length(5);
//! let resp = Response::from_result(gateway.publish(&head, &mut Cursor::new(b"hello")).await);
//! assert!(resp.is_success());
//! # }
//! ```

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_wrap)]
pub mod config;
pub mod gateway;
pub mod health;
pub mod request;
pub mod response;
pub mod stats_text;

pub use config::ConfigMutator;
pub use gateway::{Gateway, NodeInfo, VERSION};
pub use health::Health;
pub use request::{QueryParams, RequestHead, TopicArgs};
pub use response::{Body, Response};
pub use stats_text::render_stats;
