//! Shared fixtures for gateway integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use futures::io::AsyncRead;
use gantry_core::engine::QueueEngine;
use gantry_core::memory::MemoryEngine;
use gantry_core::message::WriteUnit;
use gantry_core::options::GatewayOptions;
use gantry_core::routing::{ForwardError, PartitionRouter};
use gantry_core::snapshot::SharedOptions;
use gantry_gateway::Gateway;
use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Router that owns nothing unless told otherwise and records forwards.
#[derive(Default)]
pub struct RecordingRouter {
    pub remote: bool,
    pub fail: bool,
    pub forwarded: Mutex<Vec<(String, u32, WriteUnit)>>,
}

#[async_trait]
impl PartitionRouter for RecordingRouter {
    fn is_locally_owned(&self, _topic: &str, _partition: u32) -> bool {
        !self.remote
    }

    async fn forward(&self, topic: &str, partition: u32, unit: WriteUnit) -> Result<(), ForwardError> {
        self.forwarded
            .lock()
            .push((topic.to_string(), partition, unit));
        if self.fail {
            return Err(ForwardError::new("E_REMOTE_REFUSED"));
        }
        Ok(())
    }
}

pub struct Fixture {
    pub engine: Arc<MemoryEngine>,
    pub router: Arc<RecordingRouter>,
    pub options: Arc<SharedOptions>,
    pub gateway: Gateway,
}

pub fn fixture_with(opts: GatewayOptions, router: RecordingRouter) -> Fixture {
    let engine = Arc::new(MemoryEngine::new());
    let router = Arc::new(router);
    let options = Arc::new(SharedOptions::new(opts));
    let gateway = Gateway::new(engine.clone(), router.clone(), options.clone());
    engine.get_or_create_topic("orders", None).unwrap();
    Fixture {
        engine,
        router,
        options,
        gateway,
    }
}

/// Small limits, local ownership, one topic named `orders`.
pub fn fixture() -> Fixture {
    fixture_with(
        GatewayOptions::default()
            .with_max_msg_size(16)
            .with_max_body_size(64),
        RecordingRouter::default(),
    )
}

pub fn binary_body(payloads: &[&[u8]]) -> Vec<u8> {
    let mut raw = (payloads.len() as u32).to_be_bytes().to_vec();
    for p in payloads {
        raw.extend_from_slice(&(p.len() as u32).to_be_bytes());
        raw.extend_from_slice(p);
    }
    raw
}

/// Body whose peer resets the connection after `data`.
pub struct ResetBody {
    data: Vec<u8>,
    pos: usize,
}

impl ResetBody {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
        }
    }
}

impl AsyncRead for ResetBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let rest = &this.data[this.pos..];
        if rest.is_empty() {
            return Poll::Ready(Err(io::ErrorKind::ConnectionReset.into()));
        }
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        this.pos += n;
        Poll::Ready(Ok(n))
    }
}
