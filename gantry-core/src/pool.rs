//! Buffer pool for request decoding.
//!
//! Publishers hit the gateway at a sustained rate, so every decode borrows a
//! scratch buffer instead of allocating one. Buffers are leased as RAII
//! guards: the buffer goes back to the pool when the guard drops, on every
//! exit path, including early `?` returns from a failed decode.
//!
//! The free list is a bounded `flume` channel, which gives a lock-free
//! MPMC pool with no ordering guarantee on which buffer a request receives.

use flume::{Receiver, Sender};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of idle buffers kept by the pool.
pub const DEFAULT_POOL_SLOTS: usize = 256;

/// Buffers that grew beyond this capacity are dropped on release instead of
/// being retained, so one huge request does not pin memory forever.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1024 * 1024;

/// A concurrent pool of reusable byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    free_tx: Sender<Vec<u8>>,
    free_rx: Receiver<Vec<u8>>,
    outstanding: AtomicUsize,
    max_retained_capacity: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SLOTS, DEFAULT_MAX_RETAINED_CAPACITY)
    }
}

impl BufferPool {
    #[must_use]
    pub fn new(slots: usize, max_retained_capacity: usize) -> Self {
        let (free_tx, free_rx) = flume::bounded(slots.max(1));
        Self {
            free_tx,
            free_rx,
            outstanding: AtomicUsize::new(0),
            max_retained_capacity,
        }
    }

    /// Lease an empty buffer with at least `size_hint` bytes of capacity.
    pub fn lease(&self, size_hint: usize) -> LeasedBuffer<'_> {
        let mut buf = self.free_rx.try_recv().unwrap_or_default();
        buf.clear();
        buf.reserve(size_hint);
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        LeasedBuffer { pool: self, buf }
    }

    /// Number of buffers currently leased out.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Number of idle buffers ready for reuse.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free_rx.len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        if buf.capacity() > self.max_retained_capacity {
            return;
        }
        buf.clear();
        // Pool full: let the buffer drop.
        let _ = self.free_tx.try_send(buf);
    }
}

/// A buffer on loan from a [`BufferPool`].
///
/// Dereferences to `Vec<u8>`; returned to the pool on drop.
pub struct LeasedBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for LeasedBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for LeasedBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for LeasedBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

impl std::fmt::Debug for LeasedBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeasedBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
