//! Request body decoding.
//!
//! Three decoders share one contract: they produce messages in submission
//! order or fail with a classified [`DecodeError`]. A failed decode never
//! yields a partial batch.
//!
//! - `read_single`: the whole body is one message.
//! - `read_text_batch`: newline-delimited messages, blank lines skipped.
//! - `read_binary_batch`: `[count:u32be] ([len:u32be] [payload])*`.
//!
//! Every read is bounded by [`SizeLimits`]; declared content lengths are
//! never trusted for allocation or for the size verdict.

use bytes::Bytes;
use futures::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use std::io;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::message::{Batch, Message};
use crate::pool::BufferPool;

/// Largest chunk read from the body per call.
const READ_CHUNK: usize = 16 * 1024;

/// Capacity of the buffered reader used for text batches.
const TEXT_READER_CAPACITY: usize = 8 * 1024;

/// Size of a binary length prefix.
const LEN_PREFIX: usize = 4;

/// Upper bound on up-front batch allocation, whatever count the client declares.
const MAX_PREALLOC_MESSAGES: usize = 1024;

/// Decode failures
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("message empty")]
    MsgEmpty,

    #[error("message too large: {size} bytes (max: {max})")]
    MsgTooBig { size: usize, max: usize },

    #[error("body too large (max: {max})")]
    BodyTooBig { max: usize },

    #[error("bad body: {0}")]
    BadBody(String),

    #[error("bad message: {0}")]
    BadMessage(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Size ceilings applied to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    /// Largest single message payload
    pub max_msg_size: usize,
    /// Largest request body
    pub max_body_size: usize,
}

impl SizeLimits {
    #[must_use]
    pub const fn new(max_msg_size: usize, max_body_size: usize) -> Self {
        Self {
            max_msg_size,
            max_body_size,
        }
    }
}

/// Wire sub-format of a batch body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    /// Newline-delimited payloads
    Text,
    /// Count-prefixed, length-prefixed payloads
    Binary,
}

/// Decode a batch body in the given sub-format.
pub async fn read_batch<R>(
    format: BatchFormat,
    body: &mut R,
    limits: &SizeLimits,
    pool: &BufferPool,
) -> Result<Batch>
where
    R: AsyncRead + Unpin + ?Sized,
{
    match format {
        BatchFormat::Text => read_text_batch(body, limits, pool).await,
        BatchFormat::Binary => read_binary_batch(body, limits, pool).await,
    }
}

/// Read the whole body as one message.
///
/// At most `max_msg_size + 1` bytes are read: reaching that count means the
/// body is over the limit, whatever length was declared.
pub async fn read_single<R>(
    body: &mut R,
    declared_len: Option<u64>,
    limits: &SizeLimits,
    pool: &BufferPool,
) -> Result<Message>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let read_max = limits.max_msg_size.saturating_add(1);
    let hint = declared_len
        .map_or(READ_CHUNK, |n| usize::try_from(n).unwrap_or(usize::MAX))
        .min(read_max);
    let mut buf = pool.lease(hint);

    match read_limited(body, &mut buf, read_max).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            warn!(
                "[DECODE] Body ended early: {} (declared {:?}, read {})",
                e,
                declared_len,
                buf.len()
            );
        }
        Err(e) => {
            debug!("[DECODE] Body read failed: {}", e);
            return Err(DecodeError::Io(e));
        }
    }

    if buf.len() >= read_max {
        return Err(DecodeError::MsgTooBig {
            size: buf.len(),
            max: limits.max_msg_size,
        });
    }
    if buf.is_empty() {
        return Err(DecodeError::MsgEmpty);
    }
    if let Some(declared) = declared_len {
        if (buf.len() as u64) < declared {
            warn!(
                "[DECODE] Short body: declared {} bytes, read {}",
                declared,
                buf.len()
            );
        }
    }

    Ok(Message::new(Bytes::copy_from_slice(&buf)))
}

/// Read newline-delimited messages.
///
/// Blank lines are dropped, so a body of only newlines is an empty, valid
/// batch.
pub async fn read_text_batch<R>(
    body: &mut R,
    limits: &SizeLimits,
    pool: &BufferPool,
) -> Result<Batch>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let read_max = (limits.max_body_size as u64).saturating_add(1);
    let mut reader = BufReader::with_capacity(TEXT_READER_CAPACITY, (&mut *body).take(read_max));
    let mut line = pool.lease(TEXT_READER_CAPACITY);
    let mut batch = Vec::new();
    let mut total: u64 = 0;

    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).await?;
        let at_eof = line.last() != Some(&b'\n');

        total += n as u64;
        if total == read_max {
            return Err(DecodeError::BodyTooBig {
                max: limits.max_body_size,
            });
        }

        if !at_eof {
            line.pop();
        }

        if !line.is_empty() {
            if line.len() > limits.max_msg_size {
                return Err(DecodeError::MsgTooBig {
                    size: line.len(),
                    max: limits.max_msg_size,
                });
            }
            batch.push(Message::new(Bytes::copy_from_slice(&line)));
        }

        if at_eof {
            break;
        }
    }

    trace!("[DECODE] Text batch: {} messages, {} bytes", batch.len(), total);
    Ok(batch)
}

/// Read a count-prefixed binary batch.
///
/// Each length is checked against the ceilings before its payload is read,
/// so an oversized payload is never buffered.
pub async fn read_binary_batch<R>(
    body: &mut R,
    limits: &SizeLimits,
    pool: &BufferPool,
) -> Result<Batch>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let count = read_len(body)
        .await
        .map_err(|e| DecodeError::BadBody(format!("failed to read message count: {e}")))?;
    if count == 0 || count > i32::MAX as u32 {
        return Err(DecodeError::BadBody(format!("invalid message count {count}")));
    }
    let count = count as usize;

    let mut consumed = LEN_PREFIX;
    let mut scratch = pool.lease(0);
    let mut batch = Vec::with_capacity(count.min(MAX_PREALLOC_MESSAGES));

    for i in 0..count {
        let size = read_len(body).await.map_err(|e| {
            DecodeError::BadMessage(format!("failed to read message({i}) body size: {e}"))
        })? as usize;
        consumed += LEN_PREFIX;

        if size == 0 {
            return Err(DecodeError::BadMessage(format!(
                "invalid message({i}) body size {size}"
            )));
        }
        if size > limits.max_msg_size {
            return Err(DecodeError::MsgTooBig {
                size,
                max: limits.max_msg_size,
            });
        }
        consumed = consumed.saturating_add(size);
        if consumed > limits.max_body_size {
            return Err(DecodeError::BodyTooBig {
                max: limits.max_body_size,
            });
        }

        scratch.clear();
        scratch.resize(size, 0);
        body.read_exact(&mut scratch).await.map_err(|e| {
            DecodeError::BadMessage(format!("failed to read message({i}) body: {e}"))
        })?;
        batch.push(Message::new(Bytes::copy_from_slice(&scratch)));
    }

    trace!("[DECODE] Binary batch: {} messages, {} bytes", batch.len(), consumed);
    Ok(batch)
}

/// Read into `buf` until end of stream or until it holds `limit` bytes.
///
/// On error, `buf` keeps every byte read before the failure.
pub async fn read_limited<R>(body: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    while buf.len() < limit {
        let start = buf.len();
        let want = (limit - start).min(READ_CHUNK);
        buf.resize(start + want, 0);
        match body.read(&mut buf[start..]).await {
            Ok(0) => {
                buf.truncate(start);
                return Ok(());
            }
            Ok(n) => buf.truncate(start + n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => buf.truncate(start),
            Err(e) => {
                buf.truncate(start);
                return Err(e);
            }
        }
    }
    Ok(())
}

async fn read_len<R>(body: &mut R) -> io::Result<u32>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut tmp = [0u8; LEN_PREFIX];
    body.read_exact(&mut tmp).await?;
    Ok(u32::from_be_bytes(tmp))
}
