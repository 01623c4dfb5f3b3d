//! Messages and write units.
//!
//! A `Message` is what the gateway hands to the queue engine: an opaque
//! payload plus a priority/sequence attribute. Identity assignment belongs
//! to the engine, so the gateway always submits sequence 0.

use bytes::Bytes;

/// An immutable message payload.
///
/// # Examples
///
/// ```
/// use gantry_core::message::Message;
///
/// let msg = Message::new(&b"hello"[..]);
/// assert_eq!(msg.body(), &b"hello"[..]);
/// assert_eq!(msg.sequence(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sequence: u64,
    body: Bytes,
}

impl Message {
    /// Create a message with the default sequence.
    #[must_use]
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self::with_sequence(0, body)
    }

    #[must_use]
    pub fn with_sequence(sequence: u64, body: impl Into<Bytes>) -> Self {
        Self {
            sequence,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Consume the message and return its payload.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// An ordered group of messages decoded from one request body.
pub type Batch = Vec<Message>;

/// What one request commits or forwards, always as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteUnit {
    Single(Message),
    Batch(Batch),
}

impl WriteUnit {
    /// Number of messages carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(batch) => batch.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total payload bytes carried.
    #[must_use]
    pub fn payload_bytes(&self) -> usize {
        match self {
            Self::Single(msg) => msg.len(),
            Self::Batch(batch) => batch.iter().map(Message::len).sum(),
        }
    }
}

impl From<Message> for WriteUnit {
    fn from(msg: Message) -> Self {
        Self::Single(msg)
    }
}

impl From<Batch> for WriteUnit {
    fn from(batch: Batch) -> Self {
        Self::Batch(batch)
    }
}
