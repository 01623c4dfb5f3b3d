//! Gantry Error Types
//!
//! Every failure a request can end in, classified the way callers need to
//! react to it.

use std::io;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::engine::EngineError;

/// Broad failure classes surfaced at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transport policy rejected the request (TLS required)
    Policy,
    /// Missing or invalid argument, unparseable value
    MalformedInput,
    /// A configured size ceiling was exceeded
    Oversize,
    /// Topic or channel does not exist
    NotFound,
    /// The local engine refused the write
    Unavailable,
    /// The owning node refused or could not be reached
    Forward,
    /// Unexpected fault inside this node
    Internal,
}

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// TLS is required but the connection is plain text
    #[error("TLS required (tls port: {tls_port:?})")]
    TlsRequired { tls_port: Option<u16> },

    /// Query string could not be parsed
    #[error("invalid request")]
    InvalidRequest,

    #[error("missing topic argument")]
    MissingArgTopic,

    #[error("invalid topic name")]
    InvalidTopic,

    #[error("invalid topic partition argument")]
    InvalidPartition,

    #[error("missing channel argument")]
    MissingArgChannel,

    #[error("invalid channel name")]
    InvalidChannel,

    /// Option name is unknown or not writable at runtime
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Option value could not be parsed as the option's type
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Option value body was empty or over the read limit
    #[error("option value body empty or too large")]
    ValueBodyRejected,

    #[error("message empty")]
    MsgEmpty,

    /// A single message exceeds the per-message ceiling
    #[error("message too large: {size} bytes (max: {max})")]
    MsgTooBig { size: usize, max: usize },

    /// The whole body exceeds the per-body ceiling
    #[error("body too large (max: {max})")]
    BodyTooBig { max: usize },

    /// Binary batch framing is malformed at the body level
    #[error("bad body: {0}")]
    BadBody(String),

    /// Binary batch framing is malformed at the message level
    #[error("bad message: {0}")]
    BadMessage(String),

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// Local engine rejected the write (shutting down, store failure)
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// Forwarding to the owning node failed
    #[error("forward to {topic}/{partition} failed: {message}")]
    ForwardFailed {
        topic: String,
        partition: u32,
        message: String,
    },

    /// Health check failed; carries the health string
    #[error("unhealthy: {0}")]
    Unhealthy(String),

    /// Unexpected fault (IO error on a body, engine admin failure)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an unavailable error with a message
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Failure class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::TlsRequired { .. } => ErrorClass::Policy,
            Self::InvalidRequest
            | Self::MissingArgTopic
            | Self::InvalidTopic
            | Self::InvalidPartition
            | Self::MissingArgChannel
            | Self::InvalidChannel
            | Self::InvalidOption(_)
            | Self::InvalidValue(_)
            | Self::MsgEmpty => ErrorClass::MalformedInput,
            Self::ValueBodyRejected
            | Self::MsgTooBig { .. }
            | Self::BodyTooBig { .. }
            | Self::BadBody(_)
            | Self::BadMessage(_) => ErrorClass::Oversize,
            Self::TopicNotFound(_) | Self::ChannelNotFound(_) => ErrorClass::NotFound,
            Self::Unavailable(_) => ErrorClass::Unavailable,
            Self::ForwardFailed { .. } => ErrorClass::Forward,
            Self::Unhealthy(_) | Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// HTTP-style status class for this error.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::TlsRequired { .. } => 403,
            Self::ValueBodyRejected
            | Self::MsgTooBig { .. }
            | Self::BodyTooBig { .. }
            | Self::BadBody(_)
            | Self::BadMessage(_) => 413,
            Self::TopicNotFound(_) | Self::ChannelNotFound(_) => 404,
            Self::Unavailable(_) => 503,
            Self::ForwardFailed { .. } | Self::Unhealthy(_) | Self::Internal(_) => 500,
            _ => 400,
        }
    }

    /// Response message for the caller.
    ///
    /// Internal faults only ever produce `INTERNAL_ERROR`; forward failures
    /// carry the remote node's message.
    #[must_use]
    pub fn code(&self) -> String {
        let code = match self {
            Self::TlsRequired { .. } => "TLS_REQUIRED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::MissingArgTopic => "MISSING_ARG_TOPIC",
            Self::InvalidTopic => "INVALID_TOPIC",
            Self::InvalidPartition => "INVALID_ARG_TOPIC_PARTITION",
            Self::MissingArgChannel => "MISSING_ARG_CHANNEL",
            Self::InvalidChannel => "INVALID_CHANNEL",
            Self::InvalidOption(_) => "INVALID_OPTION",
            Self::InvalidValue(_) | Self::ValueBodyRejected => "INVALID_VALUE",
            Self::MsgEmpty => "MSG_EMPTY",
            Self::MsgTooBig { .. } => "MSG_TOO_BIG",
            Self::BodyTooBig { .. } => "BODY_TOO_BIG",
            Self::BadBody(_) => "BAD_BODY",
            Self::BadMessage(_) => "BAD_MESSAGE",
            Self::TopicNotFound(_) => "TOPIC_NOT_FOUND",
            Self::ChannelNotFound(_) => "CHANNEL_NOT_FOUND",
            Self::Unavailable(_) => "EXITING",
            Self::ForwardFailed { message, .. } => return message.clone(),
            Self::Unhealthy(health) => return health.clone(),
            Self::Internal(_) => "INTERNAL_ERROR",
        };
        code.to_string()
    }

    /// Only engine unavailability is worth a retry by the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<DecodeError> for GatewayError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::MsgEmpty => Self::MsgEmpty,
            DecodeError::MsgTooBig { size, max } => Self::MsgTooBig { size, max },
            DecodeError::BodyTooBig { max } => Self::BodyTooBig { max },
            DecodeError::BadBody(msg) => Self::BadBody(msg),
            DecodeError::BadMessage(msg) => Self::BadMessage(msg),
            DecodeError::Io(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<EngineError> for GatewayError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::TopicNotFound(name) | EngineError::PartitionNotFound { topic: name, .. } => {
                Self::TopicNotFound(name)
            }
            EngineError::ChannelNotFound(name) => Self::ChannelNotFound(name),
            EngineError::Exiting => Self::Unavailable("engine exiting".to_string()),
            EngineError::Store(msg) => Self::Internal(msg),
        }
    }
}

impl From<io::Error> for GatewayError {
    fn from(err: io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
