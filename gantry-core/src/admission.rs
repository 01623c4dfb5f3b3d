//! Admission checks performed before any body byte is read.
//!
//! The declared-length checks are a fast reject only. Clients may omit or
//! misreport the length, so the decoders enforce the same ceilings again
//! while reading.

use crate::decode::SizeLimits;
use crate::error::{GatewayError, Result};

/// Transport policy for a gateway listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdmissionPolicy {
    /// Reject plain-text connections
    pub tls_required: bool,
    /// Port clients should be redirected to for TLS
    pub tls_port: Option<u16>,
}

/// Which publish endpoint a length check is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishEndpoint {
    Single,
    Batch,
}

/// Reject a plain-text request when policy requires TLS.
pub fn check_tls(policy: &AdmissionPolicy, secure: bool) -> Result<()> {
    if policy.tls_required && !secure {
        return Err(GatewayError::TlsRequired {
            tls_port: policy.tls_port,
        });
    }
    Ok(())
}

/// Reject a request whose declared length already breaks the ceiling.
///
/// The single-message endpoint also requires a non-zero declared length.
pub fn check_declared_length(
    endpoint: PublishEndpoint,
    declared: Option<u64>,
    limits: &SizeLimits,
) -> Result<()> {
    match endpoint {
        PublishEndpoint::Single => match declared {
            Some(len) if len > limits.max_msg_size as u64 => Err(GatewayError::MsgTooBig {
                size: usize::try_from(len).unwrap_or(usize::MAX),
                max: limits.max_msg_size,
            }),
            None | Some(0) => Err(GatewayError::MsgEmpty),
            Some(_) => Ok(()),
        },
        PublishEndpoint::Batch => match declared {
            Some(len) if len > limits.max_body_size as u64 => Err(GatewayError::BodyTooBig {
                max: limits.max_body_size,
            }),
            _ => Ok(()),
        },
    }
}
