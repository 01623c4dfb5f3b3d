//! Operation responses.
//!
//! Errors render as `{"message": <code>}` with the error's status class;
//! a TLS rejection also carries the port to redirect to.

use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{debug, error};

use gantry_core::error::{ErrorClass, GatewayError};

/// Response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Text(String),
    Json(Value),
}

impl Body {
    /// Wire bytes of the payload.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Empty => Bytes::new(),
            Self::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            Self::Json(value) => Bytes::from(value.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Status class plus payload for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Body,
}

impl Response {
    /// Success with no payload.
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: Body::Empty,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: Body::Text(text.into()),
        }
    }

    pub fn json(value: Value) -> Self {
        Self {
            status: 200,
            body: Body::Json(value),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Collapse an operation result into a response.
    pub fn from_result(res: gantry_core::error::Result<Self>) -> Self {
        res.unwrap_or_else(Self::from)
    }
}

impl From<GatewayError> for Response {
    fn from(err: GatewayError) -> Self {
        match err.class() {
            ErrorClass::Internal => error!("[GATEWAY] {}", err),
            _ => debug!("[GATEWAY] Request rejected: {}", err),
        }

        let body = match &err {
            GatewayError::TlsRequired {
                tls_port: Some(port),
            } => json!({ "message": err.code(), "https_port": port }),
            _ => json!({ "message": err.code() }),
        };
        Self {
            status: err.status(),
            body: Body::Json(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_hides_detail() {
        let resp = Response::from(GatewayError::internal("disk on fire"));
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, Body::Json(json!({ "message": "INTERNAL_ERROR" })));
    }

    #[test]
    fn test_tls_redirect_port() {
        let resp = Response::from(GatewayError::TlsRequired {
            tls_port: Some(4152),
        });
        assert_eq!(resp.status, 403);
        assert_eq!(resp.body.as_json().unwrap()["https_port"], 4152);
    }

    #[test]
    fn test_from_result() {
        assert!(Response::from_result(Ok(Response::text("OK"))).is_success());
        let resp = Response::from_result(Err(GatewayError::MsgEmpty));
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body.to_bytes(), Bytes::from_static(br#"{"message":"MSG_EMPTY"}"#));
    }
}
