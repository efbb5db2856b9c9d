//! # Wire Encoding Selection
//!
//! gRPC-Web can be spoken over transports that only handle text. In [`Format::Text`] mode the
//! framed bytes are base64 encoded in both directions; in [`Format::Binary`] mode they are sent
//! as-is.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

pub const TEXT_CONTENT_TYPE: &str = "application/grpc-web-text";
pub const BINARY_CONTENT_TYPE: &str = "application/grpc-web+proto";

/// Errors raised while building a client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unknown wire format '{0}', expected 'text' or 'binary'")]
    UnknownFormat(String),
    #[error("Invalid user agent '{0}', it must be a valid header value")]
    InvalidUserAgent(String),
}

/// How request and response bodies are carried over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Base64 encoded bodies, `application/grpc-web-text`.
    #[default]
    Text,
    /// Raw bodies, `application/grpc-web+proto`.
    Binary,
}

/// What the transport should expect back from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Base64 text.
    Text,
    /// A raw byte buffer.
    Bytes,
}

/// An encoded request body together with the headers that describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBody {
    pub content_type: &'static str,
    pub body: Bytes,
    pub response_kind: ResponseKind,
}

impl Format {
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Text => TEXT_CONTENT_TYPE,
            Format::Binary => BINARY_CONTENT_TYPE,
        }
    }

    pub fn response_kind(&self) -> ResponseKind {
        match self {
            Format::Text => ResponseKind::Text,
            Format::Binary => ResponseKind::Bytes,
        }
    }

    /// Encodes already framed bytes for transmission.
    pub fn encode_body(&self, framed: Bytes) -> WireBody {
        let body = match self {
            Format::Text => Bytes::from(STANDARD.encode(&framed)),
            Format::Binary => framed,
        };

        WireBody {
            content_type: self.content_type(),
            body,
            response_kind: self.response_kind(),
        }
    }
}

impl FromStr for Format {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "binary" => Ok(Format::Binary),
            other => Err(ConfigurationError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Binary => write!(f, "binary"),
        }
    }
}
