//! # RPC Status Resolution
//!
//! gRPC-Web cannot rely on HTTP trailers, so the final status of a call arrives in one of two
//! places:
//!
//! * the **response headers**, for "trailers-only" responses that carry no body, or
//! * the **trailer frame**, an HTTP/1 style header block (`name: value` lines separated by
//!   `\r\n`) framed like a message at the end of the body.
//!
//! This module extracts an [`RpcStatus`] from either source.
use crate::wire::ProtocolError;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use tonic::Code;

pub const GRPC_STATUS: &str = "grpc-status";
pub const GRPC_MESSAGE: &str = "grpc-message";

/// The final outcome of an RPC, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcStatus {
    /// The numeric gRPC status code. `0` means success.
    pub code: i32,
    pub message: String,
}

impl RpcStatus {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(0, "")
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// The code as a well-known gRPC [`Code`]. Unknown values map to [`Code::Unknown`].
    pub fn code(&self) -> Code {
        Code::from_i32(self.code)
    }

    /// Reads a status from the initial response headers.
    ///
    /// A status is only considered present when both `grpc-status` and `grpc-message` are set.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, ProtocolError> {
        match (headers.get(GRPC_STATUS), headers.get(GRPC_MESSAGE)) {
            (Some(code), Some(message)) => Ok(Some(Self {
                code: parse_code(code)?,
                message: header_text(message),
            })),
            _ => Ok(None),
        }
    }

    /// Reads a status from a parsed trailer block.
    ///
    /// A missing `grpc-status` means OK and a missing `grpc-message` means an empty message.
    pub fn from_trailers(trailers: &HeaderMap) -> Result<Self, ProtocolError> {
        let code = match trailers.get(GRPC_STATUS) {
            Some(value) => parse_code(value)?,
            None => 0,
        };
        let message = trailers
            .get(GRPC_MESSAGE)
            .map(header_text)
            .unwrap_or_default();

        Ok(Self { code, message })
    }
}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gRPC status {} ({:?}): '{}'",
            self.code,
            self.code(),
            self.message
        )
    }
}

impl std::error::Error for RpcStatus {}

impl From<RpcStatus> for tonic::Status {
    fn from(status: RpcStatus) -> Self {
        tonic::Status::new(status.code(), status.message)
    }
}

/// Parses the payload of a trailer frame into a header map.
///
/// Each byte is read as one 8-bit character. Empty lines are skipped; any other line must have
/// the form `name: value`. Names are case-insensitive and stored lowercased.
pub fn parse_trailer_block(block: &[u8]) -> Result<HeaderMap, ProtocolError> {
    let text: String = block.iter().map(|&b| b as char).collect();
    let mut trailers = HeaderMap::new();

    for line in text.split("\r\n") {
        if line.trim().is_empty() {
            continue;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedTrailer(line.to_string()))?;

        let name = HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
            .map_err(|_| ProtocolError::MalformedTrailer(line.to_string()))?;
        let value: Vec<u8> = value.trim().chars().map(|c| c as u8).collect();
        let value = HeaderValue::from_bytes(&value)
            .map_err(|_| ProtocolError::MalformedTrailer(line.to_string()))?;

        trailers.append(name, value);
    }

    Ok(trailers)
}

fn parse_code(value: &HeaderValue) -> Result<i32, ProtocolError> {
    let text = header_text(value);
    text.trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidStatus(text))
}

fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}
