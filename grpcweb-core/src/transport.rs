//! # Transport
//!
//! The protocol logic never opens a connection itself. Every call goes through a [`Requestor`]:
//! a capability that issues exactly one HTTP request and completes exactly once, either with the
//! response or with a [`TransportError`].
//!
//! [`HttpRequestor`] is the default implementation, built on `reqwest`. Tests and embedders can
//! provide their own.
mod http_client;

pub use http_client::HttpRequestor;

use crate::wire::ResponseKind;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{HeaderMap, Method, StatusCode};

/// A fully encoded gRPC-Web request, ready to be sent.
#[derive(Debug, Clone)]
pub struct WebRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// How the body of the response is expected to be encoded.
    pub response_kind: ResponseKind,
}

/// The raw HTTP response to a [`WebRequest`].
#[derive(Debug, Clone)]
pub struct WebResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The request failed before any gRPC response existed.
///
/// It carries no status code, only the transport's description of the failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Issues a single HTTP request.
///
/// Implementations must resolve the returned future exactly once and must not retry.
pub trait Requestor: Send + Sync {
    fn issue(&self, request: WebRequest) -> BoxFuture<'_, Result<WebResponse, TransportError>>;
}
