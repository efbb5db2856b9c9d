//! # gRPC-Web Client
//!
//! This module implements the call pipeline:
//!
//! ```text
//! message -> frame encoder -> wire encoding -> Requestor -> frame decoder -> status resolver -> callback
//! ```
//!
//! The [`GrpcWebClient`] holds an immutable [`ClientConfig`] behind an `Arc`, so it is cheap to
//! clone and safe to use for concurrent calls. Each call owns its own decoding state.
//!
//! ## Example
//!
//! ```rust,no_run
//! use grpcweb_core::{ClientConfig, Format, GrpcWebClient, HttpRequestor};
//! use grpcweb_core::codec::JsonCodec;
//!
//! # async fn run(codec: JsonCodec) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder(HttpRequestor::new())
//!     .format(Format::Binary)
//!     .build()?;
//! let client = GrpcWebClient::new(config);
//!
//! let body = serde_json::json!({ "message": "hello" });
//! match client
//!     .call("http://localhost:8080/echo.EchoService/UnaryEcho", body, codec, vec![])
//!     .await?
//! {
//!     Ok(value) => println!("{value}"),
//!     Err(status) => eprintln!("{status}"),
//! }
//! # Ok(())
//! # }
//! ```
mod resolver;
mod types;

pub use types::*;

use crate::codec::{Codec, CodecError};
use crate::status::RpcStatus;
use crate::transport::{Requestor, TransportError, WebRequest, WebResponse};
use crate::wire::{self, ConfigurationError, Format, FrameStreamDecoder, ProtocolError};
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use resolver::StatusResolver;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// The `X-User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "grpc-web-javascript/0.1";

const X_GRPC_WEB: &str = "x-grpc-web";
const X_USER_AGENT: &str = "x-user-agent";

/// Client-wide settings. Set once at construction and never mutated.
pub struct ClientConfig {
    format: Format,
    requestor: Arc<dyn Requestor>,
    user_agent: HeaderValue,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn builder(requestor: impl Requestor + 'static) -> ClientConfigBuilder {
        ClientConfigBuilder {
            format: Format::default(),
            requestor: Arc::new(requestor),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("format", &self.format)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

pub struct ClientConfigBuilder {
    format: Format,
    requestor: Arc<dyn Requestor>,
    user_agent: String,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets the value of the `X-User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Bounds how long the transport may take to answer a call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigurationError> {
        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|_| ConfigurationError::InvalidUserAgent(self.user_agent.clone()))?;

        Ok(ClientConfig {
            format: self.format,
            requestor: self.requestor,
            user_agent,
            timeout: self.timeout,
        })
    }
}

/// A gRPC-Web client issuing unary calls through the configured [`Requestor`].
#[derive(Debug, Clone)]
pub struct GrpcWebClient {
    config: Arc<ClientConfig>,
}

impl GrpcWebClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a unary call, reporting every outcome through `callback`.
    ///
    /// `request` is the already serialized request message and `deserialize` is applied to each
    /// data frame of the response. The callback receives zero or more [`CallEvent::Message`]
    /// events followed by exactly one terminal event. Failures are never returned: they are
    /// delivered as [`CallEvent::Failed`].
    ///
    /// # Arguments
    ///
    /// * `url` - The full method URL (e.g., `http://localhost:8080/pkg.Service/Method`).
    /// * `metadata` - Extra headers to attach to the request.
    pub async fn rpc_call<M, D, C>(
        &self,
        url: &str,
        request: Bytes,
        metadata: Vec<(String, String)>,
        deserialize: D,
        callback: C,
    ) where
        D: FnMut(Bytes) -> Result<M, CodecError>,
        C: FnMut(CallEvent<M>),
    {
        let mut resolver = StatusResolver::new(deserialize, callback);

        let request = match self.build_request(url, request, metadata) {
            Ok(request) => request,
            Err(e) => return resolver.fail(e),
        };

        let response = match self.issue(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%url, error = %e, "transport failure");
                return resolver.fail(e.into());
            }
        };

        resolver.on_headers(&response.headers);
        if resolver.is_terminal() {
            if !response.body.is_empty() {
                tracing::warn!(
                    %url,
                    body_len = response.body.len(),
                    "ignoring response body, status was already set by the headers"
                );
            }
            return;
        }

        if let Err(e) = decode_body(self.config.format, &response.body, &mut resolver) {
            resolver.fail(e.into());
        }
        resolver.finish();
    }

    /// Performs a unary call and waits for its single response message.
    ///
    /// # Returns
    ///
    /// * `Ok(Ok(M))` - Successful RPC execution.
    /// * `Ok(Err(RpcStatus))` - RPC executed, but server returned a non-OK status.
    /// * `Err(CallError)` - The call failed before a status could be resolved.
    pub async fn unary<M, D>(
        &self,
        url: &str,
        request: Bytes,
        metadata: Vec<(String, String)>,
        deserialize: D,
    ) -> Result<Result<M, RpcStatus>, CallError>
    where
        D: FnMut(Bytes) -> Result<M, CodecError>,
    {
        let mut message = None;
        let mut outcome = None;

        self.rpc_call(url, request, metadata, deserialize, |event| match event {
            CallEvent::Message(m) => {
                message.get_or_insert(m);
            }
            CallEvent::Status(status) => outcome = Some(Ok(status)),
            CallEvent::Failed(e) => outcome = Some(Err(e)),
        })
        .await;

        match outcome {
            Some(Ok(status)) if status.is_ok() => message.map(Ok).ok_or(CallError::MissingMessage),
            Some(Ok(status)) => Ok(Err(status)),
            Some(Err(e)) => Err(e),
            None => Err(ProtocolError::MissingStatus.into()),
        }
    }

    /// Performs a unary call, serializing `item` and the response with `codec`.
    pub async fn call<C: Codec>(
        &self,
        url: &str,
        item: C::Encode,
        mut codec: C,
        metadata: Vec<(String, String)>,
    ) -> Result<Result<C::Decode, RpcStatus>, CallError> {
        let request = codec.encode(item).map_err(CallError::Encode)?;
        self.unary(url, request, metadata, |bytes| codec.decode(bytes))
            .await
    }

    /// Server streaming is not supported: this always fails with [`CallError::Unimplemented`].
    pub async fn server_streaming(
        &self,
        _url: &str,
        _request: Bytes,
        _metadata: Vec<(String, String)>,
    ) -> Result<(), CallError> {
        Err(CallError::Unimplemented("Server streaming"))
    }

    fn build_request(
        &self,
        url: &str,
        message: Bytes,
        metadata: Vec<(String, String)>,
    ) -> Result<WebRequest, CallError> {
        let wire = self.config.format.encode_body(wire::encode(&message));
        let content_type = HeaderValue::from_static(wire.content_type);

        let mut headers = HeaderMap::new();
        for (k, v) in metadata {
            let key = HeaderName::from_str(&k).map_err(|source| CallError::InvalidMetadataKey {
                key: k.clone(),
                source,
            })?;
            let val = HeaderValue::from_str(&v)
                .map_err(|source| CallError::InvalidMetadataValue { key: k, source })?;
            headers.append(key, val);
        }

        headers.insert(ACCEPT, content_type.clone());
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(X_GRPC_WEB, HeaderValue::from_static("1"));
        headers.insert(X_USER_AGENT, self.config.user_agent.clone());

        Ok(WebRequest {
            method: Method::POST,
            url: url.to_string(),
            headers,
            body: wire.body,
            response_kind: wire.response_kind,
        })
    }

    async fn issue(&self, request: WebRequest) -> Result<WebResponse, TransportError> {
        let call = self.config.requestor.issue(request);

        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| TransportError::new("timeout"))?,
            None => call.await,
        }
    }
}

fn decode_body<M, D, C>(
    format: Format,
    body: &[u8],
    resolver: &mut StatusResolver<M, D, C>,
) -> Result<(), ProtocolError>
where
    D: FnMut(Bytes) -> Result<M, CodecError>,
    C: FnMut(CallEvent<M>),
{
    let mut decoder = FrameStreamDecoder::new(format);

    for frame in decoder.decode(body)? {
        resolver.on_frame(frame);
    }

    decoder.finish()
}
