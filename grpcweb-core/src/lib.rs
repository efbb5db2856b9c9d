//! # gRPC-Web Core
//!
//! `grpcweb-core` is the library powering the `grpcweb` CLI. It implements the client side of the
//! gRPC-Web wire protocol: it turns an outbound serialized message into a framed HTTP request body,
//! and turns the HTTP response body back into an ordered sequence of decoded messages followed by
//! a final RPC status.
//!
//! ## Key Components
//!
//! * **[`GrpcWebClient`]:** The main entry point. It encodes the request, issues it through an
//!   injected [`Requestor`], decodes the response frames and resolves the final [`RpcStatus`].
//! * **[`ClientConfig`]:** Immutable configuration (wire [`Format`], transport, user agent, timeout)
//!   shared by every call issued from the same client.
//! * **[`CallEvent`]:** What the caller's callback receives: zero or more messages followed by exactly
//!   one terminal event.
//!
//! ## Building blocks
//!
//! The lower layers are public so they can be reused on their own:
//!
//! * [`wire`]: the length-prefixed frame encoder and parser, the text (base64) decoder and the
//!   wire encoding selector.
//! * [`status`]: status extraction from response headers and trailer frames.
//! * [`transport`]: the [`Requestor`] seam and the default `reqwest` based [`HttpRequestor`].
//! * [`codec`]: caller-side message serialization, for generated `prost` types or dynamic JSON.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost`, `prost-reflect`, and `tonic` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod client;
pub mod codec;
pub mod status;
pub mod transport;
pub mod wire;

pub use client::{CallError, CallEvent, ClientConfig, ClientConfigBuilder, GrpcWebClient};
pub use status::RpcStatus;
pub use transport::{HttpRequestor, Requestor};
pub use wire::Format;

// Re-exports
pub use prost;
pub use prost_reflect;
pub use tonic;
