use crate::codec::CodecError;
use crate::status::RpcStatus;
use crate::transport::TransportError;
use crate::wire::ProtocolError;
use http::header::{InvalidHeaderName, InvalidHeaderValue};

/// Everything a call reports back to its caller, in order.
///
/// A call produces zero or more [`CallEvent::Message`] events followed by exactly one terminal
/// event, either [`CallEvent::Status`] or [`CallEvent::Failed`]. Nothing is delivered after the
/// terminal event.
#[derive(Debug)]
pub enum CallEvent<M> {
    /// A decoded response message.
    Message(M),
    /// The server's final status. It may be OK.
    Status(RpcStatus),
    /// The call failed before a status could be resolved.
    Failed(CallError),
}

/// Failures that prevent a call from resolving a gRPC status.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("Transport failure: '{0}'")]
    Transport(#[from] TransportError),
    #[error("Protocol error: '{0}'")]
    Protocol(#[from] ProtocolError),
    #[error("Failed to encode request message: '{0}'")]
    Encode(#[source] CodecError),
    #[error("Failed to decode response message: '{0}'")]
    Decode(#[source] CodecError),
    #[error("Invalid metadata (header) key '{key}': '{source}'")]
    InvalidMetadataKey {
        key: String,
        source: InvalidHeaderName,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{source}'")]
    InvalidMetadataValue {
        key: String,
        source: InvalidHeaderValue,
    },
    #[error("The call completed with an OK status but without a response message")]
    MissingMessage,
    #[error("{0} calls are not supported by the gRPC-Web client")]
    Unimplemented(&'static str),
}
