//! # Message Codecs
//!
//! The gRPC-Web layer only moves opaque bytes. A [`Codec`] turns the caller's request into those
//! bytes and each response frame back into a message.
//!
//! Two implementations are provided:
//!
//! * [`ProstCodec`]: for types generated by `prost`.
//! * [`JsonCodec`]: transcodes `serde_json::Value` to Protobuf (and back) at runtime using
//!   `prost_reflect` descriptors, so no generated code is needed. This is what the CLI uses.
use bytes::Bytes;
use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor, MethodDescriptor};
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON structure does not match Protobuf schema: '{0}'")]
    SchemaMismatch(#[source] serde_json::Error),
    #[error("Failed to decode Protobuf bytes: '{0}'")]
    Protobuf(#[from] prost::DecodeError),
    #[error("Failed to map response to JSON: '{0}'")]
    Json(#[source] serde_json::Error),
}

/// Serializes requests and deserializes response messages.
pub trait Codec {
    type Encode;
    type Decode;

    fn encode(&mut self, item: Self::Encode) -> Result<Bytes, CodecError>;

    fn decode(&mut self, buf: Bytes) -> Result<Self::Decode, CodecError>;
}

/// A codec for `prost` generated messages.
pub struct ProstCodec<E, D> {
    _marker: PhantomData<fn(E) -> D>,
}

impl<E, D> ProstCodec<E, D> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E, D> Default for ProstCodec<E, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, D> fmt::Debug for ProstCodec<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProstCodec").finish()
    }
}

impl<E, D> Codec for ProstCodec<E, D>
where
    E: Message,
    D: Message + Default,
{
    type Encode = E;
    type Decode = D;

    fn encode(&mut self, item: E) -> Result<Bytes, CodecError> {
        Ok(Bytes::from(item.encode_to_vec()))
    }

    fn decode(&mut self, buf: Bytes) -> Result<D, CodecError> {
        Ok(D::decode(buf)?)
    }
}

/// A codec that bridges `serde_json::Value` and Protobuf binary format.
///
/// It holds the descriptors (schemas) for both the request and the response messages,
/// allowing it to perform dynamic serialization.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    /// Schema for the input message.
    req_desc: MessageDescriptor,
    /// Schema for the output message.
    res_desc: MessageDescriptor,
}

impl JsonCodec {
    pub fn new(req_desc: MessageDescriptor, res_desc: MessageDescriptor) -> Self {
        Self { req_desc, res_desc }
    }

    /// Builds a codec for the input and output types of `method`.
    pub fn for_method(method: &MethodDescriptor) -> Self {
        Self::new(method.input(), method.output())
    }
}

impl Codec for JsonCodec {
    type Encode = serde_json::Value;
    type Decode = serde_json::Value;

    fn encode(&mut self, item: serde_json::Value) -> Result<Bytes, CodecError> {
        // serde_json::Value implements IntoDeserializer, so it can be passed directly.
        let msg = DynamicMessage::deserialize(self.req_desc.clone(), item)
            .map_err(CodecError::SchemaMismatch)?;

        Ok(Bytes::from(msg.encode_to_vec()))
    }

    fn decode(&mut self, buf: Bytes) -> Result<serde_json::Value, CodecError> {
        let mut msg = DynamicMessage::new(self.res_desc.clone());
        msg.merge(buf)?;

        serde_json::to_value(&msg).map_err(CodecError::Json)
    }
}
