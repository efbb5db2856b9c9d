//! Drives the caller's callback from response headers and frames.
//!
//! ```text
//! AwaitingResponse -> (headers carry a status) --------------------------> Terminal
//!                  -> Decoding -> Message* -> (trailer | failure | end) --> Terminal
//! ```
use super::{CallError, CallEvent};
use crate::codec::CodecError;
use crate::status::{GRPC_STATUS, RpcStatus, parse_trailer_block};
use crate::wire::{Frame, ProtocolError};
use bytes::Bytes;
use http::HeaderMap;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    AwaitingResponse,
    Decoding,
    Terminal,
}

pub(crate) struct StatusResolver<M, D, C> {
    state: CallState,
    /// A `grpc-status` header sent without `grpc-message`, used if the body carries no trailer.
    header_status: Option<Result<RpcStatus, ProtocolError>>,
    deserialize: D,
    callback: C,
    _message: PhantomData<fn() -> M>,
}

impl<M, D, C> StatusResolver<M, D, C>
where
    D: FnMut(Bytes) -> Result<M, CodecError>,
    C: FnMut(CallEvent<M>),
{
    pub(crate) fn new(deserialize: D, callback: C) -> Self {
        Self {
            state: CallState::AwaitingResponse,
            header_status: None,
            deserialize,
            callback,
            _message: PhantomData,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.state == CallState::Terminal
    }

    /// Inspects the initial response headers.
    ///
    /// A status carried by the headers ends the call right away, whatever the body holds.
    /// A lone `grpc-status` header does not, but it is kept for [`StatusResolver::finish`].
    pub(crate) fn on_headers(&mut self, headers: &HeaderMap) {
        if self.state != CallState::AwaitingResponse {
            return;
        }

        match RpcStatus::from_headers(headers) {
            Ok(Some(status)) => {
                tracing::debug!(code = status.code, "status resolved from response headers");
                self.terminate(CallEvent::Status(status));
            }
            Ok(None) => {
                if headers.contains_key(GRPC_STATUS) {
                    self.header_status = Some(RpcStatus::from_trailers(headers));
                }
                self.state = CallState::Decoding;
            }
            Err(e) => self.fail(e.into()),
        }
    }

    pub(crate) fn on_frame(&mut self, frame: Frame) {
        if self.is_terminal() {
            tracing::warn!(?frame, "dropping frame received after the call terminated");
            return;
        }
        self.state = CallState::Decoding;

        match frame {
            Frame::Data(bytes) => match (self.deserialize)(bytes) {
                Ok(message) => (self.callback)(CallEvent::Message(message)),
                Err(e) => self.fail(CallError::Decode(e)),
            },
            Frame::Trailer(block) if block.is_empty() => {
                tracing::debug!("skipping empty trailer frame");
            }
            Frame::Trailer(block) => {
                match parse_trailer_block(&block).and_then(|t| RpcStatus::from_trailers(&t)) {
                    Ok(status) => {
                        tracing::debug!(code = status.code, "status resolved from trailer frame");
                        self.terminate(CallEvent::Status(status));
                    }
                    Err(e) => self.fail(e.into()),
                }
            }
        }
    }

    pub(crate) fn fail(&mut self, error: CallError) {
        self.terminate(CallEvent::Failed(error));
    }

    /// Ends the call.
    ///
    /// Without a trailer the call falls back to a `grpc-status` response header, and fails with
    /// [`ProtocolError::MissingStatus`] when there is none.
    pub(crate) fn finish(mut self) {
        if self.is_terminal() {
            return;
        }

        match self.header_status.take() {
            Some(Ok(status)) => {
                tracing::debug!(code = status.code, "status resolved from a grpc-status header");
                self.terminate(CallEvent::Status(status));
            }
            Some(Err(e)) => self.fail(e.into()),
            None => self.fail(ProtocolError::MissingStatus.into()),
        }
    }

    fn terminate(&mut self, event: CallEvent<M>) {
        if self.is_terminal() {
            tracing::warn!("ignoring a second terminal event for a completed call");
            return;
        }

        self.state = CallState::Terminal;
        (self.callback)(event);
    }
}
