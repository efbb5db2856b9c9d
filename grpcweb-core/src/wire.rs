//! # gRPC-Web Wire Format
//!
//! This module contains the byte-level building blocks of the protocol:
//!
//! * [`frame`]: the 5-byte length-prefixed framing shared by requests and responses.
//! * [`format`]: the choice between binary and text (base64) transmission.
//! * [`text`]: incremental base64 decoding of text mode response bodies.
//!
//! [`FrameStreamDecoder`] ties them together for the response direction.
pub mod format;
pub mod frame;
pub mod text;

pub use format::{ConfigurationError, Format, ResponseKind, WireBody};
pub use frame::{Frame, FrameParser, encode, split_frames};
pub use text::TextDecoder;

/// Errors raised while decoding a response body that does not follow the gRPC-Web protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unsupported frame flag '{0:#04x}'")]
    UnsupportedFrameFlag(u8),
    #[error("Response body ended in the middle of a frame ({0} bytes left over)")]
    TruncatedFrame(usize),
    #[error("Invalid base64 in text response: '{0}'")]
    InvalidBase64(String),
    #[error("Malformed trailer line '{0}'")]
    MalformedTrailer(String),
    #[error("Invalid grpc-status value '{0}'")]
    InvalidStatus(String),
    #[error("Response ended without a grpc-status")]
    MissingStatus,
}

/// Turns raw response chunks into [`Frame`]s.
///
/// One decoder is built per call, so no parsing state is ever shared between calls.
/// In [`Format::Text`] mode the chunks are base64 decoded before being handed to the
/// frame parser.
#[derive(Debug)]
pub struct FrameStreamDecoder {
    text: Option<TextDecoder>,
    parser: FrameParser,
}

impl FrameStreamDecoder {
    pub fn new(format: Format) -> Self {
        let text = match format {
            Format::Text => Some(TextDecoder::new()),
            Format::Binary => None,
        };

        Self {
            text,
            parser: FrameParser::new(),
        }
    }

    /// Feeds one chunk of the response body, returning the frames it completed.
    ///
    /// An empty result is not an error: the chunk may only have contained part of a frame.
    /// When the chunk holds complete frames followed by invalid input, those frames are
    /// returned and the error surfaces on the next call or in [`FrameStreamDecoder::finish`].
    pub fn decode(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, ProtocolError> {
        match self.text.as_mut() {
            Some(text) => {
                let bytes = text.decode(chunk)?;
                if bytes.is_empty() {
                    return Ok(Vec::new());
                }
                self.parser.push(&bytes)
            }
            None => self.parser.push(chunk),
        }
    }

    /// Signals the end of the body. Fails if a partial frame or base64 group is pending.
    pub fn finish(self) -> Result<(), ProtocolError> {
        if let Some(text) = self.text {
            text.finish()?;
        }
        self.parser.finish()
    }
}
