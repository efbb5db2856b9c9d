//! # Length-Prefixed Frames
//!
//! Every gRPC-Web message travels inside a frame:
//!
//! ```text
//! [flag: 1 byte][length: 4 bytes, big-endian][payload: length bytes]
//! ```
//!
//! A flag of `0x00` marks a data frame holding one serialized message. A flag with the most
//! significant bit set (`0x80`) marks the trailer frame, whose payload is an HTTP/1 style header
//! block carrying the final status of the call.
use super::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the flag byte plus the length prefix.
pub const FRAME_HEADER_LEN: usize = 5;

const DATA_FLAG: u8 = 0x00;
const TRAILER_FLAG: u8 = 0x80;

/// One unit of a decoded gRPC-Web response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A single application message, still serialized.
    Data(Bytes),
    /// The raw trailer header block.
    Trailer(Bytes),
}

/// Wraps a serialized message into a data frame.
///
/// Payloads longer than `u32::MAX` bytes cannot be represented by the length prefix; their
/// length is truncated to the low 32 bits.
pub fn encode(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
    buf.put_u8(DATA_FLAG);
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    buf.freeze()
}

/// Splits a complete response body into frames.
pub fn split_frames(body: &[u8]) -> Result<Vec<Frame>, ProtocolError> {
    let mut parser = FrameParser::new();
    let frames = parser.push(body)?;
    parser.finish()?;
    Ok(frames)
}

/// Incremental frame parser.
///
/// Bytes are buffered until a whole frame is available, so a body may be fed in
/// arbitrary chunks.
///
/// Parsing stops at the first frame with an unknown flag. Frames completed before it are still
/// returned; the error is reported by the next [`FrameParser::push`] or by
/// [`FrameParser::finish`].
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: BytesMut,
    error: Option<ProtocolError>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and drains every complete frame, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, ProtocolError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while self.buffer.len() >= FRAME_HEADER_LEN {
            let flag = self.buffer[0];
            let len = u32::from_be_bytes([
                self.buffer[1],
                self.buffer[2],
                self.buffer[3],
                self.buffer[4],
            ]) as usize;

            if self.buffer.len() < FRAME_HEADER_LEN + len {
                break;
            }

            self.buffer.advance(FRAME_HEADER_LEN);
            let payload = self.buffer.split_to(len).freeze();

            let frame = match flag {
                DATA_FLAG => Frame::Data(payload),
                TRAILER_FLAG => Frame::Trailer(payload),
                other => {
                    let error = ProtocolError::UnsupportedFrameFlag(other);
                    if frames.is_empty() {
                        self.error = Some(error.clone());
                        return Err(error);
                    }
                    self.error = Some(error);
                    break;
                }
            };
            frames.push(frame);
        }

        Ok(frames)
    }

    /// Number of bytes waiting for the rest of their frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn finish(self) -> Result<(), ProtocolError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.buffer.len() {
            0 => Ok(()),
            left => Err(ProtocolError::TruncatedFrame(left)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer(block: &[u8]) -> Vec<u8> {
        let mut out = vec![TRAILER_FLAG];
        out.extend_from_slice(&(block.len() as u32).to_be_bytes());
        out.extend_from_slice(block);
        out
    }

    #[test]
    fn encode_prefixes_flag_and_big_endian_length() {
        let payload = vec![7u8; 300];
        let framed = encode(&payload);

        assert_eq!(framed.len(), payload.len() + 5);
        assert_eq!(&framed[..5], &[0x00, 0x00, 0x00, 0x01, 0x2c]);
        assert_eq!(&framed[5..], payload.as_slice());
    }

    #[test]
    fn encode_empty_payload() {
        assert_eq!(encode(b"").as_ref(), &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn split_two_data_frames_in_order() {
        let mut body = encode(b"first").to_vec();
        body.extend_from_slice(&encode(b"second"));

        let frames = split_frames(&body).unwrap();

        assert_eq!(
            frames,
            vec![Frame::Data("first".into()), Frame::Data("second".into())]
        );
    }

    #[test]
    fn split_data_then_trailer() {
        let mut body = encode(b"msg").to_vec();
        body.extend_from_slice(&trailer(b"grpc-status: 0\r\n"));

        let frames = split_frames(&body).unwrap();

        assert_eq!(
            frames,
            vec![
                Frame::Data("msg".into()),
                Frame::Trailer("grpc-status: 0\r\n".into())
            ]
        );
    }

    #[test]
    fn empty_body_has_no_frames() {
        assert!(split_frames(&[]).unwrap().is_empty());
    }

    #[test]
    fn push_buffers_partial_frames() {
        let body = encode(b"chunked");
        let mut parser = FrameParser::new();

        assert!(parser.push(&body[..3]).unwrap().is_empty());
        assert!(parser.push(&body[3..6]).unwrap().is_empty());
        assert_eq!(parser.pending(), 6);

        let frames = parser.push(&body[6..]).unwrap();
        assert_eq!(frames, vec![Frame::Data("chunked".into())]);
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn compressed_frames_are_rejected() {
        let mut body = encode(b"zipped").to_vec();
        body[0] = 0x01;

        assert_eq!(
            split_frames(&body),
            Err(ProtocolError::UnsupportedFrameFlag(0x01))
        );
    }

    #[test]
    fn frames_before_an_unknown_flag_are_kept() {
        let mut body = encode(b"ok").to_vec();
        body.extend_from_slice(&trailer(b"grpc-status: 0\r\n"));
        let mut bad = encode(b"zipped").to_vec();
        bad[0] = 0x01;
        body.extend_from_slice(&bad);

        let mut parser = FrameParser::new();
        let frames = parser.push(&body).unwrap();

        assert_eq!(
            frames,
            vec![
                Frame::Data("ok".into()),
                Frame::Trailer("grpc-status: 0\r\n".into())
            ]
        );
        assert_eq!(
            parser.push(&encode(b"later")),
            Err(ProtocolError::UnsupportedFrameFlag(0x01))
        );
        assert_eq!(
            parser.finish(),
            Err(ProtocolError::UnsupportedFrameFlag(0x01))
        );
    }

    #[test]
    fn truncated_body_is_an_error() {
        let body = encode(b"cut short");

        assert_eq!(
            split_frames(&body[..8]),
            Err(ProtocolError::TruncatedFrame(8))
        );
    }
}
