//! # Text Mode Decoding
//!
//! In text mode the response body is base64. The body may reach us in chunks that cut a
//! 4-character base64 group in half, so [`TextDecoder`] only decodes whole groups and carries the
//! remainder over to the next chunk.
//!
//! Servers commonly base64 encode each frame on its own, which leaves padding (`=`) in the middle
//! of the body. Such a body is decoded as a sequence of independently padded segments.
use super::ProtocolError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const GROUP_LEN: usize = 4;

/// Incremental base64 decoder.
///
/// An invalid segment stops decoding. The bytes decoded from earlier segments are still returned
/// and the error is reported by the next call or by [`TextDecoder::finish`].
#[derive(Debug, Default)]
pub struct TextDecoder {
    pending: Vec<u8>,
    error: Option<ProtocolError>,
}

impl TextDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes every complete base64 group seen so far.
    ///
    /// Returns an empty buffer when the accumulated input is shorter than one group.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        self.pending.extend_from_slice(chunk);

        let usable = self.pending.len() - self.pending.len() % GROUP_LEN;
        if usable == 0 {
            return Ok(Vec::new());
        }

        let complete: Vec<u8> = self.pending.drain(..usable).collect();
        let mut out = Vec::with_capacity(usable / GROUP_LEN * 3);

        let mut start = 0;
        let mut segments = Vec::new();
        for (i, group) in complete.chunks(GROUP_LEN).enumerate() {
            if group.contains(&b'=') {
                let end = (i + 1) * GROUP_LEN;
                segments.push(&complete[start..end]);
                start = end;
            }
        }
        segments.push(&complete[start..]);

        for segment in segments {
            if let Err(error) = decode_segment(segment, &mut out) {
                self.error = Some(error.clone());
                if out.is_empty() {
                    return Err(error);
                }
                break;
            }
        }

        Ok(out)
    }

    /// Number of characters waiting for the rest of their group.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn finish(self) -> Result<(), ProtocolError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.pending.len() {
            0 => Ok(()),
            left => Err(ProtocolError::TruncatedFrame(left)),
        }
    }
}

fn decode_segment(segment: &[u8], out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    if segment.is_empty() {
        return Ok(());
    }

    let decoded = STANDARD
        .decode(segment)
        .map_err(|e| ProtocolError::InvalidBase64(e.to_string()))?;
    out.extend_from_slice(&decoded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_whole_groups_only() {
        let mut decoder = TextDecoder::new();

        // "aGVsbG8=" is "hello"
        assert!(decoder.decode(b"aGV").unwrap().is_empty());
        assert_eq!(decoder.pending(), 3);

        assert_eq!(decoder.decode(b"sbG8").unwrap(), b"hel".to_vec());
        assert_eq!(decoder.pending(), 3);

        assert_eq!(decoder.decode(b"=").unwrap(), b"lo".to_vec());
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn decodes_padding_in_the_middle_of_the_body() {
        let mut decoder = TextDecoder::new();

        // "aGk=" is "hi", "dGhlcmU=" is "there"
        let out = decoder.decode(b"aGk=dGhlcmU=").unwrap();

        assert_eq!(out, b"hithere".to_vec());
    }

    #[test]
    fn invalid_characters_are_rejected() {
        let mut decoder = TextDecoder::new();

        assert!(matches!(
            decoder.decode(b"a$b%"),
            Err(ProtocolError::InvalidBase64(_))
        ));
    }

    #[test]
    fn segments_before_invalid_input_are_kept() {
        let mut decoder = TextDecoder::new();

        let out = decoder.decode(b"aGk=a$b%").unwrap();

        assert_eq!(out, b"hi".to_vec());
        assert!(matches!(
            decoder.decode(b"aGk="),
            Err(ProtocolError::InvalidBase64(_))
        ));
        assert!(matches!(
            decoder.finish(),
            Err(ProtocolError::InvalidBase64(_))
        ));
    }

    #[test]
    fn leftover_characters_fail_on_finish() {
        let mut decoder = TextDecoder::new();
        decoder.decode(b"aGVsbG").unwrap();

        assert_eq!(decoder.finish(), Err(ProtocolError::TruncatedFrame(2)));
    }
}
