use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::source::ByteSource;

/// Structural event produced by [`MarkerLexer`].
pub enum LexEvent {
    /// Standalone marker without a payload.
    Marker(Marker),
    /// Marker segment with its payload bytes (length field already removed).
    Segment(Marker, Vec<u8>),
    /// Unstuffed entropy-coded bytes. The marker that terminated the run is
    /// held back and returned by the next call.
    Ecs(Vec<u8>),
}

impl std::fmt::Debug for LexEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Marker(marker) => f.debug_tuple("Marker").field(marker).finish(),
            Self::Segment(marker, payload) => f
                .debug_tuple("Segment")
                .field(marker)
                .field(&format_args!("{} byte(s)", payload.len()))
                .finish(),
            Self::Ecs(bytes) => f
                .debug_tuple("Ecs")
                .field(&format_args!("{} byte(s)", bytes.len()))
                .finish(),
        }
    }
}

/// Splits a JPEG byte stream into marker segments and entropy-coded segments.
///
/// The lexer understands the two stuffing conventions of the format: runs of
/// 0xFF fill bytes before a marker code, and the `0xFF 0x00` escape inside
/// entropy-coded data. It keeps a one-marker lookahead because terminating an
/// entropy-coded segment requires consuming the marker that follows it.
pub struct MarkerLexer<S> {
    source: S,
    pending_marker: Option<Marker>,
    expect_ecs: bool,
}

impl<S: std::fmt::Debug> std::fmt::Debug for MarkerLexer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerLexer")
            .field("source", &self.source)
            .field("pending_marker", &self.pending_marker)
            .field("expect_ecs", &self.expect_ecs)
            .finish()
    }
}

impl<S: ByteSource> MarkerLexer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending_marker: None,
            expect_ecs: false,
        }
    }

    /// Produces the next structural event.
    ///
    /// SOS segments and restart markers are followed by an `Ecs` event; all
    /// other markers yield `Marker` or `Segment` events in stream order.
    pub fn next_event(&mut self) -> Result<LexEvent> {
        if self.expect_ecs {
            self.expect_ecs = false;
            let bytes = self.read_ecs()?;
            tracing::trace!(len = bytes.len(), "entropy-coded segment");
            return Ok(LexEvent::Ecs(bytes));
        }

        let marker = self.next_marker()?;
        if marker.is_standalone() {
            tracing::trace!(%marker, "standalone marker");
            if matches!(marker, Marker::Rst(_)) {
                self.expect_ecs = true;
            }
            Ok(LexEvent::Marker(marker))
        } else {
            let payload = self.read_segment_body()?;
            tracing::trace!(%marker, len = payload.len(), "marker segment");
            if marker == Marker::Sos {
                self.expect_ecs = true;
            }
            Ok(LexEvent::Segment(marker, payload))
        }
    }

    /// Reads the next marker, honoring the held-back lookahead.
    pub fn next_marker(&mut self) -> Result<Marker> {
        if let Some(marker) = self.pending_marker.take() {
            return Ok(marker);
        }

        let first = self
            .source
            .next_byte()?
            .ok_or(Error::TruncatedMarkerType)?;
        if first != 0xff {
            return Err(Error::InvalidMarkerPrefix(first));
        }
        // Leading 0xFF runs are fill bytes.
        loop {
            let b = self
                .source
                .next_byte()?
                .ok_or(Error::TruncatedMarkerType)?;
            if b != 0xff {
                return Marker::from_code(b);
            }
        }
    }

    /// Reads a length-prefixed segment body. The length field counts itself.
    pub fn read_segment_body(&mut self) -> Result<Vec<u8>> {
        let mut len_bytes = [0u8; 2];
        if self.source.read_exact(&mut len_bytes)? != 2 {
            return Err(Error::TruncatedSegmentHeader);
        }
        let len = u16::from_be_bytes(len_bytes);
        if len < 2 {
            return Err(Error::InvalidLength(len));
        }

        let expected = (len - 2) as usize;
        let mut payload = vec![0u8; expected];
        if self.source.read_exact(&mut payload)? != expected {
            return Err(Error::TruncatedSegmentBody { expected });
        }
        Ok(payload)
    }

    /// Reads an entropy-coded segment up to (and consuming) the marker that
    /// terminates it. `0xFF 0x00` escapes collapse to a single 0xFF data
    /// byte; 0xFF fill runs before the terminating marker are swallowed. The
    /// marker becomes the lexer's lookahead.
    pub fn read_ecs(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        loop {
            let b = self.source.next_byte()?.ok_or(Error::TruncatedEcs)?;
            if b != 0xff {
                bytes.push(b);
                continue;
            }

            let mut next = self.source.next_byte()?.ok_or(Error::TruncatedEcs)?;
            while next == 0xff {
                next = self.source.next_byte()?.ok_or(Error::TruncatedEcs)?;
            }
            if next == 0x00 {
                bytes.push(0xff);
                continue;
            }

            self.pending_marker = Some(Marker::from_code(next)?);
            return Ok(bytes);
        }
    }

    /// Consumes the lexer, returning the underlying source.
    pub fn into_source(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;

    fn lexer(bytes: &[u8]) -> MarkerLexer<SliceSource<'_>> {
        MarkerLexer::new(SliceSource::new(bytes))
    }

    #[test]
    fn standalone_markers() {
        let mut lex = lexer(&[0xff, 0xd8, 0xff, 0xd9]);
        assert!(matches!(lex.next_event().unwrap(), LexEvent::Marker(Marker::Soi)));
        assert!(matches!(lex.next_event().unwrap(), LexEvent::Marker(Marker::Eoi)));
    }

    #[test]
    fn fill_bytes_before_marker() {
        let mut lex = lexer(&[0xff, 0xff, 0xff, 0xd8]);
        assert!(matches!(lex.next_event().unwrap(), LexEvent::Marker(Marker::Soi)));
    }

    #[test]
    fn invalid_prefix() {
        let mut lex = lexer(&[0x12, 0xd8]);
        assert!(matches!(
            lex.next_event(),
            Err(Error::InvalidMarkerPrefix(0x12))
        ));
    }

    #[test]
    fn truncated_marker_type() {
        let mut lex = lexer(&[0xff]);
        assert!(matches!(lex.next_event(), Err(Error::TruncatedMarkerType)));
    }

    #[test]
    fn segment_with_payload() {
        let mut lex = lexer(&[0xff, 0xfe, 0x00, 0x05, b'a', b'b', b'c']);
        match lex.next_event().unwrap() {
            LexEvent::Segment(Marker::Com, payload) => assert_eq!(payload, b"abc"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn invalid_length() {
        let mut lex = lexer(&[0xff, 0xfe, 0x00, 0x01]);
        assert!(matches!(lex.next_event(), Err(Error::InvalidLength(1))));
    }

    #[test]
    fn truncated_segment_body() {
        let mut lex = lexer(&[0xff, 0xfe, 0x00, 0x08, b'a']);
        assert!(matches!(
            lex.next_event(),
            Err(Error::TruncatedSegmentBody { expected: 6 })
        ));
    }

    #[test]
    fn ecs_unstuffing() {
        // Wire sequence from the byte-stuffing scenario: FF00 12 FF00 FFD0.
        let mut lex = lexer(&[0xff, 0x00, 0x12, 0xff, 0x00, 0xff, 0xd0]);
        let bytes = lex.read_ecs().unwrap();
        assert_eq!(bytes, [0xff, 0x12, 0xff]);
        assert_eq!(lex.next_marker().unwrap(), Marker::Rst(0));
    }

    #[test]
    fn ecs_fill_run_before_marker() {
        let mut lex = lexer(&[0x01, 0xff, 0xff, 0xff, 0xd9]);
        let bytes = lex.read_ecs().unwrap();
        assert_eq!(bytes, [0x01]);
        assert_eq!(lex.next_marker().unwrap(), Marker::Eoi);
    }

    #[test]
    fn ecs_transparency() {
        // A 0xFF-free body passes through an SOS-wrapped scan untouched.
        let body: Vec<u8> = (0u8..=0xfe).collect();
        let mut wire = vec![0xff, 0xda, 0x00, 0x03, 0x00];
        wire.extend_from_slice(&body);
        wire.extend_from_slice(&[0xff, 0xd9]);

        let mut lex = lexer(&wire);
        assert!(matches!(
            lex.next_event().unwrap(),
            LexEvent::Segment(Marker::Sos, _)
        ));
        match lex.next_event().unwrap() {
            LexEvent::Ecs(bytes) => assert_eq!(bytes, body),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(lex.next_event().unwrap(), LexEvent::Marker(Marker::Eoi)));
    }

    #[test]
    fn ecs_truncation() {
        let mut lex = lexer(&[0x01, 0x02, 0xff]);
        assert!(matches!(lex.read_ecs(), Err(Error::TruncatedEcs)));
    }

    #[test]
    fn restart_marker_resumes_ecs() {
        let mut lex = lexer(&[
            0xff, 0xda, 0x00, 0x03, 0x00, // SOS
            0x11, 0xff, 0xd0, // ECS, RST0
            0x22, 0xff, 0xd9, // ECS, EOI
        ]);
        assert!(matches!(
            lex.next_event().unwrap(),
            LexEvent::Segment(Marker::Sos, _)
        ));
        assert!(matches!(lex.next_event().unwrap(), LexEvent::Ecs(b) if b == [0x11]));
        assert!(matches!(
            lex.next_event().unwrap(),
            LexEvent::Marker(Marker::Rst(0))
        ));
        assert!(matches!(lex.next_event().unwrap(), LexEvent::Ecs(b) if b == [0x22]));
        assert!(matches!(lex.next_event().unwrap(), LexEvent::Marker(Marker::Eoi)));
    }
}
