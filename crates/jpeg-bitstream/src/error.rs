/// The error type for byte-level and marker-level operations.
///
/// Everything in this enum is fatal for the current decode; the lexer never
/// resynchronizes after reporting one of these.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    Io(std::io::Error),
    /// End of stream while scanning for a marker code.
    TruncatedMarkerType,
    /// End of stream inside a segment length field.
    TruncatedSegmentHeader,
    /// End of stream inside a segment body.
    TruncatedSegmentBody {
        expected: usize,
    },
    /// End of stream inside an entropy-coded segment.
    TruncatedEcs,
    /// Segment length field too small to contain itself.
    InvalidLength(u16),
    /// A byte other than 0xFF where a marker prefix was required.
    InvalidMarkerPrefix(u8),
    /// Marker code reserved by the standard, or outside the marker tag range.
    ReservedMarker(u8),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::TruncatedMarkerType => write!(f, "truncated marker type"),
            Self::TruncatedSegmentHeader => write!(f, "truncated segment header"),
            Self::TruncatedSegmentBody { expected } => {
                write!(f, "truncated segment body (expected {expected} byte(s))")
            }
            Self::TruncatedEcs => write!(f, "truncated entropy coded segment"),
            Self::InvalidLength(len) => write!(f, "invalid segment length {len}"),
            Self::InvalidMarkerPrefix(b) => {
                write!(f, "invalid marker prefix byte 0x{b:02x}")
            }
            Self::ReservedMarker(code) => write!(f, "reserved marker type 0x{code:02x}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Shorthand for result type of `jpeg_bitstream`.
pub type Result<T> = std::result::Result<T, Error>;
