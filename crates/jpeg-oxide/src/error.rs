/// The error type for decoder-level sequencing.
///
/// Lexing and segment parsing failures are wrapped; everything else is an
/// ordering or reference violation detected by the driver or the scan
/// composer. All of these are fatal for the decode.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    Lex(jpeg_bitstream::Error),
    Header(jpeg_header::Error),
    MissingSoi,
    DuplicateSoi,
    DuplicateFrame,
    PrematureSos,
    PrematureEoi,
    MissingDnl,
    PrematureDnl,
    UnexpectedDnl,
    UnexpectedRestart,
    MissingRestartInterval,
    InvalidRestartPhase {
        expected: u8,
        found: u8,
    },
    /// A scan component key with no counterpart in the frame header.
    UndefinedScanComponent(u8),
    /// Interleaved sampling volume over the limit of 10.
    InvalidSamplingVolume(u32),
    UndefinedDcTable(u8),
    UndefinedAcTable(u8),
    UndefinedQuantTable(u8),
    /// A 16-bit quantization table bound to an 8-bit-precision frame.
    QuantPrecisionMismatch {
        slot: u8,
    },
    /// SOF code for a hierarchical, lossless, or arithmetic process, or an
    /// arithmetic/hierarchical auxiliary segment.
    UnsupportedCodingProcess(u8),
    /// Frame plane count with no color interpretation downstream.
    UnrecognizedColorFormat(usize),
    /// Progressive band/bit sequencing violation.
    InvalidProgression(&'static str),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex(e) => Some(e),
            Self::Header(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Header(e) => write!(f, "{e}"),
            Self::MissingSoi => write!(f, "missing SOI"),
            Self::DuplicateSoi => write!(f, "duplicate SOI"),
            Self::DuplicateFrame => write!(f, "duplicate frame header"),
            Self::PrematureSos => write!(f, "premature SOS"),
            Self::PrematureEoi => write!(f, "premature EOI"),
            Self::MissingDnl => write!(f, "missing DNL segment"),
            Self::PrematureDnl => write!(f, "premature DNL segment"),
            Self::UnexpectedDnl => write!(f, "unexpected DNL segment"),
            Self::UnexpectedRestart => write!(f, "unexpected restart"),
            Self::MissingRestartInterval => {
                write!(f, "missing restart interval segment")
            }
            Self::InvalidRestartPhase { expected, .. } => {
                write!(f, "invalid restart phase (expected {expected})")
            }
            Self::UndefinedScanComponent(key) => {
                write!(f, "undefined scan component reference {key}")
            }
            Self::InvalidSamplingVolume(volume) => {
                write!(f, "invalid sampling volume {volume}")
            }
            Self::UndefinedDcTable(slot) => {
                write!(f, "undefined DC table reference in slot {slot}")
            }
            Self::UndefinedAcTable(slot) => {
                write!(f, "undefined AC table reference in slot {slot}")
            }
            Self::UndefinedQuantTable(slot) => {
                write!(f, "undefined quantization table reference in slot {slot}")
            }
            Self::QuantPrecisionMismatch { slot } => {
                write!(f, "quantization table precision mismatch in slot {slot}")
            }
            Self::UnsupportedCodingProcess(code) => {
                write!(f, "unsupported frame coding process (marker 0x{code:02x})")
            }
            Self::UnrecognizedColorFormat(planes) => {
                write!(f, "unrecognized color format with {planes} plane(s)")
            }
            Self::InvalidProgression(detail) => {
                write!(f, "invalid progressive band/bits: {detail}")
            }
        }
    }
}

impl From<jpeg_bitstream::Error> for Error {
    fn from(e: jpeg_bitstream::Error) -> Self {
        Self::Lex(e)
    }
}

impl From<jpeg_header::Error> for Error {
    fn from(e: jpeg_header::Error) -> Self {
        Self::Header(e)
    }
}

/// Shorthand for result type of `jpeg_oxide`.
pub type Result<T> = std::result::Result<T, Error>;
