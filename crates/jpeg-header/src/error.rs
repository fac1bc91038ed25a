/// The error type for marker segment parsing.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Segment body ended before the field being read.
    UnexpectedEnd,
    /// Bytes left over after the last field of a segment.
    TrailingData,
    Huffman(jpeg_huffman::Error),
    InvalidJfifSignature,
    InvalidJfifVersion(u8, u8),
    InvalidDensityUnit(u8),
    InvalidExifSignature,
    InvalidExifByteOrder,
    /// An IFD entry table or linked offset runs outside the blob.
    InvalidExifDirectory,
    InvalidFrameWidth,
    InvalidPrecision(u8),
    InvalidComponentCount(u8),
    InvalidSamplingFactors {
        horizontal: u8,
        vertical: u8,
    },
    DuplicateComponentKey(u8),
    /// Quantization selector out of 0..=3 in a frame component.
    InvalidQuantSelector(u8),
    /// DC or AC table selector out of 0..=3 in a scan component.
    InvalidScanSelector(u8),
    InvalidScanComponentCount(u8),
    InvalidSpectralBand {
        start: u8,
        end: u8,
    },
    InvalidApproximationBits {
        high: u8,
        low: u8,
    },
    InvalidHuffmanClass(u8),
    InvalidHuffmanSlot(u8),
    InvalidQuantPrecision(u8),
    InvalidQuantSlot(u8),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Huffman(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "truncated segment body"),
            Self::TrailingData => write!(f, "extraneous bytes after segment body"),
            Self::Huffman(e) => write!(f, "{e}"),
            Self::InvalidJfifSignature => write!(f, "invalid JFIF signature"),
            Self::InvalidJfifVersion(major, minor) => {
                write!(f, "invalid JFIF version {major}.{minor:02}")
            }
            Self::InvalidDensityUnit(unit) => write!(f, "invalid JFIF density unit {unit}"),
            Self::InvalidExifSignature => write!(f, "invalid EXIF signature"),
            Self::InvalidExifByteOrder => write!(f, "invalid EXIF byte order mark"),
            Self::InvalidExifDirectory => write!(f, "EXIF tag directory out of bounds"),
            Self::InvalidFrameWidth => write!(f, "invalid frame width 0"),
            Self::InvalidPrecision(bits) => {
                write!(f, "invalid sample precision {bits} for coding process")
            }
            Self::InvalidComponentCount(count) => {
                write!(f, "invalid frame component count {count}")
            }
            Self::InvalidSamplingFactors { horizontal, vertical } => {
                write!(f, "invalid sampling factors {horizontal}x{vertical}")
            }
            Self::DuplicateComponentKey(key) => {
                write!(f, "duplicate frame component key {key}")
            }
            Self::InvalidQuantSelector(slot) => {
                write!(f, "invalid quantization table selector {slot}")
            }
            Self::InvalidScanSelector(slot) => {
                write!(f, "invalid entropy table selector {slot}")
            }
            Self::InvalidScanComponentCount(count) => {
                write!(f, "invalid scan component count {count}")
            }
            Self::InvalidSpectralBand { start, end } => {
                write!(f, "invalid spectral band {start}..{end}")
            }
            Self::InvalidApproximationBits { high, low } => {
                write!(f, "invalid successive approximation bits {high},{low}")
            }
            Self::InvalidHuffmanClass(class) => {
                write!(f, "invalid huffman table class {class}")
            }
            Self::InvalidHuffmanSlot(slot) => write!(f, "invalid huffman table slot {slot}"),
            Self::InvalidQuantPrecision(code) => {
                write!(f, "invalid quantization table precision code {code}")
            }
            Self::InvalidQuantSlot(slot) => {
                write!(f, "invalid quantization table slot {slot}")
            }
        }
    }
}

impl From<jpeg_huffman::Error> for Error {
    fn from(e: jpeg_huffman::Error) -> Self {
        Self::Huffman(e)
    }
}

/// Shorthand for result type of `jpeg_header`.
pub type Result<T> = std::result::Result<T, Error>;
