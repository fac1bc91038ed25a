//! This crate provides typed parsers for JPEG marker segment bodies: JFIF
//! and EXIF application segments, quantization and Huffman table
//! definitions, restart interval and number-of-lines segments, and the
//! frame and scan headers.
//!
//! Every segment type implements [`Segment`], parsing itself out of a
//! [`SegmentReader`] positioned over one marker segment body. Context
//! threads outer state into a parse where the wire format alone is not
//! enough; the scan header needs the frame's coding process, everything
//! else parses with `()`.

mod error;
mod exif;
mod frame;
mod jfif;
mod scan;
mod tables;

pub use error::{Error, Result};
pub use exif::{ByteOrder, ExifData, Ifd, IfdEntry, IfdKind};
pub use frame::{CodingProcess, FrameComponent, FrameHeader};
pub use jfif::{DensityUnit, JfifHeader};
pub use scan::{ScanComponentRef, ScanHeader};
pub use tables::{
    DhtSegment, DqtSegment, NumberOfLines, QuantPrecision, QuantTable, RestartInterval,
};

/// Byte cursor over one marker segment body.
///
/// All reads fail with [`Error::UnexpectedEnd`] when the body runs out;
/// [`expect_empty`](Self::expect_empty) asserts the body was consumed
/// exactly.
#[derive(Debug, Clone)]
pub struct SegmentReader<'buf> {
    bytes: &'buf [u8],
}

impl<'buf> SegmentReader<'buf> {
    #[inline]
    pub fn new(bytes: &'buf [u8]) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn u8(&mut self) -> Result<u8> {
        let (&b, rest) = self.bytes.split_first().ok_or(Error::UnexpectedEnd)?;
        self.bytes = rest;
        Ok(b)
    }

    pub fn u16_be(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn take(&mut self, count: usize) -> Result<&'buf [u8]> {
        if self.bytes.len() < count {
            return Err(Error::UnexpectedEnd);
        }
        let (head, rest) = self.bytes.split_at(count);
        self.bytes = rest;
        Ok(head)
    }

    /// Consumes the rest of the body.
    pub fn take_remaining(&mut self) -> &'buf [u8] {
        std::mem::take(&mut self.bytes)
    }

    pub fn expect_empty(&self) -> Result<()> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(Error::TrailingData)
        }
    }
}

/// A value parsed from one marker segment body with the given context.
pub trait Segment<Ctx = ()>: Sized {
    fn parse(reader: &mut SegmentReader<'_>, ctx: Ctx) -> Result<Self>;

    /// Parses a whole segment body, requiring it to be consumed exactly.
    fn parse_body(bytes: &[u8], ctx: Ctx) -> Result<Self> {
        let mut reader = SegmentReader::new(bytes);
        let value = Self::parse(&mut reader, ctx)?;
        reader.expect_empty()?;
        Ok(value)
    }
}
