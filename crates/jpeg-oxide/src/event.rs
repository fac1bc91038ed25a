use jpeg_bitstream::EcsBitstream;
use jpeg_header::{ExifData, FrameHeader, JfifHeader};

use crate::scan::ScanPlan;

/// Decoded metadata surfaced before and between scans. Unknown application
/// segments and comments are never errors; they pass through raw.
#[derive(Debug)]
pub enum Metadata {
    Jfif(JfifHeader),
    Exif(ExifData),
    App { marker: u8, data: Vec<u8> },
    Comment(Vec<u8>),
}

/// The entropy-coded payload of one scan: one bitstream per restart
/// interval plus the terminating run, or exactly one when restart markers
/// are disabled.
#[derive(Debug, Default)]
pub struct ScanData {
    segments: Vec<EcsBitstream>,
}

impl ScanData {
    pub(crate) fn new(segments: Vec<EcsBitstream>) -> Self {
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EcsBitstream> {
        self.segments.iter()
    }
}

impl IntoIterator for ScanData {
    type Item = EcsBitstream;
    type IntoIter = std::vec::IntoIter<EcsBitstream>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanData {
    type Item = &'a EcsBitstream;
    type IntoIter = std::slice::Iter<'a, EcsBitstream>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Event produced by [`Decoder::next_event`](crate::Decoder::next_event).
///
/// A successful decode yields metadata events in stream order, one
/// `FrameReady`, one `ScanReady` per scan, at most one `HeightRedefined`
/// right after the first scan, and a final `End`.
#[derive(Debug)]
pub enum DecodeEvent {
    Metadata(Metadata),
    FrameReady(FrameHeader),
    ScanReady(ScanPlan, ScanData),
    HeightRedefined(u16),
    End,
}
