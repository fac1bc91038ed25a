//! JPEG decoder front-end.
//!
//! This crate sequences a JFIF/EXIF JPEG byte stream from SOI to EOI and
//! hands the downstream entropy decoder everything it needs: metadata
//! records, the frame header, one validated [`ScanPlan`] per scan together
//! with the scan's entropy-coded bitstreams, and an optional late height
//! redefinition. Inverse DCT, color conversion, and pixel containers are
//! deliberately out of scope.
//!
//! ```no_run
//! use jpeg_oxide::{DecodeEvent, Decoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("image.jpg")?;
//! let mut decoder = Decoder::from_slice(&bytes);
//! while let Some(event) = decoder.next_event()? {
//!     match event {
//!         DecodeEvent::FrameReady(frame) => {
//!             println!("{}x{}", frame.width, frame.height);
//!         }
//!         DecodeEvent::ScanReady(plan, data) => {
//!             // Entropy-decode `data` according to `plan`, resolving
//!             // table selectors through the decoder's slot accessors.
//!             let _ = (plan, data);
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Tables installed by DQT/DHT segments stay owned by the decoder; scan
//! plans reference them by slot selector and the
//! [`quant_table`](Decoder::quant_table)/[`dc_table`](Decoder::dc_table)/
//! [`ac_table`](Decoder::ac_table) accessors resolve them at decode time.

mod driver;
mod error;
mod event;
mod scan;
mod tables;

pub use driver::Decoder;
pub use error::{Error, Result};
pub use event::{DecodeEvent, Metadata, ScanData};
pub use scan::{ScanComponent, ScanPlan};

pub use jpeg_bitstream::{ByteSource, EcsBitstream, ReaderSource, SliceSource};
pub use jpeg_header::{
    CodingProcess, DensityUnit, ExifData, FrameComponent, FrameHeader, JfifHeader,
    QuantPrecision, QuantTable,
};
pub use jpeg_huffman::{HuffmanTable, TableClass};

/// Iterator over decode events, fused after `End` or the first error.
pub struct Events<'dec, S> {
    decoder: &'dec mut Decoder<S>,
    failed: bool,
}

impl<S: ByteSource> Decoder<S> {
    pub fn events(&mut self) -> Events<'_, S> {
        Events {
            decoder: self,
            failed: false,
        }
    }
}

impl<S: ByteSource> Iterator for Events<'_, S> {
    type Item = Result<DecodeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.decoder.next_event() {
            Ok(event) => event.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
