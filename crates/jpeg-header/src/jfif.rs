use crate::{Error, Result, Segment, SegmentReader};

const JFIF_SIGNATURE: [u8; 5] = [0x4a, 0x46, 0x49, 0x46, 0x00];

/// Pixel density unit carried by a JFIF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnit {
    /// No unit; densities describe the pixel aspect ratio.
    AspectRatio,
    /// Dots per inch.
    Inch,
    /// Dots per centimeter.
    Centimeter,
}

/// Parsed JFIF (APP0) record. Thumbnail bytes are discarded; only their
/// dimensions are kept.
#[derive(Debug, Clone)]
pub struct JfifHeader {
    pub version: (u8, u8),
    pub unit: DensityUnit,
    pub x_density: u16,
    pub y_density: u16,
    pub thumbnail_size: (u8, u8),
}

impl Segment for JfifHeader {
    fn parse(reader: &mut SegmentReader<'_>, _: ()) -> Result<Self> {
        if reader.take(5)? != JFIF_SIGNATURE {
            return Err(Error::InvalidJfifSignature);
        }

        let major = reader.u8()?;
        let minor = reader.u8()?;
        if !matches!((major, minor), (1, 0) | (1, 1) | (1, 2)) {
            return Err(Error::InvalidJfifVersion(major, minor));
        }

        let unit = match reader.u8()? {
            0 => DensityUnit::AspectRatio,
            1 => DensityUnit::Inch,
            2 => DensityUnit::Centimeter,
            unit => return Err(Error::InvalidDensityUnit(unit)),
        };
        let x_density = reader.u16_be()?;
        let y_density = reader.u16_be()?;

        let thumb_width = reader.u8()?;
        let thumb_height = reader.u8()?;
        let thumb_len = 3 * thumb_width as usize * thumb_height as usize;
        let discarded = reader.take(thumb_len)?;
        if !discarded.is_empty() {
            tracing::warn!(bytes = discarded.len(), "discarding JFIF thumbnail");
        }

        Ok(Self {
            version: (major, minor),
            unit,
            x_density,
            y_density,
            thumbnail_size: (thumb_width, thumb_height),
        })
    }
}
