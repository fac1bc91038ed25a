use crate::{Error, Result, Segment, SegmentReader};

/// Coding process selected by the SOF marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingProcess {
    /// SOF0: baseline sequential DCT, 8-bit samples only.
    Baseline,
    /// SOF1: extended sequential DCT.
    ExtendedSequential,
    /// SOF2: progressive DCT.
    Progressive,
}

impl CodingProcess {
    /// Whether scans refine coefficients over multiple passes.
    #[inline]
    pub fn is_progressive(self) -> bool {
        matches!(self, Self::Progressive)
    }
}

/// One component record of a frame header.
#[derive(Debug, Clone, Copy)]
pub struct FrameComponent {
    /// Wire identifier the scan headers refer back to.
    pub key: u8,
    /// Horizontal sampling factor, 1..=4.
    pub horizontal: u8,
    /// Vertical sampling factor, 1..=4.
    pub vertical: u8,
    /// Quantization table slot, 0..=3.
    pub quant_selector: u8,
}

/// Parsed SOF segment.
///
/// A height of zero is legal and means the real height arrives in a DNL
/// segment after the first scan.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub process: CodingProcess,
    /// Sample precision in bits, 8 or 12.
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: Vec<FrameComponent>,
    /// Component key to plane index; -1 marks a hole.
    key_map: [i16; 256],
}

impl Segment<CodingProcess> for FrameHeader {
    fn parse(reader: &mut SegmentReader<'_>, process: CodingProcess) -> Result<Self> {
        let precision = reader.u8()?;
        let valid_precision = match process {
            CodingProcess::Baseline => precision == 8,
            _ => precision == 8 || precision == 12,
        };
        if !valid_precision {
            return Err(Error::InvalidPrecision(precision));
        }

        let height = reader.u16_be()?;
        let width = reader.u16_be()?;
        if width == 0 {
            return Err(Error::InvalidFrameWidth);
        }

        let count = reader.u8()?;
        if count == 0 || (process.is_progressive() && count > 4) {
            return Err(Error::InvalidComponentCount(count));
        }

        let mut components = Vec::with_capacity(count as usize);
        let mut key_map = [-1i16; 256];
        for index in 0..count {
            let key = reader.u8()?;
            let factors = reader.u8()?;
            let quant_selector = reader.u8()?;

            let horizontal = factors >> 4;
            let vertical = factors & 0x0f;
            if !(1..=4).contains(&horizontal) || !(1..=4).contains(&vertical) {
                return Err(Error::InvalidSamplingFactors {
                    horizontal,
                    vertical,
                });
            }
            if quant_selector > 3 {
                return Err(Error::InvalidQuantSelector(quant_selector));
            }
            if key_map[key as usize] != -1 {
                return Err(Error::DuplicateComponentKey(key));
            }
            key_map[key as usize] = index as i16;

            components.push(FrameComponent {
                key,
                horizontal,
                vertical,
                quant_selector,
            });
        }

        tracing::debug!(
            ?process,
            precision,
            width,
            height,
            components = components.len(),
            "parsed frame header"
        );
        Ok(Self {
            process,
            precision,
            height,
            width,
            components,
            key_map,
        })
    }
}

impl FrameHeader {
    /// Resolves a scan-component key to its plane index.
    #[inline]
    pub fn component_index(&self, key: u8) -> Option<usize> {
        let index = self.key_map[key as usize];
        (index >= 0).then_some(index as usize)
    }

    /// Installs the height delivered by a DNL segment.
    pub fn redefine_height(&mut self, height: u16) {
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sof_body(precision: u8, height: u16, width: u16, comps: &[(u8, u8, u8, u8)]) -> Vec<u8> {
        let mut body = vec![precision];
        body.extend_from_slice(&height.to_be_bytes());
        body.extend_from_slice(&width.to_be_bytes());
        body.push(comps.len() as u8);
        for &(key, h, v, tq) in comps {
            body.extend_from_slice(&[key, h << 4 | v, tq]);
        }
        body
    }

    #[test]
    fn typical_ycbcr_frame() {
        let body = sof_body(8, 480, 640, &[(1, 2, 2, 0), (2, 1, 1, 1), (3, 1, 1, 1)]);
        let frame = FrameHeader::parse_body(&body, CodingProcess::Baseline).unwrap();
        assert_eq!((frame.width, frame.height), (640, 480));
        assert_eq!(frame.components.len(), 3);
        assert_eq!(frame.component_index(2), Some(1));
        assert_eq!(frame.component_index(4), None);
        assert_eq!(frame.components[0].horizontal, 2);
    }

    #[test]
    fn zero_height_defers_to_dnl() {
        let body = sof_body(8, 0, 16, &[(0, 1, 1, 0)]);
        let mut frame = FrameHeader::parse_body(&body, CodingProcess::Baseline).unwrap();
        assert_eq!(frame.height, 0);
        frame.redefine_height(128);
        assert_eq!(frame.height, 128);
    }

    #[test]
    fn zero_width_rejected() {
        let body = sof_body(8, 16, 0, &[(0, 1, 1, 0)]);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidFrameWidth)
        ));
    }

    #[test]
    fn baseline_precision_restricted() {
        let body = sof_body(12, 16, 16, &[(0, 1, 1, 0)]);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidPrecision(12))
        ));
        assert!(FrameHeader::parse_body(&body, CodingProcess::ExtendedSequential).is_ok());
        assert!(FrameHeader::parse_body(&body, CodingProcess::Progressive).is_ok());

        let body = sof_body(10, 16, 16, &[(0, 1, 1, 0)]);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Progressive),
            Err(Error::InvalidPrecision(10))
        ));
    }

    #[test]
    fn progressive_component_limit() {
        let comps: Vec<_> = (0..5).map(|k| (k, 1, 1, 0)).collect();
        let body = sof_body(8, 16, 16, &comps);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Progressive),
            Err(Error::InvalidComponentCount(5))
        ));
        // Sequential processes allow more than four planes at parse time.
        assert!(FrameHeader::parse_body(&body, CodingProcess::Baseline).is_ok());
    }

    #[test]
    fn sampling_and_selector_ranges() {
        let body = sof_body(8, 16, 16, &[(0, 5, 1, 0)]);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidSamplingFactors { horizontal: 5, vertical: 1 })
        ));

        let body = sof_body(8, 16, 16, &[(0, 1, 1, 4)]);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidQuantSelector(4))
        ));
    }

    #[test]
    fn duplicate_keys_rejected() {
        let body = sof_body(8, 16, 16, &[(7, 1, 1, 0), (7, 1, 1, 0)]);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::DuplicateComponentKey(7))
        ));
    }

    #[test]
    fn length_arithmetic_enforced() {
        let mut body = sof_body(8, 16, 16, &[(0, 1, 1, 0)]);
        body.push(0xee);
        assert!(matches!(
            FrameHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::TrailingData)
        ));

        let body = sof_body(8, 16, 16, &[(0, 1, 1, 0)]);
        assert!(matches!(
            FrameHeader::parse_body(&body[..body.len() - 1], CodingProcess::Baseline),
            Err(Error::UnexpectedEnd)
        ));
    }
}
