use crate::{CodingProcess, Error, Result, Segment, SegmentReader};

/// One component reference in a scan header, still keyed by the frame
/// component identifier. Resolution against the frame happens when the
/// scan is composed.
#[derive(Debug, Clone, Copy)]
pub struct ScanComponentRef {
    pub key: u8,
    pub dc_selector: u8,
    pub ac_selector: u8,
}

/// Parsed SOS segment, range-checked but not yet validated against the
/// frame or the progression history.
#[derive(Debug, Clone)]
pub struct ScanHeader {
    pub components: Vec<ScanComponentRef>,
    /// Spectral band start (Ss), zigzag index.
    pub band_start: u8,
    /// Spectral band end (Se), zigzag index.
    pub band_end: u8,
    /// Successive approximation high bit (Ah).
    pub bit_high: u8,
    /// Successive approximation low bit (Al).
    pub bit_low: u8,
}

impl Segment<CodingProcess> for ScanHeader {
    fn parse(reader: &mut SegmentReader<'_>, process: CodingProcess) -> Result<Self> {
        let count = reader.u8()?;
        if !(1..=4).contains(&count) {
            return Err(Error::InvalidScanComponentCount(count));
        }

        let mut components = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let key = reader.u8()?;
            let selectors = reader.u8()?;
            let dc_selector = selectors >> 4;
            let ac_selector = selectors & 0x0f;
            if dc_selector > 3 {
                return Err(Error::InvalidScanSelector(dc_selector));
            }
            if ac_selector > 3 {
                return Err(Error::InvalidScanSelector(ac_selector));
            }
            components.push(ScanComponentRef {
                key,
                dc_selector,
                ac_selector,
            });
        }

        let band_start = reader.u8()?;
        let band_end = reader.u8()?;
        let bits = reader.u8()?;
        let bit_high = bits >> 4;
        let bit_low = bits & 0x0f;

        let band_valid = if process.is_progressive() {
            band_start <= 63 && band_start <= band_end && band_end <= 63
        } else {
            // Sequential scans carry the fixed full band; some encoders
            // write Se = 0 instead.
            band_start == 0 && (band_end == 63 || band_end == 0)
        };
        if !band_valid {
            return Err(Error::InvalidSpectralBand {
                start: band_start,
                end: band_end,
            });
        }
        if bit_high > 13 || bit_low > 13 {
            return Err(Error::InvalidApproximationBits {
                high: bit_high,
                low: bit_low,
            });
        }

        tracing::debug!(
            components = components.len(),
            band = ?(band_start, band_end),
            bits = ?(bit_high, bit_low),
            "parsed scan header"
        );
        Ok(Self {
            components,
            band_start,
            band_end,
            bit_high,
            bit_low,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sos_body(comps: &[(u8, u8, u8)], ss: u8, se: u8, ah: u8, al: u8) -> Vec<u8> {
        let mut body = vec![comps.len() as u8];
        for &(key, td, ta) in comps {
            body.extend_from_slice(&[key, td << 4 | ta]);
        }
        body.extend_from_slice(&[ss, se, ah << 4 | al]);
        body
    }

    #[test]
    fn sequential_scan() {
        let body = sos_body(&[(1, 0, 0), (2, 1, 1), (3, 1, 1)], 0, 63, 0, 0);
        let scan = ScanHeader::parse_body(&body, CodingProcess::Baseline).unwrap();
        assert_eq!(scan.components.len(), 3);
        assert_eq!(scan.components[1].dc_selector, 1);
        assert_eq!((scan.band_start, scan.band_end), (0, 63));
    }

    #[test]
    fn progressive_refinement_scan() {
        let body = sos_body(&[(1, 0, 2)], 1, 5, 2, 1);
        let scan = ScanHeader::parse_body(&body, CodingProcess::Progressive).unwrap();
        assert_eq!((scan.bit_high, scan.bit_low), (2, 1));
        assert_eq!(scan.components[0].ac_selector, 2);
    }

    #[test]
    fn component_count_bounds() {
        let body = sos_body(&[], 0, 63, 0, 0);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidScanComponentCount(0))
        ));

        let comps: Vec<_> = (1..=5).map(|k| (k, 0, 0)).collect();
        let body = sos_body(&comps, 0, 63, 0, 0);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidScanComponentCount(5))
        ));
    }

    #[test]
    fn selector_range() {
        let body = sos_body(&[(1, 4, 0)], 0, 63, 0, 0);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidScanSelector(4))
        ));
    }

    #[test]
    fn band_ranges() {
        // Sequential scans must carry the full (or elided) band.
        let body = sos_body(&[(1, 0, 0)], 1, 63, 0, 0);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::InvalidSpectralBand { start: 1, end: 63 })
        ));
        let body = sos_body(&[(1, 0, 0)], 0, 0, 0, 0);
        assert!(ScanHeader::parse_body(&body, CodingProcess::Baseline).is_ok());

        // Progressive bands must be ordered and inside 0..=63.
        let body = sos_body(&[(1, 0, 0)], 6, 5, 0, 0);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Progressive),
            Err(Error::InvalidSpectralBand { start: 6, end: 5 })
        ));
        let body = sos_body(&[(1, 0, 0)], 1, 64, 0, 0);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Progressive),
            Err(Error::InvalidSpectralBand { start: 1, end: 64 })
        ));
    }

    #[test]
    fn approximation_bit_range() {
        let body = sos_body(&[(1, 0, 0)], 0, 0, 14, 0);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Progressive),
            Err(Error::InvalidApproximationBits { high: 14, low: 0 })
        ));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut body = sos_body(&[(1, 0, 0)], 0, 63, 0, 0);
        body.push(0x00);
        assert!(matches!(
            ScanHeader::parse_body(&body, CodingProcess::Baseline),
            Err(Error::TrailingData)
        ));
    }
}
