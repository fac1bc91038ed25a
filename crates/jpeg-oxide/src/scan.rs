use jpeg_header::{FrameHeader, QuantPrecision, ScanHeader};

use crate::error::{Error, Result};
use crate::tables::TableStore;

/// Largest interleaved sampling volume a scan may carry.
const MAX_SAMPLING_VOLUME: u32 = 10;

/// One resolved component of a scan plan.
#[derive(Debug, Clone, Copy)]
pub struct ScanComponent {
    /// Index into the frame header's component list.
    pub plane_index: usize,
    pub dc_selector: u8,
    pub ac_selector: u8,
}

/// Fully validated scan descriptor handed to the entropy decoder.
///
/// Selectors reference the decoder's table slots; the tables themselves are
/// borrowed from the decoder while the plan is decoded.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    /// Spectral band, inclusive zigzag range.
    pub band: (u8, u8),
    /// Successive approximation bits (Ah, Al). (0, 0) for sequential scans.
    pub bits: (u8, u8),
    pub components: Vec<ScanComponent>,
}

/// Most-recently-written approximation bit per (plane, zigzag index), used
/// to enforce the progressive scan sequencing rules.
#[derive(Debug)]
pub(crate) struct ProgressionTracker {
    planes: Vec<[Option<u8>; 64]>,
}

impl ProgressionTracker {
    pub fn new(plane_count: usize) -> Self {
        Self {
            planes: vec![[None; 64]; plane_count],
        }
    }

    /// Validates one scan against the history and records its writes.
    ///
    /// The first scan touching a coefficient must not refine (Ah = 0), and
    /// every later scan must continue exactly where the previous one left
    /// off: Ah equal to the previous Al, Al one below. AC scans require the
    /// DC coefficient to have been written first.
    fn record(&mut self, plan: &ScanPlan) -> Result<()> {
        let (start, end) = plan.band;
        let (high, low) = plan.bits;
        for component in &plan.components {
            let coefficients = &mut self.planes[component.plane_index];
            if start > 0 && coefficients[0].is_none() {
                return Err(Error::InvalidProgression("AC scan before initial DC scan"));
            }
            for z in start..=end {
                match coefficients[usize::from(z)] {
                    None if high != 0 => {
                        return Err(Error::InvalidProgression(
                            "refinement before initial scan of coefficient",
                        ));
                    }
                    Some(previous) if high != previous || low + 1 != high => {
                        return Err(Error::InvalidProgression(
                            "non-contiguous successive approximation",
                        ));
                    }
                    _ => coefficients[usize::from(z)] = Some(low),
                }
            }
        }
        Ok(())
    }

    /// Last written approximation bit for one coefficient, for tests and
    /// diagnostics.
    #[cfg(test)]
    fn bit_position(&self, plane: usize, z: usize) -> Option<u8> {
        self.planes[plane][z]
    }
}

/// Combines the frame header, the slot bindings, and a parsed scan header
/// into a validated [`ScanPlan`].
pub(crate) fn compose_scan(
    frame: &FrameHeader,
    header: &ScanHeader,
    tables: &TableStore,
    tracker: Option<&mut ProgressionTracker>,
) -> Result<ScanPlan> {
    let mut components = Vec::with_capacity(header.components.len());
    for reference in &header.components {
        let plane_index = frame
            .component_index(reference.key)
            .ok_or(Error::UndefinedScanComponent(reference.key))?;
        components.push(ScanComponent {
            plane_index,
            dc_selector: reference.dc_selector,
            ac_selector: reference.ac_selector,
        });
    }

    let progressive = frame.process.is_progressive();
    let (band, bits) = if progressive {
        if header.band_start == 0 && header.band_end != 0 {
            return Err(Error::InvalidProgression("spectral band mixes DC and AC"));
        }
        if header.band_start > 0 && components.len() > 1 {
            return Err(Error::InvalidProgression("interleaved AC scan"));
        }
        (
            (header.band_start, header.band_end),
            (header.bit_high, header.bit_low),
        )
    } else {
        // Sequential scans always cover the full band in one pass.
        ((0, 63), (0, 0))
    };

    if components.len() > 1 {
        let volume: u32 = components
            .iter()
            .map(|c| {
                let fc = &frame.components[c.plane_index];
                u32::from(fc.horizontal) * u32::from(fc.vertical)
            })
            .sum();
        if volume > MAX_SAMPLING_VOLUME {
            return Err(Error::InvalidSamplingVolume(volume));
        }
    }

    // A selector is checked only where the scan actually consumes from the
    // table: the DC table on an initial band-0 pass, the AC table whenever
    // the band extends past 0. Dequantization is unconditional downstream.
    let needs_dc = band.0 == 0 && bits.0 == 0;
    let needs_ac = band.1 > 0;
    for component in &components {
        let quant_slot = frame.components[component.plane_index].quant_selector;
        let quant = tables
            .quant(quant_slot)
            .ok_or(Error::UndefinedQuantTable(quant_slot))?;
        if frame.precision == 8 && quant.precision == QuantPrecision::U16 {
            return Err(Error::QuantPrecisionMismatch { slot: quant_slot });
        }
        if needs_dc && tables.dc(component.dc_selector).is_none() {
            return Err(Error::UndefinedDcTable(component.dc_selector));
        }
        if needs_ac && tables.ac(component.ac_selector).is_none() {
            return Err(Error::UndefinedAcTable(component.ac_selector));
        }
    }

    let plan = ScanPlan {
        band,
        bits,
        components,
    };
    if let Some(tracker) = tracker {
        debug_assert!(progressive);
        tracker.record(&plan)?;
    }

    tracing::debug!(
        band = ?plan.band,
        bits = ?plan.bits,
        components = plan.components.len(),
        "composed scan plan"
    );
    Ok(plan)
}
