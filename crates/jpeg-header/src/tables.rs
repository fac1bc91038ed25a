use jpeg_huffman::{HuffmanTable, TableClass};

use crate::{Error, Result, Segment, SegmentReader};

/// Per-entry precision of a quantization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantPrecision {
    U8,
    U16,
}

/// One 64-entry quantization table, in wire (zigzag) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantTable {
    pub precision: QuantPrecision,
    pub values: [u16; 64],
}

/// Parsed DQT segment: one or more table definitions with their target
/// slots, in definition order.
#[derive(Debug, Clone)]
pub struct DqtSegment {
    pub tables: Vec<(u8, QuantTable)>,
}

impl Segment for DqtSegment {
    fn parse(reader: &mut SegmentReader<'_>, _: ()) -> Result<Self> {
        let mut tables = Vec::new();
        // Subsegments are concatenated back to back until the body ends.
        loop {
            let flags = reader.u8()?;
            let precision = match flags >> 4 {
                0 => QuantPrecision::U8,
                1 => QuantPrecision::U16,
                code => return Err(Error::InvalidQuantPrecision(code)),
            };
            let slot = flags & 0x0f;
            if slot > 3 {
                return Err(Error::InvalidQuantSlot(slot));
            }

            let mut values = [0u16; 64];
            match precision {
                QuantPrecision::U8 => {
                    let raw = reader.take(64)?;
                    for (out, &b) in values.iter_mut().zip(raw) {
                        *out = b as u16;
                    }
                }
                QuantPrecision::U16 => {
                    let raw = reader.take(128)?;
                    for (out, pair) in values.iter_mut().zip(raw.chunks_exact(2)) {
                        *out = u16::from_be_bytes([pair[0], pair[1]]);
                    }
                }
            }

            tracing::debug!(slot, ?precision, "parsed quantization table");
            tables.push((slot, QuantTable { precision, values }));
            if reader.is_empty() {
                return Ok(Self { tables });
            }
        }
    }
}

/// Parsed DHT segment: one or more built decoding tables with their class
/// and target slot, in definition order.
#[derive(Debug)]
pub struct DhtSegment {
    pub tables: Vec<(TableClass, u8, HuffmanTable)>,
}

impl Segment for DhtSegment {
    fn parse(reader: &mut SegmentReader<'_>, _: ()) -> Result<Self> {
        let mut tables = Vec::new();
        loop {
            let flags = reader.u8()?;
            let class = match flags >> 4 {
                0 => TableClass::Dc,
                1 => TableClass::Ac,
                code => return Err(Error::InvalidHuffmanClass(code)),
            };
            let slot = flags & 0x0f;
            if slot > 3 {
                return Err(Error::InvalidHuffmanSlot(slot));
            }

            let leaf_counts: [u8; 16] = reader.take(16)?.try_into().unwrap();
            let total: usize = leaf_counts.iter().map(|&c| c as usize).sum();
            let leaf_values = reader.take(total)?;

            let table = HuffmanTable::build(class, &leaf_counts, leaf_values)?;
            tracing::debug!(%class, slot, leaves = total, "parsed huffman table");
            tables.push((class, slot, table));
            if reader.is_empty() {
                return Ok(Self { tables });
            }
        }
    }
}

/// Parsed DRI segment. An interval of zero disables restart markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartInterval(pub u16);

impl Segment for RestartInterval {
    fn parse(reader: &mut SegmentReader<'_>, _: ()) -> Result<Self> {
        let interval = reader.u16_be()?;
        reader.expect_empty()?;
        Ok(Self(interval))
    }
}

/// Parsed DNL segment: the late-arriving frame height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberOfLines(pub u16);

impl Segment for NumberOfLines {
    fn parse(reader: &mut SegmentReader<'_>, _: ()) -> Result<Self> {
        let height = reader.u16_be()?;
        reader.expect_empty()?;
        Ok(Self(height))
    }
}
