use jpeg_header::QuantTable;
use jpeg_huffman::{HuffmanTable, TableClass};

/// The four quantization and four-per-class Huffman table slots owned by
/// the decoder.
///
/// Installing over an occupied slot drops the previous table before the new
/// one becomes visible; dropping the store releases everything. Downstream
/// entropy decoders borrow tables through the accessors while a scan plan
/// is live.
#[derive(Debug, Default)]
pub(crate) struct TableStore {
    pub(crate) quant: [Option<QuantTable>; 4],
    pub(crate) dc: [Option<HuffmanTable>; 4],
    pub(crate) ac: [Option<HuffmanTable>; 4],
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_quant(&mut self, slot: u8, table: QuantTable) {
        let slot = usize::from(slot & 3);
        if self.quant[slot].is_some() {
            tracing::debug!(slot, "overwriting quantization table");
        }
        self.quant[slot] = Some(table);
    }

    pub fn install_huffman(&mut self, class: TableClass, slot: u8, table: HuffmanTable) {
        let slots = match class {
            TableClass::Dc => &mut self.dc,
            TableClass::Ac => &mut self.ac,
        };
        let slot = usize::from(slot & 3);
        if slots[slot].is_some() {
            tracing::debug!(%class, slot, "overwriting huffman table");
        }
        slots[slot] = Some(table);
    }

    pub fn quant(&self, slot: u8) -> Option<&QuantTable> {
        self.quant.get(usize::from(slot))?.as_ref()
    }

    pub fn dc(&self, slot: u8) -> Option<&HuffmanTable> {
        self.dc.get(usize::from(slot))?.as_ref()
    }

    pub fn ac(&self, slot: u8) -> Option<&HuffmanTable> {
        self.ac.get(usize::from(slot))?.as_ref()
    }
}
