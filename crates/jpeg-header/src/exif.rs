use crate::{Error, Result, Segment, SegmentReader};

const EXIF_SIGNATURE: [u8; 6] = [0x45, 0x78, 0x69, 0x66, 0x00, 0x00];
const BYTE_ORDER_LE: [u8; 4] = [0x49, 0x49, 0x2a, 0x00];
const BYTE_ORDER_BE: [u8; 4] = [0x4d, 0x4d, 0x00, 0x2a];

/// Tag of the EXIF sub-IFD pointer in the root directory.
const TAG_EXIF_IFD: u16 = 34665;
/// Tag of the GPS sub-IFD pointer in the root directory.
const TAG_GPS_IFD: u16 = 34853;
/// TIFF LONG (u32) field type.
const TYPE_LONG: u16 = 4;
/// TIFF SHORT (u16) field type.
const TYPE_SHORT: u16 = 3;

/// Endianness of the TIFF blob inside an EXIF segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    #[inline]
    fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::LittleEndian => u16::from_le_bytes(bytes),
            Self::BigEndian => u16::from_be_bytes(bytes),
        }
    }

    #[inline]
    fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::LittleEndian => u32::from_le_bytes(bytes),
            Self::BigEndian => u32::from_be_bytes(bytes),
        }
    }
}

/// Which directory an [`Ifd`] was indexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfdKind {
    /// The root (0th) directory.
    Root,
    /// The EXIF sub-directory linked from tag 34665.
    Exif,
    /// The GPS sub-directory linked from tag 34853.
    Gps,
}

/// One 12-byte tag record. The payload box holds the value itself when it
/// fits, otherwise a blob offset; this parser keeps it raw either way so
/// blob-internal offsets stay valid.
#[derive(Debug, Clone, Copy)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub payload: [u8; 4],
}

impl IfdEntry {
    /// The payload as an inline u16, when the field is a count-1 SHORT.
    pub fn u16_value(&self, order: ByteOrder) -> Option<u16> {
        (self.field_type == TYPE_SHORT && self.count == 1)
            .then(|| order.u16([self.payload[0], self.payload[1]]))
    }

    /// The payload as an inline u32, when the field is a count-1 LONG.
    pub fn u32_value(&self, order: ByteOrder) -> Option<u32> {
        (self.field_type == TYPE_LONG && self.count == 1).then(|| order.u32(self.payload))
    }
}

/// One indexed tag directory.
#[derive(Debug, Clone)]
pub struct Ifd {
    pub kind: IfdKind,
    /// Blob offset the directory was read from.
    pub offset: u32,
    pub entries: Vec<IfdEntry>,
}

impl Ifd {
    pub fn entry(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }
}

/// EXIF (APP1) payload kept as an addressable blob with indexed tag
/// directories.
///
/// Offsets inside the blob are TIFF-header-relative, so the blob is stored
/// exactly as found on the wire and never rewritten. The root directory is
/// always indexed; the EXIF and GPS sub-directories are indexed when the
/// root links to them.
#[derive(Debug, Clone)]
pub struct ExifData {
    byte_order: ByteOrder,
    blob: Vec<u8>,
    directories: Vec<Ifd>,
}

impl Segment for ExifData {
    fn parse(reader: &mut SegmentReader<'_>, _: ()) -> Result<Self> {
        if reader.take(6)? != EXIF_SIGNATURE {
            return Err(Error::InvalidExifSignature);
        }

        let blob = reader.take_remaining().to_vec();
        if blob.len() < 8 {
            return Err(Error::UnexpectedEnd);
        }
        let order_mark: [u8; 4] = blob[..4].try_into().unwrap();
        let byte_order = match order_mark {
            BYTE_ORDER_LE => ByteOrder::LittleEndian,
            BYTE_ORDER_BE => ByteOrder::BigEndian,
            _ => return Err(Error::InvalidExifByteOrder),
        };

        let root_offset = byte_order.u32(blob[4..8].try_into().unwrap());
        let root = index_directory(&blob, byte_order, IfdKind::Root, root_offset)?;

        let mut directories = Vec::with_capacity(3);
        for (tag, kind) in [(TAG_EXIF_IFD, IfdKind::Exif), (TAG_GPS_IFD, IfdKind::Gps)] {
            let Some(offset) = root.entry(tag).and_then(|e| e.u32_value(byte_order)) else {
                continue;
            };
            directories.push(index_directory(&blob, byte_order, kind, offset)?);
        }
        directories.insert(0, root);

        tracing::debug!(
            ?byte_order,
            directories = directories.len(),
            blob_len = blob.len(),
            "indexed EXIF blob"
        );
        Ok(Self {
            byte_order,
            blob,
            directories,
        })
    }
}

impl ExifData {
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The raw TIFF blob, starting at the byte-order mark.
    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn directory(&self, kind: IfdKind) -> Option<&Ifd> {
        self.directories.iter().find(|d| d.kind == kind)
    }

    /// Finds a tag record in the given directory.
    pub fn entry(&self, kind: IfdKind, tag: u16) -> Option<&IfdEntry> {
        self.directory(kind)?.entry(tag)
    }
}

fn index_directory(blob: &[u8], order: ByteOrder, kind: IfdKind, offset: u32) -> Result<Ifd> {
    let start = offset as usize;
    let count_bytes = blob
        .get(start..start + 2)
        .ok_or(Error::InvalidExifDirectory)?;
    let count = order.u16(count_bytes.try_into().unwrap()) as usize;

    let table = blob
        .get(start + 2..start + 2 + count * 12)
        .ok_or(Error::InvalidExifDirectory)?;
    let entries = table
        .chunks_exact(12)
        .map(|record| IfdEntry {
            tag: order.u16(record[0..2].try_into().unwrap()),
            field_type: order.u16(record[2..4].try_into().unwrap()),
            count: order.u32(record[4..8].try_into().unwrap()),
            payload: record[8..12].try_into().unwrap(),
        })
        .collect();

    Ok(Ifd {
        kind,
        offset,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u16(out: &mut Vec<u8>, order: ByteOrder, v: u16) {
        match order {
            ByteOrder::LittleEndian => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::BigEndian => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn push_u32(out: &mut Vec<u8>, order: ByteOrder, v: u32) {
        match order {
            ByteOrder::LittleEndian => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::BigEndian => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    /// Builds an APP1 body: root IFD with an orientation tag and an EXIF
    /// sub-IFD pointer, and the linked sub-IFD with one entry.
    fn sample_body(order: ByteOrder) -> Vec<u8> {
        let mut body = EXIF_SIGNATURE.to_vec();
        let mut blob = Vec::new();
        blob.extend_from_slice(match order {
            ByteOrder::LittleEndian => &BYTE_ORDER_LE,
            ByteOrder::BigEndian => &BYTE_ORDER_BE,
        });
        push_u32(&mut blob, order, 8); // root IFD directly after the header

        // Root IFD: 2 entries.
        push_u16(&mut blob, order, 2);
        // Orientation (tag 274), SHORT, count 1, value 6.
        push_u16(&mut blob, order, 274);
        push_u16(&mut blob, order, TYPE_SHORT);
        push_u32(&mut blob, order, 1);
        push_u16(&mut blob, order, 6);
        push_u16(&mut blob, order, 0);
        // EXIF IFD pointer, LONG, count 1, offset 38.
        push_u16(&mut blob, order, TAG_EXIF_IFD);
        push_u16(&mut blob, order, TYPE_LONG);
        push_u32(&mut blob, order, 1);
        push_u32(&mut blob, order, 38);
        push_u32(&mut blob, order, 0); // next-IFD link, unused

        assert_eq!(blob.len(), 38);
        // EXIF sub-IFD: 1 entry (ExifVersion, tag 36864).
        push_u16(&mut blob, order, 1);
        push_u16(&mut blob, order, 36864);
        push_u16(&mut blob, order, 7); // UNDEFINED
        push_u32(&mut blob, order, 4);
        blob.extend_from_slice(b"0232");

        body.extend_from_slice(&blob);
        body
    }

    #[test]
    fn indexes_both_endiannesses() {
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            let exif = ExifData::parse_body(&sample_body(order), ()).unwrap();
            assert_eq!(exif.byte_order(), order);

            let orientation = exif.entry(IfdKind::Root, 274).unwrap();
            assert_eq!(orientation.u16_value(order), Some(6));
            assert_eq!(orientation.u32_value(order), None);

            let sub = exif.directory(IfdKind::Exif).unwrap();
            assert_eq!(sub.offset, 38);
            assert_eq!(sub.entries.len(), 1);
            assert_eq!(&sub.entry(36864).unwrap().payload, b"0232");

            assert!(exif.directory(IfdKind::Gps).is_none());
        }
    }

    #[test]
    fn bad_signature() {
        let mut body = sample_body(ByteOrder::LittleEndian);
        body[0] = b'X';
        assert!(matches!(
            ExifData::parse_body(&body, ()),
            Err(Error::InvalidExifSignature)
        ));
    }

    #[test]
    fn bad_byte_order() {
        let mut body = sample_body(ByteOrder::LittleEndian);
        body[6] = 0x4a;
        assert!(matches!(
            ExifData::parse_body(&body, ()),
            Err(Error::InvalidExifByteOrder)
        ));
    }

    #[test]
    fn directory_out_of_bounds() {
        let mut body = EXIF_SIGNATURE.to_vec();
        body.extend_from_slice(&BYTE_ORDER_LE);
        body.extend_from_slice(&4000u32.to_le_bytes());
        assert!(matches!(
            ExifData::parse_body(&body, ()),
            Err(Error::InvalidExifDirectory)
        ));
    }
}
