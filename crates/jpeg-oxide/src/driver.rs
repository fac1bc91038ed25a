use jpeg_bitstream::{
    ByteSource, EcsBitstream, LexEvent, Marker, MarkerLexer, SliceSource,
};
use jpeg_header::{
    CodingProcess, DhtSegment, DqtSegment, ExifData, FrameHeader, JfifHeader, NumberOfLines,
    QuantTable, RestartInterval, ScanHeader, Segment,
};
use jpeg_huffman::HuffmanTable;

use crate::error::{Error, Result};
use crate::event::{DecodeEvent, Metadata, ScanData};
use crate::scan::{compose_scan, ProgressionTracker};
use crate::tables::TableStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DriverState {
    #[default]
    ExpectSoi,
    ExpectFrame,
    HaveFrame,
    Ended,
}

/// Pull-based JPEG front-end decoder.
///
/// The decoder owns the marker lexer, the four quantization and eight
/// Huffman table slots, the frame header, and the progressive bookkeeping.
/// [`next_event`](Self::next_event) drives the stream forward one
/// downstream event at a time; any error poisons the decoder and releases
/// nothing early, since all state is owned by scope.
pub struct Decoder<S> {
    lexer: MarkerLexer<S>,
    state: DriverState,
    tables: TableStore,
    frame: Option<FrameHeader>,
    tracker: Option<ProgressionTracker>,
    restart_interval: u16,
    scans_completed: usize,
    /// The next marker is the first after the first scan, the only spot a
    /// DNL segment may occupy.
    dnl_window: bool,
    /// Marker event held back by scan reading.
    pending: Option<LexEvent>,
    finished: bool,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Decoder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("lexer", &self.lexer)
            .field("state", &self.state)
            .field("restart_interval", &self.restart_interval)
            .field("scans_completed", &self.scans_completed)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<'buf> Decoder<SliceSource<'buf>> {
    /// Decodes from an in-memory buffer.
    pub fn from_slice(bytes: &'buf [u8]) -> Self {
        Self::new(SliceSource::new(bytes))
    }
}

impl<S: ByteSource> Decoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            lexer: MarkerLexer::new(source),
            state: DriverState::default(),
            tables: TableStore::new(),
            frame: None,
            tracker: None,
            restart_interval: 0,
            scans_completed: 0,
            dnl_window: false,
            pending: None,
            finished: false,
        }
    }

    /// Produces the next downstream event, or `None` once the stream ended
    /// or a previous call failed.
    pub fn next_event(&mut self) -> Result<Option<DecodeEvent>> {
        if self.finished {
            return Ok(None);
        }
        match self.advance() {
            Ok(event) => {
                if matches!(event, DecodeEvent::End) {
                    self.finished = true;
                }
                Ok(Some(event))
            }
            Err(e) => {
                tracing::error!(error = %e, "decode failed");
                self.finished = true;
                Err(e)
            }
        }
    }

    /// The frame header, available from `FrameReady` until the decoder is
    /// dropped. Reflects a DNL height redefinition.
    pub fn frame_header(&self) -> Option<&FrameHeader> {
        self.frame.as_ref()
    }

    /// The currently installed quantization table in a slot.
    pub fn quant_table(&self, slot: u8) -> Option<&QuantTable> {
        self.tables.quant(slot)
    }

    /// The currently installed DC Huffman table in a slot.
    pub fn dc_table(&self, slot: u8) -> Option<&HuffmanTable> {
        self.tables.dc(slot)
    }

    /// The currently installed AC Huffman table in a slot.
    pub fn ac_table(&self, slot: u8) -> Option<&HuffmanTable> {
        self.tables.ac(slot)
    }

    /// The restart interval in MCUs; zero disables restart markers.
    pub fn restart_interval(&self) -> u16 {
        self.restart_interval
    }

    fn advance(&mut self) -> Result<DecodeEvent> {
        loop {
            let event = match self.pending.take() {
                Some(event) => event,
                None => self.lexer.next_event()?,
            };
            let dnl_window = std::mem::take(&mut self.dnl_window);

            // A frame with deferred height must resolve it in the one
            // window the standard allows.
            if dnl_window
                && self.frame.as_ref().is_some_and(|f| f.height == 0)
                && !matches!(event, LexEvent::Segment(Marker::Dnl, _))
            {
                return Err(Error::MissingDnl);
            }

            if self.state == DriverState::ExpectSoi {
                match event {
                    LexEvent::Marker(Marker::Soi) => {
                        tracing::trace!("SOI, stream started");
                        self.state = DriverState::ExpectFrame;
                        continue;
                    }
                    _ => return Err(Error::MissingSoi),
                }
            }

            match event {
                LexEvent::Marker(Marker::Soi) => return Err(Error::DuplicateSoi),
                LexEvent::Marker(Marker::Eoi) => {
                    if self.state != DriverState::HaveFrame {
                        return Err(Error::PrematureEoi);
                    }
                    tracing::trace!("EOI, stream ended");
                    self.state = DriverState::Ended;
                    return Ok(DecodeEvent::End);
                }
                LexEvent::Marker(Marker::Rst(_)) => return Err(Error::UnexpectedRestart),
                LexEvent::Marker(marker) => {
                    unreachable!("standalone marker {marker} cannot reach the driver")
                }
                LexEvent::Ecs(_) => {
                    unreachable!("entropy-coded segment outside a scan")
                }
                LexEvent::Segment(marker, body) => {
                    if let Some(event) = self.handle_segment(marker, body, dnl_window)? {
                        return Ok(event);
                    }
                }
            }
        }
    }

    fn handle_segment(
        &mut self,
        marker: Marker,
        body: Vec<u8>,
        dnl_window: bool,
    ) -> Result<Option<DecodeEvent>> {
        match marker {
            Marker::App(0) => {
                let jfif = JfifHeader::parse_body(&body, ())?;
                Ok(Some(DecodeEvent::Metadata(Metadata::Jfif(jfif))))
            }
            Marker::App(1) => {
                let exif = ExifData::parse_body(&body, ())?;
                Ok(Some(DecodeEvent::Metadata(Metadata::Exif(exif))))
            }
            Marker::App(n) => Ok(Some(DecodeEvent::Metadata(Metadata::App {
                marker: n,
                data: body,
            }))),
            Marker::Com => Ok(Some(DecodeEvent::Metadata(Metadata::Comment(body)))),
            Marker::Dqt => {
                let dqt = DqtSegment::parse_body(&body, ())?;
                for (slot, table) in dqt.tables {
                    self.tables.install_quant(slot, table);
                }
                Ok(None)
            }
            Marker::Dht => {
                let dht = DhtSegment::parse_body(&body, ())?;
                for (class, slot, table) in dht.tables {
                    self.tables.install_huffman(class, slot, table);
                }
                Ok(None)
            }
            Marker::Dri => {
                let RestartInterval(interval) = RestartInterval::parse_body(&body, ())?;
                tracing::debug!(interval, "restart interval");
                self.restart_interval = interval;
                Ok(None)
            }
            Marker::Sof(code) => {
                if self.state == DriverState::HaveFrame {
                    return Err(Error::DuplicateFrame);
                }
                let process = match code {
                    0 => CodingProcess::Baseline,
                    1 => CodingProcess::ExtendedSequential,
                    2 => CodingProcess::Progressive,
                    _ => return Err(Error::UnsupportedCodingProcess(0xc0 | code)),
                };
                let frame = FrameHeader::parse_body(&body, process)?;
                let planes = frame.components.len();
                if !matches!(planes, 1 | 3 | 4) {
                    return Err(Error::UnrecognizedColorFormat(planes));
                }
                self.tracker = process
                    .is_progressive()
                    .then(|| ProgressionTracker::new(planes));
                self.state = DriverState::HaveFrame;
                self.frame = Some(frame.clone());
                Ok(Some(DecodeEvent::FrameReady(frame)))
            }
            Marker::Sos => {
                if self.state != DriverState::HaveFrame {
                    return Err(Error::PrematureSos);
                }
                let frame = self.frame.as_ref().expect("HaveFrame");
                let header = ScanHeader::parse_body(&body, frame.process)?;
                let plan = compose_scan(frame, &header, &self.tables, self.tracker.as_mut())?;
                let data = self.read_scan_data()?;

                self.scans_completed += 1;
                self.dnl_window = self.scans_completed == 1;
                Ok(Some(DecodeEvent::ScanReady(plan, data)))
            }
            Marker::Dnl => {
                let NumberOfLines(height) = NumberOfLines::parse_body(&body, ())?;
                if self.scans_completed == 0 {
                    return Err(Error::PrematureDnl);
                }
                let frame = self.frame.as_mut().expect("scan seen");
                if !dnl_window || frame.height != 0 {
                    return Err(Error::UnexpectedDnl);
                }
                tracing::debug!(height, "DNL redefined frame height");
                frame.redefine_height(height);
                Ok(Some(DecodeEvent::HeightRedefined(height)))
            }
            Marker::Dac | Marker::Dhp | Marker::Exp => {
                Err(Error::UnsupportedCodingProcess(marker.code()))
            }
            Marker::Soi | Marker::Eoi | Marker::Rst(_) => {
                unreachable!("standalone markers carry no segment body")
            }
        }
    }

    /// Reads every entropy-coded segment of the current scan, validating
    /// the restart phase sequence. The marker terminating the scan is held
    /// back for the main loop.
    fn read_scan_data(&mut self) -> Result<ScanData> {
        let mut segments = Vec::new();
        let mut phase = 0u8;
        loop {
            let event = self.lexer.next_event()?;
            let LexEvent::Ecs(bytes) = event else {
                unreachable!("lexer yields an ECS after SOS and RST markers");
            };
            segments.push(EcsBitstream::from_bytes(&bytes));

            match self.lexer.next_event()? {
                LexEvent::Marker(Marker::Rst(found)) => {
                    if self.restart_interval == 0 {
                        return Err(Error::MissingRestartInterval);
                    }
                    if found != phase {
                        return Err(Error::InvalidRestartPhase {
                            expected: phase,
                            found,
                        });
                    }
                    phase = (phase + 1) % 8;
                }
                other => {
                    tracing::trace!(segments = segments.len(), "scan data complete");
                    self.pending = Some(other);
                    return Ok(ScanData::new(segments));
                }
            }
        }
    }
}
