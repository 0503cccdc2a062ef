//! Append-only pcap file writer.
//!
//! A writer owns one open handle for its whole lifetime. Construction either
//! creates the file and writes the global header, or reopens an existing file
//! for append without checking its header. Each record is written header
//! first, then the frame bytes; a failure part way through leaves the
//! truncated record in place.
//!
//! Writers are not synchronized. Callers sharing one across threads must
//! serialize access, and two writers on the same path interleave records.

pub mod error;
mod record;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::format::layout;
use crate::format::{EthernetHeader, GlobalHeader, RecordHeader};
use crate::storage::{FileResource, Opened, StdFileResource, open_or_create};
use error::PcapWriteError;
use record::RecordSink;

/// Result of a single packet write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A record of `bytes` bytes (record header included) was appended.
    Written { bytes: usize },
    /// The raw payload was too short to be a frame; nothing was appended.
    Skipped,
}

/// Counters for the records written by one writer instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriterStats {
    pub records_written: u64,
    pub records_skipped: u64,
    /// Bytes this instance appended, global header included. Bytes of a
    /// record that failed part way are counted too.
    pub bytes_appended: u64,
}

/// Writer for a libpcap file with Ethernet link type.
///
/// # Examples
/// ```no_run
/// use pcapwrite_core::PcapFileWriter;
///
/// let mut writer = PcapFileWriter::create("capture.pcap")?;
/// writer.write_packet_at(1_500_000, &[0u8; 64])?;
/// writer.write_ethernet_packet([0xff; 6], [0x02, 0, 0, 0, 0, 1], 0x0800, &[0x45, 0x00])?;
/// writer.close()?;
/// # Ok::<(), pcapwrite_core::PcapWriteError>(())
/// ```
#[derive(Debug)]
pub struct PcapFileWriter<H: Write = File, C: Clock = SystemClock> {
    handle: H,
    path: PathBuf,
    clock: C,
    created: bool,
    stats: WriterStats,
}

impl PcapFileWriter {
    /// Open `path` on the local filesystem, stamping records with the
    /// system clock.
    ///
    /// # Errors
    /// See [`PcapFileWriter::with_parts`].
    pub fn create(path: impl AsRef<Path>) -> Result<Self, PcapWriteError> {
        Self::with_parts(path, &StdFileResource, SystemClock)
    }
}

impl<H: Write, C: Clock> PcapFileWriter<H, C> {
    /// Open `path` through `resource`, using `clock` for records written
    /// without an explicit timestamp.
    ///
    /// # Errors
    /// `PcapWriteError::Open` when the file cannot be created or reopened,
    /// `PcapWriteError::Write` when the global header cannot be written.
    pub fn with_parts<R>(
        path: impl AsRef<Path>,
        resource: &R,
        clock: C,
    ) -> Result<Self, PcapWriteError>
    where
        R: FileResource<Handle = H>,
    {
        let path = path.as_ref().to_path_buf();
        let Opened { handle, created } = open_or_create(resource, &path)?;
        let mut writer = Self {
            handle,
            path,
            clock,
            created,
            stats: WriterStats::default(),
        };
        if created {
            let header = GlobalHeader::default().to_bytes();
            writer.write_segments(&[&header[..]])?;
        }
        Ok(writer)
    }

    /// Path the writer was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether construction created the file (and wrote its header).
    pub fn was_created(&self) -> bool {
        self.created
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Append a complete frame stamped with the current time.
    ///
    /// Frames of 14 bytes or less are skipped without error.
    pub fn write_packet(&mut self, payload: &[u8]) -> Result<RecordOutcome, PcapWriteError> {
        if payload.len() < layout::MIN_RAW_FRAME_LEN {
            return Ok(self.skip(payload.len()));
        }
        let now = self.clock.now_micros();
        self.write_packet_at(now, payload)
    }

    /// Append a complete frame captured at `timestamp_micros`.
    ///
    /// Frames of 14 bytes or less are skipped without error.
    ///
    /// # Errors
    /// `PcapWriteError::Write` when the record header or the frame cannot be
    /// written in full.
    pub fn write_packet_at(
        &mut self,
        timestamp_micros: u64,
        payload: &[u8],
    ) -> Result<RecordOutcome, PcapWriteError> {
        if payload.len() < layout::MIN_RAW_FRAME_LEN {
            return Ok(self.skip(payload.len()));
        }
        let len = self.record_len(payload.len(), 0)?;
        let header = RecordHeader::new(timestamp_micros, len).to_bytes();
        let bytes = self.write_segments(&[&header[..], payload])?;
        Ok(self.written(bytes))
    }

    /// Append `payload` behind a synthesized Ethernet II header, stamped with
    /// the current time.
    pub fn write_ethernet_packet(
        &mut self,
        destination: [u8; layout::MAC_LEN],
        source: [u8; layout::MAC_LEN],
        ethertype: u16,
        payload: &[u8],
    ) -> Result<RecordOutcome, PcapWriteError> {
        let now = self.clock.now_micros();
        self.write_ethernet_packet_at(now, destination, source, ethertype, payload)
    }

    /// Append `payload` behind a synthesized Ethernet II header.
    ///
    /// There is no length guard: an empty payload yields a 14-byte frame.
    ///
    /// # Errors
    /// `PcapWriteError::Write` when any part of the record cannot be written
    /// in full.
    pub fn write_ethernet_packet_at(
        &mut self,
        timestamp_micros: u64,
        destination: [u8; layout::MAC_LEN],
        source: [u8; layout::MAC_LEN],
        ethertype: u16,
        payload: &[u8],
    ) -> Result<RecordOutcome, PcapWriteError> {
        let len = self.record_len(payload.len(), layout::ETHERNET_HEADER_LEN)?;
        let header = RecordHeader::new(timestamp_micros, len).to_bytes();
        let ethernet = EthernetHeader::new(destination, source, ethertype).to_bytes();
        let (addresses, type_bytes) = ethernet.split_at(2 * layout::MAC_LEN);
        let (dst_bytes, src_bytes) = addresses.split_at(layout::MAC_LEN);
        let bytes =
            self.write_segments(&[&header[..], dst_bytes, src_bytes, type_bytes, payload])?;
        Ok(self.written(bytes))
    }

    /// Flush buffered data in the underlying handle.
    pub fn flush(&mut self) -> Result<(), PcapWriteError> {
        self.handle.flush().map_err(|source| PcapWriteError::Write {
            path: self.path.clone(),
            written: 0,
            source,
        })
    }

    /// Flush and release the file.
    pub fn close(mut self) -> Result<(), PcapWriteError> {
        self.flush()?;
        debug!(
            "closing pcap file {} ({} records, {} bytes appended)",
            self.path.display(),
            self.stats.records_written,
            self.stats.bytes_appended
        );
        Ok(())
    }

    /// Release the writer and return the underlying handle.
    pub fn into_inner(self) -> H {
        self.handle
    }

    fn record_len(&self, payload_len: usize, extra: usize) -> Result<i32, PcapWriteError> {
        payload_len
            .checked_add(extra)
            .and_then(|len| i32::try_from(len).ok())
            .ok_or_else(|| PcapWriteError::FrameTooLarge {
                path: self.path.clone(),
                len: payload_len,
            })
    }

    fn write_segments(&mut self, segments: &[&[u8]]) -> Result<usize, PcapWriteError> {
        let mut sink = RecordSink::new(&mut self.handle);
        for segment in segments {
            if let Err(source) = sink.put(segment) {
                let written = sink.written();
                self.stats.bytes_appended += written as u64;
                warn!(
                    "write to pcap file {} failed after {} bytes of record: {}",
                    self.path.display(),
                    written,
                    source
                );
                return Err(PcapWriteError::Write {
                    path: self.path.clone(),
                    written,
                    source,
                });
            }
        }
        let written = sink.written();
        self.stats.bytes_appended += written as u64;
        Ok(written)
    }

    fn written(&mut self, bytes: usize) -> RecordOutcome {
        self.stats.records_written += 1;
        trace!("appended {} byte record to {}", bytes, self.path.display());
        RecordOutcome::Written { bytes }
    }

    fn skip(&mut self, len: usize) -> RecordOutcome {
        self.stats.records_skipped += 1;
        debug!(
            "skipping {} byte payload for {}: shorter than an Ethernet frame",
            len,
            self.path.display()
        );
        RecordOutcome::Skipped
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{PcapFileWriter, RecordOutcome, WriterStats};
    use crate::clock::FixedClock;
    use crate::format::GlobalHeader;
    use crate::storage::testing::{BudgetHandle, BudgetResource, MemoryResource};
    use crate::writer::error::PcapWriteError;

    fn fresh(clock: u64) -> PcapFileWriter<Vec<u8>, FixedClock> {
        PcapFileWriter::with_parts("test.pcap", &MemoryResource::default(), FixedClock(clock))
            .unwrap()
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn new_file_starts_with_global_header() {
        let writer = fresh(0);
        assert!(writer.was_created());
        let data = writer.into_inner();
        assert_eq!(data, GlobalHeader::default().to_bytes());
    }

    #[test]
    fn existing_file_gets_no_header() {
        let resource = MemoryResource {
            existing: Some(vec![9; 5]),
            ..MemoryResource::default()
        };
        let writer = PcapFileWriter::with_parts("old.pcap", &resource, FixedClock(0)).unwrap();
        assert!(!writer.was_created());
        assert_eq!(writer.stats().bytes_appended, 0);
        assert_eq!(writer.into_inner(), vec![9; 5]);
    }

    #[test]
    fn raw_packet_uses_clock_when_no_timestamp() {
        let mut writer = fresh(3_000_250);
        let outcome = writer.write_packet(&[0xab; 20]).unwrap();
        assert_eq!(outcome, RecordOutcome::Written { bytes: 36 });
        let data = writer.into_inner();
        let record = &data[24..];
        assert_eq!(u32_at(record, 0), 3);
        assert_eq!(u32_at(record, 4), 250);
        assert_eq!(u32_at(record, 8), 20);
        assert_eq!(u32_at(record, 12), 20);
        assert_eq!(&record[16..], &[0xab; 20]);
    }

    #[test]
    fn short_raw_packets_are_skipped() {
        let mut writer = fresh(0);
        for len in [0, 1, 13, 14] {
            let payload = vec![0u8; len];
            assert_eq!(writer.write_packet(&payload).unwrap(), RecordOutcome::Skipped);
            assert_eq!(
                writer.write_packet_at(1, &payload).unwrap(),
                RecordOutcome::Skipped
            );
        }
        assert_eq!(
            writer.stats(),
            WriterStats {
                records_written: 0,
                records_skipped: 8,
                bytes_appended: 24,
            }
        );
        assert_eq!(writer.into_inner().len(), 24);
    }

    #[test]
    fn fifteen_byte_packet_is_written() {
        let mut writer = fresh(0);
        let outcome = writer.write_packet_at(0, &[1u8; 15]).unwrap();
        assert_eq!(outcome, RecordOutcome::Written { bytes: 31 });
    }

    #[test]
    fn ethernet_packet_with_empty_payload() {
        let mut writer = fresh(7);
        let outcome = writer
            .write_ethernet_packet([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12], 0x88b5, &[])
            .unwrap();
        assert_eq!(outcome, RecordOutcome::Written { bytes: 30 });
        let data = writer.into_inner();
        let record = &data[24..];
        assert_eq!(u32_at(record, 4), 7);
        assert_eq!(u32_at(record, 8), 14);
        assert_eq!(u32_at(record, 12), 14);
        assert_eq!(
            &record[16..],
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 0x88, 0xb5]
        );
    }

    #[test]
    fn header_write_failure_fails_construction() {
        let resource = BudgetResource {
            budget: 10,
            ..BudgetResource::default()
        };
        let err = PcapFileWriter::with_parts("full.pcap", &resource, FixedClock(0)).unwrap_err();
        match err {
            PcapWriteError::Write { written, .. } => assert_eq!(written, 10),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mid_record_failure_reports_partial_count() {
        // Global header, record header, destination address, then 3 bytes.
        let resource = BudgetResource {
            budget: 24 + 16 + 6 + 3,
            ..BudgetResource::default()
        };
        let mut writer =
            PcapFileWriter::<BudgetHandle, _>::with_parts("full.pcap", &resource, FixedClock(0))
                .unwrap();
        let err = writer
            .write_ethernet_packet_at(0, [1; 6], [2; 6], 0x0800, &[0u8; 40])
            .unwrap_err();
        match err {
            PcapWriteError::Write { written, source, .. } => {
                assert_eq!(written, 16 + 6 + 3);
                assert_eq!(source.kind(), io::ErrorKind::Other);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(writer.stats().records_written, 0);
        assert_eq!(writer.stats().bytes_appended, 24 + 16 + 6 + 3);
        // No rollback: the truncated record stays.
        assert_eq!(writer.into_inner().data.len(), 24 + 16 + 6 + 3);
    }

    #[test]
    fn short_write_is_a_write_failure() {
        let resource = BudgetResource {
            budget: 24 + 4,
            short: true,
            ..BudgetResource::default()
        };
        let mut writer = PcapFileWriter::with_parts("short.pcap", &resource, FixedClock(0)).unwrap();
        let err = writer.write_packet_at(0, &[0u8; 64]).unwrap_err();
        assert!(err.is_write_failure());
        assert!(err.to_string().contains("short.pcap"));
    }

    #[test]
    fn stats_track_written_records() {
        let mut writer = fresh(0);
        writer.write_packet_at(0, &[0u8; 20]).unwrap();
        writer.write_ethernet_packet_at(0, [0; 6], [0; 6], 0, &[1, 2]).unwrap();
        let stats = writer.stats();
        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.bytes_appended, 24 + 36 + 32);
    }

    #[test]
    fn stats_serialize_to_json() {
        let value = serde_json::to_value(WriterStats::default()).unwrap();
        assert_eq!(value["records_written"], 0);
        assert_eq!(value["bytes_appended"], 0);
    }
}
