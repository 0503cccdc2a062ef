//! JSON Lines frame descriptions fed to `pcapwrite append`.
//!
//! One object per line:
//! `{"ts_us": 1500000, "data": [0, 1, 2, ...]}` appends a complete frame;
//! adding `"ethernet": {"dst": [...], "src": [...], "ethertype": 2048}` wraps
//! `data` in a synthesized Ethernet II header. `ts_us` is optional.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use pcapwrite_core::{Clock, PcapFileWriter, PcapWriteError, RecordOutcome};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameSpec {
    /// Capture time in microseconds; the system clock is used when absent.
    #[serde(default)]
    pub ts_us: Option<u64>,
    pub data: Vec<u8>,
    #[serde(default)]
    pub ethernet: Option<EthernetSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EthernetSpec {
    pub dst: [u8; 6],
    pub src: [u8; 6],
    pub ethertype: u16,
}

impl FrameSpec {
    pub fn write_to<H: Write, C: Clock>(
        &self,
        writer: &mut PcapFileWriter<H, C>,
    ) -> Result<RecordOutcome, PcapWriteError> {
        match (self.ts_us, self.ethernet) {
            (Some(ts), Some(eth)) => {
                writer.write_ethernet_packet_at(ts, eth.dst, eth.src, eth.ethertype, &self.data)
            }
            (None, Some(eth)) => {
                writer.write_ethernet_packet(eth.dst, eth.src, eth.ethertype, &self.data)
            }
            (Some(ts), None) => writer.write_packet_at(ts, &self.data),
            (None, None) => writer.write_packet(&self.data),
        }
    }
}

/// Parse one line; blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<FrameSpec>, serde_json::Error> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Append every frame read from `reader` to `writer`.
///
/// `label` names the input in error messages. Returns the number of lines
/// that held a frame.
pub fn append_frames<R, H, C>(
    reader: R,
    label: &str,
    writer: &mut PcapFileWriter<H, C>,
) -> Result<u64>
where
    R: BufRead,
    H: Write,
    C: Clock,
{
    let mut frames = 0;
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read {label}:{line_no}"))?;
        let Some(frame) =
            parse_line(&line).with_context(|| format!("invalid frame at {label}:{line_no}"))?
        else {
            continue;
        };
        let outcome = frame
            .write_to(writer)
            .with_context(|| format!("failed to append frame from {label}:{line_no}"))?;
        if outcome == RecordOutcome::Skipped {
            debug!("{label}:{line_no}: frame of {} bytes skipped", frame.data.len());
        }
        frames += 1;
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pcapwrite_core::{FixedClock, PcapFileWriter, StdFileResource};

    use super::{EthernetSpec, FrameSpec, append_frames, parse_line};

    #[test]
    fn parse_raw_frame() {
        let frame = parse_line(r#"{"ts_us": 5, "data": [1, 2, 3]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            frame,
            FrameSpec {
                ts_us: Some(5),
                data: vec![1, 2, 3],
                ethernet: None,
            }
        );
    }

    #[test]
    fn parse_ethernet_frame_without_timestamp() {
        let frame = parse_line(
            r#"{"data": [], "ethernet": {"dst": [1,2,3,4,5,6], "src": [6,5,4,3,2,1], "ethertype": 34525}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(frame.ts_us, None);
        assert_eq!(
            frame.ethernet,
            Some(EthernetSpec {
                dst: [1, 2, 3, 4, 5, 6],
                src: [6, 5, 4, 3, 2, 1],
                ethertype: 0x86dd,
            })
        );
    }

    #[test]
    fn blank_line_is_ignored() {
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(parse_line(r#"{"data": [], "vlan": 5}"#).is_err());
    }

    #[test]
    fn short_mac_is_rejected() {
        let line = r#"{"data": [], "ethernet": {"dst": [1,2,3], "src": [1,2,3,4,5,6], "ethertype": 1}}"#;
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn append_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pcap");
        let mut writer = PcapFileWriter::with_parts(&path, &StdFileResource, FixedClock(0)).unwrap();
        let input = Cursor::new("{\"data\": [1]}\n\nnot json\n");
        let err = append_frames(input, "frames.jsonl", &mut writer).unwrap_err();
        assert!(format!("{err:#}").contains("frames.jsonl:3"));
    }

    #[test]
    fn append_counts_frames_including_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pcap");
        let mut writer = PcapFileWriter::with_parts(&path, &StdFileResource, FixedClock(0)).unwrap();
        let input = Cursor::new(concat!(
            "{\"ts_us\": 1, \"data\": [1, 2]}\n",
            "{\"ts_us\": 2, \"data\": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]}\n",
        ));
        let frames = append_frames(input, "stdin", &mut writer).unwrap();
        assert_eq!(frames, 2);
        assert_eq!(writer.stats().records_written, 1);
        assert_eq!(writer.stats().records_skipped, 1);
    }
}
