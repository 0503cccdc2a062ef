//! pcapwrite core library: writes link-layer frames to libpcap files.
//!
//! The writer owns a single output file. A fresh file receives the 24-byte
//! global header (magic `0xa1b2c3d4`, version 2.2, snaplen `0xffff`, Ethernet
//! link type); an existing file is reopened for append and left as is. Every
//! packet becomes one record: a 16-byte record header followed by the frame.
//!
//! Modules:
//! - `format`: header layouts, Ethernet synthesis and byte-order helpers (no I/O)
//! - `storage`: the file resource and the create-or-append gate
//! - `clock`: time sources for records written without a timestamp
//! - `writer`: `PcapFileWriter` and its errors
//!
//! Invariants:
//! - Exactly one global header per file, at offset 0, in host byte order.
//! - `incl_len == orig_len` for every record; frames are never truncated.
//! - Raw frames of 14 bytes or less are skipped silently; synthesized
//!   Ethernet frames are always written.
//!
//! This crate does not read pcap files back and does not write pcapng.
//!
//! # Examples
//! ```no_run
//! use pcapwrite_core::PcapFileWriter;
//!
//! let mut writer = PcapFileWriter::create("capture.pcap")?;
//! let frame: Vec<u8> = (0u8..64).collect();
//! writer.write_packet_at(1_500_000, &frame)?;
//! # Ok::<(), pcapwrite_core::PcapWriteError>(())
//! ```

mod clock;
mod format;
mod storage;
mod writer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use format::layout;
pub use format::{EthernetHeader, GlobalHeader, RecordHeader, is_swapped_magic, swap_u32};
pub use storage::{FileResource, Opened, StdFileResource, open_or_create};
pub use writer::error::{OpenPhase, PcapWriteError};
pub use writer::{PcapFileWriter, RecordOutcome, WriterStats};
