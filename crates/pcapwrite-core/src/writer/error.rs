use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Step of writer construction that failed to open the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenPhase {
    Creating,
    Appending,
}

impl fmt::Display for OpenPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenPhase::Creating => f.write_str("creating"),
            OpenPhase::Appending => f.write_str("appending to"),
        }
    }
}

/// Errors returned by [`PcapFileWriter`](super::PcapFileWriter).
///
/// # Examples
/// ```
/// use std::io;
/// use std::path::PathBuf;
///
/// use pcapwrite_core::PcapWriteError;
///
/// let err = PcapWriteError::Write {
///     path: PathBuf::from("capture.pcap"),
///     written: 16,
///     source: io::Error::other("disk full"),
/// };
/// assert!(err.is_write_failure());
/// assert!(err.to_string().starts_with("error writing to pcap file capture.pcap"));
/// ```
#[derive(Debug, Error)]
pub enum PcapWriteError {
    #[error("error {phase} pcap file {}: {source}", .path.display())]
    Open {
        phase: OpenPhase,
        path: PathBuf,
        source: io::Error,
    },
    /// `written` counts the bytes of the current record (or of the global
    /// header) that reached the file before the failure.
    #[error(
        "error writing to pcap file {} ({written} bytes of record written): {source}",
        .path.display()
    )]
    Write {
        path: PathBuf,
        written: usize,
        source: io::Error,
    },
    #[error("frame of {len} bytes does not fit a pcap record in {}", .path.display())]
    FrameTooLarge { path: PathBuf, len: usize },
}

impl PcapWriteError {
    /// The file could not be created or reopened; no writer exists.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, PcapWriteError::Open { .. })
    }

    /// A write did not transfer every byte; the file may end with a
    /// truncated record.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, PcapWriteError::Write { .. })
    }

    /// Path of the pcap file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            PcapWriteError::Open { path, .. }
            | PcapWriteError::Write { path, .. }
            | PcapWriteError::FrameTooLarge { path, .. } => path,
        }
    }
}
