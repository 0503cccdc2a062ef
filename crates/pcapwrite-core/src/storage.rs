//! File resource used by the writer.
//!
//! The header gate is an exclusive create: a fresh file gets the global
//! header, an existing one is reopened for append and left untouched. Only an
//! `AlreadyExists` failure selects the append path, so two writers racing on
//! the same path cannot both write a header.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::writer::error::{OpenPhase, PcapWriteError};

/// Opens handles for the pcap writer.
pub trait FileResource {
    type Handle: Write;

    /// Create `path`, failing with `ErrorKind::AlreadyExists` if it exists.
    fn create_new(&self, path: &Path) -> io::Result<Self::Handle>;

    /// Open `path` for appending, creating it if absent.
    fn open_append(&self, path: &Path) -> io::Result<Self::Handle>;
}

/// Local filesystem backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileResource;

impl FileResource for StdFileResource {
    type Handle = File;

    fn create_new(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new().write(true).create_new(true).open(path)
    }

    fn open_append(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new().append(true).create(true).open(path)
    }
}

/// Handle returned by [`open_or_create`].
#[derive(Debug)]
pub struct Opened<H> {
    pub handle: H,
    /// `true` when the file did not exist and still needs its header.
    pub created: bool,
}

/// Create `path` exclusively, or reopen it for append if it already exists.
///
/// # Errors
/// `PcapWriteError::Open` with [`OpenPhase::Creating`] when creation fails for
/// any reason other than the file existing, or [`OpenPhase::Appending`] when
/// the append reopen fails.
pub fn open_or_create<R: FileResource>(
    resource: &R,
    path: &Path,
) -> Result<Opened<R::Handle>, PcapWriteError> {
    match resource.create_new(path) {
        Ok(handle) => {
            debug!("created pcap file {}", path.display());
            Ok(Opened {
                handle,
                created: true,
            })
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            let handle = resource
                .open_append(path)
                .map_err(|source| PcapWriteError::Open {
                    phase: OpenPhase::Appending,
                    path: path.to_path_buf(),
                    source,
                })?;
            debug!("appending to existing pcap file {}", path.display());
            Ok(Opened {
                handle,
                created: false,
            })
        }
        Err(source) => Err(PcapWriteError::Open {
            phase: OpenPhase::Creating,
            path: path.to_path_buf(),
            source,
        }),
    }
}
