use super::layout;

/// File-level header written once at offset 0.
///
/// Encoded in host byte order; readers infer the order from `magic_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalHeader {
    pub magic_number: u32,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT to local correction.
    pub thiszone: i32,
    /// Accuracy of timestamps.
    pub sigfigs: u32,
    pub snaplen: u32,
    /// Link-layer type of every record in the file.
    pub network: u32,
}

impl Default for GlobalHeader {
    fn default() -> Self {
        Self {
            magic_number: layout::PCAP_MAGIC,
            version_major: layout::VERSION_MAJOR,
            version_minor: layout::VERSION_MINOR,
            thiszone: layout::THISZONE,
            sigfigs: layout::SIGFIGS,
            snaplen: layout::SNAPLEN,
            network: layout::LINKTYPE.0 as u32,
        }
    }
}

impl GlobalHeader {
    /// Serialize the header in host byte order.
    ///
    /// # Examples
    /// ```
    /// use pcapwrite_core::GlobalHeader;
    ///
    /// let bytes = GlobalHeader::default().to_bytes();
    /// assert_eq!(&bytes[0..4], &0xa1b2_c3d4u32.to_ne_bytes());
    /// ```
    pub fn to_bytes(&self) -> [u8; layout::GLOBAL_HEADER_LEN] {
        let mut out = [0u8; layout::GLOBAL_HEADER_LEN];
        out[0..4].copy_from_slice(&self.magic_number.to_ne_bytes());
        out[4..6].copy_from_slice(&self.version_major.to_ne_bytes());
        out[6..8].copy_from_slice(&self.version_minor.to_ne_bytes());
        out[8..12].copy_from_slice(&self.thiszone.to_ne_bytes());
        out[12..16].copy_from_slice(&self.sigfigs.to_ne_bytes());
        out[16..20].copy_from_slice(&self.snaplen.to_ne_bytes());
        out[20..24].copy_from_slice(&self.network.to_ne_bytes());
        out
    }
}

/// Per-record header immediately preceding the frame bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub ts_sec: u32,
    pub ts_usec: u32,
    /// Octets following this header in the file.
    pub incl_len: i32,
    /// On-wire length; always equal to `incl_len`.
    pub orig_len: i32,
}

impl RecordHeader {
    /// Build a header for a frame of `len` bytes captured at
    /// `timestamp_micros`.
    ///
    /// Seconds are truncated to 32 bits.
    ///
    /// # Examples
    /// ```
    /// use pcapwrite_core::RecordHeader;
    ///
    /// let header = RecordHeader::new(1_500_000, 64);
    /// assert_eq!((header.ts_sec, header.ts_usec), (1, 500_000));
    /// assert_eq!(header.incl_len, header.orig_len);
    /// ```
    pub fn new(timestamp_micros: u64, len: i32) -> Self {
        Self {
            ts_sec: (timestamp_micros / layout::MICROS_PER_SECOND) as u32,
            ts_usec: (timestamp_micros % layout::MICROS_PER_SECOND) as u32,
            incl_len: len,
            orig_len: len,
        }
    }

    /// Serialize the header in host byte order.
    pub fn to_bytes(&self) -> [u8; layout::RECORD_HEADER_LEN] {
        let mut out = [0u8; layout::RECORD_HEADER_LEN];
        out[0..4].copy_from_slice(&self.ts_sec.to_ne_bytes());
        out[4..8].copy_from_slice(&self.ts_usec.to_ne_bytes());
        out[8..12].copy_from_slice(&self.incl_len.to_ne_bytes());
        out[12..16].copy_from_slice(&self.orig_len.to_ne_bytes());
        out
    }
}
