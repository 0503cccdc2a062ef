use etherparse::{EtherType, Ethernet2Header};

use super::layout;

/// Ethernet II header synthesized around an upper-layer payload.
///
/// # Examples
/// ```
/// use pcapwrite_core::EthernetHeader;
///
/// let header = EthernetHeader::new([0xff; 6], [0x02, 0, 0, 0, 0, 1], 0x0800);
/// let bytes = header.to_bytes();
/// assert_eq!(&bytes[12..14], &[0x08, 0x00]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: [u8; layout::MAC_LEN],
    pub source: [u8; layout::MAC_LEN],
    pub ethertype: u16,
}

impl EthernetHeader {
    pub fn new(
        destination: [u8; layout::MAC_LEN],
        source: [u8; layout::MAC_LEN],
        ethertype: u16,
    ) -> Self {
        Self {
            destination,
            source,
            ethertype,
        }
    }

    /// Destination, source, then the ethertype high byte first.
    pub fn to_bytes(&self) -> [u8; layout::ETHERNET_HEADER_LEN] {
        Ethernet2Header {
            source: self.source,
            destination: self.destination,
            ether_type: EtherType(self.ethertype),
        }
        .to_bytes()
    }
}
