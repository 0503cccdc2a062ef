use pcap_parser::Linktype;

/// Magic number of a microsecond-resolution libpcap file, in host order.
pub const PCAP_MAGIC: u32 = 0xa1b2_c3d4;
pub const VERSION_MAJOR: u16 = 2;
pub const VERSION_MINOR: u16 = 2;
pub const THISZONE: i32 = 0;
pub const SIGFIGS: u32 = 0;
pub const SNAPLEN: u32 = 0xffff;
/// Link-layer type of every record this writer produces.
pub const LINKTYPE: Linktype = Linktype::ETHERNET;

pub const GLOBAL_HEADER_LEN: usize = 24;
pub const RECORD_HEADER_LEN: usize = 16;

pub const MAC_LEN: usize = 6;
pub const ETHERTYPE_LEN: usize = 2;
pub const ETHERNET_HEADER_LEN: usize = MAC_LEN + MAC_LEN + ETHERTYPE_LEN;

/// Raw payloads shorter than this are skipped without error.
pub const MIN_RAW_FRAME_LEN: usize = ETHERNET_HEADER_LEN + 1;

pub const MICROS_PER_SECOND: u64 = 1_000_000;
