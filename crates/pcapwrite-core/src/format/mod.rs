//! libpcap container format.
//!
//! - `layout`: sizes and fixed header values (source of truth)
//! - `header`: global and record headers, encoded in host byte order
//! - `ethernet`: Ethernet II header synthesis
//! - `byte_order`: helpers for files written with the other endianness
//!
//! Nothing here performs I/O; the writer owns the file.

pub mod byte_order;
pub mod ethernet;
pub mod header;
pub mod layout;

pub use byte_order::{is_swapped_magic, swap_u32};
pub use ethernet::EthernetHeader;
pub use header::{GlobalHeader, RecordHeader};
