use super::layout;

/// Reverse the byte order of a 32-bit value.
///
/// The writer always emits host order; this is for consumers reading a file
/// produced on a machine of the other endianness.
///
/// # Examples
/// ```
/// use pcapwrite_core::swap_u32;
///
/// assert_eq!(swap_u32(0xa1b2_c3d4), 0xd4c3_b2a1);
/// ```
pub fn swap_u32(value: u32) -> u32 {
    ((value >> 24) & 0x0000_00ff)
        | ((value >> 8) & 0x0000_ff00)
        | ((value << 8) & 0x00ff_0000)
        | ((value << 24) & 0xff00_0000)
}

/// Check whether a magic word read in host order belongs to a file written
/// with the opposite byte order.
///
/// # Examples
/// ```
/// use pcapwrite_core::is_swapped_magic;
///
/// assert!(is_swapped_magic(0xd4c3_b2a1));
/// assert!(!is_swapped_magic(0xa1b2_c3d4));
/// ```
pub fn is_swapped_magic(magic: u32) -> bool {
    magic == swap_u32(layout::PCAP_MAGIC)
}
