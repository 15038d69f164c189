// checksum.rs: legacy save-file checksum
//
// Each byte is added into the low byte of the running value (no carry into
// the upper bytes), then the whole value is rotated left by 3.

/// Initial checksum value.
#[inline]
pub fn checksum_init() -> u32 {
    0
}

/// Fold a single byte into the checksum.
#[inline]
pub fn checksum_process_byte(checksum: u32, data: u8) -> u32 {
    let low = (checksum as u8).wrapping_add(data);
    ((checksum & 0xFFFF_FF00) | low as u32).rotate_left(3)
}

/// Compute the checksum of an entire block of data.
pub fn checksum_block(data: &[u8]) -> u32 {
    data.iter()
        .fold(checksum_init(), |sum, &b| checksum_process_byte(sum, b))
}
