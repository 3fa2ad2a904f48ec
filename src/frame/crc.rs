//! Ethernet frame check sequence (CRC-32)
//!
//! Reflected polynomial 0xEDB88320, initial value 0xFFFFFFFF, final
//! one's-complement. The FCS is stored little-endian after the frame, which
//! is the order the bits go out on the wire.
//!
//! The lookup table is generated at compile time so it lands in flash and
//! no initialization call is needed before the first interrupt.

use crate::internal::constants::FCS_SIZE;

/// Reflected IEEE 802.3 polynomial
const CRC32_POLY: u32 = 0xEDB8_8320;

/// Precomputed byte-wise lookup table
const CRC32_TABLE: [u32; 256] = generate_table();

const fn generate_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC32_POLY
            } else {
                crc >> 1
            };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Incremental FCS computation
///
/// Used when a frame is assembled piecewise; [`crc32`] covers the one-shot
/// case.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    /// Start a new computation
    #[must_use]
    pub const fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    /// Feed bytes into the running CRC
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            crc = CRC32_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.state = crc;
    }

    /// Final complemented value
    #[must_use]
    pub const fn finish(&self) -> u32 {
        !self.state
    }
}

/// Compute the FCS of `data`
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finish()
}

/// Append the FCS of `buf[..len]` at `buf[len..len + 4]`
///
/// Returns the total frame length including the FCS, or `None` if `buf`
/// has no room for it.
pub fn append(buf: &mut [u8], len: usize) -> Option<usize> {
    let total = len.checked_add(FCS_SIZE)?;
    if total > buf.len() {
        return None;
    }
    let fcs = crc32(&buf[..len]);
    buf[len..total].copy_from_slice(&fcs.to_le_bytes());
    Some(total)
}

/// Check the trailing FCS of a complete frame
///
/// Frames too short to hold an FCS fail.
#[must_use]
pub fn verify(frame: &[u8]) -> bool {
    let Some(body_len) = frame.len().checked_sub(FCS_SIZE) else {
        return false;
    };
    let (body, fcs) = frame.split_at(body_len);
    crc32(body).to_le_bytes() == fcs
}
