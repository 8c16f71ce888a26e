//! Cyclic redundancy checks, as applied to FIT headers and documents.

use super::Error;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Accumulate a slice of bytes into a cyclic redundancy check value.
///
/// Start from an `init` of zero for a fresh check.
pub fn compute_crc(init: u16, bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(init, |crc, b| crc_nibble(crc_nibble(crc, b & 0xF), b >> 4))
}

/// Accumulate the low four bits of `nibble`.
fn crc_nibble(crc: u16, nibble: u8) -> u16 {
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[(nibble & 0xF) as usize]
}

/// Compare a found CRC value against a calculated one.
pub(crate) fn verify(found: u16, calculated: u16) -> Result<(), Error> {
    if found != calculated {
        Err(Error::ChecksumMismatch { found, calculated })?;
    }

    Ok(())
}
