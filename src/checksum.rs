use crate::{Error, ErrorKind};

/// Reflected CRC-32 (IEEE 802.3) polynomial
pub const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

/// Seed both container chunks are checksummed with
pub const CHECKSUM_SEED: u32 = 0x1234_5678;

/// Computes the CRC-32 of `data`, continuing from `seed`
///
/// A seed of zero yields the standard CRC-32. Feeding a previous result back
/// in as the seed continues that checksum across a split input.
///
/// ```
/// assert_eq!(fbchunks::checksum(0, b"123456789"), 0xCBF4_3926);
/// ```
pub fn checksum(seed: u32, data: &[u8]) -> u32 {
    let mut crc = !seed;
    for &byte in data {
        let mut val = (crc ^ u32::from(byte)) & 0xff;
        for _ in 0..8 {
            val = if val & 1 == 1 {
                (val >> 1) ^ CRC32_POLYNOMIAL
            } else {
                val >> 1
            };
        }
        crc = val ^ (crc >> 8);
    }

    !crc
}

/// Verifies that `stored` is the checksum of `data` under `seed`
pub fn verify_checksum(seed: u32, stored: u32, data: &[u8]) -> Result<(), Error> {
    let computed = checksum(seed, data);
    if computed == stored {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::ChecksumMismatch { stored, computed }))
    }
}
