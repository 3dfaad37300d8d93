//! CRC-16/XMODEM checksum (poly 0x1021, init 0x0000, no reflection, no final xor)

use crc::{CRC_16_XMODEM, Crc};

const CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Checksum of `data`, big-endian as it goes on the wire
pub fn checksum(data: &[u8]) -> [u8; 2] {
    CRC.checksum(data).to_be_bytes()
}

/// Checksum over consecutive slices, same as `checksum` of their concatenation
pub fn checksum_parts(parts: &[&[u8]]) -> [u8; 2] {
    let mut digest = CRC.digest();
    for part in parts {
        digest.update(part);
    }
    digest.finalize().to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xmodem_check_value() {
        assert_eq!(checksum(b"123456789"), [0x31, 0xC3]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(checksum(&[]), [0x00, 0x00]);
    }

    #[test]
    fn order_sensitive() {
        assert_eq!(checksum(b"ab"), checksum(b"ab"));
        assert_eq!(checksum(b"ab"), [0x74, 0xFF]);
        assert_eq!(checksum(b"ba"), [0x11, 0xCF]);
    }

    #[test]
    fn parts_match_concatenation() {
        let whole = checksum(&[0x4C, 0x54, 0x07, 0x00, 0x20, 0x02, 0x00, 0x01]);
        let parts = checksum_parts(&[&[0x4C, 0x54], &[0x07], &[0x00, 0x20, 0x02, 0x00, 0x01]]);
        assert_eq!(whole, parts);
        assert_eq!(whole, [0x4D, 0x78]);
    }
}
