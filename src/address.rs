//! 48-bit Bluetooth device address (`BD_ADDR`).
//!
//! Controllers carry addresses on the wire as 6 bytes, little-endian. Users
//! read and write addresses as big-endian colon-separated hex
//! (`AA:BB:CC:DD:EE:FF`). [`Address`] stores the 48-bit value as a `u64` so
//! that the numeric round trip spec.md §3 requires (string ↔ numeric ↔
//! little-endian bytes) is exact and the invariant "representable in 6
//! bytes" is a type-level fact, not a runtime check.

use crate::error::ParseAddressError;
use std::fmt;
use std::str::FromStr;

const MASK_48: u64 = 0x0000_FFFF_FFFF_FFFF;

/// A 48-bit `BD_ADDR` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address {
    /// Build an address from its numeric value, discarding any bits above 48.
    pub fn from_u64(value: u64) -> Self {
        Address(value & MASK_48)
    }

    /// `const` counterpart of [`Self::from_u64`], for fixed test fixtures.
    pub const fn from_u64_const(value: u64) -> Self {
        Address(value & MASK_48)
    }

    /// The address as a 48-bit numeric value (top 16 bits always zero).
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Build an address from its 6-byte little-endian wire representation.
    pub fn from_le_bytes(bytes: [u8; 6]) -> Self {
        let mut buf = [0u8; 8];
        buf[..6].copy_from_slice(&bytes);
        Address(u64::from_le_bytes(buf))
    }

    /// The 6-byte little-endian wire representation.
    pub fn to_le_bytes(self) -> [u8; 6] {
        let buf = self.0.to_le_bytes();
        [buf[0], buf[1], buf[2], buf[3], buf[4], buf[5]]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_le_bytes();
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            bytes[5], bytes[4], bytes[3], bytes[2], bytes[1], bytes[0]
        )
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(ParseAddressError::InvalidLength(parts.len()));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(ParseAddressError::InvalidPartLength(i));
            }
            bytes[5 - i] = u8::from_str_radix(part, 16)
                .map_err(|_| ParseAddressError::InvalidHex((*part).to_string()))?;
        }

        Ok(Address::from_le_bytes(bytes))
    }
}

impl From<[u8; 6]> for Address {
    fn from(bytes: [u8; 6]) -> Self {
        Address::from_le_bytes(bytes)
    }
}

impl From<Address> for [u8; 6] {
    fn from(address: Address) -> Self {
        address.to_le_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_canonical_form() {
        let addr = Address::from_le_bytes([0xFF, 0xEE, 0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(format!("{addr}"), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_from_str_round_trips_through_le_bytes() {
        let addr: Address = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        assert_eq!(addr.to_le_bytes(), [0xFF, 0xEE, 0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(format!("{addr}"), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        let addr: Address = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(format!("{addr}"), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_numeric_round_trip() {
        let addr = Address::from_u64(0x0102_0304_0506);
        assert_eq!(Address::from_u64(addr.as_u64()), addr);
        assert_eq!(addr.to_le_bytes(), [0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(Address::from_le_bytes(addr.to_le_bytes()), addr);
    }

    #[test]
    fn test_from_u64_masks_to_48_bits() {
        let addr = Address::from_u64(0xFFFF_0000_0000_0000);
        assert_eq!(addr.as_u64(), 0);
    }

    #[test]
    fn test_from_str_rejects_wrong_part_count() {
        assert_eq!(
            "AA:BB:CC".parse::<Address>(),
            Err(ParseAddressError::InvalidLength(3))
        );
    }

    #[test]
    fn test_from_str_rejects_bad_hex() {
        assert!(matches!(
            "AA:BB:CC:DD:EE:GG".parse::<Address>(),
            Err(ParseAddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_from_str_rejects_short_part() {
        assert_eq!(
            "A:BB:CC:DD:EE:FF".parse::<Address>(),
            Err(ParseAddressError::InvalidPartLength(0))
        );
    }
}
