//! Bluetooth attribute UUIDs: 16-bit aliases and full 128-bit values.
//!
//! Stored exactly as they appear on the wire: little-endian byte order. Users
//! read and write UUIDs as big-endian hex (the canonical
//! `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form), so [`std::fmt::Display`]
//! reverses the bytes the same way [`crate::address::Address`] does.

use std::fmt;

/// The Bluetooth Base UUID (`00000000-0000-1000-8000-00805F9B34FB`), on the
/// wire (little-endian).
const BASE_UUID_WIRE: [u8; 16] = [
    0xFB, 0x34, 0x9B, 0x5F, 0x80, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// A 16-bit or 128-bit attribute UUID, stored in wire (little-endian) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uuid {
    /// A 16-bit alias under the Bluetooth Base UUID, 2 wire bytes.
    Short([u8; 2]),
    /// A full 128-bit UUID, 16 wire bytes.
    Full([u8; 16]),
}

impl Uuid {
    /// Expand a 16-bit alias into its full 128-bit form under the Bluetooth
    /// Base UUID. A no-op (returns `self`) for an already-`Full` value.
    pub fn to_full(self) -> Uuid {
        match self {
            Uuid::Full(_) => self,
            Uuid::Short(short) => {
                let mut bytes = BASE_UUID_WIRE;
                bytes[14] = short[0];
                bytes[15] = short[1];
                Uuid::Full(bytes)
            }
        }
    }

    /// Expand a 32-bit service UUID alias (4 wire bytes, little-endian) into
    /// its full 128-bit form under the Bluetooth Base UUID.
    pub fn from_32_bit_wire(wire: [u8; 4]) -> Uuid {
        let mut bytes = BASE_UUID_WIRE;
        bytes[12..16].copy_from_slice(&wire);
        Uuid::Full(bytes)
    }

    /// The 128-bit wire representation, expanding a short UUID first.
    pub fn to_le_bytes(self) -> [u8; 16] {
        match self.to_full() {
            Uuid::Full(bytes) => bytes,
            Uuid::Short(_) => unreachable!("to_full always returns Full"),
        }
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uuid::Short(bytes) => write!(f, "{:02X}{:02X}", bytes[1], bytes[0]),
            Uuid::Full(bytes) => {
                let mut canonical = *bytes;
                canonical.reverse();
                write!(
                    f,
                    "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
                    canonical[0], canonical[1], canonical[2], canonical[3],
                    canonical[4], canonical[5],
                    canonical[6], canonical[7],
                    canonical[8], canonical[9],
                    canonical[10], canonical[11], canonical[12], canonical[13], canonical[14], canonical[15],
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_display_is_big_endian_four_hex_digits() {
        // 0x1800 on the wire is [0x00, 0x18]
        assert_eq!(format!("{}", Uuid::Short([0x00, 0x18])), "1800");
    }

    #[test]
    fn test_short_expands_to_base_uuid() {
        let full = Uuid::Short([0x00, 0x18]).to_full();
        assert_eq!(format!("{full}"), "00001800-0000-1000-8000-00805f9b34fb".to_uppercase());
    }

    #[test]
    fn test_full_display_round_trips_canonical_form() {
        // 6E400001-B5A3-F393-E0A9-E50E24DCCA9E, wire = reverse of canonical
        let mut wire = [
            0x6E, 0x40, 0x00, 0x01, 0xB5, 0xA3, 0xF3, 0x93, 0xE0, 0xA9, 0xE5, 0x0E, 0x24, 0xDC,
            0xCA, 0x9E,
        ];
        wire.reverse();
        let uuid = Uuid::Full(wire);
        assert_eq!(format!("{uuid}"), "6E400001-B5A3-F393-E0A9-E50E24DCCA9E");
    }

    #[test]
    fn test_to_full_is_a_no_op_for_full_uuids() {
        let uuid = Uuid::Full([1; 16]);
        assert_eq!(uuid.to_full(), uuid);
    }

    #[test]
    fn test_from_32_bit_wire_expands_under_the_base_uuid() {
        // 0x0000110A as a 32-bit alias -> 0000110A-0000-1000-8000-00805F9B34FB
        let uuid = Uuid::from_32_bit_wire([0x0A, 0x11, 0x00, 0x00]);
        assert_eq!(
            format!("{uuid}"),
            "0000110A-0000-1000-8000-00805F9B34FB"
        );
    }
}
