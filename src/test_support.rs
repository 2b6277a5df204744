//! Fixed fixtures shared across this crate's test modules.
//!
//! Mirrors the teacher crate's `test_utils` module: a couple of stable
//! values other `#[cfg(test)]` modules can build on instead of each
//! re-deriving their own.

use crate::address::Address;
use crate::opcode::event_code;

/// A stable address for unit tests.
pub const TEST_ADDRESS: Address = Address::from_u64_const(0xAABB_CCDD_EEFF);

/// Build a raw Command Complete event packet
/// (`event_code | param_len | num_hci_packets | opcode | status | return_params`)
/// the way a transport would hand bytes to [`crate::engine::CommandEngine::handle_event`].
pub fn command_complete_packet(opcode: u16, status: u8, return_parameters: &[u8]) -> Vec<u8> {
    let mut params = Vec::with_capacity(4 + return_parameters.len());
    params.push(1u8);
    params.extend_from_slice(&opcode.to_le_bytes());
    params.push(status);
    params.extend_from_slice(return_parameters);

    let mut packet = Vec::with_capacity(2 + params.len());
    packet.push(event_code::COMMAND_COMPLETE);
    packet.push(params.len() as u8);
    packet.extend_from_slice(&params);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_displays_as_expected() {
        assert_eq!(format!("{TEST_ADDRESS}"), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_command_complete_packet_is_well_formed() {
        let packet = command_complete_packet(0x0C03, 0x00, &[1, 2]);
        assert_eq!(packet[0], event_code::COMMAND_COMPLETE);
        assert_eq!(packet[1] as usize, packet.len() - 2);
    }
}
