//! Attribute Protocol (ATT) PDU codecs (spec.md §4.4).
//!
//! Decoders here never panic and never propagate a `Result`: a PDU that does
//! not match the expected opcode, or is truncated, decodes to `None`. ATT
//! runs over a connection-oriented channel where a malformed PDU should be
//! logged and dropped, not treated as a protocol-fatal error — there is no
//! `thiserror` type in this module because there is nothing for a caller to
//! recover from beyond "this wasn't that PDU".

mod uuid;

pub use uuid::Uuid;

/// ATT opcodes this crate names. The protocol defines many more PDUs; the
/// ones without a dedicated codec below are listed here so callers can at
/// least recognize and skip them (spec.md §4.4: "reserved but unimplemented").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[non_exhaustive]
pub enum AttOpcode {
    ErrorResponse = 0x01,
    ExchangeMtuRequest = 0x02,
    ExchangeMtuResponse = 0x03,
    FindInformationRequest = 0x04,
    FindInformationResponse = 0x05,
    FindByTypeValueRequest = 0x06,
    FindByTypeValueResponse = 0x07,
    ReadByTypeRequest = 0x08,
    ReadByTypeResponse = 0x09,
    ReadRequest = 0x0A,
    ReadResponse = 0x0B,
    ReadBlobRequest = 0x0C,
    ReadBlobResponse = 0x0D,
    ReadMultipleRequest = 0x0E,
    ReadMultipleResponse = 0x0F,
    ReadByGroupTypeRequest = 0x10,
    ReadByGroupTypeResponse = 0x11,
    WriteRequest = 0x12,
    WriteResponse = 0x13,
    WriteCommand = 0x52,
    HandleValueNotification = 0x1B,
    HandleValueIndication = 0x1D,
    HandleValueConfirmation = 0x1E,
    SignedWriteCommand = 0xD2,
    PrepareWriteRequest = 0x16,
    PrepareWriteResponse = 0x17,
    ExecuteWriteRequest = 0x18,
    ExecuteWriteResponse = 0x19,
}

impl AttOpcode {
    fn from_byte(byte: u8) -> Option<Self> {
        use AttOpcode::*;
        Some(match byte {
            0x01 => ErrorResponse,
            0x02 => ExchangeMtuRequest,
            0x03 => ExchangeMtuResponse,
            0x04 => FindInformationRequest,
            0x05 => FindInformationResponse,
            0x06 => FindByTypeValueRequest,
            0x07 => FindByTypeValueResponse,
            0x08 => ReadByTypeRequest,
            0x09 => ReadByTypeResponse,
            0x0A => ReadRequest,
            0x0B => ReadResponse,
            0x0C => ReadBlobRequest,
            0x0D => ReadBlobResponse,
            0x0E => ReadMultipleRequest,
            0x0F => ReadMultipleResponse,
            0x10 => ReadByGroupTypeRequest,
            0x11 => ReadByGroupTypeResponse,
            0x12 => WriteRequest,
            0x13 => WriteResponse,
            0x52 => WriteCommand,
            0x1B => HandleValueNotification,
            0x1D => HandleValueIndication,
            0x1E => HandleValueConfirmation,
            0xD2 => SignedWriteCommand,
            0x16 => PrepareWriteRequest,
            0x17 => PrepareWriteResponse,
            0x18 => ExecuteWriteRequest,
            0x19 => ExecuteWriteResponse,
            _ => return None,
        })
    }
}

/// `ATT_ERROR_RSP`: opcode(1) | request_opcode(1) | handle(2) | error_code(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    pub request_opcode_in_error: u8,
    pub attribute_handle_in_error: u16,
    pub error_code: u8,
}

impl ErrorResponse {
    pub fn encode(&self) -> Vec<u8> {
        vec![
            AttOpcode::ErrorResponse as u8,
            self.request_opcode_in_error,
            self.attribute_handle_in_error as u8,
            (self.attribute_handle_in_error >> 8) as u8,
            self.error_code,
        ]
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 5 || bytes[0] != AttOpcode::ErrorResponse as u8 {
            return None;
        }
        Some(ErrorResponse {
            request_opcode_in_error: bytes[1],
            attribute_handle_in_error: u16::from_le_bytes([bytes[2], bytes[3]]),
            error_code: bytes[4],
        })
    }
}

/// `ATT_EXCHANGE_MTU_REQ`: opcode(1) | client_rx_mtu(2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeMtuRequest {
    pub client_rx_mtu: u16,
}

impl ExchangeMtuRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mtu = self.client_rx_mtu.to_le_bytes();
        vec![AttOpcode::ExchangeMtuRequest as u8, mtu[0], mtu[1]]
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 3 || bytes[0] != AttOpcode::ExchangeMtuRequest as u8 {
            return None;
        }
        Some(ExchangeMtuRequest {
            client_rx_mtu: u16::from_le_bytes([bytes[1], bytes[2]]),
        })
    }
}

/// `ATT_EXCHANGE_MTU_RSP`: opcode(1) | server_rx_mtu(2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeMtuResponse {
    pub server_rx_mtu: u16,
}

impl ExchangeMtuResponse {
    pub fn encode(&self) -> Vec<u8> {
        let mtu = self.server_rx_mtu.to_le_bytes();
        vec![AttOpcode::ExchangeMtuResponse as u8, mtu[0], mtu[1]]
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 3 || bytes[0] != AttOpcode::ExchangeMtuResponse as u8 {
            return None;
        }
        Some(ExchangeMtuResponse {
            server_rx_mtu: u16::from_le_bytes([bytes[1], bytes[2]]),
        })
    }
}

/// `ATT_FIND_INFORMATION_REQ`: opcode(1) | starting_handle(2) | ending_handle(2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindInformationRequest {
    pub starting_handle: u16,
    pub ending_handle: u16,
}

impl FindInformationRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![AttOpcode::FindInformationRequest as u8];
        buf.extend_from_slice(&self.starting_handle.to_le_bytes());
        buf.extend_from_slice(&self.ending_handle.to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 5 || bytes[0] != AttOpcode::FindInformationRequest as u8 {
            return None;
        }
        Some(FindInformationRequest {
            starting_handle: u16::from_le_bytes([bytes[1], bytes[2]]),
            ending_handle: u16::from_le_bytes([bytes[3], bytes[4]]),
        })
    }
}

/// A single handle/UUID pair within a `ATT_FIND_INFORMATION_RSP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleUuidPair {
    pub handle: u16,
    pub uuid: Uuid,
}

/// `ATT_FIND_INFORMATION_RSP`: opcode(1) | format(1) | pairs...
///
/// Format 1 pairs are `handle(2) | uuid(2)`, stride 4. Format 2 pairs are
/// `handle(2) | uuid(16)`, stride 18. A payload whose length past the format
/// byte is not an exact multiple of its stride is malformed and decodes to
/// `None` rather than silently dropping the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindInformationResponse {
    pub pairs: Vec<HandleUuidPair>,
}

const FORMAT_16_BIT: u8 = 0x01;
const FORMAT_128_BIT: u8 = 0x02;

impl FindInformationResponse {
    /// Encode into format 1 (all `Short` UUIDs) or format 2 (all `Full`
    /// UUIDs). Returns `None` if `pairs` mixes the two lengths, per spec.md
    /// §4.4's "every entry's UUID has the same length" invariant — a mixed
    /// list has no single valid on-wire format and must be rejected, not
    /// coerced by expanding the short ones.
    pub fn encode(&self) -> Option<Vec<u8>> {
        let all_short = self.pairs.iter().all(|p| matches!(p.uuid, Uuid::Short(_)));
        let all_full = self.pairs.iter().all(|p| matches!(p.uuid, Uuid::Full(_)));
        let format = if all_short {
            FORMAT_16_BIT
        } else if all_full {
            FORMAT_128_BIT
        } else {
            return None;
        };

        let mut buf = vec![AttOpcode::FindInformationResponse as u8, format];
        for pair in &self.pairs {
            buf.extend_from_slice(&pair.handle.to_le_bytes());
            match pair.uuid {
                Uuid::Short(bytes) => buf.extend_from_slice(&bytes),
                Uuid::Full(bytes) => buf.extend_from_slice(&bytes),
            }
        }
        Some(buf)
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 2 || bytes[0] != AttOpcode::FindInformationResponse as u8 {
            return None;
        }
        let format = bytes[1];
        let stride = match format {
            FORMAT_16_BIT => 4,
            FORMAT_128_BIT => 18,
            _ => return None,
        };
        let body = &bytes[2..];
        if body.is_empty() || body.len() % stride != 0 {
            return None;
        }

        let pairs = body
            .chunks_exact(stride)
            .map(|chunk| {
                let handle = u16::from_le_bytes([chunk[0], chunk[1]]);
                let uuid = if format == FORMAT_16_BIT {
                    Uuid::Short([chunk[2], chunk[3]])
                } else {
                    let mut uuid_bytes = [0u8; 16];
                    uuid_bytes.copy_from_slice(&chunk[2..18]);
                    Uuid::Full(uuid_bytes)
                };
                HandleUuidPair { handle, uuid }
            })
            .collect();

        Some(FindInformationResponse { pairs })
    }
}
