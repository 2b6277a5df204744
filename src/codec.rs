//! The `HciCommand` trait: one type per command, pairing its opcode with its
//! parameter encoder and return-parameter decoder (Design Notes §9 of
//! spec.md). Generalising the source's "every command returns a loosely
//! typed byte slice" into a trait lets [`crate::engine::CommandEngine::execute`]
//! be generic over the command and return the decoder's own output type,
//! which statically rules out mismatched encoder/decoder pairs.

use crate::error::ExecuteError;

/// A single HCI command: its opcode, its parameter encoding, and its
/// Command Complete return-parameter decoding.
pub trait HciCommand {
    /// Parameters the caller supplies (`()` for parameterless commands).
    type Params;
    /// Decoded return parameters (`()` for commands with no return
    /// parameters beyond status).
    type Return;

    /// The command's 16-bit opcode (already packed via [`crate::opcode::pack`]).
    const OPCODE: u16;

    /// Encode `params` into the command packet's parameter block.
    ///
    /// Most commands cannot fail to encode; a few (e.g. `LE Set Extended Scan
    /// Parameters` with zero enabled PHYs, spec.md §4.2) reject parameter
    /// combinations the controller would never accept before anything goes
    /// on the wire, with [`ExecuteError::InvalidCommandParameters`].
    fn encode_params(params: &Self::Params) -> Result<Vec<u8>, ExecuteError>;

    /// Decode the return parameters of a successful Command Complete event.
    ///
    /// Must validate the minimum payload length and fail with
    /// [`ExecuteError::InvalidPayloadSize`] rather than read past `bytes`.
    fn decode_return(bytes: &[u8]) -> Result<Self::Return, ExecuteError>;
}

/// Require at least `len` bytes, otherwise fail with `InvalidPayloadSize`.
pub(crate) fn require_len(bytes: &[u8], len: usize) -> Result<(), ExecuteError> {
    if bytes.len() < len {
        Err(ExecuteError::InvalidPayloadSize)
    } else {
        Ok(())
    }
}
