//! `ble-hci-core`: a host-side command engine and wire codecs for the
//! Bluetooth Low Energy Host Controller Interface.
//!
//! This crate owns three tightly coupled layers: the [`engine`] that
//! serialises one outstanding HCI command at a time onto a caller-supplied
//! transport, the [`hci::commands`] codecs that turn typed parameters into
//! the exact byte layout the Bluetooth Core Specification mandates, and the
//! [`att`]/[`adv`] codecs for the protocol layers that ride on top. It does
//! not own a transport, an H4 framing layer, or any CLI surface — callers
//! wire [`engine::CommandEngine`] to whatever byte-oriented channel talks to
//! their controller.

pub mod address;
pub mod adv;
pub mod att;
pub mod bitfield;
pub mod codec;
pub mod engine;
pub mod error;
pub mod hci;
pub mod le_states;
pub mod opcode;
#[cfg(test)]
pub(crate) mod test_support;

pub use address::Address;
pub use codec::HciCommand;
pub use engine::{CommandEngine, Diagnostic};
pub use error::{ExecuteError, HciStatus, ParseAddressError, TimeConversionError};
