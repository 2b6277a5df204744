//! HCI parameter codecs (spec.md §4.2) and the unit conversions they share.

pub mod commands;
pub mod time;
