//! Advertising Data (AD) parsing (spec.md §4.5).
//!
//! An AD structure is `length(1) | type(1) | data(length - 1)`, repeated
//! until the buffer runs out. [`parse`] is total: it never panics and never
//! returns an error. A record whose declared length overruns the buffer, or
//! whose length is zero, is skipped rather than aborting the rest of the
//! parse — a single corrupt record from a noisy RF environment should not
//! cost every other record in the same report.

use crate::att::Uuid;

/// Decoded fields of one advertising or scan response payload. Every field
/// is optional except the UUID/service-data lists, which are simply empty
/// when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvData {
    pub flags: Option<u8>,
    /// Service class UUIDs from AD types 0x02-0x07, merged and
    /// de-duplicated, preserving first-seen order.
    pub service_uuids: Vec<Uuid>,
    /// Service Solicitation UUIDs from AD types 0x14, 0x15, 0x1F.
    pub solicited_service_uuids: Vec<Uuid>,
    pub local_name: Option<String>,
    pub tx_power_level: Option<i8>,
    pub service_data: Vec<(Uuid, Vec<u8>)>,
    pub manufacturer_specific_data: Vec<(u16, Vec<u8>)>,
}

mod ad_type {
    pub const FLAGS: u8 = 0x01;
    pub const INCOMPLETE_16_BIT_SERVICE_UUIDS: u8 = 0x02;
    pub const COMPLETE_16_BIT_SERVICE_UUIDS: u8 = 0x03;
    pub const INCOMPLETE_32_BIT_SERVICE_UUIDS: u8 = 0x04;
    pub const COMPLETE_32_BIT_SERVICE_UUIDS: u8 = 0x05;
    pub const INCOMPLETE_128_BIT_SERVICE_UUIDS: u8 = 0x06;
    pub const COMPLETE_128_BIT_SERVICE_UUIDS: u8 = 0x07;
    pub const SHORTENED_LOCAL_NAME: u8 = 0x08;
    pub const COMPLETE_LOCAL_NAME: u8 = 0x09;
    pub const TX_POWER_LEVEL: u8 = 0x0A;
    pub const SOLICITATION_16_BIT: u8 = 0x14;
    pub const SOLICITATION_128_BIT: u8 = 0x15;
    pub const SERVICE_DATA_16_BIT: u8 = 0x16;
    pub const SOLICITATION_32_BIT: u8 = 0x1F;
    pub const SERVICE_DATA_32_BIT: u8 = 0x20;
    pub const SERVICE_DATA_128_BIT: u8 = 0x21;
    pub const MANUFACTURER_SPECIFIC_DATA: u8 = 0xFF;
}

/// Split `data` into `(length, type, value)` AD records, skipping a
/// zero-length or overrunning record instead of stopping.
fn records(data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    let mut remaining = data;
    std::iter::from_fn(move || loop {
        if remaining.is_empty() {
            return None;
        }
        let length = remaining[0] as usize;
        if length == 0 {
            remaining = &remaining[1..];
            continue;
        }
        if length > remaining.len() - 1 {
            // record claims more bytes than are left; nothing further in
            // this buffer can be trusted as a record boundary
            remaining = &[];
            continue;
        }
        let record_type = remaining[1];
        let value = &remaining[2..1 + length];
        remaining = &remaining[1 + length..];
        return Some((record_type, value));
    })
}

fn read_uuids_16(value: &[u8], out: &mut Vec<Uuid>) {
    for chunk in value.chunks_exact(2) {
        out.push(Uuid::Short([chunk[0], chunk[1]]));
    }
}

fn read_uuids_32(value: &[u8], out: &mut Vec<Uuid>) {
    // A 32-bit service UUID is itself an alias under the Bluetooth Base
    // UUID; store it expanded to its full 128-bit form so downstream
    // comparisons never need to know which width a UUID originally had.
    for chunk in value.chunks_exact(4) {
        let mut wire = [0u8; 4];
        wire.copy_from_slice(chunk);
        out.push(Uuid::from_32_bit_wire(wire));
    }
}

fn read_uuids_128(value: &[u8], out: &mut Vec<Uuid>) {
    for chunk in value.chunks_exact(16) {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(chunk);
        out.push(Uuid::Full(bytes));
    }
}

fn push_unique(list: &mut Vec<Uuid>, uuid: Uuid) {
    if !list.contains(&uuid) {
        list.push(uuid);
    }
}

fn merge_uuids(list: &mut Vec<Uuid>, parsed: Vec<Uuid>) {
    for uuid in parsed {
        push_unique(list, uuid);
    }
}

/// Parse a buffer of concatenated AD structures into [`AdvData`]. Total:
/// returns a (possibly empty) result for any input, including an empty
/// slice, truncated records, or unrecognized AD types.
pub fn parse(data: &[u8]) -> AdvData {
    let mut result = AdvData::default();
    let mut shortened_name: Option<String> = None;
    let mut complete_name: Option<String> = None;

    for (record_type, value) in records(data) {
        match record_type {
            ad_type::FLAGS => {
                if let Some(&flags) = value.first() {
                    result.flags = Some(flags);
                }
            }
            ad_type::INCOMPLETE_16_BIT_SERVICE_UUIDS | ad_type::COMPLETE_16_BIT_SERVICE_UUIDS => {
                let mut parsed = Vec::new();
                read_uuids_16(value, &mut parsed);
                merge_uuids(&mut result.service_uuids, parsed);
            }
            ad_type::INCOMPLETE_32_BIT_SERVICE_UUIDS | ad_type::COMPLETE_32_BIT_SERVICE_UUIDS => {
                let mut parsed = Vec::new();
                read_uuids_32(value, &mut parsed);
                merge_uuids(&mut result.service_uuids, parsed);
            }
            ad_type::INCOMPLETE_128_BIT_SERVICE_UUIDS
            | ad_type::COMPLETE_128_BIT_SERVICE_UUIDS => {
                let mut parsed = Vec::new();
                read_uuids_128(value, &mut parsed);
                merge_uuids(&mut result.service_uuids, parsed);
            }
            ad_type::SOLICITATION_16_BIT => read_uuids_16(value, &mut result.solicited_service_uuids),
            ad_type::SOLICITATION_32_BIT => read_uuids_32(value, &mut result.solicited_service_uuids),
            ad_type::SOLICITATION_128_BIT => {
                read_uuids_128(value, &mut result.solicited_service_uuids)
            }
            ad_type::SHORTENED_LOCAL_NAME => {
                shortened_name = Some(String::from_utf8_lossy(value).into_owned());
            }
            ad_type::COMPLETE_LOCAL_NAME => {
                complete_name = Some(String::from_utf8_lossy(value).into_owned());
            }
            ad_type::TX_POWER_LEVEL => {
                if let Some(&byte) = value.first() {
                    result.tx_power_level = Some(byte as i8);
                }
            }
            ad_type::SERVICE_DATA_16_BIT => {
                if value.len() >= 2 {
                    let uuid = Uuid::Short([value[0], value[1]]);
                    result.service_data.push((uuid, value[2..].to_vec()));
                }
            }
            ad_type::SERVICE_DATA_32_BIT => {
                if value.len() >= 4 {
                    let mut uuids = Vec::new();
                    read_uuids_32(&value[..4], &mut uuids);
                    if let Some(uuid) = uuids.into_iter().next() {
                        result.service_data.push((uuid, value[4..].to_vec()));
                    }
                }
            }
            ad_type::SERVICE_DATA_128_BIT => {
                if value.len() >= 16 {
                    let mut bytes = [0u8; 16];
                    bytes.copy_from_slice(&value[..16]);
                    result
                        .service_data
                        .push((Uuid::Full(bytes), value[16..].to_vec()));
                }
            }
            ad_type::MANUFACTURER_SPECIFIC_DATA => {
                if value.len() >= 2 {
                    let company_id = u16::from_le_bytes([value[0], value[1]]);
                    result
                        .manufacturer_specific_data
                        .push((company_id, value[2..].to_vec()));
                }
            }
            _ => {
                // Unrecognized AD type: not an error, just nothing this
                // parser extracts a field for.
            }
        }
    }

    // Prefer the complete local name; fall back to the shortened one.
    result.local_name = complete_name.or(shortened_name);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ad_type: u8, value: &[u8]) -> Vec<u8> {
        let mut bytes = vec![(value.len() + 1) as u8, ad_type];
        bytes.extend_from_slice(value);
        bytes
    }

    #[test]
    fn test_parses_flags() {
        let data = record(ad_type::FLAGS, &[0x06]);
        assert_eq!(parse(&data).flags, Some(0x06));
    }

    #[test]
    fn test_parses_complete_local_name_preferring_it_over_shortened() {
        let mut data = record(ad_type::SHORTENED_LOCAL_NAME, b"Rx");
        data.extend(record(ad_type::COMPLETE_LOCAL_NAME, b"Ruuvi Tag"));
        let parsed = parse(&data);
        assert_eq!(parsed.local_name.as_deref(), Some("Ruuvi Tag"));
    }

    #[test]
    fn test_falls_back_to_shortened_name_when_no_complete_name_present() {
        let data = record(ad_type::SHORTENED_LOCAL_NAME, b"Rx");
        assert_eq!(parse(&data).local_name.as_deref(), Some("Rx"));
    }

    #[test]
    fn test_merges_and_dedupes_service_uuids_across_multiple_records() {
        let mut data = record(ad_type::INCOMPLETE_16_BIT_SERVICE_UUIDS, &[0x00, 0x18]);
        data.extend(record(
            ad_type::COMPLETE_16_BIT_SERVICE_UUIDS,
            &[0x00, 0x18, 0x01, 0x18],
        ));
        let parsed = parse(&data);
        assert_eq!(parsed.service_uuids.len(), 2);
        assert_eq!(format!("{}", parsed.service_uuids[0]), "1800");
        assert_eq!(format!("{}", parsed.service_uuids[1]), "1801");
    }

    #[test]
    fn test_parses_tx_power_level_as_signed() {
        let data = record(ad_type::TX_POWER_LEVEL, &[0xF6]); // -10 dBm
        assert_eq!(parse(&data).tx_power_level, Some(-10));
    }

    #[test]
    fn test_parses_manufacturer_specific_data() {
        let data = record(ad_type::MANUFACTURER_SPECIFIC_DATA, &[0x99, 0x04, 0x02, 0x01]);
        let parsed = parse(&data);
        assert_eq!(parsed.manufacturer_specific_data.len(), 1);
        assert_eq!(parsed.manufacturer_specific_data[0].0, 0x0499);
        assert_eq!(parsed.manufacturer_specific_data[0].1, vec![0x02, 0x01]);
    }

    #[test]
    fn test_parses_16_bit_service_data() {
        let data = record(ad_type::SERVICE_DATA_16_BIT, &[0x0A, 0x18, 0x01, 0x02]);
        let parsed = parse(&data);
        assert_eq!(parsed.service_data.len(), 1);
        assert_eq!(format!("{}", parsed.service_data[0].0), "180A");
        assert_eq!(parsed.service_data[0].1, vec![0x01, 0x02]);
    }

    #[test]
    fn test_skips_zero_length_record_without_stopping() {
        let mut data = vec![0x00];
        data.extend(record(ad_type::FLAGS, &[0x01]));
        assert_eq!(parse(&data).flags, Some(0x01));
    }

    #[test]
    fn test_truncates_gracefully_when_a_record_overruns_the_buffer() {
        let mut data = record(ad_type::FLAGS, &[0x01]);
        data.push(0x05); // claims 5 more bytes that don't exist
        data.push(ad_type::COMPLETE_LOCAL_NAME);
        let parsed = parse(&data);
        assert_eq!(parsed.flags, Some(0x01));
        assert_eq!(parsed.local_name, None);
    }

    #[test]
    fn test_unknown_ad_type_is_ignored_without_error() {
        let data = record(0x77, &[0xDE, 0xAD]);
        assert_eq!(parse(&data), AdvData::default());
    }

    #[test]
    fn test_empty_input_parses_to_default() {
        assert_eq!(parse(&[]), AdvData::default());
    }
}
