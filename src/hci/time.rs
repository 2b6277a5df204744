//! Millisecond ↔ controller-unit time conversions (spec.md §4.2).
//!
//! Callers always think in milliseconds; the wire always uses whatever unit
//! the Bluetooth Core Specification assigns to that field. Conversion is
//! nearest-integer, half-away-from-zero, and checked against the
//! destination field width so a caller-supplied value never silently wraps.

use crate::error::TimeConversionError;

/// Advertising/scan interval and window: 0.625 ms per unit.
pub const ADV_SCAN_UNIT_MS: f64 = 0.625;
/// Connection interval: 1.25 ms per unit.
pub const CONN_INTERVAL_UNIT_MS: f64 = 1.25;
/// Supervision timeout: 10 ms per unit.
pub const SUPERVISION_TIMEOUT_UNIT_MS: f64 = 10.0;
/// Periodic sync period: 1.28 s (1280 ms) per unit.
pub const PERIODIC_SYNC_UNIT_MS: f64 = 1280.0;

/// Round `value` to the nearest integer, ties away from zero.
fn round_half_away_from_zero(value: f64) -> f64 {
    if value >= 0.0 {
        (value + 0.5).floor()
    } else {
        (value - 0.5).ceil()
    }
}

/// Convert a millisecond duration into the number of `unit_ms`-sized
/// controller units, checked to fit in a `u16` field.
///
/// `ms_to_units(x, 0.625) == round(x / 0.625)` for every finite `x >= 0`
/// (spec.md §8 property 5).
pub fn ms_to_units_u16(ms: f64, unit_ms: f64) -> Result<u16, TimeConversionError> {
    let units = round_half_away_from_zero(ms / unit_ms);
    if units < 0.0 || units > u16::MAX as f64 {
        return Err(TimeConversionError);
    }
    Ok(units as u16)
}

/// Same as [`ms_to_units_u16`] but for fields that are a single byte wide
/// (e.g. the advertising/scan `duration`/`period` fields of some commands
/// are wider, but a few legacy fields are one byte).
pub fn ms_to_units_u8(ms: f64, unit_ms: f64) -> Result<u8, TimeConversionError> {
    let units = round_half_away_from_zero(ms / unit_ms);
    if units < 0.0 || units > u8::MAX as f64 {
        return Err(TimeConversionError);
    }
    Ok(units as u8)
}

/// Convert a controller unit count back into milliseconds.
pub fn units_to_ms(units: u16, unit_ms: f64) -> f64 {
    f64::from(units) * unit_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_units_matches_round_division() {
        assert_eq!(ms_to_units_u16(100.0, ADV_SCAN_UNIT_MS).unwrap(), 160);
        assert_eq!(ms_to_units_u16(0.0, ADV_SCAN_UNIT_MS).unwrap(), 0);
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        // 0.9375 ms / 0.625 = 1.5 -> rounds to 2
        assert_eq!(ms_to_units_u16(0.9375, ADV_SCAN_UNIT_MS).unwrap(), 2);
    }

    #[test]
    fn test_boundary_at_zero_does_not_overflow() {
        assert_eq!(ms_to_units_u16(0.0, CONN_INTERVAL_UNIT_MS).unwrap(), 0);
    }

    #[test]
    fn test_boundary_at_max_u16_does_not_overflow() {
        let max_ms = f64::from(u16::MAX) * SUPERVISION_TIMEOUT_UNIT_MS;
        assert_eq!(
            ms_to_units_u16(max_ms, SUPERVISION_TIMEOUT_UNIT_MS).unwrap(),
            u16::MAX
        );
    }

    #[test]
    fn test_exceeding_the_field_width_is_an_error() {
        let too_large_ms = (f64::from(u16::MAX) + 10.0) * SUPERVISION_TIMEOUT_UNIT_MS;
        assert!(ms_to_units_u16(too_large_ms, SUPERVISION_TIMEOUT_UNIT_MS).is_err());
    }

    #[test]
    fn test_units_to_ms_is_the_inverse_scale() {
        assert_eq!(units_to_ms(160, ADV_SCAN_UNIT_MS), 100.0);
    }
}
