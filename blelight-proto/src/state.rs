//! Semantic device state

use serde::{Deserialize, Serialize};

use crate::{MIRED_SCALE, TEMPERATURE_CODE_MAX, TEMPERATURE_CODE_MIN};

/// What the light last told us about itself.
///
/// Only the dispatcher writes it; the accessory side reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub on: bool,
    /// 0..=100
    pub brightness: u8,
    pub color_temperature_mired: u16,
}

impl Default for DeviceState {
    // Before the first report: off, full brightness, 4000K
    fn default() -> Self {
        Self {
            on: false,
            brightness: 100,
            color_temperature_mired: 250,
        }
    }
}

fn div_round(n: u32, d: u32) -> u32 {
    (n + d / 2) / d
}

/// `10000 / code`, rounded. Codes that are zero or negative have no mired value.
pub fn mired_from_temperature_code(code: i8) -> Option<u16> {
    if code <= 0 {
        return None;
    }
    Some(div_round(MIRED_SCALE, code as u32) as u16)
}

/// `10000 / mired`, rounded and clamped to the codes the light accepts
pub fn temperature_code_from_mired(mired: u16) -> i8 {
    if mired == 0 {
        return TEMPERATURE_CODE_MAX;
    }
    let code = div_round(MIRED_SCALE, mired as u32)
        .clamp(TEMPERATURE_CODE_MIN as u32, TEMPERATURE_CODE_MAX as u32);
    code as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mired_conversions() {
        assert_eq!(mired_from_temperature_code(40), Some(250));
        assert_eq!(mired_from_temperature_code(50), Some(200));
        assert_eq!(mired_from_temperature_code(32), Some(313));
        assert_eq!(mired_from_temperature_code(56), Some(179));
        assert_eq!(mired_from_temperature_code(0), None);
        assert_eq!(mired_from_temperature_code(-3), None);
        assert_eq!(temperature_code_from_mired(250), 40);
    }

    #[test]
    fn every_code_survives_a_round_trip() {
        for code in TEMPERATURE_CODE_MIN..=TEMPERATURE_CODE_MAX {
            let mired = mired_from_temperature_code(code).unwrap();
            assert_eq!(temperature_code_from_mired(mired), code, "code {code}");
        }
    }

    #[test]
    fn out_of_range_mireds_clamp() {
        assert_eq!(temperature_code_from_mired(500), TEMPERATURE_CODE_MIN);
        assert_eq!(temperature_code_from_mired(140), TEMPERATURE_CODE_MAX);
        assert_eq!(temperature_code_from_mired(0), TEMPERATURE_CODE_MAX);
    }
}
