//! State dispatch: fold decoded reports into a `DeviceState`

use crate::{
    BRIGHTNESS_MAX, Condition, Decoded, DeviceState, Report, SUB_BRIGHTNESS, SUB_POWER,
    SUB_TEMPERATURE, StateReport, decode, mired_from_temperature_code,
};

fn brightness(value: i8) -> u8 {
    value.clamp(0, BRIGHTNESS_MAX) as u8
}

fn with_temperature(mut state: DeviceState, code: i8) -> (DeviceState, Option<Condition>) {
    match mired_from_temperature_code(code) {
        Some(mired) => {
            state.color_temperature_mired = mired;
            (state, None)
        }
        None => (state, Some(Condition::InvalidTemperatureCode(code))),
    }
}

/// Apply one report. Fields a report does not own are never touched; on a
/// condition the returned state carries whatever could still be applied.
pub fn apply(report: &StateReport, state: DeviceState) -> (DeviceState, Option<Condition>) {
    let mut next = state;
    match report.parse() {
        Ok(Report::Field { key, value }) => match key {
            SUB_POWER => {
                next.on = value == 1;
                (next, None)
            }
            SUB_BRIGHTNESS => {
                next.brightness = brightness(value);
                (next, None)
            }
            SUB_TEMPERATURE => with_temperature(next, value),
            other => (state, Some(Condition::UnrecognizedKey(other))),
        },
        Ok(Report::Snapshot { power, unknown: _, brightness: level, temperature_code }) => {
            next.on = power == 1;
            next.brightness = brightness(level);
            with_temperature(next, temperature_code)
        }
        Err(condition) => (state, Some(condition)),
    }
}

/// Decode a whole notification buffer and apply every report in order
pub fn apply_buffer(buf: &[u8], state: DeviceState) -> (DeviceState, Vec<Condition>) {
    let mut conditions = Vec::new();
    let state = decode(buf).fold(state, |state, item| match item {
        Decoded::Report(report) => {
            let (next, condition) = apply(&report, state);
            conditions.extend(condition);
            next
        }
        Decoded::Condition(condition) => {
            conditions.push(condition);
            state
        }
    });
    (state, conditions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_fields() {
        let state = DeviceState::default();

        let (state, c) = apply(&StateReport::field(SUB_POWER, 1), state);
        assert!(state.on);
        assert_eq!(c, None);

        let (state, _) = apply(&StateReport::field(SUB_BRIGHTNESS, 42), state);
        assert_eq!(state.brightness, 42);

        let (state, _) = apply(&StateReport::field(SUB_TEMPERATURE, 40), state);
        assert_eq!(state.color_temperature_mired, 250);

        let (state, _) = apply(&StateReport::field(SUB_POWER, 0), state);
        assert!(!state.on);
        assert_eq!(state.brightness, 42);
        assert_eq!(state.color_temperature_mired, 250);
    }

    #[test]
    fn snapshot_ignores_unknown_byte() {
        for unknown in [0, 1, -128, 127] {
            let (state, c) = apply(&StateReport::snapshot(1, unknown, 75, 50), DeviceState::default());
            assert_eq!(c, None);
            assert_eq!(
                state,
                DeviceState { on: true, brightness: 75, color_temperature_mired: 200 }
            );
        }
    }

    #[test]
    fn unrecognized_key_and_category_leave_state_alone() {
        let state = DeviceState { on: true, brightness: 10, color_temperature_mired: 200 };

        let (next, c) = apply(&StateReport::field(0x07, 1), state);
        assert_eq!(next, state);
        assert_eq!(c, Some(Condition::UnrecognizedKey(0x07)));

        let (next, c) = apply(&StateReport::new(0x09, &[1]), state);
        assert_eq!(next, state);
        assert_eq!(c, Some(Condition::UnrecognizedCategory(0x09)));
    }

    #[test]
    fn zero_temperature_code_keeps_previous_mired() {
        let state = DeviceState::default();
        let (next, c) = apply(&StateReport::field(SUB_TEMPERATURE, 0), state);
        assert_eq!(next, state);
        assert_eq!(c, Some(Condition::InvalidTemperatureCode(0)));

        // the rest of a snapshot still lands
        let (next, c) = apply(&StateReport::snapshot(1, 0, 60, 0), state);
        assert!(next.on);
        assert_eq!(next.brightness, 60);
        assert_eq!(next.color_temperature_mired, state.color_temperature_mired);
        assert_eq!(c, Some(Condition::InvalidTemperatureCode(0)));
    }

    #[test]
    fn brightness_is_clamped() {
        let (state, _) = apply(&StateReport::field(SUB_BRIGHTNESS, 120), DeviceState::default());
        assert_eq!(state.brightness, 100);
        let (state, _) = apply(&StateReport::field(SUB_BRIGHTNESS, -5), state);
        assert_eq!(state.brightness, 0);
    }

    #[test]
    fn apply_buffer_collects_conditions() {
        let buf = [
            // power on
            0x4C, 0x54, 0x07, 0x00, 0x20, 0x02, 0x00, 0x01, 0x4D, 0x78,
            // key 0x07, unrecognized
            0x4C, 0x54, 0x07, 0x00, 0x20, 0x02, 0x07, 0x01, 0xD4, 0xEF,
            // brightness 75 with a corrupted checksum
            0x4C, 0x54, 0x07, 0x00, 0x20, 0x02, 0x02, 0x4B, 0xC2, 0x95,
        ];
        let (state, conditions) = apply_buffer(&buf, DeviceState::default());
        assert!(state.on);
        assert_eq!(state.brightness, 100);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0], Condition::UnrecognizedKey(0x07));
        assert!(matches!(conditions[1], Condition::ChecksumMismatch { offset: 20, .. }));
    }
}
