//! End to end: commands out, notifications in, state out

use blelight_proto::{
    Command, Condition, Decoded, DeviceState, SUB_BRIGHTNESS, SUB_POWER, SUB_TEMPERATURE,
    StateReport, apply, apply_buffer, checksum, decode, encode, encode_frame, encode_query_all,
    temperature_code_from_mired,
};

#[test]
fn command_echo_keeps_subcommand_and_value() {
    for (sub, value) in [
        (SUB_POWER, 0),
        (SUB_POWER, 1),
        (SUB_BRIGHTNESS, 0),
        (SUB_BRIGHTNESS, 100),
        (SUB_TEMPERATURE, 32),
        (SUB_TEMPERATURE, 56),
    ] {
        let buf = encode(sub, value).unwrap();
        assert_eq!(buf.len(), 12);
        assert_eq!(buf[7], sub);
        assert_eq!(buf[9] as i8 as i32, value);
        assert_eq!(buf[10..], checksum(&buf[..10]));
    }
}

#[test]
fn query_all_is_fixed() {
    let buf = encode_query_all();
    assert_eq!(buf[..10], [0x4C, 0x54, 0x09, 0x00, 0x00, 0x53, 0x00, 0x00, 0x01, 0x00]);
    assert_eq!(buf[10..], checksum(&buf[..10]));
    assert_eq!(Command::decode(&buf), Ok(Command::QueryAll));
}

#[test]
fn commands_are_valid_frames_too() {
    // the light's command template is itself a frame with an unknown category
    let buf = Command::power_on(true).encode();
    let items: Vec<_> = decode(&buf).collect();
    assert_eq!(items, vec![Decoded::Report(StateReport::new(0x57, &[0x00, 0x00, 0x01, 0x01]))]);

    let (state, conditions) = apply_buffer(&buf, DeviceState::default());
    assert_eq!(state, DeviceState::default());
    assert_eq!(conditions, vec![Condition::UnrecognizedCategory(0x57)]);
}

#[test]
fn two_frames_two_reports() {
    let mut buf = encode_frame(&StateReport::field(SUB_POWER, 1));
    buf.extend(encode_frame(&StateReport::snapshot(0, 3, 20, 32)));

    let reports: Vec<_> = decode(&buf).collect();
    assert_eq!(
        reports,
        vec![
            Decoded::Report(StateReport::field(SUB_POWER, 1)),
            Decoded::Report(StateReport::snapshot(0, 3, 20, 32)),
        ]
    );

    let (state, conditions) = apply_buffer(&buf, DeviceState::default());
    assert!(conditions.is_empty());
    assert_eq!(state, DeviceState { on: false, brightness: 20, color_temperature_mired: 313 });
}

#[test]
fn corrupted_frame_does_not_mutate_state() {
    let mut buf = encode_frame(&StateReport::field(SUB_BRIGHTNESS, 5));
    buf[7] = 6;
    buf.extend(encode_frame(&StateReport::field(SUB_POWER, 1)));

    let (state, conditions) = apply_buffer(&buf, DeviceState::default());
    assert_eq!(state.brightness, 100);
    assert!(state.on);
    assert!(matches!(conditions[..], [Condition::ChecksumMismatch { .. }]));
}

#[test]
fn temperature_round_trip() {
    let (state, _) = apply(&StateReport::field(SUB_TEMPERATURE, 40), DeviceState::default());
    assert_eq!(state.color_temperature_mired, 250);

    let code = temperature_code_from_mired(state.color_temperature_mired);
    assert_eq!(code, 40);
    assert_eq!(
        Command::color_temperature_mired(250),
        Command::Set { subcommand: SUB_TEMPERATURE, value: 40 }
    );
}

#[test]
fn snapshot_regardless_of_unknown() {
    for unknown in [0, 42, -1] {
        let buf = encode_frame(&StateReport::snapshot(1, unknown, 75, 50));
        let (state, conditions) = apply_buffer(&buf, DeviceState::default());
        assert!(conditions.is_empty());
        assert_eq!(state, DeviceState { on: true, brightness: 75, color_temperature_mired: 200 });
    }
}
