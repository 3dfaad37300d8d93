//! Encode and decode wire bytes without a light

use blelight_proto::{COMMAND_LEN, Command, Decoded, DeviceState, apply, decode};
use data_encoding::{DecodeError, HEXLOWER_PERMISSIVE, HEXUPPER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Kind {
    Power,
    Brightness,
    /// Value is the protocol code, 32..=56
    Temperature,
    Query,
}

/// Hex in either case; spaces and colons between bytes are ignored
pub fn parse_hex(input: &str) -> Result<Vec<u8>, DecodeError> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    HEXLOWER_PERMISSIVE.decode(digits.as_bytes())
}

pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| HEXUPPER.encode(&[*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_state(state: &DeviceState) -> String {
    format!(
        "power={} brightness={} mired={}",
        if state.on { "on" } else { "off" },
        state.brightness,
        state.color_temperature_mired,
    )
}

pub fn command(kind: Kind, value: Option<i32>) -> Result<Command, Box<dyn std::error::Error>> {
    if kind == Kind::Query {
        return Ok(Command::QueryAll);
    }
    let value = value.ok_or("a value is required")?;
    let command = match kind {
        Kind::Power => Command::power(value)?,
        Kind::Brightness => Command::brightness(value)?,
        Kind::Temperature => Command::temperature(value)?,
        Kind::Query => Command::QueryAll,
    };
    Ok(command)
}

/// One line per command, report, condition and the state the buffer leaves behind
pub fn describe(bytes: &[u8]) -> Vec<String> {
    if bytes.len() == COMMAND_LEN
        && let Ok(command) = Command::decode(bytes)
    {
        return vec![format!("command: {command:?}")];
    }

    let mut lines = Vec::new();
    let mut state = DeviceState::default();
    let mut frames = decode(bytes);

    for item in frames.by_ref() {
        match item {
            Decoded::Report(report) => {
                lines.push(format!(
                    "report: category {} [{}]",
                    HEXUPPER.encode(&[report.category]),
                    format_hex(&report.fields)
                ));
                let (next, condition) = apply(&report, state);
                if let Some(condition) = condition {
                    lines.push(format!("condition: {condition}"));
                }
                state = next;
            }
            Decoded::Condition(condition) => lines.push(format!("condition: {condition}")),
        }
    }

    let rest = frames.remainder();
    if !rest.is_empty() {
        lines.push(format!("unparsed: {}", format_hex(rest)));
    }
    lines.push(format!("state: {}", format_state(&state)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_input_is_lenient() {
        assert_eq!(parse_hex("4c54 09").unwrap(), vec![0x4C, 0x54, 0x09]);
        assert_eq!(parse_hex("4C:54:09").unwrap(), vec![0x4C, 0x54, 0x09]);
        assert!(parse_hex("4C5").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn power_on_command() {
        let cmd = command(Kind::Power, Some(1)).unwrap();
        assert_eq!(format_hex(&cmd.encode()), "4C 54 09 00 20 57 00 00 01 01 38 5B");
    }

    #[test]
    fn command_values_are_checked() {
        assert!(command(Kind::Power, None).is_err());
        assert!(command(Kind::Brightness, Some(101)).is_err());
        assert!(command(Kind::Temperature, Some(31)).is_err());
        assert_eq!(command(Kind::Query, None).unwrap(), Command::QueryAll);
    }

    #[test]
    fn describes_commands() {
        let bytes = parse_hex("4C 54 09 00 20 57 00 00 01 01 38 5B").unwrap();
        assert_eq!(
            describe(&bytes),
            vec!["command: Set { subcommand: 0, value: 1 }".to_string()]
        );
    }

    #[test]
    fn describes_snapshot() {
        let bytes = parse_hex("4C 54 09 00 20 03 01 09 4B 32 A8 7D").unwrap();
        let lines = describe(&bytes);
        assert_eq!(lines[0], "report: category 03 [01 09 4B 32]");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("state: power=on brightness=75 mired=200")
        );
    }

    #[test]
    fn describes_truncated_tail() {
        let bytes = parse_hex("4C 54 07 00 20 02 00 01 4D 78 4C 54 09 00").unwrap();
        let lines = describe(&bytes);
        assert!(lines.iter().any(|l| l == "unparsed: 4C 54 09 00"));
        assert!(lines.iter().any(|l| l.starts_with("condition: ")));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("state: power=on brightness=100 mired=250")
        );
    }
}
