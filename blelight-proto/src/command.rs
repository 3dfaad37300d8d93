//! Outbound commands
//!
//! Every command is the 10 byte header template followed by its checksum:
//!
//! ```text
//! set:       4C 54 09 00 20 57 00 <sub> 01 <value> <crc_hi> <crc_lo>
//! query all: 4C 54 09 00 00 53 00 00    01 00      <crc_hi> <crc_lo>
//! ```

use crate::state::temperature_code_from_mired;
use crate::{
    BRIGHTNESS_MAX, COMMAND_HEADER, COMMAND_LEN, ProtocolError, QUERY_ALL_HEADER, SUB_BRIGHTNESS,
    SUB_POWER, SUB_TEMPERATURE, SUBCOMMAND_OFFSET, TEMPERATURE_CODE_MAX, TEMPERATURE_CODE_MIN,
    VALUE_OFFSET, checksum,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Set one field of the light
    Set { subcommand: u8, value: i8 },
    /// Ask the light for a full snapshot report
    QueryAll,
}

fn in_range(what: &'static str, value: i32, min: i32, max: i32) -> Result<i8, ProtocolError> {
    if (min..=max).contains(&value) {
        // min/max never exceed the i8 range
        Ok(value as i8)
    } else {
        Err(ProtocolError::InvalidValue { what, value, min, max })
    }
}

impl Command {
    /// Raw set command; `value` only has to fit in a signed byte
    pub fn new(subcommand: u8, value: i32) -> Result<Self, ProtocolError> {
        let value = in_range("command", value, i8::MIN as i32, i8::MAX as i32)?;
        Ok(Self::Set { subcommand, value })
    }

    /// Power command, 0 (off) or 1 (on)
    pub fn power(value: i32) -> Result<Self, ProtocolError> {
        let value = in_range("power", value, 0, 1)?;
        Ok(Self::Set { subcommand: SUB_POWER, value })
    }

    pub fn power_on(on: bool) -> Self {
        Self::Set { subcommand: SUB_POWER, value: on as i8 }
    }

    /// Brightness command, 0..=100
    pub fn brightness(value: i32) -> Result<Self, ProtocolError> {
        let value = in_range("brightness", value, 0, BRIGHTNESS_MAX as i32)?;
        Ok(Self::Set { subcommand: SUB_BRIGHTNESS, value })
    }

    /// Color temperature command by protocol code, 32..=56 (3200K..5600K)
    pub fn temperature(code: i32) -> Result<Self, ProtocolError> {
        let value = in_range(
            "temperature code",
            code,
            TEMPERATURE_CODE_MIN as i32,
            TEMPERATURE_CODE_MAX as i32,
        )?;
        Ok(Self::Set { subcommand: SUB_TEMPERATURE, value })
    }

    /// Color temperature command from mireds, clamped to what the light supports
    pub fn color_temperature_mired(mired: u16) -> Self {
        Self::Set {
            subcommand: SUB_TEMPERATURE,
            value: temperature_code_from_mired(mired),
        }
    }

    pub fn encode(&self) -> [u8; COMMAND_LEN] {
        let mut buf = [0u8; COMMAND_LEN];
        match *self {
            Command::Set { subcommand, value } => {
                buf[..10].copy_from_slice(&COMMAND_HEADER);
                buf[SUBCOMMAND_OFFSET] = subcommand;
                buf[VALUE_OFFSET] = value as u8;
            }
            Command::QueryAll => buf[..10].copy_from_slice(&QUERY_ALL_HEADER),
        }
        let crc = checksum(&buf[..10]);
        buf[10..].copy_from_slice(&crc);
        buf
    }

    /// Parse an encoded command back, checking the template and checksum
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() != COMMAND_LEN {
            return Err(ProtocolError::InvalidCommand(format!(
                "expected {COMMAND_LEN} bytes, got {}",
                data.len()
            )));
        }

        let (header, crc) = data.split_at(10);
        if checksum(header) != crc {
            return Err(ProtocolError::InvalidCommand("checksum mismatch".to_string()));
        }

        if header == QUERY_ALL_HEADER {
            return Ok(Command::QueryAll);
        }

        let template_matches = header
            .iter()
            .zip(COMMAND_HEADER.iter())
            .enumerate()
            .all(|(i, (a, b))| i == SUBCOMMAND_OFFSET || i == VALUE_OFFSET || a == b);
        if !template_matches {
            return Err(ProtocolError::InvalidCommand(format!(
                "unknown header {header:02X?}"
            )));
        }

        Ok(Command::Set {
            subcommand: header[SUBCOMMAND_OFFSET],
            value: header[VALUE_OFFSET] as i8,
        })
    }
}

/// Encode a set command for `subcommand`
pub fn encode(subcommand: u8, value: i32) -> Result<[u8; COMMAND_LEN], ProtocolError> {
    Ok(Command::new(subcommand, value)?.encode())
}

pub fn encode_query_all() -> [u8; COMMAND_LEN] {
    Command::QueryAll.encode()
}
