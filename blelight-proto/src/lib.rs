//! BLE light wire protocol - commands, notification framing and state reports
//!
//! Everything travels over a single GATT characteristic. Outbound commands are
//! fixed 12 byte buffers; inbound notifications carry one or more
//! length-prefixed, CRC-16/XMODEM checksummed frames:
//!
//! ```text
//! +----+----+-----+-------+-------+----------+--------+--------+
//! | 4C | 54 | len | 00 20 | cat   | fields.. | crc_hi | crc_lo |
//! +----+----+-----+-------+-------+----------+--------+--------+
//!                 |<---------------- len bytes --------------->|
//! ```

pub mod ble;
mod checksum;
mod command;
mod dispatch;
mod error;
mod frame;
mod report;
mod state;

pub use checksum::{checksum, checksum_parts};
pub use command::{Command, encode, encode_query_all};
pub use dispatch::{apply, apply_buffer};
pub use error::{Condition, ProtocolError};
pub use frame::{Decoded, Frames, Reassembler, decode, encode_frame};
pub use report::{Report, StateReport};
pub use state::{DeviceState, mired_from_temperature_code, temperature_code_from_mired};

// Frame layout
pub const MAGIC: [u8; 2] = [0x4C, 0x54];
pub const REPORT_PREFIX: [u8; 2] = [0x00, 0x20];
pub const FRAME_HEADER_LEN: usize = 3;
pub const CHECKSUM_LEN: usize = 2;
/// checksum + report prefix + category byte
pub const MIN_FRAME_LEN: u8 = 5;
pub const MAX_FRAME_SIZE: usize = FRAME_HEADER_LEN + u8::MAX as usize;

// Outbound commands
pub const COMMAND_LEN: usize = 12;
pub const COMMAND_HEADER: [u8; 10] = [0x4C, 0x54, 0x09, 0x00, 0x20, 0x57, 0x00, 0x00, 0x01, 0x00];
pub const QUERY_ALL_HEADER: [u8; 10] = [0x4C, 0x54, 0x09, 0x00, 0x00, 0x53, 0x00, 0x00, 0x01, 0x00];
pub const SUBCOMMAND_OFFSET: usize = 7;
pub const VALUE_OFFSET: usize = 9;

// Subcommands, shared with the field keys of single-field reports
pub const SUB_POWER: u8 = 0x00;
pub const SUB_BRIGHTNESS: u8 = 0x02;
pub const SUB_TEMPERATURE: u8 = 0x03;

// Report categories
pub const CATEGORY_FIELD: u8 = 0x02;
pub const CATEGORY_SNAPSHOT: u8 = 0x03;

// Value domains
pub const BRIGHTNESS_MAX: i8 = 100;
pub const TEMPERATURE_CODE_MIN: i8 = 32; // 3200K
pub const TEMPERATURE_CODE_MAX: i8 = 56; // 5600K
pub const MIRED_SCALE: u32 = 10_000;

/// Async notification handling for tokio
#[cfg(feature = "async")]
pub mod async_io;
