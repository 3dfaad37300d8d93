//! Protocol errors and recoverable decode conditions

/// Errors from building or parsing outbound commands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Caller must not send anything when this comes back
    #[error("{what} value {value} out of range {min}..={max}")]
    InvalidValue {
        what: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Something that went wrong in one frame or one report of a notification.
///
/// None of these end the stream: the decoder drops the offending frame (or
/// field) and carries on. Integrations that want to treat a class as fatal can
/// match on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Condition {
    #[error("header mismatch at offset {offset}, skipped {skipped} bytes")]
    HeaderMismatch { offset: usize, skipped: usize },

    /// Terminal for the current buffer; the remainder is not a whole frame
    #[error("truncated frame at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedFrame {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("frame at offset {offset} too short (length {length})")]
    FrameTooShort { offset: usize, length: u8 },

    #[error("checksum mismatch at offset {offset}: expected {expected:04X}, got {actual:04X}")]
    ChecksumMismatch {
        offset: usize,
        expected: u16,
        actual: u16,
    },

    #[error("unrecognized report prefix {found:02X?} at offset {offset}")]
    UnrecognizedPrefix { offset: usize, found: [u8; 2] },

    #[error("report category 0x{category:02X} too short ({len} field bytes)")]
    ShortReport { category: u8, len: usize },

    #[error("unrecognized field key 0x{0:02X}")]
    UnrecognizedKey(u8),

    #[error("unrecognized report category 0x{0:02X}")]
    UnrecognizedCategory(u8),

    #[error("invalid temperature code {0}")]
    InvalidTemperatureCode(i8),
}

impl Condition {
    /// Whether the whole frame was lost, as opposed to one report or field
    pub fn drops_frame(&self) -> bool {
        matches!(
            self,
            Condition::HeaderMismatch { .. }
                | Condition::TruncatedFrame { .. }
                | Condition::FrameTooShort { .. }
                | Condition::ChecksumMismatch { .. }
        )
    }
}
