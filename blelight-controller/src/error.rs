use std::time::Duration;

use blelight_proto::ProtocolError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),
    #[error("no bluetooth adapter found")]
    NoAdapter,
    #[error("no light matching '{0}' found")]
    DeviceNotFound(String),
    #[error("characteristic {0} not found")]
    CharacteristicNotFound(Uuid),
    #[error("invalid characteristic uuid '{0}'")]
    InvalidUuid(String),
    #[error("timed out connecting after {0:?}")]
    ConnectTimeout(Duration),
    /// For transports other than the BLE one
    #[error("transport error: {0}")]
    Transport(String),
}
