//! BLE GATT constants for the light's command/notification channel
//!
//! The light exposes one characteristic that accepts command writes and emits
//! state notifications. These are the values the common firmware ships with;
//! hosts may override the characteristic per device.

/// Service UUID: 0000ffe0-0000-1000-8000-00805f9b34fb
pub const SERVICE_UUID: &str = "0000ffe0-0000-1000-8000-00805f9b34fb";

/// Command/notification characteristic UUID (write + notify)
pub const CHARACTERISTIC_UUID: &str = "0000ffe1-0000-1000-8000-00805f9b34fb";
