//! Waiting for a light to report a change back

use std::time::Duration;

use blelight_controller::DeviceState;
use blelight_proto::{mired_from_temperature_code, temperature_code_from_mired};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Power(bool),
    Brightness(u8),
    Temperature(u16),
}

impl Action {
    /// Whether `state` shows this action applied
    pub fn reflected_in(&self, state: &DeviceState) -> bool {
        match *self {
            Action::Power(on) => state.on == on,
            Action::Brightness(brightness) => state.brightness == brightness,
            // the light reports the clamped code it actually uses
            Action::Temperature(mired) => {
                mired_from_temperature_code(temperature_code_from_mired(mired))
                    == Some(state.color_temperature_mired)
            }
        }
    }
}

/// Wait until the reported state shows `action`.
///
/// Reports that do not show it yet, like a late answer to an earlier query,
/// are skipped. False on timeout or when the light goes away.
pub async fn confirmed(
    updates: &mut watch::Receiver<DeviceState>,
    action: Action,
    timeout: Duration,
) -> bool {
    tokio::time::timeout(timeout, updates.wait_for(|state| action.reflected_in(state)))
        .await
        .is_ok_and(|result| result.is_ok())
}
