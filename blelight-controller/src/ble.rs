//! BLE transport for lights
//!
//! Scans for lights, connects, subscribes to the command/notification
//! characteristic and forwards its notifications into a channel.

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Manager, Peripheral};
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, DeviceEntry};
use crate::{Error, Light, Transport};

pub use btleplug::platform::Adapter;

/// Notifications buffered between the BLE stack and the decoder
const NOTIFICATION_QUEUE: usize = 32;

/// A light seen during a scan
#[derive(Debug, Clone)]
pub struct DiscoveredLight {
    pub name: String,
    pub address: String,
    pub rssi: Option<i16>,
}

/// Writes commands to the light's characteristic.
///
/// Owns the notification forwarder; it stops when the transport is dropped.
pub struct GattTransport {
    peripheral: Peripheral,
    characteristic: Characteristic,
    forwarder: JoinHandle<()>,
}

impl Transport for GattTransport {
    async fn write(&self, data: &[u8]) -> Result<(), Error> {
        self.peripheral
            .write(&self.characteristic, data, WriteType::WithResponse)
            .await?;
        Ok(())
    }
}

impl GattTransport {
    pub async fn disconnect(&self) -> Result<(), Error> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

impl Drop for GattTransport {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Pass `result` through, dropping the link first if it is an error
async fn or_disconnect<T, D>(result: Result<T, Error>, disconnect: D) -> Result<T, Error>
where
    D: Future<Output = Result<(), btleplug::Error>>,
{
    if result.is_err()
        && let Err(e) = disconnect.await
    {
        debug!("disconnect after failed setup: {e}");
    }
    result
}

fn parse_uuid(s: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(s).map_err(|_| Error::InvalidUuid(s.to_string()))
}

/// Get the default Bluetooth adapter
pub async fn get_adapter() -> Result<Adapter, Error> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters.into_iter().next().ok_or(Error::NoAdapter)
}

/// Scan for BLE devices
pub async fn scan(adapter: &Adapter, duration: Duration) -> Result<Vec<DiscoveredLight>, Error> {
    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(duration).await;

    let peripherals = adapter.peripherals().await?;
    let mut lights = Vec::new();

    for peripheral in peripherals {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_else(|| "Unknown".to_string());
            let address = peripheral.address().to_string();
            lights.push(DiscoveredLight { name, address, rssi: props.rssi });
        }
    }

    adapter.stop_scan().await?;
    Ok(lights)
}

/// Find a light whose address or advertised name contains `target`
pub async fn find_device(
    adapter: &Adapter,
    target: &str,
    duration: Duration,
) -> Result<Peripheral, Error> {
    adapter.start_scan(ScanFilter::default()).await?;
    tokio::time::sleep(duration).await;

    let peripherals = adapter.peripherals().await?;
    let target_lower = target.to_lowercase();

    for peripheral in peripherals {
        if let Some(props) = peripheral.properties().await? {
            let name = props.local_name.unwrap_or_default();
            let addr = peripheral.address().to_string();

            if name.contains(target) || addr.to_lowercase().contains(&target_lower) {
                adapter.stop_scan().await?;
                debug!(name = %name, addr = %addr, "found light");
                return Ok(peripheral);
            }
        }
    }

    adapter.stop_scan().await?;
    Err(Error::DeviceNotFound(target.to_string()))
}

/// Connect, subscribe and start forwarding notifications.
///
/// The returned receiver yields raw notification payloads in arrival order;
/// it closes when the peripheral's notification stream ends.
pub async fn connect(
    peripheral: Peripheral,
    characteristic_uuid: &str,
    timeout: Duration,
) -> Result<(GattTransport, mpsc::Receiver<Vec<u8>>), Error> {
    let uuid = parse_uuid(characteristic_uuid)?;

    let setup = async {
        tokio::time::timeout(timeout, async {
            peripheral.connect().await?;
            peripheral.discover_services().await?;
            Ok::<_, Error>(())
        })
        .await
        .map_err(|_| Error::ConnectTimeout(timeout))??;

        let characteristic = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or(Error::CharacteristicNotFound(uuid))?;

        peripheral.subscribe(&characteristic).await?;
        let stream = peripheral.notifications().await?;
        Ok::<_, Error>((characteristic, stream))
    }
    .await;
    let (characteristic, mut stream) = or_disconnect(setup, peripheral.disconnect()).await?;

    let (tx, rx) = mpsc::channel(NOTIFICATION_QUEUE);
    let address = peripheral.address().to_string();
    let forwarder = tokio::spawn(async move {
        while let Some(notification) = stream.next().await {
            if notification.uuid != uuid {
                continue;
            }
            if tx.send(notification.value).await.is_err() {
                break;
            }
        }
        debug!(address = %address, "notification forwarding ended");
    });

    Ok((GattTransport { peripheral, characteristic, forwarder }, rx))
}

/// Resolve a configured light, connect to it and start its handle
pub async fn open(
    adapter: &Adapter,
    device: &DeviceEntry,
    config: &Config,
) -> Result<Light<GattTransport>, Error> {
    let peripheral = find_device(adapter, &device.address, config.scan_duration()).await?;
    let (transport, notifications) =
        connect(peripheral.clone(), &config.characteristic_uuid, config.timeout()).await?;
    info!(device = %device.name, address = %device.address, "connected");

    let light = Light::start(device.name.clone(), transport, notifications, config.light_options())
        .await
        .inspect_err(|e| warn!(device = %device.name, "initial query failed: {e}"));
    or_disconnect(light, peripheral.disconnect()).await
}
