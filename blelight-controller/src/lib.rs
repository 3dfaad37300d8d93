//! BLE light controller
//!
//! Connects to lights over BLE and keeps their state in sync.
//!
//! # Example
//!
//! ```ignore
//! use blelight_controller::{ble, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let adapter = ble::get_adapter().await?;
//!
//!     // Scan for lights
//!     for light in ble::scan(&adapter, config.scan_duration()).await? {
//!         println!("{} ({})", light.name, light.address);
//!     }
//!
//!     // Drive one
//!     let peripheral = ble::find_device(&adapter, "AA:BB", config.scan_duration()).await?;
//!     let (transport, notifications) =
//!         ble::connect(peripheral, &config.characteristic_uuid, config.timeout()).await?;
//!     let light = blelight_controller::Light::start("desk", transport, notifications, config.light_options()).await?;
//!     light.set_on(true).await?;
//!     light.set_brightness(60).await?;
//!     println!("{:?}", light.state());
//!
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod config;
mod error;
mod light;

pub use config::{Config, ConfigError, DeviceEntry};
pub use error::Error;
pub use light::{Light, LightOptions, Transport};

pub use blelight_proto::DeviceState;
