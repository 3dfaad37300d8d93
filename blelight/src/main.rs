//! Command line control for BLE lights
//!
//! Talks to the lights listed in `$BLELIGHT_HOME/config.json`, and can encode
//! or decode wire bytes offline.

mod confirm;
mod offline;

use std::path::PathBuf;
use std::sync::Arc;

use blelight_controller::ble::{self, Adapter, GattTransport};
use blelight_controller::{Config, DeviceEntry, DeviceState, Light};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

use confirm::Action;
use offline::{Kind, format_hex, format_state};

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(name = "blelight")]
#[command(about = "Control BLE lights")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for lights
    Scan {
        /// Scan duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Print the state a light reports
    Status {
        /// Configured name, or a name/address to look for
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Turn a light on
    On {
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Turn a light off
    Off {
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Set brightness, 0-100
    Brightness {
        value: u8,
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Set color temperature in mireds (179-313)
    Temperature {
        mired: u16,
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Follow every enabled light until Ctrl-C
    Watch,
    /// Print the bytes of a command
    Encode {
        kind: Kind,
        value: Option<i32>,
    },
    /// Explain a captured command or notification
    Decode {
        /// Hex bytes, spaces and colons allowed
        hex: Vec<String>,
    },
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });

    fmt().with_env_filter(filter).with_target(false).init();
}

fn blelight_home() -> Result<PathBuf, BoxError> {
    if let Ok(home) = std::env::var("BLELIGHT_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir().ok_or("could not determine home directory")?;
    Ok(home.join(".blelight"))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Encode { kind, value } => {
            let command = offline::command(kind, value)?;
            println!("{}", format_hex(&command.encode()));
        }
        Commands::Decode { hex } => {
            let bytes = offline::parse_hex(&hex.join(" "))?;
            for line in offline::describe(&bytes) {
                println!("{line}");
            }
        }
        command => {
            let config = Config::load(&blelight_home()?.join("config.json"))?;
            let adapter = ble::get_adapter().await?;
            run(command, adapter, config).await?;
        }
    }

    Ok(())
}

async fn run(command: Commands, adapter: Adapter, config: Config) -> Result<(), BoxError> {
    match command {
        Commands::Scan { duration } => {
            println!("Scanning for lights ({duration} seconds)...");
            let lights = ble::scan(&adapter, std::time::Duration::from_secs(duration)).await?;
            println!("\nFound {} devices:", lights.len());
            for light in lights {
                let rssi = light
                    .rssi
                    .map(|r| format!("{r} dBm"))
                    .unwrap_or_else(|| "N/A".to_string());
                let known = config
                    .find_device(&light.address)
                    .map(|d| format!(" [{}]", d.name))
                    .unwrap_or_default();
                println!("  {} ({}) RSSI: {}{}", light.name, light.address, rssi, known);
            }
        }
        Commands::Status { device } => {
            let entry = resolve_device(&config, device)?;
            let light = ble::open(&adapter, &entry, &config).await?;
            // already changed if the answer to the initial query is in
            wait_for_report(&light, light.subscribe(), &config).await;
            println!("{}: {}", light.name(), format_state(&light.state()));
            disconnect(&light).await;
        }
        Commands::On { device } => control(&adapter, &config, device, Action::Power(true)).await?,
        Commands::Off { device } => control(&adapter, &config, device, Action::Power(false)).await?,
        Commands::Brightness { value, device } => {
            control(&adapter, &config, device, Action::Brightness(value)).await?
        }
        Commands::Temperature { mired, device } => {
            control(&adapter, &config, device, Action::Temperature(mired)).await?
        }
        Commands::Watch => watch_all(adapter, config).await?,
        Commands::Encode { .. } | Commands::Decode { .. } => {}
    }
    Ok(())
}

/// A configured light by name or address, the only enabled one, or an ad hoc target
fn resolve_device(config: &Config, target: Option<String>) -> Result<DeviceEntry, BoxError> {
    match target {
        Some(target) => Ok(config.find_device(&target).cloned().unwrap_or(DeviceEntry {
            name: target.clone(),
            address: target,
            enabled: true,
        })),
        None => {
            let mut enabled = config.enabled_devices();
            match (enabled.next(), enabled.next()) {
                (Some(device), None) => Ok(device.clone()),
                (None, _) => Err("no device configured, pass --device".into()),
                (Some(_), Some(_)) => Err("several devices configured, pass --device".into()),
            }
        }
    }
}

async fn control(
    adapter: &Adapter,
    config: &Config,
    target: Option<String>,
    action: Action,
) -> Result<(), BoxError> {
    let entry = resolve_device(config, target)?;
    let light = ble::open(adapter, &entry, config).await?;
    // let the answer to the startup query land first
    wait_for_report(&light, light.subscribe(), config).await;
    let mut updates = light.subscribe();

    let result = match action {
        Action::Power(on) => light.set_on(on).await,
        Action::Brightness(value) => light.set_brightness(value).await,
        Action::Temperature(mired) => light.set_color_temperature_mired(mired).await,
    };
    if let Err(e) = result {
        disconnect(&light).await;
        return Err(e.into());
    }

    if !confirm::confirmed(&mut updates, action, config.timeout()).await {
        warn!(device = %light.name(), ?action, "light did not confirm, showing last known state");
    }
    println!("{}: {}", light.name(), format_state(&light.state()));
    disconnect(&light).await;
    Ok(())
}

async fn wait_for_report(
    light: &Light<GattTransport>,
    mut updates: watch::Receiver<DeviceState>,
    config: &Config,
) {
    if tokio::time::timeout(config.timeout(), updates.changed()).await.is_err() {
        warn!(device = %light.name(), "no report from the light");
    }
}

async fn disconnect(light: &Light<GattTransport>) {
    if let Err(e) = light.transport().disconnect().await {
        warn!(device = %light.name(), "disconnect failed: {e}");
    }
}

async fn watch_all(adapter: Adapter, config: Config) -> Result<(), BoxError> {
    let config = Arc::new(config);
    let mut tasks = JoinSet::new();

    for entry in config.enabled_devices().cloned() {
        let adapter = adapter.clone();
        let config = config.clone();
        tasks.spawn(async move {
            let light = match ble::open(&adapter, &entry, &config).await {
                Ok(light) => light,
                Err(e) => {
                    warn!(device = %entry.name, "could not open light: {e}");
                    return;
                }
            };
            let mut updates = light.subscribe();
            while updates.changed().await.is_ok() {
                let state = *updates.borrow_and_update();
                info!(device = %light.name(), "{}", format_state(&state));
            }
        });
    }

    if tasks.is_empty() {
        return Err("no enabled devices configured".into());
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("stopping"),
        _ = async { while tasks.join_next().await.is_some() {} } => {
            warn!("every light has gone away");
        }
    }
    tasks.shutdown().await;
    Ok(())
}
