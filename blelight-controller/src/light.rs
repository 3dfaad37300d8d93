//! A connected light: setters write commands, getters read the last reported state

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use blelight_proto::async_io::run_notifications;
use blelight_proto::{Command, DeviceState};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::Error;

/// Where command bytes go. Best effort, no retries, no reply expected.
pub trait Transport: Send + Sync + 'static {
    fn write(&self, data: &[u8]) -> impl Future<Output = Result<(), Error>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct LightOptions {
    /// Send QueryAll this often to pick up changes made elsewhere
    pub poll_interval: Option<Duration>,
    pub carry_over_partial_frames: bool,
}

/// Handle to one light.
///
/// Owns the notification task (the only writer of the state) and the poll
/// task; both stop when the handle is dropped.
pub struct Light<T: Transport> {
    name: String,
    transport: Arc<T>,
    state: watch::Receiver<DeviceState>,
    tasks: Vec<JoinHandle<()>>,
}

impl<T: Transport> Light<T> {
    /// Start handling `notifications` and ask the light for its state
    pub async fn start(
        name: impl Into<String>,
        transport: T,
        notifications: mpsc::Receiver<Vec<u8>>,
        options: LightOptions,
    ) -> Result<Self, Error> {
        let name = name.into();
        let transport = Arc::new(transport);
        let (state_tx, state) = watch::channel(DeviceState::default());

        let mut tasks = vec![tokio::spawn(run_notifications(
            name.clone(),
            notifications,
            state_tx,
            options.carry_over_partial_frames,
        ))];
        if let Some(period) = options.poll_interval {
            tasks.push(tokio::spawn(poll(name.clone(), transport.clone(), period)));
        }

        let light = Self { name, transport, state, tasks };
        light.refresh().await?;
        Ok(light)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn set_on(&self, on: bool) -> Result<(), Error> {
        self.send(Command::power_on(on)).await
    }

    /// 0..=100, anything else is rejected before it reaches the light
    pub async fn set_brightness(&self, brightness: u8) -> Result<(), Error> {
        self.send(Command::brightness(brightness.into())?).await
    }

    /// Clamped to the 3200K..5600K the light supports
    pub async fn set_color_temperature_mired(&self, mired: u16) -> Result<(), Error> {
        self.send(Command::color_temperature_mired(mired)).await
    }

    /// Ask for a full snapshot; the answer arrives as a notification
    pub async fn refresh(&self) -> Result<(), Error> {
        self.send(Command::QueryAll).await
    }

    pub fn on(&self) -> bool {
        self.state.borrow().on
    }

    pub fn brightness(&self) -> u8 {
        self.state.borrow().brightness
    }

    pub fn color_temperature_mired(&self) -> u16 {
        self.state.borrow().color_temperature_mired
    }

    pub fn state(&self) -> DeviceState {
        *self.state.borrow()
    }

    /// Watch state updates; every applied report marks the channel changed
    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.state.clone()
    }

    async fn send(&self, command: Command) -> Result<(), Error> {
        debug!(device = %self.name, ?command, "write");
        self.transport.write(&command.encode()).await
    }
}

impl<T: Transport> Drop for Light<T> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn poll<T: Transport>(name: String, transport: Arc<T>, period: Duration) {
    let query = Command::QueryAll.encode();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick is immediate and start() has already queried
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = transport.write(&query).await {
            warn!(device = %name, "poll failed: {e}");
        }
    }
}
