//! Channel-driven notification handling
//!
//! One task per device drains that device's notification buffers in arrival
//! order and publishes the resulting state through a `watch` channel. The task
//! is the only writer; everything else holds a `watch::Receiver`.

use data_encoding::HEXUPPER;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

use crate::{Condition, Decoded, DeviceState, Reassembler, apply, decode};

/// Consume notification buffers until the sender side closes.
///
/// With `carry_over` a frame split across two buffers is reassembled;
/// without it the truncated tail of a buffer is dropped.
pub async fn run_notifications(
    device: String,
    mut notifications: mpsc::Receiver<Vec<u8>>,
    state: watch::Sender<DeviceState>,
    carry_over: bool,
) {
    let mut reassembler = Reassembler::new();

    while let Some(buf) = notifications.recv().await {
        trace!(device = %device, payload = %HEXUPPER.encode(&buf), "notification");

        let items = if carry_over {
            reassembler.feed(&buf)
        } else {
            decode(&buf).collect()
        };

        for item in items {
            match item {
                Decoded::Report(report) => {
                    // always notify: a report confirms the state even if nothing changed
                    state.send_modify(|current| {
                        let (next, condition) = apply(&report, *current);
                        if let Some(condition) = condition {
                            log_condition(&device, &condition);
                        }
                        *current = next;
                    });
                }
                Decoded::Condition(condition) => log_condition(&device, &condition),
            }
        }
    }

    debug!(device = %device, "notification stream closed");
}

fn log_condition(device: &str, condition: &Condition) {
    if condition.drops_frame() {
        warn!(device, "dropped frame: {condition}");
    } else {
        debug!(device, "ignored report: {condition}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StateReport, encode_frame};

    #[tokio::test]
    async fn reports_reach_the_watch_channel() {
        let (tx, rx) = mpsc::channel(8);
        let (state_tx, mut state_rx) = watch::channel(DeviceState::default());
        let task = tokio::spawn(run_notifications("test".to_string(), rx, state_tx, false));

        tx.send(encode_frame(&StateReport::snapshot(1, 0, 75, 50))).await.unwrap();
        state_rx.changed().await.unwrap();
        assert_eq!(
            *state_rx.borrow_and_update(),
            DeviceState { on: true, brightness: 75, color_temperature_mired: 200 }
        );

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn split_frame_needs_carry_over() {
        let frame = encode_frame(&StateReport::field(0x02, 33));

        for carry_over in [false, true] {
            let (tx, rx) = mpsc::channel(8);
            let (state_tx, state_rx) = watch::channel(DeviceState::default());
            let task = tokio::spawn(run_notifications("test".to_string(), rx, state_tx, carry_over));

            tx.send(frame[..4].to_vec()).await.unwrap();
            tx.send(frame[4..].to_vec()).await.unwrap();
            drop(tx);
            task.await.unwrap();

            let expected = if carry_over { 33 } else { 100 };
            assert_eq!(state_rx.borrow().brightness, expected);
        }
    }
}
