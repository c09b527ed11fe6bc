use crate::monitor::command::{ConfigCommand, ConfigRequest};
use crate::monitor::controller::MonitorController;
use crate::platform;
use crate::settings_store::JsonSettingsStore;
use anyhow::Context;
use std::io::BufRead;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// How long the owning loop waits for a command before pumping samples.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Drive `controller` from the owning thread until every command sender is
/// gone, then shut it down.
///
/// Each frame applies the queued commands in arrival order, dispatches
/// pending platform events and renders the latest sample.
pub fn run(controller: &mut MonitorController, commands: Receiver<ConfigCommand>, frame: Duration) {
    tracing::debug!(?frame, "overlay runtime started");
    loop {
        match commands.recv_timeout(frame) {
            Ok(command) => {
                controller.apply(command);
                if drain_pending(controller, &commands) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        platform::pump_events();
        controller.pump();
    }
    controller.shutdown();
    tracing::debug!("overlay runtime finished");
}

// Returns true once the channel has disconnected.
fn drain_pending(controller: &mut MonitorController, commands: &Receiver<ConfigCommand>) -> bool {
    loop {
        match commands.try_recv() {
            Ok(command) => controller.apply(command),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => return true,
        }
    }
}

/// Read one JSON request per line from `reader`, persist it into `store` and
/// forward the resulting commands. Blank lines are skipped and malformed ones
/// logged and ignored.
///
/// Returns the number of requests forwarded. Stops early, without error, when
/// the receiving side has gone away.
pub fn forward_requests<R: BufRead>(
    reader: R,
    store: &mut JsonSettingsStore,
    commands: &Sender<ConfigCommand>,
) -> anyhow::Result<usize> {
    let mut forwarded = 0;
    for line in reader.lines() {
        let line = line.context("read overlay config request")?;
        if line.trim().is_empty() {
            continue;
        }

        let request = match ConfigRequest::from_json(&line) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(?err, line = %line, "ignoring malformed config request");
                continue;
            }
        };
        if request.is_empty() {
            tracing::debug!("config request carried no settings");
            continue;
        }

        store.merge_request(&request);
        if let Err(err) = store.save() {
            tracing::warn!(?err, "failed to persist overlay settings");
        }

        for command in request.into_commands() {
            if commands.send(command).is_err() {
                tracing::debug!("overlay runtime gone; no longer reading requests");
                return Ok(forwarded);
            }
        }
        forwarded += 1;
    }
    Ok(forwarded)
}
