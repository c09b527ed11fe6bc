use crate::monitor::query::ForegroundTaskQuery;
use crate::monitor::slot::{Sample, SampleSlot};
use anyhow::{anyhow, Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Delay between two foreground queries.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(300);

const SAMPLER_THREAD_NAME: &str = "foreground-sampler";

/// Background thread polling the foreground task for one monitoring session.
///
/// Cancellation is cooperative: `stop` raises the flag, wakes the sleeping
/// loop through the stop channel and joins the thread. Once `stop` returns
/// nothing will be published into the slot again.
pub struct SamplingWorker {
    cancel: Arc<AtomicBool>,
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
    slot: Arc<SampleSlot>,
}

impl SamplingWorker {
    pub fn spawn(query: Arc<dyn ForegroundTaskQuery>, interval: Duration) -> Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let slot = Arc::new(SampleSlot::new());
        let (stop_tx, stop_rx) = mpsc::channel();

        let join = {
            let cancel = Arc::clone(&cancel);
            let slot = Arc::clone(&slot);
            thread::Builder::new()
                .name(SAMPLER_THREAD_NAME.to_string())
                .spawn(move || sampling_loop(query, slot, cancel, stop_rx, interval))
                .context("spawn foreground sampling thread")?
        };

        Ok(Self {
            cancel,
            stop_tx,
            join: Some(join),
            slot,
        })
    }

    pub fn slot(&self) -> &SampleSlot {
        &self.slot
    }

    pub fn is_stopped(&self) -> bool {
        self.join.is_none()
    }

    /// Request cancellation and wait for the thread to exit. Idempotent.
    pub fn stop(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };

        self.cancel.store(true, Ordering::Release);
        let _ = self.stop_tx.send(());
        if join.join().is_err() {
            tracing::error!("foreground sampling thread panicked");
        }
        self.slot.clear();
    }
}

impl Drop for SamplingWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn sampling_loop(
    query: Arc<dyn ForegroundTaskQuery>,
    slot: Arc<SampleSlot>,
    cancel: Arc<AtomicBool>,
    stop_rx: Receiver<()>,
    interval: Duration,
) {
    tracing::debug!(
        interval_ms = interval.as_millis() as u64,
        "foreground sampler started"
    );

    loop {
        if cancel.load(Ordering::Acquire) {
            break;
        }

        match query_once(query.as_ref()) {
            Ok(Some(task)) if !task.trim().is_empty() => {
                // A stop may have been requested while the query was running.
                if cancel.load(Ordering::Acquire) {
                    break;
                }
                slot.publish(Sample::new(task));
            }
            Ok(_) => tracing::trace!("no foreground task reported; skipping tick"),
            Err(err) => tracing::trace!(?err, "foreground task query failed; skipping tick"),
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::debug!(published = slot.published(), "foreground sampler exited");
}

fn query_once(query: &dyn ForegroundTaskQuery) -> Result<Option<String>> {
    match panic::catch_unwind(AssertUnwindSafe(|| query.current_foreground_task())) {
        Ok(result) => result,
        Err(payload) => {
            let panic_message = if let Some(message) = payload.downcast_ref::<&str>() {
                (*message).to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "unknown panic payload".to_string()
            };
            Err(anyhow!("foreground task query panicked: {panic_message}"))
        }
    }
}
