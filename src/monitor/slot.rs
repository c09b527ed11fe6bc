use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// One poll result: the identifier of the foreground task at that tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    task: String,
}

impl Sample {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into() }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn into_task(self) -> String {
        self.task
    }
}

/// Single-slot mailbox between the sampling thread and the owning context.
///
/// Publishing never blocks on the consumer: a newer sample replaces an
/// undelivered one.
#[derive(Debug, Default)]
pub struct SampleSlot {
    latest: Mutex<Option<Sample>>,
    published: AtomicU64,
    overwritten: AtomicU64,
}

impl SampleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an undelivered sample was replaced.
    pub fn publish(&self, sample: Sample) -> bool {
        let replaced = {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            latest.replace(sample).is_some()
        };
        self.published.fetch_add(1, Ordering::Release);
        if replaced {
            self.overwritten.fetch_add(1, Ordering::Relaxed);
        }
        replaced
    }

    pub fn take(&self) -> Option<Sample> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn clear(&self) {
        let _ = self.take();
    }

    pub fn is_empty(&self) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// Samples dropped because a newer one arrived first.
    pub fn overwritten(&self) -> u64 {
        self.overwritten.load(Ordering::Relaxed)
    }
}
