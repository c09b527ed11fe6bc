mod console;
#[cfg(windows)]
mod win32;

pub use console::ConsoleOverlay;
#[cfg(windows)]
pub use win32::{Win32ForegroundQuery, Win32TextOverlay};

use crate::monitor::display::DisplayAdapter;
use crate::monitor::query::ForegroundTaskQuery;
use anyhow::anyhow;
use std::sync::Arc;

/// Foreground query for platforms we cannot inspect. Every tick is skipped.
#[derive(Debug, Default)]
pub struct UnsupportedForegroundQuery;

impl ForegroundTaskQuery for UnsupportedForegroundQuery {
    fn current_foreground_task(&self) -> anyhow::Result<Option<String>> {
        Err(anyhow!(
            "foreground task query is not supported on this platform"
        ))
    }
}

#[cfg(windows)]
pub fn default_display() -> Box<dyn DisplayAdapter> {
    Box::new(Win32TextOverlay::new())
}

#[cfg(not(windows))]
pub fn default_display() -> Box<dyn DisplayAdapter> {
    Box::new(ConsoleOverlay::new())
}

#[cfg(windows)]
pub fn default_foreground_query() -> Arc<dyn ForegroundTaskQuery> {
    Arc::new(Win32ForegroundQuery::new())
}

#[cfg(not(windows))]
pub fn default_foreground_query() -> Arc<dyn ForegroundTaskQuery> {
    tracing::warn!("foreground task query unavailable; overlay text will stay empty");
    Arc::new(UnsupportedForegroundQuery)
}

/// Dispatch pending window messages for overlays owned by this thread.
pub fn pump_events() {
    #[cfg(windows)]
    win32::pump_messages();
}
