use crate::monitor::anchor::Anchor;
use crate::monitor::color::OverlayColor;
use anyhow::anyhow;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Owned reference to a live overlay element.
///
/// Not `Clone`: the controller is the only holder, and the handle is dropped
/// right after [`DisplayAdapter::hide`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct OverlayHandle(u64);

impl OverlayHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Windowing surface used to draw the overlay.
///
/// Implementations are only ever called from the owning context, so they do
/// not need to be `Send`.
pub trait DisplayAdapter {
    fn show(&mut self, anchor: Anchor, color: OverlayColor) -> anyhow::Result<OverlayHandle>;
    fn reposition(&mut self, handle: &OverlayHandle, anchor: Anchor);
    /// [`OverlayColor::UNSET`] leaves the text invisible.
    fn recolor(&mut self, handle: &OverlayHandle, color: OverlayColor);
    fn set_text(&mut self, handle: &OverlayHandle, text: &str);
    /// Must tolerate handles that were already removed.
    fn hide(&mut self, handle: &OverlayHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Show {
        id: u64,
        anchor: Anchor,
        color: OverlayColor,
    },
    Reposition {
        id: u64,
        anchor: Anchor,
    },
    Recolor {
        id: u64,
        color: OverlayColor,
    },
    SetText {
        id: u64,
        text: String,
    },
    Hide {
        id: u64,
    },
}

/// In-memory adapter that records every call. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    state: Arc<RecordingState>,
}

#[derive(Default)]
struct RecordingState {
    calls: Mutex<Vec<DisplayCall>>,
    live: Mutex<HashSet<u64>>,
    next_id: Mutex<u64>,
    fail_next_show: AtomicBool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.state
            .calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    pub fn live_overlays(&self) -> usize {
        self.state.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn show_count(&self) -> usize {
        self.count(|call| matches!(call, DisplayCall::Show { .. }))
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DisplayCall::SetText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Make the next `show` fail, as a platform surface refusing the window would.
    pub fn fail_next_show(&self) {
        self.state.fail_next_show.store(true, Ordering::SeqCst);
    }

    fn count(&self, predicate: impl Fn(&DisplayCall) -> bool) -> usize {
        self.state
            .calls
            .lock()
            .map(|calls| calls.iter().filter(|call| predicate(call)).count())
            .unwrap_or(0)
    }

    fn record(&self, call: DisplayCall) {
        if let Ok(mut calls) = self.state.calls.lock() {
            calls.push(call);
        }
    }
}

impl DisplayAdapter for RecordingDisplay {
    fn show(&mut self, anchor: Anchor, color: OverlayColor) -> anyhow::Result<OverlayHandle> {
        if self.state.fail_next_show.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("overlay surface unavailable"));
        }
        let id = {
            let mut next_id = self
                .state
                .next_id
                .lock()
                .map_err(|_| anyhow!("recording display lock poisoned"))?;
            *next_id += 1;
            *next_id
        };
        if let Ok(mut live) = self.state.live.lock() {
            live.insert(id);
        }
        self.record(DisplayCall::Show { id, anchor, color });
        Ok(OverlayHandle::new(id))
    }

    fn reposition(&mut self, handle: &OverlayHandle, anchor: Anchor) {
        self.record(DisplayCall::Reposition {
            id: handle.id(),
            anchor,
        });
    }

    fn recolor(&mut self, handle: &OverlayHandle, color: OverlayColor) {
        self.record(DisplayCall::Recolor {
            id: handle.id(),
            color,
        });
    }

    fn set_text(&mut self, handle: &OverlayHandle, text: &str) {
        self.record(DisplayCall::SetText {
            id: handle.id(),
            text: text.to_string(),
        });
    }

    fn hide(&mut self, handle: &OverlayHandle) {
        if let Ok(mut live) = self.state.live.lock() {
            live.remove(&handle.id());
        }
        self.record(DisplayCall::Hide { id: handle.id() });
    }
}
