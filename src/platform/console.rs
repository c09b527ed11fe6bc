use crate::monitor::anchor::Anchor;
use crate::monitor::color::OverlayColor;
use crate::monitor::display::{DisplayAdapter, OverlayHandle};
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConsoleOverlayState {
    anchor: Anchor,
    color: OverlayColor,
    text: String,
}

/// Overlay drawn as lines on stdout, for hosts without a desktop surface.
///
/// Only text changes are printed, and nothing is printed while the color is
/// unset.
#[derive(Debug, Default)]
pub struct ConsoleOverlay {
    next_id: u64,
    overlays: HashMap<u64, ConsoleOverlayState>,
    lines_printed: usize,
}

impl ConsoleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_printed(&self) -> usize {
        self.lines_printed
    }

    // Returns whether a line was printed.
    fn render(state: &ConsoleOverlayState) -> bool {
        if state.color.is_unset() || state.text.is_empty() {
            return false;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "[{}] {}", state.anchor, state.text);
        let _ = stdout.flush();
        true
    }
}

impl DisplayAdapter for ConsoleOverlay {
    fn show(&mut self, anchor: Anchor, color: OverlayColor) -> anyhow::Result<OverlayHandle> {
        self.next_id += 1;
        let id = self.next_id;
        self.overlays.insert(
            id,
            ConsoleOverlayState {
                anchor,
                color,
                text: String::new(),
            },
        );
        tracing::info!(id, %anchor, %color, "console overlay shown");
        Ok(OverlayHandle::new(id))
    }

    fn reposition(&mut self, handle: &OverlayHandle, anchor: Anchor) {
        if let Some(state) = self.overlays.get_mut(&handle.id()) {
            state.anchor = anchor;
            if Self::render(state) {
                self.lines_printed += 1;
            }
        }
    }

    fn recolor(&mut self, handle: &OverlayHandle, color: OverlayColor) {
        if let Some(state) = self.overlays.get_mut(&handle.id()) {
            state.color = color;
            tracing::info!(id = handle.id(), %color, "console overlay recolored");
            if Self::render(state) {
                self.lines_printed += 1;
            }
        }
    }

    fn set_text(&mut self, handle: &OverlayHandle, text: &str) {
        let Some(state) = self.overlays.get_mut(&handle.id()) else {
            return;
        };
        if state.text != text {
            state.text = text.to_string();
            if Self::render(state) {
                self.lines_printed += 1;
            }
        }
    }

    fn hide(&mut self, handle: &OverlayHandle) {
        if self.overlays.remove(&handle.id()).is_some() {
            tracing::info!(id = handle.id(), "console overlay hidden");
        }
    }
}
