use crate::monitor::anchor::Corner;
use crate::monitor::color::{OverlayColor, DEFAULT_TEXT_COLOR};
use crate::monitor::display::OverlayHandle;
use crate::monitor::sampler::SamplingWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorLifecycle {
    Stopped,
    Running,
}

impl MonitorLifecycle {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Resources owned while monitoring is on. Both exist together or not at all.
pub(crate) struct Session {
    pub(crate) overlay: OverlayHandle,
    pub(crate) worker: SamplingWorker,
}

/// Authoritative controller state. Only the owning context touches it.
pub(crate) struct MonitorState {
    pub(crate) location: Corner,
    pub(crate) text_color: OverlayColor,
    pub(crate) session: Option<Session>,
}

impl MonitorState {
    pub(crate) fn lifecycle(&self) -> MonitorLifecycle {
        if self.session.is_some() {
            MonitorLifecycle::Running
        } else {
            MonitorLifecycle::Stopped
        }
    }

    pub(crate) fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            lifecycle: self.lifecycle(),
            location: self.location,
            text_color: self.text_color,
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            location: Corner::TopLeft,
            text_color: DEFAULT_TEXT_COLOR,
            session: None,
        }
    }
}

/// Copyable view of the controller state, for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSnapshot {
    pub lifecycle: MonitorLifecycle,
    pub location: Corner,
    pub text_color: OverlayColor,
}
