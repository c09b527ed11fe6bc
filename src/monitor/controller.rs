use crate::monitor::anchor::Corner;
use crate::monitor::color::OverlayColor;
use crate::monitor::command::ConfigCommand;
use crate::monitor::display::DisplayAdapter;
use crate::monitor::query::ForegroundTaskQuery;
use crate::monitor::sampler::{SamplingWorker, SAMPLE_INTERVAL};
use crate::monitor::state::{MonitorLifecycle, MonitorSnapshot, MonitorState, Session};
use crate::settings_store::{
    SettingsStore, DEFAULT_COLOR, DEFAULT_ENABLED, DEFAULT_LOCATION, KEY_COLOR, KEY_ENABLED,
    KEY_LOCATION,
};
use std::sync::Arc;
use std::time::Duration;

/// Owns the overlay and the sampling thread and applies configuration
/// commands to them.
///
/// Every method must be called from the owning context, the same thread that
/// owns the [`DisplayAdapter`]. The sampling thread only ever writes into the
/// session's sample slot; [`pump`](Self::pump) is what turns samples into
/// display updates.
pub struct MonitorController {
    state: MonitorState,
    display: Box<dyn DisplayAdapter>,
    query: Arc<dyn ForegroundTaskQuery>,
    sample_interval: Duration,
}

impl MonitorController {
    pub fn new(display: Box<dyn DisplayAdapter>, query: Arc<dyn ForegroundTaskQuery>) -> Self {
        Self {
            state: MonitorState::default(),
            display,
            query,
            sample_interval: SAMPLE_INTERVAL,
        }
    }

    /// Build a controller seeded from persisted settings. Starts monitoring
    /// right away when the stored `enabled` flag is set.
    pub fn from_store(
        store: &dyn SettingsStore,
        display: Box<dyn DisplayAdapter>,
        query: Arc<dyn ForegroundTaskQuery>,
    ) -> Self {
        Self::new(display, query).with_initial_settings(store)
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_initial_settings(mut self, store: &dyn SettingsStore) -> Self {
        let location = store.get_string(KEY_LOCATION, DEFAULT_LOCATION);
        let color = store.get_string(KEY_COLOR, DEFAULT_COLOR);
        let enabled = store.get_bool(KEY_ENABLED, DEFAULT_ENABLED);

        self.apply(ConfigCommand::location(&location));
        self.apply(ConfigCommand::SetColor(color));
        self.apply(ConfigCommand::SetEnabled(enabled));
        self
    }

    pub fn lifecycle(&self) -> MonitorLifecycle {
        self.state.lifecycle()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle().is_running()
    }

    pub fn location(&self) -> Corner {
        self.state.location
    }

    pub fn text_color(&self) -> OverlayColor {
        self.state.text_color
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.state.snapshot()
    }

    /// Apply one command against the current state. Never fails: malformed
    /// values have already been mapped to defaults and collaborator errors are
    /// logged.
    pub fn apply(&mut self, command: ConfigCommand) {
        tracing::debug!(?command, "applying overlay command");
        match command {
            ConfigCommand::SetEnabled(true) => self.start(),
            ConfigCommand::SetEnabled(false) => self.stop("disabled"),
            ConfigCommand::SetLocation(corner) => self.set_location(corner),
            ConfigCommand::SetColor(value) => self.set_color(&value),
        }
    }

    /// Render the most recent sample, if one arrived since the last call.
    /// Returns whether the overlay text was updated.
    pub fn pump(&mut self) -> bool {
        let Some(session) = self.state.session.as_ref() else {
            return false;
        };
        let Some(sample) = session.worker.slot().take() else {
            return false;
        };
        self.display.set_text(&session.overlay, sample.task());
        true
    }

    /// Stop monitoring from whatever state we are in. The sampling thread has
    /// exited and the overlay is gone when this returns.
    pub fn shutdown(&mut self) {
        self.stop("shutdown");
    }

    fn start(&mut self) {
        if self.state.session.is_some() {
            tracing::debug!("overlay monitor already running");
            return;
        }

        let anchor = self.state.location.anchor();
        let color = self.state.text_color;
        let overlay = match self.display.show(anchor, color) {
            Ok(overlay) => overlay,
            Err(err) => {
                tracing::error!(?err, "failed to create overlay");
                return;
            }
        };

        let worker = match SamplingWorker::spawn(Arc::clone(&self.query), self.sample_interval) {
            Ok(worker) => worker,
            Err(err) => {
                tracing::error!(?err, "failed to start foreground sampler");
                self.display.hide(&overlay);
                return;
            }
        };

        self.state.session = Some(Session { overlay, worker });
        tracing::info!(%anchor, %color, "overlay monitor started");
    }

    fn stop(&mut self, reason: &str) {
        let Some(mut session) = self.state.session.take() else {
            tracing::debug!(reason, "overlay monitor already stopped");
            return;
        };

        // Join before hiding so no late tick can outlive the overlay.
        session.worker.stop();
        self.display.hide(&session.overlay);
        tracing::info!(reason, "overlay monitor stopped");
    }

    fn set_location(&mut self, corner: Corner) {
        self.state.location = corner;
        if let Some(session) = &self.state.session {
            let anchor = corner.anchor();
            self.display.reposition(&session.overlay, anchor);
            tracing::debug!(%anchor, "overlay repositioned");
        }
    }

    fn set_color(&mut self, value: &str) {
        let color = OverlayColor::parse_or_unset(value);
        if color.is_unset() {
            tracing::debug!(value, "unrecognised overlay color; using unset");
        }
        self.state.text_color = color;
        if let Some(session) = &self.state.session {
            self.display.recolor(&session.overlay, color);
        }
    }
}

impl Drop for MonitorController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::MonitorController;
    use crate::monitor::anchor::{Anchor, Corner};
    use crate::monitor::color::{OverlayColor, DEFAULT_TEXT_COLOR};
    use crate::monitor::command::ConfigCommand;
    use crate::monitor::display::{DisplayCall, RecordingDisplay};
    use crate::monitor::query::ScriptedQuery;
    use crate::monitor::state::MonitorLifecycle;
    use crate::settings_store::{JsonSettingsStore, KEY_COLOR, KEY_ENABLED, KEY_LOCATION};
    use std::sync::Arc;
    use std::time::Duration;

    fn controller(display: &RecordingDisplay) -> MonitorController {
        MonitorController::new(
            Box::new(display.clone()),
            Arc::new(ScriptedQuery::repeating("com.example.Home")),
        )
        .with_sample_interval(Duration::from_millis(5))
    }

    #[test]
    fn starts_stopped_with_defaults() {
        let display = RecordingDisplay::new();
        let controller = controller(&display);
        assert_eq!(controller.lifecycle(), MonitorLifecycle::Stopped);
        assert_eq!(controller.location(), Corner::TopLeft);
        assert_eq!(controller.text_color(), DEFAULT_TEXT_COLOR);
        assert_eq!(display.call_count(), 0);
    }

    #[test]
    fn settings_while_stopped_are_applied_on_start() {
        let display = RecordingDisplay::new();
        let mut controller = controller(&display);

        controller.apply(ConfigCommand::location("3"));
        controller.apply(ConfigCommand::color("#00ff00"));
        assert_eq!(display.call_count(), 0);

        controller.apply(ConfigCommand::SetEnabled(true));
        assert_eq!(
            display.calls(),
            vec![DisplayCall::Show {
                id: 1,
                anchor: Anchor::BOTTOM_RIGHT,
                color: OverlayColor::rgb(0, 255, 0),
            }]
        );
    }

    #[test]
    fn failed_show_leaves_controller_stopped() {
        let display = RecordingDisplay::new();
        let mut controller = controller(&display);
        display.fail_next_show();

        controller.apply(ConfigCommand::SetEnabled(true));
        assert!(!controller.is_running());

        controller.apply(ConfigCommand::SetEnabled(true));
        assert!(controller.is_running());
        assert_eq!(display.live_overlays(), 1);
    }

    #[test]
    fn stop_when_stopped_is_a_noop() {
        let display = RecordingDisplay::new();
        let mut controller = controller(&display);
        controller.apply(ConfigCommand::SetEnabled(false));
        controller.shutdown();
        assert_eq!(display.call_count(), 0);
    }

    #[test]
    fn drop_releases_the_overlay() {
        let display = RecordingDisplay::new();
        {
            let mut controller = controller(&display);
            controller.apply(ConfigCommand::SetEnabled(true));
            assert_eq!(display.live_overlays(), 1);
        }
        assert_eq!(display.live_overlays(), 0);
    }

    #[test]
    fn initial_settings_come_from_the_store() {
        let display = RecordingDisplay::new();
        let mut store = JsonSettingsStore::in_memory();
        store.set(KEY_ENABLED, "true");
        store.set(KEY_LOCATION, "1");
        store.set(KEY_COLOR, "zzz");

        let controller = MonitorController::from_store(
            &store,
            Box::new(display.clone()),
            Arc::new(ScriptedQuery::default()),
        );

        assert!(controller.is_running());
        assert_eq!(controller.location(), Corner::TopRight);
        assert!(controller.text_color().is_unset());
        assert_eq!(
            display.calls(),
            vec![DisplayCall::Show {
                id: 1,
                anchor: Anchor::TOP_RIGHT,
                color: OverlayColor::UNSET,
            }]
        );
    }

    #[test]
    fn pump_without_session_renders_nothing() {
        let display = RecordingDisplay::new();
        let mut controller = controller(&display);
        assert!(!controller.pump());
        assert_eq!(display.call_count(), 0);
    }
}
