pub mod logging;
pub mod monitor;
pub mod platform;
pub mod runtime;
pub mod settings_store;

pub use monitor::{ConfigCommand, ConfigRequest, MonitorController};
pub use settings_store::{JsonSettingsStore, SettingsStore};
