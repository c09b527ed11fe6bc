pub mod anchor;
pub mod color;
pub mod command;
pub mod controller;
pub mod display;
pub mod query;
pub mod sampler;
pub mod slot;
pub mod state;

pub use anchor::{Anchor, Corner, HorizontalEdge, VerticalEdge};
pub use color::{OverlayColor, DEFAULT_TEXT_COLOR};
pub use command::{ConfigCommand, ConfigRequest};
pub use controller::MonitorController;
pub use display::{DisplayAdapter, DisplayCall, OverlayHandle, RecordingDisplay};
pub use query::{ForegroundTaskQuery, ScriptedQuery};
pub use sampler::{SamplingWorker, SAMPLE_INTERVAL};
pub use slot::{Sample, SampleSlot};
pub use state::{MonitorLifecycle, MonitorSnapshot};
