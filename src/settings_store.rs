use crate::monitor::command::{parse_enabled_text, ConfigRequest};
use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_LOCATION: &str = "location";
pub const KEY_COLOR: &str = "color";
pub const KEY_DEBUG_LOGGING: &str = "debug_logging";
pub const KEY_LOG_FILE: &str = "log_file";

pub const DEFAULT_ENABLED: bool = false;
pub const DEFAULT_LOCATION: &str = "0";
pub const DEFAULT_COLOR: &str = "#fff";

/// Persisted key/value preferences.
pub trait SettingsStore {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn get_string(&self, key: &str, default: &str) -> String;
}

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

/// Flat JSON object on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonSettingsStore {
    values: Map<String, Value>,
    path: Option<PathBuf>,
}

impl JsonSettingsStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load `path`, remembering it for [`save`](Self::save). A missing or
    /// blank file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = load_values_from_path(&path)?;
        Ok(Self {
            values,
            path: Some(path),
        })
    }

    /// Empty store that still saves to `path`, for when the file there could
    /// not be read.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            values: Map::new(),
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Record the fields present in a settings-screen request.
    pub fn merge_request(&mut self, request: &ConfigRequest) {
        if let Some(enabled) = request.enabled {
            self.set(KEY_ENABLED, enabled);
        }
        if let Some(location) = &request.location {
            self.set(KEY_LOCATION, location.as_str());
        }
        if let Some(color) = &request.color {
            self.set(KEY_COLOR, color.as_str());
        }
    }

    /// Write back to the file this store was opened from. In-memory stores
    /// have nowhere to write and succeed trivially.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        save_values_to_path(path, &self.values)
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => parse_enabled_text(text).unwrap_or(default),
            _ => default,
        }
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            _ => default.to_string(),
        }
    }
}

fn load_values_from_path(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    serde_json::from_str(&content)
        .with_context(|| format!("deserialize settings file {}", path.display()))
}

fn save_values_to_path(path: &Path, values: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings parent folder {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(values).context("serialize settings")?;
    std::fs::write(path, json).with_context(|| format!("write settings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{
        settings_path_from_exe_path, JsonSettingsStore, SettingsStore, KEY_COLOR, KEY_ENABLED,
        KEY_LOCATION, SETTINGS_FILE_NAME,
    };
    use crate::monitor::command::ConfigRequest;
    use std::path::Path;

    #[test]
    fn settings_path_is_resolved_next_to_executable() {
        let exe = Path::new("/tmp/overlay/bin/info_overlay");
        let path = settings_path_from_exe_path(exe).expect("path");
        assert_eq!(path, Path::new("/tmp/overlay/bin").join(SETTINGS_FILE_NAME));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonSettingsStore::open(dir.path().join(SETTINGS_FILE_NAME)).expect("open");
        assert!(!store.get_bool(KEY_ENABLED, false));
        assert_eq!(store.get_string(KEY_LOCATION, "0"), "0");
    }

    #[test]
    fn blank_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "  \n").expect("write blank");
        let store = JsonSettingsStore::open(&path).expect("open");
        assert_eq!(store.get_string(KEY_COLOR, "#fff"), "#fff");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").expect("write");
        assert!(JsonSettingsStore::open(&path).is_err());
    }

    #[test]
    fn values_are_coerced_to_requested_type() {
        let mut store = JsonSettingsStore::in_memory();
        store.set(KEY_ENABLED, "True");
        store.set(KEY_LOCATION, 3);
        store.set(KEY_COLOR, serde_json::json!(["#fff"]));

        assert!(store.get_bool(KEY_ENABLED, false));
        assert_eq!(store.get_string(KEY_LOCATION, "0"), "3");
        assert_eq!(store.get_string(KEY_COLOR, "#fff"), "#fff");
        assert!(store.get_bool("missing", true));
    }

    #[test]
    fn merged_request_survives_save_and_reload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let mut store = JsonSettingsStore::open(&path).expect("open");
        store.merge_request(&ConfigRequest {
            enabled: Some(true),
            location: Some("1".into()),
            color: None,
        });
        store.save().expect("save");

        let reloaded = JsonSettingsStore::open(&path).expect("reload");
        assert!(reloaded.get_bool(KEY_ENABLED, false));
        assert_eq!(reloaded.get_string(KEY_LOCATION, "0"), "1");
        assert_eq!(reloaded.get_string(KEY_COLOR, "#fff"), "#fff");
    }
}
