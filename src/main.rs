use anyhow::Context;
use info_overlay::monitor::MonitorController;
use info_overlay::settings_store::{
    resolve_settings_path, JsonSettingsStore, SettingsStore, KEY_DEBUG_LOGGING, KEY_LOG_FILE,
};
use info_overlay::{logging, platform, runtime};
use std::path::PathBuf;
use std::sync::mpsc;

fn main() -> anyhow::Result<()> {
    let settings_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => resolve_settings_path()?,
    };
    let (store, load_error) = match JsonSettingsStore::open(&settings_path) {
        Ok(store) => (store, None),
        Err(err) => (JsonSettingsStore::with_path(&settings_path), Some(err)),
    };

    let log_file = store.get_string(KEY_LOG_FILE, "");
    let log_file = (!log_file.trim().is_empty()).then(|| PathBuf::from(log_file.trim()));
    logging::init(store.get_bool(KEY_DEBUG_LOGGING, false), log_file);
    tracing::info!(settings = %settings_path.display(), "info overlay starting");
    if let Some(err) = load_error {
        tracing::warn!(?err, "settings unreadable; starting with defaults");
    }

    let mut controller = MonitorController::from_store(
        &store,
        platform::default_display(),
        platform::default_foreground_query(),
    );

    let (tx, rx) = mpsc::channel();
    let mut reader_store = store;
    let reader = std::thread::Builder::new()
        .name("request-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            match runtime::forward_requests(stdin.lock(), &mut reader_store, &tx) {
                Ok(count) => tracing::debug!(count, "config request input closed"),
                Err(err) => tracing::error!(?err, "config request reader failed"),
            }
        })
        .context("spawn request reader thread")?;

    runtime::run(&mut controller, rx, runtime::FRAME_INTERVAL);

    if reader.join().is_err() {
        tracing::error!("config request reader panicked");
    }
    tracing::info!("info overlay exiting");
    Ok(())
}
