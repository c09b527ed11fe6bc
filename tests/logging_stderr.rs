// Separate test binary: the subscriber is process-global, and the file sink
// test in `logging.rs` must install first in its own process.
use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();

    info_overlay::logging::init(false, None);
    tracing::info!("stderr only");
    // A second init is ignored rather than panicking.
    info_overlay::logging::init(true, None);
    tracing::info!("still stderr");

    sleep(Duration::from_millis(100));

    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 0, "no log file should be created");
}
