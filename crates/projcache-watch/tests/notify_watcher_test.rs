//! NotifyWatcher against a real temp directory, polling backend for determinism.

use std::time::{Duration, Instant};

use projcache_core::config::{WatchBackend, WatchConfig};
use projcache_core::{CacheKey, PathWatcher};
use projcache_watch::{ChangeEvent, NotifyWatcher};

fn poll_config() -> WatchConfig {
    WatchConfig {
        enabled: Some(true),
        backend: Some(WatchBackend::Poll),
        poll_interval_ms: Some(25),
        ..Default::default()
    }
}

fn wait_for_event(
    rx: &crossbeam_channel::Receiver<ChangeEvent>,
    file_name: &str,
) -> Option<ChangeEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Ok(event) = rx.recv_timeout(Duration::from_millis(50)) {
            if event.path.ends_with(file_name) {
                return Some(event);
            }
        }
    }
    None
}

#[test]
fn poll_backend_reports_modification() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("project.qgs");
    std::fs::write(&file, "<qgis/>").unwrap();

    let (watcher, rx) = NotifyWatcher::new(&poll_config()).unwrap();
    let key = CacheKey::new(&file).unwrap();
    watcher.watch(&key).unwrap();

    // Let the first poll record the initial mtime.
    std::thread::sleep(Duration::from_millis(200));
    while rx.try_recv().is_ok() {}

    std::fs::write(&file, "<qgis version=\"3\"><layer/></qgis>").unwrap();
    assert!(wait_for_event(&rx, "project.qgs").is_some(), "no change event received");
}

#[test]
fn poll_backend_reports_rewrite_within_the_same_second() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("fast.qgs");
    std::fs::write(&file, "<qgis projectname=\"v1\"/>").unwrap();

    let (watcher, rx) = NotifyWatcher::new(&poll_config()).unwrap();
    watcher.watch(&CacheKey::new(&file).unwrap()).unwrap();
    std::fs::write(&file, "<qgis projectname=\"v2\"/>").unwrap();

    assert!(wait_for_event(&rx, "fast.qgs").is_some(), "same-second rewrite went unreported");
}

#[test]
fn unwatching_an_unknown_path_succeeds() {
    let (watcher, _rx) = NotifyWatcher::new(&poll_config()).unwrap();
    let key = CacheKey::new("/nonexistent/dir/never-watched.qgs").unwrap();
    watcher.unwatch(&key).unwrap();
}

