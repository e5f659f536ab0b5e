//! Real filesystem watching. Timing here is wall-clock, so assertions only
//! wait for "at least one" resync with a generous deadline.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use globe_watch::{watch, EventFilter, DEBOUNCE_WINDOW};

async fn wait_for(count: &AtomicUsize, at_least: usize) -> bool {
    for _ in 0..100 {
        if count.load(Ordering::SeqCst) >= at_least {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn edit_in_tracked_package_triggers_resync() {
    let ws = TempDir::new().unwrap();
    let app = ws.path().join("app");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("index.js"), "v1").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let tracked = vec![app.clone()];
    let handle = {
        let calls = calls.clone();
        let tracked = tracked.clone();
        watch(
            &[ws.path().to_path_buf()],
            EventFilter::new(Vec::<PathBuf>::new(), tracked.clone()),
            DEBOUNCE_WINDOW,
            move || -> Result<Vec<PathBuf>, std::io::Error> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(tracked.clone())
            },
        )
        .unwrap()
    };

    fs::write(app.join("index.js"), "v2").unwrap();

    assert!(wait_for(&calls, 1).await, "expected a resync after editing a tracked file");
    let resyncs = handle.close().await.unwrap();
    assert!(resyncs >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn edit_outside_tracked_packages_is_ignored() {
    let ws = TempDir::new().unwrap();
    let app = ws.path().join("app");
    let other = ws.path().join("other");
    fs::create_dir_all(&app).unwrap();
    fs::create_dir_all(&other).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let handle = {
        let calls = calls.clone();
        watch(
            &[ws.path().to_path_buf()],
            EventFilter::new(Vec::<PathBuf>::new(), vec![app.clone()]),
            DEBOUNCE_WINDOW,
            move || -> Result<Vec<PathBuf>, std::io::Error> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            },
        )
        .unwrap()
    };

    fs::write(other.join("index.js"), "x").unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(handle.close().await.unwrap(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
