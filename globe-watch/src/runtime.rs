//! Notify + tokio watch loop.
//!
//! Every root is watched recursively. Create/modify/remove events that pass
//! the [`EventFilter`] feed the [`Debouncer`]; when it fires, the quiescent
//! callback runs on the blocking pool and returns the package directories to
//! track from then on. A failing callback ends the loop with
//! [`WatchError::Resync`].

use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::debounce::Debouncer;
use crate::error::{io_err, WatchError};
use crate::filter::EventFilter;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Running watch loop. Dropping it without [`WatchHandle::close`] leaves the
/// loop running until the runtime shuts down.
pub struct WatchHandle {
    shutdown: broadcast::Sender<()>,
    task: Option<JoinHandle<Result<usize, WatchError>>>,
    resyncs: Arc<AtomicUsize>,
}

impl WatchHandle {
    /// Resyncs completed so far.
    pub fn resyncs(&self) -> usize {
        self.resyncs.load(Ordering::SeqCst)
    }

    /// Resolves when the loop stops on its own, which only happens on a
    /// failed resync. Pending forever once observed.
    pub async fn stopped(&mut self) -> Result<usize, WatchError> {
        let Some(task) = self.task.as_mut() else {
            return std::future::pending().await;
        };
        let result = task.await;
        self.task = None;
        result?
    }

    /// Stop observing. A resync already in progress runs to completion.
    pub async fn close(mut self) -> Result<usize, WatchError> {
        let _ = self.shutdown.send(());
        match self.task.take() {
            Some(task) => task.await?,
            None => Ok(self.resyncs()),
        }
    }
}

/// Watch `roots` and call `on_quiescent` after each burst of qualifying
/// events. Returns once every root is being observed.
pub fn watch<F, E>(
    roots: &[PathBuf],
    filter: EventFilter,
    window: Duration,
    on_quiescent: F,
) -> Result<WatchHandle, WatchError>
where
    F: FnMut() -> Result<Vec<PathBuf>, E> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    for root in roots {
        let root = std::fs::canonicalize(root).map_err(|e| io_err(root, e))?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::info!(root = %root.display(), "watching");
    }

    let (shutdown, shutdown_rx) = broadcast::channel::<()>(4);
    let resyncs = Arc::new(AtomicUsize::new(0));
    let task = {
        let resyncs = resyncs.clone();
        tokio::spawn(async move {
            // Keep the watcher alive for as long as the loop runs.
            let _watcher = watcher;
            run_loop(event_rx, shutdown_rx, filter, window, on_quiescent, resyncs).await
        })
    };

    Ok(WatchHandle {
        shutdown,
        task: Some(task),
        resyncs,
    })
}

pub(crate) async fn run_loop<F, E>(
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    mut shutdown_rx: broadcast::Receiver<()>,
    mut filter: EventFilter,
    window: Duration,
    mut on_quiescent: F,
    resyncs: Arc<AtomicUsize>,
) -> Result<usize, WatchError>
where
    F: FnMut() -> Result<Vec<PathBuf>, E> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    let mut debounce = Debouncer::new(window);

    loop {
        let deadline = debounce.deadline();
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                if !is_relevant_event_kind(&event.kind) {
                    continue;
                }
                if event.paths.iter().any(|path| filter.qualifies(path)) {
                    debounce.event(Instant::now());
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if !debounce.poll(Instant::now()) {
                    continue;
                }
                let mut callback = on_quiescent;
                let (callback, result) = tokio::task::spawn_blocking(move || {
                    let result = callback();
                    (callback, result)
                })
                .await?;
                on_quiescent = callback;

                match result {
                    Ok(tracked) => {
                        filter.set_tracked(tracked);
                        let total = resyncs.fetch_add(1, Ordering::SeqCst) + 1;
                        tracing::debug!(resyncs = total, "resync complete");
                    }
                    Err(err) => {
                        let err: BoxError = err.into();
                        tracing::error!(error = %err, "resync failed");
                        return Err(WatchError::Resync(err));
                    }
                }
            }
        }
    }

    Ok(resyncs.load(Ordering::SeqCst))
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
