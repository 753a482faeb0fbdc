//! Dedicated thread that feeds change events to a [`ChangeSink`].

use std::sync::Weak;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver, Sender};
use projcache_core::errors::WatchError;
use projcache_core::ChangeSink;

use crate::event::ChangeEvent;

/// Drains a change-event channel and invalidates through the sink.
///
/// Holds the sink weakly: dropping the cache ends the thread at its next event.
/// The thread also exits when the event channel disconnects or on shutdown.
pub struct InvalidationListener {
    stop: Sender<()>,
    handle: Option<JoinHandle<u64>>,
}

impl InvalidationListener {
    pub fn spawn(
        events: Receiver<ChangeEvent>,
        sink: Weak<dyn ChangeSink>,
    ) -> Result<Self, WatchError> {
        let (stop, stop_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("projcache-invalidator".to_string())
            .spawn(move || listen_loop(events, stop_rx, sink))
            .map_err(|e| WatchError::Backend {
                path: String::new(),
                message: format!("failed to spawn invalidation listener: {e}"),
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it. Returns the number of events delivered.
    pub fn shutdown(mut self) -> Result<u64, WatchError> {
        let _ = self.stop.try_send(());
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WatchError::Disconnected),
            None => Ok(0),
        }
    }
}

impl Drop for InvalidationListener {
    fn drop(&mut self) {
        let _ = self.stop.try_send(());
    }
}

fn listen_loop(events: Receiver<ChangeEvent>, stop: Receiver<()>, sink: Weak<dyn ChangeSink>) -> u64 {
    let mut delivered = 0u64;
    loop {
        select! {
            recv(events) -> msg => {
                let Ok(event) = msg else { break };
                let Some(sink) = sink.upgrade() else { break };
                tracing::debug!(path = %event.path.display(), kind = ?event.kind, "change notification");
                sink.on_changed(&event.path);
                delivered += 1;
            }
            recv(stop) -> _ => break,
        }
    }
    tracing::debug!(delivered, "invalidation listener stopped");
    delivered
}
