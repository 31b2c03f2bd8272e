//! Periodic snapshot worker.
//!
//! One long-lived thread wakes on a timer (or early via [`Flusher::kick`])
//! and writes every dirty namespace. The walk takes the registry lock only
//! to collect the namespace list; each namespace lock is then held for the
//! duration of that one write, so a snapshot in one namespace never blocks
//! mutations in another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::store::Store;

struct FlusherInner {
    store: Arc<Store>,
    interval: Duration,
    shutdown: AtomicBool,
    /// True when a kick arrived that no pass has consumed yet; checked
    /// under the lock so a kick sent before the worker waits is not lost.
    kick_pending: Mutex<bool>,
    wake: Condvar,
}

/// Handle to the snapshot worker thread.
pub struct Flusher {
    inner: Arc<FlusherInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Flusher {
    /// Spawn the worker. It fires every `interval` until [`shutdown`].
    ///
    /// [`shutdown`]: Flusher::shutdown
    pub fn start(store: Arc<Store>, interval: Duration) -> Flusher {
        let inner = Arc::new(FlusherInner {
            store,
            interval,
            shutdown: AtomicBool::new(false),
            kick_pending: Mutex::new(false),
            wake: Condvar::new(),
        });

        let worker = {
            let inner = Arc::clone(&inner);
            std::thread::Builder::new()
                .name("typeahead-flush".to_string())
                .spawn(move || worker_loop(&inner))
                .expect("failed to spawn snapshot worker thread")
        };

        Flusher {
            inner,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Wake the worker ahead of its timer. Non-blocking; a signal arriving
    /// while a pass is running is consumed by the next wait.
    pub fn kick(&self) {
        let mut pending = self.inner.kick_pending.lock();
        *pending = true;
        self.inner.wake.notify_one();
    }

    /// Stop the worker, join it, and run one final full snapshot pass so
    /// nothing accepted since the last tick is lost on shutdown.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);

        // Lock before notifying so the worker is either already waiting
        // (and wakes) or has not yet re-checked the shutdown flag.
        {
            let _guard = self.inner.kick_pending.lock();
            self.inner.wake.notify_all();
        }

        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }

        let written = self.inner.store.flush_all();
        info!(namespaces = written, "final snapshot pass complete");
    }
}

fn worker_loop(inner: &FlusherInner) {
    loop {
        {
            let mut pending = inner.kick_pending.lock();
            if inner.shutdown.load(Ordering::Acquire) {
                return;
            }
            if !*pending {
                let _ = inner.wake.wait_for(&mut pending, inner.interval);
            }
            *pending = false;
        }
        if inner.shutdown.load(Ordering::Acquire) {
            return;
        }

        let written = inner.store.flush_dirty();
        if written > 0 {
            debug!(namespaces = written, "periodic snapshot pass");
        }
    }
}
