// Background expiry sweeper
//
// A dedicated thread that wakes on a fixed cadence and evicts every entry
// whose TTL has elapsed. The thread holds only a weak handle to the cache,
// so dropping the last cache handle lets it wind down on its own.

use crate::cache::Shared;
use crossbeam::channel::{self, Sender};
use log::debug;
use std::hash::Hash;
use std::sync::Weak;
use std::thread;
use std::time::Duration;

/// Handle to a running sweeper thread
///
/// Dropping the handle signals the thread to exit; it stops immediately or,
/// if mid-sweep, after finishing the current pass.
pub(crate) struct Sweeper {
    stop: Sender<()>,
}

impl Sweeper {
    pub(crate) fn spawn<K, V>(shared: Weak<Shared<K, V>>, interval: Duration) -> Self
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let ticker = channel::tick(interval);

        thread::spawn(move || {
            debug!("expiry sweeper started (interval {interval:?})");
            loop {
                crossbeam::select! {
                    recv(ticker) -> _ => {
                        match shared.upgrade() {
                            Some(shared) => {
                                let evicted = shared.sweep_expired();
                                if evicted > 0 {
                                    debug!("expiry sweep evicted {evicted} entries");
                                }
                            }
                            // Cache was dropped; nothing left to sweep.
                            None => break,
                        }
                    }
                    recv(stop_rx) -> _ => break,
                }
            }
            debug!("expiry sweeper stopped");
        });

        Self { stop: stop_tx }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        // Wake the thread now rather than at its next tick. The subsequent
        // channel disconnect covers the case where the buffer was full.
        let _ = self.stop.try_send(());
    }
}
