//! Snapshot persistence queue
//!
//! Every mutation enqueues the full serialized cart. A dedicated writer
//! thread drains the channel and writes only the newest pending snapshot,
//! so a burst of rapid mutations collapses into one write. Callers never
//! wait on a write; failures are logged and dropped.
//!
//! On wasm32 the host is single-threaded, so the queue degenerates to an
//! inline write.

use crate::storage::BoxedBackend;

#[cfg(not(target_arch = "wasm32"))]
use crossbeam_channel::{Sender, bounded};

/// Queue capacity. Sends block when full, which only happens if mutations
/// outrun the backend by this many snapshots.
#[cfg(not(target_arch = "wasm32"))]
const QUEUE_CAPACITY: usize = 64;

#[cfg(not(target_arch = "wasm32"))]
enum Job {
    Write(String),
    Flush(Sender<()>),
}

/// Handle to the persistence worker
pub struct PersistQueue {
    #[cfg(not(target_arch = "wasm32"))]
    tx: Sender<Job>,
    #[cfg(target_arch = "wasm32")]
    backend: BoxedBackend,
    #[cfg(target_arch = "wasm32")]
    key: &'static str,
}

#[cfg(not(target_arch = "wasm32"))]
impl PersistQueue {
    /// Spawn the writer thread. It owns the backend exclusively and exits
    /// once every queue handle is dropped, draining what is pending first.
    pub fn new(backend: BoxedBackend, key: &'static str) -> Self {
        let (tx, rx) = bounded::<Job>(QUEUE_CAPACITY);

        let spawned = std::thread::Builder::new()
            .name("cart-persist".into())
            .spawn(move || {
                while let Ok(first) = rx.recv() {
                    // Drain everything already queued, keeping only the
                    // newest snapshot (last write wins anyway).
                    let mut pending: Option<String> = None;
                    let mut acks: Vec<Sender<()>> = Vec::new();
                    let mut next = Some(first);
                    while let Some(job) = next {
                        match job {
                            Job::Write(snapshot) => pending = Some(snapshot),
                            Job::Flush(ack) => acks.push(ack),
                        }
                        next = rx.try_recv().ok();
                    }

                    if let Some(snapshot) = pending {
                        match backend.set(key, &snapshot) {
                            Ok(()) => log::info!("cart persisted ({} bytes)", snapshot.len()),
                            Err(err) => log::warn!("cart write failed: {err}"),
                        }
                    }
                    for ack in acks {
                        let _ = ack.send(());
                    }
                }
            });

        if spawned.is_err() {
            log::warn!("could not spawn persistence worker, cart will not be saved");
        }

        Self { tx }
    }

    /// Queue a snapshot for writing (fire-and-forget)
    pub fn enqueue(&self, snapshot: String) {
        if self.tx.send(Job::Write(snapshot)).is_err() {
            log::warn!("persistence worker gone, snapshot dropped");
        }
    }

    /// Block until every snapshot queued so far has been written
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        if self.tx.send(Job::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl PersistQueue {
    pub fn new(backend: BoxedBackend, key: &'static str) -> Self {
        Self { backend, key }
    }

    /// Write the snapshot immediately (single-threaded host)
    pub fn enqueue(&self, snapshot: String) {
        match self.backend.set(self.key, &snapshot) {
            Ok(()) => log::info!("cart persisted ({} bytes)", snapshot.len()),
            Err(err) => log::warn!("cart write failed: {err}"),
        }
    }

    /// No queue on wasm32; writes are already done when `enqueue` returns
    pub fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageBackend};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_flush_writes_latest_snapshot() {
        init_logs();
        let storage = MemoryStorage::new();
        let queue = PersistQueue::new(Box::new(storage.clone()), "products");

        queue.enqueue("[1]".to_string());
        queue.enqueue("[2]".to_string());
        queue.enqueue("[3]".to_string());
        queue.flush();

        assert_eq!(storage.get("products").unwrap().as_deref(), Some("[3]"));
    }

    #[test]
    fn test_flush_on_empty_queue_returns() {
        let storage = MemoryStorage::new();
        let queue = PersistQueue::new(Box::new(storage.clone()), "products");

        queue.flush();
        assert!(storage.get("products").unwrap().is_none());
    }

    #[test]
    fn test_worker_exits_after_drop() {
        init_logs();
        let storage = MemoryStorage::new();
        let queue = PersistQueue::new(Box::new(storage.clone()), "products");
        queue.enqueue("[42]".to_string());
        queue.flush();
        drop(queue);

        // Worker already drained, value stays put.
        assert_eq!(storage.get("products").unwrap().as_deref(), Some("[42]"));
    }
}
