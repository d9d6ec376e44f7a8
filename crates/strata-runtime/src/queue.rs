use std::collections::VecDeque;
use std::sync::Mutex;

use hashbrown::HashSet;
use strata_edit::{EditBatch, ModificationQueue, ModificationStats};
use strata_world::ChunkCoord;

/// Chunks awaiting relight and remesh. A chunk is pending at most once.
#[derive(Default, Debug)]
pub struct UpdateQueue {
    order: VecDeque<ChunkCoord>,
    pending: HashSet<ChunkCoord>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `coord` unless it is already pending. Returns whether it was added.
    pub fn push_back(&mut self, coord: ChunkCoord) -> bool {
        if !self.pending.insert(coord) {
            return false;
        }
        self.order.push_back(coord);
        true
    }

    /// Puts `coord` at the head, moving it there if it was already pending.
    pub fn push_front(&mut self, coord: ChunkCoord) {
        if !self.pending.insert(coord) {
            if let Some(i) = self.order.iter().position(|c| *c == coord) {
                self.order.remove(i);
            }
        }
        self.order.push_front(coord);
    }

    pub fn pop_front(&mut self) -> Option<ChunkCoord> {
        let coord = self.order.pop_front()?;
        self.pending.remove(&coord);
        Some(coord)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Default, Debug)]
struct PendingWork {
    updates: UpdateQueue,
    modifications: ModificationQueue,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueDepths {
    pub updates: usize,
    pub modifications: ModificationStats,
}

/// Update and modification queues behind one lock shared by the main thread and the worker.
///
/// The lock is taken and released inside each method, so it is never held
/// while a chunk lock is acquired.
#[derive(Default, Debug)]
pub struct WorkQueues {
    inner: Mutex<PendingWork>,
}

impl WorkQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_update(&self, coord: ChunkCoord) -> bool {
        self.inner.lock().unwrap().updates.push_back(coord)
    }

    /// Front insertion for edit-driven updates.
    pub fn enqueue_update_front(&self, coord: ChunkCoord) {
        self.inner.lock().unwrap().updates.push_front(coord);
    }

    pub fn next_update(&self) -> Option<ChunkCoord> {
        self.inner.lock().unwrap().updates.pop_front()
    }

    pub fn push_modifications(&self, batch: EditBatch) {
        self.inner.lock().unwrap().modifications.push_batch(batch);
    }

    /// Removes every queued batch in FIFO order.
    pub fn take_modifications(&self) -> Vec<EditBatch> {
        self.inner.lock().unwrap().modifications.drain_all()
    }

    pub fn depths(&self) -> QueueDepths {
        let g = self.inner.lock().unwrap();
        QueueDepths {
            updates: g.updates.len(),
            modifications: g.modifications.stats(),
        }
    }
}
