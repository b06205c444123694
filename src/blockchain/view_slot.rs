// src/blockchain/view_slot.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Token handed to a fetch when it starts; later fetches get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug)]
struct Committed<T> {
    generation: u64,
    value: Option<T>,
}

/// Holds the latest result of a repeatable fetch.
///
/// Fetches may finish out of order. A result is only stored if it was issued
/// after the one currently held, so a slow, superseded fetch can never
/// overwrite newer data.
#[derive(Debug, Clone)]
pub struct ViewSlot<T> {
    issued: Arc<AtomicU64>,
    committed: Arc<RwLock<Committed<T>>>,
}

impl<T: Clone> ViewSlot<T> {
    pub fn new() -> Self {
        Self {
            issued: Arc::new(AtomicU64::new(0)),
            committed: Arc::new(RwLock::new(Committed {
                generation: 0,
                value: None,
            })),
        }
    }

    /// Starts a new fetch.
    pub fn issue(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Stores `value` unless a newer generation is already committed. Returns whether it was stored.
    pub async fn commit(&self, generation: Generation, value: T) -> bool {
        let mut slot = self.committed.write().await;
        if generation.0 <= slot.generation {
            return false;
        }
        slot.generation = generation.0;
        slot.value = Some(value);
        true
    }

    pub async fn current(&self) -> Option<T> {
        self.committed.read().await.value.clone()
    }
}

impl<T: Clone> Default for ViewSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
