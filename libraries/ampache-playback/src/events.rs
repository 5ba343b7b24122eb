//! Status event fan-out
//!
//! Every subscriber gets its own unbounded channel. Publishing never blocks;
//! subscribers whose receiver was dropped are pruned on the next publish.

use crate::types::StatusEvent;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

#[derive(Default)]
pub(crate) struct StatusBroadcaster {
    subscribers: Mutex<Vec<Sender<StatusEvent>>>,
    last: Mutex<Option<StatusEvent>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StatusBroadcaster {
    pub(crate) fn subscribe(&self) -> Receiver<StatusEvent> {
        let (tx, rx) = unbounded();
        lock(&self.subscribers).push(tx);
        rx
    }

    pub(crate) fn publish(&self, event: StatusEvent) {
        *lock(&self.last) = Some(event.clone());

        let mut subscribers = lock(&self.subscribers);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        trace!(subscribers = subscribers.len(), state = ?event.new_state, "Published status");
    }

    pub(crate) fn last(&self) -> Option<StatusEvent> {
        lock(&self.last).clone()
    }
}
