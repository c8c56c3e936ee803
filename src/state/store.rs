//! Form store: the single update entry point of a form instance

use super::{FormState, Operation};
use std::sync::Arc;
use tokio::sync::watch;

/// Handle to one form's state.
///
/// Clones share the same state. Every dispatch runs the reducer to
/// completion and publishes the new state to subscribers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: Arc<watch::Sender<FormState>>,
}

impl Dispatcher {
    pub fn new(state: FormState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Apply an operation to the current state
    pub fn dispatch(&self, operation: Operation) {
        tracing::debug!("Dispatching {}", operation.kind());
        self.tx.send_modify(|state| {
            let next = state.apply(operation);
            *state = next;
        });
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FormState {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every state published after this call.
    ///
    /// `dispatch` takes the channel's write lock, so a `Ref` from
    /// `borrow()` must be dropped before dispatching on the same thread.
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.tx.subscribe()
    }
}
