//! Error writer used by a submit attempt

use super::guard::Liveness;
use crate::state::{Dispatcher, FieldMap, Operation};
use serde_json::Value;

/// Writes `SET_ERROR` operations on behalf of a submit attempt.
///
/// When tied to a ticket, writes from an attempt that is no longer
/// current are dropped.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    dispatcher: Dispatcher,
    liveness: Option<Liveness>,
}

impl ErrorSink {
    /// Sink that always writes
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            liveness: None,
        }
    }

    /// Sink that writes only while the attempt is current
    pub fn guarded(dispatcher: Dispatcher, liveness: Liveness) -> Self {
        Self {
            dispatcher,
            liveness: Some(liveness),
        }
    }

    pub fn is_live(&self) -> bool {
        self.liveness.as_ref().is_none_or(Liveness::is_live)
    }

    pub fn set_error(&self, name: &str, payload: Value) {
        if !self.is_live() {
            tracing::debug!("Dropping error for `{name}` from a stale submit");
            return;
        }
        self.dispatcher.dispatch(Operation::set_error(name, payload));
    }

    pub fn set_errors(&self, errors: FieldMap) {
        for (name, payload) in errors {
            self.set_error(&name, payload);
        }
    }
}
