//! Submission coordinator
//!
//! Runs the validate → collect errors → submit pipeline and tracks
//! overlapping submit attempts.

mod coordinator;
mod guard;
mod sink;
mod traits;

pub use coordinator::{reset_form, submit_form};
pub use guard::{Liveness, SubmitGuard, SubmitPolicy, SubmitTicket};
pub use sink::ErrorSink;
pub use traits::{
    active_fields, submit_fn, validation_fn, ActiveFields, CrossFieldValidation, Identity,
    SubmitContext, SubmitFn, SubmitHandler, ValidationFn,
};

#[cfg(test)]
pub use traits::{MockCrossFieldValidation, MockSubmitHandler};
