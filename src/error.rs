//! Errors surfaced by a submit attempt

use thiserror::Error;

/// Failure of a submit attempt.
///
/// Field validation failures are not errors: they are written into the
/// form's `errors` and the attempt resolves with `None`.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("rule for field `{field}` failed")]
    Rule {
        field: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cross-field validation failed")]
    Validation(#[source] anyhow::Error),

    #[error("submit handler failed")]
    Submit(#[source] anyhow::Error),

    #[error("a submit is already in progress")]
    SubmitInFlight,

    #[error("submit was superseded by a newer submit or reset")]
    Superseded,
}
