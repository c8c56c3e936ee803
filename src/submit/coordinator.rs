//! Submit and reset algorithms

use super::{ActiveFields, CrossFieldValidation, ErrorSink, SubmitContext, SubmitHandler};
use crate::error::FormError;
use crate::rules::Rules;
use crate::state::{is_error, Dispatcher, FieldMap, FormState, Operation};
use serde_json::Value;
use std::sync::Arc;

/// Run one submit attempt against a state snapshot.
///
/// Resolves to `Ok(None)` when any field fails validation; every failing
/// error is written through `sink` and `on_submit` is not called.
/// Otherwise resolves to `Ok(Some(output))` with the handler's output.
pub async fn submit_form<H>(
    state: &FormState,
    sink: &ErrorSink,
    rules: &Rules,
    active_fields: Option<&ActiveFields>,
    extra_validation: &dyn CrossFieldValidation,
    on_submit: &H,
) -> Result<Option<H::Output>, FormError>
where
    H: SubmitHandler + ?Sized,
{
    let fields = match active_fields {
        Some(select) => select(state.values.as_ref(), state.extras.as_ref()),
        None => state.values.keys().cloned().collect(),
    };
    let errors = run_rules(&fields, &state.values, rules)?;

    let errors = extra_validation
        .validate(
            errors,
            Arc::clone(&state.values),
            Arc::clone(&state.extras),
            Arc::clone(&state.initial_values),
        )
        .await
        .map_err(FormError::Validation)?;

    if !sink.is_live() {
        tracing::warn!("Submit went stale during validation");
        return Err(FormError::Superseded);
    }

    let passed = errors.into_iter().fold(true, |passed, (name, payload)| {
        if is_error(&payload) {
            tracing::debug!("Field `{name}` failed validation");
            sink.set_error(&name, payload);
            false
        } else {
            passed
        }
    });

    if !passed {
        return Ok(None);
    }

    let context = SubmitContext::new(
        Arc::clone(&state.initial_values),
        Arc::clone(&state.extras),
        sink.clone(),
    );
    let output = on_submit
        .on_submit(Arc::clone(&state.values), context)
        .await
        .map_err(FormError::Submit)?;

    if !sink.is_live() {
        tracing::warn!("Discarding result of a superseded submit");
        return Err(FormError::Superseded);
    }

    Ok(Some(output))
}

/// Rule payload for every selected field that has a rule
fn run_rules(fields: &[String], values: &FieldMap, rules: &Rules) -> Result<FieldMap, FormError> {
    let mut errors = FieldMap::new();
    for name in fields {
        let Some(rule) = rules.get(name) else {
            continue;
        };
        let value = values.get(name).unwrap_or(&Value::Null);
        let payload = rule(value).map_err(|source| FormError::Rule {
            field: name.clone(),
            source,
        })?;
        errors.insert(name.clone(), payload);
    }
    Ok(errors)
}

/// Replace the form state with a fresh one built from the initial data
pub fn reset_form(
    initial_values: Arc<FieldMap>,
    initial_extras: Arc<FieldMap>,
    dispatcher: &Dispatcher,
) {
    dispatcher.dispatch(Operation::reset(FormState::from_shared(
        initial_values,
        initial_extras,
    )));
}
