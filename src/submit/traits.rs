//! Trait abstractions for the submit pipeline, enabling mocking in tests

use super::ErrorSink;
use crate::state::FieldMap;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Selects which fields a submit validates, given `(values, extras)`
pub type ActiveFields = Arc<dyn Fn(&FieldMap, &FieldMap) -> Vec<String> + Send + Sync>;

/// Wrap a closure as [`ActiveFields`]
pub fn active_fields<F>(select: F) -> ActiveFields
where
    F: Fn(&FieldMap, &FieldMap) -> Vec<String> + Send + Sync + 'static,
{
    Arc::new(select)
}

/// Data handed to the submit handler alongside the values
#[derive(Debug, Clone)]
pub struct SubmitContext {
    pub initial_values: Arc<FieldMap>,
    pub extras: Arc<FieldMap>,
    errors: ErrorSink,
}

impl SubmitContext {
    pub(crate) fn new(
        initial_values: Arc<FieldMap>,
        extras: Arc<FieldMap>,
        errors: ErrorSink,
    ) -> Self {
        Self {
            initial_values,
            extras,
            errors,
        }
    }

    /// Report errors found while submitting, e.g. a server-side rejection.
    ///
    /// Every entry is written, so a `null` payload clears that field.
    pub fn set_errors(&self, errors: FieldMap) {
        self.errors.set_errors(errors);
    }
}

/// Whole-form validation run after the per-field rules
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrossFieldValidation: Send + Sync {
    /// Receives the rule results and returns the errors to apply.
    /// Entries may be added, removed or overridden.
    async fn validate(
        &self,
        errors: FieldMap,
        values: Arc<FieldMap>,
        extras: Arc<FieldMap>,
        initial_values: Arc<FieldMap>,
    ) -> anyhow::Result<FieldMap>;
}

/// Callback invoked once validation passed
#[cfg_attr(test, mockall::automock(type Output = serde_json::Value;))]
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    type Output: Send;

    async fn on_submit(
        &self,
        values: Arc<FieldMap>,
        context: SubmitContext,
    ) -> anyhow::Result<Self::Output>;
}

/// Cross-field validation that passes the errors through untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

#[async_trait]
impl CrossFieldValidation for Identity {
    async fn validate(
        &self,
        errors: FieldMap,
        _values: Arc<FieldMap>,
        _extras: Arc<FieldMap>,
        _initial_values: Arc<FieldMap>,
    ) -> anyhow::Result<FieldMap> {
        Ok(errors)
    }
}

/// Async closure adapter, see [`validation_fn`]
#[derive(Clone)]
pub struct ValidationFn<F>(F);

/// Use an async closure `(errors, values, extras, initial_values)` as
/// cross-field validation
pub fn validation_fn<F, Fut>(f: F) -> ValidationFn<F>
where
    F: Fn(FieldMap, Arc<FieldMap>, Arc<FieldMap>, Arc<FieldMap>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FieldMap>> + Send + 'static,
{
    ValidationFn(f)
}

#[async_trait]
impl<F, Fut> CrossFieldValidation for ValidationFn<F>
where
    F: Fn(FieldMap, Arc<FieldMap>, Arc<FieldMap>, Arc<FieldMap>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FieldMap>> + Send + 'static,
{
    async fn validate(
        &self,
        errors: FieldMap,
        values: Arc<FieldMap>,
        extras: Arc<FieldMap>,
        initial_values: Arc<FieldMap>,
    ) -> anyhow::Result<FieldMap> {
        (self.0)(errors, values, extras, initial_values).await
    }
}

/// Async closure adapter, see [`submit_fn`]
#[derive(Clone)]
pub struct SubmitFn<F>(F);

/// Use an async closure `(values, context)` as the submit handler
pub fn submit_fn<F, Fut, T>(f: F) -> SubmitFn<F>
where
    F: Fn(Arc<FieldMap>, SubmitContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    SubmitFn(f)
}

#[async_trait]
impl<F, Fut, T> SubmitHandler for SubmitFn<F>
where
    F: Fn(Arc<FieldMap>, SubmitContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn on_submit(
        &self,
        values: Arc<FieldMap>,
        context: SubmitContext,
    ) -> anyhow::Result<T> {
        (self.0)(values, context).await
    }
}
