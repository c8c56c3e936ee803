//! Form host: ties the store, rules and submit pipeline to one form instance
//!
//! A [`Form`] replaces the host component of a UI tree. Descendants get an
//! explicit [`FormContext`] handle instead of reading ambient state.

use crate::config::FormConfig;
use crate::error::FormError;
use crate::rules::Rules;
use crate::state::{Dispatcher, FieldMap, FormState, Operation};
use crate::submit::{
    reset_form, submit_form, ActiveFields, CrossFieldValidation, ErrorSink, Identity,
    SubmitGuard, SubmitHandler, SubmitPolicy,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Platform event whose default action a form trigger suppresses
#[cfg_attr(test, mockall::automock)]
pub trait HostEvent {
    fn prevent_default(&mut self);
}

struct FormInner<H> {
    initial_values: Arc<FieldMap>,
    initial_extras: Arc<FieldMap>,
    rules: Arc<Rules>,
    active_fields: Option<ActiveFields>,
    extra_validation: Arc<dyn CrossFieldValidation>,
    on_submit: H,
    dispatcher: Dispatcher,
    guard: SubmitGuard,
}

/// One form instance. Clones share the same state and submit guard.
pub struct Form<H> {
    inner: Arc<FormInner<H>>,
}

impl<H> Clone for Form<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: SubmitHandler> Form<H> {
    pub fn builder(initial_values: FieldMap, on_submit: H) -> FormBuilder<H> {
        FormBuilder::new(initial_values, on_submit)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FormState {
        self.inner.dispatcher.state()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn dispatch(&self, operation: Operation) {
        self.inner.dispatcher.dispatch(operation);
    }

    /// See [`Dispatcher::subscribe`]
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.inner.dispatcher.subscribe()
    }

    pub fn rules(&self) -> &Rules {
        &self.inner.rules
    }

    pub fn submit_policy(&self) -> SubmitPolicy {
        self.inner.guard.policy()
    }

    /// True while a submit attempt is running and not yet stale
    pub fn is_submitting(&self) -> bool {
        self.inner.guard.in_flight()
    }

    /// Validate the latest state and, if it passes, run the submit handler.
    ///
    /// `Ok(None)` means validation failed and the errors were written to
    /// the form. Overlapping submits follow the form's [`SubmitPolicy`].
    pub async fn submit(&self) -> Result<Option<H::Output>, FormError> {
        let ticket = self.inner.guard.begin().await?;
        let state = self.state();
        let sink = ErrorSink::guarded(self.inner.dispatcher.clone(), ticket.liveness());
        tracing::info!(
            "Submitting form {} ({} values)",
            ticket.liveness().id(),
            state.values.len()
        );

        let result = submit_form(
            &state,
            &sink,
            &self.inner.rules,
            self.inner.active_fields.as_ref(),
            self.inner.extra_validation.as_ref(),
            &self.inner.on_submit,
        )
        .await;

        drop(ticket);
        result
    }

    /// Restore the initial values and extras and clear all errors.
    ///
    /// A submit still in flight turns stale and can no longer write.
    pub fn reset(&self) {
        self.inner.guard.invalidate();
        reset_form(
            Arc::clone(&self.inner.initial_values),
            Arc::clone(&self.inner.initial_extras),
            &self.inner.dispatcher,
        );
    }

    /// Submit trigger for the host: suppresses the platform default first
    pub async fn handle_submit<E: HostEvent>(
        &self,
        event: &mut E,
    ) -> Result<Option<H::Output>, FormError> {
        event.prevent_default();
        self.submit().await
    }

    /// Reset trigger for the host: suppresses the platform default first
    pub fn handle_reset<E: HostEvent>(&self, event: &mut E) {
        event.prevent_default();
        self.reset();
    }

    /// Handle for descendants, carrying a snapshot of the current state
    pub fn context(&self) -> FormContext<H> {
        FormContext {
            form: self.clone(),
            state: self.state(),
        }
    }
}

/// Builder for [`Form`]
pub struct FormBuilder<H> {
    initial_values: FieldMap,
    initial_extras: FieldMap,
    rules: Rules,
    active_fields: Option<ActiveFields>,
    extra_validation: Arc<dyn CrossFieldValidation>,
    on_submit: H,
    policy: SubmitPolicy,
}

impl<H: SubmitHandler> FormBuilder<H> {
    fn new(initial_values: FieldMap, on_submit: H) -> Self {
        Self {
            initial_values,
            initial_extras: FieldMap::new(),
            rules: Rules::new(),
            active_fields: None,
            extra_validation: Arc::new(Identity),
            on_submit,
            policy: SubmitPolicy::default(),
        }
    }

    pub fn initial_extras(mut self, initial_extras: FieldMap) -> Self {
        self.initial_extras = initial_extras;
        self
    }

    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Validate only the fields this selector returns
    pub fn active_fields(mut self, select: ActiveFields) -> Self {
        self.active_fields = Some(select);
        self
    }

    pub fn extra_validation<V>(mut self, validation: V) -> Self
    where
        V: CrossFieldValidation + 'static,
    {
        self.extra_validation = Arc::new(validation);
        self
    }

    pub fn submit_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Apply the settings present in a loaded config
    pub fn config(mut self, config: &FormConfig) -> Self {
        if let Some(policy) = config.submit_policy {
            self.policy = policy;
        }
        self
    }

    pub fn build(self) -> Form<H> {
        let initial_values = Arc::new(self.initial_values);
        let initial_extras = Arc::new(self.initial_extras);
        let dispatcher = Dispatcher::new(FormState::from_shared(
            Arc::clone(&initial_values),
            Arc::clone(&initial_extras),
        ));

        Form {
            inner: Arc::new(FormInner {
                initial_values,
                initial_extras,
                rules: Arc::new(self.rules),
                active_fields: self.active_fields,
                extra_validation: self.extra_validation,
                on_submit: self.on_submit,
                dispatcher,
                guard: SubmitGuard::new(self.policy),
            }),
        }
    }
}

/// What a descendant component sees of its form
pub struct FormContext<H> {
    form: Form<H>,
    state: FormState,
}

impl<H> Clone for FormContext<H> {
    fn clone(&self) -> Self {
        Self {
            form: self.form.clone(),
            state: self.state.clone(),
        }
    }
}

impl<H: SubmitHandler> FormContext<H> {
    /// The snapshot taken when this context was created or last refreshed
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Re-read the form's current state
    pub fn refresh(&mut self) {
        self.state = self.form.state();
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.state.value(name)
    }

    pub fn error(&self, name: &str) -> Option<&Value> {
        self.state.error(name)
    }

    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.state.extra(name)
    }

    pub fn rules(&self) -> &Rules {
        self.form.rules()
    }

    pub fn dispatch(&self, operation: Operation) {
        self.form.dispatch(operation);
    }

    pub fn set_value(&self, name: &str, value: Value) {
        self.dispatch(Operation::set_value(name, value));
    }

    pub fn set_error(&self, name: &str, payload: Value) {
        self.dispatch(Operation::set_error(name, payload));
    }

    pub fn set_extra(&self, name: &str, value: Value) {
        self.dispatch(Operation::set_extra(name, value));
    }

    /// Run one field's rule against its current value and store the result.
    ///
    /// Unlike a submit, a `null` result is written too, clearing the error.
    /// Returns `None` when the field has no rule.
    pub fn validate_field(&self, name: &str) -> Result<Option<Value>, FormError> {
        let Some(rule) = self.form.rules().get(name) else {
            return Ok(None);
        };
        let state = self.form.state();
        let value = state.value(name).unwrap_or(&Value::Null);
        let payload = rule(value).map_err(|source| FormError::Rule {
            field: name.to_string(),
            source,
        })?;
        self.set_error(name, payload.clone());
        Ok(Some(payload))
    }

    /// Do not hold `borrow()` on the receiver across a dispatch.
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.form.subscribe()
    }

    pub async fn submit(&self) -> Result<Option<H::Output>, FormError> {
        self.form.submit().await
    }

    pub fn reset(&self) {
        self.form.reset();
    }
}
