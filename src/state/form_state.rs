//! Form state and the reducer that transitions it

use super::field::{is_error, FieldMap};
use super::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Canonical state of one form instance.
///
/// Each mapping sits behind an `Arc`: applying an operation builds a new
/// `FormState` that shares every mapping the operation did not touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    /// Baseline values, fixed until the next reset
    pub initial_values: Arc<FieldMap>,
    /// Current values
    pub values: Arc<FieldMap>,
    /// Error payload per field; `null` means no error
    #[serde(default)]
    pub errors: Arc<FieldMap>,
    /// Out-of-band data that is not submitted
    #[serde(default)]
    pub extras: Arc<FieldMap>,
}

impl FormState {
    /// Fresh state: current values start as the initial values, no errors.
    pub fn initial(initial_values: FieldMap, initial_extras: FieldMap) -> Self {
        Self::from_shared(Arc::new(initial_values), Arc::new(initial_extras))
    }

    /// Fresh state built from already shared mappings.
    ///
    /// `values` and `initial_values` are the same allocation afterwards.
    pub fn from_shared(initial_values: Arc<FieldMap>, initial_extras: Arc<FieldMap>) -> Self {
        Self {
            values: Arc::clone(&initial_values),
            initial_values,
            errors: Arc::default(),
            extras: initial_extras,
        }
    }

    /// Apply an operation, returning the next state
    pub fn apply(&self, operation: Operation) -> FormState {
        match operation {
            Operation::SetValue { name, payload } => Self {
                values: with_entry(&self.values, name, payload),
                ..self.clone()
            },
            Operation::SetError { name, payload } => Self {
                errors: with_entry(&self.errors, name, payload),
                ..self.clone()
            },
            Operation::SetExtra { name, payload } => Self {
                extras: with_entry(&self.extras, name, payload),
                ..self.clone()
            },
            Operation::Reset { payload } => payload,
            Operation::Unknown => {
                tracing::debug!("Ignoring unknown form operation");
                self.clone()
            }
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The error of a field, if it is failing
    pub fn error(&self, name: &str) -> Option<&Value> {
        self.errors.get(name).filter(|payload| is_error(payload))
    }

    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extras.get(name)
    }

    /// True if any field currently carries a non-null error
    pub fn has_errors(&self) -> bool {
        self.errors.values().any(is_error)
    }

    /// True if the current values differ from the initial values
    pub fn is_dirty(&self) -> bool {
        !Arc::ptr_eq(&self.values, &self.initial_values) && self.values != self.initial_values
    }

    /// Names whose current value differs from the initial one, sorted.
    ///
    /// A field present on only one side counts as changed.
    pub fn dirty_fields(&self) -> Vec<String> {
        if Arc::ptr_eq(&self.values, &self.initial_values) {
            return Vec::new();
        }
        let names: BTreeSet<&String> = self
            .values
            .keys()
            .chain(self.initial_values.keys())
            .collect();
        names
            .into_iter()
            .filter(|name| self.values.get(*name) != self.initial_values.get(*name))
            .cloned()
            .collect()
    }
}

fn with_entry(map: &Arc<FieldMap>, name: String, payload: Value) -> Arc<FieldMap> {
    let mut next = FieldMap::clone(map);
    next.insert(name, payload);
    Arc::new(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::field_map;
    use serde_json::json;

    fn sample_state() -> FormState {
        let state = FormState::initial(
            field_map([("a", json!(1)), ("b", json!("text"))]),
            field_map([("open", json!(false))]),
        );
        state.apply(Operation::set_error("b", json!("too short")))
    }

    mod initial {
        use super::*;

        #[test]
        fn test_values_share_initial_values() {
            let state = FormState::initial(field_map([("a", json!(1))]), FieldMap::new());
            assert!(Arc::ptr_eq(&state.values, &state.initial_values));
            assert!(state.errors.is_empty());
            assert!(state.extras.is_empty());
        }

        #[test]
        fn test_from_shared_keeps_extras_allocation() {
            let extras = Arc::new(field_map([("open", json!(true))]));
            let state = FormState::from_shared(Arc::new(FieldMap::new()), Arc::clone(&extras));
            assert!(Arc::ptr_eq(&state.extras, &extras));
        }

        #[test]
        fn test_default_is_empty() {
            let state = FormState::default();
            assert!(state.values.is_empty());
            assert!(!state.has_errors());
            assert!(!state.is_dirty());
        }
    }

    mod apply {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_set_value_only_touches_values() {
            let state = sample_state();
            let next = state.apply(Operation::set_value("a", json!(2)));

            assert_eq!(next.value("a"), Some(&json!(2)));
            assert_eq!(state.value("a"), Some(&json!(1)));
            assert!(Arc::ptr_eq(&next.initial_values, &state.initial_values));
            assert!(Arc::ptr_eq(&next.errors, &state.errors));
            assert!(Arc::ptr_eq(&next.extras, &state.extras));
        }

        #[test]
        fn test_set_value_adds_new_field() {
            let next = sample_state().apply(Operation::set_value("c", json!([1, 2])));
            assert_eq!(next.value("c"), Some(&json!([1, 2])));
            assert_eq!(next.values.len(), 3);
        }

        #[test]
        fn test_set_error_only_touches_errors() {
            let state = sample_state();
            let next = state.apply(Operation::set_error("a", json!("bad")));

            assert_eq!(next.error("a"), Some(&json!("bad")));
            assert_eq!(next.error("b"), Some(&json!("too short")));
            assert!(Arc::ptr_eq(&next.values, &state.values));
            assert!(Arc::ptr_eq(&next.extras, &state.extras));
        }

        #[test]
        fn test_set_error_null_clears() {
            let next = sample_state().apply(Operation::set_error("b", Value::Null));
            assert_eq!(next.error("b"), None);
            assert_eq!(next.errors.get("b"), Some(&Value::Null));
            assert!(!next.has_errors());
        }

        #[test]
        fn test_set_extra_only_touches_extras() {
            let state = sample_state();
            let next = state.apply(Operation::set_extra("open", json!(true)));

            assert_eq!(next.extra("open"), Some(&json!(true)));
            assert!(Arc::ptr_eq(&next.values, &state.values));
            assert!(Arc::ptr_eq(&next.errors, &state.errors));
        }

        #[test]
        fn test_reset_returns_payload_verbatim() {
            let payload = FormState::initial(field_map([("z", json!(9))]), FieldMap::new());
            let next = sample_state().apply(Operation::reset(payload.clone()));

            assert_eq!(next, payload);
            assert!(Arc::ptr_eq(&next.values, &payload.values));
        }

        #[test]
        fn test_unknown_returns_state_unchanged() {
            let state = sample_state();
            let next = state.apply(Operation::Unknown);

            assert_eq!(next, state);
            assert!(Arc::ptr_eq(&next.values, &state.values));
            assert!(Arc::ptr_eq(&next.errors, &state.errors));
        }

        #[test]
        fn test_apply_is_repeatable() {
            let state = sample_state();
            let op = Operation::set_value("a", json!(42));
            assert_eq!(state.apply(op.clone()), state.apply(op));
        }
    }

    mod queries {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_has_errors() {
            let state = sample_state();
            assert!(state.has_errors());
        }

        #[test]
        fn test_is_dirty_after_change() {
            let state = sample_state();
            assert!(!state.is_dirty());
            let next = state.apply(Operation::set_value("a", json!(5)));
            assert!(next.is_dirty());
        }

        #[test]
        fn test_is_dirty_false_when_value_restored() {
            let next = sample_state()
                .apply(Operation::set_value("a", json!(5)))
                .apply(Operation::set_value("a", json!(1)));
            assert!(!next.is_dirty());
        }

        #[test]
        fn test_dirty_fields_lists_changed_and_added() {
            let next = sample_state()
                .apply(Operation::set_value("b", json!("other")))
                .apply(Operation::set_value("c", json!(true)));
            assert_eq!(next.dirty_fields(), vec!["b".to_string(), "c".to_string()]);
        }

        #[test]
        fn test_serializes_camel_case() {
            let json = serde_json::to_value(sample_state()).unwrap();
            assert!(json.get("initialValues").is_some());
            assert_eq!(json["errors"]["b"], json!("too short"));
        }
    }
}
