//! Named updates applied to form state

use super::FormState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An update dispatched into the form store.
///
/// Serialized as an internally tagged object, e.g.
/// `{"type": "SET_VALUE", "name": "email", "payload": "a@b.c"}`.
/// A `type` tag that is not recognized deserializes to [`Operation::Unknown`],
/// which leaves state untouched when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Set the current value of a field
    SetValue {
        name: String,
        #[serde(default)]
        payload: Value,
    },
    /// Set or clear (`null`) the error of a field
    SetError {
        name: String,
        #[serde(default)]
        payload: Value,
    },
    /// Set an auxiliary value that is not part of the submitted values
    SetExtra {
        name: String,
        #[serde(default)]
        payload: Value,
    },
    /// Replace the whole state
    Reset { payload: FormState },
    #[serde(other)]
    Unknown,
}

impl Operation {
    pub fn set_value(name: impl Into<String>, payload: Value) -> Self {
        Self::SetValue {
            name: name.into(),
            payload,
        }
    }

    pub fn set_error(name: impl Into<String>, payload: Value) -> Self {
        Self::SetError {
            name: name.into(),
            payload,
        }
    }

    pub fn set_extra(name: impl Into<String>, payload: Value) -> Self {
        Self::SetExtra {
            name: name.into(),
            payload,
        }
    }

    pub fn reset(payload: FormState) -> Self {
        Self::Reset { payload }
    }

    /// Wire name of the operation type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetValue { .. } => "SET_VALUE",
            Self::SetError { .. } => "SET_ERROR",
            Self::SetExtra { .. } => "SET_EXTRA",
            Self::Reset { .. } => "RESET",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_set_value() {
        let op: Operation =
            serde_json::from_value(json!({"type": "SET_VALUE", "name": "a", "payload": 5}))
                .unwrap();
        assert_eq!(op, Operation::set_value("a", json!(5)));
    }

    #[test]
    fn test_deserialize_missing_payload_is_null() {
        let op: Operation =
            serde_json::from_value(json!({"type": "SET_ERROR", "name": "a"})).unwrap();
        assert_eq!(op, Operation::set_error("a", Value::Null));
    }

    #[test]
    fn test_deserialize_unknown_type() {
        let op: Operation =
            serde_json::from_value(json!({"type": "TOGGLE_EVERYTHING"})).unwrap();
        assert_eq!(op, Operation::Unknown);
    }

    #[test]
    fn test_deserialize_reset_payload() {
        let op: Operation = serde_json::from_value(json!({
            "type": "RESET",
            "payload": {
                "initialValues": {"a": 1},
                "values": {"a": 2},
                "errors": {},
                "extras": {"open": true}
            }
        }))
        .unwrap();

        let Operation::Reset { payload } = op else {
            panic!("expected RESET");
        };
        assert_eq!(payload.values.get("a"), Some(&json!(2)));
        assert_eq!(payload.extras.get("open"), Some(&json!(true)));
    }

    #[test]
    fn test_serialize_uses_type_tag() {
        let json = serde_json::to_value(Operation::set_extra("open", json!(true))).unwrap();
        assert_eq!(
            json,
            json!({"type": "SET_EXTRA", "name": "open", "payload": true})
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Operation::set_value("a", Value::Null).kind(), "SET_VALUE");
        assert_eq!(Operation::set_error("a", Value::Null).kind(), "SET_ERROR");
        assert_eq!(Operation::set_extra("a", Value::Null).kind(), "SET_EXTRA");
        assert_eq!(Operation::reset(FormState::default()).kind(), "RESET");
        assert_eq!(Operation::Unknown.kind(), "UNKNOWN");
    }
}
