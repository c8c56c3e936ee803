//! Field maps and error payload helpers

use serde_json::{Map, Value};

/// Mapping from field name to a dynamic value.
///
/// Used for values, errors and extras alike. Iteration order is by key.
pub type FieldMap = Map<String, Value>;

/// Returns true when an error payload marks its field as failing.
///
/// Anything but `null` counts, including `false`, `0` and `""`.
pub fn is_error(payload: &Value) -> bool {
    !payload.is_null()
}

/// Build a [`FieldMap`] from name/value pairs
pub fn field_map<I, K>(entries: I) -> FieldMap
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    entries
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect()
}
