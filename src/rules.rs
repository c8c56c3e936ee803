//! Per-field validation rules
//!
//! A rule maps a field's current value to an error payload, where `null`
//! means the value is valid.

use crate::state::is_error;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A synchronous field validator
pub type Rule = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;

/// Rules keyed by field name
#[derive(Clone, Default)]
pub struct Rules {
    rules: HashMap<String, Rule>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an infallible rule for a field, replacing any previous one
    pub fn field<F>(self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.try_field(name, move |value| Ok(rule(value)))
    }

    /// Add a rule that may fail outright
    pub fn try_field<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.rules.insert(name.into(), rule_fn(rule));
        self
    }

    /// Add an already built rule, e.g. one of the stock rules below
    pub fn with(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    /// Add an already built rule in place
    pub fn insert(&mut self, name: impl Into<String>, rule: Rule) {
        self.rules.insert(name.into(), rule);
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("Rules").field("fields", &names).finish()
    }
}

/// Wrap a closure as a [`Rule`]
pub fn rule_fn<F>(rule: F) -> Rule
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(rule)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Length of strings (in chars) and arrays; other values have none
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Fails null, blank strings and empty arrays
pub fn required(message: impl Into<String>) -> Rule {
    let message = Value::String(message.into());
    rule_fn(move |value| {
        Ok(if is_blank(value) {
            message.clone()
        } else {
            Value::Null
        })
    })
}

/// Fails strings or arrays shorter than `min`. Blank values pass;
/// combine with [`required`] to reject them.
pub fn min_length(min: usize, message: impl Into<String>) -> Rule {
    let message = Value::String(message.into());
    rule_fn(move |value| {
        Ok(match length_of(value) {
            Some(len) if len > 0 && len < min => message.clone(),
            _ => Value::Null,
        })
    })
}

/// Fails strings or arrays longer than `max`
pub fn max_length(max: usize, message: impl Into<String>) -> Rule {
    let message = Value::String(message.into());
    rule_fn(move |value| {
        Ok(match length_of(value) {
            Some(len) if len > max => message.clone(),
            _ => Value::Null,
        })
    })
}

/// Fails numbers that are not strictly positive, and non-numbers
pub fn positive(message: impl Into<String>) -> Rule {
    let message = Value::String(message.into());
    rule_fn(move |value| {
        Ok(match value.as_f64() {
            Some(n) if n > 0.0 => Value::Null,
            _ => message.clone(),
        })
    })
}

/// Runs rules in order and returns the first error payload
pub fn all_of(rules: Vec<Rule>) -> Rule {
    rule_fn(move |value| {
        for rule in &rules {
            let payload = rule(value)?;
            if is_error(&payload) {
                return Ok(payload);
            }
        }
        Ok(Value::Null)
    })
}
