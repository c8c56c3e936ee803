//! Scripted form runs for the command-line driver
//!
//! A script seeds a form, dispatches operations into it, optionally
//! submits and resets it, and reports the outcome with the final state.

use crate::config::FormConfig;
use crate::error::FormError;
use crate::form::Form;
use crate::rules::{self, Rule, Rules};
use crate::state::{FieldMap, FormState, Operation};
use crate::submit::{active_fields, submit_fn, SubmitContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Declarative form of the stock rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    Required {
        message: Option<String>,
    },
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Positive {
        message: Option<String>,
    },
}

impl RuleSpec {
    pub fn to_rule(&self) -> Rule {
        match self {
            Self::Required { message } => {
                rules::required(message.as_deref().unwrap_or("This field is required"))
            }
            Self::MinLength { min, message } => rules::min_length(
                *min,
                message
                    .clone()
                    .unwrap_or_else(|| format!("Must be at least {min} characters")),
            ),
            Self::MaxLength { max, message } => rules::max_length(
                *max,
                message
                    .clone()
                    .unwrap_or_else(|| format!("Must be at most {max} characters")),
            ),
            Self::Positive { message } => {
                rules::positive(message.as_deref().unwrap_or("Must be a positive number"))
            }
        }
    }
}

fn default_submit() -> bool {
    true
}

/// A scripted form run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormScript {
    pub initial_values: FieldMap,
    #[serde(default)]
    pub initial_extras: FieldMap,
    /// Rules per field; several rules for one field run in order
    #[serde(default)]
    pub rules: BTreeMap<String, Vec<RuleSpec>>,
    /// Restrict submit validation to these fields
    #[serde(default)]
    pub active_fields: Option<Vec<String>>,
    /// Operations dispatched before submitting
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Errors the stand-in submit handler reports instead of accepting
    #[serde(default)]
    pub submit_errors: FieldMap,
    #[serde(default = "default_submit")]
    pub submit: bool,
    /// Reset after submitting
    #[serde(default)]
    pub reset: bool,
}

impl FormScript {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    fn build_rules(&self) -> Rules {
        self.rules
            .iter()
            .fold(Rules::new(), |acc, (name, specs)| {
                let rule = match specs.as_slice() {
                    [single] => single.to_rule(),
                    specs => rules::all_of(specs.iter().map(RuleSpec::to_rule).collect()),
                };
                acc.with(name.clone(), rule)
            })
    }
}

/// How the submit step of a script ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    NotSubmitted,
    /// Validation failed; errors were written
    Invalid,
    /// Validation passed but the handler left failing fields behind
    Rejected,
    Accepted,
}

/// Result of a script run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptOutcome {
    pub outcome: SubmitOutcome,
    /// What the submit handler returned, if it ran
    pub result: Option<Value>,
    pub state: FormState,
}

/// Run a script against a fresh form
pub async fn run_script(script: FormScript, config: &FormConfig) -> Result<ScriptOutcome, FormError> {
    let submit_errors = Arc::new(script.submit_errors.clone());
    let handler = submit_fn(move |values: Arc<FieldMap>, ctx: SubmitContext| {
        let submit_errors = Arc::clone(&submit_errors);
        async move {
            if !submit_errors.is_empty() {
                ctx.set_errors(FieldMap::clone(&submit_errors));
            }
            Ok(Value::Object(FieldMap::clone(&values)))
        }
    });

    let mut builder = Form::builder(script.initial_values.clone(), handler)
        .initial_extras(script.initial_extras.clone())
        .rules(script.build_rules())
        .config(config);
    if let Some(fields) = script.active_fields.clone() {
        builder = builder.active_fields(active_fields(move |_, _| fields.clone()));
    }
    let form = builder.build();

    for operation in script.operations {
        form.dispatch(operation);
    }

    let (outcome, result) = if script.submit {
        match form.submit().await? {
            None => (SubmitOutcome::Invalid, None),
            Some(output) if form.state().has_errors() => (SubmitOutcome::Rejected, Some(output)),
            Some(output) => (SubmitOutcome::Accepted, Some(output)),
        }
    } else {
        (SubmitOutcome::NotSubmitted, None)
    };
    tracing::info!("Script submit outcome: {outcome:?}");

    if script.reset {
        form.reset();
    }

    Ok(ScriptOutcome {
        outcome,
        result,
        state: form.state(),
    })
}
