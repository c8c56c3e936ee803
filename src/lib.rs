//! formstate - form state store and submission coordinator
//!
//! Holds field values, per-field errors and auxiliary extras for one form,
//! applies named operations to that state through a reducer, and runs the
//! validate → collect errors → submit pipeline.
//!
//! ```no_run
//! use formstate::{field_map, rules, submit_fn, Form, Operation, Rules};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), formstate::FormError> {
//! let form = Form::builder(
//!     field_map([("email", json!(""))]),
//!     submit_fn(|values, _ctx| async move { Ok(values.len()) }),
//! )
//! .rules(Rules::new().with("email", rules::required("Email is required")))
//! .build();
//!
//! form.dispatch(Operation::set_value("email", json!("ada@example.com")));
//! assert_eq!(form.submit().await?, Some(1));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod form;
pub mod rules;
pub mod script;
pub mod state;
pub mod submit;

pub use config::FormConfig;
pub use error::FormError;
pub use form::{Form, FormBuilder, FormContext, HostEvent};
pub use rules::{Rule, Rules};
pub use state::{field_map, is_error, Dispatcher, FieldMap, FormState, Operation};
pub use submit::{
    active_fields, reset_form, submit_fn, submit_form, validation_fn, ActiveFields,
    CrossFieldValidation, ErrorSink, Identity, SubmitContext, SubmitHandler, SubmitPolicy,
};
