//! Form state, operations and the store

mod field;
mod form_state;
mod operation;
mod store;

pub use field::{field_map, is_error, FieldMap};
pub use form_state::FormState;
pub use operation::Operation;
pub use store::Dispatcher;
