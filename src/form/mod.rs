//! Form domain layer
//!
//! The host owns the real form; showon processing only sees it through
//! [`FormModel`].

mod field;
mod model;

pub use field::{Field, FieldAttribute, FieldSetInfo};
pub use model::{FieldSet, Form, FormModel, DEFAULT_FIELDS_GROUP};

#[cfg(test)]
pub use model::MockFormModel;
