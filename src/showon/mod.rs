//! Showon expressions: grammar, values and evaluation

mod evaluator;
mod expression;
mod value;

pub use evaluator::{evaluate, should_display, Verdict};
pub use expression::{
    Condition, FieldRef, ShowOnExpression, AND_DELIMITER, NEGATION_MARKER, OR_DELIMITER,
};
pub use value::RawValue;
