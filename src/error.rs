//! Error types for showon processing

use std::fmt;
use thiserror::Error;

/// Why a showon fragment was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionFault {
    /// A condition has no `:` between field reference and value
    MissingSeparator,
    /// The part before `:` is empty
    EmptyFieldReference,
    /// A `[AND`/`[OR` token that is not a complete delimiter
    UnmatchedDelimiter,
    /// `[AND]` appears in more than one OR-branch
    MultipleAndGroups,
}

impl fmt::Display for ExpressionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExpressionFault::MissingSeparator => "missing ':' between field and value",
            ExpressionFault::EmptyFieldReference => "empty field reference",
            ExpressionFault::UnmatchedDelimiter => "unmatched [AND]/[OR] delimiter",
            ExpressionFault::MultipleAndGroups => "only one OR-branch may carry an [AND] group",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum ShowOnError {
    #[error("invalid showon expression {fragment:?}: {reason}")]
    InvalidExpression {
        fragment: String,
        reason: ExpressionFault,
    },

    #[error("malformed subform source in field {field:?}: {message}")]
    MalformedSubform { field: String, message: String },

    #[error("could not load field values for {context:?}: {message}")]
    SnapshotUnavailable { context: String, message: String },
}

impl ShowOnError {
    pub(crate) fn invalid(fragment: &str, reason: ExpressionFault) -> Self {
        ShowOnError::InvalidExpression {
            fragment: fragment.to_string(),
            reason,
        }
    }

    pub(crate) fn malformed(field: &str, message: impl fmt::Display) -> Self {
        ShowOnError::MalformedSubform {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShowOnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_expression_names_fragment() {
        let err = ShowOnError::invalid("color", ExpressionFault::MissingSeparator);
        let text = err.to_string();
        assert!(text.contains("\"color\""));
        assert!(text.contains("missing ':'"));
    }

    #[test]
    fn test_malformed_subform_names_field() {
        let err = ShowOnError::malformed("tour-dates", "unexpected end of input");
        assert_eq!(
            err.to_string(),
            "malformed subform source in field \"tour-dates\": unexpected end of input"
        );
    }
}
