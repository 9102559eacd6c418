//! Showon expression grammar
//!
//! An expression is a list of OR-branches separated by `[OR]`. One branch
//! may carry an `[AND]` group: the text before the first `[AND]` stays an
//! ordinary OR-condition, everything after it is a list of conditions that
//! must all hold. Every condition is `field:value`.

use crate::error::{ExpressionFault, Result, ShowOnError};

pub const OR_DELIMITER: &str = "[OR]";
pub const AND_DELIMITER: &str = "[AND]";

/// Trailing marker on a field reference, e.g. `color!:red`
pub const NEGATION_MARKER: char = '!';

/// A reference to another field of the same form, exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    raw: String,
}

impl FieldRef {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }

    /// The reference as written, marker included
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The field name without the negation marker
    pub fn name(&self) -> &str {
        self.raw.strip_suffix(NEGATION_MARKER).unwrap_or(&self.raw)
    }

    pub fn is_negated(&self) -> bool {
        self.raw.ends_with(NEGATION_MARKER)
    }
}

/// One `field:value` atom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: FieldRef,
    pub value: String,
}

impl Condition {
    /// Parse a single atom, splitting on the first `:`
    pub fn parse(fragment: &str) -> Result<Self> {
        check_delimiters(fragment)?;

        let (field, value) = fragment
            .split_once(':')
            .ok_or_else(|| ShowOnError::invalid(fragment, ExpressionFault::MissingSeparator))?;

        if field.is_empty() {
            return Err(ShowOnError::invalid(
                fragment,
                ExpressionFault::EmptyFieldReference,
            ));
        }

        Ok(Self {
            field: FieldRef::new(field),
            value: value.to_string(),
        })
    }
}

/// A parsed showon expression: OR-of-conditions with at most one AND-group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowOnExpression {
    any: Vec<Condition>,
    all: Vec<Condition>,
}

impl ShowOnExpression {
    /// Parse raw showon text. Blank text means "no condition" and yields `None`.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let mut any = Vec::new();
        let mut all = Vec::new();
        let mut seen_and_group = false;

        for branch in raw.split(OR_DELIMITER) {
            match branch.split_once(AND_DELIMITER) {
                Some((head, rest)) => {
                    if seen_and_group {
                        return Err(ShowOnError::invalid(
                            raw,
                            ExpressionFault::MultipleAndGroups,
                        ));
                    }
                    seen_and_group = true;
                    any.push(Condition::parse(head)?);
                    for part in rest.split(AND_DELIMITER) {
                        all.push(Condition::parse(part)?);
                    }
                }
                None => any.push(Condition::parse(branch)?),
            }
        }

        Ok(Some(Self { any, all }))
    }

    /// Conditions of which at least one must hold
    pub fn any(&self) -> &[Condition] {
        &self.any
    }

    /// Conditions that must all hold; empty when there is no AND-group
    pub fn all(&self) -> &[Condition] {
        &self.all
    }

    pub fn has_and_group(&self) -> bool {
        !self.all.is_empty()
    }
}

fn check_delimiters(fragment: &str) -> Result<()> {
    let lower = fragment.to_ascii_lowercase();
    let stray = lower.contains("[and]")
        || lower.contains("[or]")
        || ["[AND", "[OR"].iter().any(|open| {
            fragment
                .match_indices(open)
                .any(|(at, _)| is_boundary(fragment[at + open.len()..].chars().next()))
        })
        || ["AND]", "OR]"].iter().any(|close| {
            fragment
                .match_indices(close)
                .any(|(at, _)| is_boundary(fragment[..at].chars().next_back()))
        });

    if stray {
        return Err(ShowOnError::invalid(
            fragment,
            ExpressionFault::UnmatchedDelimiter,
        ));
    }
    Ok(())
}

/// A delimiter word cut off by something other than a letter or its bracket
fn is_boundary(next: Option<char>) -> bool {
    !matches!(next, Some(c) if c.is_ascii_alphabetic() || c == '[' || c == ']')
}
