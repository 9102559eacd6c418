//! Raw stored field values and loose comparison against showon values

use serde::{Deserialize, Serialize};

/// A raw value as stored by the host for one custom field of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<RawValue>),
}

impl RawValue {
    /// Loose equality against the textual value of a showon condition.
    ///
    /// Follows host form-value semantics: two numeric strings compare as
    /// numbers, numbers compare numerically with numeric strings and
    /// textually otherwise, `null` equals only the empty string, booleans
    /// compare against the truthiness of the text. Lists never match.
    pub fn loosely_equals(&self, expected: &str) -> bool {
        match self {
            RawValue::Null => expected.is_empty(),
            RawValue::Bool(b) => *b == text_truthiness(expected),
            RawValue::Integer(i) => match numeric_value(expected) {
                Some(n) => Number::Int(*i).same_as(n),
                None => i.to_string() == expected,
            },
            RawValue::Float(f) => match numeric_value(expected) {
                Some(n) => Number::Float(*f).same_as(n),
                None => f.to_string() == expected,
            },
            RawValue::Text(s) => match (numeric_value(s), numeric_value(expected)) {
                (Some(a), Some(b)) => a.same_as(b),
                _ => s == expected,
            },
            RawValue::List(_) => false,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

fn text_truthiness(s: &str) -> bool {
    !(s.is_empty() || s == "0")
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Integers compare exactly; anything involving a float compares as f64
    fn same_as(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

/// Parse a numeric string (surrounding whitespace, sign, fraction and
/// exponent allowed). Words such as `inf` or `nan` are not numeric.
fn numeric_value(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut has_digit = false;
    for c in trimmed.chars() {
        match c {
            '0'..='9' => has_digit = true,
            '+' | '-' | '.' | 'e' | 'E' => {}
            _ => return None,
        }
    }
    if !has_digit {
        return None;
    }
    match trimmed.parse::<i64>() {
        Ok(i) => Some(Number::Int(i)),
        Err(_) => trimmed.parse::<f64>().ok().map(Number::Float),
    }
}
