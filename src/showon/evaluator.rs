//! Evaluates showon expressions against one item's stored field values

use super::expression::{Condition, ShowOnExpression};
use crate::error::Result;
use crate::snapshot::ItemFieldSnapshot;

/// Outcome of evaluating one expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// The stored values satisfy the expression
    pub should_display: bool,
    /// Every referenced field is part of the current form
    pub all_fields_exist: bool,
}

/// Evaluate `expr` for one item.
///
/// A failing AND-condition hides the field whatever the OR-branches say;
/// the OR-branches are still walked so that `all_fields_exist` covers every
/// reference. `is_present` answers whether a field is attached to the form,
/// which is a different question from whether the item has a stored value.
pub fn evaluate<F>(expr: &ShowOnExpression, snapshot: &ItemFieldSnapshot, is_present: F) -> Verdict
where
    F: Fn(&str) -> bool,
{
    let mut all_fields_exist = true;
    let mut and_failed = false;

    for condition in expr.all() {
        all_fields_exist = all_fields_exist && is_present(condition.field.as_str());
        if !matches(condition, snapshot) {
            and_failed = true;
        }
    }

    let mut or_matched = false;
    for condition in expr.any() {
        all_fields_exist = all_fields_exist && is_present(condition.field.as_str());
        or_matched |= matches(condition, snapshot);
    }

    Verdict {
        should_display: !and_failed && or_matched,
        all_fields_exist,
    }
}

/// Render-time decision for raw showon text. Blank text always displays.
pub fn should_display(raw: &str, snapshot: &ItemFieldSnapshot) -> Result<bool> {
    Ok(match ShowOnExpression::parse(raw)? {
        Some(expr) => evaluate(&expr, snapshot, |_| true).should_display,
        None => true,
    })
}

fn matches(condition: &Condition, snapshot: &ItemFieldSnapshot) -> bool {
    snapshot
        .get(condition.field.as_str())
        .is_some_and(|value| value.loosely_equals(&condition.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::showon::RawValue;
    use crate::snapshot::FieldValue;
    use std::collections::HashSet;

    fn snapshot(pairs: &[(&str, &str)]) -> ItemFieldSnapshot {
        ItemFieldSnapshot::from_values(
            pairs
                .iter()
                .map(|(name, value)| FieldValue::new(name, RawValue::from(*value)))
                .collect(),
        )
    }

    fn run(raw: &str, values: &[(&str, &str)], present: &[&str]) -> Verdict {
        let expr = ShowOnExpression::parse(raw).unwrap().unwrap();
        let present: HashSet<&str> = present.iter().copied().collect();
        evaluate(&expr, &snapshot(values), |name| present.contains(name))
    }

    mod or_branches {
        use super::*;

        #[test]
        fn test_one_matching_branch_displays() {
            let verdict = run(
                "color:red[OR]color:blue",
                &[("color", "blue")],
                &["color"],
            );
            assert_eq!(
                verdict,
                Verdict {
                    should_display: true,
                    all_fields_exist: true
                }
            );
        }

        #[test]
        fn test_no_matching_branch_hides() {
            let verdict = run("color:red[OR]color:blue", &[("color", "green")], &["color"]);
            assert!(!verdict.should_display);
        }

        #[test]
        fn test_missing_value_never_matches() {
            let verdict = run("country:US", &[], &[]);
            assert_eq!(
                verdict,
                Verdict {
                    should_display: false,
                    all_fields_exist: false
                }
            );
        }

        #[test]
        fn test_value_without_form_field_still_matches() {
            let verdict = run("country:US", &[("country", "US")], &[]);
            assert!(verdict.should_display);
            assert!(!verdict.all_fields_exist);
        }
    }

    mod and_group {
        use super::*;

        #[test]
        fn test_failed_and_condition_hides() {
            let verdict = run(
                "size:large[AND]stock:0",
                &[("size", "large"), ("stock", "5")],
                &["size", "stock"],
            );
            assert!(!verdict.should_display);
            assert!(verdict.all_fields_exist);
        }

        #[test]
        fn test_failed_and_condition_overrides_matching_or() {
            let verdict = run(
                "a:1[OR]size:large[AND]stock:0",
                &[("a", "1"), ("size", "large"), ("stock", "5")],
                &["a", "size", "stock"],
            );
            assert!(!verdict.should_display);
        }

        #[test]
        fn test_all_conditions_hold() {
            let verdict = run(
                "size:large[AND]stock:0",
                &[("size", "large"), ("stock", "0")],
                &["size", "stock"],
            );
            assert!(verdict.should_display);
        }

        #[test]
        fn test_and_group_reference_counts_for_presence() {
            let verdict = run(
                "size:large[AND]stock:0",
                &[("size", "large"), ("stock", "5")],
                &["size"],
            );
            assert!(!verdict.all_fields_exist);
        }

        #[test]
        fn test_or_references_checked_after_and_failure() {
            let verdict = run(
                "a:1[OR]b:2[AND]c:3",
                &[("c", "4")],
                &["b", "c"],
            );
            assert!(!verdict.should_display);
            assert!(!verdict.all_fields_exist);
        }
    }

    mod render_time {
        use super::*;

        #[test]
        fn test_blank_expression_displays() {
            assert!(should_display("  ", &snapshot(&[])).unwrap());
        }

        #[test]
        fn test_hidden_by_values() {
            assert!(!should_display("color:red", &snapshot(&[("color", "blue")])).unwrap());
        }

        #[test]
        fn test_shown_by_values() {
            assert!(should_display("color:red", &snapshot(&[("color", "red")])).unwrap());
        }

        #[test]
        fn test_malformed_expression_is_an_error() {
            assert!(should_display("color", &snapshot(&[])).is_err());
        }
    }

    #[test]
    fn test_negated_reference_is_looked_up_as_written() {
        let verdict = run("color!:red", &[("color", "blue")], &["color"]);
        assert_eq!(
            verdict,
            Verdict {
                should_display: false,
                all_fields_exist: false
            }
        );
    }
}
