//! Fixed-point reconciliation of a form's showon fields
//!
//! Showon rules can depend on each other: field A shows on field B, field B
//! shows on field C. When C is missing from the form, B must be resolved on
//! the server, and once B is removed A has to be revisited. Passes repeat
//! until the set of attached fields stops changing.

use crate::error::Result;
use crate::form::{FieldAttribute, FieldSetInfo, FormModel};
use crate::showon::{evaluate, ShowOnExpression, Verdict};
use crate::snapshot::ItemFieldSnapshot;
use serde::Serialize;

/// What to do with a field after evaluating its showon expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Every controlling field is on the form; the renderer decides
    Deferred,
    /// A controlling field is missing and the values show the field
    AlwaysShow,
    /// A controlling field is missing and the values hide the field
    AlwaysHide,
}

impl From<Verdict> for Resolution {
    fn from(verdict: Verdict) -> Self {
        if verdict.all_fields_exist {
            Resolution::Deferred
        } else if verdict.should_display {
            Resolution::AlwaysShow
        } else {
            Resolution::AlwaysHide
        }
    }
}

/// Summary of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub passes: usize,
    /// Declared names of removed fields, in removal order
    pub removed: Vec<String>,
    /// Declared names of fields whose showon was cleared
    pub blanked: Vec<String>,
}

/// Mutate `form` until no pass removes another field of `group`
pub fn reconcile<M>(
    form: &mut M,
    snapshot: &ItemFieldSnapshot,
    group: &str,
) -> Result<ReconcileReport>
where
    M: FormModel + ?Sized,
{
    let field_sets = form.field_sets(group);
    validate(form, &field_sets)?;

    let mut report = ReconcileReport::default();
    let mut last_signature = signature(form, &field_sets);

    loop {
        report.passes += 1;

        for info in &field_sets {
            for field in form.field_set(&info.name) {
                let Some(expr) = ShowOnExpression::parse(&field.showon)? else {
                    continue;
                };

                let verdict = evaluate(&expr, snapshot, |name| {
                    form.get_field(name, group).is_some()
                });

                match Resolution::from(verdict) {
                    Resolution::Deferred => {}
                    Resolution::AlwaysShow => {
                        if form.set_field_attribute(
                            &field.fieldname,
                            FieldAttribute::ShowOn,
                            "",
                            group,
                        ) {
                            report.blanked.push(field.fieldname);
                        }
                    }
                    Resolution::AlwaysHide => {
                        if form.remove_field(&field.fieldname, group) {
                            report.removed.push(field.fieldname);
                        }
                    }
                }
            }
        }

        let current = signature(form, &field_sets);
        tracing::debug!(
            pass = report.passes,
            fields = current.len(),
            "showon reconciliation pass"
        );

        if current == last_signature {
            break;
        }
        last_signature = current;
    }

    Ok(report)
}

/// Parse every showon up front so a bad expression fails before any mutation
fn validate<M>(form: &M, field_sets: &[FieldSetInfo]) -> Result<()>
where
    M: FormModel + ?Sized,
{
    for info in field_sets {
        for field in form.field_set(&info.name) {
            ShowOnExpression::parse(&field.showon)?;
        }
    }
    Ok(())
}

/// Declared names of every attached field, in field set order
fn signature<M>(form: &M, field_sets: &[FieldSetInfo]) -> Vec<String>
where
    M: FormModel + ?Sized,
{
    field_sets
        .iter()
        .flat_map(|info| form.field_set(&info.name))
        .map(|field| field.fieldname)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExpressionFault, ShowOnError};
    use crate::form::{Field, FieldSet, Form, MockFormModel, DEFAULT_FIELDS_GROUP};
    use crate::showon::RawValue;
    use crate::snapshot::FieldValue;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn snapshot(pairs: &[(&str, &str)]) -> ItemFieldSnapshot {
        ItemFieldSnapshot::from_values(
            pairs
                .iter()
                .map(|(name, value)| FieldValue::new(name, RawValue::from(*value)))
                .collect(),
        )
    }

    fn form(fields: Vec<Field>) -> Form {
        Form::new("com_content.article")
            .with_field_set(FieldSet::new("details", DEFAULT_FIELDS_GROUP).with_fields(fields))
    }

    fn run(form: &mut Form, values: &[(&str, &str)]) -> ReconcileReport {
        reconcile(form, &snapshot(values), DEFAULT_FIELDS_GROUP).unwrap()
    }

    mod resolution {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_all_fields_present_defers() {
            let verdict = Verdict {
                should_display: false,
                all_fields_exist: true,
            };
            assert_eq!(Resolution::from(verdict), Resolution::Deferred);
        }

        #[test]
        fn test_missing_field_and_shown() {
            let verdict = Verdict {
                should_display: true,
                all_fields_exist: false,
            };
            assert_eq!(Resolution::from(verdict), Resolution::AlwaysShow);
        }

        #[test]
        fn test_missing_field_and_hidden() {
            let verdict = Verdict {
                should_display: false,
                all_fields_exist: false,
            };
            assert_eq!(Resolution::from(verdict), Resolution::AlwaysHide);
        }
    }

    mod single_pass {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_present_controls_leave_form_untouched() {
            let mut f = form(vec![
                Field::new("color"),
                Field::new("shade").with_showon("color:red[OR]color:blue"),
            ]);
            let before = f.clone();
            let report = run(&mut f, &[("color", "blue")]);
            assert_eq!(f, before);
            assert_eq!(report.passes, 1);
        }

        #[test]
        fn test_missing_control_and_hidden_removes_field() {
            let mut f = form(vec![
                Field::new("size"),
                Field::new("restock").with_showon("size:large[AND]stock:0"),
            ]);
            let report = run(&mut f, &[("size", "large"), ("stock", "5")]);
            assert_eq!(f.field_names(), vec!["size"]);
            assert_eq!(report.removed, vec!["restock"]);
        }

        #[test]
        fn test_missing_control_without_value_removes_field() {
            let mut f = form(vec![Field::new("state").with_showon("country:US")]);
            run(&mut f, &[]);
            assert!(f.field_names().is_empty());
        }

        #[test]
        fn test_missing_control_and_shown_blanks_showon() {
            let mut f = form(vec![Field::new("state").with_showon("country:US")]);
            let report = run(&mut f, &[("country", "US")]);
            let field = f.get_field("state", DEFAULT_FIELDS_GROUP).unwrap();
            assert_eq!(field.showon, "");
            assert_eq!(report.blanked, vec!["state"]);
            assert!(report.removed.is_empty());
        }

        #[test]
        fn test_invalid_expression_is_reported() {
            let mut f = form(vec![Field::new("state").with_showon("country")]);
            assert!(reconcile(&mut f, &snapshot(&[]), DEFAULT_FIELDS_GROUP).is_err());
        }

        #[test]
        fn test_other_groups_are_ignored() {
            let mut f = form(vec![]).with_field_set(
                FieldSet::new("basic", "params")
                    .with_fields(vec![Field::new("layout").with_showon("missing:1")]),
            );
            let before = f.clone();
            run(&mut f, &[]);
            assert_eq!(f, before);
        }
    }

    mod fixed_point {
        use super::*;
        use pretty_assertions::assert_eq;

        fn chain() -> Vec<Field> {
            vec![
                Field::new("b").with_showon("c:1"),
                Field::new("c").with_showon("e:1"),
                Field::new("d"),
            ]
        }

        #[test]
        fn test_dependent_field_removed_in_later_pass() {
            let mut f = form(chain());
            let report = run(&mut f, &[("c", "0"), ("e", "2")]);
            assert_eq!(f.field_names(), vec!["d"]);
            assert_eq!(report.removed, vec!["c", "b"]);
            assert_eq!(report.passes, 3);
        }

        #[test]
        fn test_dependent_field_blanked_in_later_pass() {
            let mut f = form(chain());
            let report = run(&mut f, &[("c", "1"), ("e", "2")]);
            assert_eq!(f.field_names(), vec!["b", "d"]);
            assert_eq!(report.blanked, vec!["b"]);
            assert_eq!(report.passes, 2);
        }

        #[test]
        fn test_second_run_is_a_no_op() {
            let mut f = form(chain());
            let values = [("c", "0"), ("e", "2")];
            run(&mut f, &values);
            let stable = f.clone();

            let report = run(&mut f, &values);
            assert_eq!(f, stable);
            assert_eq!(report.passes, 1);
            assert!(report.removed.is_empty());
            assert!(report.blanked.is_empty());
        }

        #[test]
        fn test_terminates_within_field_count_plus_one_passes() {
            let n = 6;
            let fields: Vec<Field> = (0..n)
                .map(|i| Field::new(&format!("f{i}")).with_showon(&format!("f{}:1", i + 1)))
                .collect();
            let mut f = form(fields);

            let report = run(&mut f, &[]);
            assert!(f.field_names().is_empty());
            assert_eq!(report.passes, n + 1);
        }

        #[test]
        fn test_invalid_expression_leaves_form_untouched() {
            let mut f = form(vec![
                Field::new("a").with_showon("gone:1"),
                Field::new("b").with_showon("broken"),
            ]);
            let before = f.clone();

            let err = reconcile(&mut f, &snapshot(&[]), DEFAULT_FIELDS_GROUP).unwrap_err();
            assert!(matches!(
                err,
                ShowOnError::InvalidExpression {
                    reason: ExpressionFault::MissingSeparator,
                    ..
                }
            ));
            assert_eq!(f, before);
            assert_eq!(f.field_names(), vec!["a", "b"]);
        }

        #[test]
        fn test_across_field_sets() {
            let mut f = Form::new("com_content.article")
                .with_field_set(
                    FieldSet::new("first", DEFAULT_FIELDS_GROUP)
                        .with_fields(vec![Field::new("a").with_showon("b:1")]),
                )
                .with_field_set(
                    FieldSet::new("second", DEFAULT_FIELDS_GROUP)
                        .with_fields(vec![Field::new("b").with_showon("gone:1")]),
                );
            let report = run(&mut f, &[("a", "1")]);
            assert!(f.field_names().is_empty());
            assert_eq!(report.removed, vec!["b", "a"]);
        }
    }

    #[test]
    fn test_removal_goes_through_form_model() {
        let mut model = MockFormModel::new();
        model.expect_field_sets().returning(|_| {
            vec![FieldSetInfo {
                name: "details".to_string(),
                label: None,
            }]
        });
        model
            .expect_field_set()
            .returning(|_| vec![Field::new("state").with_showon("country:US")]);
        model.expect_get_field().returning(|_, _| None);
        model
            .expect_remove_field()
            .with(eq("state"), eq(DEFAULT_FIELDS_GROUP))
            .times(1)
            .returning(|_, _| true);
        model.expect_set_field_attribute().never();

        let report = reconcile(&mut model, &snapshot(&[]), DEFAULT_FIELDS_GROUP).unwrap();
        assert_eq!(report.removed, vec!["state"]);
    }
}
