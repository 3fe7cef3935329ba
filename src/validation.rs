//! Field validators and the declarative rule tables built on them.
//!
//! A table maps each field name to the ordered checks it must pass. Checks on
//! one field stop at the first failure; every field is visited so that all
//! failing fields are reported together.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FieldViolation, ValidationError};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_non_empty_string(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_non_empty_string_list(values: &[String]) -> bool {
    !values.is_empty() && values.iter().all(|v| is_non_empty_string(v))
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Borrowed view of a field's value as the rule table sees it.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    NonEmptyString,
    NonEmptyStringList,
    Email,
}

impl Check {
    pub fn passes(self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (Check::NonEmptyString, FieldValue::Text(text)) => is_non_empty_string(text),
            (Check::NonEmptyStringList, FieldValue::List(items)) => {
                is_non_empty_string_list(items)
            }
            (Check::Email, FieldValue::Text(text)) => is_valid_email(text),
            _ => false,
        }
    }
}

pub struct FieldRule<T> {
    pub field: &'static str,
    pub value: fn(&T) -> FieldValue<'_>,
    pub checks: &'static [(Check, &'static str)],
}

pub fn validate<T>(record: &T, rules: &[FieldRule<T>]) -> Result<(), ValidationError> {
    let violations: Vec<FieldViolation> = rules
        .iter()
        .filter_map(|rule| {
            let value = (rule.value)(record);
            rule.checks
                .iter()
                .find(|(check, _)| !check.passes(value))
                .map(|&(_, message)| FieldViolation {
                    field: rule.field,
                    message,
                })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        name: String,
        contact: String,
        labels: Vec<String>,
    }

    const RULES: &[FieldRule<Sample>] = &[
        FieldRule {
            field: "name",
            value: |s| FieldValue::Text(&s.name),
            checks: &[(Check::NonEmptyString, "Name is required.")],
        },
        FieldRule {
            field: "contact",
            value: |s| FieldValue::Text(&s.contact),
            checks: &[
                (Check::NonEmptyString, "Contact is required."),
                (Check::Email, "Contact must be a valid email address."),
            ],
        },
        FieldRule {
            field: "labels",
            value: |s| FieldValue::List(&s.labels),
            checks: &[(Check::NonEmptyStringList, "Labels must contain at least one item.")],
        },
    ];

    #[test]
    fn predicates() {
        assert!(is_non_empty_string(" x "));
        assert!(!is_non_empty_string(" \t\n"));
        assert!(is_non_empty_string_list(&["a".into(), "b".into()]));
        assert!(!is_non_empty_string_list(&[]));
        assert!(!is_non_empty_string_list(&["a".into(), "  ".into()]));
        assert!(is_valid_email(" Ada@Example.org "));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example@x.org"));
        assert!(!is_valid_email("@example.org"));
    }

    #[test]
    fn mismatched_value_kind_fails_the_check() {
        assert!(!Check::NonEmptyStringList.passes(FieldValue::Text("x")));
        assert!(!Check::NonEmptyString.passes(FieldValue::List(&[])));
    }

    #[test]
    fn reports_every_failing_field_once() {
        let sample = Sample {
            name: "  ".into(),
            contact: "".into(),
            labels: vec!["ok".into(), "".into()],
        };
        let err = validate(&sample, RULES).unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                FieldViolation {
                    field: "name",
                    message: "Name is required."
                },
                FieldViolation {
                    field: "contact",
                    message: "Contact is required."
                },
                FieldViolation {
                    field: "labels",
                    message: "Labels must contain at least one item."
                },
            ]
        );
    }

    #[test]
    fn later_checks_run_when_earlier_ones_pass() {
        let sample = Sample {
            name: "Ada".into(),
            contact: "not-an-email".into(),
            labels: vec!["rust".into()],
        };
        let err = validate(&sample, RULES).unwrap_err();
        assert_eq!(err.fields(), vec!["contact"]);
        assert_eq!(err.violations[0].message, "Contact must be a valid email address.");

        let valid = Sample {
            contact: "ada@example.org".into(),
            ..sample
        };
        assert!(validate(&valid, RULES).is_ok());
    }
}
