//! Request schemas and the aggregate validator.
//!
//! A [`RequestSchema`] is the frozen, ordered list of named field specs for
//! one request shape. Shapes are declared once as statics; validation only
//! ever iterates the frozen list.

use serde_json::{Map, Value};

use crate::error::{FieldIssue, ValidationFailure};
use crate::fields::FieldSpec;

/// The frozen set of named field specs for one request shape.
#[derive(Debug, Clone, Copy)]
pub struct RequestSchema {
    pub type_name: &'static str,
    pub fields: &'static [(&'static str, FieldSpec)],
}

/// A raw mapping run through a schema.
///
/// Created empty and populated field by field: every supplied value lands in
/// `values` whether or not it validated, so partially-invalid requests still
/// carry their raw input; `filled` holds the fields that were present,
/// non-empty and individually valid; `issues` holds every recorded problem
/// in schema declaration order.
#[derive(Debug, Clone, Default)]
pub struct ValidatedRequest {
    pub values: Map<String, Value>,
    pub filled: Vec<String>,
    pub issues: Vec<FieldIssue>,
}

impl ValidatedRequest {
    pub fn is_filled(&self, field: &str) -> bool {
        self.filled.iter().any(|f| f == field)
    }

    /// The aggregate failure, if any issue was recorded.
    pub fn failure(&self) -> Option<ValidationFailure> {
        if self.issues.is_empty() {
            None
        } else {
            Some(ValidationFailure::new(self.issues.clone()))
        }
    }

    /// Fails with the aggregate if any issue was recorded.
    pub fn checked(self) -> Result<Self, ValidationFailure> {
        match self.failure() {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }
}

/// A value counts as empty iff it is JSON null, the empty string, the empty
/// array or the empty object. Absence is handled separately. Nothing else,
/// zero included, is empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl RequestSchema {
    /// Runs every declared field against the raw mapping and aggregates all
    /// issues; there is no short-circuit on the first bad field.
    pub fn validate(&self, raw: &Map<String, Value>) -> ValidatedRequest {
        let mut out = ValidatedRequest::default();

        for (name, spec) in self.fields {
            match raw.get(*name) {
                None => {
                    if spec.required {
                        out.issues.push(FieldIssue::required(*name));
                    }
                }
                Some(value) => {
                    out.values.insert((*name).to_string(), value.clone());
                    if is_empty_value(value) {
                        if !spec.nullable {
                            out.issues.push(FieldIssue::empty(*name));
                        }
                    } else {
                        match spec.validate(value) {
                            Ok(()) => out.filled.push((*name).to_string()),
                            Err(err) => out.issues.push(FieldIssue {
                                field: (*name).to_string(),
                                kind: err.kind(),
                                detail: err.to_string(),
                            }),
                        }
                    }
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;
    use serde_json::json;

    static TEST_SCHEMA: RequestSchema = RequestSchema {
        type_name: "TestRequest",
        fields: &[
            ("name", FieldSpec::char(true, false)),
            ("email", FieldSpec::email(false, true)),
            ("gender", FieldSpec::gender(false, true)),
        ],
    };

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn empty_value_shapes() {
        for value in [Value::Null, json!(""), json!([]), json!({})] {
            assert!(is_empty_value(&value), "{value}");
        }
        for value in [json!(0), json!("x"), json!([0]), json!({"a": 1}), json!(false)] {
            assert!(!is_empty_value(&value), "{value}");
        }
    }

    #[test]
    fn valid_request_records_filled_fields() {
        let out = TEST_SCHEMA
            .validate(&obj(json!({"name": "Vasiliy", "email": "a@b.c"})))
            .checked()
            .unwrap();
        assert_eq!(out.filled, vec!["name", "email"]);
        assert!(out.is_filled("name"));
        assert!(!out.is_filled("gender"));
        assert_eq!(out.values.get("name"), Some(&json!("Vasiliy")));
    }

    #[test]
    fn absent_required_field_is_reported() {
        let err = TEST_SCHEMA.validate(&obj(json!({}))).checked().unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn present_empty_non_nullable_field_is_reported() {
        let err = TEST_SCHEMA
            .validate(&obj(json!({"name": ""})))
            .checked()
            .unwrap_err();
        assert_eq!(err.to_string(), "name is empty");
    }

    #[test]
    fn nullable_field_may_be_empty_without_being_filled() {
        let out = TEST_SCHEMA
            .validate(&obj(json!({"name": "x", "email": ""})))
            .checked()
            .unwrap();
        assert_eq!(out.filled, vec!["name"]);
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let out = TEST_SCHEMA.validate(&obj(json!({"name": 5, "email": "nope", "gender": 9})));
        assert_eq!(out.issues.len(), 3);
        let err = out.failure().unwrap();
        assert!(err.mentions("name"));
        assert!(err.mentions("email"));
        assert!(err.mentions("gender"));
        assert_eq!(err.issues[0].kind, IssueKind::Type);
        assert_eq!(err.issues[1].kind, IssueKind::Format);
    }

    #[test]
    fn raw_values_are_kept_even_when_invalid() {
        let out = TEST_SCHEMA.validate(&obj(json!({"name": 5})));
        assert!(out.failure().is_some());
        assert_eq!(out.values.get("name"), Some(&json!(5)));
        assert!(out.filled.is_empty());
    }
}
