//! Validation error taxonomy.
//!
//! Per-field problems are collected as structured [`FieldIssue`] records and
//! only rendered to a single human-readable message at the HTTP boundary.
//! Validation never stops at the first bad field: every declared field is
//! checked and every issue is carried in the aggregate [`ValidationFailure`].

use std::fmt;

/// Classification of a single validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// The value's runtime shape is not in the field's accepted type set.
    Type,
    /// The shape was acceptable but a pattern, date or range check failed.
    Format,
    /// The field was absent although declared required.
    Required,
    /// The field was present but empty although declared non-nullable.
    Empty,
    /// No declared field pair was satisfied (online_score composite rule).
    Composite,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::Format => write!(f, "format"),
            Self::Required => write!(f, "required"),
            Self::Empty => write!(f, "empty"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

/// One recorded problem for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Declared field name, or the request type name for composite issues.
    pub field: String,
    pub kind: IssueKind,
    /// Detail text supplied by the failing check.
    pub detail: String,
}

impl FieldIssue {
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: IssueKind::Required,
            detail: String::new(),
        }
    }

    pub fn empty(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: IssueKind::Empty,
            detail: String::new(),
        }
    }

    pub fn composite(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: IssueKind::Composite,
            detail: detail.into(),
        }
    }

    /// Renders the issue the way the aggregate message reports it.
    pub fn message(&self) -> String {
        match self.kind {
            IssueKind::Required => format!("{} is required", self.field),
            IssueKind::Empty => format!("{} is empty", self.field),
            IssueKind::Type | IssueKind::Format => {
                format!("'{}' error: {}", self.field, self.detail)
            }
            IssueKind::Composite => self.detail.clone(),
        }
    }
}

/// Aggregate validation failure for one request.
///
/// The `Display` form joins every per-field message with `", "`; that joined
/// string is what the HTTP boundary reports with status 422.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct ValidationFailure {
    pub issues: Vec<FieldIssue>,
}

impl ValidationFailure {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// Joined per-field messages, in schema declaration order.
    pub fn message(&self) -> String {
        self.issues
            .iter()
            .map(FieldIssue::message)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True if any issue concerns the named field.
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_messages() {
        assert_eq!(FieldIssue::required("token").message(), "token is required");
        assert_eq!(FieldIssue::empty("method").message(), "method is empty");
        let issue = FieldIssue {
            field: "phone".into(),
            kind: IssueKind::Format,
            detail: "must be 11 digits starting with 7".into(),
        };
        assert_eq!(
            issue.message(),
            "'phone' error: must be 11 digits starting with 7"
        );
    }

    #[test]
    fn aggregate_joins_in_order() {
        let failure = ValidationFailure::new(vec![
            FieldIssue::required("login"),
            FieldIssue::empty("method"),
        ]);
        assert_eq!(failure.to_string(), "login is required, method is empty");
        assert!(failure.mentions("login"));
        assert!(failure.mentions("method"));
        assert!(!failure.mentions("token"));
    }
}
