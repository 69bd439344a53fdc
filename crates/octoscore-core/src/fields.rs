//! Declarative field specifications.
//!
//! A [`FieldSpec`] is a single validation rule: the set of accepted JSON
//! shapes, required/nullable flags, and an explicit optional format check.
//! Specs are immutable values built once at schema declaration time; nothing
//! here is derived from instances at validation time.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::IssueKind;

/// Gender code for "unknown".
pub const UNKNOWN: i64 = 0;
/// Gender code for "male".
pub const MALE: i64 = 1;
/// Gender code for "female".
pub const FEMALE: i64 = 2;

/// Oldest accepted birthday, in years before now.
pub const AGE_LIMIT: i32 = 70;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("email pattern compiles"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^7\d{10}$").expect("phone pattern compiles"));

/// Day-first date format accepted by date fields. Day and month may be
/// written with or without a leading zero; the year takes four digits.
pub const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[day padding:none].[month padding:none].[year]");

/// Display name for a gender code.
pub fn gender_name(code: i64) -> Option<&'static str> {
    match code {
        UNKNOWN => Some("unknown"),
        MALE => Some("male"),
        FEMALE => Some("female"),
        _ => None,
    }
}

/// JSON shapes a field can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    String,
    Integer,
    Object,
    Array,
}

impl ValueShape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Object => "an object",
            Self::Array => "an array",
        }
    }
}

/// Format checks a field can carry on top of its accepted shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCheck {
    /// `<non-empty>@<non-empty>.<non-empty>`.
    Email,
    /// Decimal rendering is exactly 11 digits starting with 7.
    Phone,
    /// Parses as `day.month.year`.
    Date,
    /// A date no more than [`AGE_LIMIT`] years in the past, by year.
    Birthday,
    /// One of the enumerated gender codes.
    Gender,
    /// Every element of the sequence is an integer.
    ClientIds,
}

/// A single field validation rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub required: bool,
    pub nullable: bool,
    types: &'static [ValueShape],
    format: Option<FormatCheck>,
}

/// A failed field check, carrying its classification and detail text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Format(String),
}

impl FieldError {
    pub fn kind(&self) -> IssueKind {
        match self {
            Self::Type(_) => IssueKind::Type,
            Self::Format(_) => IssueKind::Format,
        }
    }
}

impl FieldSpec {
    /// Any string value, including the empty string.
    pub const fn char(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::String],
            format: None,
        }
    }

    /// A JSON object (the envelope's `arguments` member).
    pub const fn arguments(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::Object],
            format: None,
        }
    }

    /// A string shaped like an email address.
    pub const fn email(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::String],
            format: Some(FormatCheck::Email),
        }
    }

    /// A string or integer whose digits form a valid phone number.
    pub const fn phone(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::String, ValueShape::Integer],
            format: Some(FormatCheck::Phone),
        }
    }

    /// A `day.month.year` date string.
    pub const fn date(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::String],
            format: Some(FormatCheck::Date),
        }
    }

    /// A date string no further than [`AGE_LIMIT`] years back.
    pub const fn birthday(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::String],
            format: Some(FormatCheck::Birthday),
        }
    }

    /// An integer gender code.
    pub const fn gender(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::Integer],
            format: Some(FormatCheck::Gender),
        }
    }

    /// A sequence of integer client ids.
    pub const fn client_ids(required: bool, nullable: bool) -> Self {
        Self {
            required,
            nullable,
            types: &[ValueShape::Array],
            format: Some(FormatCheck::ClientIds),
        }
    }

    /// Checks a non-null value: accepted shape first, then the format check.
    pub fn validate(&self, value: &Value) -> Result<(), FieldError> {
        if !self.types.iter().any(|shape| shape.matches(value)) {
            return Err(FieldError::Type(self.expected_types()));
        }
        match self.format {
            None => Ok(()),
            Some(FormatCheck::Email) => check_email(value),
            Some(FormatCheck::Phone) => check_phone(value),
            Some(FormatCheck::Date) => check_date(value).map(|_| ()),
            Some(FormatCheck::Birthday) => {
                check_birthday(value, OffsetDateTime::now_utc().year())
            }
            Some(FormatCheck::Gender) => check_gender(value),
            Some(FormatCheck::ClientIds) => check_client_ids(value),
        }
    }

    fn expected_types(&self) -> String {
        let nouns: Vec<&str> = self.types.iter().map(|s| s.noun()).collect();
        format!("must be {}", nouns.join(" or "))
    }
}

fn check_email(value: &Value) -> Result<(), FieldError> {
    let text = value.as_str().unwrap_or_default();
    if EMAIL_PATTERN.is_match(text) {
        Ok(())
    } else {
        Err(FieldError::Format(
            "does not look like an email address".into(),
        ))
    }
}

fn check_phone(value: &Value) -> Result<(), FieldError> {
    // Integers are checked against their decimal rendering.
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if PHONE_PATTERN.is_match(&rendered) {
        Ok(())
    } else {
        Err(FieldError::Format(
            "must be 11 digits starting with 7".into(),
        ))
    }
}

/// Parses a date field value, shared by the date and birthday checks and by
/// the score handler's argument coercion.
pub fn check_date(value: &Value) -> Result<Date, FieldError> {
    let text = value.as_str().unwrap_or_default();
    Date::parse(text, DATE_FORMAT)
        .map_err(|_| FieldError::Format("invalid date, expected DD.MM.YYYY".into()))
}

/// Birthday check against an explicit reference year. The limit compares
/// years only, not full dates.
pub fn check_birthday(value: &Value, reference_year: i32) -> Result<(), FieldError> {
    let date = check_date(value)?;
    if reference_year - date.year() > AGE_LIMIT {
        Err(FieldError::Format(format!(
            "birthday is more than {AGE_LIMIT} years ago"
        )))
    } else {
        Ok(())
    }
}

fn check_gender(value: &Value) -> Result<(), FieldError> {
    let code = value.as_i64().unwrap_or(-1);
    if gender_name(code).is_some() {
        Ok(())
    } else {
        Err(FieldError::Format(
            "must be one of 0 (unknown), 1 (male), 2 (female)".into(),
        ))
    }
}

fn check_client_ids(value: &Value) -> Result<(), FieldError> {
    let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
    // Ids must be i64-representable; larger numbers fail here rather than
    // being dropped downstream.
    let offending: Vec<String> = items
        .iter()
        .filter(|item| item.as_i64().is_none())
        .map(Value::to_string)
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(FieldError::Format(format!(
            "client ids [{}] are not integers",
            offending.join(", ")
        )))
    }
}
