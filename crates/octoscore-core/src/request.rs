//! The declared request shapes and their typed forms.
//!
//! Each shape freezes its field list in a static [`RequestSchema`] at
//! declaration time; the typed structs here are built only from a mapping
//! that passed that schema.

use serde_json::{Map, Value};
use time::Date;

use crate::auth::ADMIN_LOGIN;
use crate::error::{FieldIssue, ValidationFailure};
use crate::fields::{self, FieldSpec};
use crate::schema::RequestSchema;

/// Outer authenticated request envelope.
pub static METHOD_SCHEMA: RequestSchema = RequestSchema {
    type_name: "MethodRequest",
    fields: &[
        ("account", FieldSpec::char(false, true)),
        ("login", FieldSpec::char(true, true)),
        ("token", FieldSpec::char(true, true)),
        ("arguments", FieldSpec::arguments(true, true)),
        ("method", FieldSpec::char(true, false)),
    ],
};

/// Arguments accepted by the `online_score` method.
pub static ONLINE_SCORE_SCHEMA: RequestSchema = RequestSchema {
    type_name: "OnlineScoreRequest",
    fields: &[
        ("first_name", FieldSpec::char(false, true)),
        ("last_name", FieldSpec::char(false, true)),
        ("email", FieldSpec::email(false, true)),
        ("phone", FieldSpec::phone(false, true)),
        ("birthday", FieldSpec::birthday(false, true)),
        ("gender", FieldSpec::gender(false, true)),
    ],
};

/// Field pairs of which at least one must be fully filled for a score
/// request to be answerable.
pub const SCORE_PAIRS: &[(&str, &str)] = &[
    ("phone", "email"),
    ("first_name", "last_name"),
    ("gender", "birthday"),
];

/// Arguments accepted by the `clients_interests` method.
pub static CLIENTS_INTERESTS_SCHEMA: RequestSchema = RequestSchema {
    type_name: "ClientsInterestsRequest",
    fields: &[
        ("client_ids", FieldSpec::client_ids(true, false)),
        ("date", FieldSpec::date(false, true)),
    ],
};

/// A validated method envelope.
///
/// `account` defaults to the empty string when absent or null; the auth
/// digest concatenates it as-is.
#[derive(Debug, Clone)]
pub struct MethodEnvelope {
    pub account: String,
    pub login: String,
    pub token: String,
    pub method: String,
    pub arguments: Map<String, Value>,
}

impl MethodEnvelope {
    /// Validates a raw JSON body against the envelope schema. A non-object
    /// body is treated as having every field absent.
    pub fn from_body(body: &Value) -> Result<Self, ValidationFailure> {
        let empty = Map::new();
        let raw = body.as_object().unwrap_or(&empty);
        let checked = METHOD_SCHEMA.validate(raw).checked()?;

        Ok(Self {
            account: str_value(&checked.values, "account"),
            login: str_value(&checked.values, "login"),
            token: str_value(&checked.values, "token"),
            method: str_value(&checked.values, "method"),
            arguments: checked
                .values
                .get("arguments")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// The admin identity is derived, not stored.
    pub fn is_admin(&self) -> bool {
        self.login == ADMIN_LOGIN
    }
}

/// Validated and coerced `online_score` arguments.
///
/// Only fields recorded as filled are carried as `Some`; the phone is
/// normalized to its string form and the birthday to a parsed date.
#[derive(Debug, Clone, Default)]
pub struct OnlineScoreArgs {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<Date>,
    pub gender: Option<i64>,
    /// Names of the filled fields, in schema order.
    pub filled: Vec<String>,
}

impl OnlineScoreArgs {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, ValidationFailure> {
        let checked = ONLINE_SCORE_SCHEMA.validate(arguments).checked()?;

        let pair_filled = SCORE_PAIRS
            .iter()
            .any(|(a, b)| checked.is_filled(a) && checked.is_filled(b));
        if !pair_filled {
            let pairs = SCORE_PAIRS
                .iter()
                .map(|(a, b)| format!("({a}, {b})"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ValidationFailure::new(vec![FieldIssue::composite(
                ONLINE_SCORE_SCHEMA.type_name,
                format!("at least one of the pairs {pairs} must be filled"),
            )]));
        }

        let mut args = Self {
            filled: checked.filled.clone(),
            ..Self::default()
        };
        for field in &checked.filled {
            let value = &checked.values[field];
            match field.as_str() {
                "first_name" => args.first_name = value.as_str().map(str::to_string),
                "last_name" => args.last_name = value.as_str().map(str::to_string),
                "email" => args.email = value.as_str().map(str::to_string),
                "phone" => args.phone = Some(phone_string(value)),
                "birthday" => args.birthday = fields::check_date(value).ok(),
                "gender" => args.gender = value.as_i64(),
                _ => {}
            }
        }
        Ok(args)
    }

    /// Display name for the coerced gender code, if filled.
    pub fn gender_name(&self) -> Option<&'static str> {
        self.gender.and_then(fields::gender_name)
    }
}

/// Validated `clients_interests` arguments.
#[derive(Debug, Clone)]
pub struct ClientsInterestsArgs {
    pub client_ids: Vec<i64>,
    pub date: Option<Date>,
}

impl ClientsInterestsArgs {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, ValidationFailure> {
        let checked = CLIENTS_INTERESTS_SCHEMA.validate(arguments).checked()?;

        let client_ids = checked
            .values
            .get("client_ids")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        let date = checked
            .values
            .get("date")
            .filter(|_| checked.is_filled("date"))
            .and_then(|value| fields::check_date(value).ok());

        Ok(Self { client_ids, date })
    }
}

fn str_value(values: &Map<String, Value>, name: &str) -> String {
    values
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Decimal-digit string form of an already validated phone value.
fn phone_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
