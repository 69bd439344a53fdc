//! Core request model for the OctoScore API: declarative field specs,
//! frozen request schemas, the aggregate validator, the typed request
//! shapes and the shared-secret auth protocol.

pub mod auth;
pub mod error;
pub mod fields;
pub mod request;
pub mod schema;
pub mod status;

pub use auth::{ADMIN_LOGIN, AuthKeys, check_auth};
pub use error::{FieldIssue, IssueKind, ValidationFailure};
pub use fields::{FieldSpec, gender_name};
pub use request::{
    CLIENTS_INTERESTS_SCHEMA, ClientsInterestsArgs, METHOD_SCHEMA, MethodEnvelope,
    ONLINE_SCORE_SCHEMA, OnlineScoreArgs, SCORE_PAIRS,
};
pub use schema::{RequestSchema, ValidatedRequest, is_empty_value};
