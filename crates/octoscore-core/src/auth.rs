//! Shared-secret authentication protocol.
//!
//! Two digest schemes over SHA-512: a per-account shared secret for regular
//! callers and an hourly time-bucketed secret for the admin identity. The
//! supplied token must equal the expected hex digest exactly; an empty token
//! never matches.
//!
//! Known weakness, kept as specified: there is no nonce or replay
//! protection, and the admin digest is valid for a whole hour bucket.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::request::MethodEnvelope;

/// Login that selects the admin digest scheme.
pub const ADMIN_LOGIN: &str = "admin";

const DEFAULT_SALT: &str = "octoscore";
const DEFAULT_ADMIN_SALT: &str = "42";

const HOUR_BUCKET: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year][month][day][hour]");

/// Salts for the two digest schemes. Defaults are compile-time constants;
/// deployments may override them via configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthKeys {
    #[serde(default = "default_salt")]
    pub salt: String,
    #[serde(default = "default_admin_salt")]
    pub admin_salt: String,
}

fn default_salt() -> String {
    DEFAULT_SALT.to_string()
}

fn default_admin_salt() -> String {
    DEFAULT_ADMIN_SALT.to_string()
}

impl Default for AuthKeys {
    fn default() -> Self {
        Self {
            salt: default_salt(),
            admin_salt: default_admin_salt(),
        }
    }
}

/// Expected digest for a regular caller: sha512(account ++ login ++ salt).
pub fn user_digest(keys: &AuthKeys, account: &str, login: &str) -> String {
    sha512_hex(&format!("{account}{login}{}", keys.salt))
}

/// Expected digest for the admin identity at the given instant:
/// sha512(`YYYYMMDDHH` in UTC ++ admin salt).
pub fn admin_digest(keys: &AuthKeys, at: OffsetDateTime) -> String {
    let bucket = at
        .to_offset(time::UtcOffset::UTC)
        .format(HOUR_BUCKET)
        .unwrap_or_default();
    sha512_hex(&format!("{bucket}{}", keys.admin_salt))
}

/// Checks the envelope's token against the expected digest for its identity.
pub fn check_auth(keys: &AuthKeys, envelope: &MethodEnvelope) -> bool {
    let expected = if envelope.is_admin() {
        admin_digest(keys, OffsetDateTime::now_utc())
    } else {
        user_digest(keys, &envelope.account, &envelope.login)
    };
    expected == envelope.token
}

fn sha512_hex(input: &str) -> String {
    hex::encode(Sha512::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn envelope(account: &str, login: &str, token: &str) -> MethodEnvelope {
        MethodEnvelope::from_body(&json!({
            "account": account,
            "login": login,
            "token": token,
            "arguments": {"k": "v"},
            "method": "online_score",
        }))
        .unwrap()
    }

    #[test]
    fn user_digest_is_stable() {
        let keys = AuthKeys::default();
        assert_eq!(
            user_digest(&keys, "horns&hoofs", "h&f"),
            user_digest(&keys, "horns&hoofs", "h&f")
        );
        assert_ne!(
            user_digest(&keys, "horns&hoofs", "h&f"),
            user_digest(&keys, "horns&hoofs", "другой")
        );
    }

    #[test]
    fn valid_user_token_passes() {
        let keys = AuthKeys::default();
        let token = user_digest(&keys, "horns&hoofs", "h&f");
        assert!(check_auth(&keys, &envelope("horns&hoofs", "h&f", &token)));
    }

    #[test]
    fn wrong_or_empty_token_fails() {
        let keys = AuthKeys::default();
        assert!(!check_auth(&keys, &envelope("horns&hoofs", "h&f", "qwerty")));
        assert!(!check_auth(&keys, &envelope("horns&hoofs", "h&f", "")));
    }

    #[test]
    fn admin_uses_hour_bucketed_digest() {
        let keys = AuthKeys::default();
        let now = OffsetDateTime::now_utc();
        let token = admin_digest(&keys, now);
        assert!(check_auth(&keys, &envelope("", ADMIN_LOGIN, &token)));
        // A user digest never matches the admin scheme.
        let user_token = user_digest(&keys, "", ADMIN_LOGIN);
        assert!(!check_auth(&keys, &envelope("", ADMIN_LOGIN, &user_token)));
    }

    #[test]
    fn admin_digest_changes_per_hour_bucket() {
        let keys = AuthKeys::default();
        let first = admin_digest(&keys, datetime!(2024-05-01 10:59 UTC));
        let same_bucket = admin_digest(&keys, datetime!(2024-05-01 10:00 UTC));
        let next_bucket = admin_digest(&keys, datetime!(2024-05-01 11:00 UTC));
        assert_eq!(first, same_bucket);
        assert_ne!(first, next_bucket);
    }

    #[test]
    fn salts_feed_the_digest() {
        let keys = AuthKeys::default();
        let other = AuthKeys {
            salt: "different".into(),
            ..AuthKeys::default()
        };
        assert_ne!(
            user_digest(&keys, "acc", "login"),
            user_digest(&other, "acc", "login")
        );
    }
}
