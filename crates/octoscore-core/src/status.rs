//! Numeric status codes and their standard texts.
//!
//! Codes travel with every handler result and are rendered into the JSON
//! body alongside the payload, so they are plain numbers here rather than
//! transport-specific types.

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const INVALID_REQUEST: u16 = 422;
pub const INTERNAL_ERROR: u16 = 500;

/// Standard text for an error status, if the code is one.
pub fn error_text(code: u16) -> Option<&'static str> {
    match code {
        BAD_REQUEST => Some("Bad Request"),
        FORBIDDEN => Some("Forbidden"),
        NOT_FOUND => Some("Not Found"),
        INVALID_REQUEST => Some("Invalid Request"),
        INTERNAL_ERROR => Some("Internal Server Error"),
        _ => None,
    }
}

/// True for codes reported under the `error` member of the response body.
pub fn is_error(code: u16) -> bool {
    error_text(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_not_an_error() {
        assert!(!is_error(OK));
        assert_eq!(error_text(OK), None);
    }

    #[test]
    fn error_codes_have_texts() {
        assert_eq!(error_text(BAD_REQUEST), Some("Bad Request"));
        assert_eq!(error_text(FORBIDDEN), Some("Forbidden"));
        assert_eq!(error_text(NOT_FOUND), Some("Not Found"));
        assert_eq!(error_text(INVALID_REQUEST), Some("Invalid Request"));
        assert_eq!(error_text(INTERNAL_ERROR), Some("Internal Server Error"));
    }
}
