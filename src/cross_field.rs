//! Validators spanning sibling fields of one payload

use serde_json::{Map, Value};

use crate::primitives::password;
use crate::schema::{ObjectSchema, Schema, Step};

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const CONFIRM_NEW_PASSWORD: &str = "Please confirm your new password";
pub const OLD_PASSWORD_REQUIRED: &str = "Old password is required to change password";

/// Present and not the empty string
fn is_set(object: &Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// `{ password, passwordConfirm }` where both must be equal
///
/// A mismatch is reported on `passwordConfirm`.
pub fn password_confirm() -> Schema {
    ObjectSchema::new()
        .required("password", password())
        .required("passwordConfirm", Schema::string())
        .into_schema()
        .pipe(Step::forward(
            "passwordConfirm",
            |o| o.get("password") == o.get("passwordConfirm"),
            PASSWORDS_DO_NOT_MATCH,
        ))
}

/// Optional password change: `{ password?, passwordConfirm?, oldPassword? }`
///
/// Every rule holds vacuously when no new password is supplied.
pub fn new_password() -> Schema {
    ObjectSchema::new()
        .optional("password", password())
        .optional("passwordConfirm", Schema::string())
        .optional("oldPassword", Schema::string())
        .into_schema()
        .pipe(Step::forward(
            "passwordConfirm",
            |o| !is_set(o, "password") || is_set(o, "passwordConfirm"),
            CONFIRM_NEW_PASSWORD,
        ))
        .pipe(Step::forward(
            "passwordConfirm",
            |o| !is_set(o, "password") || o.get("password") == o.get("passwordConfirm"),
            PASSWORDS_DO_NOT_MATCH,
        ))
        .pipe(Step::forward(
            "oldPassword",
            |o| !is_set(o, "password") || is_set(o, "oldPassword"),
            OLD_PASSWORD_REQUIRED,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;
    use serde_json::json;

    #[test]
    fn test_password_confirm_match() {
        let schema = password_confirm();
        assert!(schema.is_valid(&json!({"password": "abcdefgh", "passwordConfirm": "abcdefgh"})));
    }

    #[test]
    fn test_password_confirm_mismatch_reported_on_confirm() {
        let err = password_confirm()
            .parse(&json!({"password": "abcdefgh", "passwordConfirm": "mismatch"}))
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].kind, IssueKind::CrossField);
        assert_eq!(err.issues[0].path.to_string(), "passwordConfirm");
        assert_eq!(err.issues[0].message, PASSWORDS_DO_NOT_MATCH);
    }

    #[test]
    fn test_password_confirm_skipped_when_field_invalid() {
        let err = password_confirm()
            .parse(&json!({"password": "short", "passwordConfirm": "other"}))
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path.to_string(), "password");
        assert!(!err.has_cross_field());
    }

    #[test]
    fn test_new_password_noop() {
        assert!(new_password().is_valid(&json!({})));
    }

    #[test]
    fn test_new_password_missing_confirmation_and_old() {
        let err = new_password().parse(&json!({"password": "abcdefgh"})).unwrap_err();
        assert_eq!(err.message_at("passwordConfirm"), Some(CONFIRM_NEW_PASSWORD));
        assert_eq!(err.message_at("oldPassword"), Some(OLD_PASSWORD_REQUIRED));
        assert_eq!(err.issues.len(), 3);
    }

    #[test]
    fn test_new_password_complete() {
        let input = json!({"password": "abcdefgh", "passwordConfirm": "abcdefgh", "oldPassword": "old"});
        assert!(new_password().is_valid(&input));
    }

    #[test]
    fn test_new_password_mismatch_only() {
        let input = json!({"password": "abcdefgh", "passwordConfirm": "abcdefgX", "oldPassword": "old"});
        let err = new_password().parse(&input).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].message, PASSWORDS_DO_NOT_MATCH);
    }
}
