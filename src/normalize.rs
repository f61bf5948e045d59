//! Response normalization
//!
//! The store reports an unset text-like field as `""`. On read that
//! placeholder becomes an absent value so it cannot be mistaken for data.

use serde_json::Value;

use crate::schema::{Schema, Step};

/// Accept `""` or a value valid under `inner`; `""` becomes absent
pub fn optional_text_response(inner: Schema) -> Schema {
    Schema::union(vec![Schema::literal(""), inner]).pipe(Step::transform(|value| match value {
        Value::String(s) if s.is_empty() => None,
        other => Some(other),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{email, EMAIL_MESSAGE};
    use crate::schema::ObjectSchema;
    use serde_json::json;

    #[test]
    fn test_empty_is_absent() {
        assert_eq!(optional_text_response(email()).parse(&json!("")).unwrap(), None);
    }

    #[test]
    fn test_value_is_present() {
        let out = optional_text_response(email()).parse(&json!("a@b.com")).unwrap();
        assert_eq!(out, Some(json!("a@b.com")));
    }

    #[test]
    fn test_invalid_value_fails_with_inner_message() {
        let err = optional_text_response(email()).parse(&json!("not-an-email")).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].message, EMAIL_MESSAGE);
    }

    #[test]
    fn test_absent_key_omitted_from_object() {
        let schema = ObjectSchema::new()
            .required("email", optional_text_response(email()))
            .into_schema();
        let out = schema.parse(&json!({"email": ""})).unwrap().unwrap();
        assert_eq!(out, json!({}));
    }
}
