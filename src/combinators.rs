//! Schema combinators
//!
//! The create/update variants of every collection are derived through these
//! functions only. A new collection needs a response field set, an input
//! field set and a choice of [`CollectionKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cross_field::{new_password, password_confirm};
use crate::error::ValidationError;
use crate::primitives::{collection_id, iso_auto_date, iso_date, record_id};
use crate::schema::{ObjectSchema, Schema};

/// Create contract for plain collections: the field set unchanged
pub fn create_base(fields: ObjectSchema) -> Schema {
    fields.into_schema()
}

/// Update contract: every field optional
pub fn update_base(fields: ObjectSchema) -> Schema {
    fields.partial().into_schema()
}

/// Create contract for principals: fields plus a confirmed password
pub fn create_auth(fields: ObjectSchema) -> Schema {
    Schema::intersect(vec![create_base(fields), password_confirm()])
}

/// Update contract for principals: partial fields plus an optional password change
pub fn update_auth(fields: ObjectSchema) -> Schema {
    Schema::intersect(vec![update_base(fields), new_password()])
}

/// Immutable fields assigned by the store to every record of `name`
pub fn system_fields(name: &str) -> ObjectSchema {
    ObjectSchema::new()
        .required("id", record_id())
        .required("collectionId", collection_id())
        .required("collectionName", Schema::literal(name))
        .required("created", iso_auto_date())
        .required("updated", iso_date())
}

/// Response contract: system fields followed by the declared fields
pub fn response(name: &str, fields: ObjectSchema) -> Schema {
    system_fields(name).extend(fields).into_schema()
}

/// Whether a collection holds authenticatable principals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Base,
    Auth,
    View,
}

impl CollectionKind {
    pub fn is_auth(&self) -> bool {
        matches!(self, CollectionKind::Auth)
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Base => write!(f, "base"),
            CollectionKind::Auth => write!(f, "auth"),
            CollectionKind::View => write!(f, "view"),
        }
    }
}

/// Which of the three contracts to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    Response,
    Create,
    Update,
}

impl SchemaVariant {
    pub const ALL: [SchemaVariant; 3] = [SchemaVariant::Response, SchemaVariant::Create, SchemaVariant::Update];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Response => "response",
            SchemaVariant::Create => "create",
            SchemaVariant::Update => "update",
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "response" => Ok(SchemaVariant::Response),
            "create" => Ok(SchemaVariant::Create),
            "update" => Ok(SchemaVariant::Update),
            other => Err(format!("unknown schema variant: {}", other)),
        }
    }
}

/// The response/create/update triple of one collection
#[derive(Debug, Clone)]
pub struct CollectionSchemas {
    pub name: String,
    pub kind: CollectionKind,
    pub response: Schema,
    pub create: Schema,
    pub update: Schema,
}

impl CollectionSchemas {
    /// Derive the triple from a collection's response and input field sets
    pub fn derive(
        name: impl Into<String>,
        kind: CollectionKind,
        response_fields: ObjectSchema,
        input_fields: ObjectSchema,
    ) -> Self {
        let name = name.into();
        let (create, update) = if kind.is_auth() {
            (create_auth(input_fields.clone()), update_auth(input_fields))
        } else {
            (create_base(input_fields.clone()), update_base(input_fields))
        };
        Self {
            response: response(&name, response_fields),
            name,
            kind,
            create,
            update,
        }
    }

    pub fn get(&self, variant: SchemaVariant) -> &Schema {
        match variant {
            SchemaVariant::Response => &self.response,
            SchemaVariant::Create => &self.create,
            SchemaVariant::Update => &self.update,
        }
    }

    pub fn parse(&self, variant: SchemaVariant, input: &Value) -> Result<Option<Value>, ValidationError> {
        self.get(variant).parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_field::PASSWORDS_DO_NOT_MATCH;
    use crate::primitives::email;
    use serde_json::json;

    fn fields() -> ObjectSchema {
        ObjectSchema::new()
            .required("title", Schema::string())
            .optional("done", Schema::boolean())
    }

    #[test]
    fn test_update_base_relaxes_create() {
        let create = create_base(fields());
        let update = update_base(fields());
        let full = json!({"title": "x", "done": true});
        assert!(create.is_valid(&full));
        assert!(update.is_valid(&full));
        assert!(update.is_valid(&json!({"done": false})));
        assert!(update.is_valid(&json!({})));
        assert!(!create.is_valid(&json!({"done": false})));
    }

    #[test]
    fn test_create_auth_reports_field_and_password_issues() {
        let schema = create_auth(ObjectSchema::new().required("email", email()));
        let err = schema
            .parse(&json!({"email": "bad", "password": "abcdefgh", "passwordConfirm": "zzzzzzzz"}))
            .unwrap_err();
        assert!(err.message_at("email").is_some());
        assert_eq!(err.message_at("passwordConfirm"), Some(PASSWORDS_DO_NOT_MATCH));
    }

    #[test]
    fn test_create_auth_output_merges_both_sides() {
        let schema = create_auth(ObjectSchema::new().required("email", email()));
        let out = schema
            .parse(&json!({"email": "a@b.com", "password": "abcdefgh", "passwordConfirm": "abcdefgh"}))
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            json!({"email": "a@b.com", "password": "abcdefgh", "passwordConfirm": "abcdefgh"})
        );
    }

    #[test]
    fn test_update_auth_allows_empty_patch() {
        let schema = update_auth(ObjectSchema::new().required("email", email()));
        assert!(schema.is_valid(&json!({})));
        assert!(!schema.is_valid(&json!({"password": "abcdefgh"})));
    }

    #[test]
    fn test_system_fields_literal_name() {
        let schema = response("todos", fields());
        let record = json!({
            "id": "abcdefghijklmno",
            "collectionId": "pbc_12345678901",
            "collectionName": "users",
            "created": "2024-01-01 00:00:00.000Z",
            "updated": "2024-01-01 00:00:00.000Z",
            "title": "x"
        });
        let err = schema.parse(&record).unwrap_err();
        assert_eq!(err.issues[0].path.to_string(), "collectionName");
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("create".parse::<SchemaVariant>(), Ok(SchemaVariant::Create));
        assert!("delete".parse::<SchemaVariant>().is_err());
    }
}
