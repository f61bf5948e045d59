//! Collection models read from a PocketBase collections export
//!
//! The export is a JSON array of collections, each with a flat list of field
//! definitions. [`SchemaSet`] derives the response/create/update triple of
//! every collection in it at runtime, following the same combinators as the
//! built-in registry.

mod fields;

pub use fields::{field_schemas, FieldSchemas, Slot};

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::combinators::{CollectionKind, CollectionSchemas, SchemaVariant};
use crate::error::{Result, SchemaError};
use crate::registry::suggest;
use crate::schema::ObjectSchema;

/// Fields the store manages on every record; never part of a field set
pub const MANAGED_FIELDS: [&str; 4] = ["id", "collectionId", "created", "updated"];

/// PocketBase field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Bool,
    Email,
    Url,
    Date,
    Autodate,
    Json,
    Editor,
    #[serde(rename = "geoPoint")]
    GeoPoint,
    Select,
    Relation,
    File,
    #[serde(other)]
    Unknown,
}

/// One field definition of an exported collection
///
/// Option keys are shared between field types and carry type specific
/// meaning; `min`/`max` are character counts for text, bounds for numbers
/// and date strings for dates. Zero and empty values mean "unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldModel {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub min: Option<Value>,
    #[serde(default)]
    pub max: Option<Value>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Vec<String>,
    #[serde(default)]
    pub max_select: Option<u64>,
    #[serde(default)]
    pub max_size: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mime_types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub only_domains: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub except_domains: Vec<String>,
    #[serde(default)]
    pub only_int: bool,
    #[serde(default)]
    pub collection_id: Option<String>,
}

impl FieldModel {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            field_type,
            system: false,
            required: false,
            hidden: false,
            min: None,
            max: None,
            pattern: None,
            values: Vec::new(),
            max_select: None,
            max_size: None,
            mime_types: Vec::new(),
            only_domains: Vec::new(),
            except_domains: Vec::new(),
            only_int: false,
            collection_id: None,
        }
    }

    /// Explicitly required, or a text field with a positive minimum length
    pub fn is_required(&self) -> bool {
        self.required || self.text_min().is_some()
    }

    pub fn text_min(&self) -> Option<usize> {
        match self.field_type {
            FieldType::Text => positive_count(self.min.as_ref()),
            _ => None,
        }
    }

    pub fn text_max(&self) -> Option<usize> {
        match self.field_type {
            FieldType::Text => positive_count(self.max.as_ref()),
            _ => None,
        }
    }

    pub fn number_min(&self) -> Option<f64> {
        match self.field_type {
            FieldType::Number => self.min.as_ref().and_then(Value::as_f64),
            _ => None,
        }
    }

    pub fn number_max(&self) -> Option<f64> {
        match self.field_type {
            FieldType::Number => self.max.as_ref().and_then(Value::as_f64),
            _ => None,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }

    pub fn max_select(&self) -> Option<u64> {
        self.max_select.filter(|n| *n > 0)
    }

    /// Single-valued select, relation or file
    pub fn is_single(&self) -> bool {
        self.max_select() == Some(1)
    }

    pub fn max_size(&self) -> Option<u64> {
        self.max_size.filter(|n| *n > 0)
    }

    /// Target collection id of a relation
    pub fn relation_target(&self) -> Option<&str> {
        match self.field_type {
            FieldType::Relation => self.collection_id.as_deref().filter(|id| !id.is_empty()),
            _ => None,
        }
    }

    /// Excluded from the field sets: store managed or hidden
    pub fn is_skipped(&self) -> bool {
        self.hidden || MANAGED_FIELDS.contains(&self.name.as_str())
    }
}

/// Exports write unset list options as `null`
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn positive_count(value: Option<&Value>) -> Option<usize> {
    value
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

/// One exported collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionModel {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CollectionKind,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub fields: Vec<FieldModel>,
}

impl CollectionModel {
    /// Fields that end up in the response and input field sets
    pub fn declared_fields(&self) -> impl Iterator<Item = &FieldModel> {
        self.fields.iter().filter(|f| !f.is_skipped())
    }
}

/// A collection of an export with its derived schemas
#[derive(Debug, Clone)]
pub struct DerivedCollection {
    pub model: CollectionModel,
    pub schemas: CollectionSchemas,
    /// Relation fields whose target collection is part of the same export
    pub expandable: Vec<String>,
}

/// Derive the three schemas of `model`
///
/// `known_ids` are the collection ids present in the export; relations to
/// them make the response accept an `expand` side channel.
pub fn derive(model: &CollectionModel, known_ids: &[&str]) -> DerivedCollection {
    let mut response = ObjectSchema::new();
    let mut input = ObjectSchema::new();
    let mut expandable = Vec::new();

    for field in model.declared_fields() {
        let derived = field_schemas(field);
        response = derived.response.attach(response, &field.name);
        input = derived.input.attach(input, &field.name);
        if field.relation_target().is_some_and(|target| known_ids.contains(&target)) {
            expandable.push(field.name.clone());
        }
    }
    if !expandable.is_empty() {
        response = response.side_channel("expand");
    }

    DerivedCollection {
        schemas: CollectionSchemas::derive(model.name.clone(), model.kind, response, input),
        model: model.clone(),
        expandable,
    }
}

/// Schemas derived from a whole collections export
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    collections: Vec<DerivedCollection>,
}

impl SchemaSet {
    pub fn from_models(models: &[CollectionModel]) -> Self {
        let known_ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).filter(|id| !id.is_empty()).collect();
        let collections: Vec<_> = models.iter().map(|m| derive(m, &known_ids)).collect();
        for collection in &collections {
            debug!(
                collection = %collection.model.name,
                kind = %collection.model.kind,
                fields = collection.model.declared_fields().count(),
                "Derived collection schemas"
            );
        }
        Self { collections }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let models: Vec<CollectionModel> = serde_json::from_str(json)?;
        Ok(Self::from_models(&models))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_json(&content)?;
        info!(path = %path.display(), collections = set.len(), "Loaded collections export");
        Ok(set)
    }

    pub fn collection(&self, name: &str) -> Result<&DerivedCollection> {
        self.collections
            .iter()
            .find(|c| c.model.name == name)
            .ok_or_else(|| SchemaError::UnknownCollection {
                name: name.to_string(),
                suggestion: suggest(name, self.names()),
            })
    }

    pub fn get(&self, name: &str) -> Result<&CollectionSchemas> {
        self.collection(name).map(|c| &c.schemas)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.model.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedCollection> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn validate(&self, name: &str, variant: SchemaVariant, input: &Value) -> Result<Option<Value>> {
        Ok(self.get(name)?.parse(variant, input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export() -> Value {
        json!([
            {
                "id": "pbc_3142635823",
                "name": "todos",
                "type": "base",
                "system": false,
                "fields": [
                    {"name": "id", "type": "text", "system": true, "required": true, "min": 15, "max": 15},
                    {"name": "name", "type": "text", "required": true, "min": 3, "max": 120, "pattern": ""},
                    {"name": "done", "type": "bool"},
                    {"name": "owner", "type": "relation", "collectionId": "_pb_users_auth_", "maxSelect": 1},
                    {"name": "secret", "type": "text", "hidden": true},
                    {"name": "created", "type": "autodate"},
                    {"name": "updated", "type": "autodate"}
                ]
            },
            {
                "id": "_pb_users_auth_",
                "name": "users",
                "type": "auth",
                "fields": [
                    {"name": "password", "type": "password", "hidden": true, "required": true},
                    {"name": "email", "type": "email", "required": true},
                    {"name": "username", "type": "text"}
                ]
            }
        ])
    }

    fn set() -> SchemaSet {
        SchemaSet::from_json(&export().to_string()).unwrap()
    }

    #[test]
    fn test_parses_field_types() {
        let models: Vec<CollectionModel> = serde_json::from_value(export()).unwrap();
        assert_eq!(models[0].fields[2].field_type, FieldType::Bool);
        assert_eq!(models[1].fields[0].field_type, FieldType::Unknown);
        assert_eq!(models[1].kind, CollectionKind::Auth);
    }

    #[test]
    fn test_skips_managed_and_hidden_fields() {
        let set = set();
        let todos = set.collection("todos").unwrap();
        let names: Vec<_> = todos.model.declared_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "done", "owner"]);
    }

    #[test]
    fn test_relation_to_known_collection_is_expandable() {
        let set = set();
        let todos = set.collection("todos").unwrap();
        assert_eq!(todos.expandable, vec!["owner".to_string()]);
        assert_eq!(
            todos.schemas.response.as_object().map(|o| o.side_channels().to_vec()),
            Some(vec!["expand".to_string()])
        );
    }

    #[test]
    fn test_auth_collection_requires_password_confirmation() {
        let set = set();
        let err = set
            .validate("users", SchemaVariant::Create, &json!({"email": "a@b.com"}))
            .unwrap_err();
        assert!(err.issues().iter().any(|i| i.path.to_string() == "password"));
    }

    #[test]
    fn test_unknown_collection_suggests() {
        match set().get("todo") {
            Err(SchemaError::UnknownCollection { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("todos"));
            }
            other => panic!("expected UnknownCollection, got {:?}", other.map(|s| s.name.clone())),
        }
    }

    #[test]
    fn test_text_min_implies_required() {
        let mut field = FieldModel::new("title", FieldType::Text);
        assert!(!field.is_required());
        field.min = Some(json!(2));
        assert!(field.is_required());
        field.min = Some(json!(0));
        assert!(!field.is_required());
    }
}
