//! Per field type schema derivation

use serde_json::{json, Value};

use super::{FieldModel, FieldType};
use crate::normalize::optional_text_response;
use crate::primitives::{
    editor, email, except_domains, file, file_name, file_name_array, geo_point, iso_auto_date, iso_date, json,
    only_domains, relation_id, relation_multiple, string_enum, url,
};
use crate::schema::{actions, ObjectSchema, Presence, Schema};

const INVALID_FORMAT: &str = "Invalid format";
const ONLY_INTEGERS: &str = "Only integers are allowed.";

/// A schema together with the presence of its key
#[derive(Debug, Clone)]
pub struct Slot {
    pub schema: Schema,
    pub presence: Presence,
}

impl Slot {
    pub fn required(schema: Schema) -> Self {
        Self {
            schema,
            presence: Presence::Required,
        }
    }

    pub fn optional(schema: Schema) -> Self {
        Self {
            schema,
            presence: Presence::Optional,
        }
    }

    pub fn defaulted(schema: Schema, default: Value) -> Self {
        Self {
            schema,
            presence: Presence::Default(default),
        }
    }

    pub(crate) fn attach(self, object: ObjectSchema, name: &str) -> ObjectSchema {
        object.entry(name, self.schema, self.presence)
    }
}

/// Response and input slots of one field
#[derive(Debug, Clone)]
pub struct FieldSchemas {
    pub response: Slot,
    pub input: Slot,
}

impl FieldSchemas {
    fn new(response: Slot, input: Slot) -> Self {
        Self { response, input }
    }

    fn same(required: bool, schema: Schema) -> Self {
        if required {
            Self::new(Slot::required(schema.clone()), Slot::required(schema))
        } else {
            Self::new(Slot::optional(schema.clone()), Slot::optional(schema))
        }
    }
}

/// Text-like value: unset optional fields come back as `""`
fn text_optional(required: bool, base: Schema) -> FieldSchemas {
    if required {
        FieldSchemas::new(Slot::required(base.clone()), Slot::required(base))
    } else {
        FieldSchemas::new(Slot::required(optional_text_response(base.clone())), Slot::optional(base))
    }
}

/// Array value: unset optional fields default to `[]`
fn optional_array(required: bool, base: Schema) -> Slot {
    if required {
        Slot::required(base)
    } else {
        Slot::defaulted(base, json!([]))
    }
}

/// Derive the response and input slots of `field`
pub fn field_schemas(field: &FieldModel) -> FieldSchemas {
    let required = field.is_required();
    match field.field_type {
        FieldType::Text => text(field),
        FieldType::Number => number(field),
        FieldType::Bool => {
            if required {
                FieldSchemas::new(Slot::required(Schema::boolean()), Slot::required(Schema::literal(true)))
            } else {
                FieldSchemas::same(false, Schema::boolean())
            }
        }
        FieldType::Email => {
            let input = if required {
                Slot::required(email())
            } else {
                Slot::optional(email())
            };
            FieldSchemas::new(Slot::required(optional_text_response(email())), input)
        }
        FieldType::Url => url_field(field),
        FieldType::Date => text_optional(required, iso_date()),
        FieldType::Autodate => text_optional(required, iso_auto_date()),
        FieldType::Json => text_optional(required, json()),
        FieldType::Editor => text_optional(required, editor()),
        FieldType::GeoPoint => FieldSchemas::same(required, geo_point()),
        FieldType::Select => select(field),
        FieldType::Relation => {
            if field.is_single() {
                text_optional(required, relation_id())
            } else {
                FieldSchemas::new(
                    optional_array(required, relation_multiple()),
                    optional_array(required, relation_multiple()),
                )
            }
        }
        FieldType::File => file_field(field),
        FieldType::Unknown => FieldSchemas::same(false, Schema::any()),
    }
}

fn text(field: &FieldModel) -> FieldSchemas {
    let required = field.is_required();
    let (min, max, pattern) = (field.text_min(), field.text_max(), field.pattern());
    if min.is_none() && max.is_none() && pattern.is_none() {
        return text_optional(required, Schema::string());
    }

    let mut input = Schema::string();
    match (min, max) {
        (Some(min), Some(max)) if min == max => {
            input = input.pipe(actions::length(min, Some(&*format!("Input must be exactly {}", min))));
        }
        _ => {
            if let Some(min) = min {
                input = input.pipe(actions::min_length(min, Some(&*format!("Input must be at least {} characters", min))));
            }
            if let Some(max) = max {
                input = input.pipe(actions::max_length(max, Some(&*format!("Input must be at most {} characters", max))));
            }
        }
    }
    if let Some(pattern) = pattern {
        // PocketBase validates patterns on save; an invalid one is left unchecked
        if let Ok(re) = regex::Regex::new(pattern) {
            input = input.pipe(actions::regex(re, Some(INVALID_FORMAT)));
        }
    }

    if required {
        FieldSchemas::new(Slot::required(Schema::string()), Slot::required(input))
    } else {
        FieldSchemas::new(
            Slot::required(optional_text_response(Schema::string())),
            Slot::optional(input),
        )
    }
}

fn number(field: &FieldModel) -> FieldSchemas {
    let mut input = Schema::number();
    if field.only_int {
        input = input.pipe(actions::integer(Some(ONLY_INTEGERS)));
    }
    match (field.number_min(), field.number_max()) {
        (Some(min), Some(max)) if min == max => input = input.pipe(actions::value(min, None)),
        (min, max) => {
            if let Some(min) = min {
                input = input.pipe(actions::min_value(min, Some(&*format!("Input must be greater than {}", min - 1.0))));
            }
            if let Some(max) = max {
                input = input.pipe(actions::max_value(max, Some(&*format!("Input must be lower than {}", max + 1.0))));
            }
        }
    }

    if field.is_required() {
        FieldSchemas::new(Slot::required(Schema::number()), Slot::required(input))
    } else {
        FieldSchemas::new(Slot::optional(Schema::number()), Slot::optional(input))
    }
}

fn url_field(field: &FieldModel) -> FieldSchemas {
    let restricted = if !field.only_domains.is_empty() {
        Some(only_domains(field.only_domains.iter().cloned()))
    } else if !field.except_domains.is_empty() {
        Some(except_domains(field.except_domains.iter().cloned()))
    } else {
        None
    };

    match restricted {
        Some(input) if field.is_required() => FieldSchemas::new(Slot::required(url()), Slot::required(input)),
        Some(input) => FieldSchemas::new(Slot::required(optional_text_response(url())), Slot::optional(input)),
        None => text_optional(field.is_required(), url()),
    }
}

fn select(field: &FieldModel) -> FieldSchemas {
    let required = field.is_required();
    let choice = string_enum(field.values.iter().cloned());

    if field.is_single() {
        // the store returns a single select as a plain string
        let response = if required {
            Slot::required(choice.clone())
        } else {
            Slot::optional(optional_text_response(choice.clone()))
        };
        let input = if required {
            Slot::required(choice)
        } else {
            Slot::optional(choice)
        };
        return FieldSchemas::new(response, input);
    }

    let mut input = Schema::array(choice);
    if required {
        input = input.pipe(actions::min_length(1, Some("Input must be at least 1 characters")));
    }
    if let Some(max) = field.max_select() {
        let max = usize::try_from(max).unwrap_or(usize::MAX);
        input = input.pipe(actions::max_length(max, Some(&*format!("Input must be at most {} characters", max))));
    }

    let response = Schema::array(Schema::string());
    if required {
        FieldSchemas::new(Slot::required(response), Slot::required(input))
    } else {
        FieldSchemas::new(Slot::optional(response), Slot::optional(input))
    }
}

fn file_field(field: &FieldModel) -> FieldSchemas {
    let required = field.is_required();
    let mut per_file = file();
    if !field.mime_types.is_empty() {
        per_file = per_file.pipe(actions::mime_type(
            field.mime_types.clone(),
            Some(&*mime_type_message(&field.mime_types)),
        ));
    }
    if let Some(max_size) = field.max_size() {
        per_file = per_file.pipe(actions::max_size(
            max_size,
            Some(&*format!("Please select a file smaller than {}", size_label(max_size))),
        ));
    }

    if field.is_single() {
        let response = if required {
            Slot::required(file_name())
        } else {
            Slot::required(optional_text_response(file_name()))
        };
        let input = if required {
            Slot::required(per_file)
        } else {
            Slot::optional(per_file)
        };
        FieldSchemas::new(response, input)
    } else {
        FieldSchemas::new(
            optional_array(required, file_name_array()),
            optional_array(required, Schema::array(per_file)),
        )
    }
}

/// "Please select one of the following file types: JPEG or PNG"
pub(crate) fn mime_type_message(types: &[String]) -> String {
    let labels: Vec<String> = types
        .iter()
        .map(|t| t.split_once('/').map(|(_, sub)| sub).unwrap_or(t).to_uppercase())
        .collect();
    format!("Please select one of the following file types: {}", labels.join(" or "))
}

/// Largest power-of-1024 unit dividing `bytes` exactly, e.g. "10 MB"
pub(crate) fn size_label(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["bytes", "KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes;
    while unit + 1 < UNITS.len() && value % 1024 == 0 {
        value /= 1024;
        unit += 1;
    }

    match (unit, value) {
        (0, 1) => "1 byte".to_string(),
        _ => format!("{} {}", value, UNITS[unit]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, field_type: FieldType) -> FieldModel {
        FieldModel::new(name, field_type)
    }

    #[test]
    fn test_size_label() {
        assert_eq!(size_label(10 * 1024 * 1024), "10 MB");
        assert_eq!(size_label(5_242_880), "5 MB");
        assert_eq!(size_label(1536), "1536 bytes");
        assert_eq!(size_label(2048), "2 KB");
        assert_eq!(size_label(1), "1 byte");
    }

    #[test]
    fn test_mime_type_message() {
        let types = vec!["image/jpeg".to_string(), "image/svg+xml".to_string()];
        assert_eq!(
            mime_type_message(&types),
            "Please select one of the following file types: JPEG or SVG+XML"
        );
    }

    #[test]
    fn test_optional_text_round_trip() {
        let derived = field_schemas(&field("nickname", FieldType::Text));
        assert_eq!(derived.response.presence, Presence::Required);
        assert_eq!(derived.response.schema.parse(&json!("")).unwrap(), None);
        assert_eq!(derived.input.presence, Presence::Optional);
    }

    #[test]
    fn test_text_exact_length_message() {
        let mut f = field("code", FieldType::Text);
        f.min = Some(json!(4));
        f.max = Some(json!(4));
        let derived = field_schemas(&f);
        let err = derived.input.schema.parse(&json!("abc")).unwrap_err();
        assert_eq!(err.issues[0].message, "Input must be exactly 4");
        assert_eq!(derived.input.presence, Presence::Required);
    }

    #[test]
    fn test_text_pattern() {
        let mut f = field("slug", FieldType::Text);
        f.pattern = Some("^[a-z-]+$".to_string());
        let derived = field_schemas(&f);
        let err = derived.input.schema.parse(&json!("Not A Slug")).unwrap_err();
        assert_eq!(err.issues[0].message, INVALID_FORMAT);
    }

    #[test]
    fn test_number_bounds_messages() {
        let mut f = field("rating", FieldType::Number);
        f.min = Some(json!(1));
        f.max = Some(json!(5));
        f.only_int = true;
        let input = field_schemas(&f).input.schema;
        let err = input.parse(&json!(0)).unwrap_err();
        assert_eq!(err.issues[0].message, "Input must be greater than 0");
        let err = input.parse(&json!(2.5)).unwrap_err();
        assert_eq!(err.issues[0].message, ONLY_INTEGERS);
        let err = input.parse(&json!(6)).unwrap_err();
        assert_eq!(err.issues[0].message, "Input must be lower than 6");
        assert!(input.is_valid(&json!(3)));
    }

    #[test]
    fn test_required_bool_must_be_true() {
        let mut f = field("accepted", FieldType::Bool);
        f.required = true;
        let derived = field_schemas(&f);
        assert!(derived.input.schema.is_valid(&json!(true)));
        assert!(!derived.input.schema.is_valid(&json!(false)));
        assert!(derived.response.schema.is_valid(&json!(false)));
    }

    #[test]
    fn test_select_single_and_multiple() {
        let mut f = field("tags", FieldType::Select);
        f.values = vec!["a".into(), "b".into(), "c".into()];
        f.max_select = Some(2);
        f.required = true;
        let input = field_schemas(&f).input.schema;
        assert!(input.is_valid(&json!(["a", "b"])));
        assert!(!input.is_valid(&json!([])));
        assert!(!input.is_valid(&json!(["a", "b", "c"])));
        assert!(!input.is_valid(&json!(["d"])));

        f.max_select = Some(1);
        let derived = field_schemas(&f);
        assert!(derived.input.schema.is_valid(&json!("a")));
        assert!(derived.response.schema.is_valid(&json!("b")));
    }

    #[test]
    fn test_relation_multiple_defaults_to_empty() {
        let derived = field_schemas(&field("tasks", FieldType::Relation));
        assert_eq!(derived.input.presence, Presence::Default(json!([])));
        assert_eq!(derived.response.presence, Presence::Default(json!([])));
    }

    #[test]
    fn test_file_constraints() {
        let mut f = field("avatar", FieldType::File);
        f.max_select = Some(1);
        f.mime_types = vec!["image/jpeg".into(), "image/png".into()];
        f.max_size = Some(10 * 1024 * 1024);
        let input = field_schemas(&f).input.schema;
        let err = input
            .parse(&json!({"name": "a.gif", "type": "image/gif", "size": 20 * 1024 * 1024}))
            .unwrap_err();
        let messages: Vec<_> = err.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Please select one of the following file types: JPEG or PNG",
                "Please select a file smaller than 10 MB"
            ]
        );
    }

    #[test]
    fn test_url_only_domains() {
        let mut f = field("homepage", FieldType::Url);
        f.only_domains = vec!["example.com".into()];
        let derived = field_schemas(&f);
        assert!(derived.input.schema.is_valid(&json!("https://www.example.com")));
        assert!(!derived.input.schema.is_valid(&json!("https://example.org")));
        assert_eq!(derived.response.schema.parse(&json!("")).unwrap(), None);
    }

    #[test]
    fn test_unknown_type_accepts_anything() {
        let derived = field_schemas(&field("blob", FieldType::Unknown));
        assert!(derived.input.schema.is_valid(&json!({"x": [1, 2]})));
        assert_eq!(derived.input.presence, Presence::Optional);
    }
}
