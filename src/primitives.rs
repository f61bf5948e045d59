//! Primitive schemas and their branded value types
//!
//! Every brand is a newtype with a private field. The only ways to obtain one
//! are `parse`, `TryFrom`/`FromStr` and `Deserialize`, all of which run the
//! matching primitive schema first.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ValidationError;
use crate::schema::{actions, ObjectSchema, Schema, Step};
use crate::url;

pub const URL_MESSAGE: &str = "The url is badly formatted.";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";

/// 15 character collection identifier
pub fn collection_id() -> Schema {
    Schema::string().pipe(actions::length(15, None)).brand("CollectionId")
}

/// 15 character record identifier
pub fn record_id() -> Schema {
    Schema::string().pipe(actions::length(15, None)).brand("RecordId")
}

/// Single relation: the 15 character id of the referenced record
pub fn relation_id() -> Schema {
    Schema::string().pipe(actions::length(15, None)).brand("Relation")
}

/// Multi-valued relation: ordered referenced ids
pub fn relation_multiple() -> Schema {
    Schema::array(Schema::string()).brand("RelationMultiple")
}

pub fn iso_date() -> Schema {
    Schema::string().pipe(actions::iso_timestamp(None)).brand("Date")
}

/// Server-assigned timestamp; same grammar as [`iso_date`]
pub fn iso_auto_date() -> Schema {
    Schema::string().pipe(actions::iso_timestamp(None)).brand("AutoDate")
}

pub fn email() -> Schema {
    Schema::string().pipe(actions::email(Some(EMAIL_MESSAGE))).brand("Email")
}

pub fn file_name() -> Schema {
    Schema::string().brand("FileName")
}

pub fn file_name_array() -> Schema {
    Schema::array(file_name())
}

pub fn file() -> Schema {
    Schema::file().brand("File")
}

pub fn file_array() -> Schema {
    Schema::array(file())
}

pub fn geo_point() -> Schema {
    ObjectSchema::new()
        .required("lon", Schema::number())
        .required("lat", Schema::number())
        .into_schema()
        .brand("GeoPoint")
}

pub fn editor() -> Schema {
    Schema::string().brand("Editor")
}

pub fn json() -> Schema {
    Schema::string().brand("JSON")
}

pub fn url() -> Schema {
    Schema::string()
        .pipe(actions::non_empty(None))
        .pipe(actions::url(Some(URL_MESSAGE)))
        .brand("URL")
}

pub fn password() -> Schema {
    Schema::string().pipe(actions::min_length(8, None)).brand("Password")
}

/// Exactly one of `values`
pub fn string_enum<I, S>(values: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Schema::picklist(values)
}

fn collect_domains<I, S>(domains: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    domains.into_iter().map(Into::into).collect()
}

/// URL whose host is one of `domains` or a subdomain of one
///
/// A URL whose hostname cannot be extracted never matches.
pub fn only_domains<I, S>(domains: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let domains = collect_domains(domains);
    let message = format!("The URL must be one of: {}", domains.join(", "));
    Schema::string()
        .pipe(actions::non_empty(None))
        .pipe(actions::url(Some("The url is badly formatted")))
        .brand("OnlyDomains")
        .pipe(Step::check(
            move |value| {
                value
                    .as_str()
                    .and_then(url::hostname)
                    .map(|host| url::host_matches(&host, domains.as_slice()))
                    .unwrap_or(false)
            },
            message,
        ))
}

/// URL whose host is none of `domains` nor a subdomain of one
///
/// Fails closed like [`only_domains`]: a URL whose hostname cannot be
/// extracted is rejected.
pub fn except_domains<I, S>(domains: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let domains = collect_domains(domains);
    let message = format!("The URL must not be any one of: {}", domains.join(", "));
    Schema::string()
        .pipe(actions::non_empty(None))
        .pipe(actions::url(Some("The url is badly formatted")))
        .brand("ExceptDomains")
        .pipe(Step::check(
            move |value| {
                value
                    .as_str()
                    .and_then(url::hostname)
                    .map(|host| !url::host_matches(&host, domains.as_slice()))
                    .unwrap_or(false)
            },
            message,
        ))
}

macro_rules! string_brand {
    ($(#[$meta:meta])* $name:ident => $schema:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate `raw` and brand it
            pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
                static SCHEMA: LazyLock<Schema> = LazyLock::new(|| $schema);
                let raw = raw.into();
                SCHEMA.validate(&Value::String(raw.clone()))?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(raw)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValidationError;

            fn try_from(raw: &str) -> Result<Self, Self::Error> {
                Self::parse(raw)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::parse(raw)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_brand!(
    /// Identifier of a collection
    CollectionId => collection_id()
);
string_brand!(
    /// Identifier of a record
    RecordId => record_id()
);
string_brand!(
    /// Identifier stored in a single relation field
    RelationId => relation_id()
);
string_brand!(
    /// Client or server supplied ISO-8601 timestamp
    IsoDate => iso_date()
);
string_brand!(
    /// Server assigned ISO-8601 timestamp
    IsoAutoDate => iso_auto_date()
);
string_brand!(Email => email());
string_brand!(
    /// Stored file name as returned by the store
    FileName => file_name()
);
string_brand!(Editor => editor());
string_brand!(
    /// Serialized JSON document kept as text
    JsonText => json()
);
string_brand!(Url => url());

fn to_datetime(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let normalized = match raw.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &raw[..10], &raw[11..]),
        _ => raw.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized)
        .or_else(|_| DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%#z"))
        .map(|dt| dt.with_timezone(&Utc))
}

impl IsoDate {
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        to_datetime(&self.0)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.format("%Y-%m-%d %H:%M:%S%.3fZ").to_string())
    }
}

impl IsoAutoDate {
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        to_datetime(&self.0)
    }
}

impl From<RecordId> for RelationId {
    fn from(id: RecordId) -> Self {
        Self(id.0)
    }
}

/// Account password; `Debug` never prints the secret
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Password(String);

impl Password {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(password);
        let raw = raw.into();
        SCHEMA.validate(&Value::String(raw.clone()))?;
        Ok(Self(raw))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(********)")
    }
}

impl TryFrom<String> for Password {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<Password> for String {
    fn from(value: Password) -> String {
        value.0
    }
}

/// Ordered ids of the records a multi-valued relation points to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationMultiple(Vec<String>);

impl RelationMultiple {
    pub fn from_records<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = RecordId>,
    {
        Self(ids.into_iter().map(RecordId::into_inner).collect())
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Geographic point; any pair of numbers is accepted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }
}

/// Descriptor of a file to upload; the bytes travel separately
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    name: String,
    #[serde(rename = "type")]
    mime_type: String,
    size: u64,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn to_value(&self) -> Value {
        json!({ "name": self.name, "type": self.mime_type, "size": self.size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_length() {
        let schema = record_id();
        assert!(schema.is_valid(&json!("abcdefghijklmno")));
        assert!(!schema.is_valid(&json!("abcdefghijklmn")));
        assert!(!schema.is_valid(&json!("abcdefghijklmnop")));
        assert!(!schema.is_valid(&json!(123456789012345u64)));
        assert!(collection_id().is_valid(&json!("pbc_12345678901")));
    }

    #[test]
    fn test_brand_construction_validates() {
        assert!(RecordId::parse("abcdefghijklmno").is_ok());
        assert!(RecordId::parse("short").is_err());
        let parsed: Result<RecordId, _> = serde_json::from_value(json!("short"));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_email_message() {
        let err = email().parse(&json!("nope")).unwrap_err();
        assert_eq!(err.issues[0].message, EMAIL_MESSAGE);
        assert!(Email::parse("a@b.com").is_ok());
    }

    #[test]
    fn test_url_messages() {
        let err = url().parse(&json!("not a url")).unwrap_err();
        assert_eq!(err.issues[0].message, URL_MESSAGE);

        let err = url().parse(&json!("")).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(err.issues[1].message, URL_MESSAGE);
    }

    #[test]
    fn test_only_domains() {
        let schema = only_domains(["mytodos.com"]);
        assert!(schema.is_valid(&json!("https://mytodos.com/x")));
        assert!(schema.is_valid(&json!("https://sub.mytodos.com")));
        let err = schema.parse(&json!("https://evil.com/x")).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].message, "The URL must be one of: mytodos.com");
        assert!(!schema.is_valid(&json!("https://evil.com\\@mytodos.com/x")));

        let err = schema.parse(&json!("garbage")).unwrap_err();
        let messages: Vec<_> = err.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["The url is badly formatted", "The URL must be one of: mytodos.com"]);
    }

    #[test]
    fn test_except_domains() {
        let schema = except_domains(["facebook.com", "instagram.com"]);
        assert!(schema.is_valid(&json!("https://mytodos.com")));
        let err = schema.parse(&json!("https://m.facebook.com/p")).unwrap_err();
        assert_eq!(
            err.issues[0].message,
            "The URL must not be any one of: facebook.com, instagram.com"
        );
        // malformed input is rejected, not treated as "not excluded"
        let err = schema.parse(&json!("garbage")).unwrap_err();
        assert!(err
            .issues
            .iter()
            .any(|i| i.message.starts_with("The URL must not be any one of")));
    }

    #[test]
    fn test_string_enum() {
        let schema = string_enum(["Due", "Completed"]);
        assert!(schema.is_valid(&json!("Due")));
        assert!(!schema.is_valid(&json!("due")));
        assert!(!schema.is_valid(&json!(["Due"])));
    }

    #[test]
    fn test_geo_point_permissive() {
        assert!(geo_point().is_valid(&json!({"lon": 500.0, "lat": -200})));
        assert!(!geo_point().is_valid(&json!({"lon": "1", "lat": 2})));
    }

    #[test]
    fn test_password_min_length_and_debug() {
        assert!(Password::parse("short").is_err());
        let pw = Password::parse("abcdefgh").unwrap();
        assert_eq!(format!("{:?}", pw), "Password(********)");
    }

    #[test]
    fn test_iso_date_to_datetime() {
        let date = IsoDate::parse("2024-05-01 10:30:00.123Z").unwrap();
        let dt = date.to_datetime().unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T10:30:00.123+00:00");
        assert_eq!(IsoDate::from_datetime(dt).as_str(), "2024-05-01 10:30:00.123Z");
        assert!(IsoDate::parse("yesterday").is_err());
    }
}
