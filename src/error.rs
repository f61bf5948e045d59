//! Error types for validation and record composition

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Boxed error returned by a [`RecordStore`](crate::store::RecordStore) implementation
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown collection: {name}{}", suggestion_hint(.suggestion))]
    UnknownCollection {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Validated data could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Record store error: {0}")]
    Store(#[source] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean \"{}\"?)", s),
        None => String::new(),
    }
}

impl SchemaError {
    /// Issues carried by a validation failure, empty for every other error
    pub fn issues(&self) -> &[Issue] {
        match self {
            SchemaError::Validation(e) => &e.issues,
            _ => &[],
        }
    }
}

/// Which rule produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A single field failed its own check (type, length, format, enum)
    Field,
    /// A rule spanning sibling fields failed; reported on its target field
    CrossField,
}

/// One segment of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside the validated input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match segment {
                PathSegment::Key(k) => write!(f, "{}", k)?,
                PathSegment::Index(n) => write!(f, "{}", n)?,
            }
        }
        Ok(())
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: FieldPath,
    pub message: String,
    /// The failing value; `None` when the key was missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
}

impl Issue {
    pub fn field(path: FieldPath, message: impl Into<String>, received: Option<&Value>) -> Self {
        Self {
            kind: IssueKind::Field,
            path,
            message: message.into(),
            received: received.cloned(),
        }
    }

    pub fn cross_field(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::CrossField,
            path,
            message: message.into(),
            received: None,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// All issues raised by one validation call
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Issues reported on the given dotted path (e.g. `"passwordConfirm"`)
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.path.to_string() == path)
    }

    /// First message reported on the given dotted path
    pub fn message_at(&self, path: &str) -> Option<&str> {
        self.issues
            .iter()
            .find(|i| i.path.to_string() == path)
            .map(|i| i.message.as_str())
    }

    pub fn has_cross_field(&self) -> bool {
        self.issues.iter().any(|i| i.kind == IssueKind::CrossField)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "Validation failed"),
            [only] => write!(f, "Validation failed: {}", only),
            [first, rest @ ..] => write!(
                f,
                "Validation failed: {} (and {} more)",
                first,
                rest.len()
            ),
        }
    }
}
