//! Schema engine
//!
//! A [`Schema`] is a *kind* (the structural type check) followed by an ordered
//! pipe of [`Step`]s. Steps are pure checks, forwarded checks (reported on a
//! sibling field) or pure transforms. Schemas are values: combinators build
//! new schemas from existing ones and never mutate a shared instance.
//!
//! Evaluation rules:
//! - a kind mismatch stops the schema and reports one type issue
//! - after a successful kind check every check step runs, collecting all
//!   failing messages
//! - transforms only run while no issue has been raised
//! - an object runs its own steps (cross-field rules) only when every entry
//!   passed

pub mod actions;
mod object;

pub use object::{Entry, ObjectSchema, Presence};

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{FieldPath, Issue, SchemaError, ValidationError};

/// A check over an already typed value; `Err` carries the issue message
pub type CheckFn = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// A transform; returning `None` turns the value into an absent one
pub type TransformFn = Arc<dyn Fn(Value) -> Option<Value> + Send + Sync>;

/// One pipe step
#[derive(Clone)]
pub enum Step {
    /// Reported on the value's own path
    Check(CheckFn),
    /// Object-level check reported on the `target` entry
    Forward { target: String, check: CheckFn },
    Transform(TransformFn),
}

impl Step {
    /// Predicate with a fixed message
    pub fn check<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Step::Check(Arc::new(move |value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(message.clone())
            }
        }))
    }

    /// Check computing its own message from the failing value
    pub fn check_with<F>(check: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Step::Check(Arc::new(check))
    }

    /// Cross-field predicate over an object, reported on `target`
    pub fn forward<F>(target: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Step::Forward {
            target: target.into(),
            check: Arc::new(move |value| match value.as_object() {
                Some(object) if predicate(object) => Ok(()),
                _ => Err(message.clone()),
            }),
        }
    }

    pub fn transform<F>(transform: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        Step::Transform(Arc::new(transform))
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Check(_) => write!(f, "check"),
            Step::Forward { target, .. } => write!(f, "forward({})", target),
            Step::Transform(_) => write!(f, "transform"),
        }
    }
}

/// Structural type checked before the pipe runs
#[derive(Clone, Debug)]
pub enum Kind {
    Any,
    String,
    Number,
    Boolean,
    Literal(Value),
    /// One of a fixed set of strings
    Picklist(Vec<String>),
    Array(Box<Schema>),
    Object(ObjectSchema),
    Union(Vec<Schema>),
    /// Every option must pass; object outputs are merged
    Intersect(Vec<Schema>),
    /// Upload descriptor: `{ "name": string, "type": string, "size": integer }`
    File,
}

/// Result of running a schema against one value
#[derive(Debug)]
pub(crate) enum Outcome {
    Present(Value),
    Absent,
    /// `typed` is true when the kind check passed but a step failed
    Invalid { typed: bool },
}

/// An immutable, reusable validator
#[derive(Clone)]
pub struct Schema {
    kind: Kind,
    pipe: Vec<Step>,
    brand: Option<&'static str>,
}

impl Schema {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            pipe: Vec::new(),
            brand: None,
        }
    }

    pub fn any() -> Self {
        Self::new(Kind::Any)
    }

    pub fn string() -> Self {
        Self::new(Kind::String)
    }

    pub fn number() -> Self {
        Self::new(Kind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(Kind::Literal(value.into()))
    }

    pub fn picklist<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Kind::Picklist(values.into_iter().map(Into::into).collect()))
    }

    pub fn array(item: Schema) -> Self {
        Self::new(Kind::Array(Box::new(item)))
    }

    pub fn object(object: ObjectSchema) -> Self {
        Self::new(Kind::Object(object))
    }

    pub fn union(options: Vec<Schema>) -> Self {
        Self::new(Kind::Union(options))
    }

    pub fn intersect(options: Vec<Schema>) -> Self {
        Self::new(Kind::Intersect(options))
    }

    pub fn file() -> Self {
        Self::new(Kind::File)
    }

    /// Append a step, returning the extended schema
    pub fn pipe(mut self, step: Step) -> Self {
        self.pipe.push(step);
        self
    }

    /// Shorthand for `pipe(Step::check(..))`
    pub fn check<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.pipe(Step::check(predicate, message))
    }

    /// Tag the schema with a nominal brand; purely descriptive at runtime
    pub fn brand(mut self, name: &'static str) -> Self {
        self.brand = Some(name);
        self
    }

    pub fn brand_name(&self) -> Option<&'static str> {
        self.brand
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn steps(&self) -> &[Step] {
        &self.pipe
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            Kind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Validate and normalize `input`; `Ok(None)` is the absent value
    pub fn parse(&self, input: &Value) -> std::result::Result<Option<Value>, ValidationError> {
        let mut issues = Vec::new();
        let outcome = self.run(input, &FieldPath::root(), &mut issues);
        match outcome {
            Outcome::Present(value) if issues.is_empty() => Ok(Some(value)),
            Outcome::Absent if issues.is_empty() => Ok(None),
            _ => Err(ValidationError::new(issues)),
        }
    }

    pub fn validate(&self, input: &Value) -> std::result::Result<(), ValidationError> {
        self.parse(input).map(|_| ())
    }

    pub fn is_valid(&self, input: &Value) -> bool {
        self.validate(input).is_ok()
    }

    /// Validate, then decode the normalized output into `T`
    pub fn parse_as<T: DeserializeOwned>(&self, input: &Value) -> crate::error::Result<T> {
        let output = self.parse(input)?.unwrap_or(Value::Null);
        serde_json::from_value(output).map_err(SchemaError::Decode)
    }

    /// Human readable name of what the kind accepts
    pub fn expects(&self) -> String {
        match &self.kind {
            Kind::Any => "any".to_string(),
            Kind::String => "string".to_string(),
            Kind::Number => "number".to_string(),
            Kind::Boolean => "boolean".to_string(),
            Kind::Literal(value) => value.to_string(),
            Kind::Picklist(values) => values
                .iter()
                .map(|v| format!("\"{}\"", v))
                .collect::<Vec<_>>()
                .join(" | "),
            Kind::Array(_) => "Array".to_string(),
            Kind::Object(_) => "Object".to_string(),
            Kind::File => "File".to_string(),
            Kind::Union(options) => {
                let parts: Vec<_> = options.iter().map(Schema::expects).collect();
                format!("({})", parts.join(" | "))
            }
            Kind::Intersect(options) => {
                let parts: Vec<_> = options.iter().map(Schema::expects).collect();
                format!("({})", parts.join(" & "))
            }
        }
    }

    pub(crate) fn run(&self, input: &Value, path: &FieldPath, issues: &mut Vec<Issue>) -> Outcome {
        let start = issues.len();
        let mut value = match self.run_kind(input, path, issues) {
            Some(value) => value,
            None => return Outcome::Invalid { typed: false },
        };

        for step in &self.pipe {
            match step {
                Step::Check(check) => {
                    if let Err(message) = check(&value) {
                        issues.push(Issue::field(path.clone(), message, Some(&value)));
                    }
                }
                Step::Forward { target, check } => {
                    if let Err(message) = check(&value) {
                        issues.push(Issue::cross_field(path.key(target.as_str()), message));
                    }
                }
                Step::Transform(transform) => {
                    if issues.len() > start {
                        break;
                    }
                    match transform(value) {
                        Some(next) => value = next,
                        None => return Outcome::Absent,
                    }
                }
            }
        }

        if issues.len() > start {
            Outcome::Invalid { typed: true }
        } else {
            Outcome::Present(value)
        }
    }

    /// Structural check; `None` means the value is untyped and issues were pushed
    fn run_kind(&self, input: &Value, path: &FieldPath, issues: &mut Vec<Issue>) -> Option<Value> {
        let matches = match &self.kind {
            Kind::Any => true,
            Kind::String => input.is_string(),
            Kind::Number => input.is_number(),
            Kind::Boolean => input.is_boolean(),
            Kind::Literal(expected) => input == expected,
            Kind::Picklist(values) => input
                .as_str()
                .map(|s| values.iter().any(|v| v == s))
                .unwrap_or(false),
            Kind::File => is_file_descriptor(input),
            Kind::Array(item) => return self.run_array(item, input, path, issues),
            Kind::Object(object) => return object.run(input, path, issues),
            Kind::Union(options) => return self.run_union(options, input, path, issues),
            Kind::Intersect(options) => return self.run_intersect(options, input, path, issues),
        };

        if matches {
            Some(input.clone())
        } else {
            issues.push(self.type_issue(input, path));
            None
        }
    }

    fn type_issue(&self, input: &Value, path: &FieldPath) -> Issue {
        Issue::field(
            path.clone(),
            format!(
                "Invalid type: Expected {} but received {}",
                self.expects(),
                describe_received(Some(input))
            ),
            Some(input),
        )
    }

    fn run_array(&self, item: &Schema, input: &Value, path: &FieldPath, issues: &mut Vec<Issue>) -> Option<Value> {
        let Some(elements) = input.as_array() else {
            issues.push(self.type_issue(input, path));
            return None;
        };

        let mut output = Vec::with_capacity(elements.len());
        let mut failed = false;
        for (i, element) in elements.iter().enumerate() {
            match item.run(element, &path.index(i), issues) {
                Outcome::Present(value) => output.push(value),
                Outcome::Absent => output.push(Value::Null),
                Outcome::Invalid { .. } => failed = true,
            }
        }

        (!failed).then_some(Value::Array(output))
    }

    fn run_union(&self, options: &[Schema], input: &Value, path: &FieldPath, issues: &mut Vec<Issue>) -> Option<Value> {
        let mut typed_failure: Option<Vec<Issue>> = None;
        let mut untyped_failures: Vec<Vec<Issue>> = Vec::new();

        for option in options {
            let mut local = Vec::new();
            match option.run(input, path, &mut local) {
                Outcome::Present(value) => return Some(value),
                // An absent output is only produced by a transform; the union
                // itself passes the raw value on and lets the outer pipe decide.
                Outcome::Absent => return Some(input.clone()),
                Outcome::Invalid { typed: true } => {
                    typed_failure.get_or_insert(local);
                }
                Outcome::Invalid { typed: false } => untyped_failures.push(local),
            }
        }

        match typed_failure {
            Some(local) => issues.extend(local),
            None if untyped_failures.len() == 1 => issues.extend(untyped_failures.remove(0)),
            None => issues.push(self.type_issue(input, path)),
        }
        None
    }

    fn run_intersect(&self, options: &[Schema], input: &Value, path: &FieldPath, issues: &mut Vec<Issue>) -> Option<Value> {
        let mut outputs = Vec::with_capacity(options.len());
        let mut failed = false;
        for option in options {
            match option.run(input, path, issues) {
                Outcome::Present(value) => outputs.push(value),
                Outcome::Absent => outputs.push(Value::Null),
                Outcome::Invalid { .. } => failed = true,
            }
        }
        if failed {
            return None;
        }

        let mut merged: Option<Value> = None;
        for output in outputs {
            merged = match (merged, output) {
                (None, output) => Some(output),
                (Some(Value::Object(mut left)), Value::Object(right)) => {
                    for (key, value) in right {
                        if let Some(existing) = left.get(&key) {
                            if existing != &value {
                                issues.push(Issue::field(
                                    path.key(key.as_str()),
                                    "Invalid type: Expected mergeable values",
                                    Some(&value),
                                ));
                                return None;
                            }
                        }
                        left.insert(key, value);
                    }
                    Some(Value::Object(left))
                }
                (Some(left), right) if left == right => Some(left),
                (Some(_), right) => {
                    issues.push(Issue::field(path.clone(), "Invalid type: Expected mergeable values", Some(&right)));
                    return None;
                }
            };
        }
        Some(merged.unwrap_or(Value::Null))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Schema");
        s.field("kind", &self.kind);
        if !self.pipe.is_empty() {
            s.field("pipe", &self.pipe);
        }
        if let Some(brand) = self.brand {
            s.field("brand", &brand);
        }
        s.finish()
    }
}

fn is_file_descriptor(input: &Value) -> bool {
    let Some(object) = input.as_object() else {
        return false;
    };
    object.get("name").map(Value::is_string).unwrap_or(false)
        && object.get("type").map(Value::is_string).unwrap_or(false)
        && object.get("size").map(Value::is_u64).unwrap_or(false)
}

/// Render a received value for issue messages; `None` is a missing key
pub fn describe_received(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Object(_)) => "Object".to_string(),
        Some(Value::Array(_)) => "Array".to_string(),
        Some(other) => other.to_string(),
    }
}
