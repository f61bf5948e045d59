//! Object schemas: ordered entries with per-entry presence

use serde_json::{Map, Value};

use super::{describe_received, Outcome, Schema};
use crate::error::{FieldPath, Issue};

/// Whether an entry's key must be supplied
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    /// Missing keys take this value, which is then validated like any input
    Default(Value),
}

impl Presence {
    pub fn is_required(&self) -> bool {
        matches!(self, Presence::Required)
    }
}

/// A named entry of an [`ObjectSchema`]
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub schema: Schema,
    pub presence: Presence,
}

/// Ordered mapping from field name to schema
///
/// Unknown input keys are stripped from the output, except for declared side
/// channels which are copied through untouched.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    entries: Vec<Entry>,
    side_channels: Vec<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, name: impl Into<String>, schema: Schema, presence: Presence) -> Self {
        let name = name.into();
        self.entries.retain(|e| e.name != name);
        self.entries.push(Entry { name, schema, presence });
        self
    }

    pub fn required(self, name: impl Into<String>, schema: Schema) -> Self {
        self.entry(name, schema, Presence::Required)
    }

    pub fn optional(self, name: impl Into<String>, schema: Schema) -> Self {
        self.entry(name, schema, Presence::Optional)
    }

    pub fn optional_or(self, name: impl Into<String>, schema: Schema, default: Value) -> Self {
        self.entry(name, schema, Presence::Default(default))
    }

    /// Copy `name` through without validation when present
    pub fn side_channel(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.side_channels.contains(&name) {
            self.side_channels.push(name);
        }
        self
    }

    /// Spread `other`'s entries after this schema's entries
    pub fn extend(mut self, other: ObjectSchema) -> Self {
        for entry in other.entries {
            self = self.entry(entry.name, entry.schema, entry.presence);
        }
        for name in other.side_channels {
            self = self.side_channel(name);
        }
        self
    }

    /// Same entries, every one optional and without defaults
    pub fn partial(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| Entry {
                    name: e.name.clone(),
                    schema: e.schema.clone(),
                    presence: Presence::Optional,
                })
                .collect(),
            side_channels: self.side_channels.clone(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn side_channels(&self) -> &[String] {
        &self.side_channels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_schema(self) -> Schema {
        Schema::object(self)
    }

    pub(super) fn run(&self, input: &Value, path: &FieldPath, issues: &mut Vec<Issue>) -> Option<Value> {
        let Some(object) = input.as_object() else {
            issues.push(Issue::field(
                path.clone(),
                format!("Invalid type: Expected Object but received {}", describe_received(Some(input))),
                Some(input),
            ));
            return None;
        };

        let mut output = Map::new();
        let mut failed = false;

        for entry in &self.entries {
            let entry_path = path.key(entry.name.as_str());
            let default;
            let value = match (object.get(&entry.name), &entry.presence) {
                (Some(value), _) => value,
                (None, Presence::Default(value)) => {
                    default = value.clone();
                    &default
                }
                (None, Presence::Optional) => continue,
                (None, Presence::Required) => {
                    issues.push(Issue::field(
                        entry_path,
                        format!("Invalid key: Expected \"{}\" but received undefined", entry.name),
                        None,
                    ));
                    failed = true;
                    continue;
                }
            };

            match entry.schema.run(value, &entry_path, issues) {
                Outcome::Present(value) => {
                    output.insert(entry.name.clone(), value);
                }
                Outcome::Absent => {}
                Outcome::Invalid { .. } => failed = true,
            }
        }

        for name in &self.side_channels {
            if let Some(value) = object.get(name) {
                output.insert(name.clone(), value.clone());
            }
        }

        (!failed).then_some(Value::Object(output))
    }
}
