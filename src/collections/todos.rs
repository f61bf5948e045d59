//! `todos`: plain collection with a domain-restricted link

use serde::{Deserialize, Serialize};

use super::SystemFields;
use crate::combinators::{CollectionKind, CollectionSchemas};
use crate::normalize::optional_text_response;
use crate::primitives::{iso_date, only_domains, string_enum, url, IsoDate, Url};
use crate::registry::{Collection, CollectionName};
use crate::schema::{actions, ObjectSchema, Schema};

pub const LINK_DOMAINS: &[&str] = &["mytodos.com"];
const STATES: [&str; 2] = ["Due", "Completed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TodoState {
    Due,
    Completed,
}

pub fn response_fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("name", Schema::string())
        .required("description", Schema::string())
        .required("link", optional_text_response(url()))
        .optional("state", optional_text_response(string_enum(STATES)))
        .required("completed", optional_text_response(iso_date()))
}

pub fn input_fields() -> ObjectSchema {
    ObjectSchema::new()
        .required(
            "name",
            Schema::string()
                .pipe(actions::min_length(3, Some("Input must be at least 3 characters")))
                .pipe(actions::max_length(120, Some("Input must be at most 120 characters"))),
        )
        .required(
            "description",
            Schema::string()
                .pipe(actions::min_length(3, Some("Input must be at least 3 characters")))
                .pipe(actions::max_length(150, Some("Input must be at most 150 characters"))),
        )
        .optional("link", only_domains(LINK_DOMAINS.iter().copied()))
        .optional("state", string_enum(STATES))
        .optional("completed", iso_date())
}

pub(crate) fn schemas() -> CollectionSchemas {
    CollectionSchemas::derive(
        CollectionName::Todos.as_str(),
        CollectionKind::Base,
        response_fields(),
        input_fields(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(flatten)]
    pub system: SystemFields,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TodoState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<IsoDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTodo {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TodoState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<IsoDate>,
}

impl CreateTodo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            link: None,
            state: None,
            completed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TodoState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<IsoDate>,
}

/// Marker for the `todos` collection
#[derive(Debug, Clone, Copy)]
pub struct Todos;

impl Collection for Todos {
    const NAME: CollectionName = CollectionName::Todos;
    type Record = Todo;
    type Create = CreateTodo;
    type Update = UpdateTodo;
}
