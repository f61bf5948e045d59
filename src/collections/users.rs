//! `users`: end-user accounts with an avatar and a task relation

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{lenient_expand, SystemFields, Todo};
use crate::combinators::{CollectionKind, CollectionSchemas};
use crate::normalize::optional_text_response;
use crate::primitives::{
    email, file, file_name, geo_point, relation_multiple, string_enum, Email, FileName, FileUpload, GeoPoint,
    Password, RelationMultiple,
};
use crate::registry::{Collection, CollectionName};
use crate::schema::{actions, ObjectSchema, Schema};

pub const AVATAR_MIME_TYPES: [&str; 5] = ["image/jpeg", "image/png", "image/svg+xml", "image/gif", "image/webp"];
const LANGUAGES: [&str; 3] = ["Swedish", "English", "Spanish"];

// ASCII word characters, first one not a dot or dash
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("username pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Swedish,
    English,
    Spanish,
}

pub fn response_fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("avatar", optional_text_response(file_name()))
        .required("name", optional_text_response(Schema::string()))
        .required("username", Schema::string())
        .optional_or("tasks", relation_multiple(), json!([]))
        .optional("languages", optional_text_response(string_enum(LANGUAGES)))
        .optional("address", geo_point())
        .required("email", optional_text_response(email()))
        .optional("emailVisibility", Schema::boolean())
        .optional("verified", Schema::boolean())
        .side_channel("expand")
}

pub fn input_fields() -> ObjectSchema {
    ObjectSchema::new()
        .optional(
            "avatar",
            file().pipe(actions::mime_type(
                AVATAR_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
                Some("Please select one of the following file types: JPEG or PNG or SVG+XML or GIF or WEBP"),
            )),
        )
        .optional(
            "name",
            Schema::string().pipe(actions::max_length(255, Some("Input must be at most 255 characters"))),
        )
        .required(
            "username",
            Schema::string()
                .pipe(actions::min_length(3, Some("Input must be at least 3 characters")))
                .pipe(actions::max_length(80, Some("Input must be at most 80 characters")))
                .pipe(actions::regex(USERNAME_RE.clone(), Some("Invalid format"))),
        )
        .optional_or("tasks", relation_multiple(), json!([]))
        .optional("languages", string_enum(LANGUAGES))
        .optional("address", geo_point())
        .required("email", email())
        .optional("emailVisibility", Schema::boolean())
        .optional("verified", Schema::boolean())
}

pub(crate) fn schemas() -> CollectionSchemas {
    CollectionSchemas::derive(
        CollectionName::Users.as_str(),
        CollectionKind::Auth,
        response_fields(),
        input_fields(),
    )
}

/// Relations that can be expanded when loading users
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserExpand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Todo>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub system: SystemFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FileName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub username: String,
    #[serde(default)]
    pub tasks: RelationMultiple,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_visibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient_expand", skip_serializing_if = "Option::is_none")]
    pub expand: Option<UserExpand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FileUpload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub username: String,
    #[serde(default)]
    pub tasks: RelationMultiple,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<GeoPoint>,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_visibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    pub password: Password,
    pub password_confirm: String,
}

impl CreateUser {
    /// Minimal account; the confirmation repeats `password`
    pub fn new(username: impl Into<String>, email: Email, password: Password) -> Self {
        Self {
            avatar: None,
            name: None,
            username: username.into(),
            tasks: RelationMultiple::default(),
            languages: None,
            address: None,
            email,
            email_visibility: None,
            verified: None,
            password_confirm: password.expose().to_string(),
            password,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FileUpload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<RelationMultiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_visibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Password>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_confirm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Users;

impl Collection for Users {
    const NAME: CollectionName = CollectionName::Users;
    type Record = User;
    type Create = CreateUser;
    type Update = UpdateUser;
}
