//! `_superusers`: administrator accounts

use serde::{Deserialize, Serialize};

use super::SystemFields;
use crate::combinators::{CollectionKind, CollectionSchemas};
use crate::normalize::optional_text_response;
use crate::primitives::{email, Email, Password};
use crate::registry::{Collection, CollectionName};
use crate::schema::{ObjectSchema, Schema};

pub fn response_fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("email", optional_text_response(email()))
        .optional("emailVisibility", Schema::boolean())
        .optional("verified", Schema::boolean())
}

pub fn input_fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("email", email())
        .optional("emailVisibility", Schema::boolean())
        .optional("verified", Schema::boolean())
}

pub(crate) fn schemas() -> CollectionSchemas {
    CollectionSchemas::derive(
        CollectionName::Superusers.as_str(),
        CollectionKind::Auth,
        response_fields(),
        input_fields(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Superuser {
    #[serde(flatten)]
    pub system: SystemFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_visibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuperuser {
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_visibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    pub password: Password,
    pub password_confirm: String,
}

impl CreateSuperuser {
    /// New account whose confirmation repeats `password`
    pub fn new(email: Email, password: Password) -> Self {
        Self {
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
pub struct UpdateSuperuser {
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
pub struct Superusers;

impl Collection for Superusers {
    const NAME: CollectionName = CollectionName::Superusers;
    type Record = Superuser;
    type Create = CreateSuperuser;
    type Update = UpdateSuperuser;
}
