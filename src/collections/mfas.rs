//! `_mfas`: multi-factor authentication attempts

use serde::{Deserialize, Serialize};

use super::SystemFields;
use crate::combinators::{CollectionKind, CollectionSchemas};
use crate::registry::{Collection, CollectionName};
use crate::schema::{ObjectSchema, Schema};

fn fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("collectionRef", Schema::string())
        .required("recordRef", Schema::string())
        .required("method", Schema::string())
}

pub(crate) fn schemas() -> CollectionSchemas {
    CollectionSchemas::derive(CollectionName::Mfas.as_str(), CollectionKind::Base, fields(), fields())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mfa {
    #[serde(flatten)]
    pub system: SystemFields,
    pub collection_ref: String,
    pub record_ref: String,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMfa {
    pub collection_ref: String,
    pub record_ref: String,
    pub method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMfa {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Mfas;

impl Collection for Mfas {
    const NAME: CollectionName = CollectionName::Mfas;
    type Record = Mfa;
    type Create = CreateMfa;
    type Update = UpdateMfa;
}
