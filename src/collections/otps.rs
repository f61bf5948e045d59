//! `_otps`: one-time passwords issued to auth records

use serde::{Deserialize, Serialize};

use super::SystemFields;
use crate::combinators::{CollectionKind, CollectionSchemas};
use crate::registry::{Collection, CollectionName};
use crate::schema::{ObjectSchema, Schema};

fn fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("collectionRef", Schema::string())
        .required("recordRef", Schema::string())
}

pub(crate) fn schemas() -> CollectionSchemas {
    CollectionSchemas::derive(CollectionName::Otps.as_str(), CollectionKind::Base, fields(), fields())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Otp {
    #[serde(flatten)]
    pub system: SystemFields,
    pub collection_ref: String,
    pub record_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOtp {
    pub collection_ref: String,
    pub record_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOtp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ref: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Otps;

impl Collection for Otps {
    const NAME: CollectionName = CollectionName::Otps;
    type Record = Otp;
    type Create = CreateOtp;
    type Update = UpdateOtp;
}
