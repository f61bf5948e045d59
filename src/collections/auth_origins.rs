//! `_authOrigins`: device fingerprints that authenticated a record

use serde::{Deserialize, Serialize};

use super::SystemFields;
use crate::combinators::{CollectionKind, CollectionSchemas};
use crate::registry::{Collection, CollectionName};
use crate::schema::{ObjectSchema, Schema};

fn fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("collectionRef", Schema::string())
        .required("recordRef", Schema::string())
        .required("fingerprint", Schema::string())
}

pub(crate) fn schemas() -> CollectionSchemas {
    CollectionSchemas::derive(
        CollectionName::AuthOrigins.as_str(),
        CollectionKind::Base,
        fields(),
        fields(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOrigin {
    #[serde(flatten)]
    pub system: SystemFields,
    pub collection_ref: String,
    pub record_ref: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthOrigin {
    pub collection_ref: String,
    pub record_ref: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthOrigin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct AuthOrigins;

impl Collection for AuthOrigins {
    const NAME: CollectionName = CollectionName::AuthOrigins;
    type Record = AuthOrigin;
    type Create = CreateAuthOrigin;
    type Update = UpdateAuthOrigin;
}
