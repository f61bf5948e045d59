//! `_externalAuths`: links between auth records and OAuth2 providers

use serde::{Deserialize, Serialize};

use super::SystemFields;
use crate::combinators::{CollectionKind, CollectionSchemas};
use crate::registry::{Collection, CollectionName};
use crate::schema::{ObjectSchema, Schema};

fn fields() -> ObjectSchema {
    ObjectSchema::new()
        .required("collectionRef", Schema::string())
        .required("recordRef", Schema::string())
        .required("provider", Schema::string())
        .required("providerId", Schema::string())
}

pub(crate) fn schemas() -> CollectionSchemas {
    CollectionSchemas::derive(
        CollectionName::ExternalAuths.as_str(),
        CollectionKind::Base,
        fields(),
        fields(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAuth {
    #[serde(flatten)]
    pub system: SystemFields,
    pub collection_ref: String,
    pub record_ref: String,
    pub provider: String,
    pub provider_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExternalAuth {
    pub collection_ref: String,
    pub record_ref: String,
    pub provider: String,
    pub provider_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExternalAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ExternalAuths;

impl Collection for ExternalAuths {
    const NAME: CollectionName = CollectionName::ExternalAuths;
    type Record = ExternalAuth;
    type Create = CreateExternalAuth;
    type Update = UpdateExternalAuth;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_serializes_only_set_fields() {
        let patch = UpdateExternalAuth {
            provider_id: Some("gh-42".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"providerId": "gh-42"}));
        assert!(schemas().update.is_valid(&value));
    }
}
