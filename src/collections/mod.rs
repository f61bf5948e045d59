//! Per-collection schema definitions and record types
//!
//! Each submodule declares a response field set, an input field set, the
//! combinator pairing and the typed values decoded from / encoded to them.

pub mod auth_origins;
pub mod external_auths;
pub mod mfas;
pub mod otps;
pub mod superusers;
pub mod todos;
pub mod users;

pub use auth_origins::{AuthOrigin, AuthOrigins, CreateAuthOrigin, UpdateAuthOrigin};
pub use external_auths::{CreateExternalAuth, ExternalAuth, ExternalAuths, UpdateExternalAuth};
pub use mfas::{CreateMfa, Mfa, Mfas, UpdateMfa};
pub use otps::{CreateOtp, Otp, Otps, UpdateOtp};
pub use superusers::{CreateSuperuser, Superuser, Superusers, UpdateSuperuser};
pub use todos::{CreateTodo, Todo, TodoState, Todos, UpdateTodo};
pub use users::{CreateUser, Language, UpdateUser, User, UserExpand, Users};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::primitives::{CollectionId, IsoAutoDate, IsoDate, RecordId};
use crate::registry::CollectionName;

/// Fields the store assigns to every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemFields {
    pub id: RecordId,
    pub collection_id: CollectionId,
    pub collection_name: CollectionName,
    pub created: IsoAutoDate,
    pub updated: IsoDate,
}

/// Decode the `expand` side channel on a best-effort basis
///
/// Expanded relations carry no validation contract. Unset (`""`) fields are
/// removed the way response schemas remove them, and data that still does not
/// decode into `T` is dropped instead of failing the whole record.
pub(crate) fn lenient_expand<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(strip_unset(value)).ok()))
}

fn strip_unset(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !matches!(v, Value::String(s) if s.is_empty()))
                .map(|(k, v)| (k, strip_unset(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_unset).collect()),
        other => other,
    }
}
