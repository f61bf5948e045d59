//! Collection Registry
//!
//! The closed set of collections and the total mapping from each one to its
//! response/create/update schemas. Typed code names a collection through a
//! [`Collection`] marker type, so an unknown collection is a compile error;
//! only the string boundary ([`CollectionName::from_str`], [`resolve`]) can
//! fail at runtime.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collections::{auth_origins, external_auths, mfas, otps, superusers, todos, users};
use crate::combinators::{CollectionSchemas, SchemaVariant};
use crate::error::{Result, SchemaError};

/// Every collection known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectionName {
    #[serde(rename = "_mfas")]
    Mfas,
    #[serde(rename = "_otps")]
    Otps,
    #[serde(rename = "_externalAuths")]
    ExternalAuths,
    #[serde(rename = "_authOrigins")]
    AuthOrigins,
    #[serde(rename = "_superusers")]
    Superusers,
    #[serde(rename = "users")]
    Users,
    #[serde(rename = "todos")]
    Todos,
}

impl CollectionName {
    pub const ALL: [CollectionName; 7] = [
        CollectionName::Mfas,
        CollectionName::Otps,
        CollectionName::ExternalAuths,
        CollectionName::AuthOrigins,
        CollectionName::Superusers,
        CollectionName::Users,
        CollectionName::Todos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Mfas => "_mfas",
            CollectionName::Otps => "_otps",
            CollectionName::ExternalAuths => "_externalAuths",
            CollectionName::AuthOrigins => "_authOrigins",
            CollectionName::Superusers => "_superusers",
            CollectionName::Users => "users",
            CollectionName::Todos => "todos",
        }
    }

    /// System collections are managed by the store itself
    pub fn is_system(&self) -> bool {
        self.as_str().starts_with('_')
    }

    pub fn schemas(&self) -> &'static CollectionSchemas {
        registry(*self)
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        CollectionName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownCollection {
                name: s.to_string(),
                suggestion: suggest(s, CollectionName::ALL.iter().map(|n| n.as_str())),
            })
    }
}

/// Closest candidate to `input`, used for "did you mean" hints
pub fn suggest<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let matcher = SkimMatcherV2::default();
    candidates
        .into_iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, input)
                .or_else(|| matcher.fuzzy_match(input, candidate))
                .map(|score| (score, candidate))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate.to_string())
}

static MFAS: LazyLock<CollectionSchemas> = LazyLock::new(mfas::schemas);
static OTPS: LazyLock<CollectionSchemas> = LazyLock::new(otps::schemas);
static EXTERNAL_AUTHS: LazyLock<CollectionSchemas> = LazyLock::new(external_auths::schemas);
static AUTH_ORIGINS: LazyLock<CollectionSchemas> = LazyLock::new(auth_origins::schemas);
static SUPERUSERS: LazyLock<CollectionSchemas> = LazyLock::new(superusers::schemas);
static USERS: LazyLock<CollectionSchemas> = LazyLock::new(users::schemas);
static TODOS: LazyLock<CollectionSchemas> = LazyLock::new(todos::schemas);

/// Schemas of `name`; total over [`CollectionName`]
pub fn registry(name: CollectionName) -> &'static CollectionSchemas {
    match name {
        CollectionName::Mfas => &MFAS,
        CollectionName::Otps => &OTPS,
        CollectionName::ExternalAuths => &EXTERNAL_AUTHS,
        CollectionName::AuthOrigins => &AUTH_ORIGINS,
        CollectionName::Superusers => &SUPERUSERS,
        CollectionName::Users => &USERS,
        CollectionName::Todos => &TODOS,
    }
}

/// Resolve a collection given by string
pub fn resolve(name: &str) -> Result<&'static CollectionSchemas> {
    name.parse::<CollectionName>().map(registry)
}

/// Validate untyped data against a collection given by string
pub fn validate(name: &str, variant: SchemaVariant, input: &Value) -> Result<Option<Value>> {
    Ok(resolve(name)?.parse(variant, input)?)
}

/// A collection known at compile time
///
/// The associated types are the decoded record and the payloads accepted by
/// create and update; they are tied to the registry entry for [`Self::NAME`].
pub trait Collection: 'static {
    const NAME: CollectionName;

    type Record: DeserializeOwned + Serialize + fmt::Debug + Clone;
    type Create: DeserializeOwned + Serialize;
    type Update: DeserializeOwned + Serialize + Default;

    fn schemas() -> &'static CollectionSchemas {
        registry(Self::NAME)
    }
}

pub type RecordOf<C> = <C as Collection>::Record;
pub type CreateOf<C> = <C as Collection>::Create;
pub type UpdateOf<C> = <C as Collection>::Update;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::CollectionKind;

    #[test]
    fn test_registry_is_total() {
        for name in CollectionName::ALL {
            let schemas = registry(name);
            assert_eq!(schemas.name, name.as_str());
            for variant in SchemaVariant::ALL {
                let object = schemas.get(variant).as_object().map(|o| !o.is_empty());
                // auth create/update are intersections, not plain objects
                assert!(object.unwrap_or(true));
            }
        }
    }

    #[test]
    fn test_round_trip_names() {
        for name in CollectionName::ALL {
            assert_eq!(name.as_str().parse::<CollectionName>().unwrap(), name);
        }
    }

    #[test]
    fn test_unknown_name_rejected_with_suggestion() {
        match "todo".parse::<CollectionName>() {
            Err(SchemaError::UnknownCollection { name, suggestion }) => {
                assert_eq!(name, "todo");
                assert_eq!(suggestion.as_deref(), Some("todos"));
            }
            other => panic!("expected UnknownCollection, got {:?}", other),
        }
        assert!(resolve("posts").is_err());
    }

    #[test]
    fn test_auth_kinds() {
        assert_eq!(registry(CollectionName::Users).kind, CollectionKind::Auth);
        assert_eq!(registry(CollectionName::Superusers).kind, CollectionKind::Auth);
        assert_eq!(registry(CollectionName::Todos).kind, CollectionKind::Base);
        assert!(CollectionName::Mfas.is_system());
        assert!(!CollectionName::Todos.is_system());
    }
}
