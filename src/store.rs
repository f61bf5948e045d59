//! Store boundary
//!
//! [`RecordStore`] is the raw JSON interface of a PocketBase-like backend.
//! [`Client`] wraps one and hands out typed [`Handle`]s: every outbound
//! payload goes through the collection's create/update schema before it
//! reaches the store, and every inbound record goes through the response
//! schema before it is decoded.

use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::combinators::SchemaVariant;
use crate::error::{Result, SchemaError, StoreError};
use crate::primitives::RecordId;
use crate::registry::{self, Collection, CreateOf, RecordOf, UpdateOf};
use crate::schema::Schema;

/// Read parameters forwarded to the store untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Comma separated relation fields to expand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

/// Raw JSON record store
///
/// Implementations only move data; validation happens on the [`Handle`]
/// side of this trait.
pub trait RecordStore {
    fn read(&self, collection: &str, query: &RecordQuery) -> std::result::Result<Vec<Value>, StoreError>;

    fn create(&self, collection: &str, payload: Value) -> std::result::Result<Value, StoreError>;

    fn update(&self, collection: &str, id: &str, payload: Value) -> std::result::Result<Value, StoreError>;

    fn delete(&self, collection: &str, id: &str) -> std::result::Result<(), StoreError>;
}

/// Typed access to a [`RecordStore`]
#[derive(Debug)]
pub struct Client<S> {
    store: S,
}

impl<S: RecordStore> Client<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Handle for the collection `C`
    pub fn collection<C: Collection>(&self) -> Handle<'_, S, C> {
        Handle {
            store: &self.store,
            _collection: PhantomData,
        }
    }

    /// Validate untyped data against a collection named at runtime
    pub fn validate(&self, name: &str, variant: SchemaVariant, input: &Value) -> Result<Option<Value>> {
        registry::validate(name, variant, input)
    }
}

/// Operations on one collection of a [`Client`]
pub struct Handle<'a, S, C> {
    store: &'a S,
    _collection: PhantomData<fn() -> C>,
}

impl<S: RecordStore, C: Collection> Handle<'_, S, C> {
    pub fn name(&self) -> &'static str {
        C::NAME.as_str()
    }

    /// Records matching `query`, in store order
    pub fn list(&self, query: &RecordQuery) -> Result<Vec<RecordOf<C>>> {
        let raw = self.store.read(self.name(), query).map_err(SchemaError::Store)?;
        debug!(collection = self.name(), count = raw.len(), "Read records");
        raw.iter().map(|record| self.decode(record)).collect()
    }

    /// First record matching `query`
    pub fn first(&self, query: &RecordQuery) -> Result<Option<RecordOf<C>>> {
        let query = query.clone().page(1).per_page(1);
        let raw = self.store.read(self.name(), &query).map_err(SchemaError::Store)?;
        raw.first().map(|record| self.decode(record)).transpose()
    }

    /// Record with the given id, if any
    pub fn get_one(&self, id: &RecordId, expand: Option<&str>) -> Result<Option<RecordOf<C>>> {
        let mut query = RecordQuery::by_id(id.as_str());
        if let Some(expand) = expand {
            query = query.expand(expand);
        }
        self.first(&query)
    }

    pub fn create(&self, input: &CreateOf<C>) -> Result<RecordOf<C>> {
        let payload = self.outbound(SchemaVariant::Create, input)?;
        let created = self.store.create(self.name(), payload).map_err(SchemaError::Store)?;
        debug!(collection = self.name(), "Created record");
        self.decode(&created)
    }

    pub fn update(&self, id: &RecordId, patch: &UpdateOf<C>) -> Result<RecordOf<C>> {
        let payload = self.outbound(SchemaVariant::Update, patch)?;
        let updated = self
            .store
            .update(self.name(), id.as_str(), payload)
            .map_err(SchemaError::Store)?;
        debug!(collection = self.name(), id = %id, "Updated record");
        self.decode(&updated)
    }

    pub fn delete(&self, id: &RecordId) -> Result<()> {
        self.store.delete(self.name(), id.as_str()).map_err(SchemaError::Store)?;
        debug!(collection = self.name(), id = %id, "Deleted record");
        Ok(())
    }

    /// Serialize and validate a payload; the normalized output is what gets sent
    fn outbound<T: Serialize>(&self, variant: SchemaVariant, input: &T) -> Result<Value> {
        let raw = serde_json::to_value(input)?;
        match C::schemas().parse(variant, &raw) {
            Ok(normalized) => Ok(normalized.unwrap_or(Value::Null)),
            Err(e) => {
                warn!(collection = self.name(), variant = %variant, issues = e.issues.len(), "Rejected payload");
                Err(e.into())
            }
        }
    }

    fn decode(&self, raw: &Value) -> Result<RecordOf<C>> {
        let record: RecordOf<C> = C::schemas().response.parse_as(raw).inspect_err(|e| {
            warn!(collection = self.name(), error = %e, "Record failed response validation");
        })?;
        let sent_expand = raw.get("expand").is_some_and(|expand| !expand.is_null());
        if sent_expand && declares_expand(&C::schemas().response) {
            let kept = serde_json::to_value(&record)?;
            if kept.get("expand").is_none() {
                warn!(collection = self.name(), "Dropped expand data that did not decode");
            }
        }
        Ok(record)
    }
}

/// Whether a response schema carries the `expand` side channel
fn declares_expand(response: &Schema) -> bool {
    response
        .as_object()
        .is_some_and(|object| object.side_channels().iter().any(|name| name == "expand"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{registry, CollectionName};

    #[test]
    fn test_declares_expand() {
        assert!(declares_expand(&registry(CollectionName::Users).response));
        assert!(!declares_expand(&registry(CollectionName::Todos).response));
        assert!(!declares_expand(&registry(CollectionName::Mfas).response));
    }
}
