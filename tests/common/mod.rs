//! In-memory record store shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Value};
use valibase::error::StoreError;
use valibase::primitives::IsoDate;
use valibase::{RecordQuery, RecordStore};

/// Keys the store consumes instead of persisting
const WRITE_ONLY: [&str; 3] = ["password", "passwordConfirm", "oldPassword"];

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Vec<Value>>>,
    blanks: HashMap<String, Map<String, Value>>,
    sent: Mutex<Vec<(String, Value)>>,
    next_id: Mutex<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values the store fills in for fields a created record does not set
    pub fn with_blanks(mut self, collection: &str, blanks: Value) -> Self {
        if let Value::Object(map) = blanks {
            self.blanks.insert(collection.to_string(), map);
        }
        self
    }

    /// Insert a raw record bypassing every check
    pub fn seed(&self, collection: &str, record: Value) {
        self.records
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Payloads received by create and update, in order
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.records.lock().unwrap().get(collection).map(Vec::len).unwrap_or(0)
    }

    fn next_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("rec{:012}", *next)
    }
}

pub fn collection_id(collection: &str) -> String {
    let mut id = format!("pbc_{}", collection.trim_start_matches('_'));
    id.truncate(15);
    format!("{:0<15}", id)
}

pub fn now() -> String {
    IsoDate::from_datetime(Utc::now()).into_inner()
}

/// A stored record as the store would return it
pub fn stored(collection: &str, id: &str, fields: Value) -> Value {
    let mut record = Map::new();
    record.insert("id".into(), Value::from(id));
    record.insert("collectionId".into(), Value::from(collection_id(collection)));
    record.insert("collectionName".into(), Value::from(collection));
    record.insert("created".into(), Value::from("2024-05-01 10:00:00.000Z"));
    record.insert("updated".into(), Value::from("2024-05-01 10:00:00.000Z"));
    if let Value::Object(fields) = fields {
        record.extend(fields);
    }
    Value::Object(record)
}

impl RecordStore for MemoryStore {
    fn read(&self, collection: &str, query: &RecordQuery) -> Result<Vec<Value>, StoreError> {
        let records = self.records.lock().unwrap();
        let matching = records
            .get(collection)
            .into_iter()
            .flatten()
            .filter(|r| query.id.as_deref().map_or(true, |id| r["id"] == id))
            .take(query.per_page.map_or(usize::MAX, |n| n as usize))
            .cloned()
            .collect();
        Ok(matching)
    }

    fn create(&self, collection: &str, payload: Value) -> Result<Value, StoreError> {
        self.sent.lock().unwrap().push((collection.to_string(), payload.clone()));
        let Value::Object(mut fields) = payload else {
            return Err("payload must be an object".into());
        };
        for key in WRITE_ONLY {
            fields.remove(key);
        }
        if let Some(blanks) = self.blanks.get(collection) {
            for (key, blank) in blanks {
                fields.entry(key.clone()).or_insert_with(|| blank.clone());
            }
        }

        let mut record = stored(collection, &self.next_id(), Value::Object(fields));
        let ts = now();
        record["created"] = Value::from(ts.clone());
        record["updated"] = Value::from(ts);
        self.seed(collection, record.clone());
        Ok(record)
    }

    fn update(&self, collection: &str, id: &str, payload: Value) -> Result<Value, StoreError> {
        self.sent.lock().unwrap().push((collection.to_string(), payload.clone()));
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(collection)
            .and_then(|rs| rs.iter_mut().find(|r| r["id"] == id))
            .ok_or_else(|| format!("record {} not found in {}", id, collection))?;

        if let (Value::Object(target), Value::Object(patch)) = (&mut *record, payload) {
            for (key, value) in patch {
                if !WRITE_ONLY.contains(&key.as_str()) {
                    target.insert(key, value);
                }
            }
            target.insert("updated".into(), Value::from(now()));
        }
        Ok(record.clone())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let list = records.get_mut(collection).ok_or("unknown collection")?;
        let before = list.len();
        list.retain(|r| r["id"] != id);
        if list.len() == before {
            return Err(format!("record {} not found in {}", id, collection).into());
        }
        Ok(())
    }
}
