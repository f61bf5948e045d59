//! Typed round trips through a record store for the `todos` collection

mod common;

use common::{stored, MemoryStore};
use serde_json::json;
use valibase::collections::{CreateTodo, TodoState, UpdateTodo};
use valibase::primitives::{IsoDate, RecordId, Url};
use valibase::{Client, RecordQuery, SchemaError, SchemaVariant, Todos};

fn client() -> Client<MemoryStore> {
    Client::new(MemoryStore::new().with_blanks("todos", json!({"link": "", "state": "", "completed": ""})))
}

fn buy_milk() -> CreateTodo {
    CreateTodo {
        link: Some(Url::parse("https://mytodos.com/list").unwrap()),
        state: Some(TodoState::Due),
        ..CreateTodo::new("Buy milk", "Get 2% milk")
    }
}

#[test]
fn test_create_then_read_back() {
    let client = client();
    let todos = client.collection::<Todos>();

    let created = todos.create(&buy_milk()).unwrap();
    assert_eq!(created.name, "Buy milk");
    assert_eq!(created.state, Some(TodoState::Due));
    assert_eq!(created.completed, None);
    assert_eq!(created.system.collection_name.as_str(), "todos");

    let fetched = todos.get_one(&created.system.id, None).unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(todos.list(&RecordQuery::new()).unwrap().len(), 1);
}

#[test]
fn test_rejected_payload_never_reaches_store() {
    let client = client();
    let todo = CreateTodo {
        link: Some(Url::parse("https://other.com").unwrap()),
        ..buy_milk()
    };

    let err = client.collection::<Todos>().create(&todo).unwrap_err();
    match &err {
        SchemaError::Validation(e) => {
            assert_eq!(e.message_at("link"), Some("The URL must be one of: mytodos.com"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(client.store().sent().is_empty());
}

#[test]
fn test_short_fields_report_every_issue() {
    let client = client();
    let err = client
        .collection::<Todos>()
        .create(&CreateTodo::new("ab", "xy"))
        .unwrap_err();
    let paths: Vec<_> = err.issues().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["name", "description"]);
}

#[test]
fn test_update_sends_only_patch() {
    let client = client();
    let todos = client.collection::<Todos>();
    let created = todos.create(&buy_milk()).unwrap();

    let done = IsoDate::parse("2024-06-01 08:00:00.000Z").unwrap();
    let patch = UpdateTodo {
        state: Some(TodoState::Completed),
        completed: Some(done.clone()),
        ..Default::default()
    };
    let updated = todos.update(&created.system.id, &patch).unwrap();
    assert_eq!(updated.state, Some(TodoState::Completed));
    assert_eq!(updated.completed, Some(done));
    assert_eq!(updated.name, "Buy milk");

    let (_, sent) = client.store().sent().pop().unwrap();
    assert_eq!(sent, json!({"state": "Completed", "completed": "2024-06-01 08:00:00.000Z"}));
}

#[test]
fn test_delete_removes_record() {
    let client = client();
    let todos = client.collection::<Todos>();
    let created = todos.create(&buy_milk()).unwrap();

    todos.delete(&created.system.id).unwrap();
    assert!(todos.first(&RecordQuery::new()).unwrap().is_none());

    let missing = RecordId::parse("rec999999999999").unwrap();
    assert!(matches!(todos.delete(&missing), Err(SchemaError::Store(_))));
}

#[test]
fn test_malformed_stored_record_is_rejected() {
    let client = client();
    client.store().seed(
        "todos",
        stored(
            "todos",
            "rec000000000042",
            json!({"name": "Buy milk", "description": "Get 2% milk", "link": "not a url", "completed": ""}),
        ),
    );

    let err = client.collection::<Todos>().list(&RecordQuery::new()).unwrap_err();
    assert_eq!(err.issues()[0].path.to_string(), "link");
}

#[test]
fn test_untyped_boundary() {
    let client = client();
    let out = client
        .validate("todos", SchemaVariant::Update, &json!({"state": "Due", "extra": 1}))
        .unwrap();
    assert_eq!(out, Some(json!({"state": "Due"})));

    match client.validate("todo", SchemaVariant::Create, &json!({})) {
        Err(SchemaError::UnknownCollection { suggestion, .. }) => assert_eq!(suggestion.as_deref(), Some("todos")),
        other => panic!("expected UnknownCollection, got {:?}", other),
    }
}
