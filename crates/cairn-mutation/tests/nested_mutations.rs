//! End-to-end mutation tests against the in-memory store

use async_trait::async_trait;
use cairn_core::MutationConfig;
use cairn_mutation::{
    ItemData, ItemPath, ItemWriter, MutationError, MutationExecutor, UpdateItem, WriteError,
};
use cairn_schema::{list, relationship, text, virtual_field, OutputType, ResolveError, Schema, VirtualFieldConfig};
use cairn_testing::{MemoryStore, MutationAssertions};
use cairn_validation::rules::{DISCONNECT_CONFLICT_MESSAGE, TO_ONE_CREATE_MESSAGE};
use cairn_validation::ItemRef;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn schema() -> Arc<Schema> {
    let summary = VirtualFieldConfig::new(OutputType::scalar("String"), |item, _| match item["title"].as_str() {
        Some(title) => Ok(json!(format!("Event: {}", title))),
        None => Err(ResolveError::new("Events without a title have no summary")),
    });

    let schema = Schema::builder()
        .list(
            list("Group")
                .field("name", text())
                .field("events", relationship("Event.group").many(true))
                .field("owner", relationship("Person"))
                .field("tags", relationship("Tag").many(true)),
        )
        .list(
            list("Event")
                .field("title", text())
                .field("group", relationship("Group.events"))
                .field("tags", relationship("Tag").many(true))
                .field("summary", virtual_field(summary)),
        )
        .list(list("Tag").field("label", text()))
        .list(list("Person").field("name", text()))
        .build()
        .unwrap();
    Arc::new(schema)
}

fn executor(config: MutationConfig) -> (MutationExecutor<MemoryStore>, Arc<MemoryStore>) {
    let schema = schema();
    let store = Arc::new(MemoryStore::new(schema.clone()));
    (MutationExecutor::new(schema, store.clone(), config), store)
}

#[tokio::test]
async fn test_create_with_empty_to_one_input_returns_null_and_one_error() {
    let (executor, store) = executor(MutationConfig::default());

    let response = executor.create_one("Event", json!({ "group": {} })).await.unwrap();

    MutationAssertions::assert_null_result(&response).unwrap();
    MutationAssertions::assert_single_relationship_error(
        &response,
        &ItemPath::single("createEvent"),
        "Event.group",
        TO_ONE_CREATE_MESSAGE,
    )
    .unwrap();
    assert_eq!(response.to_json()["data"], json!({ "createEvent": null }));
    assert_eq!(store.count("Event").await, 0);
}

#[tokio::test]
async fn test_create_with_connect_and_create_returns_null_and_one_error() {
    let (executor, store) = executor(MutationConfig::default());
    let data = json!({
        "title": "Meetup",
        "group": { "connect": { "id": "cabc123" }, "create": { "name": "foo" } }
    });

    let response = executor.create_one("Event", data).await.unwrap();

    MutationAssertions::assert_null_result(&response).unwrap();
    let error = MutationAssertions::assert_single_relationship_error(
        &response,
        &ItemPath::single("createEvent"),
        "Event.group",
        TO_ONE_CREATE_MESSAGE,
    )
    .unwrap();
    assert_eq!(error.code, "to_one_conflicting_directives");
    assert_eq!(store.count("Group").await, 0);
}

#[tokio::test]
async fn test_batch_nulls_only_the_invalid_item() {
    let (executor, store) = executor(MutationConfig::default());
    let items = vec![
        json!({ "title": "First", "group": { "create": { "name": "Rustaceans" } } }),
        json!({ "title": "Second", "group": {} }),
        json!({ "title": "Third" }),
    ];

    let response = executor.create_many("Event", items).await.unwrap();

    MutationAssertions::assert_batch_slots(&response, 3, &[1]).unwrap();
    MutationAssertions::assert_single_relationship_error(
        &response,
        &ItemPath::batch("createEvents", 1),
        "Event.group",
        TO_ONE_CREATE_MESSAGE,
    )
    .unwrap();

    let slots = response.result().as_array().unwrap();
    assert_eq!(slots[0]["title"], "First");
    assert_eq!(slots[2]["title"], "Third");
    assert_eq!(store.count("Event").await, 2);
    assert_eq!(store.count("Group").await, 1);
}

#[tokio::test]
async fn test_nested_create_payload_gets_item_checks() {
    let (executor, store) = executor(MutationConfig::default());
    let data = json!({
        "title": "Meetup",
        "group": { "create": { "name": "g", "bogus": 1, "owner": {}, "tags": { "set": [] } } }
    });

    let response = executor.create_one("Event", data).await.unwrap();

    MutationAssertions::assert_null_result(&response).unwrap();
    MutationAssertions::assert_error_codes(&response, &["to_one_missing_directive", "set_on_create", "unknown_field"])
        .unwrap();
    let paths: Vec<&str> = response.errors.iter().map(|error| error.path.as_str()).collect();
    assert_eq!(
        paths,
        ["createEvent.Group.owner", "createEvent.Group.tags", "createEvent.Group.bogus"]
    );
    assert_eq!(response.errors[0].message, format!("Input error: {}", TO_ONE_CREATE_MESSAGE));
    assert_eq!(store.count("Group").await, 0);
    assert_eq!(store.count("Event").await, 0);
}

#[tokio::test]
async fn test_nested_creates_are_checked_at_every_depth() {
    let (executor, store) = executor(MutationConfig::default());
    let data = json!({
        "name": "Outer",
        "events": { "create": [
            { "title": "ok" },
            { "title": "bad", "tags": { "create": [{ "label": "x", "summary": "nope" }] } }
        ] }
    });

    let response = executor.create_one("Group", data).await.unwrap();

    MutationAssertions::assert_null_result(&response).unwrap();
    MutationAssertions::assert_error_codes(&response, &["unknown_field"]).unwrap();
    assert_eq!(response.errors[0].path, "createGroup.Tag.summary");

    let response = executor
        .create_one("Group", json!({ "name": "Fine", "events": { "create": [{ "title": "ok" }] } }))
        .await
        .unwrap();
    MutationAssertions::assert_no_errors(&response).unwrap();
    assert_eq!(store.count("Event").await, 1);
}

#[tokio::test]
async fn test_created_items_are_decorated_with_virtual_fields() {
    let (executor, _store) = executor(MutationConfig::default());

    let response = executor
        .create_one("Event", json!({ "title": "Launch", "tags": { "create": [{ "label": "rust" }] } }))
        .await
        .unwrap();

    MutationAssertions::assert_no_errors(&response).unwrap();
    let event = response.result();
    assert_eq!(event["summary"], "Event: Launch");
    assert_eq!(event["tags"].as_array().map(Vec::len), Some(1));
    assert!(event["id"].is_string());
}

#[tokio::test]
async fn test_failing_resolver_keeps_the_item() {
    let (executor, store) = executor(MutationConfig::default());

    let response = executor.create_one("Event", json!({})).await.unwrap();

    assert!(response.result().is_object());
    assert!(response.result()["summary"].is_null());
    MutationAssertions::assert_error_codes(&response, &["resolve_failed"]).unwrap();
    assert_eq!(response.errors[0].path, "createEvent.Event.summary");
    assert_eq!(store.count("Event").await, 1);
}

#[tokio::test]
async fn test_field_level_input_errors() {
    let (executor, _store) = executor(MutationConfig::default());

    let response = executor
        .create_one(
            "Event",
            json!({ "summary": "nope", "color": "red", "tags": { "connect": { "id": "t1" } } }),
        )
        .await
        .unwrap();

    MutationAssertions::assert_null_result(&response).unwrap();
    MutationAssertions::assert_error_codes(
        &response,
        &["invalid_relationship_input", "virtual_field_not_writable", "unknown_field"],
    )
    .unwrap();
    let paths: Vec<&str> = response.errors.iter().map(|error| error.path.as_str()).collect();
    assert_eq!(
        paths,
        ["createEvent.Event.tags", "createEvent.Event.summary", "createEvent.Event.color"]
    );
    assert!(response.errors.iter().all(|error| error.message.starts_with("Input error: ")));
}

#[tokio::test]
async fn test_non_object_item_data() {
    let (executor, _store) = executor(MutationConfig::default());

    let response = executor.create_many("Event", vec![json!("oops"), json!({ "title": "ok" })]).await.unwrap();

    MutationAssertions::assert_batch_slots(&response, 2, &[0]).unwrap();
    MutationAssertions::assert_error_codes(&response, &["invalid_item_data"]).unwrap();
    assert_eq!(response.errors[0].path, "createEvents.0");
}

#[tokio::test]
async fn test_write_failure_nulls_the_slot() {
    let (executor, _store) = executor(MutationConfig::default());

    let response = executor
        .create_one("Event", json!({ "title": "Lost", "group": { "connect": { "id": "missing" } } }))
        .await
        .unwrap();

    MutationAssertions::assert_null_result(&response).unwrap();
    MutationAssertions::assert_error_codes(&response, &["write_failed"]).unwrap();
    assert_eq!(response.errors[0].path, "createEvent");
}

#[tokio::test]
async fn test_update_rules_and_disconnect() {
    let (executor, store) = executor(MutationConfig::default());
    let group = store.seed("Group", json!({ "name": "Rustaceans" }).as_object().cloned().unwrap()).await;

    let created = executor
        .create_one("Event", json!({ "title": "Meetup", "group": { "connect": { "id": group } } }))
        .await
        .unwrap();
    let id = created.result()["id"].clone();
    assert_eq!(created.result()["group"], json!(group));

    let response = executor
        .update_one("Event", json!({ "id": id }), json!({ "group": { "disconnect": true } }))
        .await
        .unwrap();
    MutationAssertions::assert_no_errors(&response).unwrap();
    assert!(response.result()["group"].is_null());
    assert_eq!(response.operation, "updateEvent");

    let response = executor
        .update_one(
            "Event",
            json!({ "id": id }),
            json!({ "group": { "connect": { "id": group }, "disconnect": true } }),
        )
        .await
        .unwrap();
    MutationAssertions::assert_null_result(&response).unwrap();
    MutationAssertions::assert_single_relationship_error(
        &response,
        &ItemPath::single("updateEvent"),
        "Event.group",
        DISCONNECT_CONFLICT_MESSAGE,
    )
    .unwrap();

    let stored = store.get("Event", id.as_str().unwrap()).await.unwrap();
    assert!(stored["group"].is_null());
}

#[tokio::test]
async fn test_update_many_reports_per_item() {
    let (executor, _store) = executor(MutationConfig::default());
    let created = executor
        .create_many("Event", vec![json!({ "title": "A" }), json!({ "title": "B" })])
        .await
        .unwrap();
    let ids: Vec<Value> = created.result().as_array().unwrap().iter().map(|item| item["id"].clone()).collect();

    let response = executor
        .update_many(
            "Event",
            vec![
                UpdateItem::new(json!({ "id": ids[0] }), json!({ "tags": { "set": [], "create": [] } })),
                UpdateItem::new(json!({ "id": ids[1] }), json!({ "tags": { "set": [], "connect": [{ "id": "x" }] } })),
                UpdateItem::new(json!({ "id": "unknown" }), json!({ "title": "C" })),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.operation, "updateEvents");
    MutationAssertions::assert_batch_slots(&response, 3, &[1, 2]).unwrap();
    MutationAssertions::assert_error_codes(&response, &["set_with_incremental", "write_failed"]).unwrap();
    assert_eq!(response.errors[0].path, "updateEvents.1.Event.tags");
    assert_eq!(response.errors[1].path, "updateEvents.2");
}

#[tokio::test]
async fn test_unknown_list_and_batch_limit_abort_the_mutation() {
    let (executor, _store) = executor(MutationConfig::default().with_max_batch_size(2));

    let err = executor.create_one("Nope", json!({})).await.unwrap_err();
    assert!(matches!(err, MutationError::UnknownList { ref list } if list == "Nope"));

    let err = executor
        .create_many("Event", vec![json!({}), json!({}), json!({})])
        .await
        .unwrap_err();
    assert!(matches!(err, MutationError::BatchTooLarge { size: 3, max: 2 }));
}

/// Finishes later items first to shake out ordering bugs
struct ReverseDelayWriter;

#[async_trait]
impl ItemWriter for ReverseDelayWriter {
    async fn create_item(&self, _list: &str, data: ItemData) -> Result<Value, WriteError> {
        let delay = data.fields["delay"].as_u64().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(Value::Object(data.fields))
    }

    async fn update_item(&self, _list: &str, _target: &ItemRef, _data: ItemData) -> Result<Value, WriteError> {
        Err(WriteError::rejected("read-only"))
    }
}

#[tokio::test]
async fn test_concurrent_batches_keep_submission_order() {
    let schema = Arc::new(
        Schema::builder()
            .list(list("Job").field("delay", text()).field("after", relationship("Job")))
            .build()
            .unwrap(),
    );
    let executor = MutationExecutor::new(
        schema,
        Arc::new(ReverseDelayWriter),
        MutationConfig::default().with_concurrency(4),
    );

    let items = vec![
        json!({ "delay": 40 }),
        json!({ "delay": 30, "after": {} }),
        json!({ "delay": 20 }),
        json!({ "delay": 10, "after": { "connect": { "id": "a" }, "create": {} } }),
    ];
    let response = executor.create_many("Job", items).await.unwrap();

    let slots = response.result().as_array().unwrap();
    assert_eq!(slots[0]["delay"], 40);
    assert_eq!(slots[2]["delay"], 20);
    MutationAssertions::assert_batch_slots(&response, 4, &[1, 3]).unwrap();
    let paths: Vec<&str> = response.errors.iter().map(|error| error.path.as_str()).collect();
    assert_eq!(paths, ["createJobs.1.Job.after", "createJobs.3.Job.after"]);
}
