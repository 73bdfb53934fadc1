//! Batch helpers and single-document operations against the in-memory store.

use docflow_core::{BatchExt, DocumentExt, ErrorCode, Outcome, StoreError};
use docflow_memory::MemoryStore;
use docflow_testkit::{fields, field_map_strategy, sample_tasks, seeded_store, tasks_collection, Task};
use proptest::prelude::*;
use serde_json::{json, Value};

#[tokio::test]
async fn batch_set_without_merge_replaces_documents() {
    let store = MemoryStore::new();
    let doc = tasks_collection().doc("t1");
    store.seed(&doc, fields(json!({"a": 1, "b": 2})));

    let outcome = store.batch_set(vec![(doc.clone(), json!({"a": 10}))], false).await;

    assert_eq!(outcome, Outcome::Success(()));
    assert_eq!(store.document(&doc), Some(fields(json!({"a": 10}))));
}

#[tokio::test]
async fn batch_set_with_merge_keeps_absent_fields() {
    let store = MemoryStore::new();
    let doc = tasks_collection().doc("t1");
    store.seed(&doc, fields(json!({"a": 1, "b": 2})));

    let outcome = store.batch_set(vec![(doc.clone(), json!({"a": 10}))], true).await;

    assert!(outcome.is_success());
    assert_eq!(store.document(&doc), Some(fields(json!({"a": 10, "b": 2}))));
}

#[tokio::test]
async fn batch_set_documents_writes_each_under_its_id() {
    let store = MemoryStore::new();
    let tasks = tasks_collection();

    let outcome = store.batch_set_documents(&tasks, &sample_tasks(), false).await;

    assert!(outcome.is_success());
    assert_eq!(store.len(), 4);
    let read: Outcome<Task> = store.get_data(&tasks.doc("taxes")).await;
    assert_eq!(read, Outcome::Success(sample_tasks()[2].clone()));
}

#[tokio::test]
async fn batch_set_keeps_id_field_of_plain_maps() {
    let store = MemoryStore::new();
    let doc = tasks_collection().doc("row1");

    let outcome = store.batch_set(vec![(doc.clone(), json!({"id": 42, "x": 1}))], false).await;

    assert!(outcome.is_success());
    assert_eq!(store.document(&doc), Some(fields(json!({"id": 42, "x": 1}))));
}

#[tokio::test]
async fn typed_reads_take_id_from_the_reference() {
    let store = MemoryStore::new();
    let doc = tasks_collection().doc("row1");
    store.seed(&doc, fields(json!({"id": "other", "title": "Stale", "priority": 1})));

    let read: Outcome<Task> = store.get_data(&doc).await;

    assert_eq!(read.value().map(|task| task.id.as_str()), Some("row1"));
}

#[tokio::test]
async fn batch_set_documents_does_not_store_the_id() {
    let store = MemoryStore::new();
    let tasks = tasks_collection();

    let outcome = store.batch_set_documents(&tasks, &sample_tasks(), true).await;

    assert!(outcome.is_success());
    assert!(store.document(&tasks.doc("report")).unwrap().get("id").is_none());
}

#[tokio::test]
async fn batch_delete_of_missing_document_succeeds() {
    let store = seeded_store();
    let tasks = tasks_collection();

    let outcome = store
        .batch_delete(vec![tasks.doc("report"), tasks.doc("never-existed")])
        .await;

    assert_eq!(outcome, Outcome::Success(()));
    assert!(store.document(&tasks.doc("report")).is_none());
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn batch_update_with_missing_target_changes_nothing() {
    let store = seeded_store();
    let tasks = tasks_collection();
    let before = store.document(&tasks.doc("report"));

    let outcome = store
        .batch_update(vec![
            (tasks.doc("report"), fields(json!({"done": true}))),
            (tasks.doc("missing"), fields(json!({"done": true}))),
        ])
        .await;

    assert_eq!(outcome.error().map(StoreError::code), Some(ErrorCode::NotFound));
    assert_eq!(store.document(&tasks.doc("report")), before);
    assert!(store.document(&tasks.doc("missing")).is_none());
}

#[tokio::test]
async fn batch_update_applies_dotted_paths() {
    let store = seeded_store();
    let doc = tasks_collection().doc("groceries");

    let outcome = store
        .batch_update(vec![(doc.clone(), fields(json!({"meta.owner": "ana", "done": true})))])
        .await;

    assert!(outcome.is_success());
    let stored = store.document(&doc).unwrap();
    assert_eq!(stored.get("meta"), Some(&json!({"owner": "ana"})));
    assert_eq!(stored.get("done"), Some(&json!(true)));
}

#[tokio::test]
async fn rejected_commit_reports_client_code() {
    let store = seeded_store();
    store.fail_next_commits(1, ErrorCode::PermissionDenied);

    let outcome = store
        .batch(|batch| {
            batch.delete(tasks_collection().doc("report"));
        })
        .await;

    assert_eq!(
        outcome.error().map(StoreError::code),
        Some(ErrorCode::PermissionDenied)
    );
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn update_data_success_and_missing_document() {
    let store = seeded_store();
    let tasks = tasks_collection();

    let updated = store
        .update_data(&tasks.doc("plants"), fields(json!({"priority": 9})))
        .await;
    let missing = store
        .update_data(&tasks.doc("nope"), fields(json!({"priority": 9})))
        .await;

    assert_eq!(updated, Outcome::Success(()));
    assert_eq!(
        store.document(&tasks.doc("plants")).unwrap().get("priority"),
        Some(&json!(9))
    );
    assert_eq!(missing.error().map(StoreError::code), Some(ErrorCode::NotFound));
}

#[tokio::test]
async fn get_data_of_missing_document_is_not_found() {
    let store = seeded_store();
    let doc = tasks_collection().doc("nope");

    let outcome: Outcome<Task> = store.get_data(&doc).await;

    assert_eq!(
        outcome,
        Outcome::Error(StoreError::DocumentNotFound {
            path: "tasks/nope".into()
        })
    );
}

#[tokio::test]
async fn combinators_run_exactly_one_branch() {
    let store = seeded_store();
    let mut seen = Vec::new();

    let outcome: Outcome<Task> = store.get_data(&tasks_collection().doc("report")).await;
    outcome
        .on_loading(|| seen.push("loading"))
        .on_success(|task| seen.push(if task.priority == 5 { "success" } else { "wrong" }))
        .on_error(|_| seen.push("error"));

    assert_eq!(seen, vec!["success"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn merge_overlays_only_given_top_level_scalars(
        existing in field_map_strategy(),
        incoming in field_map_strategy(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let store = MemoryStore::new();
        let doc = tasks_collection().doc("p");
        store.seed(&doc, existing.clone());

        let outcome = runtime.block_on(store.batch_set(vec![(doc.clone(), Value::Object(incoming.clone()))], true));
        prop_assert!(outcome.is_success());

        let stored = store.document(&doc).unwrap();
        for (key, value) in &existing {
            if !incoming.contains_key(key) {
                prop_assert_eq!(stored.get(key), Some(value));
            }
        }
        for (key, value) in &incoming {
            if !value.is_object() {
                prop_assert_eq!(stored.get(key), Some(value));
            }
        }
    }

    #[test]
    fn overwrite_stores_exactly_the_given_fields(
        existing in field_map_strategy(),
        incoming in field_map_strategy(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let store = MemoryStore::new();
        let doc = tasks_collection().doc("p");
        store.seed(&doc, existing);

        let outcome = runtime.block_on(store.batch_set(vec![(doc.clone(), Value::Object(incoming.clone()))], false));
        prop_assert!(outcome.is_success());
        prop_assert_eq!(store.document(&doc), Some(incoming));
    }
}
