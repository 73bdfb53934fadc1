//! Demo command implementations.

use docflow_core::{
    BatchExt, CollectionRef, DocumentExt, ErrorCode, MetadataChanges, Outcome, SnapshotExt,
    TransactionRetryExt,
};
use docflow_memory::MemoryStore;
use docflow_testkit::{fields, sample_tasks, tasks_collection, Task};
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

async fn seed(store: &MemoryStore) {
    store
        .batch_set_documents(&tasks_collection(), &sample_tasks(), false)
        .await
        .on_success(|_| info!(count = sample_tasks().len(), "sample tasks written"))
        .on_error(|e| error!(error = %e, "seeding failed"));
}

/// Seeds the sample tasks and prints them by descending priority.
pub async fn list(store: &MemoryStore, urgent: bool, limit: Option<usize>) -> CommandResult {
    seed(store).await;

    let mut query = tasks_collection().query().order_by_desc(Task::PRIORITY);
    if urgent {
        query = query.where_array_contains(Task::TAGS, "urgent".to_string());
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    store
        .get_query_data::<Task>(&query)
        .await
        .on_success(|found| {
            for task in found {
                let mark = if task.done { "x" } else { " " };
                println!("[{mark}] {:>2}  {}  {:?}", task.priority, task.title, task.tags);
            }
        })
        .on_error(|e| println!("query failed: {e}"));
    Ok(())
}

/// Increments a counter transactionally while the store rejects attempts.
pub async fn retry(store: &MemoryStore, attempts: u32, failures: usize) -> CommandResult {
    let counter = CollectionRef::new("counters").doc("runs");
    store.seed(&counter, fields(json!({"value": 0})));
    store.fail_next_transactions(failures, ErrorCode::Aborted);

    let started = Instant::now();
    let outcome = store
        .run_transaction_with_retry(attempts, |txn| {
            let current = txn
                .get(&counter)?
                .get("value")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            txn.update(&counter, fields(json!({"value": current + 1})))?;
            Ok(current + 1)
        })
        .await;

    let tried = store.transaction_attempts();
    let elapsed = started.elapsed();
    outcome
        .on_success(|value| println!("counter = {value} after {tried} attempt(s) in {elapsed:?}"))
        .on_error(|e| println!("gave up after {tried} attempt(s) in {elapsed:?}: {e}"));
    Ok(())
}

/// Streams the report task while a background editor changes it.
pub async fn watch(store: &MemoryStore) -> CommandResult {
    seed(store).await;
    let doc = tasks_collection().doc("report");
    let mut updates = store.document_objects_with_state::<Task>(&doc, MetadataChanges::Exclude);

    let editor = {
        let store = store.clone();
        let doc = doc.clone();
        tokio::spawn(async move {
            for priority in [6, 7] {
                tokio::time::sleep(Duration::from_millis(100)).await;
                store
                    .update_data(&doc, fields(json!({"priority": priority})))
                    .await
                    .on_error(|e| error!(error = %e, "edit failed"));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            store.fail_listeners(ErrorCode::PermissionDenied);
        })
    };

    while let Some(outcome) = updates.next().await {
        outcome
            .on_loading(|| println!("loading..."))
            .on_success(|task| match task {
                Some(task) => println!("{} (priority {})", task.title, task.priority),
                None => println!("{doc} does not exist"),
            })
            .on_error(|e| println!("stream ended: {e}"));
    }

    editor.await?;
    Ok(())
}

/// Shows that a batch with one missing target writes nothing.
pub async fn atomic(store: &MemoryStore) -> CommandResult {
    seed(store).await;
    let tasks = tasks_collection();

    store
        .batch_update(vec![
            (tasks.doc("report"), fields(json!({"done": true}))),
            (tasks.doc("missing"), fields(json!({"done": true}))),
        ])
        .await
        .on_success(|_| println!("batch committed"))
        .on_error(|e| println!("batch rejected: {e}"));

    let report: Outcome<Task> = store.get_data(&tasks.doc("report")).await;
    report
        .on_success(|task| println!("report done = {}", task.done))
        .on_error(|e| println!("read failed: {e}"));
    Ok(())
}
