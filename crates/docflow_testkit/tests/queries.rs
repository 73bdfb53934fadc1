//! Typed query builders executed by the in-memory store.

use docflow_core::{DocumentExt, ErrorCode, Outcome, Query, StoreError};
use docflow_testkit::{seeded_store, tasks_collection, Task};

async fn ids(query: Query) -> Vec<String> {
    let store = seeded_store();
    let outcome: Outcome<Vec<Task>> = store.get_query_data(&query).await;
    outcome
        .into_value()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect()
}

fn tasks() -> Query {
    tasks_collection().query()
}

#[tokio::test]
async fn equality_filters() {
    assert_eq!(ids(tasks().where_equal_to(Task::DONE, true)).await, vec!["plants"]);
    assert_eq!(
        ids(tasks().where_equal_to(Task::TITLE, "File taxes".to_string())).await,
        vec!["taxes"]
    );
    assert_eq!(
        ids(tasks().where_not_equal_to(Task::DONE, true)).await,
        vec!["groceries", "report", "taxes"]
    );
}

#[tokio::test]
async fn range_filters_with_ordering() {
    assert_eq!(
        ids(tasks()
            .where_greater_than(Task::PRIORITY, 2)
            .order_by_asc(Task::PRIORITY))
        .await,
        vec!["taxes", "report"]
    );
    assert_eq!(
        ids(tasks()
            .where_greater_than_or_equal_to(Task::PRIORITY, 2)
            .where_less_than(Task::PRIORITY, 5)
            .order_by_desc(Task::PRIORITY))
        .await,
        vec!["taxes", "groceries"]
    );
    assert_eq!(
        ids(tasks().where_less_than_or_equal_to(Task::PRIORITY, 2)).await,
        vec!["groceries", "plants"]
    );
}

#[tokio::test]
async fn array_filters() {
    assert_eq!(
        ids(tasks().where_array_contains(Task::TAGS, "home".to_string())).await,
        vec!["groceries", "taxes"]
    );
    assert_eq!(
        ids(tasks().where_array_contains_any(
            Task::TAGS,
            vec!["work".to_string(), "home".to_string()]
        ))
        .await,
        vec!["groceries", "report", "taxes"]
    );
}

#[tokio::test]
async fn membership_filters() {
    assert_eq!(
        ids(tasks().where_in(Task::PRIORITY, [1, 5])).await,
        vec!["plants", "report"]
    );
    assert_eq!(
        ids(tasks().where_not_in(Task::PRIORITY, [1, 5])).await,
        vec!["groceries", "taxes"]
    );
}

#[tokio::test]
async fn ordering_and_limit() {
    assert_eq!(
        ids(tasks().order_by_desc(Task::PRIORITY).limit(2)).await,
        vec!["report", "taxes"]
    );
    assert_eq!(
        ids(tasks().order_by_asc(Task::TITLE)).await,
        vec!["groceries", "taxes", "plants", "report"]
    );
}

#[tokio::test]
async fn query_snapshot_outcome() {
    let store = seeded_store();
    let snapshot = store
        .get_query_snapshot(&tasks().where_equal_to(Task::DONE, false))
        .await;
    assert_eq!(snapshot.value().map(|s| s.len()), Some(3));
}

#[tokio::test]
async fn inequalities_on_two_fields_fail_at_execution() {
    let store = seeded_store();
    let query = tasks()
        .where_greater_than(Task::PRIORITY, 1)
        .where_not_in(Task::TITLE, ["x".to_string()]);

    let outcome: Outcome<Vec<Task>> = store.get_query_data(&query).await;

    assert_eq!(
        outcome.error().map(StoreError::code),
        Some(ErrorCode::InvalidArgument)
    );
}
