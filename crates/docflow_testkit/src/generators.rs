//! Property-based test generators using proptest.

use crate::fixtures::Task;
use docflow_core::FieldMap;
use proptest::prelude::*;
use serde_json::Value;

/// Strategy for document IDs.
pub fn doc_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for scalar field values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

/// Strategy for field maps nested at most two levels deep.
pub fn field_map_strategy() -> impl Strategy<Value = FieldMap> {
    let key = "[a-z]{1,6}";
    let leaf = prop::collection::btree_map(key, scalar_strategy(), 0..4)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()));
    let value = prop_oneof![3 => scalar_strategy(), 1 => leaf];
    prop::collection::btree_map(key, value, 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Strategy for sample tasks.
pub fn task_strategy() -> impl Strategy<Value = Task> {
    (
        doc_id_strategy(),
        "[A-Za-z ]{1,20}",
        -10i64..10,
        any::<bool>(),
        prop::collection::vec("[a-z]{1,5}", 0..3),
    )
        .prop_map(|(id, title, priority, done, tags)| Task {
            id,
            title,
            priority,
            done,
            tags,
        })
}

/// Strategy for a count of injected failures and an attempt limit.
///
/// Yields `(failures, max_attempts)` with `max_attempts` in `1..=max`.
pub fn retry_scenario_strategy(max: u32) -> impl Strategy<Value = (u32, u32)> {
    (1..=max).prop_flat_map(|attempts| (0..=attempts + 1, Just(attempts)))
}
