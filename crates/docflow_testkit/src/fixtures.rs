//! Sample documents and seeded stores.

use docflow_core::{to_document_fields, CollectionRef, Document, Field, FieldMap};
use docflow_memory::MemoryStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A to-do item, the sample document type used across the test suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Document ID.
    pub id: String,
    /// Short description.
    pub title: String,
    /// Higher is more urgent.
    pub priority: i64,
    /// Completion flag.
    #[serde(default)]
    pub done: bool,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// The `title` field.
    pub const TITLE: Field<Task, String> = Field::new("title");
    /// The `priority` field.
    pub const PRIORITY: Field<Task, i64> = Field::new("priority");
    /// The `done` field.
    pub const DONE: Field<Task, bool> = Field::new("done");
    /// The `tags` field.
    pub const TAGS: Field<Task, Vec<String>> = Field::new("tags");

    /// Creates an open task without tags.
    pub fn new(id: &str, title: &str, priority: i64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            priority,
            done: false,
            tags: Vec::new(),
        }
    }

    /// Adds tags.
    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    /// Marks the task done.
    pub fn completed(mut self) -> Self {
        self.done = true;
        self
    }
}

impl Document for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The collection the sample tasks live in.
pub fn tasks_collection() -> CollectionRef {
    CollectionRef::new("tasks")
}

/// Four tasks with distinct priorities, tags and completion states.
pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task::new("groceries", "Buy groceries", 2).tagged(&["home"]),
        Task::new("report", "Write report", 5).tagged(&["work", "urgent"]),
        Task::new("taxes", "File taxes", 4).tagged(&["home", "urgent"]),
        Task::new("plants", "Water plants", 1).completed(),
    ]
}

/// A store holding [`sample_tasks`] in [`tasks_collection`].
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let tasks = tasks_collection();
    for task in sample_tasks() {
        store.seed(&tasks.doc(&task.id), to_document_fields(&task).expect("task encodes"));
    }
    store
}

/// Converts a JSON object literal into a [`FieldMap`].
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn fields(value: Value) -> FieldMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
