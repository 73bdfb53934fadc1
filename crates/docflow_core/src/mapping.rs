//! Conversion between typed documents and stored field maps.
//!
//! Typed values are mapped with serde. A [`Document`]'s identity lives in the
//! reference, not in the stored fields: [`to_document_fields`] drops the
//! top-level [`DOCUMENT_ID_FIELD`], and decoding always sets it to the
//! snapshot's ID. Plain values encoded with [`to_field_map`] keep every field.

use crate::error::{StoreError, StoreResult};
use crate::types::{DocumentSnapshot, FieldMap, QuerySnapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Name of the field that carries the document ID in typed values.
pub const DOCUMENT_ID_FIELD: &str = "id";

/// A typed document that knows its own ID.
///
/// Implementors are serialized with serde; the ID is stored as the last
/// segment of the document path rather than as a field.
pub trait Document: Serialize + DeserializeOwned {
    /// Returns the document ID.
    fn id(&self) -> &str;
}

/// Encodes a typed value into a field map.
///
/// Fails if the value does not serialize to a map.
pub fn to_field_map<T: Serialize + ?Sized>(value: &T) -> StoreResult<FieldMap> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::mapping(format!(
            "documents must serialize to a map, got {}",
            kind_of(&other)
        ))),
    }
}

/// Encodes a [`Document`] without its identity field.
pub fn to_document_fields<T: Document>(document: &T) -> StoreResult<FieldMap> {
    let mut map = to_field_map(document)?;
    map.remove(DOCUMENT_ID_FIELD);
    Ok(map)
}

/// Decodes a document snapshot into a typed value.
///
/// Returns `None` if the document does not exist. A stored
/// [`DOCUMENT_ID_FIELD`] is replaced by the snapshot's ID.
pub fn from_snapshot<T: DeserializeOwned>(snapshot: &DocumentSnapshot) -> StoreResult<Option<T>> {
    let Some(data) = &snapshot.data else {
        return Ok(None);
    };
    let mut map = data.clone();
    map.insert(
        DOCUMENT_ID_FIELD.to_string(),
        Value::String(snapshot.id().to_string()),
    );
    Ok(Some(serde_json::from_value(Value::Object(map))?))
}

/// Decodes every document of a query snapshot, in order.
pub fn from_query_snapshot<T: DeserializeOwned>(snapshot: &QuerySnapshot) -> StoreResult<Vec<T>> {
    let mut values = Vec::with_capacity(snapshot.documents.len());
    for doc in &snapshot.documents {
        if let Some(value) = from_snapshot(doc)? {
            values.push(value);
        }
    }
    Ok(values)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
