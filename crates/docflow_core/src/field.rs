//! Typed field tokens and the query builders that consume them.
//!
//! Rust has no property references, so each document type declares its
//! queryable fields as constants:
//!
//! ```rust
//! use docflow_core::{CollectionRef, Field};
//!
//! struct Task {
//!     priority: i64,
//!     tags: Vec<String>,
//! }
//!
//! impl Task {
//!     const PRIORITY: Field<Task, i64> = Field::new("priority");
//!     const TAGS: Field<Task, Vec<String>> = Field::new("tags");
//! }
//!
//! let query = CollectionRef::new("tasks")
//!     .query()
//!     .where_greater_than(Task::PRIORITY, 3)
//!     .where_array_contains(Task::TAGS, "urgent".to_string())
//!     .order_by_desc(Task::PRIORITY);
//! assert_eq!(query.filters().len(), 2);
//! ```

use crate::query::{Direction, FilterOp, Query};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A named field of document type `T` holding values of type `V`.
pub struct Field<T, V> {
    name: &'static str,
    _marker: PhantomData<fn(&T) -> V>,
}

impl<T, V> Field<T, V> {
    /// Creates a field token with the given wire name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the wire name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Field<T, V> {}

impl<T, V> fmt::Debug for Field<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

fn to_array<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Value {
    Value::Array(values.into_iter().map(Into::into).collect())
}

/// Query builders keyed by typed [`Field`] tokens.
impl Query {
    /// Adds `field == value`.
    pub fn where_equal_to<T, V: Into<Value>>(self, field: Field<T, V>, value: V) -> Self {
        self.filter(field.name(), FilterOp::Equal, value)
    }

    /// Adds `field != value`.
    pub fn where_not_equal_to<T, V: Into<Value>>(self, field: Field<T, V>, value: V) -> Self {
        self.filter(field.name(), FilterOp::NotEqual, value)
    }

    /// Adds `field > value`.
    pub fn where_greater_than<T, V>(self, field: Field<T, V>, value: V) -> Self
    where
        V: Into<Value> + PartialOrd,
    {
        self.filter(field.name(), FilterOp::GreaterThan, value)
    }

    /// Adds `field >= value`.
    pub fn where_greater_than_or_equal_to<T, V>(self, field: Field<T, V>, value: V) -> Self
    where
        V: Into<Value> + PartialOrd,
    {
        self.filter(field.name(), FilterOp::GreaterThanOrEqual, value)
    }

    /// Adds `field < value`.
    pub fn where_less_than<T, V>(self, field: Field<T, V>, value: V) -> Self
    where
        V: Into<Value> + PartialOrd,
    {
        self.filter(field.name(), FilterOp::LessThan, value)
    }

    /// Adds `field <= value`.
    pub fn where_less_than_or_equal_to<T, V>(self, field: Field<T, V>, value: V) -> Self
    where
        V: Into<Value> + PartialOrd,
    {
        self.filter(field.name(), FilterOp::LessThanOrEqual, value)
    }

    /// Adds "array field contains `value`".
    pub fn where_array_contains<T, E: Into<Value>>(self, field: Field<T, Vec<E>>, value: E) -> Self {
        self.filter(field.name(), FilterOp::ArrayContains, value)
    }

    /// Adds "array field contains any of `values`".
    pub fn where_array_contains_any<T, E: Into<Value>>(
        self,
        field: Field<T, Vec<E>>,
        values: Vec<E>,
    ) -> Self {
        self.filter(field.name(), FilterOp::ArrayContainsAny, to_array(values))
    }

    /// Adds "field is one of `values`".
    pub fn where_in<T, V, I>(self, field: Field<T, V>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.filter(field.name(), FilterOp::In, to_array(values))
    }

    /// Adds "field is none of `values`".
    pub fn where_not_in<T, V, I>(self, field: Field<T, V>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.filter(field.name(), FilterOp::NotIn, to_array(values))
    }

    /// Orders by `field`, smallest first.
    pub fn order_by_asc<T, V>(self, field: Field<T, V>) -> Self {
        self.order_by(field.name(), Direction::Ascending)
    }

    /// Orders by `field`, largest first.
    pub fn order_by_desc<T, V>(self, field: Field<T, V>) -> Self {
        self.order_by(field.name(), Direction::Descending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CollectionRef;
    use serde_json::json;

    struct Article;

    const TITLE: Field<Article, String> = Field::new("title");
    const VIEWS: Field<Article, i64> = Field::new("views");
    const LABELS: Field<Article, Vec<String>> = Field::new("labels");

    fn articles() -> Query {
        CollectionRef::new("articles").query()
    }

    #[test]
    fn typed_filters_use_wire_names() {
        let query = articles()
            .where_equal_to(TITLE, "Intro".to_string())
            .where_greater_than_or_equal_to(VIEWS, 100)
            .where_less_than(VIEWS, 1000);

        let filters = query.filters();
        assert_eq!(filters[0].field, "title");
        assert_eq!(filters[0].value, json!("Intro"));
        assert_eq!(filters[1].op, FilterOp::GreaterThanOrEqual);
        assert_eq!(filters[2].op, FilterOp::LessThan);
        assert_eq!(filters[2].value, json!(1000));
    }

    #[test]
    fn membership_filters_collect_arrays() {
        let query = articles()
            .where_in(VIEWS, [1, 2, 3])
            .where_not_in(TITLE, vec!["draft".to_string()])
            .where_array_contains_any(LABELS, vec!["rust".to_string(), "db".to_string()]);

        assert_eq!(query.filters()[0].value, json!([1, 2, 3]));
        assert_eq!(query.filters()[1].op, FilterOp::NotIn);
        assert_eq!(query.filters()[2].value, json!(["rust", "db"]));
    }

    #[test]
    fn ordering_builders() {
        let query = articles().order_by_asc(TITLE).order_by_desc(VIEWS);
        assert_eq!(query.orderings()[0].field, "title");
        assert_eq!(query.orderings()[0].direction, Direction::Ascending);
        assert_eq!(query.orderings()[1].direction, Direction::Descending);
    }

    #[test]
    fn field_token_is_copy() {
        let copy = VIEWS;
        assert_eq!(copy.name(), VIEWS.name());
        assert_eq!(format!("{:?}", TITLE), "Field(\"title\")");
    }
}
