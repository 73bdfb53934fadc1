//! Query description forwarded to the document store.
//!
//! A [`Query`] is plain data: building one performs no I/O and never
//! fails. Invalid combinations of filters are rejected by the store when
//! the query is executed or listened to.

use crate::types::CollectionRef;
use serde_json::Value;

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// `field == value`
    Equal,
    /// `field != value`
    NotEqual,
    /// `field > value`
    GreaterThan,
    /// `field >= value`
    GreaterThanOrEqual,
    /// `field < value`
    LessThan,
    /// `field <= value`
    LessThanOrEqual,
    /// Array field contains `value`.
    ArrayContains,
    /// Array field contains any element of the `value` array.
    ArrayContainsAny,
    /// Field equals one element of the `value` array.
    In,
    /// Field equals no element of the `value` array.
    NotIn,
}

impl FilterOp {
    /// Returns true for range and inequality operators.
    pub fn is_inequality(&self) -> bool {
        matches!(
            self,
            FilterOp::NotEqual
                | FilterOp::GreaterThan
                | FilterOp::GreaterThanOrEqual
                | FilterOp::LessThan
                | FilterOp::LessThanOrEqual
                | FilterOp::NotIn
        )
    }
}

/// A single field filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field path the filter applies to.
    pub field: String,
    /// Comparison operator.
    pub op: FilterOp,
    /// Comparison operand.
    pub value: Value,
}

/// Sort direction of an ordering clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Smallest values first.
    Ascending,
    /// Largest values first.
    Descending,
}

/// An ordering clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Field path to order by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// A query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: CollectionRef,
    filters: Vec<Filter>,
    order_by: Vec<OrderBy>,
    limit: Option<usize>,
}

impl Query {
    /// Creates a query matching every document in `collection`.
    pub fn new(collection: CollectionRef) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Returns the queried collection.
    pub fn collection(&self) -> &CollectionRef {
        &self.collection
    }

    /// Returns the filters, in the order they were added.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns the ordering clauses, in the order they were added.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Returns the result limit, if any.
    pub fn result_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Adds a filter on a field path given by name.
    ///
    /// The typed builders in [`Field`](crate::Field) forward here.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Adds an ordering clause.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl From<CollectionRef> for Query {
    fn from(collection: CollectionRef) -> Self {
        Query::new(collection)
    }
}
