//! Query evaluation over the document table.

use crate::state::StoredDocument;
use crate::value::{compare_values, get_path, same_type, values_equal};
use docflow_core::{
    Direction, DocumentRef, DocumentSnapshot, FieldMap, Filter, FilterOp, Query, StoreError,
    StoreResult,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

static NULL: Value = Value::Null;

/// Runs `query` against `docs`.
///
/// Results are ordered by the query's ordering clauses, then by document
/// path. Documents missing an ordered field are excluded.
pub(crate) fn execute(
    query: &Query,
    docs: &BTreeMap<String, StoredDocument>,
) -> StoreResult<Vec<DocumentSnapshot>> {
    validate(query)?;

    let prefix = format!("{}/", query.collection().path());
    let mut matched: Vec<(&String, &FieldMap)> = docs
        .range(prefix.clone()..)
        .take_while(|(path, _)| path.starts_with(&prefix))
        .filter(|(path, _)| !path[prefix.len()..].contains('/'))
        .map(|(path, doc)| (path, &doc.data))
        .filter(|(_, data)| query.filters().iter().all(|filter| matches(filter, data)))
        .filter(|(_, data)| {
            query
                .orderings()
                .iter()
                .all(|order| get_path(data, &order.field).is_some())
        })
        .collect();

    matched.sort_by(|(path_a, a), (path_b, b)| {
        query
            .orderings()
            .iter()
            .map(|order| {
                let ord = compare_values(
                    get_path(a, &order.field).unwrap_or(&NULL),
                    get_path(b, &order.field).unwrap_or(&NULL),
                );
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| path_a.cmp(path_b))
    });

    if let Some(limit) = query.result_limit() {
        matched.truncate(limit);
    }

    Ok(matched
        .into_iter()
        .map(|(path, data)| DocumentSnapshot::existing(DocumentRef::new(path.as_str()), data.clone()))
        .collect())
}

fn validate(query: &Query) -> StoreResult<()> {
    let inequality_fields: BTreeSet<&str> = query
        .filters()
        .iter()
        .filter(|filter| filter.op.is_inequality())
        .map(|filter| filter.field.as_str())
        .collect();
    if inequality_fields.len() > 1 {
        let fields: Vec<_> = inequality_fields.into_iter().collect();
        return Err(StoreError::invalid_argument(format!(
            "inequality filters on more than one field: {}",
            fields.join(", ")
        )));
    }

    for filter in query.filters() {
        let needs_array = matches!(
            filter.op,
            FilterOp::In | FilterOp::NotIn | FilterOp::ArrayContainsAny
        );
        if needs_array && !filter.value.is_array() {
            return Err(StoreError::invalid_argument(format!(
                "filter on {} requires an array operand",
                filter.field
            )));
        }
    }
    Ok(())
}

fn matches(filter: &Filter, data: &FieldMap) -> bool {
    let Some(field) = get_path(data, &filter.field) else {
        return false;
    };
    let operand = &filter.value;
    let ordered = |accept: fn(Ordering) -> bool| {
        same_type(field, operand) && accept(compare_values(field, operand))
    };

    match filter.op {
        FilterOp::Equal => values_equal(field, operand),
        FilterOp::NotEqual => !field.is_null() && !values_equal(field, operand),
        FilterOp::GreaterThan => ordered(Ordering::is_gt),
        FilterOp::GreaterThanOrEqual => ordered(Ordering::is_ge),
        FilterOp::LessThan => ordered(Ordering::is_lt),
        FilterOp::LessThanOrEqual => ordered(Ordering::is_le),
        FilterOp::ArrayContains => field
            .as_array()
            .is_some_and(|items| items.iter().any(|item| values_equal(item, operand))),
        FilterOp::ArrayContainsAny => match (field.as_array(), operand.as_array()) {
            (Some(items), Some(wanted)) => items
                .iter()
                .any(|item| wanted.iter().any(|w| values_equal(item, w))),
            _ => false,
        },
        FilterOp::In => operand
            .as_array()
            .is_some_and(|wanted| wanted.iter().any(|w| values_equal(field, w))),
        FilterOp::NotIn => {
            !field.is_null()
                && operand
                    .as_array()
                    .is_some_and(|wanted| !wanted.iter().any(|w| values_equal(field, w)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::{CollectionRef, ErrorCode};
    use serde_json::json;

    fn table(entries: &[(&str, Value)]) -> BTreeMap<String, StoredDocument> {
        entries
            .iter()
            .map(|(path, data)| {
                (
                    path.to_string(),
                    StoredDocument {
                        data: data.as_object().cloned().unwrap(),
                        version: 1,
                    },
                )
            })
            .collect()
    }

    fn ids(result: StoreResult<Vec<DocumentSnapshot>>) -> Vec<String> {
        result
            .unwrap()
            .iter()
            .map(|snapshot| snapshot.id().to_string())
            .collect()
    }

    fn tasks() -> BTreeMap<String, StoredDocument> {
        table(&[
            ("tasks/a", json!({"priority": 3, "tags": ["home"], "done": false})),
            ("tasks/b", json!({"priority": 1, "tags": ["work", "urgent"], "done": true})),
            ("tasks/c", json!({"priority": 2, "tags": [], "done": false})),
            ("tasks/d", json!({"priority": "high", "done": false})),
            ("tasks/a/notes/n1", json!({"priority": 9})),
            ("other/x", json!({"priority": 1})),
        ])
    }

    fn query() -> Query {
        CollectionRef::new("tasks").query()
    }

    #[test]
    fn scans_only_direct_children_in_path_order() {
        assert_eq!(ids(execute(&query(), &tasks())), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn range_filters_match_same_type_only() {
        let q = query().filter("priority", FilterOp::GreaterThanOrEqual, 2);
        assert_eq!(ids(execute(&q, &tasks())), vec!["a", "c"]);
    }

    #[test]
    fn ordering_with_mixed_types_and_limit() {
        let q = query().order_by("priority", Direction::Descending).limit(3);
        // "high" is a string, which orders after every number.
        assert_eq!(ids(execute(&q, &tasks())), vec!["d", "a", "c"]);
    }

    #[test]
    fn ordering_excludes_documents_without_the_field() {
        let q = query().order_by("tags", Direction::Ascending);
        assert_eq!(ids(execute(&q, &tasks())), vec!["c", "a", "b"]);
    }

    #[test]
    fn array_and_membership_filters() {
        let data = tasks();
        let contains = query().filter("tags", FilterOp::ArrayContains, "urgent");
        let any = query().filter("tags", FilterOp::ArrayContainsAny, json!(["home", "work"]));
        let within = query().filter("priority", FilterOp::In, json!([1, 3]));
        let not_in = query().filter("priority", FilterOp::NotIn, json!([1, 3]));

        assert_eq!(ids(execute(&contains, &data)), vec!["b"]);
        assert_eq!(ids(execute(&any, &data)), vec!["a", "b"]);
        assert_eq!(ids(execute(&within, &data)), vec!["a", "b"]);
        assert_eq!(ids(execute(&not_in, &data)), vec!["c", "d"]);
    }

    #[test]
    fn equality_and_not_equal() {
        let data = tasks();
        let done = query().filter("done", FilterOp::Equal, true);
        let open = query().filter("done", FilterOp::NotEqual, true);
        assert_eq!(ids(execute(&done, &data)), vec!["b"]);
        assert_eq!(ids(execute(&open, &data)), vec!["a", "c", "d"]);
    }

    #[test]
    fn inequalities_on_two_fields_are_rejected() {
        let q = query()
            .filter("priority", FilterOp::GreaterThan, 1)
            .filter("done", FilterOp::NotEqual, true);
        let err = execute(&q, &tasks()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn two_inequalities_on_one_field_are_allowed() {
        let q = query()
            .filter("priority", FilterOp::GreaterThan, 1)
            .filter("priority", FilterOp::LessThan, 3);
        assert_eq!(ids(execute(&q, &tasks())), vec!["c"]);
    }

    #[test]
    fn membership_filters_need_array_operands() {
        let q = query().filter("priority", FilterOp::In, 1);
        assert!(execute(&q, &tasks()).is_err());
    }
}
