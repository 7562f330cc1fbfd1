//! Query evaluation and write application for stores that keep documents locally.

use std::cmp::Ordering;

use serde_json::Value;

use recipe_core::ports::{Direction, DocumentData, DocumentSnapshot, FieldValue, Fields, Query};

/// Cross-type ordering: null < bool < number < string < array < object.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| compare_values(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x
            .iter()
            .zip(y.iter())
            .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| compare_values(va, vb)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn matches_filters(query: &Query, data: &DocumentData) -> bool {
    query.filters.iter().all(|filter| {
        data.get(&filter.field)
            .is_some_and(|value| compare_values(value, &filter.value).is_eq())
    })
}

/// Run a query over one collection's documents, given in document-id order.
pub(crate) fn evaluate<'a>(
    query: &Query,
    documents: impl Iterator<Item = (&'a String, &'a DocumentData)>,
) -> Vec<DocumentSnapshot> {
    let mut matched: Vec<DocumentSnapshot> = documents
        .filter(|(_, data)| matches_filters(query, data))
        .map(|(id, data)| DocumentSnapshot::new(id.clone(), data.clone()))
        .collect();

    if let Some(order) = &query.order_by {
        matched.retain(|doc| doc.data.contains_key(&order.field));
        matched.sort_by(|a, b| {
            let ordering = compare_values(&a.data[&order.field], &b.data[&order.field]);
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = query.limit {
        matched.truncate(limit);
    }

    matched
}

/// Apply field writes to a document. `now` is the value for server timestamps.
pub(crate) fn apply_fields(target: &mut DocumentData, fields: Fields, now: &str) {
    for (name, value) in fields {
        match value {
            FieldValue::Value(value) => {
                target.insert(name, value);
            }
            FieldValue::ServerTimestamp => {
                target.insert(name, Value::String(now.to_string()));
            }
            FieldValue::ArrayUnion(values) => {
                let mut items = take_array(target, &name);
                for value in values {
                    if !items.contains(&value) {
                        items.push(value);
                    }
                }
                target.insert(name, Value::Array(items));
            }
            FieldValue::ArrayRemove(values) => {
                let mut items = take_array(target, &name);
                items.retain(|item| !values.contains(item));
                target.insert(name, Value::Array(items));
            }
        }
    }
}

/// Current array value of a field; anything that is not an array counts as empty.
fn take_array(target: &mut DocumentData, name: &str) -> Vec<Value> {
    match target.remove(name) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
