//! Conversion between plain JSON and Firestore's typed value encoding.

use serde_json::{Map, Number, Value, json};

use recipe_core::ports::{
    Direction, DocumentData, DocumentSnapshot, FieldValue, Fields, Query, StoreError,
};

pub(crate) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_map(map) } }),
    }
}

fn encode_map(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

fn decode_error(reason: impl Into<String>) -> StoreError {
    StoreError::Decode(reason.into())
}

/// Decode one typed value. Timestamps, bytes and references come back as strings.
pub(crate) fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| decode_error("typed value is not an object"))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| decode_error("typed value is empty"))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| decode_error("booleanValue is not a bool")),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| decode_error(format!("bad integerValue: {inner}")))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            let number = parsed.ok_or_else(|| decode_error(format!("bad doubleValue: {inner}")))?;
            Ok(Number::from_f64(number).map_or(Value::Null, Value::Number))
        }
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| decode_error(format!("{kind} is not a string"))),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        "mapValue" => decode_fields(inner.get("fields")).map(Value::Object),
        other => Err(decode_error(format!("unknown value type {other}"))),
    }
}

fn decode_fields(fields: Option<&Value>) -> Result<DocumentData, StoreError> {
    let Some(fields) = fields else {
        return Ok(DocumentData::new());
    };
    let fields = fields
        .as_object()
        .ok_or_else(|| decode_error("fields is not an object"))?;

    fields
        .iter()
        .map(|(key, value)| Ok::<_, StoreError>((key.clone(), decode_value(value)?)))
        .collect()
}

/// Decode a REST document resource. The id is the last segment of its name.
pub(crate) fn decode_document(document: &Value) -> Result<DocumentSnapshot, StoreError> {
    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| decode_error("document has no name"))?;
    let id = name.rsplit('/').next().unwrap_or(name);

    Ok(DocumentSnapshot::new(id, decode_fields(document.get("fields"))?))
}

/// A single `Write` for the commit endpoint.
pub(crate) struct EncodedWrite {
    pub fields: Value,
    pub mask: Vec<String>,
    pub transforms: Vec<Value>,
}

pub(crate) fn encode_write(fields: Fields) -> EncodedWrite {
    let mut encoded = Map::new();
    let mut mask = Vec::new();
    let mut transforms = Vec::new();

    for (name, value) in fields {
        match value {
            FieldValue::Value(value) => {
                encoded.insert(name.clone(), encode_value(&value));
                mask.push(name);
            }
            FieldValue::ServerTimestamp => transforms.push(json!({
                "fieldPath": name,
                "setToServerValue": "REQUEST_TIME",
            })),
            FieldValue::ArrayUnion(values) => transforms.push(json!({
                "fieldPath": name,
                "appendMissingElements": { "values": values.iter().map(encode_value).collect::<Vec<_>>() },
            })),
            FieldValue::ArrayRemove(values) => transforms.push(json!({
                "fieldPath": name,
                "removeAllFromArray": { "values": values.iter().map(encode_value).collect::<Vec<_>>() },
            })),
        }
    }

    EncodedWrite {
        fields: Value::Object(encoded),
        mask,
        transforms,
    }
}

pub(crate) fn encode_query(query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": query.collection }]),
    );

    let mut filters: Vec<Value> = query
        .filters
        .iter()
        .map(|filter| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": "EQUAL",
                    "value": encode_value(&filter.value),
                }
            })
        })
        .collect();
    match filters.len() {
        0 => {}
        1 => {
            structured.insert("where".to_string(), filters.remove(0));
        }
        _ => {
            structured.insert(
                "where".to_string(),
                json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
            );
        }
    }

    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured.insert(
            "orderBy".to_string(),
            json!([{ "field": { "fieldPath": order.field }, "direction": direction }]),
        );
    }

    if let Some(limit) = query.limit {
        structured.insert("limit".to_string(), json!(limit));
    }

    json!({ "structuredQuery": structured })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_document() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/mealsList/abc123",
            "fields": {
                "title": { "stringValue": "Pancakes" },
                "servings": { "integerValue": "4" },
                "rating": { "doubleValue": 4.5 },
                "vegan": { "booleanValue": false },
                "notes": { "nullValue": null },
                "createdAt": { "timestampValue": "2026-03-01T10:00:00.123Z" },
                "tags": { "arrayValue": { "values": [{ "stringValue": "breakfast" }] } },
                "empty": { "arrayValue": {} },
                "meta": { "mapValue": { "fields": { "source": { "stringValue": "grandma" } } } }
            }
        });

        let doc = decode_document(&document).unwrap();

        assert_eq!(doc.id, "abc123");
        assert_eq!(
            Value::Object(doc.data),
            json!({
                "title": "Pancakes",
                "servings": 4,
                "rating": 4.5,
                "vegan": false,
                "notes": null,
                "createdAt": "2026-03-01T10:00:00.123Z",
                "tags": ["breakfast"],
                "empty": [],
                "meta": { "source": "grandma" }
            })
        );
    }

    #[test]
    fn test_document_without_fields() {
        let doc = decode_document(&json!({ "name": "a/b/users/u1" })).unwrap();
        assert_eq!(doc.id, "u1");
        assert!(doc.data.is_empty());
    }

    #[test]
    fn test_unknown_value_type() {
        assert!(matches!(
            decode_value(&json!({ "mysteryValue": 1 })),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn test_integers_encode_as_strings() {
        assert_eq!(encode_value(&json!(12)), json!({ "integerValue": "12" }));
        assert_eq!(encode_value(&json!(1.5)), json!({ "doubleValue": 1.5 }));
    }

    #[test]
    fn test_encode_write_splits_values_and_transforms() {
        let write = encode_write(
            Fields::new()
                .set("content", "hello")
                .server_timestamp("createdAt")
                .array_union("likes", vec![json!("u1")]),
        );

        assert_eq!(write.mask, vec!["content"]);
        assert_eq!(write.fields, json!({ "content": { "stringValue": "hello" } }));
        assert_eq!(write.transforms.len(), 2);
        assert_eq!(write.transforms[0]["setToServerValue"], "REQUEST_TIME");
        assert_eq!(
            write.transforms[1]["appendMissingElements"]["values"],
            json!([{ "stringValue": "u1" }])
        );
    }

    #[test]
    fn test_encode_query() {
        let query = Query::collection("communityPosts")
            .where_eq("userId", "u1")
            .order_by("createdAt", Direction::Descending)
            .limit(10);

        let encoded = encode_query(&query);
        let structured = &encoded["structuredQuery"];

        assert_eq!(structured["from"][0]["collectionId"], "communityPosts");
        assert_eq!(structured["where"]["fieldFilter"]["op"], "EQUAL");
        assert_eq!(structured["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(structured["limit"], 10);
    }

    #[test]
    fn test_multiple_filters_become_composite() {
        let query = Query::collection("save")
            .where_eq("userId", "u1")
            .where_eq("recipeId", "r1");

        let encoded = encode_query(&query);
        assert_eq!(
            encoded["structuredQuery"]["where"]["compositeFilter"]["filters"]
                .as_array()
                .map(Vec::len),
            Some(2)
        );
    }
}
