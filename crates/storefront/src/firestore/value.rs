//! Firestore typed values.
//!
//! The REST API wraps every field in a single-key object naming its type
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`). Documents are decoded
//! into plain JSON before they reach the normalizer, and plain JSON is encoded
//! back into typed values on writes.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};

/// A Firestore field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(NullValue),
    BooleanValue(bool),
    /// 64-bit integers travel as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullValue {
    #[serde(rename = "NULL_VALUE")]
    NullValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: Fields,
}

/// Named fields of a document or map value.
pub type Fields = BTreeMap<String, Value>;

impl Value {
    /// Decode into plain JSON.
    ///
    /// Integers that do not fit an `i64` and non-finite doubles become
    /// strings and `null` respectively, so decoding never fails.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::NullValue(_) => Json::Null,
            Self::BooleanValue(b) => Json::Bool(*b),
            Self::IntegerValue(s) => s
                .parse::<i64>()
                .map_or_else(|_| Json::String(s.clone()), Json::from),
            Self::DoubleValue(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Self::TimestampValue(s)
            | Self::StringValue(s)
            | Self::BytesValue(s)
            | Self::ReferenceValue(s) => Json::String(s.clone()),
            Self::GeoPointValue(point) => serde_json::json!({
                "latitude": point.latitude,
                "longitude": point.longitude,
            }),
            Self::ArrayValue(array) => Json::Array(array.values.iter().map(Self::to_json).collect()),
            Self::MapValue(map) => fields_to_json(&map.fields),
        }
    }

    /// Encode plain JSON. Whole numbers become integers, everything else
    /// keeps its JSON shape.
    #[must_use]
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Self::NullValue(NullValue::NullValue),
            Json::Bool(b) => Self::BooleanValue(*b),
            Json::Number(n) => n.as_i64().map_or_else(
                || Self::DoubleValue(n.as_f64().unwrap_or_default()),
                |i| Self::IntegerValue(i.to_string()),
            ),
            Json::String(s) => Self::StringValue(s.clone()),
            Json::Array(items) => Self::ArrayValue(ArrayValue {
                values: items.iter().map(Self::from_json).collect(),
            }),
            Json::Object(map) => Self::MapValue(MapValue {
                fields: json_to_fields(map),
            }),
        }
    }

    /// A `timestampValue` for `at`, in RFC 3339 UTC.
    #[must_use]
    pub fn timestamp(at: DateTime<Utc>) -> Self {
        Self::TimestampValue(at.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    /// The integer held by an `integerValue`, or by a `doubleValue` with no
    /// fractional part.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::IntegerValue(s) => s.parse().ok(),
            Self::DoubleValue(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 =>
            {
                Some(*n as i64)
            }
            _ => None,
        }
    }
}

/// Decode document fields into a JSON object.
#[must_use]
pub fn fields_to_json(fields: &Fields) -> Json {
    Json::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

/// Encode a JSON object into document fields.
#[must_use]
pub fn json_to_fields(map: &Map<String, Json>) -> Fields {
    map.iter()
        .map(|(key, value)| (key.clone(), Value::from_json(value)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_product_document_fields() {
        let fields: Fields = serde_json::from_value(json!({
            "name": { "stringValue": "Red Shoes" },
            "price": { "doubleValue": 49.9 },
            "id": { "integerValue": "7" },
            "discountPercent": { "nullValue": "NULL_VALUE" },
            "createdAt": { "timestampValue": "2024-03-01T10:00:00Z" },
            "images": { "arrayValue": { "values": [
                { "mapValue": { "fields": {
                    "url": { "stringValue": "https://cdn.example/a.png" },
                    "priority": { "integerValue": "1" }
                } } }
            ] } },
            "meta": { "mapValue": { "fields": {
                "url": { "stringValue": "red-shoes" }
            } } }
        }))
        .unwrap();

        assert_eq!(
            fields_to_json(&fields),
            json!({
                "name": "Red Shoes",
                "price": 49.9,
                "id": 7,
                "discountPercent": null,
                "createdAt": "2024-03-01T10:00:00Z",
                "images": [{ "url": "https://cdn.example/a.png", "priority": 1 }],
                "meta": { "url": "red-shoes" }
            })
        );
    }

    #[test]
    fn test_empty_array_and_map_values() {
        let fields: Fields = serde_json::from_value(json!({
            "images": { "arrayValue": {} },
            "meta": { "mapValue": {} }
        }))
        .unwrap();
        assert_eq!(fields_to_json(&fields), json!({ "images": [], "meta": {} }));
    }

    #[test]
    fn test_encode_uses_wire_names() {
        let encoded = Value::from_json(&json!({ "value": 3, "ratio": 0.5, "tags": ["a"] }));
        assert_eq!(
            serde_json::to_value(&encoded).unwrap(),
            json!({ "mapValue": { "fields": {
                "ratio": { "doubleValue": 0.5 },
                "tags": { "arrayValue": { "values": [{ "stringValue": "a" }] } },
                "value": { "integerValue": "3" }
            } } })
        );
        assert_eq!(
            serde_json::to_value(Value::from_json(&Json::Null)).unwrap(),
            json!({ "nullValue": "NULL_VALUE" })
        );
    }

    #[test]
    fn test_oversized_integer_stays_textual() {
        let value = Value::IntegerValue("99999999999999999999".to_owned());
        assert_eq!(value.to_json(), json!("99999999999999999999"));
        assert_eq!(value.as_i64(), None);
        assert_eq!(Value::IntegerValue("12".to_owned()).as_i64(), Some(12));
    }

    #[test]
    fn test_whole_doubles_read_as_integers() {
        assert_eq!(Value::DoubleValue(12.0).as_i64(), Some(12));
        assert_eq!(Value::DoubleValue(12.5).as_i64(), None);
        assert_eq!(Value::DoubleValue(f64::NAN).as_i64(), None);
        assert_eq!(Value::StringValue("12".to_owned()).as_i64(), None);
    }

    #[test]
    fn test_timestamp_value_is_rfc3339_utc() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(
            serde_json::to_value(Value::timestamp(at)).unwrap(),
            json!({ "timestampValue": "2024-03-01T10:00:00.000000Z" })
        );
    }
}
