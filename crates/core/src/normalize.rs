//! Normalization of loose remote product records.
//!
//! Records come back from the document store with fields that may be missing,
//! null, or of the wrong type (prices typed into a form arrive as strings,
//! older documents lack `meta`, and so on). [`RawProduct`] captures such a
//! record without interpreting it, and [`normalize_product`] turns it into a
//! fully-defaulted [`Product`].
//!
//! Normalization is total: it never fails and never panics. Anything it cannot
//! interpret becomes the field's zero value, or `None` for optional fields.
//! It is also idempotent, so normalizing the JSON form of a normalized product
//! yields the same product.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::product::DEFAULT_WEIGHT_UNIT;
use crate::types::{
    MetaData, PLACEHOLDER_IMAGE_URL, Price, Product, ProductCategory, ProductId, ProductImage,
    Specification, Weight,
};

/// A product record exactly as stored remotely, one untyped value per field.
///
/// Deserializing any JSON object into a `RawProduct` succeeds; absent keys
/// become `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawProduct {
    pub name: Value,
    pub price: Value,
    pub previous_price: Value,
    pub discount_percent: Value,
    pub weight: Value,
    pub category: Value,
    pub images: Value,
    pub specifications: Value,
    pub meta: Value,
    pub introduction_html: Value,
    pub description_html: Value,
    pub created_at: Value,
}

impl From<Value> for RawProduct {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// Normalize a raw record into a [`Product`], stamping "now" when the record
/// has no usable creation time.
#[must_use]
pub fn normalize_product(raw: RawProduct, id: impl Into<ProductId>) -> Product {
    normalize_product_at(raw, id, Utc::now())
}

/// Normalize a raw record into a [`Product`] using `now` as the fallback
/// creation time.
#[must_use]
pub fn normalize_product_at(
    raw: RawProduct,
    id: impl Into<ProductId>,
    now: DateTime<Utc>,
) -> Product {
    Product {
        id: id.into(),
        name: text(&raw.name),
        price: decimal(&raw.price).map_or(Price::ZERO, Price::new),
        previous_price: decimal(&raw.previous_price)
            .filter(|amount| !amount.is_sign_negative())
            .map(Price::new),
        discount_percent: number(&raw.discount_percent).filter(|percent| *percent >= 0.0),
        weight: weight(&raw.weight),
        category: raw
            .category
            .as_str()
            .and_then(|s| ProductCategory::from_str(s).ok()),
        images: images(&raw.images),
        specifications: specifications(&raw.specifications),
        meta: meta(&raw.meta),
        introduction_html: text(&raw.introduction_html),
        description_html: text(&raw.description_html),
        created_at: timestamp(&raw.created_at).unwrap_or(now),
    }
}

// =============================================================================
// Field coercions
// =============================================================================

/// A string field; numbers and booleans are rendered, anything else is `""`.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// A non-blank string, or `None`.
fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// A number or numeric string as an exact decimal.
fn decimal(value: &Value) -> Option<Decimal> {
    let repr = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return None,
    };
    if repr.is_empty() {
        return None;
    }
    Decimal::from_str(&repr)
        .or_else(|_| Decimal::from_scientific(&repr))
        .ok()
}

/// A number or numeric string as a finite float.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// A number or numeric string as an integer, truncating fractions.
#[allow(clippy::cast_possible_truncation)] // priorities are small sort keys
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => number(value).map(|f| f as i64),
    }
}

fn weight(value: &Value) -> Option<Weight> {
    let fields = value.as_object()?;
    Some(Weight {
        value: field(fields, "value")
            .and_then(number)
            .filter(|v| *v >= 0.0)
            .unwrap_or(0.0),
        unit: field(fields, "unit")
            .and_then(non_blank)
            .unwrap_or_else(|| DEFAULT_WEIGHT_UNIT.to_owned()),
    })
}

fn images(value: &Value) -> Vec<ProductImage> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| {
            let fields = item.as_object();
            ProductImage {
                url: fields
                    .and_then(|f| field(f, "url"))
                    .and_then(non_blank)
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_owned()),
                priority: fields
                    .and_then(|f| field(f, "priority"))
                    .and_then(integer)
                    .unwrap_or(0),
            }
        })
        .collect()
}

fn specifications(value: &Value) -> Vec<Specification> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|fields| Specification {
            key: field(fields, "key").map(text).unwrap_or_default(),
            value: field(fields, "value").map(text).unwrap_or_default(),
        })
        .collect()
}

fn meta(value: &Value) -> MetaData {
    let Some(fields) = value.as_object() else {
        return MetaData::default();
    };
    let keywords = match field(fields, "keywords") {
        Some(Value::Array(words)) => words
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => text(other),
        None => String::new(),
    };
    MetaData {
        title: field(fields, "title").map(text).unwrap_or_default(),
        description: field(fields, "description").map(text).unwrap_or_default(),
        keywords,
        url: field(fields, "url").and_then(non_blank),
    }
}

/// An RFC 3339 string, or a `{seconds, nanoseconds}` timestamp object as
/// produced by document-store client libraries.
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Object(fields) => {
            let seconds = field(fields, "seconds")
                .or_else(|| field(fields, "_seconds"))
                .and_then(integer)?;
            let nanos = field(fields, "nanoseconds")
                .or_else(|| field(fields, "_nanoseconds"))
                .and_then(integer)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

/// A present, non-null field.
fn field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}
