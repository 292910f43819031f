//! Lenient field deserializers for backend JSON.
//!
//! The backend serializes SQL aggregates inconsistently: a sum can arrive as
//! a JSON number, as a decimal string, or as `null` when a group is empty.
//! These helpers coerce all three to numbers the way the dashboard always
//! has (`null` becomes zero), and keep object key order where the server's
//! order carries meaning.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde_json::Value;

fn coerce<E: de::Error>(value: &Value) -> Result<Option<f64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a number, got \"{s}\""))),
        other => Err(E::custom(format!("expected a number, got {other}"))),
    }
}

/// Number, numeric string or null (→ 0.0).
pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(coerce::<D::Error>(&value)?.unwrap_or(0.0))
}

/// Number, numeric string or null (→ `None`).
pub fn optional_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    coerce::<D::Error>(&value)
}

/// Non-negative integer count. Fractional values are rounded.
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let n = number(d)?;
    Ok(to_count(n))
}

/// String or null (→ empty string).
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn to_count(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 {
        n.round() as u64
    } else {
        0
    }
}

/// JSON object (or null) → `Vec<(key, count)>` in document order.
pub fn ordered_counts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, u64)>, D::Error> {
    let entries = ordered_numbers(d)?;
    Ok(entries.into_iter().map(|(k, v)| (k, to_count(v))).collect())
}

/// JSON object (or null) → `Vec<(key, number)>` in document order.
pub fn ordered_numbers<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Vec<(String, f64)>, D::Error> {
    d.deserialize_option(MaybeEntries)
}

struct MaybeEntries;

impl<'de> Visitor<'de> for MaybeEntries {
    type Value = Vec<(String, f64)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of numbers or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_map(OrderedEntries)
    }
}

struct OrderedEntries;

impl<'de> Visitor<'de> for OrderedEntries {
    type Value = Vec<(String, f64)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            let n = coerce::<A::Error>(&value)?.unwrap_or(0.0);
            entries.push((key, n));
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "number")]
        price: f64,
        #[serde(default, deserialize_with = "count")]
        sales: u64,
        #[serde(default, deserialize_with = "optional_number")]
        rating: Option<f64>,
        #[serde(default, deserialize_with = "text")]
        cpu: String,
    }

    #[test]
    fn numbers_accept_strings_and_null() {
        let row: Row =
            serde_json::from_str(r#"{"price": "4999.50", "sales": null, "rating": "4.5", "cpu": null}"#)
                .unwrap();
        assert_eq!(row.price, 4999.5);
        assert_eq!(row.sales, 0);
        assert_eq!(row.rating, Some(4.5));
        assert_eq!(row.cpu, "");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let row: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(row.price, 0.0);
        assert_eq!(row.rating, None);
    }

    #[test]
    fn counts_round_and_floor_at_zero() {
        let row: Row = serde_json::from_str(r#"{"sales": 12.6}"#).unwrap();
        assert_eq!(row.sales, 13);
        let row: Row = serde_json::from_str(r#"{"sales": -4}"#).unwrap();
        assert_eq!(row.sales, 0);
    }

    #[test]
    fn garbage_strings_are_rejected() {
        let err = serde_json::from_str::<Row>(r#"{"price": "cheap"}"#).unwrap_err();
        assert!(err.to_string().contains("expected a number"));
    }

    #[test]
    fn ordered_counts_keep_document_order() {
        #[derive(Deserialize)]
        struct Brands {
            #[serde(deserialize_with = "ordered_counts")]
            top: Vec<(String, u64)>,
        }
        let parsed: Brands =
            serde_json::from_str(r#"{"top": {"Lenovo": 20, "HP": 10, "Acer": "3"}}"#).unwrap();
        assert_eq!(
            parsed.top,
            vec![
                ("Lenovo".to_string(), 20),
                ("HP".to_string(), 10),
                ("Acer".to_string(), 3)
            ]
        );
    }
}
