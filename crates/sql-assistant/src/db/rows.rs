//! Conversion of PostgreSQL rows into JSON values.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

/// ISO 8601 without offset, for `TIMESTAMP` values.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Column names of a row in select-list order.
pub fn column_names(row: &PgRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Convert a row into a JSON object keyed by column name.
pub fn row_to_object(row: &PgRow) -> Map<String, Value> {
    let mut obj = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        obj.insert(column.name().to_string(), row_value_to_json(row, idx));
    }
    obj
}

/// Decode one cell, picking the Rust type by the Postgres type name.
/// Values that cannot be decoded become `null`.
pub fn row_value_to_json(row: &PgRow, idx: usize) -> Value {
    let type_name = row.columns()[idx].type_info().name().to_string();

    match type_name.as_str() {
        "INT2" => decode::<i16>(row, idx).map(|v| json!(v)),
        "INT4" => decode::<i32>(row, idx).map(|v| json!(v)),
        "INT8" => decode::<i64>(row, idx).map(|v| json!(v)),
        "FLOAT4" => decode::<f32>(row, idx).map(|v| float_to_json(v as f64)),
        "FLOAT8" => decode::<f64>(row, idx).map(float_to_json),
        "NUMERIC" => decode::<rust_decimal::Decimal>(row, idx).map(|v| numeric_to_json(&v)),
        "BOOL" => decode::<bool>(row, idx).map(|v| json!(v)),
        "JSON" | "JSONB" => decode::<Value>(row, idx),
        "TIMESTAMPTZ" => {
            decode::<chrono::DateTime<chrono::Utc>>(row, idx).map(|v| json!(v.to_rfc3339()))
        }
        "TIMESTAMP" => decode::<chrono::NaiveDateTime>(row, idx)
            .map(|v| json!(v.format(TIMESTAMP_FORMAT).to_string())),
        "DATE" => decode::<chrono::NaiveDate>(row, idx).map(|v| json!(v.to_string())),
        "TIME" => decode::<chrono::NaiveTime>(row, idx).map(|v| json!(v.to_string())),
        "UUID" => decode::<uuid::Uuid>(row, idx).map(|v| json!(v.to_string())),
        "TEXT[]" | "VARCHAR[]" => decode::<Vec<String>>(row, idx).map(|v| json!(v)),
        "INT4[]" => decode::<Vec<i32>>(row, idx).map(|v| json!(v)),
        "INT8[]" => decode::<Vec<i64>>(row, idx).map(|v| json!(v)),
        // Default to string for text-like and unknown types
        _ => decode::<String>(row, idx).map(|v| json!(v)),
    }
    .unwrap_or(Value::Null)
}

fn decode<'r, T>(row: &'r PgRow, idx: usize) -> Option<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(idx).ok().flatten()
}

fn float_to_json(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or_else(|| json!(v.to_string()))
}

/// NUMERIC becomes a JSON integer at scale 0 when it fits `i64`, otherwise a
/// float. Only values `f64` cannot hold keep their decimal text.
pub fn numeric_to_json(v: &rust_decimal::Decimal) -> Value {
    if v.scale() == 0 {
        if let Some(i) = v.to_i64() {
            return json!(i);
        }
    }
    let text = v.to_string();
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => float_to_json(f),
        _ => json!(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_numeric_exact_values_become_numbers() {
        let v = rust_decimal::Decimal::from_str("12.5").unwrap();
        assert_eq!(numeric_to_json(&v), json!(12.5));
    }

    #[test]
    fn test_numeric_integer_stays_integer() {
        let v = rust_decimal::Decimal::from_str("42").unwrap();
        assert_eq!(numeric_to_json(&v), json!(42));
        assert_eq!(numeric_to_json(&v).to_string(), "42");
    }

    #[test]
    fn test_numeric_trailing_zeros_become_numbers() {
        let v = rust_decimal::Decimal::from_str("3.10").unwrap();
        assert_eq!(numeric_to_json(&v), json!(3.1));

        // avg(int) comes back with sixteen fractional digits
        let avg = rust_decimal::Decimal::from_str("2.5000000000000000").unwrap();
        assert_eq!(numeric_to_json(&avg), json!(2.5));
    }

    #[test]
    fn test_numeric_beyond_i64_is_float() {
        let v = rust_decimal::Decimal::from_str("12345678901234567890123").unwrap();
        assert!(numeric_to_json(&v).is_f64());
    }

    #[test]
    fn test_timestamp_format_is_iso() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            ts.format(TIMESTAMP_FORMAT).to_string(),
            "2024-01-01T08:30:00"
        );
    }

    #[test]
    fn test_float_nan_is_string() {
        assert_eq!(float_to_json(f64::NAN), json!("NaN"));
    }
}
