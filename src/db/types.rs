//! MySQL row decoding.
//!
//! Rows come back from the server over the text protocol and are turned into
//! JSON maps.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Per-category decoders handle the actual value extraction
//!
//! Temporal columns are rendered as RFC 3339 strings in the connection's
//! timezone, or passed through as the server's text when date strings are
//! requested.

use crate::models::Row;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row as _, Type, TypeInfo};

/// Logical category for MySQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Binary,
    Json,
    Unknown,
}

/// Classify a MySQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    if lower.contains("int") || lower.contains("tiny") {
        return TypeCategory::Integer;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "date" {
        return TypeCategory::Date;
    }

    if lower == "datetime" || lower == "timestamp" {
        return TypeCategory::DateTime;
    }

    if lower == "json" {
        return TypeCategory::Json;
    }

    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    // Text for everything else (varchar, text, char, time, year, enum, etc.)
    TypeCategory::Unknown
}

/// Wrapper type for raw DECIMAL values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

/// Encode binary column data as base64.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    JsonValue::String(STANDARD.encode(bytes))
}

/// How temporal columns are rendered.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Return DATE/DATETIME/TIMESTAMP as the server's text.
    pub date_strings: bool,
    /// Offset the session timezone was set to.
    pub offset: FixedOffset,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            date_strings: false,
            offset: Utc.fix(),
        }
    }
}

/// Convert a MySQL row into a JSON map.
pub fn row_to_json(row: &MySqlRow, options: &DecodeOptions) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let type_name = col.type_info().name();
            let category = categorize_type(type_name);
            let value = decode_column(row, idx, category, options);
            (col.name().to_string(), value)
        })
        .collect()
}

/// Group dotted column names into nested objects: `"u.id"` becomes
/// `{"u": {"id": ...}}`. A key that collides with a non-object value is
/// kept flat.
pub fn nest_row(row: Row) -> Row {
    let mut nested = Row::new();
    for (key, value) in row {
        if !key.contains('.') {
            nested.insert(key, value);
            continue;
        }
        let path: Vec<&str> = key.split('.').collect();
        if !insert_path(&mut nested, &path, value.clone()) {
            nested.insert(key, value);
        }
    }
    nested
}

fn insert_path(map: &mut Row, path: &[&str], value: JsonValue) -> bool {
    match path {
        [] => false,
        [last] => {
            if map.contains_key(*last) {
                return false;
            }
            map.insert((*last).to_string(), value);
            true
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| JsonValue::Object(Row::new()));
            match entry {
                JsonValue::Object(inner) => insert_path(inner, rest, value),
                _ => false,
            }
        }
    }
}

fn decode_column(
    row: &MySqlRow,
    idx: usize,
    category: TypeCategory,
    options: &DecodeOptions,
) -> JsonValue {
    match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_boolean(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Date | TypeCategory::DateTime if options.date_strings => {
            decode_text(row, idx)
        }
        TypeCategory::Date => decode_date(row, idx, options.offset),
        TypeCategory::DateTime => decode_datetime(row, idx, options.offset),
        TypeCategory::Binary => decode_binary_col(row, idx),
        TypeCategory::Json => decode_json(row, idx),
        TypeCategory::Unknown => decode_text(row, idx),
    }
}

fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.0),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            tracing::error!("Failed to decode DECIMAL: {:?}", e);
            JsonValue::Null
        }
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u8>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    // YEAR and other integer-like columns sqlx does not map
    decode_text(row, idx)
}

fn decode_boolean(row: &MySqlRow, idx: usize) -> JsonValue {
    row.try_get::<Option<bool>, _>(idx)
        .ok()
        .flatten()
        .map(JsonValue::Bool)
        .unwrap_or(JsonValue::Null)
}

fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
        return serde_json::Number::from_f64(v as f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    JsonValue::Null
}

fn decode_date(row: &MySqlRow, idx: usize, offset: FixedOffset) -> JsonValue {
    match row.try_get::<Option<NaiveDate>, _>(idx) {
        Ok(Some(date)) => format_local(date.and_time(chrono::NaiveTime::MIN), offset),
        Ok(None) => JsonValue::Null,
        // zero dates and other values chrono cannot represent
        Err(_) => decode_text(row, idx),
    }
}

fn decode_datetime(row: &MySqlRow, idx: usize, offset: FixedOffset) -> JsonValue {
    match row.try_get::<Option<NaiveDateTime>, _>(idx) {
        Ok(Some(dt)) => format_local(dt, offset),
        Ok(None) => JsonValue::Null,
        Err(_) => decode_text(row, idx),
    }
}

/// Interpret a server wall-clock value in the session offset.
fn format_local(naive: NaiveDateTime, offset: FixedOffset) -> JsonValue {
    match offset.from_local_datetime(&naive).single() {
        Some(dt) => JsonValue::String(to_rfc3339(dt)),
        None => JsonValue::String(naive.to_string()),
    }
}

fn to_rfc3339(dt: DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, false)
}

fn decode_binary_col(row: &MySqlRow, idx: usize) -> JsonValue {
    row.try_get::<Option<Vec<u8>>, _>(idx)
        .ok()
        .flatten()
        .map(|v| decode_binary_value(&v))
        .unwrap_or(JsonValue::Null)
}

fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
    // MySQL JSON type should be decoded as serde_json::Value directly
    row.try_get::<Option<serde_json::Value>, _>(idx)
        .ok()
        .flatten()
        .unwrap_or(JsonValue::Null)
}

fn decode_text(row: &MySqlRow, idx: usize) -> JsonValue {
    // Text protocol values are the server's textual rendering, whatever the type
    match row.try_get_unchecked::<Option<String>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v),
        Ok(None) => JsonValue::Null,
        Err(_) => row
            .try_get_unchecked::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| decode_binary_value(&v))
            .unwrap_or(JsonValue::Null),
    }
}
