//! SQL escaping and positional formatting.
//!
//! Client-side substitution in the style of the mysql `sqlstring` package:
//! identifiers are backtick-quoted, values are rendered as MySQL literals and
//! `?`/`??` placeholders are replaced left to right.

use crate::models::SqlValue;
use chrono::NaiveDateTime;
use std::fmt::Write as _;

/// Quote an identifier, splitting qualified names on `.`.
pub fn escape_id(identifier: &str) -> String {
    escape_id_with(identifier, false)
}

/// Quote an identifier. With `forbid_qualified`, dots stay inside one
/// identifier instead of separating `schema`.`table`.
pub fn escape_id_with(identifier: &str, forbid_qualified: bool) -> String {
    let doubled = identifier.replace('`', "``");
    if forbid_qualified {
        format!("`{doubled}`")
    } else {
        format!("`{}`", doubled.replace('.', "`.`"))
    }
}

/// Render a value as a MySQL literal.
pub fn escape(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(v) => v.to_string(),
        SqlValue::UInt(v) => v.to_string(),
        SqlValue::Float(v) => v.to_string(),
        SqlValue::String(s) => escape_string(s),
        SqlValue::List(items) => list_to_sql(items),
        SqlValue::Object(pairs) => pairs
            .iter()
            .map(|(key, val)| format!("{} = {}", escape_id(key), escape(val)))
            .collect::<Vec<_>>()
            .join(", "),
        SqlValue::Bytes(bytes) => bytes_to_sql(bytes),
        SqlValue::Date(dt) => date_to_sql(dt),
        SqlValue::Raw(sql) => sql.clone(),
    }
}

/// Substitute `?` (value) and `??` (identifier) placeholders in order.
///
/// Runs of three or more `?` are left as written. Placeholders beyond the
/// supplied values are left untouched.
pub fn format(sql: &str, values: &[SqlValue]) -> String {
    if values.is_empty() {
        return sql.to_string();
    }

    let mut out = String::with_capacity(sql.len() + values.len() * 4);
    let mut values_iter = values.iter();
    let mut rest = sql;

    while let Some(start) = rest.find('?') {
        let run = rest[start..].bytes().take_while(|b| *b == b'?').count();
        let (before, after) = rest.split_at(start);
        out.push_str(before);

        if run > 2 {
            out.push_str(&after[..run]);
            rest = &after[run..];
            continue;
        }

        let Some(value) = values_iter.next() else {
            rest = after;
            break;
        };

        if run == 2 {
            out.push_str(&escape_id_value(value));
        } else {
            out.push_str(&escape(value));
        }
        rest = &after[run..];
    }

    out.push_str(rest);
    out
}

/// Wrap SQL so `format`/`escape` insert it verbatim.
pub fn raw(sql: impl Into<String>) -> SqlValue {
    SqlValue::Raw(sql.into())
}

fn escape_id_value(value: &SqlValue) -> String {
    match value {
        SqlValue::String(s) => escape_id(s),
        SqlValue::List(items) => items
            .iter()
            .map(escape_id_value)
            .collect::<Vec<_>>()
            .join(", "),
        SqlValue::Raw(sql) => sql.clone(),
        other => escape_id(&display_value(other)),
    }
}

/// Textual form used when a non-string value names an identifier.
fn display_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "null".to_string(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(v) => v.to_string(),
        SqlValue::UInt(v) => v.to_string(),
        SqlValue::Float(v) => v.to_string(),
        SqlValue::String(s) | SqlValue::Raw(s) => s.clone(),
        SqlValue::Date(dt) => dt.to_string(),
        other => escape(other),
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn list_to_sql(items: &[SqlValue]) -> String {
    items
        .iter()
        .map(|item| match item {
            SqlValue::List(inner) => format!("({})", list_to_sql(inner)),
            other => escape(other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn bytes_to_sql(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out.push('\'');
    out
}

fn date_to_sql(dt: &NaiveDateTime) -> String {
    escape_string(&dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
}
