use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad class of a column, derived from the type name reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    Binary,
    Timestamp,
    /// Anything without a dedicated variant (numeric, uuid, json, date, enums, arrays)
    Other,
}

impl ColumnKind {
    pub fn from_type_name(type_name: &str) -> ColumnKind {
        match type_name.trim().to_ascii_lowercase().as_str() {
            "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" => ColumnKind::Integer,
            "real" | "double precision" | "float4" | "float8" => ColumnKind::Float,
            "boolean" | "bool" => ColumnKind::Bool,
            "text" | "character varying" | "character" | "varchar" | "bpchar" | "name" => {
                ColumnKind::Text
            }
            "bytea" => ColumnKind::Binary,
            "timestamp without time zone"
            | "timestamp with time zone"
            | "timestamp"
            | "timestamptz" => ColumnKind::Timestamp,
            _ => ColumnKind::Other,
        }
    }
}

/// A single column value of a row whose shape is only known at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Float(f64),
    Bool(bool),
    Binary(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Decodes the server's text rendering of a column.
    ///
    /// Rows are always selected with every column cast to text, so this is the
    /// only read path. A value that does not parse as its column kind is kept
    /// as `Text` rather than dropped.
    pub fn from_text(kind: ColumnKind, raw: Option<&str>) -> Value {
        let Some(raw) = raw else {
            return Value::Null;
        };
        let parsed = match kind {
            ColumnKind::Integer => raw.parse().ok().map(Value::Integer),
            ColumnKind::Float => parse_float(raw).map(Value::Float),
            ColumnKind::Bool => match raw {
                "true" | "t" => Some(Value::Bool(true)),
                "false" | "f" => Some(Value::Bool(false)),
                _ => None,
            },
            ColumnKind::Binary => decode_hex(raw).map(Value::Binary),
            ColumnKind::Timestamp => parse_timestamp(raw).map(Value::Timestamp),
            ColumnKind::Text | ColumnKind::Other => Some(Value::Text(raw.to_string())),
        };
        parsed.unwrap_or_else(|| {
            tracing::warn!(?kind, raw, "value does not match column kind, keeping text");
            Value::Text(raw.to_string())
        })
    }

    /// Renders the value in a form PostgreSQL accepts as input for any column
    /// type, or `None` for SQL NULL.
    pub fn to_sql_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(i.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Float(f) if f.is_nan() => Some("NaN".to_string()),
            Value::Float(f) if f.is_infinite() => Some(
                if *f > 0.0 { "Infinity" } else { "-Infinity" }.to_string(),
            ),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Binary(bytes) => Some(encode_hex(bytes)),
            Value::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S%.f+00").to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Binary(bytes) => write!(f, "{}", encode_hex(bytes)),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    match raw {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => raw.parse().ok(),
    }
}

// timestamptz renders as "2024-01-02 03:04:05.5+00", timestamp without the offset
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    let digits = raw.strip_prefix("\\x")?;
    // Byte-offset slicing below is only sound on ASCII, and from_str_radix takes a sign
    if digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}
