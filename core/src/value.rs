//! Scalar value and type-conformance model (§3/§4.1).

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five column types a table column may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Text,
    Real,
    Boolean,
    Date,
}

impl DataType {
    /// Normalizes a type token as it appears in a `CREATE TABLE` column
    /// definition: `INT`→INTEGER, `VARCHAR(n)`→TEXT, `FLOAT`/`DOUBLE`→REAL,
    /// `BOOL`→BOOLEAN, everything else is matched by name.
    pub fn from_token(token: &str) -> Option<DataType> {
        let base = token.split('(').next().unwrap_or(token).trim();
        match base.to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Some(DataType::Integer),
            "TEXT" | "VARCHAR" | "CHAR" => Some(DataType::Text),
            "REAL" | "FLOAT" | "DOUBLE" => Some(DataType::Real),
            "BOOLEAN" | "BOOL" => Some(DataType::Boolean),
            "DATE" => Some(DataType::Date),
            _ => None,
        }
    }

    /// A value `v` conforms to this type per the relaxed coercion rules
    /// of §3: Null always conforms; otherwise each type accepts its own
    /// tag plus a documented set of look-alikes.
    pub fn validate(&self, value: &Value) -> bool {
        if matches!(value, Value::Null) {
            return true;
        }
        match self {
            DataType::Integer => match value {
                Value::Int64(_) => true,
                Value::Float64(f) => f.fract() == 0.0,
                Value::Text(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            DataType::Real => match value {
                Value::Int64(_) | Value::Float64(_) => true,
                Value::Text(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            DataType::Boolean => match value {
                Value::Bool(_) => true,
                Value::Int64(i) => *i == 0 || *i == 1,
                Value::Text(s) => matches!(
                    s.trim().to_ascii_lowercase().as_str(),
                    "0" | "1" | "true" | "false"
                ),
                _ => false,
            },
            DataType::Text | DataType::Date => matches!(value, Value::Text(_)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
        };
        f.write_str(s)
    }
}

/// A tagged scalar. Date is represented as free-form `Text` (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// Parses a single SQL literal token per the ordered rules of §4.1:
    /// NULL, quoted text, TRUE/FALSE, a `.`-containing float, an integer,
    /// falling back to raw text.
    pub fn parse_literal(token: &str) -> Value {
        let trimmed = token.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            return Value::Text(trimmed[1..trimmed.len() - 1].to_string());
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if trimmed.contains('.') {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Value::Float64(f);
            }
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int64(i);
        }
        Value::Text(trimmed.to_string())
    }

    /// Renders the value the way it must appear once substituted back into
    /// a WHERE clause: text is single-quoted, everything else prints plain.
    pub fn as_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Float64(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => format!("'{s}'"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// SQL equality: `Null` compares equal to nothing, including another
    /// `Null` (§4.1); Int64/Float64 compare by numeric value.
    pub fn eq_sql(&self, other: &Value) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        match (self, other) {
            (Value::Int64(a), Value::Float64(b)) | (Value::Float64(b), Value::Int64(a)) => {
                (*a as f64) == *b
            }
            _ => self == other,
        }
    }

    /// Ordering used by ORDER BY and `<,<=,>,>=` comparisons (§4.1 [ADDED]):
    /// numeric-vs-numeric promotes to f64, text/date compares lexically,
    /// bool compares false<true; anything else (including a Null operand)
    /// is "not comparable".
    pub fn partial_compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => a.partial_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Int64(a), Value::Float64(b)) => (*a as f64).partial_cmp(b),
            (Value::Float64(a), Value::Int64(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Value::Bool(a), Value::Bool(b)) => {
                Some((*a as u8).cmp(&(*b as u8)))
            }
            _ => {
                let _ = Ordering::Equal;
                None
            }
        }
    }

    /// The string form used for ORDER BY's stringified sort key (§4.4).
    pub fn sort_key(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int64(i) => i.to_string(),
            Value::Float64(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(""),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}
