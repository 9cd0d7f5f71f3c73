//! Typed parameter values for parameterized statements

use chrono::NaiveDateTime;

/// Declared type of a staging column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Decimal,
    Text,
    Boolean,
    Date,
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SqlType::Integer => "integer",
            SqlType::Decimal => "decimal",
            SqlType::Text => "text",
            SqlType::Boolean => "boolean",
            SqlType::Date => "date",
        };
        f.write_str(name)
    }
}

/// A value bound to a positional parameter. `Null` keeps its column type so
/// the driver can send a typed NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(SqlType),
    Int(i64),
    Decimal(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Null(t) => *t,
            SqlValue::Int(_) => SqlType::Integer,
            SqlValue::Decimal(_) => SqlType::Decimal,
            SqlValue::Text(_) => SqlType::Text,
            SqlValue::Bool(_) => SqlType::Boolean,
            SqlValue::Date(_) => SqlType::Date,
        }
    }
}
