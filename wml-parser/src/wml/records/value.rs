use crate::wml::lexing::transformations::unescaping::unquote;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected {expected} value but found {found} '{value}'")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        value: String,
    },
}

/// Attribute value of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl AttributeValue {
    /// Types a raw attribute value.
    ///
    /// Quoted (`"..."`), translatable (`_ "..."`) and raw (`<<...>>`) values are
    /// always strings. Otherwise `yes`/`true`/`no`/`false` are booleans, base-10
    /// integers are integers, and anything else is a string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let untranslated = raw
            .strip_prefix('_')
            .map(str::trim_start)
            .filter(|rest| rest.starts_with('"'))
            .unwrap_or(raw);

        if untranslated.len() >= 2 && untranslated.starts_with('"') {
            return AttributeValue::String(unquote(untranslated));
        }
        if let Some(inner) = raw.strip_prefix("<<").and_then(|r| r.strip_suffix(">>")) {
            return AttributeValue::String(inner.to_string());
        }
        match raw {
            "yes" | "true" => AttributeValue::Boolean(true),
            "no" | "false" => AttributeValue::Boolean(false),
            _ => raw
                .parse::<i64>()
                .map(AttributeValue::Integer)
                .unwrap_or_else(|_| AttributeValue::String(raw.to_string())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Boolean(_) => "boolean",
        }
    }

    fn mismatch(&self, expected: &'static str) -> RecordError {
        RecordError::TypeMismatch {
            expected,
            found: self.type_name(),
            value: self.to_string(),
        }
    }

    pub fn as_str(&self) -> Result<&str, RecordError> {
        match self {
            AttributeValue::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_integer(&self) -> Result<i64, RecordError> {
        match self {
            AttributeValue::Integer(n) => Ok(*n),
            other => Err(other.mismatch("integer")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, RecordError> {
        match self {
            AttributeValue::Boolean(b) => Ok(*b),
            other => Err(other.mismatch("boolean")),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Integer(n) => write!(f, "{}", n),
            AttributeValue::Boolean(true) => f.write_str("yes"),
            AttributeValue::Boolean(false) => f.write_str("no"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}
