//! String-to-value converters, keyed by target scalar type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reportflow_types::{ScalarType, Value};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert '{input}' to {target}: {message}")]
pub struct ConversionError {
    pub target: ScalarType,
    pub input: String,
    pub message: String,
}

impl ConversionError {
    pub fn new(target: ScalarType, input: &str, message: impl Into<String>) -> Self {
        Self {
            target,
            input: input.to_string(),
            message: message.into(),
        }
    }
}

/// Parses the string form of a value into a typed [`Value`].
pub trait ValueConverter: Send + Sync + Debug {
    fn to_value(&self, text: &str) -> Result<Value, ConversionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl ValueConverter for StringConverter {
    fn to_value(&self, text: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(text.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl ValueConverter for IntegerConverter {
    fn to_value(&self, text: &str) -> Result<Value, ConversionError> {
        text.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| ConversionError::new(ScalarType::Integer, text, e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl ValueConverter for NumberConverter {
    fn to_value(&self, text: &str) -> Result<Value, ConversionError> {
        text.trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|e| ConversionError::new(ScalarType::Number, text, e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl ValueConverter for BooleanConverter {
    fn to_value(&self, text: &str) -> Result<Value, ConversionError> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(Value::Boolean(true))
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(Value::Boolean(false))
        } else {
            Err(ConversionError::new(
                ScalarType::Boolean,
                text,
                "expected 'true' or 'false'",
            ))
        }
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and plain `YYYY-MM-DD`
/// dates. Naive forms are taken as UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateConverter;

impl ValueConverter for DateConverter {
    fn to_value(&self, text: &str) -> Result<Value, ConversionError> {
        let trimmed = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Value::Date(dt.with_timezone(&Utc)));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Ok(Value::Date(dt.and_utc()));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Value::Date(dt.and_utc()))
            .ok_or_else(|| ConversionError::new(ScalarType::Date, text, "unrecognized date format"))
    }
}

/// Lookup table from target type to converter.
///
/// `ConverterRegistry::default()` carries converters for every plain scalar
/// type. `Table`, `Bytes` and `Any` have none: values of those types cannot be
/// produced from a string.
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: HashMap<ScalarType, Arc<dyn ValueConverter>>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::empty()
            .with(ScalarType::String, Arc::new(StringConverter))
            .with(ScalarType::Integer, Arc::new(IntegerConverter))
            .with(ScalarType::Number, Arc::new(NumberConverter))
            .with(ScalarType::Boolean, Arc::new(BooleanConverter))
            .with(ScalarType::Date, Arc::new(DateConverter))
    }
}

impl ConverterRegistry {
    /// A registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        target: ScalarType,
        converter: Arc<dyn ValueConverter>,
    ) -> Option<Arc<dyn ValueConverter>> {
        self.converters.insert(target, converter)
    }

    pub fn with(mut self, target: ScalarType, converter: Arc<dyn ValueConverter>) -> Self {
        self.register(target, converter);
        self
    }

    pub fn converter(&self, target: ScalarType) -> Option<&dyn ValueConverter> {
        self.converters.get(&target).map(|c| c.as_ref())
    }
}
