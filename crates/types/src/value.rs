//! Tagged values for runtime inputs and bound report parameters.
//!
//! Inputs arrive as [`InputValue`]s: either a single [`Value`] or an array of
//! them. Parameter declarations describe the slot they fill with a
//! [`ValueType`], which is a [`ScalarType`] optionally wrapped as an array.
//! Conversion code dispatches on these tags instead of inspecting runtime
//! types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared byte payload (report definitions, workbook templates, ...).
pub type SharedBytes = Arc<Vec<u8>>;

/// The closed set of scalar types a report parameter can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    #[serde(alias = "text")]
    String,
    #[serde(alias = "int", alias = "long")]
    Integer,
    #[serde(alias = "double", alias = "decimal", alias = "float")]
    Number,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "timestamp", alias = "datetime")]
    Date,
    /// Generic tabular data.
    Table,
    #[serde(alias = "binary")]
    Bytes,
    /// Accepts any value unchanged.
    #[serde(alias = "object")]
    Any,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
            ScalarType::Date => "date",
            ScalarType::Table => "table",
            ScalarType::Bytes => "bytes",
            ScalarType::Any => "any",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared type of a report parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl ValueType {
    /// The scalar type of the value, or of each element for arrays.
    pub fn component(self) -> ScalarType {
        match self {
            ValueType::Scalar(t) | ValueType::Array(t) => t,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, ValueType::Array(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(t) => write!(f, "{}", t),
            ValueType::Array(t) => write!(f, "{}[]", t),
        }
    }
}

/// A row-oriented result set as produced by a host data source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Tabular-data view over a [`ResultSet`].
///
/// This is the adapter used when a parameter declares [`ScalarType::Table`]
/// and the host hands in a raw result set. The underlying rows are shared,
/// not copied.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    source: Arc<ResultSet>,
}

impl TableModel {
    pub fn from_result_set(source: Arc<ResultSet>) -> Self {
        Self { source }
    }

    pub fn row_count(&self) -> usize {
        self.source.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.source.column_count()
    }

    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.source.columns().get(column).map(String::as_str)
    }

    /// Returns the cell at `row`/`column`, or `None` when out of range or
    /// when the row is shorter than the header.
    pub fn value_at(&self, row: usize, column: usize) -> Option<&Value> {
        self.source.rows().get(row).and_then(|r| r.get(column))
    }
}

impl From<ResultSet> for TableModel {
    fn from(result_set: ResultSet) -> Self {
        Self::from_result_set(Arc::new(result_set))
    }
}

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Table(TableModel),
    ResultSet(Arc<ResultSet>),
    Bytes(SharedBytes),
}

impl Value {
    /// Returns `true` if this value can be stored as-is in a slot of type `target`.
    pub fn satisfies(&self, target: ScalarType) -> bool {
        matches!(
            (target, self),
            (ScalarType::Any, _)
                | (ScalarType::String, Value::String(_))
                | (ScalarType::Integer, Value::Integer(_))
                | (ScalarType::Number, Value::Number(_))
                | (ScalarType::Boolean, Value::Boolean(_))
                | (ScalarType::Date, Value::Date(_))
                | (ScalarType::Table, Value::Table(_))
                | (ScalarType::Bytes, Value::Bytes(_))
        )
    }

    /// The canonical string form used as the source of string-based conversion.
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }

    /// Builds a date from milliseconds since the Unix epoch.
    pub fn date_from_millis(millis: i64) -> Option<Value> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Value::Date)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&SharedBytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.timestamp_millis()),
            Value::Table(t) => write!(f, "table[{}x{}]", t.row_count(), t.column_count()),
            Value::ResultSet(r) => {
                write!(f, "result-set[{}x{}]", r.row_count(), r.column_count())
            }
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<ResultSet> for Value {
    fn from(r: ResultSet) -> Self {
        Value::ResultSet(Arc::new(r))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Arc::new(b))
    }
}

/// An untyped runtime input: one value or an array of values.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Scalar(Value),
    Array(Vec<Value>),
}

impl InputValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            InputValue::Scalar(v) => Some(v),
            InputValue::Array(_) => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, InputValue::Array(_))
    }

    /// String form of the input. Arrays are joined with commas.
    pub fn to_canonical_string(&self) -> String {
        match self {
            InputValue::Scalar(v) => v.to_canonical_string(),
            InputValue::Array(items) => items
                .iter()
                .map(Value::to_canonical_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Returns `true` when the input reads as the word `true`, ignoring case.
    pub fn is_true(&self) -> bool {
        self.to_canonical_string().eq_ignore_ascii_case("true")
    }

    /// Maps a JSON value onto the input model.
    ///
    /// A top-level `null` has no input representation and yields `None`.
    /// Inside an array a `null` keeps its position as an empty string, which
    /// binds as a null element. Nested arrays and objects are kept as their
    /// JSON text.
    pub fn from_json(json: &serde_json::Value) -> Option<InputValue> {
        match json {
            serde_json::Value::Null => None,
            serde_json::Value::Array(items) => Some(InputValue::Array(
                items
                    .iter()
                    .map(|item| json_scalar(item).unwrap_or_else(|| Value::String(String::new())))
                    .collect(),
            )),
            other => json_scalar(other).map(InputValue::Scalar),
        }
    }
}

fn json_scalar(json: &serde_json::Value) -> Option<Value> {
    match json {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Integer(i)),
            None => n.as_f64().map(Value::Number),
        },
        serde_json::Value::String(s) => Some(Value::String(s.clone())),
        other => Some(Value::String(other.to_string())),
    }
}

impl From<Value> for InputValue {
    fn from(v: Value) -> Self {
        InputValue::Scalar(v)
    }
}

impl From<Vec<Value>> for InputValue {
    fn from(items: Vec<Value>) -> Self {
        InputValue::Array(items)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Scalar(s.into())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Scalar(s.into())
    }
}

impl From<i64> for InputValue {
    fn from(i: i64) -> Self {
        InputValue::Scalar(i.into())
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        InputValue::Scalar(i.into())
    }
}

impl From<f64> for InputValue {
    fn from(n: f64) -> Self {
        InputValue::Scalar(n.into())
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        InputValue::Scalar(b.into())
    }
}

impl From<Vec<u8>> for InputValue {
    fn from(b: Vec<u8>) -> Self {
        InputValue::Scalar(b.into())
    }
}

impl From<ResultSet> for InputValue {
    fn from(r: ResultSet) -> Self {
        InputValue::Scalar(r.into())
    }
}

/// The bag of named inputs supplied to one execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSet {
    entries: BTreeMap<String, InputValue>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<InputValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.entries.get(key)
    }

    /// Returns the entry only when it is a single value.
    pub fn scalar(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(InputValue::as_scalar)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for InputSet
where
    K: Into<String>,
    V: Into<InputValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = InputSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}
