//! The report model as seen by the orchestrator.

use crate::context::ParameterContext;
use reportflow_types::{InputValue, Value, ValueType};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Names of the core report attributes read by the orchestrator.
pub mod core_attributes {
    pub const NAMESPACE: &str = "urn:reportflow:core";
    /// Output type the report would like to be rendered as, e.g. `"pdf"`.
    pub const PREFERRED_OUTPUT_TYPE: &str = "preferred-output-type";
    /// When boolean `true`, the preferred output type overrides the caller's choice.
    pub const LOCK_PREFERRED_OUTPUT_TYPE: &str = "lock-preferred-output-type";
}

/// Where a parameter takes its value from when the caller supplies none.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Fixed(InputValue),
    /// Read from the parameter context's environment under this key.
    Environment(String),
}

/// Declaration of one report parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    name: String,
    value_type: ValueType,
    multi_select: bool,
    default_value: Option<DefaultValue>,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            multi_select: false,
            default_value: None,
        }
    }

    pub fn with_multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }

    pub fn with_default(mut self, default_value: DefaultValue) -> Self {
        self.default_value = Some(default_value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    /// Resolves the default through `context`. Environment-backed defaults
    /// only resolve while the context is open.
    pub fn default_value(&self, context: &dyn ParameterContext) -> Option<InputValue> {
        match self.default_value.as_ref()? {
            DefaultValue::Fixed(value) => Some(value.clone()),
            DefaultValue::Environment(key) => {
                context.environment_property(key).map(InputValue::from)
            }
        }
    }
}

/// A value held in the report's parameter store.
///
/// `None` entries record a parameter that was bound to null, which is
/// distinct from a parameter that was never bound.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Scalar(Option<Value>),
    Array(Vec<Option<Value>>),
}

impl ParameterValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ParameterValue::Scalar(v) => v.as_ref(),
            ParameterValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Option<Value>]> {
        match self {
            ParameterValue::Array(items) => Some(items),
            ParameterValue::Scalar(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParameterValue::Scalar(None))
    }
}

/// The report's parameter-value store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterValues {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, returning the value it replaced.
    pub fn put(&mut self, name: impl Into<String>, value: ParameterValue) -> Option<ParameterValue> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParameterValue> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A parsed report definition.
///
/// The model is produced by a [`crate::ReportLoader`] and owned by one
/// orchestration instance. The orchestrator reads parameter declarations and
/// attributes and writes bound values into the parameter store.
pub trait ReportModel: Send + Debug {
    fn name(&self) -> &str;

    /// Declared parameters, in declaration order.
    fn parameter_definitions(&self) -> &[ParameterDefinition];

    fn parameter_values(&self) -> &ParameterValues;

    fn parameter_values_mut(&mut self) -> &mut ParameterValues;

    /// Reads a namespaced report attribute.
    fn attribute(&self, namespace: &str, name: &str) -> Option<&serde_json::Value>;
}
