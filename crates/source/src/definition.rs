//! JSON report definitions and the in-memory report model built from them.
//!
//! ```json
//! {
//!   "name": "sales",
//!   "attributes": {
//!     "urn:reportflow:core": { "preferred-output-type": "pdf" }
//!   },
//!   "parameters": [
//!     { "name": "region", "type": "string", "multiSelect": true, "default": "north" },
//!     { "name": "ids", "type": "integer", "array": true },
//!     { "name": "owner", "type": "string", "defaultFromEnvironment": "user" }
//!   ]
//! }
//! ```

use reportflow_traits::{
    DefaultValue, LoadError, ParameterDefinition, ParameterValues, ReportModel,
};
use reportflow_types::{InputValue, ScalarType, ValueType};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    pub name: String,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type", default = "any_type")]
    pub value_type: ScalarType,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub multi_select: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub default_from_environment: Option<String>,
}

fn any_type() -> ScalarType {
    ScalarType::Any
}

impl ParameterSpec {
    fn to_definition(&self) -> ParameterDefinition {
        let value_type = if self.array {
            ValueType::Array(self.value_type)
        } else {
            ValueType::Scalar(self.value_type)
        };
        let mut definition =
            ParameterDefinition::new(&self.name, value_type).with_multi_select(self.multi_select);
        if let Some(fixed) = self.default.as_ref().and_then(InputValue::from_json) {
            definition = definition.with_default(DefaultValue::Fixed(fixed));
        } else if let Some(key) = &self.default_from_environment {
            definition = definition.with_default(DefaultValue::Environment(key.clone()));
        }
        definition
    }
}

impl ReportDefinition {
    pub fn from_slice(source_name: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        serde_json::from_slice(bytes).map_err(|e| LoadError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }
}

/// A report model held entirely in memory.
#[derive(Debug, Clone)]
pub struct DefinedReport {
    name: String,
    definitions: Vec<ParameterDefinition>,
    values: ParameterValues,
    attributes: HashMap<String, serde_json::Map<String, serde_json::Value>>,
    content_base: Option<Url>,
}

impl DefinedReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
            values: ParameterValues::new(),
            attributes: HashMap::new(),
            content_base: None,
        }
    }

    /// Builds the model from a parsed definition, rejecting duplicate
    /// parameter names.
    pub fn from_definition(definition: ReportDefinition) -> Result<Self, LoadError> {
        let mut seen = HashSet::new();
        for parameter in &definition.parameters {
            if !seen.insert(parameter.name.as_str()) {
                return Err(LoadError::Parse {
                    source_name: definition.name.clone(),
                    message: format!("duplicate parameter '{}'", parameter.name),
                });
            }
        }
        Ok(Self {
            definitions: definition.parameters.iter().map(ParameterSpec::to_definition).collect(),
            name: definition.name,
            values: ParameterValues::new(),
            attributes: definition.attributes,
            content_base: None,
        })
    }

    pub fn with_parameter(mut self, definition: ParameterDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_attribute(
        mut self,
        namespace: &str,
        name: &str,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
        self
    }

    pub fn with_content_base(mut self, base: Option<Url>) -> Self {
        self.content_base = base;
        self
    }

    /// Base URL that relative resources of the definition resolve against.
    pub fn content_base(&self) -> Option<&Url> {
        self.content_base.as_ref()
    }
}

impl ReportModel for DefinedReport {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_definitions(&self) -> &[ParameterDefinition] {
        &self.definitions
    }

    fn parameter_values(&self) -> &ParameterValues {
        &self.values
    }

    fn parameter_values_mut(&mut self) -> &mut ParameterValues {
        &mut self.values
    }

    fn attribute(&self, namespace: &str, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(namespace)?.get(name)
    }
}
