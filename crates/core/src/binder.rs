//! Binds untyped inputs onto a report's typed parameter slots.

use crate::error::ParameterConversionError;
use log::debug;
use reportflow_traits::{
    ConversionError, ConverterRegistry, ParameterContext, ParameterDefinition, ParameterValue,
    ReportModel, ScopedParameterContext,
};
use reportflow_types::{InputSet, InputValue, ScalarType, TableModel, Value, ValueType};

/// Converts `raw` into a value of type `target`.
///
/// Returns `Ok(None)` when the canonical string form of `raw` is empty. If no
/// converter is registered for `target`, `raw` is returned unchanged.
pub fn convert(
    target: ScalarType,
    raw: &Value,
    converters: &ConverterRegistry,
) -> Result<Option<Value>, ConversionError> {
    if raw.satisfies(target) {
        return Ok(Some(raw.clone()));
    }
    if let (ScalarType::Table, Value::ResultSet(result_set)) = (target, raw) {
        return Ok(Some(Value::Table(TableModel::from_result_set(result_set.clone()))));
    }

    let text = raw.to_canonical_string();
    if text.is_empty() {
        return Ok(None);
    }

    if target == ScalarType::Date
        && let Ok(millis) = text.trim().parse::<i64>()
        && let Some(date) = Value::date_from_millis(millis)
    {
        return Ok(Some(date));
    }

    match converters.converter(target) {
        Some(converter) => converter.to_value(&text).map(Some),
        None => Ok(Some(raw.clone())),
    }
}

/// Binds every declared parameter of `report` that has an input or a default.
///
/// Parameters are visited in declaration order. The first failure aborts the
/// bind; parameters bound before it keep their new values. Returns the number
/// of parameters written.
pub fn bind(
    report: &mut dyn ReportModel,
    inputs: &InputSet,
    context: &dyn ParameterContext,
    converters: &ConverterRegistry,
) -> Result<usize, ParameterConversionError> {
    let definitions: Vec<ParameterDefinition> = report.parameter_definitions().to_vec();
    let mut bound = 0;

    for definition in &definitions {
        let name = definition.name();
        let raw = match inputs.get(name) {
            Some(value) => Some(value.clone()),
            None => definition.default_value(context),
        };
        let Some(raw) = raw else {
            debug!("Parameter '{}' has no input and no default; leaving it unbound.", name);
            continue;
        };

        let value = bind_one(definition, normalize(definition, raw), converters)?;
        debug!("Binding parameter '{}' ({}) to {:?}.", name, definition.value_type(), value);
        report.parameter_values_mut().put(name, value);
        bound += 1;
    }

    Ok(bound)
}

/// Runs [`bind`] with `context` open, closing it again on every exit path.
pub fn bind_scoped(
    report: &mut dyn ReportModel,
    inputs: &InputSet,
    context: &mut dyn ParameterContext,
    converters: &ConverterRegistry,
) -> Result<usize, ParameterConversionError> {
    let scope = ScopedParameterContext::open(context);
    bind(report, inputs, scope.context(), converters)
}

fn normalize(definition: &ParameterDefinition, raw: InputValue) -> InputValue {
    match raw {
        InputValue::Scalar(value)
            if definition.is_multi_select() || definition.value_type().is_array() =>
        {
            InputValue::Array(vec![value])
        }
        other => other,
    }
}

fn bind_one(
    definition: &ParameterDefinition,
    raw: InputValue,
    converters: &ConverterRegistry,
) -> Result<ParameterValue, ParameterConversionError> {
    let component = definition.value_type().component();
    match raw {
        InputValue::Scalar(value) => {
            let converted = convert_checked(definition, component, &value, converters)?;
            Ok(ParameterValue::Scalar(converted))
        }
        InputValue::Array(items) => {
            let converted = items
                .iter()
                .map(|item| convert_checked(definition, component, item, converters))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParameterValue::Array(converted))
        }
    }
}

fn convert_checked(
    definition: &ParameterDefinition,
    target: ScalarType,
    raw: &Value,
    converters: &ConverterRegistry,
) -> Result<Option<Value>, ParameterConversionError> {
    let converted = convert(target, raw, converters).map_err(|source| {
        ParameterConversionError::Conversion {
            parameter: definition.name().to_string(),
            source,
        }
    })?;

    match &converted {
        Some(value) if !value.satisfies(target) => Err(ParameterConversionError::not_assignable(
            definition.name(),
            expected_type(definition, target),
            runtime_type_name(value),
        )),
        _ => Ok(converted),
    }
}

fn expected_type(definition: &ParameterDefinition, component: ScalarType) -> ValueType {
    if definition.value_type().is_array() {
        ValueType::Array(component)
    } else {
        ValueType::Scalar(component)
    }
}

fn runtime_type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Number(_) => "number",
        Value::Boolean(_) => "boolean",
        Value::Date(_) => "date",
        Value::Table(_) => "table",
        Value::ResultSet(_) => "result-set",
        Value::Bytes(_) => "bytes",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportflow_source::DefinedReport;
    use reportflow_traits::{
        DefaultParameterContext, DefaultValue, MapEnvironment, ReportEnvironment,
    };
    use reportflow_types::ResultSet;
    use std::sync::Arc;

    fn report() -> DefinedReport {
        DefinedReport::new("test")
            .with_parameter(ParameterDefinition::new("name", ValueType::Scalar(ScalarType::String)))
            .with_parameter(ParameterDefinition::new("count", ValueType::Scalar(ScalarType::Integer)))
            .with_parameter(
                ParameterDefinition::new("region", ValueType::Scalar(ScalarType::String))
                    .with_multi_select(true),
            )
            .with_parameter(ParameterDefinition::new("ids", ValueType::Array(ScalarType::Integer)))
            .with_parameter(ParameterDefinition::new("since", ValueType::Scalar(ScalarType::Date)))
    }

    fn open_context(environment: impl ReportEnvironment + 'static) -> DefaultParameterContext {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut context = DefaultParameterContext::new(Arc::new(environment));
        context.open();
        context
    }

    fn bind_inputs(report: &mut DefinedReport, inputs: InputSet) -> Result<usize, ParameterConversionError> {
        let context = open_context(MapEnvironment::new());
        bind(report, &inputs, &context, &ConverterRegistry::default())
    }

    #[test]
    fn absent_input_without_default_stays_unbound() {
        let mut report = report();
        let bound = bind_inputs(&mut report, InputSet::new().with("name", "x")).unwrap();
        assert_eq!(bound, 1);
        assert!(report.parameter_values().contains("name"));
        assert!(!report.parameter_values().contains("count"));
        assert!(!report.parameter_values().contains("ids"));
    }

    #[test]
    fn multi_select_scalar_is_wrapped() {
        let mut report = report();
        bind_inputs(&mut report, InputSet::new().with("region", "north")).unwrap();
        assert_eq!(
            report.parameter_values().get("region"),
            Some(&ParameterValue::Array(vec![Some(Value::from("north"))]))
        );
    }

    #[test]
    fn array_input_is_converted_element_wise() {
        let mut report = report();
        let ids = InputValue::Array(vec![Value::from("1"), Value::from(2), Value::from("")]);
        bind_inputs(&mut report, InputSet::new().with("ids", ids)).unwrap();
        assert_eq!(
            report.parameter_values().get("ids"),
            Some(&ParameterValue::Array(vec![
                Some(Value::Integer(1)),
                Some(Value::Integer(2)),
                None
            ]))
        );
    }

    #[test]
    fn array_element_failure_aborts_parameter() {
        let mut report = report();
        let ids = InputValue::Array(vec![Value::from("1"), Value::from("two")]);
        let err = bind_inputs(&mut report, InputSet::new().with("ids", ids)).unwrap_err();
        assert_eq!(err.parameter(), "ids");
        assert!(!report.parameter_values().contains("ids"));
    }

    #[test]
    fn empty_string_becomes_null() {
        let mut report = report();
        bind_inputs(&mut report, InputSet::new().with("count", "")).unwrap();
        let value = report.parameter_values().get("count").unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn bad_integer_names_the_parameter() {
        let mut report = report();
        let err = bind_inputs(&mut report, InputSet::new().with("count", "ten")).unwrap_err();
        assert!(matches!(
            err,
            ParameterConversionError::Conversion { ref parameter, ref source }
                if parameter == "count" && source.target == ScalarType::Integer
        ));
    }

    #[test]
    fn dates_accept_epoch_millis_first() {
        let mut report = report();
        bind_inputs(&mut report, InputSet::new().with("since", 86_400_000i64)).unwrap();
        let since = report.parameter_values().get("since").and_then(|v| v.as_scalar());
        assert_eq!(since, Value::date_from_millis(86_400_000).as_ref());

        bind_inputs(&mut report, InputSet::new().with("since", "1970-01-02")).unwrap();
        let since = report.parameter_values().get("since").and_then(|v| v.as_scalar());
        assert_eq!(since, Value::date_from_millis(86_400_000).as_ref());
    }

    #[test]
    fn defaults_resolve_through_open_context() {
        let mut report = DefinedReport::new("r").with_parameter(
            ParameterDefinition::new("owner", ValueType::Scalar(ScalarType::String))
                .with_default(DefaultValue::Environment("user".into())),
        );
        let context = open_context(MapEnvironment::new().with("user", "alice"));
        bind(&mut report, &InputSet::new(), &context, &ConverterRegistry::default()).unwrap();
        assert_eq!(
            report.parameter_values().get("owner").and_then(|v| v.as_scalar()),
            Some(&Value::from("alice"))
        );
    }

    #[test]
    fn null_elements_of_array_default_keep_their_position() {
        let default = InputValue::from_json(&serde_json::json!([1, null, 2])).unwrap();
        let mut report = DefinedReport::new("r").with_parameter(
            ParameterDefinition::new("ids", ValueType::Array(ScalarType::Integer))
                .with_default(DefaultValue::Fixed(default)),
        );
        let context = open_context(MapEnvironment::new());
        bind(&mut report, &InputSet::new(), &context, &ConverterRegistry::default()).unwrap();
        assert_eq!(
            report.parameter_values().get("ids"),
            Some(&ParameterValue::Array(vec![
                Some(Value::Integer(1)),
                None,
                Some(Value::Integer(2))
            ]))
        );
    }

    #[test]
    fn rebinding_overwrites_previous_value() {
        let mut report = report();
        bind_inputs(&mut report, InputSet::new().with("count", 1)).unwrap();
        bind_inputs(&mut report, InputSet::new().with("count", 2)).unwrap();
        assert_eq!(
            report.parameter_values().get("count").and_then(|v| v.as_scalar()),
            Some(&Value::Integer(2))
        );
    }

    #[test]
    fn result_set_is_wrapped_for_table_slots() {
        let rs = ResultSet::new(vec!["a".into()], vec![vec![Value::from(1)]]);
        let converted = convert(ScalarType::Table, &Value::from(rs), &ConverterRegistry::default())
            .unwrap()
            .unwrap();
        assert!(matches!(converted, Value::Table(ref t) if t.row_count() == 1));
    }

    #[test]
    fn missing_converter_returns_raw_but_bind_rejects_it() {
        let converters = ConverterRegistry::empty();
        let raw = Value::from("42");
        assert_eq!(convert(ScalarType::Integer, &raw, &converters).unwrap(), Some(raw));

        let mut report = report();
        let context = open_context(MapEnvironment::new());
        let err = bind(
            &mut report,
            &InputSet::new().with("count", "42"),
            &context,
            &converters,
        )
        .unwrap_err();
        assert!(matches!(err, ParameterConversionError::NotAssignable { .. }));
    }

    #[test]
    fn scoped_bind_closes_context_on_failure() {
        #[derive(Debug, Default)]
        struct Tracking {
            open: bool,
            closes: usize,
        }

        impl ParameterContext for Tracking {
            fn open(&mut self) {
                self.open = true;
            }

            fn close(&mut self) {
                self.open = false;
                self.closes += 1;
            }

            fn is_open(&self) -> bool {
                self.open
            }

            fn environment_property(&self, _key: &str) -> Option<String> {
                None
            }
        }

        let mut report = report();
        let mut context = Tracking::default();
        let result = bind_scoped(
            &mut report,
            &InputSet::new().with("count", "ten"),
            &mut context,
            &ConverterRegistry::default(),
        );
        assert!(result.is_err());
        assert!(!context.is_open());
        assert_eq!(context.closes, 1);
    }
}
