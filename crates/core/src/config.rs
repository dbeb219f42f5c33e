//! Per-run configuration.
//!
//! A component collects explicit settings through its setters and the raw
//! input map through `set_inputs`. At validation the two are folded into an
//! immutable [`ExecutionConfig`]; explicit settings win over inputs.

use crate::error::ValidationError;
use log::warn;
use reportflow_types::{InputSet, InputValue, OutputTarget, SharedBytes, Value};
use url::Url;

/// Names of the recognized inputs.
pub mod input_keys {
    /// Inline report definition (bytes or text).
    pub const REPORT_DEFINITION: &str = "report-definition";
    pub const REPORT_DEFINITION_PATH: &str = "report-definition-path";
    /// Base URL for resources referenced by an inline definition.
    pub const RESOURCE_URL: &str = "res-url";
    pub const USE_CONTENT_REPOSITORY: &str = "useContentRepository";
    pub const CONTENT_HANDLER_PATTERN: &str = "content-handler-pattern";
    pub const YIELD_RATE: &str = "yield-rate";
    pub const ACCEPTED_PAGE: &str = "accepted-page";
    pub const PAGINATE: &str = "paginate";
    pub const PRINT: &str = "print";
    pub const PRINTER_NAME: &str = "printer-name";
    pub const OUTPUT_TYPE: &str = "output-type";
    pub const OUTPUT_TARGET: &str = "output-target";
    /// Template workbook for spreadsheet output.
    pub const WORKBOOK: &str = "workbook";
}

/// Values set explicitly on a component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSettings {
    pub output_type: Option<String>,
    pub output_target: Option<OutputTarget>,
    pub paginate: Option<bool>,
    pub accepted_page: Option<u32>,
    pub print: Option<bool>,
    /// `Some(None)` explicitly selects the default printer.
    pub printer_name: Option<Option<String>>,
    pub use_content_repository: Option<bool>,
}

/// The settings and inputs of one run, folded together at validation.
///
/// Everything the orchestrator reads while executing comes from here; the raw
/// input map is consulted again only for parameter binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionConfig {
    pub output_type: Option<String>,
    pub output_target: Option<OutputTarget>,
    pub paginate: bool,
    /// Only read when `paginate` is set.
    pub accepted_page: Option<u32>,
    pub print: bool,
    pub printer_name: Option<String>,
    /// 0 means unthrottled.
    pub yield_rate: u32,
    pub use_content_repository: bool,
    pub content_handler_pattern: Option<String>,
    pub resource_url: Option<Url>,
    pub workbook_template: Option<SharedBytes>,
}

impl ExecutionConfig {
    pub fn from_inputs(
        settings: &ComponentSettings,
        inputs: &InputSet,
    ) -> Result<Self, ValidationError> {
        let paginate = settings
            .paginate
            .unwrap_or_else(|| flag(inputs, input_keys::PAGINATE));

        let accepted_page = match settings.accepted_page {
            Some(page) => Some(page),
            None if paginate => inputs
                .get(input_keys::ACCEPTED_PAGE)
                .map(parse_page)
                .transpose()?
                .flatten(),
            None => None,
        };

        Ok(Self {
            output_type: settings
                .output_type
                .clone()
                .or_else(|| text(inputs, input_keys::OUTPUT_TYPE)),
            output_target: settings.output_target.clone().or_else(|| {
                text(inputs, input_keys::OUTPUT_TARGET).map(|id| OutputTarget::from_identifier(&id))
            }),
            paginate,
            accepted_page,
            print: settings
                .print
                .unwrap_or_else(|| flag(inputs, input_keys::PRINT)),
            printer_name: match &settings.printer_name {
                Some(name) => name.clone(),
                None => text(inputs, input_keys::PRINTER_NAME),
            },
            yield_rate: yield_rate(inputs),
            use_content_repository: settings
                .use_content_repository
                .unwrap_or_else(|| flag(inputs, input_keys::USE_CONTENT_REPOSITORY)),
            content_handler_pattern: text(inputs, input_keys::CONTENT_HANDLER_PATTERN),
            resource_url: resource_url(inputs),
            workbook_template: workbook_template(inputs),
        })
    }
}

/// The `res-url` input as a URL. Unparseable values are ignored.
pub fn resource_url(inputs: &InputSet) -> Option<Url> {
    let raw = text(inputs, input_keys::RESOURCE_URL)?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Ignoring malformed resource URL '{}': {}", raw, e);
            None
        }
    }
}

fn flag(inputs: &InputSet, key: &str) -> bool {
    inputs.get(key).is_some_and(InputValue::is_true)
}

fn text(inputs: &InputSet, key: &str) -> Option<String> {
    inputs.get(key).map(InputValue::to_canonical_string)
}

/// Negative pages mean "no specific page".
fn parse_page(raw: &InputValue) -> Result<Option<u32>, ValidationError> {
    let text = raw.to_canonical_string();
    let invalid = |reason: String| {
        ValidationError::InvalidConfig(format!("accepted page '{}' is not a page number: {}", text, reason))
    };
    let page = text.trim().parse::<i64>().map_err(|e| invalid(e.to_string()))?;
    if page < 0 {
        return Ok(None);
    }
    u32::try_from(page).map(Some).map_err(|e| invalid(e.to_string()))
}

/// Only numeric inputs count; anything below 1 means unthrottled.
fn yield_rate(inputs: &InputSet) -> u32 {
    let rate = match inputs.scalar(input_keys::YIELD_RATE) {
        Some(Value::Integer(i)) => *i,
        Some(Value::Number(n)) => n.trunc() as i64,
        _ => 0,
    };
    if rate < 1 {
        0
    } else {
        u32::try_from(rate).unwrap_or(u32::MAX)
    }
}

fn workbook_template(inputs: &InputSet) -> Option<SharedBytes> {
    match inputs.scalar(input_keys::WORKBOOK)? {
        Value::Bytes(bytes) => Some(bytes.clone()),
        other => {
            warn!("Ignoring workbook input of unexpected type: {}", other);
            None
        }
    }
}
