//! Chooses the output target for a run.

use crate::config::ExecutionConfig;
use log::debug;
use reportflow_traits::{ReportModel, core_attributes};
use reportflow_types::{OutputTarget, mime_for_extension};

/// The outcome of target resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub target: OutputTarget,
    /// Output type after a locked preferred type has been applied.
    pub output_type: Option<String>,
}

/// Resolves the output target for `report` under `config`.
///
/// First match wins:
/// 1. a report that locks its preferred output type replaces the output type;
/// 2. an explicit output target is returned as-is;
/// 3. the output type is mapped through the mime table;
/// 4. the report's preferred output type is used verbatim;
/// 5. streaming HTML.
pub fn resolve(report: &dyn ReportModel, config: &ExecutionConfig) -> ResolvedOutput {
    let preferred = preferred_output_type(report);
    let mut output_type = config.output_type.clone();

    if is_output_type_locked(report)
        && let Some(preferred) = &preferred
    {
        let locked = mime_for_extension(&format!(".{}", preferred))
            .map(str::to_string)
            .unwrap_or_else(|| preferred.clone());
        debug!("Report '{}' locks its output type to '{}'.", report.name(), locked);
        output_type = Some(locked);
    }

    let target = if let Some(target) = &config.output_target {
        target.clone()
    } else if let Some(target) = output_type
        .as_deref()
        .and_then(|mime| OutputTarget::from_mime(mime, config.paginate))
    {
        target
    } else if let Some(preferred) = &preferred {
        OutputTarget::from_identifier(preferred)
    } else {
        OutputTarget::HtmlStream
    };

    ResolvedOutput {
        target,
        output_type,
    }
}

fn is_output_type_locked(report: &dyn ReportModel) -> bool {
    matches!(
        report.attribute(
            core_attributes::NAMESPACE,
            core_attributes::LOCK_PREFERRED_OUTPUT_TYPE
        ),
        Some(serde_json::Value::Bool(true))
    )
}

fn preferred_output_type(report: &dyn ReportModel) -> Option<String> {
    match report.attribute(core_attributes::NAMESPACE, core_attributes::PREFERRED_OUTPUT_TYPE)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
