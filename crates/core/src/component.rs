//! The report execution orchestrator.
//!
//! A [`ReportingComponent`] runs one report once: configure it through its
//! setters, call [`ReportingComponent::validate`], then
//! [`ReportingComponent::execute`]. Failures are logged and reported as
//! `false`; callers never see an error from `execute`.

use crate::binder;
use crate::builder::ReportingComponentBuilder;
use crate::config::{ComponentSettings, ExecutionConfig, input_keys, resource_url};
use crate::error::{ReportError, ValidationError};
use crate::printing::select_printer;
use crate::resolver::resolve;
use log::{debug, error, info, warn};
use reportflow_traits::{
    ContentRepository, ContentSink, ConverterRegistry, DefaultParameterContext, EncodeJob,
    EncodeOutcome, EncoderRegistry, LoadError, PrintError, PrinterDirectory, ReportEnvironment,
    ReportLoader, ReportModel, RepositoryResource, Session,
};
use reportflow_types::config::{CONTENT_HANDLER_KEY, RESOURCE_CONTENT_HANDLER_KEY};
use reportflow_types::{InputSet, OutputTarget, SharedBytes, Value};
use std::any::Any;
use std::fmt;
use std::io::Write;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Naming pattern for inline parts of email output.
pub const EMAIL_CONTENT_PATTERN: &str = "cid:{0}";

/// Lifecycle of a component. `Succeeded` and `Failed` are terminal; any
/// setter called on a `Validated` component sends it back to `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    Created,
    Validated,
    ParametersBound,
    Dispatched,
    Succeeded,
    Failed,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentState::Created => "Created",
            ComponentState::Validated => "Validated",
            ComponentState::ParametersBound => "ParametersBound",
            ComponentState::Dispatched => "Dispatched",
            ComponentState::Succeeded => "Succeeded",
            ComponentState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Where the report definition comes from, in precedence order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSource {
    Stream(SharedBytes),
    Resource(RepositoryResource),
    Path(String),
}

/// Runs one report: loads its definition, binds the inputs onto its
/// parameters, then prints it or hands it to the encoder for the resolved
/// output target.
///
/// Built through [`ReportingComponent::builder`].
pub struct ReportingComponent {
    loader: Arc<dyn ReportLoader>,
    encoders: EncoderRegistry,
    printers: Arc<dyn PrinterDirectory>,
    converters: ConverterRegistry,
    environment: Arc<dyn ReportEnvironment>,
    content_repository: Option<Arc<dyn ContentRepository>>,

    settings: ComponentSettings,
    inputs: InputSet,
    definition_stream: Option<SharedBytes>,
    definition_resource: Option<RepositoryResource>,
    definition_path: Option<String>,
    session: Option<Session>,
    output: Option<Box<dyn Write + Send>>,

    report: Option<Box<dyn ReportModel>>,
    config: Option<ExecutionConfig>,
    effective_output_type: Option<String>,
    state: ComponentState,
    page_count: i64,
}

impl fmt::Debug for ReportingComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportingComponent")
            .field("state", &self.state)
            .field("settings", &self.settings)
            .field("inputs", &self.inputs.len())
            .field("session", &self.session)
            .field("has_output", &self.output.is_some())
            .field("report", &self.report.as_ref().map(|r| r.name().to_string()))
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl ReportingComponent {
    pub fn builder() -> ReportingComponentBuilder {
        ReportingComponentBuilder::new()
    }

    pub(crate) fn from_parts(
        loader: Arc<dyn ReportLoader>,
        encoders: EncoderRegistry,
        printers: Arc<dyn PrinterDirectory>,
        converters: ConverterRegistry,
        environment: Arc<dyn ReportEnvironment>,
        content_repository: Option<Arc<dyn ContentRepository>>,
    ) -> Self {
        Self {
            loader,
            encoders,
            printers,
            converters,
            environment,
            content_repository,
            settings: ComponentSettings::default(),
            inputs: InputSet::new(),
            definition_stream: None,
            definition_resource: None,
            definition_path: None,
            session: None,
            output: None,
            report: None,
            config: None,
            effective_output_type: None,
            state: ComponentState::Created,
            page_count: -1,
        }
    }

    // Setters. Changing anything after validation requires validating again.

    pub fn set_output_type(&mut self, output_type: impl Into<String>) {
        self.settings.output_type = Some(output_type.into());
        self.invalidate();
    }

    pub fn set_output_target(&mut self, target: impl Into<OutputTarget>) {
        self.settings.output_target = Some(target.into());
        self.invalidate();
    }

    pub fn set_paginate(&mut self, paginate: bool) {
        self.settings.paginate = Some(paginate);
        self.invalidate();
    }

    pub fn set_accepted_page(&mut self, page: u32) {
        self.settings.accepted_page = Some(page);
        self.invalidate();
    }

    pub fn set_print(&mut self, print: bool) {
        self.settings.print = Some(print);
        self.invalidate();
    }

    /// `None` selects the platform default printer, overriding any
    /// `printer-name` input.
    pub fn set_printer_name(&mut self, name: Option<String>) {
        self.settings.printer_name = Some(name);
        self.invalidate();
    }

    pub fn set_use_content_repository(&mut self, use_repository: bool) {
        self.settings.use_content_repository = Some(use_repository);
        self.invalidate();
    }

    pub fn set_inputs(&mut self, inputs: InputSet) {
        self.inputs = inputs;
        self.invalidate();
    }

    pub fn set_output_stream<W: Write + Send + 'static>(&mut self, output: W) {
        self.output = Some(Box::new(output));
        self.invalidate();
    }

    /// Hands the output stream back, e.g. to flush or close it after a run.
    pub fn take_output_stream(&mut self) -> Option<Box<dyn Write + Send>> {
        self.output.take()
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
        self.invalidate();
    }

    pub fn set_report_definition_stream(&mut self, definition: impl Into<SharedBytes>) {
        self.definition_stream = Some(definition.into());
        self.invalidate();
    }

    pub fn set_report_definition(&mut self, resource: RepositoryResource) {
        self.definition_resource = Some(resource);
        self.invalidate();
    }

    pub fn set_report_definition_path(&mut self, path: impl Into<String>) {
        self.definition_path = Some(path.into());
        self.invalidate();
    }

    pub fn state(&self) -> ComponentState {
        self.state
    }

    /// Logical pages produced by the last run, or -1 if no paged output ran.
    pub fn page_count(&self) -> i64 {
        self.page_count
    }

    /// The effective output type. After execution this reflects a report
    /// that locks its preferred output type.
    pub fn mime_type(&self) -> Option<&str> {
        self.effective_output_type
            .as_deref()
            .or_else(|| self.config.as_ref().and_then(|c| c.output_type.as_deref()))
            .or(self.settings.output_type.as_deref())
    }

    /// The report source that will be loaded, if any.
    pub fn report_source(&self) -> Option<ReportSource> {
        if let Some(stream) = self.stream_source() {
            return Some(ReportSource::Stream(stream));
        }
        if let Some(resource) = &self.definition_resource {
            return Some(ReportSource::Resource(resource.clone()));
        }
        self.path_source().map(ReportSource::Path)
    }

    /// The parsed report, loading it on first access.
    pub fn report(&mut self) -> Result<&dyn ReportModel, LoadError> {
        self.load_report()?;
        match self.report.as_deref() {
            Some(report) => Ok(report),
            None => Err(LoadError::NotFound("report definition".to_string())),
        }
    }

    /// Checks that the component can run. Logs the reason and returns `false`
    /// if not.
    pub fn validate(&mut self) -> bool {
        match self.try_validate() {
            Ok(()) => true,
            Err(e) => {
                error!("Report validation failed: {}", e);
                false
            }
        }
    }

    pub fn try_validate(&mut self) -> Result<(), ValidationError> {
        if !matches!(self.state, ComponentState::Created | ComponentState::Validated) {
            return Err(ValidationError::InvalidConfig(format!(
                "component has already run (state {})",
                self.state
            )));
        }
        if self.report_source().is_none() {
            return Err(ValidationError::MissingReportSource);
        }
        if self.definition_resource.is_some() && self.path_source().is_some() && self.session.is_none()
        {
            return Err(ValidationError::MissingSession);
        }
        let config = ExecutionConfig::from_inputs(&self.settings, &self.inputs)?;
        if self.output.is_none() && !config.print {
            return Err(ValidationError::MissingOutputSink);
        }

        debug!("Validated execution config: {:?}", config);
        self.config = Some(config);
        self.state = ComponentState::Validated;
        info!("Report component validated.");
        Ok(())
    }

    /// Binds parameters and renders or prints the report.
    pub fn execute(&mut self) -> bool {
        if self.state != ComponentState::Validated {
            error!(
                "Cannot execute report component in state {}; call validate() first.",
                self.state
            );
            return false;
        }

        match self.run() {
            Ok(succeeded) => {
                self.state = if succeeded {
                    ComponentState::Succeeded
                } else {
                    ComponentState::Failed
                };
                info!("Report execution finished: {}.", self.state);
                succeeded
            }
            Err(e) => {
                error!("Report execution failed: {}", e);
                self.state = ComponentState::Failed;
                false
            }
        }
    }

    fn run(&mut self) -> Result<bool, ReportError> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| ReportError::NotValidated(self.state.to_string()))?;

        self.load_report()?;
        let report = self
            .report
            .as_deref_mut()
            .ok_or_else(|| LoadError::NotFound("report definition".to_string()))?;

        let mut context = DefaultParameterContext::new(Arc::clone(&self.environment));
        let bound = binder::bind_scoped(report, &self.inputs, &mut context, &self.converters)?;
        self.state = ComponentState::ParametersBound;
        info!("Bound {} parameters of report '{}'.", bound, report.name());

        let result = if config.print {
            self.print(&config)
        } else {
            self.render(&config)
        };
        self.state = ComponentState::Dispatched;
        result
    }

    fn print(&mut self, config: &ExecutionConfig) -> Result<bool, ReportError> {
        let report = self
            .report
            .as_deref()
            .ok_or_else(|| LoadError::NotFound("report definition".to_string()))?;
        let service = select_printer(self.printers.as_ref(), config.printer_name.as_deref())
            .ok_or(PrintError::NoPrintService)?;

        info!("Printing report '{}' on '{}'.", report.name(), service.name());
        let pages = guarded("printer", || self.printers.print(report, &service))??;
        self.page_count = i64::from(pages);
        Ok(true)
    }

    fn render(&mut self, config: &ExecutionConfig) -> Result<bool, ReportError> {
        let report = self
            .report
            .as_deref()
            .ok_or_else(|| LoadError::NotFound("report definition".to_string()))?;

        let resolved = resolve(report, config);
        self.effective_output_type = resolved.output_type;
        let target = resolved.target;

        let Some(encoder) = self.encoders.get(&target) else {
            warn!("No encoder registered for output target '{}'.", target);
            return Ok(false);
        };
        info!(
            "Rendering report '{}' as '{}' with {}.",
            report.name(),
            target,
            encoder.name()
        );

        let pattern = content_handler_pattern(config);
        let repository = if target.is_html() && config.use_content_repository {
            Some(
                self.content_repository
                    .as_deref()
                    .ok_or(ReportError::ContentRepositoryUnavailable)?,
            )
        } else {
            None
        };

        let output = self
            .output
            .as_deref_mut()
            .ok_or(ValidationError::MissingOutputSink)?;
        let mut job = EncodeJob::new(report, output, config.yield_rate);

        match &target {
            OutputTarget::HtmlPage | OutputTarget::HtmlStream => {
                job.content = match repository {
                    Some(repository) => ContentSink::Repository {
                        session: self.session.as_ref(),
                        repository,
                        pattern: pattern.as_deref(),
                    },
                    None => ContentSink::Plain {
                        pattern: pattern.as_deref(),
                    },
                };
                if target == OutputTarget::HtmlPage {
                    job.accepted_page = config.accepted_page;
                }
            }
            OutputTarget::ExcelFlow => job.workbook_template = config.workbook_template.as_ref(),
            OutputTarget::Email => {
                job.content = ContentSink::Plain {
                    pattern: Some(EMAIL_CONTENT_PATTERN),
                }
            }
            _ => {}
        }

        let outcome = guarded(encoder.name(), || encoder.encode(job))??;
        if target == OutputTarget::HtmlPage
            && let EncodeOutcome::Paged(pages) = outcome
        {
            self.page_count = i64::from(pages);
        }
        Ok(outcome.succeeded())
    }

    fn load_report(&mut self) -> Result<(), LoadError> {
        if self.report.is_some() {
            return Ok(());
        }
        let source = self
            .report_source()
            .ok_or_else(|| LoadError::NotFound("no report definition supplied".to_string()))?;

        let report = match &source {
            ReportSource::Stream(bytes) => {
                let base_url = resource_url(&self.inputs);
                self.loader.load_from_stream(bytes, base_url.as_ref())?
            }
            ReportSource::Resource(resource) => self
                .loader
                .load_from_repository(resource.address(), self.session.as_ref())?,
            ReportSource::Path(path) => self.loader.load_from_path(path, self.session.as_ref())?,
        };
        info!("Loaded report '{}'.", report.name());
        self.report = Some(report);
        Ok(())
    }

    fn stream_source(&self) -> Option<SharedBytes> {
        if let Some(stream) = &self.definition_stream {
            return Some(stream.clone());
        }
        match self.inputs.scalar(input_keys::REPORT_DEFINITION)? {
            Value::Bytes(bytes) => Some(bytes.clone()),
            Value::String(text) => Some(Arc::new(text.clone().into_bytes())),
            other => {
                warn!("Ignoring report definition input of unexpected type: {}", other);
                None
            }
        }
    }

    fn path_source(&self) -> Option<String> {
        self.definition_path.clone().or_else(|| {
            self.inputs
                .get(input_keys::REPORT_DEFINITION_PATH)
                .map(|v| v.to_canonical_string())
        })
    }

    fn invalidate(&mut self) {
        if self.state == ComponentState::Validated {
            debug!("Component configuration changed; validation must run again.");
            self.state = ComponentState::Created;
            self.config = None;
        }
    }
}

/// Runs a pluggable collaborator, turning a panic into a [`ReportError`].
fn guarded<T>(collaborator: &'static str, call: impl FnOnce() -> T) -> Result<T, ReportError> {
    catch_unwind(AssertUnwindSafe(call)).map_err(|payload| ReportError::Panicked {
        collaborator,
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn content_handler_pattern(config: &ExecutionConfig) -> Option<String> {
    if let Some(pattern) = &config.content_handler_pattern {
        return Some(pattern.clone());
    }
    let key = if config.use_content_repository {
        RESOURCE_CONTENT_HANDLER_KEY
    } else {
        CONTENT_HANDLER_KEY
    };
    reportflow_types::boot::global_config()
        .property(key)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportflow_source::JsonReportLoader;
    use reportflow_traits::{EncoderError, ReportEncoder};
    use reportflow_types::mime;
    use std::sync::Mutex;

    const DEFINITION: &[u8] = br#"{ "name": "orders", "parameters": [ { "name": "limit", "type": "integer" } ] }"#;

    #[derive(Debug, Default)]
    struct Recording {
        calls: Mutex<Vec<(Option<u32>, Option<String>)>>,
        pages: Option<u32>,
    }

    impl ReportEncoder for Recording {
        fn encode(&self, job: EncodeJob<'_>) -> Result<EncodeOutcome, EncoderError> {
            job.output.write_all(b"ok")?;
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((job.accepted_page, job.content.pattern().map(str::to_string)));
            }
            Ok(match self.pages {
                Some(pages) => EncodeOutcome::Paged(pages),
                None => EncodeOutcome::Finished(true),
            })
        }

        fn name(&self) -> &'static str {
            "Recording"
        }
    }

    fn component(target: OutputTarget, encoder: Arc<Recording>) -> ReportingComponent {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut component = ReportingComponent::builder()
            .with_loader(Arc::new(JsonReportLoader::default()))
            .with_encoder(target, encoder)
            .build()
            .unwrap();
        component.set_report_definition_stream(DEFINITION.to_vec());
        component.set_output_stream(Vec::new());
        component
    }

    #[test]
    fn execute_requires_validation() {
        let encoder = Arc::new(Recording::default());
        let mut component = component(OutputTarget::Pdf, encoder.clone());
        component.set_output_type(mime::PDF);
        assert!(!component.execute());
        assert_eq!(component.state(), ComponentState::Created);

        assert!(component.validate());
        assert!(component.execute());
        assert_eq!(component.state(), ComponentState::Succeeded);
        assert_eq!(component.page_count(), -1);
    }

    #[test]
    fn paged_html_records_page_count_and_accepted_page() {
        let encoder = Arc::new(Recording {
            pages: Some(4),
            ..Recording::default()
        });
        let mut component = component(OutputTarget::HtmlPage, encoder.clone());
        component.set_output_type(mime::HTML);
        component.set_paginate(true);
        component.set_accepted_page(2);

        assert!(component.validate());
        assert!(component.execute());
        assert_eq!(component.page_count(), 4);
        let calls = encoder.calls.lock().unwrap();
        assert_eq!(calls[0].0, Some(2));
        assert_eq!(calls[0].1.as_deref(), Some("getImage?image={0}"));
    }

    #[test]
    fn email_uses_content_id_pattern() {
        let encoder = Arc::new(Recording::default());
        let mut component = component(OutputTarget::Email, encoder.clone());
        component.set_output_type(mime::EMAIL);
        assert!(component.validate());
        assert!(component.execute());
        assert_eq!(encoder.calls.lock().unwrap()[0].1.as_deref(), Some(EMAIL_CONTENT_PATTERN));
    }

    #[test]
    fn repository_mode_without_repository_fails() {
        let encoder = Arc::new(Recording::default());
        let mut component = component(OutputTarget::HtmlStream, encoder.clone());
        component.set_output_type(mime::HTML);
        component.set_use_content_repository(true);
        assert!(component.validate());
        assert!(!component.execute());
        assert_eq!(component.state(), ComponentState::Failed);
        assert!(encoder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn bind_failure_fails_execution() {
        let encoder = Arc::new(Recording::default());
        let mut component = component(OutputTarget::Pdf, encoder.clone());
        component.set_output_type(mime::PDF);
        component.set_inputs(InputSet::new().with("limit", "lots"));
        assert!(component.validate());
        assert!(!component.execute());
        assert!(encoder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn setters_after_validation_require_revalidation() {
        let encoder = Arc::new(Recording::default());
        let mut component = component(OutputTarget::Pdf, encoder);
        assert!(component.validate());
        component.set_output_type(mime::PDF);
        assert_eq!(component.state(), ComponentState::Created);
    }

    #[test]
    fn report_is_loaded_once_and_exposes_definitions() {
        let encoder = Arc::new(Recording::default());
        let mut component = component(OutputTarget::Pdf, encoder);
        assert_eq!(component.report().unwrap().name(), "orders");
        assert_eq!(component.report().unwrap().parameter_definitions().len(), 1);
    }

    #[test]
    fn inline_definition_from_inputs() {
        let mut component = ReportingComponent::builder()
            .with_loader(Arc::new(JsonReportLoader::default()))
            .build()
            .unwrap();
        component.set_inputs(
            InputSet::new().with(input_keys::REPORT_DEFINITION, DEFINITION.to_vec()),
        );
        assert!(matches!(component.report_source(), Some(ReportSource::Stream(_))));
    }
}
