use crate::component::ReportingComponent;
use crate::error::ReportError;
use reportflow_traits::{
    ContentRepository, ConverterRegistry, EncoderRegistry, MapEnvironment, NullPrinterDirectory,
    PrinterDirectory, ReportEncoder, ReportEnvironment, ReportLoader,
};
use reportflow_types::OutputTarget;
use std::sync::Arc;

/// A builder for creating a `ReportingComponent`.
///
/// Only the loader is required. Converters default to the built-in registry,
/// the environment to an empty one, and printing to a directory with no
/// printers.
#[derive(Default)]
pub struct ReportingComponentBuilder {
    loader: Option<Arc<dyn ReportLoader>>,
    encoders: EncoderRegistry,
    printers: Option<Arc<dyn PrinterDirectory>>,
    converters: Option<ConverterRegistry>,
    environment: Option<Arc<dyn ReportEnvironment>>,
    content_repository: Option<Arc<dyn ContentRepository>>,
}

impl ReportingComponentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, loader: Arc<dyn ReportLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Replaces the whole encoder table.
    pub fn with_encoders(mut self, encoders: EncoderRegistry) -> Self {
        self.encoders = encoders;
        self
    }

    pub fn with_encoder(mut self, target: OutputTarget, encoder: Arc<dyn ReportEncoder>) -> Self {
        self.encoders.register(target, encoder);
        self
    }

    pub fn with_printers(mut self, printers: Arc<dyn PrinterDirectory>) -> Self {
        self.printers = Some(printers);
        self
    }

    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = Some(converters);
        self
    }

    pub fn with_environment(mut self, environment: Arc<dyn ReportEnvironment>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_content_repository(mut self, repository: Arc<dyn ContentRepository>) -> Self {
        self.content_repository = Some(repository);
        self
    }

    pub fn build(self) -> Result<ReportingComponent, ReportError> {
        let loader = self.loader.ok_or_else(|| {
            ReportError::Config(
                "No report loader has been configured. Use `with_loader`.".to_string(),
            )
        })?;
        log::debug!(
            "Building reporting component with {} encoders.",
            self.encoders.len()
        );

        Ok(ReportingComponent::from_parts(
            loader,
            self.encoders,
            self.printers
                .unwrap_or_else(|| Arc::new(NullPrinterDirectory)),
            self.converters.unwrap_or_default(),
            self.environment
                .unwrap_or_else(|| Arc::new(MapEnvironment::new())),
            self.content_repository,
        ))
    }
}
