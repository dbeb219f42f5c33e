//! reportflow renders reports through pluggable encoders.
//!
//! The workspace is split into layers; this crate re-exports their public
//! API so hosts depend on one crate:
//!
//! - [`types`]: values, inputs, output targets, engine configuration
//! - [`traits`]: contracts for loaders, encoders, printers and repositories
//! - [`source`]: the JSON report loader
//! - [`core`]: parameter binding, target resolution and the orchestrator
//!
//! ```ignore
//! let mut component = ReportingComponent::builder()
//!     .with_loader(Arc::new(JsonReportLoader::default()))
//!     .with_encoder(OutputTarget::CsvStream, Arc::new(MyCsvEncoder))
//!     .build()?;
//! component.set_report_definition_path("sales.json");
//! component.set_output_type(mime::CSV);
//! component.set_output_stream(std::io::stdout());
//! if component.validate() && component.execute() {
//!     println!("done");
//! }
//! ```

pub use reportflow_core as core;
pub use reportflow_source as source;
pub use reportflow_traits as traits;
pub use reportflow_types as types;

pub use reportflow_core::{
    ComponentSettings, ComponentState, ExecutionConfig, ParameterConversionError, ReportError,
    ReportSource, ReportingComponent, ReportingComponentBuilder, ResolvedOutput,
    ValidationError, input_keys, resolve,
};
pub use reportflow_source::{
    DefinedReport, DefinitionStore, FilesystemDefinitionStore, InMemoryDefinitionStore,
    JsonReportLoader,
};
pub use reportflow_traits::{
    ContentRepository, ContentSink, ConverterRegistry, EncodeJob, EncodeOutcome, EncoderError,
    EncoderRegistry, InMemoryContentRepository, LoadError, MapEnvironment, NullPrinterDirectory,
    ParameterDefinition, ParameterValue, PrintError, PrintService, PrinterDirectory,
    ReportEncoder, ReportEnvironment, ReportLoader, ReportModel, RepositoryResource, Session,
};
pub use reportflow_types::{
    EngineConfig, InputSet, InputValue, OutputTarget, ScalarType, Value, ValueType, mime,
};
