//! Contracts between the orchestrator and the collaborators it drives.
//!
//! Everything the orchestrator does not own lives behind a trait here: the
//! report model and its loader, the parameter-resolution context, the format
//! encoders, printers, the content repository and the value converters.
//! Simple in-memory implementations are provided where a host may not have
//! one of its own.

pub mod context;
pub mod converter;
pub mod encoder;
pub mod loader;
pub mod printer;
pub mod report;
pub mod repository;

pub use context::{
    DefaultParameterContext, MapEnvironment, ParameterContext, ReportEnvironment,
    ScopedParameterContext,
};
pub use converter::{ConversionError, ConverterRegistry, ValueConverter};
pub use encoder::{
    ContentSink, EncodeJob, EncodeOutcome, EncoderError, EncoderRegistry, ReportEncoder,
};
pub use loader::{LoadError, ReportLoader, RepositoryResource, Session};
pub use printer::{NullPrinterDirectory, PrintError, PrintService, PrinterDirectory};
pub use report::{
    DefaultValue, ParameterDefinition, ParameterValue, ParameterValues, ReportModel,
    core_attributes,
};
pub use repository::{ContentRepository, InMemoryContentRepository, RepositoryError};
