//! JSON report definitions and a loader for them.
//!
//! This is the stock [`ReportLoader`](reportflow_traits::ReportLoader) for
//! hosts that keep definitions as JSON documents, either in memory or on
//! disk.

pub mod definition;
pub mod loader;
pub mod store;

pub use definition::{DefinedReport, ParameterSpec, ReportDefinition};
pub use loader::JsonReportLoader;
pub use store::{DefinitionStore, FilesystemDefinitionStore, InMemoryDefinitionStore};
