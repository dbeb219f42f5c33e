//! Report execution for reportflow.
//!
//! [`ReportingComponent`] drives one run of a report: it binds the caller's
//! inputs to the report parameters ([`binder`]), picks an output target
//! ([`resolver`]) and hands the bound report to the matching encoder or to a
//! printer.

pub mod binder;
pub mod builder;
pub mod component;
pub mod config;
pub mod error;
pub mod printing;
pub mod resolver;

pub use builder::ReportingComponentBuilder;
pub use component::{ComponentState, EMAIL_CONTENT_PATTERN, ReportSource, ReportingComponent};
pub use config::{ComponentSettings, ExecutionConfig, input_keys};
pub use error::{ParameterConversionError, ReportError, ValidationError};
pub use resolver::{ResolvedOutput, resolve};
