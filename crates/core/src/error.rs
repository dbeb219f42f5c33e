//! Error types for validation, binding and execution.

use reportflow_traits::{
    ConversionError, EncoderError, LoadError, PrintError, RepositoryError,
};
use reportflow_types::ValueType;
use thiserror::Error;

/// Why a component cannot run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No report definition supplied (stream, repository resource or path)")]
    MissingReportSource,
    #[error("A session is required to load a report from the repository or a path")]
    MissingSession,
    #[error("No output stream supplied and printing not requested")]
    MissingOutputSink,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterConversionError {
    #[error("Parameter '{parameter}' could not be converted: {source}")]
    Conversion {
        parameter: String,
        #[source]
        source: ConversionError,
    },
    #[error("Parameter '{parameter}' expects {expected}, got a value of type {actual}")]
    NotAssignable {
        parameter: String,
        expected: ValueType,
        actual: String,
    },
}

impl ParameterConversionError {
    pub fn parameter(&self) -> &str {
        match self {
            ParameterConversionError::Conversion { parameter, .. }
            | ParameterConversionError::NotAssignable { parameter, .. } => parameter,
        }
    }

    pub(crate) fn not_assignable(parameter: &str, expected: ValueType, actual: &str) -> Self {
        ParameterConversionError::NotAssignable {
            parameter: parameter.to_string(),
            expected,
            actual: actual.to_string(),
        }
    }
}

/// Everything that can go wrong inside one execution.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Failed to load report: {0}")]
    Load(#[from] LoadError),
    #[error("Parameter binding failed: {0}")]
    Conversion(#[from] ParameterConversionError),
    #[error("Encoder failed: {0}")]
    Encoder(#[from] EncoderError),
    #[error("Printing failed: {0}")]
    Print(#[from] PrintError),
    #[error("Content repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Content repository mode requested but no repository is configured")]
    ContentRepositoryUnavailable,
    #[error("Component is in state {0}, expected Validated")]
    NotValidated(String),
    #[error("{collaborator} panicked: {message}")]
    Panicked {
        collaborator: &'static str,
        message: String,
    },
}
