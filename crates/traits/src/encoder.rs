//! Output encoders and the target→encoder table.
//!
//! Each format (HTML, PDF, XLS, CSV, RTF, email) is rendered by one
//! [`ReportEncoder`]. The orchestrator resolves an [`OutputTarget`] and looks
//! the encoder up in an [`EncoderRegistry`]; it never knows how any format is
//! painted.

use crate::loader::Session;
use crate::report::ReportModel;
use crate::repository::{ContentRepository, RepositoryError};
use reportflow_types::{OutputTarget, SharedBytes};
use std::collections::HashMap;
use std::fmt::Debug;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Rendering failed: {0}")]
    Render(String),
}

/// Where HTML encoders put auxiliary content.
#[derive(Debug, Clone, Copy)]
pub enum ContentSink<'a> {
    /// Written next to the main output; `pattern` names the generated items.
    Plain { pattern: Option<&'a str> },
    /// Written into the host's content repository.
    Repository {
        session: Option<&'a Session>,
        repository: &'a dyn ContentRepository,
        pattern: Option<&'a str>,
    },
}

impl<'a> ContentSink<'a> {
    pub fn pattern(&self) -> Option<&'a str> {
        match self {
            ContentSink::Plain { pattern } | ContentSink::Repository { pattern, .. } => *pattern,
        }
    }

    pub fn uses_repository(&self) -> bool {
        matches!(self, ContentSink::Repository { .. })
    }
}

/// Everything an encoder receives for one rendition.
pub struct EncodeJob<'a> {
    pub report: &'a dyn ReportModel,
    pub output: &'a mut dyn Write,
    /// Pacing hint; 0 means unthrottled.
    pub yield_rate: u32,
    /// Logical page to emit; `None` renders all pages. Only paged encoders use it.
    pub accepted_page: Option<u32>,
    pub content: ContentSink<'a>,
    /// Template workbook for spreadsheet output.
    pub workbook_template: Option<&'a SharedBytes>,
}

impl<'a> EncodeJob<'a> {
    pub fn new(report: &'a dyn ReportModel, output: &'a mut dyn Write, yield_rate: u32) -> Self {
        Self {
            report,
            output,
            yield_rate,
            accepted_page: None,
            content: ContentSink::Plain { pattern: None },
            workbook_template: None,
        }
    }
}

/// What an encoder reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// The encoder ran; `true` on success.
    Finished(bool),
    /// A paged encoder ran and produced this many pages.
    Paged(u32),
}

impl EncodeOutcome {
    pub fn succeeded(self) -> bool {
        match self {
            EncodeOutcome::Finished(ok) => ok,
            EncodeOutcome::Paged(_) => true,
        }
    }
}

/// Renders a bound report into one output format.
///
/// One implementation is registered per [`OutputTarget`]. Encoders write to
/// the job's output stream and must not retain it past the call.
pub trait ReportEncoder: Send + Sync + Debug {
    /// Renders `job.report`. Paged encoders return [`EncodeOutcome::Paged`]
    /// with the number of pages produced.
    fn encode(&self, job: EncodeJob<'_>) -> Result<EncodeOutcome, EncoderError>;

    /// A human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Lookup table from output target to encoder.
#[derive(Debug, Clone, Default)]
pub struct EncoderRegistry {
    encoders: HashMap<OutputTarget, Arc<dyn ReportEncoder>>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        target: OutputTarget,
        encoder: Arc<dyn ReportEncoder>,
    ) -> Option<Arc<dyn ReportEncoder>> {
        self.encoders.insert(target, encoder)
    }

    pub fn with(mut self, target: OutputTarget, encoder: Arc<dyn ReportEncoder>) -> Self {
        self.register(target, encoder);
        self
    }

    pub fn get(&self, target: &OutputTarget) -> Option<&dyn ReportEncoder> {
        self.encoders.get(target).map(|e| e.as_ref())
    }

    pub fn contains(&self, target: &OutputTarget) -> bool {
        self.encoders.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl ReportEncoder for Named {
        fn encode(&self, _job: EncodeJob<'_>) -> Result<EncodeOutcome, EncoderError> {
            Ok(EncodeOutcome::Finished(true))
        }

        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn lookup_by_target() {
        let registry = EncoderRegistry::new()
            .with(OutputTarget::Pdf, Arc::new(Named("pdf")))
            .with(OutputTarget::Other("custom/x".into()), Arc::new(Named("custom")));
        assert_eq!(registry.get(&OutputTarget::Pdf).map(|e| e.name()), Some("pdf"));
        assert_eq!(
            registry.get(&OutputTarget::from_identifier("custom/x")).map(|e| e.name()),
            Some("custom")
        );
        assert!(registry.get(&OutputTarget::CsvStream).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn paged_outcome_counts_as_success() {
        assert!(EncodeOutcome::Paged(0).succeeded());
        assert!(!EncodeOutcome::Finished(false).succeeded());
    }

    #[test]
    fn sink_pattern() {
        let plain = ContentSink::Plain { pattern: Some("cid:{0}") };
        assert_eq!(plain.pattern(), Some("cid:{0}"));
        assert!(!plain.uses_repository());
    }
}
