use crate::definition::{DefinedReport, ReportDefinition};
use crate::store::{DefinitionStore, InMemoryDefinitionStore};
use log::{debug, info};
use reportflow_traits::{LoadError, ReportLoader, ReportModel, Session};
use std::sync::Arc;
use url::Url;

/// Loads JSON report definitions.
///
/// Repository addresses are looked up in `repository`, plain paths in
/// `filesystem`. Inline definitions are parsed directly.
#[derive(Debug, Clone)]
pub struct JsonReportLoader {
    repository: Arc<dyn DefinitionStore>,
    filesystem: Arc<dyn DefinitionStore>,
}

impl Default for JsonReportLoader {
    fn default() -> Self {
        Self {
            repository: Arc::new(InMemoryDefinitionStore::new()),
            filesystem: Arc::new(InMemoryDefinitionStore::new()),
        }
    }
}

impl JsonReportLoader {
    pub fn new(repository: Arc<dyn DefinitionStore>, filesystem: Arc<dyn DefinitionStore>) -> Self {
        Self {
            repository,
            filesystem,
        }
    }

    pub fn with_repository(mut self, repository: Arc<dyn DefinitionStore>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_filesystem(mut self, filesystem: Arc<dyn DefinitionStore>) -> Self {
        self.filesystem = filesystem;
        self
    }

    fn parse(
        &self,
        source_name: &str,
        bytes: &[u8],
        base_url: Option<Url>,
    ) -> Result<Box<dyn ReportModel>, LoadError> {
        reportflow_types::boot::ensure_initialized();
        let definition = ReportDefinition::from_slice(source_name, bytes)?;
        let report = DefinedReport::from_definition(definition)?.with_content_base(base_url);
        info!(
            "Loaded report '{}' from {} ({} parameters).",
            report.name(),
            source_name,
            report.parameter_definitions().len()
        );
        Ok(Box::new(report))
    }

    fn load_from_store(
        &self,
        store: &dyn DefinitionStore,
        address: &str,
        session: Option<&Session>,
    ) -> Result<Box<dyn ReportModel>, LoadError> {
        debug!(
            "Loading '{}' from {} for session {:?}.",
            address,
            store.name(),
            session.map(Session::id)
        );
        let bytes = store.load(address)?;
        self.parse(address, &bytes, None)
    }
}

impl ReportLoader for JsonReportLoader {
    fn load_from_stream(
        &self,
        definition: &[u8],
        base_url: Option<&Url>,
    ) -> Result<Box<dyn ReportModel>, LoadError> {
        self.parse("<stream>", definition, base_url.cloned())
    }

    fn load_from_repository(
        &self,
        address: &str,
        session: Option<&Session>,
    ) -> Result<Box<dyn ReportModel>, LoadError> {
        self.load_from_store(self.repository.as_ref(), address, session)
    }

    fn load_from_path(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<Box<dyn ReportModel>, LoadError> {
        self.load_from_store(self.filesystem.as_ref(), path, session)
    }
}
