//! Report loading.

use crate::report::ReportModel;
use std::fmt::Debug;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Report definition not found: {0}")]
    NotFound(String),

    #[error("Failed to parse report definition '{source_name}': {message}")]
    Parse { source_name: String, message: String },

    #[error("Access to '{0}' denied")]
    AccessDenied(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The host session on whose behalf a report runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    user: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// A report definition stored in the host's solution repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResource {
    name: String,
    address: String,
}

impl RepositoryResource {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Turns a report definition source into a [`ReportModel`].
///
/// Exactly one of the three entry points is used per orchestration instance,
/// chosen by which source the caller supplied.
pub trait ReportLoader: Send + Sync + Debug {
    /// Parses an inline definition. `base_url` anchors relative resources
    /// referenced by the definition.
    fn load_from_stream(
        &self,
        definition: &[u8],
        base_url: Option<&Url>,
    ) -> Result<Box<dyn ReportModel>, LoadError>;

    fn load_from_repository(
        &self,
        address: &str,
        session: Option<&Session>,
    ) -> Result<Box<dyn ReportModel>, LoadError>;

    fn load_from_path(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<Box<dyn ReportModel>, LoadError>;
}
