//! Where report definitions live.
//!
//! A [`DefinitionStore`] hands back the raw bytes of a definition. The
//! loader owns two of them: one standing in for the host's solution
//! repository and one for plain filesystem paths.

use reportflow_traits::LoadError;
use reportflow_types::SharedBytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

pub trait DefinitionStore: Send + Sync + Debug {
    fn load(&self, path: &str) -> Result<SharedBytes, LoadError>;

    fn exists(&self, path: &str) -> bool;

    /// A human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Definitions registered up front, keyed by address.
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    definitions: RwLock<HashMap<String, SharedBytes>>,
}

impl InMemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition. Returns an error if the lock is poisoned.
    pub fn add(&self, path: impl Into<String>, bytes: Vec<u8>) -> Result<(), LoadError> {
        let path = path.into();
        let mut definitions = self
            .definitions
            .write()
            .map_err(|_| LoadError::AccessDenied(path.clone()))?;
        definitions.insert(path, Arc::new(bytes));
        Ok(())
    }

    pub fn with(self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let path = path.into();
        if let Ok(mut definitions) = self.definitions.write() {
            definitions.insert(path, Arc::new(bytes));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DefinitionStore for InMemoryDefinitionStore {
    fn load(&self, path: &str) -> Result<SharedBytes, LoadError> {
        let definitions = self
            .definitions
            .read()
            .map_err(|_| LoadError::AccessDenied(path.to_string()))?;
        definitions
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.definitions
            .read()
            .map(|d| d.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryDefinitionStore"
    }
}

/// Definitions read from disk below a base directory.
///
/// Paths that escape the base directory, and absolute paths, are refused
/// with [`LoadError::AccessDenied`].
#[derive(Debug)]
pub struct FilesystemDefinitionStore {
    base_path: PathBuf,
    canonical_base: Option<PathBuf>,
}

impl FilesystemDefinitionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        let canonical = base.canonicalize().ok();
        Self {
            base_path: base,
            canonical_base: canonical,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        if Path::new(path).is_absolute() {
            return None;
        }
        if Path::new(path)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }

        let full_path = self.base_path.join(path);
        // Symlinks may still point outside the base.
        if let Ok(canonical) = full_path.canonicalize()
            && let Some(base) = &self.canonical_base
        {
            return canonical.starts_with(base).then_some(canonical);
        }
        Some(full_path)
    }
}

impl DefinitionStore for FilesystemDefinitionStore {
    fn load(&self, path: &str) -> Result<SharedBytes, LoadError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| LoadError::AccessDenied(path.to_string()))?;

        std::fs::read(&full_path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.to_string())
            } else {
                LoadError::Io(e)
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "FilesystemDefinitionStore"
    }
}
