//! Content repository handed to HTML encoders.
//!
//! When a host runs in content-repository mode, HTML encoders write their
//! auxiliary resources (images, stylesheets) into the repository instead of
//! inlining them, and name them with the content-handler pattern. The
//! orchestrator never looks inside; it only passes the handle along.

use reportflow_types::SharedBytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    #[error("Content item not found: {0}")]
    NotFound(String),

    #[error("Failed to store content item '{path}': {message}")]
    WriteFailed { path: String, message: String },
}

pub trait ContentRepository: Send + Sync + Debug {
    /// Stores `content` under `path`, replacing any previous item.
    fn put(&self, path: &str, content: Vec<u8>) -> Result<(), RepositoryError>;

    fn get(&self, path: &str) -> Result<SharedBytes, RepositoryError>;

    fn exists(&self, path: &str) -> bool;

    /// A human-readable name for logging.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    items: RwLock<HashMap<String, SharedBytes>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items. Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.items.read().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths of all stored items, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .items
            .read()
            .map(|i| i.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

impl ContentRepository for InMemoryContentRepository {
    fn put(&self, path: &str, content: Vec<u8>) -> Result<(), RepositoryError> {
        let mut items = self.items.write().map_err(|_| RepositoryError::WriteFailed {
            path: path.to_string(),
            message: "content store lock poisoned".to_string(),
        })?;
        items.insert(path.to_string(), Arc::new(content));
        Ok(())
    }

    fn get(&self, path: &str) -> Result<SharedBytes, RepositoryError> {
        let items = self
            .items
            .read()
            .map_err(|_| RepositoryError::NotFound(path.to_string()))?;
        items
            .get(path)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.items
            .read()
            .map(|i| i.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryContentRepository"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let repo = InMemoryContentRepository::new();
        repo.put("img/logo.png", vec![1, 2, 3]).unwrap();
        assert!(repo.exists("img/logo.png"));
        assert_eq!(*repo.get("img/logo.png").unwrap(), vec![1, 2, 3]);
        assert_eq!(repo.paths(), vec!["img/logo.png".to_string()]);
    }

    #[test]
    fn missing_item() {
        let repo = InMemoryContentRepository::new();
        assert!(repo.is_empty());
        assert!(matches!(repo.get("nope"), Err(RepositoryError::NotFound(p)) if p == "nope"));
    }
}
