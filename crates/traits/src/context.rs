//! Parameter-resolution context.
//!
//! Defaults of report parameters may depend on host state (the current user,
//! locale, ...). That state is reachable only while a [`ParameterContext`]
//! is open. The orchestrator opens one immediately before binding and closes
//! it right after, on every exit path, through [`ScopedParameterContext`].

use log::debug;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Host-provided properties visible to parameter defaults.
pub trait ReportEnvironment: Send + Sync + Debug {
    fn property(&self, key: &str) -> Option<String>;
}

/// A [`ReportEnvironment`] backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    properties: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl ReportEnvironment for MapEnvironment {
    fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }
}

pub trait ParameterContext: Debug {
    fn open(&mut self);

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Looks up an environment property. Returns `None` while closed.
    fn environment_property(&self, key: &str) -> Option<String>;
}

/// The standard context: a view onto a [`ReportEnvironment`].
#[derive(Debug)]
pub struct DefaultParameterContext {
    environment: Arc<dyn ReportEnvironment>,
    open: bool,
}

impl DefaultParameterContext {
    pub fn new(environment: Arc<dyn ReportEnvironment>) -> Self {
        Self {
            environment,
            open: false,
        }
    }
}

impl ParameterContext for DefaultParameterContext {
    fn open(&mut self) {
        debug!("Opening parameter context.");
        self.open = true;
    }

    fn close(&mut self) {
        debug!("Closing parameter context.");
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn environment_property(&self, key: &str) -> Option<String> {
        if !self.open {
            return None;
        }
        self.environment.property(key)
    }
}

/// Keeps a context open for the lifetime of the guard.
pub struct ScopedParameterContext<'a> {
    inner: &'a mut dyn ParameterContext,
}

impl<'a> ScopedParameterContext<'a> {
    pub fn open(inner: &'a mut dyn ParameterContext) -> Self {
        inner.open();
        Self { inner }
    }

    pub fn context(&self) -> &dyn ParameterContext {
        &*self.inner
    }
}

impl Drop for ScopedParameterContext<'_> {
    fn drop(&mut self) {
        self.inner.close();
    }
}
