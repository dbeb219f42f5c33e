//! Direct printing.

use crate::report::ReportModel;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrintError {
    #[error("No print service available")]
    NoPrintService,

    #[error("Printer '{printer}' rejected the job: {message}")]
    Rejected { printer: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A named printer known to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintService {
    name: String,
}

impl PrintService {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The platform's printer services.
pub trait PrinterDirectory: Send + Sync + Debug {
    /// Printers able to print paginated reports, in enumeration order.
    fn services(&self) -> Vec<PrintService>;

    fn default_service(&self) -> Option<PrintService>;

    /// Prints the bound report directly on `service`, returning the number of
    /// pages submitted.
    fn print(&self, report: &dyn ReportModel, service: &PrintService) -> Result<u32, PrintError>;
}

/// A directory for hosts without printers. Every print job fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPrinterDirectory;

impl PrinterDirectory for NullPrinterDirectory {
    fn services(&self) -> Vec<PrintService> {
        Vec::new()
    }

    fn default_service(&self) -> Option<PrintService> {
        None
    }

    fn print(&self, _report: &dyn ReportModel, _service: &PrintService) -> Result<u32, PrintError> {
        Err(PrintError::NoPrintService)
    }
}
