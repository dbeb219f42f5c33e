use log::{debug, warn};
use reportflow_traits::{PrintService, PrinterDirectory};

/// Picks the printer for a direct print job.
///
/// An exact name match among the enumerated services wins. A name that
/// matches nothing falls back to the first enumerated service, and no name at
/// all selects the platform default.
pub fn select_printer(directory: &dyn PrinterDirectory, name: Option<&str>) -> Option<PrintService> {
    let name = name.filter(|n| !n.is_empty());
    let Some(name) = name else {
        debug!("No printer requested; using the platform default.");
        return directory.default_service();
    };

    let services = directory.services();
    if let Some(service) = services.iter().find(|s| s.name() == name) {
        return Some(service.clone());
    }

    match services.into_iter().next() {
        Some(first) => {
            warn!("Printer '{}' not found; falling back to '{}'.", name, first.name());
            Some(first)
        }
        None => {
            warn!("Printer '{}' not found and no printers enumerated; using the platform default.", name);
            directory.default_service()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportflow_traits::{NullPrinterDirectory, PrintError, ReportModel};

    #[derive(Debug)]
    struct Directory {
        services: Vec<&'static str>,
        default: Option<&'static str>,
    }

    impl PrinterDirectory for Directory {
        fn services(&self) -> Vec<PrintService> {
            self.services.iter().map(|s| PrintService::new(*s)).collect()
        }

        fn default_service(&self) -> Option<PrintService> {
            self.default.map(PrintService::new)
        }

        fn print(&self, _report: &dyn ReportModel, _service: &PrintService) -> Result<u32, PrintError> {
            Ok(1)
        }
    }

    fn directory() -> Directory {
        Directory {
            services: vec!["alpha", "beta"],
            default: Some("beta"),
        }
    }

    #[test]
    fn exact_match() {
        assert_eq!(select_printer(&directory(), Some("beta")), Some(PrintService::new("beta")));
    }

    #[test]
    fn unknown_name_falls_back_to_first_service() {
        assert_eq!(
            select_printer(&directory(), Some("nonexistent")),
            Some(PrintService::new("alpha"))
        );
    }

    #[test]
    fn no_name_uses_default() {
        assert_eq!(select_printer(&directory(), None), Some(PrintService::new("beta")));
        assert_eq!(select_printer(&directory(), Some("")), Some(PrintService::new("beta")));
    }

    #[test]
    fn nothing_available() {
        assert_eq!(select_printer(&NullPrinterDirectory, Some("any")), None);
        assert_eq!(select_printer(&NullPrinterDirectory, None), None);
    }
}
