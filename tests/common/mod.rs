#![allow(dead_code)]

pub mod fixtures;

use reportflow::{
    EncodeJob, EncodeOutcome, EncoderError, OutputTarget, PrintError, PrintService,
    PrinterDirectory, ReportEncoder, ReportModel,
};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An output stream the test can still read after handing it to a component.
#[derive(Debug, Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::other("sink lock poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// What an encoder saw on one call.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeCall {
    pub report: String,
    pub yield_rate: u32,
    pub accepted_page: Option<u32>,
    pub pattern: Option<String>,
    pub uses_repository: bool,
    pub workbook: Option<Vec<u8>>,
}

/// Writes a fixed payload and records every call.
#[derive(Debug)]
pub struct StubEncoder {
    name: &'static str,
    payload: &'static [u8],
    outcome: EncodeOutcome,
    calls: Mutex<Vec<EncodeCall>>,
}

impl StubEncoder {
    pub fn new(name: &'static str, payload: &'static [u8]) -> Arc<Self> {
        Self::with_outcome(name, payload, EncodeOutcome::Finished(true))
    }

    pub fn with_outcome(
        name: &'static str,
        payload: &'static [u8],
        outcome: EncodeOutcome,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            payload,
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl ReportEncoder for StubEncoder {
    fn encode(&self, job: EncodeJob<'_>) -> Result<EncodeOutcome, EncoderError> {
        job.output.write_all(self.payload)?;
        let call = EncodeCall {
            report: job.report.name().to_string(),
            yield_rate: job.yield_rate,
            accepted_page: job.accepted_page,
            pattern: job.content.pattern().map(str::to_string),
            uses_repository: job.content.uses_repository(),
            workbook: job.workbook_template.map(|w| w.to_vec()),
        };
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        Ok(self.outcome)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// An encoder that always fails.
#[derive(Debug)]
pub struct FailingEncoder;

impl ReportEncoder for FailingEncoder {
    fn encode(&self, _job: EncodeJob<'_>) -> Result<EncodeOutcome, EncoderError> {
        Err(EncoderError::Render("boom".to_string()))
    }

    fn name(&self) -> &'static str {
        "FailingEncoder"
    }
}

/// An encoder that panics mid-render.
#[derive(Debug)]
pub struct PanickingEncoder;

impl ReportEncoder for PanickingEncoder {
    fn encode(&self, _job: EncodeJob<'_>) -> Result<EncodeOutcome, EncoderError> {
        panic!("encoder blew up");
    }

    fn name(&self) -> &'static str {
        "PanickingEncoder"
    }
}

/// A printer directory whose print call panics.
#[derive(Debug)]
pub struct PanickingPrinters;

impl PrinterDirectory for PanickingPrinters {
    fn services(&self) -> Vec<PrintService> {
        vec![PrintService::new("office")]
    }

    fn default_service(&self) -> Option<PrintService> {
        Some(PrintService::new("office"))
    }

    fn print(&self, _report: &dyn ReportModel, _service: &PrintService) -> Result<u32, PrintError> {
        panic!("spooler crashed");
    }
}

/// One stub encoder per built-in target, each writing its own payload.
pub struct StubEncoders {
    pub csv: Arc<StubEncoder>,
    pub html_page: Arc<StubEncoder>,
    pub html_stream: Arc<StubEncoder>,
    pub pdf: Arc<StubEncoder>,
    pub rtf: Arc<StubEncoder>,
    pub xls: Arc<StubEncoder>,
    pub email: Arc<StubEncoder>,
}

impl StubEncoders {
    pub fn new() -> Self {
        Self {
            csv: StubEncoder::new("csv", b"a,b\n1,2\n"),
            html_page: StubEncoder::with_outcome("html-page", b"<html>page</html>", EncodeOutcome::Paged(3)),
            html_stream: StubEncoder::new("html-stream", b"<html>stream</html>"),
            pdf: StubEncoder::new("pdf", b"%PDF-stub"),
            rtf: StubEncoder::new("rtf", b"{\\rtf1}"),
            xls: StubEncoder::new("xls", b"XLS"),
            email: StubEncoder::new("email", b"MIME-Version: 1.0"),
        }
    }

    pub fn registrations(&self) -> Vec<(OutputTarget, Arc<dyn ReportEncoder>)> {
        let encoders: [(OutputTarget, &Arc<StubEncoder>); 7] = [
            (OutputTarget::CsvStream, &self.csv),
            (OutputTarget::HtmlPage, &self.html_page),
            (OutputTarget::HtmlStream, &self.html_stream),
            (OutputTarget::Pdf, &self.pdf),
            (OutputTarget::RtfFlow, &self.rtf),
            (OutputTarget::ExcelFlow, &self.xls),
            (OutputTarget::Email, &self.email),
        ];
        encoders
            .into_iter()
            .map(|(target, encoder)| (target, Arc::clone(encoder) as Arc<dyn ReportEncoder>))
            .collect()
    }
}

/// A printer directory that records the jobs it receives.
#[derive(Debug)]
pub struct RecordingPrinters {
    services: Vec<String>,
    default: Option<String>,
    pages: u32,
    jobs: Mutex<Vec<(String, String)>>,
}

impl RecordingPrinters {
    pub fn new(services: &[&str], default: Option<&str>, pages: u32) -> Arc<Self> {
        Arc::new(Self {
            services: services.iter().map(|s| s.to_string()).collect(),
            default: default.map(str::to_string),
            pages,
            jobs: Mutex::new(Vec::new()),
        })
    }

    /// (report name, printer name) pairs, in submission order.
    pub fn jobs(&self) -> Vec<(String, String)> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

impl PrinterDirectory for RecordingPrinters {
    fn services(&self) -> Vec<PrintService> {
        self.services.iter().map(PrintService::new).collect()
    }

    fn default_service(&self) -> Option<PrintService> {
        self.default.as_ref().map(PrintService::new)
    }

    fn print(&self, report: &dyn ReportModel, service: &PrintService) -> Result<u32, PrintError> {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push((report.name().to_string(), service.name().to_string()));
        }
        Ok(self.pages)
    }
}
