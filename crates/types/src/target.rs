//! Output target identifiers.
//!
//! A target identifier names the encoder that renders a report. Callers
//! usually speak in mime types; [`OutputTarget::from_mime`] maps those onto
//! targets, and [`mime_for_extension`] maps file extensions (as used by the
//! report's preferred-output-type attribute) onto mime types.

use std::fmt;

/// Mime types understood by the target resolver.
pub mod mime {
    pub const HTML: &str = "text/html";
    /// Not a real mime type; an email rendition is addressed by this sentinel
    /// and it doubles as the email target identifier.
    pub const EMAIL: &str = "mime-message/text/html";
    pub const PDF: &str = "application/pdf";
    pub const XLS: &str = "application/vnd.ms-excel";
    pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    pub const RTF: &str = "application/rtf";
    pub const CSV: &str = "text/csv";
}

/// Looks up the mime type for a file extension given with its leading dot
/// (`".xls"`). Matching ignores ASCII case. `.eml` maps onto the email
/// sentinel rather than `message/rfc822`.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let ext = extension.strip_prefix('.')?;
    if ext.eq_ignore_ascii_case("eml") {
        return Some(mime::EMAIL);
    }
    mime_guess::from_ext(ext).first_raw()
}

/// The closed set of output targets, plus a passthrough for identifiers the
/// engine does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    CsvStream,
    HtmlPage,
    HtmlStream,
    Pdf,
    RtfFlow,
    ExcelFlow,
    Email,
    Other(String),
}

impl OutputTarget {
    pub const CSV_STREAM_ID: &'static str = "table/csv;stream";
    pub const HTML_PAGE_ID: &'static str = "table/html;page";
    pub const HTML_STREAM_ID: &'static str = "table/html;stream";
    pub const PDF_ID: &'static str = "pageable/pdf";
    pub const RTF_FLOW_ID: &'static str = "table/rtf;flow";
    pub const EXCEL_FLOW_ID: &'static str = "table/excel;flow";
    pub const EMAIL_ID: &'static str = mime::EMAIL;

    /// Parses a target identifier. Unknown identifiers are kept verbatim.
    pub fn from_identifier(id: &str) -> Self {
        match id {
            Self::CSV_STREAM_ID => OutputTarget::CsvStream,
            Self::HTML_PAGE_ID => OutputTarget::HtmlPage,
            Self::HTML_STREAM_ID => OutputTarget::HtmlStream,
            Self::PDF_ID => OutputTarget::Pdf,
            Self::RTF_FLOW_ID => OutputTarget::RtfFlow,
            Self::EXCEL_FLOW_ID => OutputTarget::ExcelFlow,
            Self::EMAIL_ID => OutputTarget::Email,
            other => OutputTarget::Other(other.to_string()),
        }
    }

    /// Maps a mime type onto its default target. HTML selects the paged or the
    /// streaming variant depending on `paginate`.
    pub fn from_mime(mime_type: &str, paginate: bool) -> Option<Self> {
        let target = match mime_type {
            mime::CSV => OutputTarget::CsvStream,
            mime::HTML if paginate => OutputTarget::HtmlPage,
            mime::HTML => OutputTarget::HtmlStream,
            mime::PDF => OutputTarget::Pdf,
            mime::RTF => OutputTarget::RtfFlow,
            mime::XLS => OutputTarget::ExcelFlow,
            mime::EMAIL => OutputTarget::Email,
            _ => return None,
        };
        Some(target)
    }

    pub fn as_str(&self) -> &str {
        match self {
            OutputTarget::CsvStream => Self::CSV_STREAM_ID,
            OutputTarget::HtmlPage => Self::HTML_PAGE_ID,
            OutputTarget::HtmlStream => Self::HTML_STREAM_ID,
            OutputTarget::Pdf => Self::PDF_ID,
            OutputTarget::RtfFlow => Self::RTF_FLOW_ID,
            OutputTarget::ExcelFlow => Self::EXCEL_FLOW_ID,
            OutputTarget::Email => Self::EMAIL_ID,
            OutputTarget::Other(id) => id,
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, OutputTarget::HtmlPage | OutputTarget::HtmlStream)
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OutputTarget {
    fn from(id: &str) -> Self {
        OutputTarget::from_identifier(id)
    }
}
