//! Rendering layer: a backend-neutral plan and the PDF and DOCX backends.

pub mod docx;
pub mod image;
pub mod pdf;

pub use docx::{DocxBackend, DocxConfig};
pub use pdf::{PdfBackend, PdfConfig};

use crate::error::Result;
use crate::layout::{self, ColumnPlan};
use crate::model::ResumeDocument;
use crate::resource::ResourceScope;
use crate::sanitize::strip_control_chars;
use crate::sections::{self, Header, SectionBlock};
use crate::style::{self, ResolvedStyle, Template};
use crate::theme::ThemeColors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Pdf,
    Docx,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Docx => "docx",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Format::Pdf => "application/pdf",
            Format::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Format::Pdf),
            "docx" | "word" => Ok(Format::Docx),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Document properties written to the output's metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub modified: Option<DateTime<Utc>>,
}

/// A metadata value with control characters stripped and whitespace trimmed.
fn info_text(text: &str) -> String {
    strip_control_chars(text).trim().to_string()
}

/// Everything a backend needs, computed once per render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub template: Template,
    pub style: ResolvedStyle,
    pub theme: ThemeColors,
    pub header: Header,
    pub sections: Vec<SectionBlock>,
    pub columns: ColumnPlan,
    pub info: DocumentInfo,
}

impl RenderPlan {
    /// Resolve the style and lay out the sections of `document`.
    ///
    /// `template_id` overrides the document's template when given.
    pub fn new(document: &ResumeDocument, template_id: Option<&str>) -> Self {
        let template =
            Template::from_id(template_id.unwrap_or(&document.metadata.template));
        let style = style::resolve::resolve_document(document, template_id);
        let theme = ThemeColors::new(&style);
        let header = Header::build(document, &style);
        let sections = sections::dispatch(document, &style);
        let columns = layout::distribute(&sections, &style.layout);

        let author = info_text(&document.basics.name);
        let title = match info_text(&document.metadata.title) {
            title if title.is_empty() => author.clone(),
            title => title,
        };
        let info = DocumentInfo {
            title,
            author,
            subject: info_text(&document.basics.label),
            modified: document.metadata.last_modified,
        };

        log::debug!(
            "planned {} sections in {} column(s) with template {}",
            sections.len(),
            columns.columns.len(),
            template.id()
        );

        Self {
            template,
            style,
            theme,
            header,
            sections,
            columns,
            info,
        }
    }

    /// Sections in master order, ignoring columns.
    pub fn sections_in_order(&self) -> impl Iterator<Item = &SectionBlock> {
        self.columns
            .master_order()
            .into_iter()
            .filter_map(|i| self.sections.get(i))
    }
}

/// A document writer for one output format.
pub trait Backend {
    fn format(&self) -> Format;

    /// Write `plan` as a complete document. Transient data goes into `scope`.
    fn render(&self, plan: &RenderPlan, scope: &mut ResourceScope) -> Result<Vec<u8>>;
}

/// The backend for `format` with default settings.
pub fn backend(format: Format) -> Box<dyn Backend> {
    match format {
        Format::Pdf => Box::new(PdfBackend::default()),
        Format::Docx => Box::new(DocxBackend::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("PDF".parse::<Format>(), Ok(Format::Pdf));
        assert_eq!("docx".parse::<Format>(), Ok(Format::Docx));
        assert!("odt".parse::<Format>().is_err());
        assert_eq!(Format::Docx.to_string(), "docx");
    }

    #[test]
    fn test_plan_falls_back_to_name_for_title() {
        let mut doc = ResumeDocument::new("r1", "", "classic");
        doc.basics.name = "Ada Lovelace".into();
        doc.basics.label = "Analyst".into();
        let plan = RenderPlan::new(&doc, None);
        assert_eq!(plan.info.title, "Ada Lovelace");
        assert_eq!(plan.info.author, "Ada Lovelace");
        assert_eq!(plan.info.subject, "Analyst");
    }

    #[test]
    fn test_backend_for_format() {
        assert_eq!(backend(Format::Pdf).format(), Format::Pdf);
        assert_eq!(backend(Format::Docx).format(), Format::Docx);
    }
}
