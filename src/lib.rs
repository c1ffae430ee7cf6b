//! # resume-render
//!
//! A resume rendering engine: one structured document in, a paginated PDF or
//! a flow DOCX out, both from the same resolved style and section layout.
//!
//! ## Pipeline
//!
//! 1. **Resolve**: the document's saved style settings are merged over the
//!    defaults of its template into a total [`ResolvedStyle`].
//! 2. **Prepare**: the header is built, sections are dispatched in configured
//!    order (unknown or empty ones are skipped), and the visible sections are
//!    distributed into columns. The result is a [`RenderPlan`].
//! 3. **Render**: a [`Backend`] writes the plan as PDF or DOCX bytes. Any
//!    transient data it needs lives in a [`ResourceScope`] that is released
//!    when the render ends, however it ends.
//!
//! ## Quick Start
//!
//! ```rust
//! use resume_render::{render_docx, render_pdf, ResumeDocument};
//!
//! let mut doc = ResumeDocument::new("r1", "My Resume", "modern");
//! doc.basics.name = "Ada Lovelace".to_string();
//! doc.basics.summary = "Writes **programs** for the <u>analytical engine</u>.".to_string();
//!
//! let pdf = render_pdf(&doc).unwrap();
//! assert!(pdf.starts_with(b"%PDF-"));
//!
//! let docx = render_docx(&doc).unwrap();
//! assert!(docx.starts_with(b"PK"));
//! ```
//!
//! ## Inline Markup
//!
//! Free-text fields accept a small markup language:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `**text**` | bold |
//! | `*text*` | italic |
//! | `<u>text</u>` | underline |
//! | `[text](url)` | link |
//! | `<div align="center">...</div>` | field alignment |
//!
//! Anything malformed renders literally; parsing never fails.
//!
//! ## Templates
//!
//! `classic`, `modern`, `sidebar`, `minimal`, `executive` and `compact`.
//! Unknown template ids fall back to `classic`.

pub mod error;
pub mod layout;
pub mod markup;
pub mod model;
pub mod preview;
pub mod render;
pub mod resource;
pub mod sanitize;
pub mod sections;
pub mod style;
pub mod theme;

// WASM module (only with feature)
#[cfg(feature = "wasm")]
pub mod wasm;

// Convenience re-exports
pub use error::{DocumentError, Error, RenderError, Result};
pub use model::{ResumeDocument, SectionKind};
pub use preview::{Completion, PreviewSession, Ticket};
pub use render::{backend, Backend, Format, RenderPlan};
pub use resource::{ResourcePool, ResourceScope};
pub use style::{ResolvedStyle, StyleConfig, Template};

/// Resolve and lay out `document` with its own template.
pub fn prepare(document: &ResumeDocument) -> RenderPlan {
    RenderPlan::new(document, None)
}

/// Resolve and lay out `document`, overriding its template when `template_id`
/// is given.
pub fn prepare_with_template(document: &ResumeDocument, template_id: Option<&str>) -> RenderPlan {
    RenderPlan::new(document, template_id)
}

/// Render `document` in `format` with its own template.
///
/// Output is a pure function of the document: rendering twice gives
/// identical bytes.
pub fn render(document: &ResumeDocument, format: Format) -> Result<Vec<u8>> {
    render_with(document, None, format, &ResourcePool::new())
}

/// Render `document` as PDF.
pub fn render_pdf(document: &ResumeDocument) -> Result<Vec<u8>> {
    render(document, Format::Pdf)
}

/// Render `document` as DOCX.
pub fn render_docx(document: &ResumeDocument) -> Result<Vec<u8>> {
    render(document, Format::Docx)
}

/// Render with an optional template override, drawing transient resources
/// from `pool`.
///
/// The render's scope is dropped before this returns, so `pool.live()` is
/// back where it started on success and on failure alike.
pub fn render_with(
    document: &ResumeDocument,
    template_id: Option<&str>,
    format: Format,
    pool: &ResourcePool,
) -> Result<Vec<u8>> {
    let plan = prepare_with_template(document, template_id);
    let mut scope = pool.scope();
    let bytes = backend(format).render(&plan, &mut scope)?;
    log::info!(
        "rendered {} ({} template): {} bytes",
        format,
        plan.template.id(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SkillGroup, WorkEntry};

    fn sample() -> ResumeDocument {
        let mut doc = ResumeDocument::new("r1", "Resume", "classic");
        doc.basics.name = "Grace Hopper".to_string();
        doc.basics.label = "Rear Admiral".to_string();
        doc.basics.email = "grace@navy.mil".to_string();
        doc.basics.summary = "Invented the **first** compiler.".to_string();
        doc.work.push(WorkEntry {
            name: "US Navy".to_string(),
            position: "Computer Scientist".to_string(),
            start_date: "1943-12".to_string(),
            highlights: vec!["Led COBOL design".to_string()],
            ..WorkEntry::default()
        });
        doc.skills.push(SkillGroup {
            name: "Languages".to_string(),
            keywords: vec!["COBOL".to_string(), "FLOW-MATIC".to_string()],
            ..SkillGroup::default()
        });
        doc
    }

    #[test]
    fn test_render_both_formats() {
        let doc = sample();
        let pdf = render_pdf(&doc).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let docx = render_docx(&doc).unwrap();
        assert!(docx.starts_with(b"PK"));
    }

    #[test]
    fn test_template_override() {
        let doc = sample();
        let plan = prepare_with_template(&doc, Some("modern"));
        assert_eq!(plan.template, Template::Modern);
        assert_eq!(prepare(&doc).template, Template::Classic);
    }

    #[test]
    fn test_render_with_releases_resources() {
        let pool = ResourcePool::new();
        let doc = sample();
        render_with(&doc, Some("sidebar"), Format::Pdf, &pool).unwrap();
        render_with(&doc, Some("sidebar"), Format::Docx, &pool).unwrap();
        assert_eq!(pool.live(), 0);
    }
}
