//! End-to-end tests through the public API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pretty_assertions::assert_eq;
use resume_render::layout::ColumnRole;
use resume_render::model::{EducationEntry, SkillGroup, WorkEntry};
use resume_render::{
    prepare, render, render_docx, render_pdf, render_with, Completion, Error, Format,
    PreviewSession, RenderError, RenderPlan, ResourcePool, ResumeDocument, SectionKind,
    StyleConfig, Template,
};
use std::io::{Cursor, Read};
use std::time::Duration;

fn resume(template: &str) -> ResumeDocument {
    let mut doc = ResumeDocument::new("r-1", "Resume", template);
    doc.basics.name = "Katherine Johnson".to_string();
    doc.basics.label = "Research Mathematician".to_string();
    doc.basics.email = "kj@example.org".to_string();
    doc.basics.url = "https://example.org/kj".to_string();
    doc.basics.summary = "Computed **trajectories** for [Mercury](https://example.org/mercury).".to_string();
    doc.work.push(WorkEntry {
        name: "Langley Research Center".to_string(),
        position: "Aerospace Technologist".to_string(),
        start_date: "1953-06".to_string(),
        end_date: "1986-08".to_string(),
        highlights: vec![
            "Verified orbital equations".to_string(),
            "Co-authored 26 reports".to_string(),
        ],
        ..WorkEntry::default()
    });
    doc.education.push(EducationEntry {
        institution: "West Virginia State College".to_string(),
        area: "Mathematics".to_string(),
        study_type: "BSc".to_string(),
        end_date: "1937".to_string(),
        ..EducationEntry::default()
    });
    doc.skills.push(SkillGroup {
        name: "Analysis".to_string(),
        keywords: vec!["Analytic geometry".to_string(), "Orbital mechanics".to_string()],
        ..SkillGroup::default()
    });
    doc
}

fn kinds(plan: &RenderPlan, indices: &[usize]) -> Vec<SectionKind> {
    indices.iter().map(|&i| plan.sections[i].kind).collect()
}

fn jpeg_data_url() -> String {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00];
    jpeg.extend_from_slice(&[
        0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x02, 0x00, 0x03, 0x03, 0x01, 0x11, 0x00, 0x02, 0x11,
        0x01, 0x03, 0x11, 0x01,
    ]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

fn docx_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn test_unknown_and_empty_sections_are_skipped() {
    let mut doc = resume("classic");
    doc.skills.clear();
    doc.basics.summary.clear();
    doc.metadata.style.section_order = Some(vec![
        "work".to_string(),
        "skills".to_string(),
        "unknownid".to_string(),
        "education".to_string(),
    ]);

    let plan = prepare(&doc);
    let order: Vec<SectionKind> = plan.sections.iter().map(|s| s.kind).collect();
    assert_eq!(order, vec![SectionKind::Work, SectionKind::Education]);
}

#[test]
fn test_columns_follow_master_order() {
    let mut doc = resume("classic");
    let style = &mut doc.metadata.style;
    style.columns = Some(2);
    style.primary_sections = Some(vec![SectionKind::Summary, SectionKind::Work]);
    style.secondary_sections = Some(vec![SectionKind::Skills, SectionKind::Education]);
    style.section_order = Some(
        ["summary", "education", "work", "skills"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );

    let plan = prepare(&doc);
    assert!(plan.columns.is_multi_column());

    let column = |role: ColumnRole| {
        plan.columns
            .columns
            .iter()
            .find(|c| c.role == role)
            .map(|c| kinds(&plan, &c.sections))
            .unwrap()
    };
    assert_eq!(
        column(ColumnRole::Primary),
        vec![SectionKind::Summary, SectionKind::Work]
    );
    assert_eq!(
        column(ColumnRole::Secondary),
        vec![SectionKind::Education, SectionKind::Skills]
    );
}

#[test]
fn test_freshest_preview_wins() {
    let session: PreviewSession<&str, &str> = PreviewSession::new(Duration::from_millis(300));
    let first = session.request("v1", Duration::ZERO);
    let second = session.request("v2", Duration::from_millis(10));

    assert_eq!(session.complete(second, "render 2"), Completion::Applied);
    assert_eq!(session.complete(first, "render 1"), Completion::Stale);
    assert_eq!(session.displayed(), Some("render 2"));
}

#[test]
fn test_both_backends_emit_documents() {
    for template in Template::all() {
        let doc = resume(template.id());

        let pdf = render_pdf(&doc).unwrap();
        assert!(pdf.starts_with(b"%PDF-"), "{} pdf header", template.id());

        let docx = render_docx(&doc).unwrap();
        let xml = docx_part(&docx, "word/document.xml");
        assert!(
            xml.to_lowercase().contains("katherine johnson"),
            "{} docx name",
            template.id()
        );
        assert!(xml.contains("Langley Research Center"));
    }
}

#[test]
fn test_rendering_is_deterministic() {
    let mut doc = resume("modern");
    doc.basics.image = jpeg_data_url();

    for format in [Format::Pdf, Format::Docx] {
        let first = render(&doc, format).unwrap();
        let second = render(&doc, format).unwrap();
        assert!(first == second, "{format} output differs between renders");
    }
}

#[test]
fn test_docx_ignores_column_count() {
    let mut doc = resume("sidebar");
    doc.metadata.style.section_order = Some(
        ["education", "work", "skills", "summary"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    let plan = prepare(&doc);
    assert!(plan.columns.is_multi_column());

    let xml = docx_part(&render_docx(&doc).unwrap(), "word/document.xml");
    let education = xml.find("West Virginia State College").unwrap();
    let work = xml.find("Langley Research Center").unwrap();
    let skills = xml.find("Orbital mechanics").unwrap();
    let summary = xml.find("trajectories").unwrap();
    assert!(education < work && work < skills && skills < summary);
}

#[test]
fn test_resources_released_after_success() {
    let pool = ResourcePool::new();
    let mut doc = resume("modern");
    doc.basics.image = jpeg_data_url();

    let pdf = render_with(&doc, None, Format::Pdf, &pool).unwrap();
    assert!(pdf.windows(10).any(|w| w == b"/DCTDecode"));
    assert_eq!(pool.live(), 0);

    let docx = render_with(&doc, None, Format::Docx, &pool).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    assert!(archive.by_name("word/media/image1.jpeg").is_ok());
    assert_eq!(pool.live(), 0);
}

#[test]
fn test_resources_released_after_failure() {
    let pool = ResourcePool::new();
    let mut doc = resume("modern");
    doc.basics.image = "data:image/png;base64,not*base64".to_string();

    for format in [Format::Pdf, Format::Docx] {
        let err = render_with(&doc, None, format, &pool).unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::Image(_))), "{err}");
        assert_eq!(pool.live(), 0);
    }
}

#[test]
fn test_lenient_json_input() {
    let json = r##"{
        "metadata": { "template": "no-such-template", "accentColor": "#zzz" },
        "basics": { "name": "Dorothy Vaughan" },
        "work": [
            { "name": "NACA", "position": "Supervisor", "startDate": 1949 },
            "not an entry",
            { "name": "NASA", "highlights": ["FORTRAN", 7] }
        ]
    }"##;
    let doc = ResumeDocument::from_json(json).unwrap();
    assert_eq!(doc.work.len(), 2);
    assert_eq!(doc.metadata.accent_color, None);

    let plan = prepare(&doc);
    assert_eq!(plan.template, Template::Classic);
    assert!(render_pdf(&doc).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn test_template_override_matches_document_template() {
    let doc = resume("classic");
    let mut executive = doc.clone();
    executive.metadata.template = "executive".to_string();

    let overridden = render_with(&doc, Some("executive"), Format::Docx, &ResourcePool::new()).unwrap();
    assert!(overridden == render_docx(&executive).unwrap());
}

#[test]
fn test_saved_style_from_toml() {
    let mut doc = resume("classic");
    doc.metadata.style = StyleConfig::from_toml(
        r##"
accentColor = "#884422"
columns = 2
sectionOrder = ["skills", "work"]
"##,
    )
    .unwrap();

    let plan = prepare(&doc);
    assert_eq!(plan.style.theme.accent_color.hex(), "884422");
    let order: Vec<SectionKind> = plan.sections.iter().map(|s| s.kind).collect();
    assert_eq!(order, vec![SectionKind::Skills, SectionKind::Work]);
}
