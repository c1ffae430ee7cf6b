//! OPC packaging: fixed parts, relationships and the zip container.

use super::xml::XmlWriter;
use crate::error::Result;
use crate::render::image::ImageFormat;
use crate::render::DocumentInfo;
use crate::style::ResolvedStyle;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const NS_MAIN: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

const NS_PACKAGE_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// One file inside the package.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub path: String,
    pub data: Vec<u8>,
}

/// Kind of a relationship from the main document part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelKind {
    Styles,
    Hyperlink,
    Image,
    Footer,
}

impl RelKind {
    fn type_uri(&self) -> String {
        let suffix = match self {
            RelKind::Styles => "styles",
            RelKind::Hyperlink => "hyperlink",
            RelKind::Image => "image",
            RelKind::Footer => "footer",
        };
        format!("{REL_TYPE_BASE}/{suffix}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub kind: RelKind,
    pub target: String,
}

/// `[Content_Types].xml`
pub fn content_types(media: &[ImageFormat], footer: bool) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start(
        "Types",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types")],
    )?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    let mut seen = Vec::new();
    for format in media {
        if !seen.contains(format) {
            seen.push(*format);
            xml.empty(
                "Default",
                &[("Extension", format.extension()), ("ContentType", format.mime())],
            )?;
        }
    }

    let mut overrides = vec![
        (
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        ),
        (
            "/word/styles.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
        ),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
        (
            "/docProps/app.xml",
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        ),
    ];
    if footer {
        overrides.push((
            "/word/footer1.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
        ));
    }
    for (part, content_type) in overrides {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    xml.end("Types")?;
    Ok(xml.finish())
}

/// `_rels/.rels`
pub fn package_relationships() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start("Relationships", &[("xmlns", NS_PACKAGE_REL)])?;
    let office = format!("{REL_TYPE_BASE}/officeDocument");
    let app = format!("{REL_TYPE_BASE}/extended-properties");
    let rels = [
        ("rId1", office.as_str(), "word/document.xml"),
        (
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        ("rId3", app.as_str(), "docProps/app.xml"),
    ];
    for (id, kind, target) in rels {
        xml.empty("Relationship", &[("Id", id), ("Type", kind), ("Target", target)])?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// `word/_rels/document.xml.rels`
pub fn document_relationships(rels: &[Relationship]) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start("Relationships", &[("xmlns", NS_PACKAGE_REL)])?;
    for rel in rels {
        let kind = rel.kind.type_uri();
        let mut attrs = vec![
            ("Id", rel.id.as_str()),
            ("Type", kind.as_str()),
            ("Target", rel.target.as_str()),
        ];
        if rel.kind == RelKind::Hyperlink {
            attrs.push(("TargetMode", "External"));
        }
        xml.empty("Relationship", &attrs)?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// `docProps/core.xml`. Carries a date only when the document has one, so
/// identical input packs to identical bytes.
pub fn core_properties(info: &DocumentInfo) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.element("dc:title", &[], &info.title)?;
    xml.element("dc:subject", &[], &info.subject)?;
    xml.element("dc:creator", &[], &info.author)?;
    if let Some(modified) = info.modified {
        let stamp = modified.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        xml.element("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &stamp)?;
        xml.element("dcterms:modified", &[("xsi:type", "dcterms:W3CDTF")], &stamp)?;
    }
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}

/// `docProps/app.xml`
pub fn app_properties() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new()?;
    xml.start(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    xml.element(
        "Application",
        &[],
        concat!("resume-render ", env!("CARGO_PKG_VERSION")),
    )?;
    xml.end("Properties")?;
    Ok(xml.finish())
}

/// `word/styles.xml`: document defaults plus the paragraph styles the body
/// refers to.
pub fn styles(style: &ResolvedStyle) -> Result<Vec<u8>> {
    let t = &style.typography;
    let body_font = t.font_family.word_name();
    let heading_font = t.heading_font_family.word_name();
    let body_size = half_points(t.body_font_size);
    let line = ((240.0 * t.line_height).round() as i64).to_string();
    let text_color = t.text_color.hex();

    let mut xml = XmlWriter::new()?;
    xml.start("w:styles", &[("xmlns:w", NS_MAIN)])?;

    xml.start("w:docDefaults", &[])?;
    xml.start("w:rPrDefault", &[])?;
    xml.start("w:rPr", &[])?;
    fonts(&mut xml, body_font)?;
    xml.empty("w:color", &[("w:val", &text_color)])?;
    xml.empty("w:sz", &[("w:val", &body_size)])?;
    xml.empty("w:szCs", &[("w:val", &body_size)])?;
    xml.end("w:rPr")?;
    xml.end("w:rPrDefault")?;
    xml.start("w:pPrDefault", &[])?;
    xml.start("w:pPr", &[])?;
    xml.empty(
        "w:spacing",
        &[("w:before", "0"), ("w:after", "0"), ("w:line", &line), ("w:lineRule", "auto")],
    )?;
    xml.end("w:pPr")?;
    xml.end("w:pPrDefault")?;
    xml.end("w:docDefaults")?;

    paragraph_style(&mut xml, "Normal", "Normal", None, |_| Ok(()))?;
    paragraph_style(&mut xml, "Title", "Title", Some(0), |xml| {
        fonts(xml, heading_font)?;
        let size = half_points(t.name_font_size);
        xml.empty("w:sz", &[("w:val", &size)])?;
        xml.empty("w:szCs", &[("w:val", &size)])
    })?;
    paragraph_style(&mut xml, "Heading1", "heading 1", Some(0), |xml| {
        fonts(xml, heading_font)?;
        let size = half_points(t.heading_font_size * style.heading.heading_size.scale());
        xml.empty("w:sz", &[("w:val", &size)])?;
        xml.empty("w:szCs", &[("w:val", &size)])
    })?;

    xml.end("w:styles")?;
    Ok(xml.finish())
}

fn fonts(xml: &mut XmlWriter, name: &str) -> Result<()> {
    xml.empty(
        "w:rFonts",
        &[("w:ascii", name), ("w:hAnsi", name), ("w:cs", name)],
    )
}

fn paragraph_style(
    xml: &mut XmlWriter,
    id: &str,
    name: &str,
    outline: Option<u8>,
    run: impl FnOnce(&mut XmlWriter) -> Result<()>,
) -> Result<()> {
    let mut attrs = vec![("w:type", "paragraph"), ("w:styleId", id)];
    if id == "Normal" {
        attrs.push(("w:default", "1"));
    }
    xml.start("w:style", &attrs)?;
    xml.empty("w:name", &[("w:val", name)])?;
    if id != "Normal" {
        xml.empty("w:basedOn", &[("w:val", "Normal")])?;
        xml.empty("w:next", &[("w:val", "Normal")])?;
        xml.empty("w:qFormat", &[])?;
    }
    if let Some(level) = outline {
        xml.start("w:pPr", &[])?;
        xml.empty("w:keepNext", &[])?;
        xml.empty("w:outlineLvl", &[("w:val", &level.to_string())])?;
        xml.end("w:pPr")?;
    }
    xml.start("w:rPr", &[])?;
    run(xml)?;
    xml.end("w:rPr")?;
    xml.end("w:style")
}

/// `word/footer1.xml` with a centered "page / pages" field pair.
pub fn page_number_footer(style: &ResolvedStyle) -> Result<Vec<u8>> {
    let t = &style.typography;
    let size = half_points(t.meta_font_size);
    let color = t.muted_color.hex();

    let mut xml = XmlWriter::new()?;
    xml.start("w:ftr", &[("xmlns:w", NS_MAIN), ("xmlns:r", NS_REL)])?;
    xml.start("w:p", &[])?;
    xml.start("w:pPr", &[])?;
    xml.empty("w:jc", &[("w:val", "center")])?;
    xml.end("w:pPr")?;

    let run = |xml: &mut XmlWriter, body: &dyn Fn(&mut XmlWriter) -> Result<()>| -> Result<()> {
        xml.start("w:r", &[])?;
        xml.start("w:rPr", &[])?;
        xml.empty("w:color", &[("w:val", &color)])?;
        xml.empty("w:sz", &[("w:val", &size)])?;
        xml.empty("w:szCs", &[("w:val", &size)])?;
        xml.end("w:rPr")?;
        body(xml)?;
        xml.end("w:r")
    };
    let field = |xml: &mut XmlWriter, instruction: &str| -> Result<()> {
        run(xml, &|xml| xml.empty("w:fldChar", &[("w:fldCharType", "begin")]))?;
        run(xml, &|xml| {
            xml.element("w:instrText", &[("xml:space", "preserve")], instruction)
        })?;
        run(xml, &|xml| xml.empty("w:fldChar", &[("w:fldCharType", "separate")]))?;
        run(xml, &|xml| xml.element("w:t", &[], "1"))?;
        run(xml, &|xml| xml.empty("w:fldChar", &[("w:fldCharType", "end")]))
    };

    field(&mut xml, " PAGE ")?;
    run(&mut xml, &|xml| xml.element("w:t", &[("xml:space", "preserve")], " / "))?;
    field(&mut xml, " NUMPAGES ")?;

    xml.end("w:p")?;
    xml.end("w:ftr")?;
    Ok(xml.finish())
}

/// Points to the half-point units of `w:sz`.
pub fn half_points(pt: f32) -> String {
    ((pt * 2.0).round() as i64).to_string()
}

/// Points to twentieths of a point.
pub fn twips(pt: f32) -> i64 {
    (pt * 20.0).round() as i64
}

/// Zip the parts in the order given.
///
/// Entry timestamps are fixed so the archive depends on its content only.
pub fn write_package(parts: &[Part], compress: bool) -> Result<Vec<u8>> {
    let method = if compress {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    let options = SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(zip::DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for part in parts {
        zip.start_file(part.path.as_str(), options)?;
        zip.write_all(&part.data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
