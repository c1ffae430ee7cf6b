//! Flow backend: writes WordprocessingML and packs it with zip.
//!
//! Word reflows text itself, so there is no line breaking or pagination
//! here. Multi-column plans are written as one column in master order.

mod package;
mod xml;

use self::package::{half_points, twips, Part, RelKind, Relationship};
use self::xml::XmlWriter;
use super::image::{self, ImageFormat, ImageInfo};
use super::{Backend, Format, RenderPlan};
use crate::error::{RenderError, Result};
use crate::markup::RichText;
use crate::resource::ResourceScope;
use crate::sections::{Entry, Item, SectionBlock, Tags};
use crate::style::{
    Alignment, Color, ContactLayout, DatePosition, Emphasis, FontFamily, HeadingTreatment,
    ImagePosition, ImageShape, ResolvedStyle, SkillsLayout, ThemeRole,
};
use std::collections::BTreeMap;

const EMU_PER_MM: f32 = 36_000.0;
const TWIPS_PER_MM: f32 = 1440.0 / 25.4;

/// Configuration for DOCX rendering.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    /// Deflate the package entries.
    pub compress: bool,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Writes a [`RenderPlan`] as a DOCX package.
#[derive(Debug, Clone, Default)]
pub struct DocxBackend {
    pub config: DocxConfig,
}

impl DocxBackend {
    pub fn new(config: DocxConfig) -> Self {
        Self { config }
    }
}

impl Backend for DocxBackend {
    fn format(&self) -> Format {
        Format::Docx
    }

    fn render(&self, plan: &RenderPlan, scope: &mut ResourceScope) -> Result<Vec<u8>> {
        DocxRenderer::new(plan)?.render(scope, &self.config)
    }
}

/// One run of text with its character formatting.
#[derive(Debug, Clone)]
struct RunSpec {
    text: String,
    font: FontFamily,
    emphasis: Emphasis,
    /// Value of `w:u`, if underlined.
    underline: Option<&'static str>,
    size: f32,
    color: Color,
    char_spacing: f32,
    link: Option<String>,
}

/// Paragraph formatting, in points.
#[derive(Debug, Clone, Default)]
struct ParaProps {
    style: Option<&'static str>,
    alignment: Alignment,
    keep_next: bool,
    /// `(side, w:val)` pairs in schema order: top, left, bottom, right.
    borders: Vec<(&'static str, &'static str)>,
    border_size: f32,
    border_color: Color,
    shading: Option<Color>,
    before: f32,
    after: f32,
    indent: f32,
    hanging: f32,
    right_tab: Option<f32>,
}

impl ParaProps {
    fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment,
            ..Self::default()
        }
    }
}

fn jc(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

struct DocxRenderer<'a> {
    plan: &'a RenderPlan,
    style: &'a ResolvedStyle,
    body: XmlWriter,
    rels: Vec<Relationship>,
    /// Hyperlink target to relationship id.
    links: BTreeMap<String, String>,
    /// Embedded images: format, package path and resource name.
    media: Vec<(ImageFormat, String, String)>,
    /// Vertical gap owed to the next paragraph.
    pending_space: f32,
    content_width: f32,
}

impl<'a> DocxRenderer<'a> {
    fn new(plan: &'a RenderPlan) -> Result<Self> {
        let style = &plan.style;
        let (width, _) = style.page.paper_size.dimensions_pt();
        let margins = (style.page.margin_left_mm + style.page.margin_right_mm) * 72.0 / 25.4;
        let mut renderer = Self {
            plan,
            style,
            body: XmlWriter::new()?,
            rels: Vec::new(),
            links: BTreeMap::new(),
            media: Vec::new(),
            pending_space: 0.0,
            content_width: (width - margins).max(72.0),
        };
        renderer.relate(RelKind::Styles, "styles.xml");
        Ok(renderer)
    }

    fn relate(&mut self, kind: RelKind, target: &str) -> String {
        let id = format!("rId{}", self.rels.len() + 1);
        self.rels.push(Relationship {
            id: id.clone(),
            kind,
            target: target.to_string(),
        });
        id
    }

    fn link_id(&mut self, target: &str) -> String {
        if let Some(id) = self.links.get(target) {
            return id.clone();
        }
        let id = self.relate(RelKind::Hyperlink, target);
        self.links.insert(target.to_string(), id.clone());
        id
    }

    fn render(mut self, scope: &mut ResourceScope, config: &DocxConfig) -> Result<Vec<u8>> {
        let plan = self.plan;
        if plan.columns.is_multi_column() {
            log::debug!(
                "flattening {} columns into one for DOCX",
                plan.columns.columns.len()
            );
        }

        self.body.start(
            "w:document",
            &[
                ("xmlns:w", package::NS_MAIN),
                ("xmlns:r", package::NS_REL),
                ("xmlns:wp", package::NS_WP),
                ("xmlns:a", package::NS_A),
                ("xmlns:pic", package::NS_PIC),
            ],
        )?;
        self.body.start("w:body", &[])?;

        self.header(scope)?;
        for section in plan.sections_in_order() {
            self.section(section)?;
        }

        let footer = self.style.page.show_page_numbers;
        let footer_id = footer.then(|| self.relate(RelKind::Footer, "footer1.xml"));
        self.section_properties(footer_id.as_deref())?;
        self.body.end("w:body")?;
        self.body.end("w:document")?;

        let formats: Vec<ImageFormat> = self.media.iter().map(|(f, _, _)| *f).collect();
        let mut parts = vec![
            Part {
                path: "[Content_Types].xml".into(),
                data: package::content_types(&formats, footer)?,
            },
            Part {
                path: "_rels/.rels".into(),
                data: package::package_relationships()?,
            },
            Part {
                path: "word/document.xml".into(),
                data: self.body.finish(),
            },
            Part {
                path: "word/_rels/document.xml.rels".into(),
                data: package::document_relationships(&self.rels)?,
            },
            Part {
                path: "word/styles.xml".into(),
                data: package::styles(self.style)?,
            },
        ];
        if footer {
            parts.push(Part {
                path: "word/footer1.xml".into(),
                data: package::page_number_footer(self.style)?,
            });
        }
        parts.push(Part {
            path: "docProps/core.xml".into(),
            data: package::core_properties(&plan.info)?,
        });
        parts.push(Part {
            path: "docProps/app.xml".into(),
            data: package::app_properties()?,
        });
        for (_, path, name) in self.media {
            let data = scope
                .get(&name)
                .ok_or_else(|| RenderError::Docx(format!("image resource {name} is missing")))?;
            parts.push(Part {
                path,
                data: data.to_vec(),
            });
        }

        package::write_package(&parts, config.compress)
    }

    fn run_spec(&self, text: &str, font: FontFamily, emphasis: Emphasis, size: f32, color: Color) -> RunSpec {
        RunSpec {
            text: text.to_string(),
            font,
            emphasis,
            underline: None,
            size,
            color,
            char_spacing: 0.0,
            link: None,
        }
    }

    fn body_run(&self, text: &str, emphasis: Emphasis, size: f32, color: Color) -> RunSpec {
        self.run_spec(text, self.style.typography.font_family, emphasis, size, color)
    }

    fn rich_runs(&self, text: &RichText, emphasis: Emphasis, size: f32, color: Color) -> Vec<RunSpec> {
        let link_color = self.plan.theme.color_for(ThemeRole::Hyperlinks, color);
        text.runs
            .iter()
            .map(|run| {
                let emphasis = emphasis.union(Emphasis {
                    bold: run.style.bold,
                    italic: run.style.italic,
                });
                let mut spec = self.body_run(&run.text, emphasis, size, color);
                if run.style.underline {
                    spec.underline = Some("single");
                }
                if let Some(target) = &run.link {
                    spec.color = link_color;
                    spec.underline = Some("single");
                    spec.link = Some(target.clone());
                }
                spec
            })
            .collect()
    }

    fn paragraph(&mut self, props: &ParaProps, runs: &[RunSpec]) -> Result<()> {
        let before = props.before + std::mem::take(&mut self.pending_space);
        let xml = &mut self.body;
        xml.start("w:p", &[])?;
        xml.start("w:pPr", &[])?;
        if let Some(style) = props.style {
            xml.empty("w:pStyle", &[("w:val", style)])?;
        }
        if props.keep_next {
            xml.empty("w:keepNext", &[])?;
        }
        if !props.borders.is_empty() {
            let size = ((props.border_size * 8.0).round() as i64).clamp(2, 96).to_string();
            let color = props.border_color.hex();
            xml.start("w:pBdr", &[])?;
            for &(side, val) in &props.borders {
                let space = if side == "left" { "6" } else { "1" };
                xml.empty(
                    &format!("w:{side}"),
                    &[("w:val", val), ("w:sz", &size), ("w:space", space), ("w:color", &color)],
                )?;
            }
            xml.end("w:pBdr")?;
        }
        if let Some(fill) = props.shading {
            xml.empty(
                "w:shd",
                &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", &fill.hex())],
            )?;
        }
        if let Some(pos) = props.right_tab {
            xml.start("w:tabs", &[])?;
            xml.empty("w:tab", &[("w:val", "right"), ("w:pos", &twips(pos).to_string())])?;
            xml.end("w:tabs")?;
        }
        if before > 0.0 || props.after > 0.0 {
            xml.empty(
                "w:spacing",
                &[
                    ("w:before", &twips(before).to_string()),
                    ("w:after", &twips(props.after).to_string()),
                ],
            )?;
        }
        if props.indent > 0.0 {
            let left = twips(props.indent).to_string();
            let hanging = twips(props.hanging).to_string();
            let mut attrs = vec![("w:left", left.as_str())];
            if props.hanging > 0.0 {
                attrs.push(("w:hanging", hanging.as_str()));
            }
            xml.empty("w:ind", &attrs)?;
        }
        xml.empty("w:jc", &[("w:val", jc(props.alignment))])?;
        xml.end("w:pPr")?;

        for run in runs {
            self.run(run)?;
        }
        self.body.end("w:p")
    }

    fn run(&mut self, run: &RunSpec) -> Result<()> {
        match &run.link {
            Some(target) => {
                let id = self.link_id(target);
                self.body
                    .start("w:hyperlink", &[("r:id", &id), ("w:history", "1")])?;
                write_run(&mut self.body, run)?;
                self.body.end("w:hyperlink")
            }
            None => write_run(&mut self.body, run),
        }
    }

    fn header(&mut self, scope: &mut ResourceScope) -> Result<()> {
        let plan = self.plan;
        let header = &plan.header;
        let t = &self.style.typography;
        let h = &self.style.header;
        let theme = &plan.theme;

        if let Some(source) = &header.image {
            self.image(source, scope)?;
        }

        if !header.name.is_empty() {
            let run = self.run_spec(
                &header.name,
                t.heading_font_family,
                t.name_emphasis,
                t.name_font_size,
                theme.color_for(ThemeRole::DocumentTitle, t.text_color),
            );
            let props = ParaProps {
                style: Some("Title"),
                ..ParaProps::aligned(h.header_alignment)
            };
            self.paragraph(&props, &[run])?;
        }
        if let Some(label) = &header.label {
            let run = self.body_run(
                label,
                t.label_emphasis,
                t.label_font_size,
                theme.color_for(ThemeRole::RoleLabel, t.muted_color),
            );
            self.paragraph(&ParaProps::aligned(h.header_alignment), &[run])?;
        }

        let link_color = theme.color_for(ThemeRole::Hyperlinks, t.muted_color);
        let contact_runs: Vec<RunSpec> = header
            .contacts
            .iter()
            .map(|c| {
                let mut run = self.body_run(&c.text, Emphasis::NONE, t.contact_font_size, t.muted_color);
                if let Some(link) = &c.link {
                    run.color = link_color;
                    run.link = Some(link.clone());
                }
                run
            })
            .collect();
        match h.contact_layout {
            ContactLayout::Inline if !contact_runs.is_empty() => {
                let separator = self.body_run(
                    &h.contact_separator,
                    Emphasis::NONE,
                    t.contact_font_size,
                    theme.color_for(ThemeRole::Iconography, t.muted_color),
                );
                let mut runs = Vec::with_capacity(contact_runs.len() * 2);
                for (i, run) in contact_runs.into_iter().enumerate() {
                    if i > 0 {
                        runs.push(separator.clone());
                    }
                    runs.push(run);
                }
                self.paragraph(&ParaProps::aligned(h.header_alignment), &runs)?;
            }
            ContactLayout::Inline => {}
            ContactLayout::Stacked => {
                for run in contact_runs {
                    self.paragraph(&ParaProps::aligned(h.header_alignment), &[run])?;
                }
            }
        }

        self.pending_space += self.style.spacing.header_spacing_pt;
        Ok(())
    }

    /// Embed the profile image as an inline picture in its own paragraph.
    fn image(&mut self, source: &str, scope: &mut ResourceScope) -> Result<()> {
        let bytes = image::decode_source(source)?;
        let info = image::probe(&bytes)?;
        let name = scope.register("image", bytes);
        let file = format!("{name}.{}", info.format.extension());
        let rel_id = self.relate(RelKind::Image, &format!("media/{file}"));
        self.media.push((info.format, format!("word/media/{file}"), name));

        let alignment = match self.style.image.image_position {
            ImagePosition::Left => Alignment::Left,
            ImagePosition::Right => Alignment::Right,
        };
        let before = std::mem::take(&mut self.pending_space);
        self.body.start("w:p", &[])?;
        self.body.start("w:pPr", &[])?;
        if before > 0.0 {
            self.body
                .empty("w:spacing", &[("w:before", &twips(before).to_string())])?;
        }
        self.body.empty("w:jc", &[("w:val", jc(alignment))])?;
        self.body.end("w:pPr")?;
        self.body.start("w:r", &[])?;
        self.drawing(&rel_id, &file, &info)?;
        self.body.end("w:r")?;
        self.body.end("w:p")
    }

    fn drawing(&mut self, rel_id: &str, file: &str, info: &ImageInfo) -> Result<()> {
        let img = &self.style.image;
        let extent = ((img.image_size_mm * EMU_PER_MM).round() as i64).to_string();
        let aspect = info.aspect();
        // Crop to a centered square, in thousandths of a percent.
        let (vertical, horizontal) = if aspect > 1.0 {
            (((1.0 - 1.0 / aspect) / 2.0 * 100_000.0).round() as i64, 0)
        } else {
            (0, ((1.0 - aspect) / 2.0 * 100_000.0).round() as i64)
        };
        let (vertical, horizontal) = (vertical.to_string(), horizontal.to_string());
        let geometry = match img.image_shape {
            ImageShape::Square => "rect",
            ImageShape::Rounded => "roundRect",
            ImageShape::Circle => "ellipse",
        };

        let xml = &mut self.body;
        xml.start("w:drawing", &[])?;
        xml.start(
            "wp:inline",
            &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
        )?;
        xml.empty("wp:extent", &[("cx", &extent), ("cy", &extent)])?;
        xml.empty("wp:docPr", &[("id", "1"), ("name", "Profile photo")])?;
        xml.start("wp:cNvGraphicFramePr", &[])?;
        xml.empty("a:graphicFrameLocks", &[("noChangeAspect", "1")])?;
        xml.end("wp:cNvGraphicFramePr")?;
        xml.start("a:graphic", &[])?;
        xml.start("a:graphicData", &[("uri", package::NS_PIC)])?;
        xml.start("pic:pic", &[])?;

        xml.start("pic:nvPicPr", &[])?;
        xml.empty("pic:cNvPr", &[("id", "1"), ("name", file)])?;
        xml.empty("pic:cNvPicPr", &[])?;
        xml.end("pic:nvPicPr")?;

        xml.start("pic:blipFill", &[])?;
        xml.empty("a:blip", &[("r:embed", rel_id)])?;
        xml.empty(
            "a:srcRect",
            &[("t", &vertical), ("b", &vertical), ("l", &horizontal), ("r", &horizontal)],
        )?;
        xml.start("a:stretch", &[])?;
        xml.empty("a:fillRect", &[])?;
        xml.end("a:stretch")?;
        xml.end("pic:blipFill")?;

        xml.start("pic:spPr", &[])?;
        xml.start("a:xfrm", &[])?;
        xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
        xml.empty("a:ext", &[("cx", &extent), ("cy", &extent)])?;
        xml.end("a:xfrm")?;
        xml.start("a:prstGeom", &[("prst", geometry)])?;
        xml.empty("a:avLst", &[])?;
        xml.end("a:prstGeom")?;
        if img.image_border {
            xml.start("a:ln", &[("w", "12700")])?;
            xml.start("a:solidFill", &[])?;
            xml.empty("a:srgbClr", &[("val", &img.image_border_color.hex())])?;
            xml.end("a:solidFill")?;
            xml.end("a:ln")?;
        }
        xml.end("pic:spPr")?;

        xml.end("pic:pic")?;
        xml.end("a:graphicData")?;
        xml.end("a:graphic")?;
        xml.end("wp:inline")?;
        xml.end("w:drawing")
    }

    fn section(&mut self, section: &SectionBlock) -> Result<()> {
        if let Some(heading) = &section.heading {
            self.heading(heading)?;
        }
        let t = &self.style.typography;
        for item in &section.items {
            match item {
                Item::Paragraph(p) => {
                    let runs = self.rich_runs(&p.text, p.emphasis, t.body_font_size, t.text_color);
                    let props = ParaProps {
                        after: self.style.spacing.paragraph_spacing_pt,
                        ..ParaProps::aligned(p.text.alignment.unwrap_or(Alignment::Left))
                    };
                    self.paragraph(&props, &runs)?;
                }
                Item::Entry(entry) => self.entry(entry)?,
                Item::Tags(tags) => self.tags(tags)?,
            }
        }
        self.pending_space += self.style.spacing.section_spacing_pt;
        Ok(())
    }

    fn heading(&mut self, text: &str) -> Result<()> {
        let t = &self.style.typography;
        let hs = &self.style.heading;
        let theme = &self.plan.theme;
        let rule_color = theme.color_for(ThemeRole::DecorativeRules, t.text_color);
        let treatment = hs.heading_treatment;

        let mut props = ParaProps {
            style: Some("Heading1"),
            keep_next: true,
            border_size: hs.heading_rule_width_pt,
            border_color: rule_color,
            after: self.style.spacing.heading_spacing_pt,
            ..ParaProps::aligned(hs.heading_alignment)
        };
        props.borders = match treatment {
            HeadingTreatment::Underline => vec![("bottom", "single")],
            HeadingTreatment::Overline => vec![("top", "single")],
            HeadingTreatment::Sandwich => vec![("top", "single"), ("bottom", "single")],
            HeadingTreatment::LeftBar => vec![("left", "single")],
            HeadingTreatment::Boxed => vec![
                ("top", "single"),
                ("left", "single"),
                ("bottom", "single"),
                ("right", "single"),
            ],
            HeadingTreatment::DottedUnderline => vec![("bottom", "dotted")],
            HeadingTreatment::Plain | HeadingTreatment::Filled | HeadingTreatment::ShortUnderline => {
                Vec::new()
            }
        };
        if treatment == HeadingTreatment::LeftBar {
            props.border_size = props.border_size.max(2.5);
        }

        let color = match treatment {
            HeadingTreatment::Filled => {
                props.shading = Some(rule_color);
                Color::WHITE
            }
            _ => theme.color_for(ThemeRole::SectionHeadings, t.text_color),
        };
        let mut run = self.run_spec(
            text,
            t.heading_font_family,
            hs.heading_emphasis,
            t.heading_font_size * hs.heading_size.scale(),
            color,
        );
        run.char_spacing = hs.heading_letter_spacing_pt;
        if treatment == HeadingTreatment::ShortUnderline {
            run.underline = Some("thick");
        }
        self.paragraph(&props, &[run])
    }

    fn entry(&mut self, entry: &Entry) -> Result<()> {
        let t = &self.style.typography;
        let e = &self.style.entries;
        let muted = t.muted_color;
        let dates = entry.dates.trim();

        let mut title = self.rich_runs(&entry.title, entry.title_emphasis, t.entry_title_font_size, t.text_color);
        let mut props = ParaProps {
            keep_next: true,
            ..ParaProps::aligned(Alignment::Left)
        };
        if !dates.is_empty() {
            match e.date_position {
                DatePosition::Right => {
                    props.right_tab = Some(self.content_width);
                    title.push(self.body_run(&format!("\t{dates}"), e.date_emphasis, t.meta_font_size, muted));
                }
                DatePosition::Inline => {
                    if !entry.title.is_blank() {
                        title.push(self.body_run(" | ", Emphasis::NONE, t.meta_font_size, muted));
                    }
                    title.push(self.body_run(dates, e.date_emphasis, t.meta_font_size, muted));
                }
                DatePosition::Below => {}
            }
        }
        if !title.is_empty() && (!entry.title.is_blank() || !dates.is_empty()) {
            self.paragraph(&props, &title)?;
        }

        let mut subtitle = self.rich_runs(&entry.subtitle, entry.subtitle_emphasis, t.body_font_size, t.text_color);
        let location = entry.location.trim();
        if !location.is_empty() {
            if !entry.subtitle.is_blank() {
                subtitle.push(self.body_run(", ", Emphasis::NONE, t.body_font_size, muted));
            }
            subtitle.push(self.body_run(location, e.location_emphasis, t.body_font_size, muted));
        }
        if !entry.subtitle.is_blank() || !location.is_empty() {
            self.paragraph(&ParaProps::aligned(Alignment::Left), &subtitle)?;
        }

        if !dates.is_empty() && e.date_position == DatePosition::Below {
            let run = self.body_run(dates, e.date_emphasis, t.meta_font_size, muted);
            self.paragraph(&ParaProps::aligned(Alignment::Left), &[run])?;
        }

        if let Some(url) = &entry.url {
            let display = url.trim_start_matches("https://").trim_start_matches("http://");
            let mut run = self.body_run(
                display,
                Emphasis::NONE,
                t.meta_font_size,
                self.plan.theme.color_for(ThemeRole::Hyperlinks, muted),
            );
            run.link = Some(url.clone());
            self.paragraph(&ParaProps::aligned(Alignment::Left), &[run])?;
        }

        for detail in entry.details.iter().filter(|d| !d.trim().is_empty()) {
            let run = self.body_run(detail, Emphasis::NONE, t.meta_font_size, muted);
            self.paragraph(&ParaProps::aligned(Alignment::Left), &[run])?;
        }

        if let Some(description) = &entry.description {
            let runs = self.rich_runs(description, Emphasis::NONE, t.body_font_size, t.text_color);
            let props = ParaProps::aligned(description.alignment.unwrap_or(Alignment::Left));
            self.paragraph(&props, &runs)?;
        }

        let indent = self.style.spacing.bullet_indent_pt;
        for (i, bullet) in entry.bullets.iter().enumerate() {
            let mut runs = Vec::with_capacity(bullet.runs.len() + 1);
            let mut props = ParaProps::aligned(bullet.alignment.unwrap_or(Alignment::Left));
            if let Some(marker) = entry.list_style.marker(i) {
                runs.push(self.body_run(&format!("{marker}\t"), Emphasis::NONE, t.body_font_size, t.text_color));
                props.indent = indent;
                props.hanging = indent;
            }
            runs.extend(self.rich_runs(bullet, Emphasis::NONE, t.body_font_size, t.text_color));
            self.paragraph(&props, &runs)?;
        }

        self.pending_space += self.style.spacing.entry_spacing_pt;
        Ok(())
    }

    fn tags(&mut self, tags: &Tags) -> Result<()> {
        let t = &self.style.typography;
        let label = tags.label.trim();
        let values = tags.joined();
        let label_run = (!label.is_empty())
            .then(|| self.body_run(label, tags.label_emphasis, t.body_font_size, t.text_color));
        let values_run = (!values.trim().is_empty())
            .then(|| self.body_run(&values, Emphasis::NONE, t.body_font_size, t.text_color));
        let props = ParaProps::aligned(Alignment::Left);

        match tags.layout {
            SkillsLayout::Inline => {
                let mut runs = Vec::with_capacity(3);
                if let Some(run) = label_run {
                    runs.push(run);
                    if values_run.is_some() {
                        runs.push(self.body_run(": ", tags.label_emphasis, t.body_font_size, t.text_color));
                    }
                }
                runs.extend(values_run);
                self.paragraph(&props, &runs)?;
            }
            SkillsLayout::Stacked | SkillsLayout::Compact => {
                for run in label_run.into_iter().chain(values_run) {
                    self.paragraph(&props, &[run])?;
                }
            }
        }
        self.pending_space += self.style.spacing.paragraph_spacing_pt;
        Ok(())
    }

    fn section_properties(&mut self, footer_id: Option<&str>) -> Result<()> {
        let page = &self.style.page;
        let (width, height) = page.paper_size.dimensions_pt();
        let mm = |v: f32| ((v * TWIPS_PER_MM).round() as i64).to_string();

        self.body.start("w:sectPr", &[])?;
        if let Some(id) = footer_id {
            self.body
                .empty("w:footerReference", &[("w:type", "default"), ("r:id", id)])?;
        }
        self.body.empty(
            "w:pgSz",
            &[
                ("w:w", &twips(width).to_string()),
                ("w:h", &twips(height).to_string()),
            ],
        )?;
        self.body.empty(
            "w:pgMar",
            &[
                ("w:top", &mm(page.margin_top_mm)),
                ("w:right", &mm(page.margin_right_mm)),
                ("w:bottom", &mm(page.margin_bottom_mm)),
                ("w:left", &mm(page.margin_left_mm)),
                ("w:header", &mm(page.margin_top_mm / 2.0)),
                ("w:footer", &mm(page.margin_bottom_mm / 2.0)),
                ("w:gutter", "0"),
            ],
        )?;
        self.body.end("w:sectPr")
    }
}

fn write_run(xml: &mut XmlWriter, run: &RunSpec) -> Result<()> {
    let font = run.font.word_name();
    let size = half_points(run.size);
    xml.start("w:r", &[])?;
    xml.start("w:rPr", &[])?;
    xml.empty("w:rFonts", &[("w:ascii", font), ("w:hAnsi", font), ("w:cs", font)])?;
    if run.emphasis.bold {
        xml.empty("w:b", &[])?;
    }
    if run.emphasis.italic {
        xml.empty("w:i", &[])?;
    }
    xml.empty("w:color", &[("w:val", &run.color.hex())])?;
    if run.char_spacing != 0.0 {
        xml.empty("w:spacing", &[("w:val", &twips(run.char_spacing).to_string())])?;
    }
    xml.empty("w:sz", &[("w:val", &size)])?;
    xml.empty("w:szCs", &[("w:val", &size)])?;
    if let Some(underline) = run.underline {
        xml.empty("w:u", &[("w:val", underline)])?;
    }
    xml.end("w:rPr")?;

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            xml.empty("w:br", &[])?;
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                xml.empty("w:tab", &[])?;
            }
            let piece = piece.trim_end_matches('\r');
            if !piece.is_empty() {
                xml.element("w:t", &[("xml:space", "preserve")], piece)?;
            }
        }
    }
    xml.end("w:r")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResumeDocument, SkillGroup, WorkEntry};
    use crate::render::image::fixtures;
    use crate::resource::ResourcePool;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use std::io::{Cursor, Read};

    fn sample() -> ResumeDocument {
        let mut doc = ResumeDocument::new("r1", "Resume", "classic");
        doc.basics.name = "Ada Lovelace".into();
        doc.basics.url = "https://ada.example".into();
        doc.basics.summary = "Notes on the <u>engine</u> & its [uses](https://example.com)".into();
        doc.work.push(WorkEntry {
            name: "Analytical Engines".into(),
            position: "Programmer".into(),
            start_date: "1842".into(),
            highlights: vec!["First algorithm".into(), "Bernoulli numbers".into()],
            ..WorkEntry::default()
        });
        doc.skills.push(SkillGroup {
            name: "Math".into(),
            keywords: vec!["Analysis".into()],
            ..SkillGroup::default()
        });
        doc
    }

    fn render(doc: &ResumeDocument, template: Option<&str>) -> Vec<u8> {
        let plan = RenderPlan::new(doc, template);
        let pool = ResourcePool::new();
        let mut scope = pool.scope();
        DocxBackend::default().render(&plan, &mut scope).unwrap()
    }

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_package_parts() {
        let bytes = render(&sample(), None);
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "docProps/core.xml",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_document_body() {
        let bytes = render(&sample(), None);
        let document = part(&bytes, "word/document.xml");
        assert!(document.contains(">Ada Lovelace</w:t>"));
        assert!(document.contains("engine</w:t>"));
        assert!(document.contains("&amp; its"));
        assert!(document.contains("<w:hyperlink r:id="));
        assert!(document.contains("<w:u w:val=\"single\"/>"));
        assert!(document.contains("<w:sectPr>"));

        let rels = part(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains("https://example.com"));
        assert!(rels.contains("https://ada.example"));
    }

    #[test]
    fn test_multi_column_is_flattened_in_master_order() {
        let bytes = render(&sample(), Some("modern"));
        let document = part(&bytes, "word/document.xml");
        let work = document.find("Analytical Engines").unwrap();
        let skills = document.find("Analysis").unwrap();
        assert!(work < skills);
    }

    #[test]
    fn test_page_number_footer() {
        let bytes = render(&sample(), Some("executive"));
        let footer = part(&bytes, "word/footer1.xml");
        assert!(footer.contains(" PAGE "));
        assert!(part(&bytes, "word/document.xml").contains("w:footerReference"));
    }

    #[test]
    fn test_image_is_packed() {
        let mut doc = sample();
        doc.basics.image = STANDARD.encode(fixtures::png(6));
        let bytes = render(&doc, Some("modern"));
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert!(archive.file_names().any(|n| n == "word/media/image1.png"));
        let document = part(&bytes, "word/document.xml");
        assert!(document.contains("prst=\"ellipse\""));
        assert!(part(&bytes, "[Content_Types].xml").contains("image/png"));
    }

    #[test]
    fn test_packed_image_is_registered_data() {
        let png = fixtures::png(6);
        let mut doc = sample();
        doc.basics.image = STANDARD.encode(&png);
        let plan = RenderPlan::new(&doc, Some("modern"));
        let pool = ResourcePool::new();

        let mut scope = pool.scope();
        let bytes = DocxBackend::default().render(&plan, &mut scope).unwrap();
        let registered = scope.get("image1").unwrap().to_vec();
        drop(scope);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut media = Vec::new();
        archive
            .by_name("word/media/image1.png")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, registered);
        assert_eq!(media, png);
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn test_missing_media_resource_is_an_error() {
        let plan = RenderPlan::new(&sample(), None);
        let pool = ResourcePool::new();
        let mut scope = pool.scope();
        let mut renderer = DocxRenderer::new(&plan).unwrap();
        renderer
            .media
            .push((ImageFormat::Png, "word/media/image9.png".into(), "image9".into()));
        let err = renderer.render(&mut scope, &DocxConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Render(RenderError::Docx(_))), "{err}");
    }

    #[test]
    fn test_deterministic() {
        let doc = sample();
        assert_eq!(render(&doc, None), render(&doc, None));
    }
}
