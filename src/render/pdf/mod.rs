//! Paginated backend: lays the plan out on fixed-size pages and writes PDF
//! with lopdf.
//!
//! Text uses the standard-14 fonts with WinAnsi encoding, so nothing is
//! embedded and the output does not depend on fonts installed on the host.
//! Each column paginates independently; a column that runs past the bottom
//! margin continues at the top of the next page.

mod canvas;
pub mod fonts;
mod layout;

use self::canvas::{Canvas, ImageObject};
use self::fonts::Face;
use self::layout::{break_lines, Line, Span};
use super::image::{self, ImageFormat};
use super::{Backend, Format, RenderPlan};
use crate::error::Result;
use crate::layout::ColumnRole;
use crate::markup::RichText;
use crate::resource::ResourceScope;
use crate::sanitize::strip_control_chars;
use crate::sections::{Contact, Entry, Item, SectionBlock, Tags};
use crate::style::{
    Alignment, Color, ContactLayout, DatePosition, Emphasis, HeadingTreatment, ImagePosition,
    ResolvedStyle, SkillsLayout, ThemeRole,
};

/// Points per millimetre.
const MM: f32 = 72.0 / 25.4;
/// Ascent of the standard fonts as a fraction of the font size.
const ASCENT: f32 = 0.8;
/// Gap between the profile image and the header text.
const IMAGE_GAP: f32 = 12.0;
/// Padding inside boxed and filled headings.
const HEADING_PAD: f32 = 4.0;
const SHORT_RULE: f32 = 36.0;

/// Configuration for PDF rendering.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Deflate page content streams.
    pub compress: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Writes a [`RenderPlan`] as PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfBackend {
    pub config: PdfConfig,
}

impl PdfBackend {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }
}

impl Backend for PdfBackend {
    fn format(&self) -> Format {
        Format::Pdf
    }

    fn render(&self, plan: &RenderPlan, scope: &mut ResourceScope) -> Result<Vec<u8>> {
        let renderer = PdfRenderer::new(plan, scope)?;
        renderer.render(&self.config, scope)
    }
}

/// A column cursor. `y` grows downwards from the top of the page.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    width: f32,
    y: f32,
    page: usize,
    /// Where content resumes after a page break.
    top: f32,
    bottom: f32,
}

impl Frame {
    /// Continue on the next page unless `height` fits below the cursor.
    ///
    /// A cursor already at the top of a page stays put, so content taller
    /// than a page overflows instead of looping.
    fn reserve(&mut self, height: f32) {
        if self.y + height > self.bottom && self.y > self.top + 0.5 {
            self.page += 1;
            self.y = self.top;
        }
    }

    fn inset(&self, left: f32, right: f32) -> Frame {
        Frame {
            x: self.x + left,
            width: (self.width - left - right).max(1.0),
            ..*self
        }
    }
}

/// How a block of spans is placed.
#[derive(Debug, Clone, Copy)]
struct Block<'s> {
    alignment: Alignment,
    char_spacing: f32,
    /// Left indent of every line; the marker sits inside it.
    indent: f32,
    marker: Option<&'s Span>,
    /// Drawn flush right on the first line.
    trailing: Option<&'s Span>,
}

impl Block<'_> {
    fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment,
            char_spacing: 0.0,
            indent: 0.0,
            marker: None,
            trailing: None,
        }
    }
}

struct PlacedImage {
    name: String,
    aspect: f32,
}

struct PdfRenderer<'a> {
    plan: &'a RenderPlan,
    style: &'a ResolvedStyle,
    canvas: Canvas,
    image: Option<PlacedImage>,
}

impl<'a> PdfRenderer<'a> {
    fn new(plan: &'a RenderPlan, scope: &mut ResourceScope) -> Result<Self> {
        let (width, height) = plan.style.page.paper_size.dimensions_pt();
        let mut canvas = Canvas::new(width, height);
        let image = match &plan.header.image {
            Some(source) => Self::load_image(&mut canvas, source, scope)?,
            None => None,
        };
        Ok(Self {
            plan,
            style: &plan.style,
            canvas,
            image,
        })
    }

    /// Decode and register the profile image.
    ///
    /// Undecodable data is an error; a valid image the PDF cannot carry
    /// without re-encoding is left out.
    fn load_image(
        canvas: &mut Canvas,
        source: &str,
        scope: &mut ResourceScope,
    ) -> Result<Option<PlacedImage>> {
        let bytes = image::decode_source(source)?;
        let info = image::probe(&bytes)?;
        if !info.pdf_embeddable() {
            log::warn!(
                "profile image ({:?}, {:?}) cannot be embedded in PDF; omitting it",
                info.format,
                info.color
            );
            return Ok(None);
        }
        let data = match info.format {
            ImageFormat::Jpeg => bytes,
            ImageFormat::Png => image::png_image_data(&bytes)?,
        };
        let aspect = info.aspect();
        let name = scope.register("Im", data);
        canvas.add_image(ImageObject {
            name: name.clone(),
            info,
        });
        Ok(Some(PlacedImage { name, aspect }))
    }

    fn render(mut self, config: &PdfConfig, scope: &ResourceScope) -> Result<Vec<u8>> {
        let page = &self.style.page;
        let (page_width, page_height) = (self.canvas.width(), self.canvas.height());
        let left = page.margin_left_mm * MM;
        let right = page.margin_right_mm * MM;
        let top = page.margin_top_mm * MM;
        let bottom = page_height - page.margin_bottom_mm * MM;
        let content_width = (page_width - left - right).max(1.0);

        let page_frame = Frame {
            x: left,
            width: content_width,
            y: top,
            page: 0,
            top,
            bottom,
        };

        let columns = &self.plan.columns;
        let multi = columns.is_multi_column();
        let mut start = top;
        if !(multi && columns.header_in_primary) {
            let mut frame = page_frame;
            self.header(&mut frame);
            start = frame.y;
        }

        let gap = if multi {
            self.style.spacing.column_gap_mm * MM
        } else {
            0.0
        };
        let usable = content_width - gap * (columns.columns.len().saturating_sub(1)) as f32;
        let mut x = left;
        let mut frames = Vec::with_capacity(columns.columns.len());
        for column in &columns.columns {
            let width = usable * column.width_pct / 100.0;
            frames.push(Frame {
                x,
                width,
                y: start,
                ..page_frame
            });
            x += width + gap;
        }

        for (column, frame) in columns.columns.iter().zip(frames.iter_mut()) {
            if multi && columns.header_in_primary && column.role == ColumnRole::Primary {
                self.header(frame);
            }
            for &index in &column.sections {
                if let Some(section) = self.plan.sections.get(index) {
                    self.section(frame, section);
                }
            }
        }

        if multi && columns.divider {
            let color = self
                .plan
                .theme
                .color_for(ThemeRole::DecorativeRules, self.style.typography.muted_color);
            for pair in frames.windows(2) {
                let x = pair[0].x + pair[0].width + gap / 2.0;
                for page in 0..self.canvas.page_count() {
                    let from = if page == 0 { start } else { top };
                    self.canvas
                        .line(page, (x, from), (x, bottom), 0.5, color, false);
                }
            }
        }

        if page.show_page_numbers {
            self.page_numbers(page_height - page.margin_bottom_mm * MM / 2.0);
        }

        log::debug!("laid out {} PDF page(s)", self.canvas.page_count());
        self.canvas.finish(&self.plan.info, config.compress, scope)
    }

    fn span(&self, text: &str, face: Face, size: f32, color: Color) -> Span {
        Span {
            text: strip_control_chars(text).into_owned(),
            face,
            size,
            color,
            underline: false,
            link: None,
        }
    }

    fn body_face(&self, emphasis: Emphasis) -> Face {
        Face::new(self.style.typography.font_family, emphasis)
    }

    fn link_color(&self, fallback: Color) -> Color {
        self.plan.theme.color_for(ThemeRole::Hyperlinks, fallback)
    }

    /// Spans of parsed markup. Links take the hyperlink color and an underline.
    fn rich_spans(&self, text: &RichText, base: Face, size: f32, color: Color) -> Vec<Span> {
        text.runs
            .iter()
            .map(|run| {
                let mut span = self.span(&run.text, base.with_run(run.style), size, color);
                span.underline = run.style.underline;
                if let Some(target) = &run.link {
                    span.color = self.link_color(color);
                    span.underline = true;
                    span.link = Some(target.clone());
                }
                span
            })
            .collect()
    }

    fn line_height(&self, size: f32) -> f32 {
        size * self.style.typography.line_height
    }

    /// Total height of `spans` broken at `width`.
    fn measure(&self, spans: &[Span], width: f32, fallback: f32) -> f32 {
        break_lines(spans, width)
            .iter()
            .map(|line| self.line_height(line.size(spans, fallback)))
            .sum()
    }

    /// Break and draw `spans`, moving to a new page between lines as needed.
    fn block(&mut self, frame: &mut Frame, spans: &[Span], opts: Block<'_>) {
        let fallback = spans
            .first()
            .map_or(self.style.typography.body_font_size, |s| s.size);
        let reserved = opts.trailing.map_or(0.0, |s| s.width(&s.text) + 8.0);
        let width = (frame.width - opts.indent - reserved).max(1.0);
        let mut lines = break_lines(spans, width);
        if lines.is_empty() && opts.trailing.is_some() {
            lines.push(Line {
                last: true,
                ..Line::default()
            });
        }

        for (i, line) in lines.iter().enumerate() {
            let mut size = line.size(spans, fallback);
            if i == 0 {
                if let Some(trailing) = opts.trailing {
                    size = size.max(trailing.size);
                }
            }
            let height = self.line_height(size);
            frame.reserve(height);
            let baseline = frame.y + (height - size) / 2.0 + size * ASCENT;

            if i == 0 {
                if let Some(marker) = opts.marker {
                    self.canvas
                        .text(frame.page, frame.x, baseline, marker, &marker.text, 0.0, 0.0);
                }
                if let Some(trailing) = opts.trailing {
                    let x = frame.x + frame.width - trailing.width(&trailing.text);
                    self.canvas
                        .text(frame.page, x, baseline, trailing, &trailing.text, 0.0, 0.0);
                }
            }
            let area = Frame {
                x: frame.x + opts.indent,
                width,
                ..*frame
            };
            self.line(&area, baseline, spans, line, opts);
            frame.y += height;
        }
    }

    fn line(&mut self, frame: &Frame, baseline: f32, spans: &[Span], line: &Line, opts: Block<'_>) {
        let chars: usize = line.fragments.iter().map(|f| f.text.chars().count()).sum();
        let width = line.width + opts.char_spacing * chars as f32;
        let slack = (frame.width - width).max(0.0);
        let spaces = line.spaces();
        let (mut x, word_spacing) = match opts.alignment {
            Alignment::Left => (frame.x, 0.0),
            Alignment::Center => (frame.x + slack / 2.0, 0.0),
            Alignment::Right => (frame.x + slack, 0.0),
            Alignment::Justify if !line.last && spaces > 0 => (frame.x, slack / spaces as f32),
            Alignment::Justify => (frame.x, 0.0),
        };

        for fragment in &line.fragments {
            let span = &spans[fragment.span];
            let advance = fragment.width
                + word_spacing * fragment.spaces() as f32
                + opts.char_spacing * fragment.text.chars().count() as f32;
            self.canvas.text(
                frame.page,
                x,
                baseline,
                span,
                &fragment.text,
                word_spacing,
                opts.char_spacing,
            );
            if span.underline {
                let y = baseline + span.size * 0.12;
                self.canvas.line(
                    frame.page,
                    (x, y),
                    (x + advance, y),
                    span.size * 0.05,
                    span.color,
                    false,
                );
            }
            if let Some(target) = &span.link {
                let top = baseline - span.size * ASCENT;
                self.canvas
                    .link(frame.page, x, top, advance, span.size, target);
            }
            x += advance;
        }
    }

    fn header(&mut self, frame: &mut Frame) {
        let header = &self.plan.header;
        if header.is_empty() && self.image.is_none() {
            return;
        }
        let t = &self.style.typography;
        let h = &self.style.header;
        let img = &self.style.image;
        let theme = &self.plan.theme;
        let top = frame.y;
        let alignment = h.header_alignment;

        let mut text = *frame;
        let mut image_bottom = top;
        if let Some(placed) = &self.image {
            let size = (img.image_size_mm * MM).min(frame.width / 2.0);
            let (image_x, inset) = match img.image_position {
                ImagePosition::Left => (frame.x, (size + IMAGE_GAP, 0.0)),
                ImagePosition::Right => (frame.x + frame.width - size, (0.0, size + IMAGE_GAP)),
            };
            text = frame.inset(inset.0, inset.1);
            let border = img.image_border.then_some(img.image_border_color);
            self.canvas.image(
                frame.page,
                &placed.name,
                placed.aspect,
                (image_x, top),
                size,
                img.image_shape,
                border,
            );
            image_bottom = top + size;
        }

        if !header.name.is_empty() {
            let spans = [self.span(
                &header.name,
                Face::new(t.heading_font_family, t.name_emphasis),
                t.name_font_size,
                theme.color_for(ThemeRole::DocumentTitle, t.text_color),
            )];
            self.block(&mut text, &spans, Block::aligned(alignment));
        }
        if let Some(label) = &header.label {
            let spans = [self.span(
                label,
                self.body_face(t.label_emphasis),
                t.label_font_size,
                theme.color_for(ThemeRole::RoleLabel, t.muted_color),
            )];
            self.block(&mut text, &spans, Block::aligned(alignment));
        }

        let contact_face = self.body_face(Emphasis::NONE);
        let contact_span = |renderer: &Self, contact: &Contact| {
            let mut span = renderer.span(&contact.text, contact_face, t.contact_font_size, t.muted_color);
            if let Some(link) = &contact.link {
                span.color = renderer.link_color(t.muted_color);
                span.link = Some(link.clone());
            }
            span
        };
        match h.contact_layout {
            ContactLayout::Inline if !header.contacts.is_empty() => {
                let separator = self.span(
                    &h.contact_separator,
                    contact_face,
                    t.contact_font_size,
                    theme.color_for(ThemeRole::Iconography, t.muted_color),
                );
                let mut spans = Vec::with_capacity(header.contacts.len() * 2);
                for (i, contact) in header.contacts.iter().enumerate() {
                    if i > 0 {
                        spans.push(separator.clone());
                    }
                    spans.push(contact_span(self, contact));
                }
                self.block(&mut text, &spans, Block::aligned(alignment));
            }
            ContactLayout::Inline => {}
            ContactLayout::Stacked => {
                for contact in &header.contacts {
                    let spans = [contact_span(self, contact)];
                    self.block(&mut text, &spans, Block::aligned(alignment));
                }
            }
        }

        frame.y = text.y.max(image_bottom) + self.style.spacing.header_spacing_pt;
    }

    fn section(&mut self, frame: &mut Frame, section: &SectionBlock) {
        if let Some(heading) = &section.heading {
            self.heading(frame, heading);
        }
        for item in &section.items {
            match item {
                Item::Paragraph(p) => {
                    let t = &self.style.typography;
                    let spans =
                        self.rich_spans(&p.text, self.body_face(p.emphasis), t.body_font_size, t.text_color);
                    let alignment = p.text.alignment.unwrap_or(Alignment::Left);
                    self.block(frame, &spans, Block::aligned(alignment));
                    frame.y += self.style.spacing.paragraph_spacing_pt;
                }
                Item::Entry(entry) => self.entry(frame, entry),
                Item::Tags(tags) => self.tags(frame, tags),
            }
        }
        frame.y += self.style.spacing.section_spacing_pt;
    }

    fn heading(&mut self, frame: &mut Frame, text: &str) {
        let t = &self.style.typography;
        let hs = &self.style.heading;
        let theme = &self.plan.theme;
        let size = t.heading_font_size * hs.heading_size.scale();
        let rule = hs.heading_rule_width_pt.max(0.25);
        let rule_color = theme.color_for(ThemeRole::DecorativeRules, t.text_color);
        let treatment = hs.heading_treatment;

        let text_color = match treatment {
            HeadingTreatment::Filled => Color::WHITE,
            _ => theme.color_for(ThemeRole::SectionHeadings, t.text_color),
        };
        let spans = [self.span(
            text,
            Face::new(t.heading_font_family, hs.heading_emphasis),
            size,
            text_color,
        )];

        let (inner, pad) = match treatment {
            HeadingTreatment::LeftBar => (frame.inset(rule.max(2.5) + 6.0, 0.0), 0.0),
            HeadingTreatment::Boxed | HeadingTreatment::Filled => {
                (frame.inset(HEADING_PAD, HEADING_PAD), HEADING_PAD)
            }
            _ => (*frame, 0.0),
        };
        let text_height = self.measure(&spans, inner.width, size);
        let rules = match treatment {
            HeadingTreatment::Sandwich => 2.0 * (rule + 3.0),
            HeadingTreatment::Overline
            | HeadingTreatment::Underline
            | HeadingTreatment::ShortUnderline
            | HeadingTreatment::DottedUnderline => rule + 3.0,
            _ => 0.0,
        };
        // Keep the heading with the first line of its section.
        let following = self.line_height(t.body_font_size);
        frame.reserve(text_height + 2.0 * pad + rules + following);

        let full = (frame.x, frame.x + frame.width);
        if matches!(treatment, HeadingTreatment::Overline | HeadingTreatment::Sandwich) {
            let y = frame.y + rule / 2.0;
            self.canvas
                .line(frame.page, (full.0, y), (full.1, y), rule, rule_color, false);
            frame.y += rule + 3.0;
        }

        let box_top = frame.y;
        let box_height = text_height + 2.0 * pad;
        match treatment {
            HeadingTreatment::Filled => {
                self.canvas
                    .fill_rect(frame.page, frame.x, box_top, frame.width, box_height, rule_color);
            }
            HeadingTreatment::LeftBar => {
                self.canvas
                    .fill_rect(frame.page, frame.x, box_top, rule.max(2.5), text_height, rule_color);
            }
            _ => {}
        }

        let mut text_frame = Frame {
            y: box_top + pad,
            ..inner
        };
        let opts = Block {
            char_spacing: hs.heading_letter_spacing_pt,
            ..Block::aligned(hs.heading_alignment)
        };
        self.block(&mut text_frame, &spans, opts);
        frame.y = box_top + box_height;

        match treatment {
            HeadingTreatment::Boxed => {
                self.canvas.stroke_rect(
                    frame.page,
                    frame.x,
                    box_top,
                    frame.width,
                    box_height,
                    rule,
                    rule_color,
                );
            }
            HeadingTreatment::Underline
            | HeadingTreatment::Sandwich
            | HeadingTreatment::DottedUnderline => {
                let y = frame.y + 2.0 + rule / 2.0;
                let dotted = treatment == HeadingTreatment::DottedUnderline;
                self.canvas
                    .line(frame.page, (full.0, y), (full.1, y), rule, rule_color, dotted);
                frame.y += rule + 3.0;
            }
            HeadingTreatment::ShortUnderline => {
                let width = SHORT_RULE.min(frame.width);
                let x = match hs.heading_alignment {
                    Alignment::Center => frame.x + (frame.width - width) / 2.0,
                    Alignment::Right => frame.x + frame.width - width,
                    Alignment::Left | Alignment::Justify => frame.x,
                };
                let y = frame.y + 2.0 + rule / 2.0;
                self.canvas
                    .line(frame.page, (x, y), (x + width, y), rule.max(1.5), rule_color, false);
                frame.y += rule + 3.0;
            }
            _ => {}
        }
        frame.y += self.style.spacing.heading_spacing_pt;
    }

    fn entry(&mut self, frame: &mut Frame, entry: &Entry) {
        let t = &self.style.typography;
        let e = &self.style.entries;
        let muted = t.muted_color;

        let dates = (!entry.dates.trim().is_empty())
            .then(|| self.span(&entry.dates, self.body_face(e.date_emphasis), t.meta_font_size, muted));

        let mut title = self.rich_spans(
            &entry.title,
            self.body_face(entry.title_emphasis),
            t.entry_title_font_size,
            t.text_color,
        );
        let mut trailing = None;
        match (&dates, e.date_position) {
            (Some(d), DatePosition::Right) => trailing = Some(d),
            (Some(d), DatePosition::Inline) => {
                if !entry.title.is_blank() {
                    title.push(self.span(" | ", self.body_face(Emphasis::NONE), t.meta_font_size, muted));
                }
                title.push(d.clone());
            }
            _ => {}
        }
        if !entry.title.is_blank() || trailing.is_some() {
            let opts = Block {
                trailing,
                ..Block::aligned(Alignment::Left)
            };
            self.block(frame, &title, opts);
        }

        let mut subtitle = self.rich_spans(
            &entry.subtitle,
            self.body_face(entry.subtitle_emphasis),
            t.body_font_size,
            t.text_color,
        );
        if !entry.location.trim().is_empty() {
            if !entry.subtitle.is_blank() {
                subtitle.push(self.span(", ", self.body_face(Emphasis::NONE), t.body_font_size, muted));
            }
            subtitle.push(self.span(
                entry.location.trim(),
                self.body_face(e.location_emphasis),
                t.body_font_size,
                muted,
            ));
        }
        self.block(frame, &subtitle, Block::aligned(Alignment::Left));

        if let (Some(d), DatePosition::Below) = (&dates, e.date_position) {
            self.block(frame, std::slice::from_ref(d), Block::aligned(Alignment::Left));
        }

        if let Some(url) = &entry.url {
            let display = url.trim_start_matches("https://").trim_start_matches("http://");
            let mut span = self.span(display, self.body_face(Emphasis::NONE), t.meta_font_size, self.link_color(muted));
            span.link = Some(url.clone());
            self.block(frame, &[span], Block::aligned(Alignment::Left));
        }

        for detail in entry.details.iter().filter(|d| !d.trim().is_empty()) {
            let span = self.span(detail, self.body_face(Emphasis::NONE), t.meta_font_size, muted);
            self.block(frame, &[span], Block::aligned(Alignment::Left));
        }

        if let Some(description) = &entry.description {
            let spans = self.rich_spans(description, self.body_face(Emphasis::NONE), t.body_font_size, t.text_color);
            self.block(frame, &spans, Block::aligned(description.alignment.unwrap_or(Alignment::Left)));
        }

        let indent = self.style.spacing.bullet_indent_pt;
        for (i, bullet) in entry.bullets.iter().enumerate() {
            let spans = self.rich_spans(bullet, self.body_face(Emphasis::NONE), t.body_font_size, t.text_color);
            let marker = entry
                .list_style
                .marker(i)
                .map(|m| self.span(&m, self.body_face(Emphasis::NONE), t.body_font_size, t.text_color));
            let opts = Block {
                indent: if marker.is_some() { indent } else { 0.0 },
                marker: marker.as_ref(),
                ..Block::aligned(bullet.alignment.unwrap_or(Alignment::Left))
            };
            self.block(frame, &spans, opts);
        }

        frame.y += self.style.spacing.entry_spacing_pt;
    }

    fn tags(&mut self, frame: &mut Frame, tags: &Tags) {
        let t = &self.style.typography;
        let label = (!tags.label.trim().is_empty())
            .then(|| self.span(tags.label.trim(), self.body_face(tags.label_emphasis), t.body_font_size, t.text_color));
        let values = tags.joined();
        let values = (!values.trim().is_empty())
            .then(|| self.span(&values, self.body_face(Emphasis::NONE), t.body_font_size, t.text_color));

        match tags.layout {
            SkillsLayout::Inline => {
                let mut spans = Vec::with_capacity(3);
                if let Some(label) = label {
                    spans.push(label);
                    if values.is_some() {
                        spans.push(self.span(": ", self.body_face(tags.label_emphasis), t.body_font_size, t.text_color));
                    }
                }
                spans.extend(values);
                self.block(frame, &spans, Block::aligned(Alignment::Left));
            }
            SkillsLayout::Stacked | SkillsLayout::Compact => {
                for span in label.into_iter().chain(values) {
                    self.block(frame, &[span], Block::aligned(Alignment::Left));
                }
            }
        }
        frame.y += self.style.spacing.paragraph_spacing_pt;
    }

    fn page_numbers(&mut self, baseline: f32) {
        let t = &self.style.typography;
        let total = self.canvas.page_count();
        for page in 0..total {
            let span = self.span(
                &format!("{} / {}", page + 1, total),
                self.body_face(Emphasis::NONE),
                t.meta_font_size,
                t.muted_color,
            );
            let x = (self.canvas.width() - span.width(&span.text)) / 2.0;
            self.canvas.text(page, x, baseline, &span, &span.text, 0.0, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResumeDocument, WorkEntry};
    use crate::render::image::fixtures;
    use crate::resource::ResourcePool;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    fn sample() -> ResumeDocument {
        let mut doc = ResumeDocument::new("r1", "Resume", "classic");
        doc.basics.name = "Ada Lovelace".into();
        doc.basics.email = "ada@example.com".into();
        doc.basics.summary = "Writes **programs** for the [engine](https://example.com).".into();
        doc.work.push(WorkEntry {
            name: "Analytical Engines".into(),
            position: "Programmer".into(),
            start_date: "1842-01".into(),
            highlights: vec!["Published the first algorithm".into()],
            ..WorkEntry::default()
        });
        doc
    }

    fn render(doc: &ResumeDocument, template: Option<&str>, pool: &ResourcePool) -> Result<Vec<u8>> {
        let plan = RenderPlan::new(doc, template);
        let mut scope = pool.scope();
        PdfBackend::new(PdfConfig { compress: false }).render(&plan, &mut scope)
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_renders_text_and_links() {
        let pool = ResourcePool::new();
        let bytes = render(&sample(), None, &pool).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"(Ada Lovelace) Tj"));
        assert!(contains(&bytes, b"https://example.com"));
        assert!(contains(&bytes, b"mailto:ada@example.com"));
        assert!(contains(&bytes, b"/Times-Roman"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let pool = ResourcePool::new();
        let doc = sample();
        for template in ["classic", "modern", "sidebar", "executive", "compact"] {
            let a = render(&doc, Some(template), &pool).unwrap();
            let b = render(&doc, Some(template), &pool).unwrap();
            assert_eq!(a, b, "template {template}");
        }
    }

    #[test]
    fn test_long_content_paginates() {
        let mut doc = sample();
        doc.work[0].highlights = (0..200).map(|i| format!("Highlight number {i}")).collect();
        let pool = ResourcePool::new();
        let bytes = render(&doc, None, &pool).unwrap();
        assert!(contains(&bytes, b"(Highlight number 199) Tj"));
        let pages = bytes.windows(9).filter(|w| w == b"/MediaBox").count();
        assert!(pages > 1, "expected several pages, got {pages}");
    }

    #[test]
    fn test_image_embedded_and_released() {
        let mut doc = sample();
        doc.basics.image = format!("data:image/jpeg;base64,{}", STANDARD.encode(fixtures::jpeg()));
        let pool = ResourcePool::new();
        let bytes = render(&doc, Some("modern"), &pool).unwrap();
        assert!(contains(&bytes, b"/DCTDecode"));
        assert!(contains(&bytes, b"/Im1 Do"));
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn test_registered_image_is_embedded_data() {
        let mut doc = sample();
        doc.basics.image = STANDARD.encode(fixtures::png(2));
        let plan = RenderPlan::new(&doc, Some("modern"));
        let pool = ResourcePool::new();
        let mut scope = pool.scope();

        let renderer = PdfRenderer::new(&plan, &mut scope).unwrap();
        let registered = scope.get("Im1").unwrap().to_vec();
        assert_eq!(registered, image::png_image_data(&fixtures::png(2)).unwrap());
        assert_eq!(pool.live(), 1);

        let bytes = renderer.render(&PdfConfig { compress: false }, &scope).unwrap();
        assert!(contains(&bytes, &registered));
        drop(scope);
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let mut doc = sample();
        doc.metadata.title = "Bad\u{1}Title".into();
        doc.basics.name = "Ada\u{7}Lovelace".into();
        doc.basics.summary = "See [the engine](https://ex\u{1b}ample.com).".into();
        let pool = ResourcePool::new();
        let bytes = render(&doc, None, &pool).unwrap();

        assert!(contains(&bytes, b"(BadTitle)"));
        assert!(contains(&bytes, b"(AdaLovelace)"));
        assert!(contains(&bytes, b"(https://example.com)"));
        assert!(!bytes.iter().any(|&b| b == 0x01 || b == 0x07 || b == 0x1b));
    }

    #[test]
    fn test_png_with_alpha_is_omitted() {
        let mut doc = sample();
        doc.basics.image = STANDARD.encode(fixtures::png(6));
        let pool = ResourcePool::new();
        let bytes = render(&doc, Some("modern"), &pool).unwrap();
        assert!(!contains(&bytes, b"/Subtype /Image"));
        assert!(!contains(&bytes, b"/Subtype/Image"));
    }

    #[test]
    fn test_invalid_image_fails_and_releases() {
        let mut doc = sample();
        doc.basics.image = "data:image/png;base64,bm90IGFuIGltYWdl".into();
        let pool = ResourcePool::new();
        assert!(render(&doc, Some("modern"), &pool).is_err());
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn test_frame_reserve_breaks_once() {
        let mut frame = Frame {
            x: 0.0,
            width: 100.0,
            y: 700.0,
            page: 0,
            top: 50.0,
            bottom: 740.0,
        };
        frame.reserve(60.0);
        assert_eq!((frame.page, frame.y), (1, 50.0));
        frame.reserve(2000.0);
        assert_eq!(frame.page, 1);
    }
}
