//! Merge template defaults with a saved configuration.

use super::config::{ResolvedStyle, StyleConfig};
use super::{Color, Template};
use crate::model::ResumeDocument;
use std::collections::BTreeSet;

const MIN_FONT_PT: f32 = 4.0;
const MAX_FONT_PT: f32 = 72.0;
const MAX_MARGIN_MM: f32 = 60.0;
const MAX_SPACING_PT: f32 = 72.0;

/// Resolve a template id and a saved configuration into a total style.
///
/// Unknown template ids fall back to [`Template::DEFAULT`]. Every field of the
/// result is populated: the saved value where present and sane, the template
/// default otherwise. Never fails.
pub fn resolve(template_id: &str, saved: &StyleConfig) -> ResolvedStyle {
    let defaults = Template::from_id(template_id).defaults();
    let merged = ResolvedStyle::merge(&defaults, saved);
    normalize(merged, &defaults)
}

/// Resolve the style a document renders with.
///
/// The document-level accent color takes precedence over the one stored in
/// its style configuration.
pub fn resolve_document(document: &ResumeDocument, template_id: Option<&str>) -> ResolvedStyle {
    let template_id = template_id.unwrap_or(&document.metadata.template);
    match document.metadata.accent_color {
        Some(accent) => {
            let mut saved = document.metadata.style.clone();
            saved.accent_color = Some(accent);
            resolve(template_id, &saved)
        }
        None => resolve(template_id, &document.metadata.style),
    }
}

/// The saved configuration after switching to another template.
///
/// Prior customizations are discarded: the result is the new template's
/// defaults with only the accent color carried over.
pub fn switch_template(template_id: &str, accent: Option<Color>) -> StyleConfig {
    let mut config = Template::from_id(template_id).defaults().to_config();
    if let Some(accent) = accent {
        config.accent_color = Some(accent);
    }
    config
}

/// Clamp out-of-range values and deduplicate lists.
///
/// Idempotent, so resolving an already-resolved style changes nothing.
fn normalize(mut style: ResolvedStyle, defaults: &ResolvedStyle) -> ResolvedStyle {
    let page = &mut style.page;
    page.margin_top_mm = clamp(page.margin_top_mm, 0.0, MAX_MARGIN_MM, defaults.page.margin_top_mm);
    page.margin_bottom_mm = clamp(
        page.margin_bottom_mm,
        0.0,
        MAX_MARGIN_MM,
        defaults.page.margin_bottom_mm,
    );
    page.margin_left_mm = clamp(page.margin_left_mm, 0.0, MAX_MARGIN_MM, defaults.page.margin_left_mm);
    page.margin_right_mm = clamp(
        page.margin_right_mm,
        0.0,
        MAX_MARGIN_MM,
        defaults.page.margin_right_mm,
    );

    let t = &mut style.typography;
    let d = &defaults.typography;
    t.body_font_size = font(t.body_font_size, d.body_font_size);
    t.name_font_size = font(t.name_font_size, d.name_font_size);
    t.label_font_size = font(t.label_font_size, d.label_font_size);
    t.contact_font_size = font(t.contact_font_size, d.contact_font_size);
    t.heading_font_size = font(t.heading_font_size, d.heading_font_size);
    t.entry_title_font_size = font(t.entry_title_font_size, d.entry_title_font_size);
    t.meta_font_size = font(t.meta_font_size, d.meta_font_size);
    t.line_height = clamp(t.line_height, 0.8, 3.0, d.line_height);

    let s = &mut style.spacing;
    let d = &defaults.spacing;
    s.section_spacing_pt = spacing(s.section_spacing_pt, d.section_spacing_pt);
    s.heading_spacing_pt = spacing(s.heading_spacing_pt, d.heading_spacing_pt);
    s.entry_spacing_pt = spacing(s.entry_spacing_pt, d.entry_spacing_pt);
    s.paragraph_spacing_pt = spacing(s.paragraph_spacing_pt, d.paragraph_spacing_pt);
    s.bullet_indent_pt = spacing(s.bullet_indent_pt, d.bullet_indent_pt);
    s.header_spacing_pt = spacing(s.header_spacing_pt, d.header_spacing_pt);
    s.column_gap_mm = clamp(s.column_gap_mm, 0.0, 30.0, d.column_gap_mm);

    let h = &mut style.heading;
    h.heading_rule_width_pt = clamp(
        h.heading_rule_width_pt,
        0.0,
        6.0,
        defaults.heading.heading_rule_width_pt,
    );
    h.heading_letter_spacing_pt = clamp(
        h.heading_letter_spacing_pt,
        0.0,
        5.0,
        defaults.heading.heading_letter_spacing_pt,
    );

    let l = &mut style.layout;
    l.columns = l.columns.clamp(1, 2);
    l.primary_width_pct = clamp(l.primary_width_pct, 25.0, 75.0, defaults.layout.primary_width_pct);
    dedup(&mut l.primary_sections);
    dedup(&mut l.secondary_sections);

    style.image.image_size_mm = clamp(
        style.image.image_size_mm,
        8.0,
        60.0,
        defaults.image.image_size_mm,
    );

    dedup(&mut style.sections.section_order);

    style
}

/// Clamp into `min..=max`; NaN falls back to the default.
fn clamp(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

fn font(value: f32, fallback: f32) -> f32 {
    clamp(value, MIN_FONT_PT, MAX_FONT_PT, fallback)
}

fn spacing(value: f32, fallback: f32) -> f32 {
    clamp(value, 0.0, MAX_SPACING_PT, fallback)
}

/// Keep the first occurrence of every element.
fn dedup<T: Ord + Clone>(items: &mut Vec<T>) {
    let mut seen = BTreeSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
