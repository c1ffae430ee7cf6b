//! Section selection, ordering and conversion into backend-neutral items.
//!
//! [`dispatch`] walks the configured section order and produces one
//! [`SectionBlock`] per present section. Blocks carry parsed [`RichText`] and
//! resolved emphasis so both backends render the same structure.

pub mod dates;
pub mod header;
mod registry;

pub use header::{Contact, ContactKind, Header};

use crate::markup::RichText;
use crate::model::{ResumeDocument, SectionKind};
use crate::style::{Emphasis, ListStyle, ResolvedStyle, SkillsLayout};
use std::collections::BTreeSet;

/// One rendered section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBlock {
    pub kind: SectionKind,
    /// Unique within a plan: the kind identifier, or `custom:<id>` for a
    /// custom section.
    pub key: String,
    /// Heading text after capitalization; `None` when the heading is hidden.
    pub heading: Option<String>,
    pub items: Vec<Item>,
}

/// Backend-neutral content of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Paragraph(Paragraph),
    Entry(Entry),
    Tags(Tags),
}

/// A block of free text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: RichText,
    pub emphasis: Emphasis,
}

/// A dated entry: title line, meta line, description and bullets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub title: RichText,
    pub title_emphasis: Emphasis,
    pub subtitle: RichText,
    pub subtitle_emphasis: Emphasis,
    /// Formatted date range; empty when the entry has no dates.
    pub dates: String,
    pub location: String,
    pub url: Option<String>,
    pub description: Option<RichText>,
    /// Short secondary lines (score, keywords).
    pub details: Vec<String>,
    pub bullets: Vec<RichText>,
    pub list_style: ListStyle,
}

impl Entry {
    /// True when nothing displayable is left.
    pub fn is_blank(&self) -> bool {
        self.title.is_blank()
            && self.subtitle.is_blank()
            && self.dates.trim().is_empty()
            && self.location.trim().is_empty()
            && self.description.as_ref().map_or(true, RichText::is_blank)
            && self.details.iter().all(|d| d.trim().is_empty())
            && self.bullets.iter().all(RichText::is_blank)
    }
}

/// A labelled list of short values (skill keywords, a language's fluency).
#[derive(Debug, Clone, PartialEq)]
pub struct Tags {
    pub label: String,
    pub label_emphasis: Emphasis,
    pub values: Vec<String>,
    pub separator: String,
    pub layout: SkillsLayout,
}

impl Tags {
    pub fn is_blank(&self) -> bool {
        self.label.trim().is_empty() && self.values.iter().all(|v| v.trim().is_empty())
    }

    /// The values joined with the separator.
    pub fn joined(&self) -> String {
        self.values.join(&self.separator)
    }
}

/// Decide which sections render, in which order, with which headings.
pub fn dispatch(document: &ResumeDocument, style: &ResolvedStyle) -> Vec<SectionBlock> {
    let mut seen = BTreeSet::new();
    let mut blocks = Vec::new();

    for kind in section_order(style) {
        if !seen.insert(kind) {
            continue;
        }
        if kind.is_empty_in(document) {
            log::debug!("skipping empty section {}", kind.identifier());
            continue;
        }

        if kind == SectionKind::Custom {
            blocks.extend(registry::custom_blocks(document, style));
            continue;
        }

        let items = registry::render(kind, document, style);
        if items.is_empty() {
            log::debug!("section {} has no displayable entries", kind.identifier());
            continue;
        }
        blocks.push(SectionBlock {
            kind,
            key: kind.identifier().to_string(),
            heading: heading(kind, style.sections.title(kind), style),
            items,
        });
    }

    blocks
}

/// The configured order as kinds; unknown identifiers are dropped.
///
/// Duplicates are kept here and removed by the caller.
pub fn section_order(style: &ResolvedStyle) -> Vec<SectionKind> {
    let order = &style.sections.section_order;
    if order.is_empty() {
        return SectionKind::CANONICAL.to_vec();
    }
    order
        .iter()
        .filter_map(|id| {
            let kind = SectionKind::from_identifier(id);
            if kind.is_none() {
                log::debug!("ignoring unknown section identifier {id:?}");
            }
            kind
        })
        .collect()
}

pub(crate) fn heading(kind: SectionKind, title: &str, style: &ResolvedStyle) -> Option<String> {
    if !style.sections.heading_visible(kind) {
        return None;
    }
    Some(style.heading.heading_capitalization.apply(title.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomItem, CustomSection, EducationEntry, SkillGroup, WorkEntry};
    use crate::style::Template;
    use pretty_assertions::assert_eq;

    fn document() -> ResumeDocument {
        let mut doc = ResumeDocument::new("doc", "Main", "classic");
        doc.basics.summary = "Builds **reliable** systems.".into();
        doc.work.push(WorkEntry {
            id: "w1".into(),
            name: "Acme".into(),
            position: "Engineer".into(),
            start_date: "2020-01".into(),
            highlights: vec!["Shipped *things*".into()],
            ..WorkEntry::default()
        });
        doc.education.push(EducationEntry {
            id: "e1".into(),
            institution: "State University".into(),
            study_type: "BSc".into(),
            area: "Physics".into(),
            ..EducationEntry::default()
        });
        doc
    }

    fn kinds(blocks: &[SectionBlock]) -> Vec<SectionKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_unknown_and_empty_sections_skipped() {
        let mut style = Template::Classic.defaults();
        style.sections.section_order = vec![
            "work".into(),
            "skills".into(),
            "unknownid".into(),
            "education".into(),
        ];
        let blocks = dispatch(&document(), &style);
        assert_eq!(kinds(&blocks), vec![SectionKind::Work, SectionKind::Education]);
    }

    #[test]
    fn test_empty_order_uses_canonical() {
        let mut style = Template::Classic.defaults();
        style.sections.section_order.clear();
        let blocks = dispatch(&document(), &style);
        assert_eq!(
            kinds(&blocks),
            vec![SectionKind::Summary, SectionKind::Work, SectionKind::Education]
        );
    }

    #[test]
    fn test_duplicates_render_once() {
        let mut style = Template::Classic.defaults();
        style.sections.section_order =
            vec!["education".into(), "experience".into(), "work".into(), "education".into()];
        let blocks = dispatch(&document(), &style);
        assert_eq!(kinds(&blocks), vec![SectionKind::Education, SectionKind::Work]);
    }

    #[test]
    fn test_blank_summary_skipped() {
        let mut doc = document();
        doc.basics.summary = "   ".into();
        let blocks = dispatch(&doc, &Template::Classic.defaults());
        assert!(!kinds(&blocks).contains(&SectionKind::Summary));
    }

    #[test]
    fn test_hidden_heading_keeps_body() {
        let mut style = Template::Classic.defaults();
        style.sections.show_work_heading = false;
        let blocks = dispatch(&document(), &style);
        let work = blocks.iter().find(|b| b.kind == SectionKind::Work).unwrap();
        assert_eq!(work.heading, None);
        assert_eq!(work.items.len(), 1);
    }

    #[test]
    fn test_heading_capitalization() {
        let blocks = dispatch(&document(), &Template::Classic.defaults());
        assert_eq!(blocks[1].heading.as_deref(), Some("EXPERIENCE"));
    }

    #[test]
    fn test_blank_entries_dropped_siblings_kept() {
        let mut doc = document();
        doc.skills = vec![
            SkillGroup::default(),
            SkillGroup {
                name: "Rust".into(),
                keywords: vec!["nom".into()],
                ..SkillGroup::default()
            },
        ];
        doc.work.insert(0, WorkEntry::default());
        let blocks = dispatch(&doc, &Template::Classic.defaults());
        let work = blocks.iter().find(|b| b.kind == SectionKind::Work).unwrap();
        assert_eq!(work.items.len(), 1);
        let skills = blocks.iter().find(|b| b.kind == SectionKind::Skills).unwrap();
        assert_eq!(skills.items.len(), 1);
    }

    #[test]
    fn test_section_with_only_blank_entries_is_skipped() {
        let mut doc = document();
        doc.awards.push(Default::default());
        let blocks = dispatch(&doc, &Template::Classic.defaults());
        assert!(!kinds(&blocks).contains(&SectionKind::Awards));
    }

    #[test]
    fn test_custom_sections_each_get_a_block() {
        let mut doc = document();
        doc.custom_sections = vec![
            CustomSection {
                id: "c1".into(),
                title: "Volunteering".into(),
                items: vec![CustomItem {
                    title: "Food bank".into(),
                    ..CustomItem::default()
                }],
            },
            CustomSection {
                id: "c2".into(),
                title: String::new(),
                items: vec![CustomItem {
                    description: "Speaker at meetups".into(),
                    ..CustomItem::default()
                }],
            },
            CustomSection {
                id: "c3".into(),
                title: "Empty".into(),
                items: Vec::new(),
            },
        ];
        let blocks = dispatch(&doc, &Template::Classic.defaults());
        let custom: Vec<_> = blocks
            .iter()
            .filter(|b| b.kind == SectionKind::Custom)
            .collect();
        assert_eq!(custom.len(), 2);
        assert_eq!(custom[0].key, "custom:c1");
        assert_eq!(custom[0].heading.as_deref(), Some("VOLUNTEERING"));
        assert_eq!(custom[1].heading.as_deref(), Some("ADDITIONAL INFORMATION"));
    }

    #[test]
    fn test_dispatch_does_not_mutate_document() {
        let doc = document();
        let before = doc.clone();
        let _ = dispatch(&doc, &Template::Modern.defaults());
        assert_eq!(doc, before);
    }
}
