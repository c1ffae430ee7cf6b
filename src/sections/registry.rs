//! Per-kind conversion of document entries into items.

use super::dates::{format_date, format_range};
use super::{heading, Entry, Item, Paragraph, SectionBlock, Tags};
use crate::markup::{self, RichText};
use crate::model::{CustomSection, ResumeDocument, SectionKind};
use crate::style::{ResolvedStyle, SkillsLayout};

/// Items of one built-in section kind.
pub(super) fn render(kind: SectionKind, doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let items = match kind {
        SectionKind::Summary => summary(doc, style),
        SectionKind::Work => work(doc, style),
        SectionKind::Education => education(doc, style),
        SectionKind::Skills => skills(doc, style),
        SectionKind::Projects => projects(doc, style),
        SectionKind::Certificates => certificates(doc, style),
        SectionKind::Languages => languages(doc, style),
        SectionKind::Interests => interests(doc, style),
        SectionKind::Publications => publications(doc, style),
        SectionKind::Awards => awards(doc, style),
        SectionKind::References => references(doc, style),
        SectionKind::Custom => doc
            .custom_sections
            .iter()
            .flat_map(|section| custom(section, style))
            .collect(),
    };
    retain_displayable(kind, items)
}

/// One block per custom section that has displayable items.
pub(super) fn custom_blocks(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<SectionBlock> {
    doc.custom_sections
        .iter()
        .enumerate()
        .filter_map(|(index, section)| {
            let items = retain_displayable(SectionKind::Custom, custom(section, style));
            if items.is_empty() {
                return None;
            }
            let title = if section.title.trim().is_empty() {
                style.sections.custom_title.as_str()
            } else {
                section.title.as_str()
            };
            let key = if section.id.is_empty() {
                format!("custom:{index}")
            } else {
                format!("custom:{}", section.id)
            };
            Some(SectionBlock {
                kind: SectionKind::Custom,
                key,
                heading: heading(SectionKind::Custom, title, style),
                items,
            })
        })
        .collect()
}

fn retain_displayable(kind: SectionKind, items: Vec<Item>) -> Vec<Item> {
    let total = items.len();
    let kept: Vec<Item> = items
        .into_iter()
        .filter(|item| match item {
            Item::Paragraph(p) => !p.text.is_blank(),
            Item::Entry(e) => !e.is_blank(),
            Item::Tags(t) => !t.is_blank(),
        })
        .collect();
    if kept.len() < total {
        log::debug!(
            "dropped {} blank {} entries",
            total - kept.len(),
            kind.identifier()
        );
    }
    kept
}

fn rich(text: &str) -> RichText {
    markup::parse(text.trim())
}

fn bullets(lines: &[String]) -> Vec<RichText> {
    lines
        .iter()
        .map(|line| rich(line))
        .filter(|text| !text.is_blank())
        .collect()
}

fn description(text: &str) -> Option<RichText> {
    let text = rich(text);
    (!text.is_blank()).then_some(text)
}

fn url(style: &ResolvedStyle, url: &str) -> Option<String> {
    let url = url.trim();
    (style.entries.show_entry_urls && !url.is_empty()).then(|| url.to_string())
}

fn summary(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let mut text = rich(&doc.basics.summary);
    text.alignment.get_or_insert(style.formatting.summary_alignment);
    vec![Item::Paragraph(Paragraph {
        text,
        emphasis: style.formatting.summary_emphasis,
    })]
}

fn work(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.work
        .iter()
        .map(|w| {
            Item::Entry(Entry {
                title: rich(&w.position),
                title_emphasis: f.work_position_emphasis,
                subtitle: rich(&w.name),
                subtitle_emphasis: f.work_company_emphasis,
                dates: format_range(&w.start_date, &w.end_date, &style.entries),
                location: if f.work_show_location {
                    w.location.trim().to_string()
                } else {
                    String::new()
                },
                url: url(style, &w.url),
                description: if f.work_show_summary {
                    description(&w.summary)
                } else {
                    None
                },
                details: Vec::new(),
                bullets: bullets(&w.highlights),
                list_style: f.work_list_style,
            })
        })
        .collect()
}

fn education(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.education
        .iter()
        .map(|e| {
            let degree = match (e.study_type.trim(), e.area.trim()) {
                ("", area) => area.to_string(),
                (study_type, "") => study_type.to_string(),
                (study_type, area) => format!("{study_type} in {area}"),
            };
            let mut details = Vec::new();
            if f.education_show_score && !e.score.trim().is_empty() {
                details.push(format!("Score: {}", e.score.trim()));
            }
            Item::Entry(Entry {
                title: rich(&e.institution),
                title_emphasis: f.education_institution_emphasis,
                subtitle: rich(&degree),
                subtitle_emphasis: f.education_degree_emphasis,
                dates: format_range(&e.start_date, &e.end_date, &style.entries),
                location: e.location.trim().to_string(),
                url: url(style, &e.url),
                description: description(&e.summary),
                details,
                bullets: if f.education_show_courses {
                    bullets(&e.courses)
                } else {
                    Vec::new()
                },
                list_style: f.education_list_style,
            })
        })
        .collect()
}

fn skills(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;

    if f.skills_layout == SkillsLayout::Compact {
        let values: Vec<String> = doc
            .skills
            .iter()
            .flat_map(|group| {
                if group.keywords.is_empty() {
                    vec![group.name.trim().to_string()]
                } else {
                    group.keywords.iter().map(|k| k.trim().to_string()).collect()
                }
            })
            .filter(|v| !v.is_empty())
            .collect();
        return vec![Item::Tags(Tags {
            label: String::new(),
            label_emphasis: f.skills_name_emphasis,
            values,
            separator: f.skills_separator.clone(),
            layout: SkillsLayout::Compact,
        })];
    }

    doc.skills
        .iter()
        .map(|group| {
            let mut label = group.name.trim().to_string();
            if f.skills_show_level && !group.level.trim().is_empty() {
                label = format!("{label} ({})", group.level.trim());
            }
            Item::Tags(Tags {
                label,
                label_emphasis: f.skills_name_emphasis,
                values: trimmed(&group.keywords),
                separator: f.skills_separator.clone(),
                layout: f.skills_layout,
            })
        })
        .collect()
}

fn projects(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.projects
        .iter()
        .map(|p| {
            let keywords = trimmed(&p.keywords);
            let details = if f.projects_show_keywords && !keywords.is_empty() {
                vec![keywords.join(&f.skills_separator)]
            } else {
                Vec::new()
            };
            Item::Entry(Entry {
                title: rich(&p.name),
                title_emphasis: f.projects_name_emphasis,
                dates: format_range(&p.start_date, &p.end_date, &style.entries),
                url: if f.projects_show_url {
                    url(style, &p.url)
                } else {
                    None
                },
                description: description(&p.description),
                details,
                bullets: bullets(&p.highlights),
                list_style: f.projects_list_style,
                ..Entry::default()
            })
        })
        .collect()
}

fn certificates(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.certificates
        .iter()
        .map(|c| {
            Item::Entry(Entry {
                title: rich(&c.name),
                title_emphasis: f.certificates_name_emphasis,
                subtitle: if f.certificates_show_issuer {
                    rich(&c.issuer)
                } else {
                    RichText::default()
                },
                dates: format_date(&c.date, style.entries.date_format),
                url: url(style, &c.url),
                description: description(&c.summary),
                ..Entry::default()
            })
        })
        .collect()
}

fn languages(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.languages
        .iter()
        .map(|l| {
            let fluency = l.fluency.trim();
            let values = if f.languages_show_fluency && !fluency.is_empty() {
                vec![fluency.to_string()]
            } else {
                Vec::new()
            };
            Item::Tags(Tags {
                label: l.language.trim().to_string(),
                label_emphasis: f.languages_name_emphasis,
                values,
                separator: f.skills_separator.clone(),
                layout: SkillsLayout::Inline,
            })
        })
        .collect()
}

fn interests(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.interests
        .iter()
        .map(|i| {
            Item::Tags(Tags {
                label: i.name.trim().to_string(),
                label_emphasis: f.interests_name_emphasis,
                values: if f.interests_show_keywords {
                    trimmed(&i.keywords)
                } else {
                    Vec::new()
                },
                separator: f.skills_separator.clone(),
                layout: SkillsLayout::Inline,
            })
        })
        .collect()
}

fn publications(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.publications
        .iter()
        .map(|p| {
            Item::Entry(Entry {
                title: rich(&p.name),
                title_emphasis: f.publications_name_emphasis,
                subtitle: if f.publications_show_publisher {
                    rich(&p.publisher)
                } else {
                    RichText::default()
                },
                dates: format_date(&p.release_date, style.entries.date_format),
                url: url(style, &p.url),
                description: description(&p.summary),
                ..Entry::default()
            })
        })
        .collect()
}

fn awards(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.awards
        .iter()
        .map(|a| {
            Item::Entry(Entry {
                title: rich(&a.title),
                title_emphasis: f.awards_title_emphasis,
                subtitle: if f.awards_show_awarder {
                    rich(&a.awarder)
                } else {
                    RichText::default()
                },
                dates: format_date(&a.date, style.entries.date_format),
                description: description(&a.summary),
                ..Entry::default()
            })
        })
        .collect()
}

fn references(doc: &ResumeDocument, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    doc.references
        .iter()
        .map(|r| {
            Item::Entry(Entry {
                title: rich(&r.name),
                title_emphasis: f.references_name_emphasis,
                description: if f.references_show_text {
                    description(&r.reference)
                } else {
                    None
                },
                ..Entry::default()
            })
        })
        .collect()
}

fn custom(section: &CustomSection, style: &ResolvedStyle) -> Vec<Item> {
    let f = &style.formatting;
    section
        .items
        .iter()
        .map(|item| {
            Item::Entry(Entry {
                title: rich(&item.title),
                title_emphasis: f.custom_title_emphasis,
                subtitle: rich(&item.subtitle),
                subtitle_emphasis: style.entries.location_emphasis,
                dates: format_date(&item.date, style.entries.date_format),
                url: url(style, &item.url),
                description: description(&item.description),
                bullets: bullets(&item.highlights),
                list_style: f.custom_list_style,
                ..Entry::default()
            })
        })
        .collect()
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LanguageEntry, ProjectEntry, SkillGroup, WorkEntry};
    use crate::style::{Alignment, Emphasis, Template};
    use pretty_assertions::assert_eq;

    fn entry(item: &Item) -> &Entry {
        match item {
            Item::Entry(e) => e,
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn test_work_entry_fields() {
        let mut doc = ResumeDocument::default();
        doc.work.push(WorkEntry {
            name: "Acme".into(),
            position: "Engineer".into(),
            location: "Remote".into(),
            start_date: "2019-05".into(),
            end_date: "2021-02".into(),
            url: "https://acme.test".into(),
            highlights: vec!["Did **x**".into(), "   ".into()],
            ..WorkEntry::default()
        });
        let style = Template::Classic.defaults();
        let items = render(SectionKind::Work, &doc, &style);
        let e = entry(&items[0]);
        assert_eq!(e.title.plain_text(), "Engineer");
        assert_eq!(e.title_emphasis, Emphasis::BOLD);
        assert_eq!(e.subtitle.plain_text(), "Acme");
        assert_eq!(e.dates, "May 2019 \u{2013} Feb 2021");
        assert_eq!(e.location, "Remote");
        assert_eq!(e.url.as_deref(), Some("https://acme.test"));
        assert_eq!(e.bullets.len(), 1);
        assert!(e.bullets[0].runs[1].style.bold);
    }

    #[test]
    fn test_work_toggles() {
        let mut doc = ResumeDocument::default();
        doc.work.push(WorkEntry {
            position: "Engineer".into(),
            location: "Remote".into(),
            summary: "Team lead".into(),
            ..WorkEntry::default()
        });
        let mut style = Template::Classic.defaults();
        style.formatting.work_show_location = false;
        style.formatting.work_show_summary = false;
        let items = render(SectionKind::Work, &doc, &style);
        let e = entry(&items[0]);
        assert!(e.location.is_empty());
        assert_eq!(e.description, None);
    }

    #[test]
    fn test_summary_alignment_defaults_to_style() {
        let mut doc = ResumeDocument::default();
        doc.basics.summary = "Hello".into();
        let style = Template::Classic.defaults();
        let items = render(SectionKind::Summary, &doc, &style);
        let Item::Paragraph(p) = &items[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.text.alignment, Some(Alignment::Justify));

        doc.basics.summary = r#"<div align="center">Hello</div>"#.into();
        let items = render(SectionKind::Summary, &doc, &style);
        let Item::Paragraph(p) = &items[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.text.alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_compact_skills_merge_into_one_item() {
        let mut doc = ResumeDocument::default();
        doc.skills = vec![
            SkillGroup {
                name: "Languages".into(),
                keywords: vec!["Rust".into(), "Go".into()],
                ..SkillGroup::default()
            },
            SkillGroup {
                name: "Docker".into(),
                ..SkillGroup::default()
            },
        ];
        let style = Template::Compact.defaults();
        let items = render(SectionKind::Skills, &doc, &style);
        assert_eq!(items.len(), 1);
        let Item::Tags(tags) = &items[0] else {
            panic!("expected tags");
        };
        assert_eq!(tags.values, vec!["Rust", "Go", "Docker"]);
    }

    #[test]
    fn test_skill_level_shown_when_enabled() {
        let mut doc = ResumeDocument::default();
        doc.skills.push(SkillGroup {
            name: "Rust".into(),
            level: "Expert".into(),
            ..SkillGroup::default()
        });
        let mut style = Template::Classic.defaults();
        style.formatting.skills_show_level = true;
        let items = render(SectionKind::Skills, &doc, &style);
        let Item::Tags(tags) = &items[0] else {
            panic!("expected tags");
        };
        assert_eq!(tags.label, "Rust (Expert)");
    }

    #[test]
    fn test_language_without_fluency() {
        let mut doc = ResumeDocument::default();
        doc.languages.push(LanguageEntry {
            language: "German".into(),
            fluency: "Native".into(),
            ..LanguageEntry::default()
        });
        let mut style = Template::Classic.defaults();
        style.formatting.languages_show_fluency = false;
        let items = render(SectionKind::Languages, &doc, &style);
        let Item::Tags(tags) = &items[0] else {
            panic!("expected tags");
        };
        assert!(tags.values.is_empty());
    }

    #[test]
    fn test_project_keywords_and_url_toggle() {
        let mut doc = ResumeDocument::default();
        doc.projects.push(ProjectEntry {
            name: "Parser".into(),
            url: "https://p.test".into(),
            keywords: vec!["rust".into(), "nom".into()],
            ..ProjectEntry::default()
        });
        let mut style = Template::Classic.defaults();
        style.formatting.projects_show_url = false;
        let items = render(SectionKind::Projects, &doc, &style);
        let e = entry(&items[0]);
        assert_eq!(e.url, None);
        assert_eq!(e.details, vec!["rust, nom"]);
    }
}
