//! Built-in templates and their default style configurations.

use super::config::{
    EntryStyle, HeaderStyle, HeadingStyle, ImageStyle, LayoutStyle, PageStyle, ResolvedStyle,
    SectionFormatting, SectionSettings, SpacingStyle, ThemeStyle, TypographyStyle,
};
use super::{
    Alignment, Capitalization, Color, ContactLayout, DateFormat, DatePosition, Emphasis, FontFamily,
    HeaderPlacement, HeadingSize, HeadingTreatment, ImagePosition, ImageShape, ListStyle, PaperSize,
    SkillsLayout, ThemeRole,
};
use crate::model::SectionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A built-in template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    /// Single column, serif headings over rules. The fallback for unknown ids.
    #[default]
    Classic,
    /// Two columns with a narrow sidebar on the right.
    Modern,
    /// Two columns with the sidebar on the left.
    Sidebar,
    Minimal,
    Executive,
    Compact,
}

impl Template {
    pub const DEFAULT: Template = Template::Classic;

    pub fn all() -> &'static [Template] {
        &[
            Template::Classic,
            Template::Modern,
            Template::Sidebar,
            Template::Minimal,
            Template::Executive,
            Template::Compact,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Sidebar => "sidebar",
            Template::Minimal => "minimal",
            Template::Executive => "executive",
            Template::Compact => "compact",
        }
    }

    /// Look up a template by id, falling back to [`Template::DEFAULT`].
    pub fn from_id(id: &str) -> Template {
        Self::try_from_id(id).unwrap_or_else(|| {
            if !id.trim().is_empty() {
                log::debug!("unknown template id {id:?}, using {}", Self::DEFAULT.id());
            }
            Self::DEFAULT
        })
    }

    pub fn try_from_id(id: &str) -> Option<Template> {
        let id = id.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.id().eq_ignore_ascii_case(id))
    }

    /// The template's complete default style.
    pub fn defaults(&self) -> ResolvedStyle {
        match self {
            Template::Classic => classic(),
            Template::Modern => modern(),
            Template::Sidebar => sidebar(),
            Template::Minimal => minimal(),
            Template::Executive => executive(),
            Template::Compact => compact(),
        }
    }
}

const PRIMARY_KINDS: [SectionKind; 5] = [
    SectionKind::Summary,
    SectionKind::Work,
    SectionKind::Projects,
    SectionKind::Custom,
    SectionKind::References,
];

const SECONDARY_KINDS: [SectionKind; 7] = [
    SectionKind::Skills,
    SectionKind::Education,
    SectionKind::Certificates,
    SectionKind::Languages,
    SectionKind::Interests,
    SectionKind::Awards,
    SectionKind::Publications,
];

fn roles(list: &[ThemeRole]) -> BTreeSet<ThemeRole> {
    list.iter().copied().collect()
}

fn classic() -> ResolvedStyle {
    ResolvedStyle {
        page: PageStyle {
            paper_size: PaperSize::Letter,
            margin_top_mm: 18.0,
            margin_bottom_mm: 18.0,
            margin_left_mm: 20.0,
            margin_right_mm: 20.0,
            show_page_numbers: false,
        },
        typography: TypographyStyle {
            font_family: FontFamily::Serif,
            heading_font_family: FontFamily::Serif,
            body_font_size: 10.5,
            name_font_size: 24.0,
            label_font_size: 12.0,
            contact_font_size: 9.5,
            heading_font_size: 12.0,
            entry_title_font_size: 11.0,
            meta_font_size: 9.5,
            line_height: 1.3,
            text_color: Color::gray(0x22),
            muted_color: Color::gray(0x66),
            name_emphasis: Emphasis::BOLD,
            label_emphasis: Emphasis::NONE,
            name_capitalization: Capitalization::AsTyped,
        },
        spacing: SpacingStyle {
            section_spacing_pt: 12.0,
            heading_spacing_pt: 6.0,
            entry_spacing_pt: 8.0,
            paragraph_spacing_pt: 4.0,
            bullet_indent_pt: 12.0,
            header_spacing_pt: 10.0,
            column_gap_mm: 8.0,
        },
        heading: HeadingStyle {
            heading_treatment: HeadingTreatment::Underline,
            heading_alignment: Alignment::Left,
            heading_capitalization: Capitalization::Uppercase,
            heading_size: HeadingSize::Medium,
            heading_emphasis: Emphasis::BOLD,
            heading_rule_width_pt: 0.75,
            heading_letter_spacing_pt: 0.5,
        },
        header: HeaderStyle {
            header_alignment: Alignment::Center,
            contact_layout: ContactLayout::Inline,
            contact_separator: " | ".to_string(),
            show_label: true,
            show_email: true,
            show_phone: true,
            show_url: true,
            show_location: true,
            show_profiles: true,
            show_contact_labels: false,
        },
        theme: ThemeStyle {
            accent_color: Color::rgb(0x1f, 0x4e, 0x79),
            accent_roles: roles(&[
                ThemeRole::DocumentTitle,
                ThemeRole::SectionHeadings,
                ThemeRole::DecorativeRules,
                ThemeRole::Hyperlinks,
            ]),
        },
        layout: LayoutStyle {
            columns: 1,
            primary_width_pct: 65.0,
            sidebar_left: false,
            header_placement: HeaderPlacement::FullWidth,
            primary_sections: PRIMARY_KINDS.to_vec(),
            secondary_sections: SECONDARY_KINDS.to_vec(),
            column_divider: false,
        },
        image: ImageStyle {
            show_image: false,
            image_shape: ImageShape::Circle,
            image_size_mm: 28.0,
            image_position: ImagePosition::Right,
            image_border: false,
            image_border_color: Color::gray(0xcc),
        },
        entries: EntryStyle {
            date_format: DateFormat::MonthYear,
            date_separator: " \u{2013} ".to_string(),
            present_label: "Present".to_string(),
            date_position: DatePosition::Right,
            date_emphasis: Emphasis::NONE,
            location_emphasis: Emphasis::ITALIC,
            show_entry_urls: true,
        },
        sections: SectionSettings {
            section_order: SectionKind::CANONICAL
                .iter()
                .map(|k| k.identifier().to_string())
                .collect(),
            show_summary_heading: true,
            show_work_heading: true,
            show_education_heading: true,
            show_skills_heading: true,
            show_projects_heading: true,
            show_certificates_heading: true,
            show_languages_heading: true,
            show_interests_heading: true,
            show_publications_heading: true,
            show_awards_heading: true,
            show_references_heading: true,
            show_custom_heading: true,
            summary_title: "Summary".to_string(),
            work_title: "Experience".to_string(),
            education_title: "Education".to_string(),
            skills_title: "Skills".to_string(),
            projects_title: "Projects".to_string(),
            certificates_title: "Certifications".to_string(),
            languages_title: "Languages".to_string(),
            interests_title: "Interests".to_string(),
            publications_title: "Publications".to_string(),
            awards_title: "Awards".to_string(),
            references_title: "References".to_string(),
            custom_title: "Additional Information".to_string(),
        },
        formatting: SectionFormatting {
            summary_alignment: Alignment::Justify,
            summary_emphasis: Emphasis::NONE,
            work_position_emphasis: Emphasis::BOLD,
            work_company_emphasis: Emphasis::ITALIC,
            work_list_style: ListStyle::Bullet,
            work_show_location: true,
            work_show_summary: true,
            education_institution_emphasis: Emphasis::BOLD,
            education_degree_emphasis: Emphasis::NONE,
            education_list_style: ListStyle::Bullet,
            education_show_score: true,
            education_show_courses: true,
            skills_name_emphasis: Emphasis::BOLD,
            skills_layout: SkillsLayout::Inline,
            skills_separator: ", ".to_string(),
            skills_show_level: false,
            projects_name_emphasis: Emphasis::BOLD,
            projects_list_style: ListStyle::Bullet,
            projects_show_keywords: true,
            projects_show_url: true,
            certificates_name_emphasis: Emphasis::BOLD,
            certificates_show_issuer: true,
            languages_name_emphasis: Emphasis::BOLD,
            languages_show_fluency: true,
            interests_name_emphasis: Emphasis::BOLD,
            interests_show_keywords: true,
            publications_name_emphasis: Emphasis::BOLD,
            publications_show_publisher: true,
            awards_title_emphasis: Emphasis::BOLD,
            awards_show_awarder: true,
            references_name_emphasis: Emphasis::BOLD,
            references_show_text: true,
            custom_title_emphasis: Emphasis::BOLD,
            custom_list_style: ListStyle::Bullet,
        },
    }
}

fn modern() -> ResolvedStyle {
    let mut style = classic();
    style.typography.font_family = FontFamily::Sans;
    style.typography.heading_font_family = FontFamily::Sans;
    style.typography.body_font_size = 10.0;
    style.typography.name_font_size = 26.0;
    style.typography.label_emphasis = Emphasis::BOLD;
    style.heading.heading_treatment = HeadingTreatment::ShortUnderline;
    style.header.header_alignment = Alignment::Left;
    style.theme.accent_color = Color::rgb(0x0e, 0x76, 0x90);
    style.theme.accent_roles = roles(&[
        ThemeRole::DocumentTitle,
        ThemeRole::RoleLabel,
        ThemeRole::SectionHeadings,
        ThemeRole::Hyperlinks,
        ThemeRole::Iconography,
        ThemeRole::DecorativeRules,
    ]);
    style.layout.columns = 2;
    style.layout.primary_width_pct = 64.0;
    style.layout.column_divider = true;
    style.image.show_image = true;
    style.formatting.skills_layout = SkillsLayout::Stacked;
    style.formatting.summary_alignment = Alignment::Left;
    style
}

fn sidebar() -> ResolvedStyle {
    let mut style = modern();
    style.heading.heading_treatment = HeadingTreatment::Filled;
    style.heading.heading_size = HeadingSize::Small;
    style.layout.sidebar_left = true;
    style.layout.primary_width_pct = 62.0;
    style.layout.header_placement = HeaderPlacement::PrimaryColumn;
    style.layout.column_divider = false;
    style.image.image_position = ImagePosition::Left;
    style.image.image_shape = ImageShape::Rounded;
    style.theme.accent_color = Color::rgb(0x5b, 0x3c, 0x88);
    style
}

fn minimal() -> ResolvedStyle {
    let mut style = classic();
    style.typography.font_family = FontFamily::Sans;
    style.typography.heading_font_family = FontFamily::Sans;
    style.typography.name_emphasis = Emphasis::NONE;
    style.typography.name_font_size = 22.0;
    style.heading.heading_treatment = HeadingTreatment::Plain;
    style.heading.heading_capitalization = Capitalization::AsTyped;
    style.heading.heading_letter_spacing_pt = 0.0;
    style.header.header_alignment = Alignment::Left;
    style.header.contact_separator = "  \u{00b7}  ".to_string();
    style.theme.accent_color = Color::gray(0x33);
    style.theme.accent_roles = roles(&[ThemeRole::Hyperlinks]);
    style.entries.location_emphasis = Emphasis::NONE;
    style.formatting.work_company_emphasis = Emphasis::NONE;
    style.formatting.work_list_style = ListStyle::Dash;
    style.formatting.projects_list_style = ListStyle::Dash;
    style.formatting.custom_list_style = ListStyle::Dash;
    style.formatting.summary_alignment = Alignment::Left;
    style
}

fn executive() -> ResolvedStyle {
    let mut style = classic();
    style.page.paper_size = PaperSize::A4;
    style.page.show_page_numbers = true;
    style.typography.name_capitalization = Capitalization::Uppercase;
    style.typography.name_font_size = 22.0;
    style.heading.heading_treatment = HeadingTreatment::Sandwich;
    style.heading.heading_alignment = Alignment::Center;
    style.heading.heading_size = HeadingSize::Large;
    style.header.contact_layout = ContactLayout::Inline;
    style.header.show_contact_labels = true;
    style.theme.accent_color = Color::rgb(0x7a, 0x1f, 0x2b);
    style.entries.date_format = DateFormat::MonthYearLong;
    style.entries.date_emphasis = Emphasis::ITALIC;
    style.sections.work_title = "Professional Experience".to_string();
    style.sections.summary_title = "Executive Profile".to_string();
    style
}

fn compact() -> ResolvedStyle {
    let mut style = classic();
    style.page.margin_top_mm = 12.0;
    style.page.margin_bottom_mm = 12.0;
    style.page.margin_left_mm = 14.0;
    style.page.margin_right_mm = 14.0;
    style.typography.font_family = FontFamily::Sans;
    style.typography.heading_font_family = FontFamily::Sans;
    style.typography.body_font_size = 9.0;
    style.typography.name_font_size = 18.0;
    style.typography.label_font_size = 10.0;
    style.typography.contact_font_size = 8.5;
    style.typography.heading_font_size = 10.0;
    style.typography.entry_title_font_size = 9.5;
    style.typography.meta_font_size = 8.5;
    style.typography.line_height = 1.15;
    style.spacing.section_spacing_pt = 7.0;
    style.spacing.heading_spacing_pt = 3.0;
    style.spacing.entry_spacing_pt = 4.0;
    style.spacing.paragraph_spacing_pt = 2.0;
    style.spacing.header_spacing_pt = 6.0;
    style.heading.heading_treatment = HeadingTreatment::LeftBar;
    style.header.header_alignment = Alignment::Left;
    style.entries.date_format = DateFormat::Numeric;
    style.entries.date_position = DatePosition::Inline;
    style.formatting.skills_layout = SkillsLayout::Compact;
    style.formatting.education_show_courses = false;
    style
}
