//! The style field table.
//!
//! Every presentation setting is declared exactly once below. From that table
//! the macro derives three things that must never drift apart:
//!
//! - one grouped struct per sub-group (`TypographyStyle`, `LayoutStyle`, ...),
//!   whose fields are all required, collected into [`ResolvedStyle`];
//! - the flat [`StyleConfig`] saved with a document, where every field is an
//!   `Option` and an invalid stored value reads as absent;
//! - the field-by-field merge between the two.

use super::{
    Alignment, Capitalization, Color, ContactLayout, DateFormat, DatePosition, Emphasis, FontFamily,
    HeaderPlacement, HeadingSize, HeadingTreatment, ImagePosition, ImageShape, ListStyle, PaperSize,
    SkillsLayout, ThemeRole,
};
use crate::error::DocumentError;
use crate::model::SectionKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Read an optional setting, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            log::warn!("ignoring invalid style value: {e}");
            Ok(None)
        }
    }
}

macro_rules! style_fields {
    (
        $(
            $(#[$gmeta:meta])*
            $group:ident : $gty:ident {
                $(
                    $(#[$fmeta:meta])*
                    $field:ident : $ty:ty
                ),* $(,)?
            }
        )*
    ) => {
        $(
            $(#[$gmeta])*
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            #[serde(rename_all = "camelCase")]
            pub struct $gty {
                $(
                    $(#[$fmeta])*
                    pub $field: $ty,
                )*
            }
        )*

        /// A style configuration in which every setting is populated.
        ///
        /// Produced only by [`crate::style::resolve`]; every renderer reads
        /// this and never the saved [`StyleConfig`].
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct ResolvedStyle {
            $( pub $group: $gty, )*
        }

        /// The flat record of presentation settings saved with a document.
        ///
        /// Any field may be missing; older documents simply lack settings
        /// added later.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub struct StyleConfig {
            $($(
                #[serde(
                    default,
                    deserialize_with = "lenient",
                    skip_serializing_if = "Option::is_none"
                )]
                pub $field: Option<$ty>,
            )*)*
        }

        impl ResolvedStyle {
            /// Saved value wins; the default fills every gap.
            pub(crate) fn merge(defaults: &ResolvedStyle, saved: &StyleConfig) -> ResolvedStyle {
                ResolvedStyle {
                    $(
                        $group: $gty {
                            $(
                                $field: match &saved.$field {
                                    Some(value) => value.clone(),
                                    None => defaults.$group.$field.clone(),
                                },
                            )*
                        },
                    )*
                }
            }

            /// The equivalent saved configuration with every field present.
            pub fn to_config(&self) -> StyleConfig {
                StyleConfig {
                    $($( $field: Some(self.$group.$field.clone()), )*)*
                }
            }
        }

        impl StyleConfig {
            /// Names of every setting, in table order.
            pub const FIELD_NAMES: &'static [&'static str] = &[$($( stringify!($field), )*)*];

            /// Number of settings present in this record.
            pub fn populated(&self) -> usize {
                let mut count = 0;
                $($(
                    if self.$field.is_some() {
                        count += 1;
                    }
                )*)*
                count
            }
        }
    };
}

style_fields! {
    /// Page geometry.
    page: PageStyle {
        paper_size: PaperSize,
        margin_top_mm: f32,
        margin_bottom_mm: f32,
        margin_left_mm: f32,
        margin_right_mm: f32,
        show_page_numbers: bool,
    }

    /// Fonts, sizes (points) and text colors.
    typography: TypographyStyle {
        font_family: FontFamily,
        heading_font_family: FontFamily,
        body_font_size: f32,
        name_font_size: f32,
        label_font_size: f32,
        contact_font_size: f32,
        heading_font_size: f32,
        entry_title_font_size: f32,
        meta_font_size: f32,
        /// Line height as a multiple of the font size.
        line_height: f32,
        text_color: Color,
        muted_color: Color,
        name_emphasis: Emphasis,
        label_emphasis: Emphasis,
        name_capitalization: Capitalization,
    }

    /// Vertical rhythm, in points unless noted.
    spacing: SpacingStyle {
        section_spacing_pt: f32,
        heading_spacing_pt: f32,
        entry_spacing_pt: f32,
        paragraph_spacing_pt: f32,
        bullet_indent_pt: f32,
        header_spacing_pt: f32,
        column_gap_mm: f32,
    }

    /// Section heading appearance.
    heading: HeadingStyle {
        heading_treatment: HeadingTreatment,
        heading_alignment: Alignment,
        heading_capitalization: Capitalization,
        heading_size: HeadingSize,
        heading_emphasis: Emphasis,
        heading_rule_width_pt: f32,
        heading_letter_spacing_pt: f32,
    }

    /// Name, label and contact line.
    header: HeaderStyle {
        header_alignment: Alignment,
        contact_layout: ContactLayout,
        contact_separator: String,
        show_label: bool,
        show_email: bool,
        show_phone: bool,
        show_url: bool,
        show_location: bool,
        show_profiles: bool,
        show_contact_labels: bool,
    }

    /// Accent color and the roles it applies to.
    theme: ThemeStyle {
        accent_color: Color,
        accent_roles: BTreeSet<ThemeRole>,
    }

    /// Column layout.
    layout: LayoutStyle {
        columns: u8,
        /// Width of the primary column as a percentage of the content width.
        primary_width_pct: f32,
        sidebar_left: bool,
        header_placement: HeaderPlacement,
        primary_sections: Vec<SectionKind>,
        secondary_sections: Vec<SectionKind>,
        column_divider: bool,
    }

    /// Profile image presentation.
    image: ImageStyle {
        show_image: bool,
        image_shape: ImageShape,
        image_size_mm: f32,
        image_position: ImagePosition,
        image_border: bool,
        image_border_color: Color,
    }

    /// Shared formatting of dated entries.
    entries: EntryStyle {
        date_format: DateFormat,
        date_separator: String,
        present_label: String,
        date_position: DatePosition,
        date_emphasis: Emphasis,
        location_emphasis: Emphasis,
        show_entry_urls: bool,
    }

    /// Section order, heading visibility and heading titles.
    sections: SectionSettings {
        section_order: Vec<String>,
        show_summary_heading: bool,
        show_work_heading: bool,
        show_education_heading: bool,
        show_skills_heading: bool,
        show_projects_heading: bool,
        show_certificates_heading: bool,
        show_languages_heading: bool,
        show_interests_heading: bool,
        show_publications_heading: bool,
        show_awards_heading: bool,
        show_references_heading: bool,
        show_custom_heading: bool,
        summary_title: String,
        work_title: String,
        education_title: String,
        skills_title: String,
        projects_title: String,
        certificates_title: String,
        languages_title: String,
        interests_title: String,
        publications_title: String,
        awards_title: String,
        references_title: String,
        custom_title: String,
    }

    /// Per-section-kind emphasis, list style and field toggles.
    formatting: SectionFormatting {
        summary_alignment: Alignment,
        summary_emphasis: Emphasis,
        work_position_emphasis: Emphasis,
        work_company_emphasis: Emphasis,
        work_list_style: ListStyle,
        work_show_location: bool,
        work_show_summary: bool,
        education_institution_emphasis: Emphasis,
        education_degree_emphasis: Emphasis,
        education_list_style: ListStyle,
        education_show_score: bool,
        education_show_courses: bool,
        skills_name_emphasis: Emphasis,
        skills_layout: SkillsLayout,
        skills_separator: String,
        skills_show_level: bool,
        projects_name_emphasis: Emphasis,
        projects_list_style: ListStyle,
        projects_show_keywords: bool,
        projects_show_url: bool,
        certificates_name_emphasis: Emphasis,
        certificates_show_issuer: bool,
        languages_name_emphasis: Emphasis,
        languages_show_fluency: bool,
        interests_name_emphasis: Emphasis,
        interests_show_keywords: bool,
        publications_name_emphasis: Emphasis,
        publications_show_publisher: bool,
        awards_title_emphasis: Emphasis,
        awards_show_awarder: bool,
        references_name_emphasis: Emphasis,
        references_show_text: bool,
        custom_title_emphasis: Emphasis,
        custom_list_style: ListStyle,
    }
}

impl StyleConfig {
    /// Parse a theme file written in TOML.
    ///
    /// Keys use the same camelCase names as the JSON form.
    pub fn from_toml(input: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(input)?)
    }
}

impl SectionSettings {
    /// Whether a present section of this kind shows its heading.
    pub fn heading_visible(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Summary => self.show_summary_heading,
            SectionKind::Work => self.show_work_heading,
            SectionKind::Education => self.show_education_heading,
            SectionKind::Skills => self.show_skills_heading,
            SectionKind::Projects => self.show_projects_heading,
            SectionKind::Certificates => self.show_certificates_heading,
            SectionKind::Languages => self.show_languages_heading,
            SectionKind::Interests => self.show_interests_heading,
            SectionKind::Publications => self.show_publications_heading,
            SectionKind::Awards => self.show_awards_heading,
            SectionKind::References => self.show_references_heading,
            SectionKind::Custom => self.show_custom_heading,
        }
    }

    /// Configured heading title for this kind.
    pub fn title(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Summary => &self.summary_title,
            SectionKind::Work => &self.work_title,
            SectionKind::Education => &self.education_title,
            SectionKind::Skills => &self.skills_title,
            SectionKind::Projects => &self.projects_title,
            SectionKind::Certificates => &self.certificates_title,
            SectionKind::Languages => &self.languages_title,
            SectionKind::Interests => &self.interests_title,
            SectionKind::Publications => &self.publications_title,
            SectionKind::Awards => &self.awards_title,
            SectionKind::References => &self.references_title,
            SectionKind::Custom => &self.custom_title,
        }
    }
}
