//! Style configuration: value types, the field table, template defaults and
//! the resolver that merges them.

mod config;
pub mod resolve;
pub mod templates;

pub use config::{
    EntryStyle, HeaderStyle, HeadingStyle, ImageStyle, LayoutStyle, PageStyle, ResolvedStyle,
    SectionFormatting, SectionSettings, SpacingStyle, StyleConfig, ThemeStyle, TypographyStyle,
};
pub use resolve::{resolve, switch_template};
pub use templates::Template;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An sRGB color, written as `#RRGGBB` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self::rgb(value, value, value)
    }

    /// Hex digits without the leading `#`, as WordprocessingML expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0` for PDF color operators.
    pub fn unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse `#RGB` or `#RRGGBB`; the leading `#` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(format!("invalid hex color: {s}"));
        }

        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex color {s}: {e}"))
        };

        match hex.len() {
            3 => Ok(Color::rgb(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            n => Err(format!("invalid hex color length {n}: {s}")),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Bold/italic pair applied to one visual element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
}

impl Emphasis {
    pub const NONE: Emphasis = Emphasis { bold: false, italic: false };
    pub const BOLD: Emphasis = Emphasis { bold: true, italic: false };
    pub const ITALIC: Emphasis = Emphasis { bold: false, italic: true };
    pub const BOLD_ITALIC: Emphasis = Emphasis { bold: true, italic: true };

    /// Combine two emphases; a flag set on either side stays set.
    pub fn union(self, other: Emphasis) -> Emphasis {
        Emphasis {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
        }
    }
}

/// Horizontal alignment of a paragraph or heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Fixed page sizes supported by the paginated backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaperSize {
    #[default]
    Letter,
    A4,
}

impl PaperSize {
    /// Width and height in millimeters.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::A4 => (210.0, 297.0),
        }
    }

    /// Width and height in PostScript points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::A4 => (595.28, 841.89),
        }
    }
}

/// Font families available in both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl FontFamily {
    /// Font name used in the flow document.
    pub fn word_name(&self) -> &'static str {
        match self {
            FontFamily::Sans => "Arial",
            FontFamily::Serif => "Times New Roman",
            FontFamily::Mono => "Courier New",
        }
    }
}

/// Visual treatment of section headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingTreatment {
    Plain,
    #[default]
    Underline,
    Overline,
    /// Rules above and below the heading text.
    Sandwich,
    LeftBar,
    Boxed,
    /// Accent-filled band with inverted text.
    Filled,
    ShortUnderline,
    DottedUnderline,
}

/// Letter case applied to headings and names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capitalization {
    #[default]
    AsTyped,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl Capitalization {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Capitalization::AsTyped => text.to_string(),
            Capitalization::Uppercase => text.to_uppercase(),
            Capitalization::Lowercase => text.to_lowercase(),
            Capitalization::Capitalize => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Relative size step of section headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl HeadingSize {
    pub fn scale(&self) -> f32 {
        match self {
            HeadingSize::Small => 0.9,
            HeadingSize::Medium => 1.0,
            HeadingSize::Large => 1.2,
        }
    }
}

/// Marker used in front of list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListStyle {
    #[default]
    Bullet,
    Dash,
    Number,
    None,
}

impl ListStyle {
    /// Marker text for the zero-based item `index`.
    pub fn marker(&self, index: usize) -> Option<String> {
        match self {
            ListStyle::Bullet => Some("\u{2022}".to_string()),
            ListStyle::Dash => Some("\u{2013}".to_string()),
            ListStyle::Number => Some(format!("{}.", index + 1)),
            ListStyle::None => None,
        }
    }
}

/// How contact details are arranged in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactLayout {
    #[default]
    Inline,
    Stacked,
}

/// Where the header sits in a multi-column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPlacement {
    #[default]
    FullWidth,
    PrimaryColumn,
}

/// Clip shape of the profile image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageShape {
    Square,
    Rounded,
    #[default]
    Circle,
}

/// Side of the header the profile image is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImagePosition {
    Left,
    #[default]
    Right,
}

/// Placement of an entry's date range relative to its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePosition {
    #[default]
    Right,
    Inline,
    Below,
}

/// Output pattern for entry dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    /// `Jan 2020`
    #[default]
    MonthYear,
    /// `January 2020`
    MonthYearLong,
    /// `01/2020`
    Numeric,
    /// `2020`
    Year,
}

/// Arrangement of keyword groups (skills, interests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillsLayout {
    /// `Name: a, b, c` on one line per group.
    #[default]
    Inline,
    /// Group name on its own line, keywords below.
    Stacked,
    /// Every keyword of every group in one flowing paragraph.
    Compact,
}

/// Visual roles that may take the accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeRole {
    DocumentTitle,
    RoleLabel,
    SectionHeadings,
    Hyperlinks,
    Iconography,
    DecorativeRules,
}

impl ThemeRole {
    pub const ALL: [ThemeRole; 6] = [
        ThemeRole::DocumentTitle,
        ThemeRole::RoleLabel,
        ThemeRole::SectionHeadings,
        ThemeRole::Hyperlinks,
        ThemeRole::Iconography,
        ThemeRole::DecorativeRules,
    ];
}
