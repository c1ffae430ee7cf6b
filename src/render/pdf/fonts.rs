//! Standard-14 fonts: names, WinAnsi encoding and advance widths.
//!
//! Widths are the AFM advance widths in thousandths of an em for the
//! printable ASCII range. Oblique and italic faces reuse the upright tables.

use crate::style::{Emphasis, FontFamily};
use crate::markup::RunStyle;

/// One face of one standard font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Face {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl Face {
    pub fn new(family: FontFamily, emphasis: Emphasis) -> Self {
        Self {
            family,
            bold: emphasis.bold,
            italic: emphasis.italic,
        }
    }

    /// The same family with a run's bold/italic added.
    pub fn with_run(self, style: RunStyle) -> Self {
        Self {
            bold: self.bold || style.bold,
            italic: self.italic || style.italic,
            ..self
        }
    }

    pub fn base_font(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (FontFamily::Sans, false, false) => "Helvetica",
            (FontFamily::Sans, true, false) => "Helvetica-Bold",
            (FontFamily::Sans, false, true) => "Helvetica-Oblique",
            (FontFamily::Sans, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Serif, false, false) => "Times-Roman",
            (FontFamily::Serif, true, false) => "Times-Bold",
            (FontFamily::Serif, false, true) => "Times-Italic",
            (FontFamily::Serif, true, true) => "Times-BoldItalic",
            (FontFamily::Mono, false, false) => "Courier",
            (FontFamily::Mono, true, false) => "Courier-Bold",
            (FontFamily::Mono, false, true) => "Courier-Oblique",
            (FontFamily::Mono, true, true) => "Courier-BoldOblique",
        }
    }

    /// Resource name used in content streams.
    pub fn resource_name(&self) -> String {
        let family = match self.family {
            FontFamily::Sans => 0,
            FontFamily::Serif => 1,
            FontFamily::Mono => 2,
        };
        let variant = self.bold as usize * 2 + self.italic as usize;
        format!("F{}", family * 4 + variant + 1)
    }

    fn table(&self) -> Option<&'static [u16; 95]> {
        match (self.family, self.bold) {
            (FontFamily::Sans, false) => Some(&HELVETICA),
            (FontFamily::Sans, true) => Some(&HELVETICA_BOLD),
            (FontFamily::Serif, false) => Some(&TIMES_ROMAN),
            (FontFamily::Serif, true) => Some(&TIMES_BOLD),
            (FontFamily::Mono, _) => None,
        }
    }

    /// Advance width of one WinAnsi code, in thousandths of an em.
    pub fn code_width(&self, code: u8) -> u16 {
        let Some(table) = self.table() else {
            return 600;
        };
        let serif = self.family == FontFamily::Serif;
        match code {
            32..=126 => table[(code - 32) as usize],
            0x95 => 350,
            0x96 => {
                if serif {
                    500
                } else {
                    556
                }
            }
            0x97 | 0x85 | 0x89 => 1000,
            0x91 | 0x92 | 0x82 => {
                if serif {
                    333
                } else {
                    222
                }
            }
            0x93 | 0x94 | 0x84 => {
                if serif {
                    444
                } else {
                    333
                }
            }
            0xA0 => table[0],
            _ => match base_letter(code) {
                Some(letter) => table[(letter - 32) as usize],
                None => table[(b'o' - 32) as usize],
            },
        }
    }

    /// Width of `text` at `size` points, after WinAnsi encoding.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| self.code_width(encode_char(c)) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

/// The unaccented ASCII letter of a Latin-1 letter.
fn base_letter(code: u8) -> Option<u8> {
    let letter = match code {
        0xC0..=0xC5 => b'A',
        0xC7 => b'C',
        0xC8..=0xCB => b'E',
        0xCC..=0xCF => b'I',
        0xD1 => b'N',
        0xD2..=0xD6 | 0xD8 => b'O',
        0xD9..=0xDC => b'U',
        0xDD => b'Y',
        0xE0..=0xE5 => b'a',
        0xE7 => b'c',
        0xE8..=0xEB => b'e',
        0xEC..=0xEF => b'i',
        0xF1 => b'n',
        0xF2..=0xF6 | 0xF8 => b'o',
        0xF9..=0xFC => b'u',
        0xFD | 0xFF => b'y',
        0x8A => b'S',
        0x9A => b's',
        0x8E => b'Z',
        0x9E => b'z',
        0x9F => b'Y',
        _ => return None,
    };
    Some(letter)
}

/// WinAnsi code of `c`; characters outside the encoding become `?`.
pub fn encode_char(c: char) -> u8 {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => code as u8,
        _ => match c {
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            '\t' => b' ',
            _ => b'?',
        },
    }
}

/// Encode `text` for a simple font with WinAnsiEncoding.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];
