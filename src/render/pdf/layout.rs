//! Greedy line breaking over styled spans.

use super::fonts::Face;
use crate::style::Color;

/// A run of text with everything needed to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub face: Face,
    pub size: f32,
    pub color: Color,
    pub underline: bool,
    pub link: Option<String>,
}

impl Span {
    pub fn width(&self, text: &str) -> f32 {
        self.face.text_width(text, self.size)
    }
}

/// The part of one span that falls on one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub span: usize,
    pub text: String,
    pub width: f32,
}

impl Fragment {
    pub fn spaces(&self) -> usize {
        self.text.chars().filter(|&c| c == ' ').count()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub fragments: Vec<Fragment>,
    pub width: f32,
    /// Last line of a paragraph or before a forced break; never justified.
    pub last: bool,
}

impl Line {
    pub fn spaces(&self) -> usize {
        self.fragments.iter().map(Fragment::spaces).sum()
    }

    /// Largest font size on the line, or `fallback` for an empty line.
    pub fn size(&self, spans: &[Span], fallback: f32) -> f32 {
        self.fragments
            .iter()
            .map(|f| spans[f.span].size)
            .fold(None, |max: Option<f32>, s| Some(max.map_or(s, |m| m.max(s))))
            .unwrap_or(fallback)
    }
}

enum Token<'a> {
    Word(&'a str),
    Space(&'a str),
    Newline,
}

fn tokens(text: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut kind: Option<bool> = None;
    fn flush<'t>(out: &mut Vec<Token<'t>>, text: &'t str, is_space: bool) {
        if !text.is_empty() {
            out.push(if is_space {
                Token::Space(text)
            } else {
                Token::Word(text)
            });
        }
    }
    for (i, c) in text.char_indices() {
        if c == '\n' {
            if let Some(is_space) = kind.take() {
                flush(&mut out, &text[start..i], is_space);
            }
            out.push(Token::Newline);
            start = i + 1;
            continue;
        }
        if c == '\r' {
            if let Some(is_space) = kind.take() {
                flush(&mut out, &text[start..i], is_space);
            }
            start = i + 1;
            continue;
        }
        let is_space = c == ' ' || c == '\t';
        match kind {
            Some(k) if k == is_space => {}
            Some(k) => {
                flush(&mut out, &text[start..i], k);
                start = i;
                kind = Some(is_space);
            }
            None => {
                start = i;
                kind = Some(is_space);
            }
        }
    }
    if let Some(is_space) = kind {
        flush(&mut out, &text[start..], is_space);
    }
    out
}

struct Breaker<'a> {
    spans: &'a [Span],
    max_width: f32,
    lines: Vec<Line>,
    current: Line,
}

impl<'a> Breaker<'a> {
    fn push(&mut self, span: usize, text: &str, width: f32) {
        self.current.width += width;
        match self.current.fragments.last_mut() {
            Some(last) if last.span == span => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.current.fragments.push(Fragment {
                span,
                text: text.to_string(),
                width,
            }),
        }
    }

    fn finish_line(&mut self, last: bool) {
        let mut line = std::mem::take(&mut self.current);
        // Trailing spaces take no room at the end of a line.
        while let Some(fragment) = line.fragments.last_mut() {
            let trimmed = fragment.text.trim_end_matches(' ');
            if trimmed.len() == fragment.text.len() {
                break;
            }
            let span = &self.spans[fragment.span];
            let removed = span.width(&fragment.text[trimmed.len()..]);
            fragment.text.truncate(trimmed.len());
            fragment.width -= removed;
            line.width -= removed;
            if fragment.text.is_empty() {
                line.fragments.pop();
            } else {
                break;
            }
        }
        line.last = last;
        self.lines.push(line);
    }

    fn word(&mut self, span: usize, word: &str) {
        let s = &self.spans[span];
        let width = s.width(word);
        if self.current.width + width <= self.max_width || self.current.fragments.is_empty() && width <= self.max_width {
            self.push(span, word, width);
            return;
        }
        if !self.current.fragments.is_empty() {
            self.finish_line(false);
        }
        if width <= self.max_width {
            self.push(span, word, width);
            return;
        }

        // A word wider than the line is split between characters.
        let mut chunk = String::new();
        let mut chunk_width = 0.0;
        for c in word.chars() {
            let mut buf = [0u8; 4];
            let cw = s.width(c.encode_utf8(&mut buf));
            if chunk_width + cw > self.max_width && !chunk.is_empty() {
                self.push(span, &chunk, chunk_width);
                self.finish_line(false);
                chunk.clear();
                chunk_width = 0.0;
            }
            chunk.push(c);
            chunk_width += cw;
        }
        if !chunk.is_empty() {
            self.push(span, &chunk, chunk_width);
        }
    }
}

/// Break `spans` into lines no wider than `max_width`.
pub fn break_lines(spans: &[Span], max_width: f32) -> Vec<Line> {
    let mut breaker = Breaker {
        spans,
        max_width: max_width.max(1.0),
        lines: Vec::new(),
        current: Line::default(),
    };

    for (index, span) in spans.iter().enumerate() {
        for token in tokens(&span.text) {
            match token {
                Token::Newline => breaker.finish_line(true),
                Token::Space(text) => {
                    if !breaker.current.fragments.is_empty() {
                        breaker.push(index, text, span.width(text));
                    }
                }
                Token::Word(word) => breaker.word(index, word),
            }
        }
    }
    if !breaker.current.fragments.is_empty() {
        breaker.finish_line(true);
    } else if let Some(last) = breaker.lines.last_mut() {
        last.last = true;
    }
    breaker.lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontFamily;

    fn span(text: &str) -> Span {
        Span {
            text: text.to_string(),
            face: Face {
                family: FontFamily::Mono,
                bold: false,
                italic: false,
            },
            size: 10.0,
            color: Color::BLACK,
            underline: false,
            link: None,
        }
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.fragments.iter().map(|f| f.text.as_str()).collect())
            .collect()
    }

    // Courier at 10pt is 6pt per character.

    #[test]
    fn test_wraps_at_spaces() {
        let lines = break_lines(&[span("aaa bbb ccc")], 45.0);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc"]);
        assert!(!lines[0].last);
        assert!(lines[1].last);
        assert!((lines[0].width - 42.0).abs() < 1e-4);
    }

    #[test]
    fn test_forced_breaks() {
        let lines = break_lines(&[span("one\ntwo")], 500.0);
        assert_eq!(texts(&lines), vec!["one", "two"]);
        assert!(lines[0].last);
    }

    #[test]
    fn test_long_word_is_split() {
        let lines = break_lines(&[span("abcdefghij")], 30.0);
        assert_eq!(texts(&lines), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_spans_share_lines() {
        let mut bold = span("bold");
        bold.face.bold = true;
        let lines = break_lines(&[bold, span(" and plain")], 500.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fragments.len(), 2);
        assert_eq!(lines[0].spaces(), 2);
    }

    #[test]
    fn test_leading_spaces_dropped() {
        let lines = break_lines(&[span("aaaa    bbbb")], 30.0);
        assert_eq!(texts(&lines), vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn test_tokens_borrow_from_input() {
        let text = "ab  cd\r\nef";
        let shapes: Vec<String> = tokens(text)
            .iter()
            .map(|t| match t {
                Token::Word(w) => format!("w:{w}"),
                Token::Space(s) => format!("s:{}", s.len()),
                Token::Newline => "nl".to_string(),
            })
            .collect();
        assert_eq!(shapes, vec!["w:ab", "s:2", "w:cd", "nl", "w:ef"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(break_lines(&[span("")], 100.0).is_empty());
    }
}
