//! Inline rich-text markup.
//!
//! A short free-text field may carry a small set of inline markers:
//!
//! - `<div align="left|center|right|justify">…</div>` around the whole field
//! - `**bold**`, `*italic*`, `<u>underline</u>`
//! - `[label](https://target)`
//!
//! Tokens are matched left to right and never overlap. Each marker takes the
//! shortest complete span with non-empty content; markers inside a token are
//! literal text of that token. Anything that does not form a complete token
//! is plain text. Parsing never fails.

use crate::style::Alignment;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_till1, take_until},
    character::complete::{char, multispace0, multispace1},
    combinator::{value, verify},
    error::{Error, ErrorKind},
    sequence::{delimited, pair, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

/// Characters that may open a token.
const SPECIAL: &[char] = &['*', '<', '['];

/// Inline attributes of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl RunStyle {
    pub const PLAIN: RunStyle = RunStyle {
        bold: false,
        italic: false,
        underline: false,
    };
}

/// A span of text with one set of inline attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::PLAIN,
            link: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
        }
    }

    pub fn link(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::PLAIN,
            link: Some(target.into()),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.style == RunStyle::PLAIN && self.link.is_none()
    }
}

/// A parsed field: optional whole-field alignment and its runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    pub runs: Vec<Run>,
}

impl RichText {
    /// Unparsed text as a single plain run.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![Run::plain(text)]
        };
        Self {
            alignment: None,
            runs,
        }
    }

    /// Concatenated text of every run, markers removed.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

/// Token recognized at the current position.
#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Bold(&'a str),
    Italic(&'a str),
    Underline(&'a str),
    Link(&'a str, &'a str),
}

/// Parse a markup field into runs.
pub fn parse(input: &str) -> RichText {
    if let Some((alignment, inner)) = div_wrapper(input) {
        // An inner wrapper is stripped too; the outer alignment stands.
        let RichText { runs, .. } = parse(inner);
        return RichText {
            alignment: Some(alignment),
            runs,
        };
    }

    RichText {
        alignment: None,
        runs: parse_runs(input),
    }
}

fn parse_runs(input: &str) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() {
        if let Ok((rest, token)) = token(remaining) {
            runs.push(token.into_run());
            remaining = rest;
            continue;
        }

        let (rest, text) = match plain_text(remaining) {
            Ok(parsed) => parsed,
            // At a marker that opens nothing: take it literally.
            Err(_) => {
                let len = remaining.chars().next().map_or(1, char::len_utf8);
                (&remaining[len..], &remaining[..len])
            }
        };
        match runs.last_mut() {
            Some(last) if last.is_plain() => last.text.push_str(text),
            _ => runs.push(Run::plain(text)),
        }
        remaining = rest;
    }

    runs
}

impl Token<'_> {
    fn into_run(self) -> Run {
        match self {
            Token::Bold(text) => Run::styled(
                text,
                RunStyle {
                    bold: true,
                    ..RunStyle::PLAIN
                },
            ),
            Token::Italic(text) => Run::styled(
                text,
                RunStyle {
                    italic: true,
                    ..RunStyle::PLAIN
                },
            ),
            Token::Underline(text) => Run::styled(
                text,
                RunStyle {
                    underline: true,
                    ..RunStyle::PLAIN
                },
            ),
            Token::Link(label, target) => Run::link(label, target.trim()),
        }
    }
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((bold, italic, underline, link))(input)
}

/// Parse `**text**`.
fn bold(input: &str) -> IResult<&str, Token> {
    let (input, content) = delimited(
        tag("**"),
        verify(take_until("**"), |s: &str| !s.is_empty()),
        tag("**"),
    )(input)?;
    Ok((input, Token::Bold(content)))
}

/// Parse `*text*`.
fn italic(input: &str) -> IResult<&str, Token> {
    let (input, content) = delimited(char('*'), is_not("*"), char('*'))(input)?;
    Ok((input, Token::Italic(content)))
}

/// Parse `<u>text</u>`.
fn underline(input: &str) -> IResult<&str, Token> {
    let (input, content) = delimited(
        tag_no_case("<u>"),
        verify(until_underline_close, |s: &str| !s.is_empty()),
        tag_no_case("</u>"),
    )(input)?;
    Ok((input, Token::Underline(content)))
}

/// Everything up to the first `</u>`, in any case.
fn until_underline_close(input: &str) -> IResult<&str, &str> {
    match input.to_ascii_lowercase().find("</u>") {
        Some(end) => Ok((&input[end..], &input[..end])),
        None => Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil))),
    }
}

/// Parse `[label](target)`.
fn link(input: &str) -> IResult<&str, Token> {
    let (input, (label, target)) = pair(
        delimited(char('['), is_not("]"), char(']')),
        delimited(
            char('('),
            verify(is_not(")"), |s: &str| !s.trim().is_empty()),
            char(')'),
        ),
    )(input)?;
    Ok((input, Token::Link(label, target)))
}

/// Text up to the next character that could open a token.
fn plain_text(input: &str) -> IResult<&str, &str> {
    take_till1(|c| SPECIAL.contains(&c))(input)
}

fn alignment(input: &str) -> IResult<&str, Alignment> {
    alt((
        value(Alignment::Left, tag_no_case("left")),
        value(Alignment::Center, tag_no_case("center")),
        value(Alignment::Right, tag_no_case("right")),
        value(Alignment::Justify, tag_no_case("justify")),
    ))(input)
}

/// Parse `<div align="...">`.
fn div_open(input: &str) -> IResult<&str, Alignment> {
    let (input, (_, _, _, _, _, _, align, _, _)) = tuple((
        tag_no_case("<div"),
        multispace1,
        tag_no_case("align"),
        multispace0,
        char('='),
        multispace0,
        alt((
            delimited(char('"'), alignment, char('"')),
            delimited(char('\''), alignment, char('\'')),
        )),
        multispace0,
        char('>'),
    ))(input)?;
    Ok((input, align))
}

/// A div wrapper spanning the whole field.
fn div_wrapper(input: &str) -> Option<(Alignment, &str)> {
    const CLOSE: &str = "</div>";

    let (rest, align) = div_open(input.trim()).ok()?;
    let split = rest.len().checked_sub(CLOSE.len())?;
    if !rest.is_char_boundary(split) || !rest[split..].eq_ignore_ascii_case(CLOSE) {
        return None;
    }
    Some((align, &rest[..split]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bold(text: &str) -> Run {
        Run::styled(
            text,
            RunStyle {
                bold: true,
                ..RunStyle::PLAIN
            },
        )
    }

    fn italic(text: &str) -> Run {
        Run::styled(
            text,
            RunStyle {
                italic: true,
                ..RunStyle::PLAIN
            },
        )
    }

    #[test]
    fn test_bold_and_italic() {
        let parsed = parse("**bold** and *italic*");
        assert_eq!(
            parsed.runs,
            vec![bold("bold"), Run::plain(" and "), italic("italic")]
        );
        assert_eq!(parsed.alignment, None);
    }

    #[test]
    fn test_unterminated_bold_is_literal() {
        let parsed = parse("**unterminated");
        assert_eq!(parsed.runs, vec![Run::plain("**unterminated")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").runs.is_empty());
        assert!(parse("").is_blank());
    }

    #[test]
    fn test_empty_token_content_is_literal() {
        assert_eq!(parse("****").runs, vec![Run::plain("****")]);
        assert_eq!(parse("a ** b").runs, vec![Run::plain("a ** b")]);
        assert_eq!(parse("<u></u>").runs, vec![Run::plain("<u></u>")]);
    }

    #[test]
    fn test_shortest_match() {
        let parsed = parse("**a** and **b**");
        assert_eq!(parsed.runs, vec![bold("a"), Run::plain(" and "), bold("b")]);
    }

    #[test]
    fn test_nested_markers_are_literal() {
        let parsed = parse("**outer *inner* text**");
        assert_eq!(parsed.runs, vec![bold("outer *inner* text")]);
    }

    #[test]
    fn test_underline() {
        let parsed = parse("x <u>under</u> y");
        assert_eq!(parsed.runs.len(), 3);
        assert!(parsed.runs[1].style.underline);
        assert_eq!(parsed.runs[1].text, "under");
    }

    #[test]
    fn test_underline_tags_ignore_case() {
        for text in ["<U>x</U>", "<u>x</U>", "<U>x</u>"] {
            let parsed = parse(text);
            assert_eq!(parsed.runs.len(), 1, "{text}");
            assert!(parsed.runs[0].style.underline, "{text}");
            assert_eq!(parsed.runs[0].text, "x");
        }
        assert_eq!(parse("<U>open").runs, vec![Run::plain("<U>open")]);
    }

    #[test]
    fn test_link() {
        let parsed = parse("See [my site](https://example.com ) now");
        assert_eq!(
            parsed.runs,
            vec![
                Run::plain("See "),
                Run::link("my site", "https://example.com"),
                Run::plain(" now"),
            ]
        );
    }

    #[test]
    fn test_incomplete_link_is_literal() {
        assert_eq!(parse("[label]").runs, vec![Run::plain("[label]")]);
        assert_eq!(parse("[label]( )").runs, vec![Run::plain("[label]( )")]);
        assert_eq!(parse("[a](b").runs, vec![Run::plain("[a](b")]);
    }

    #[test]
    fn test_stray_markers_coalesce() {
        let parsed = parse("5 < 6 and [x * y");
        assert_eq!(parsed.runs, vec![Run::plain("5 < 6 and [x * y")]);
    }

    #[test]
    fn test_div_alignment() {
        let parsed = parse(r#"<div align="center">**Lead** engineer</div>"#);
        assert_eq!(parsed.alignment, Some(Alignment::Center));
        assert_eq!(parsed.runs, vec![bold("Lead"), Run::plain(" engineer")]);
    }

    #[test]
    fn test_outer_div_alignment_wins() {
        let parsed = parse(r#"<div align='right'><div align="left">text</div></div>"#);
        assert_eq!(parsed.alignment, Some(Alignment::Right));
        assert_eq!(parsed.plain_text(), "text");
    }

    #[test]
    fn test_partial_div_is_literal() {
        let parsed = parse(r#"<div align="center">text"#);
        assert_eq!(parsed.alignment, None);
        assert_eq!(parsed.plain_text(), r#"<div align="center">text"#);
    }

    #[test]
    fn test_multibyte_text() {
        let parsed = parse("Zürich *café* — ok");
        assert_eq!(parsed.runs.len(), 3);
        assert_eq!(parsed.runs[1], italic("café"));
        assert_eq!(parsed.plain_text(), "Zürich café — ok");
    }
}
