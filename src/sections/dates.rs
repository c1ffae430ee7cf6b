//! Date formatting for entries.

use crate::style::{DateFormat, EntryStyle};
use chrono::NaiveDate;

/// A stored date, at the precision it was entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    Day(NaiveDate),
    Month(NaiveDate),
    Year(i32),
}

fn parse(raw: &str) -> Option<Parsed> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Parsed::Day(date));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(Parsed::Month(date));
    }
    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok().map(Parsed::Year);
    }
    None
}

/// Format one stored date. Unparseable text is kept as typed.
pub fn format_date(raw: &str, format: DateFormat) -> String {
    let date = match parse(raw) {
        Some(Parsed::Day(date)) | Some(Parsed::Month(date)) => date,
        Some(Parsed::Year(year)) => return year.to_string(),
        None => return raw.trim().to_string(),
    };
    let pattern = match format {
        DateFormat::MonthYear => "%b %Y",
        DateFormat::MonthYearLong => "%B %Y",
        DateFormat::Numeric => "%m/%Y",
        DateFormat::Year => "%Y",
    };
    date.format(pattern).to_string()
}

/// Format a start/end pair.
///
/// A missing end after a present start reads as the "present" label.
pub fn format_range(start: &str, end: &str, style: &EntryStyle) -> String {
    let start = format_date(start, style.date_format);
    let end = format_date(end, style.date_format);
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (true, false) => end,
        (false, true) if style.present_label.trim().is_empty() => start,
        (false, true) => format!("{start}{}{}", style.date_separator, style.present_label),
        (false, false) if start == end => start,
        (false, false) => format!("{start}{}{end}", style.date_separator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Template;

    #[test]
    fn test_formats() {
        assert_eq!(format_date("2020-03-15", DateFormat::MonthYear), "Mar 2020");
        assert_eq!(format_date("2020-03", DateFormat::MonthYearLong), "March 2020");
        assert_eq!(format_date("2020-03", DateFormat::Numeric), "03/2020");
        assert_eq!(format_date("2020-03", DateFormat::Year), "2020");
        assert_eq!(format_date("2020", DateFormat::MonthYear), "2020");
    }

    #[test]
    fn test_free_text_kept() {
        assert_eq!(format_date(" Spring 2021 ", DateFormat::MonthYear), "Spring 2021");
        assert_eq!(format_date("2020-13", DateFormat::MonthYear), "2020-13");
    }

    #[test]
    fn test_ranges() {
        let mut style = Template::Classic.defaults().entries;
        style.date_format = DateFormat::MonthYear;
        style.date_separator = " - ".into();
        style.present_label = "Present".into();

        assert_eq!(format_range("2019-01", "2021-06", &style), "Jan 2019 - Jun 2021");
        assert_eq!(format_range("2019-01", "", &style), "Jan 2019 - Present");
        assert_eq!(format_range("", "2021-06", &style), "Jun 2021");
        assert_eq!(format_range("", "", &style), "");
        assert_eq!(format_range("2020", "2020", &style), "2020");
    }
}
