//! Thin helpers over the quick-xml writer.

use crate::error::{Error, RenderError, Result};
use crate::sanitize::strip_control_chars;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

fn xml_error(e: impl std::fmt::Display) -> Error {
    RenderError::Xml(e.to_string()).into()
}

/// Writes one XML part. Text and attribute values are escaped, and
/// characters XML cannot carry are dropped.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// A writer with the standalone UTF-8 declaration already written.
    pub fn new() -> Result<Self> {
        let mut inner = Writer::new(Vec::new());
        inner
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { inner })
    }

    fn tag<'n>(name: &'n str, attrs: &[(&str, &str)]) -> BytesStart<'n> {
        let mut start = BytesStart::new(name);
        for &(key, value) in attrs {
            start.push_attribute((key, strip_control_chars(value).as_ref()));
        }
        start
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.inner
            .write_event(Event::Start(Self::tag(name, attrs)))
            .map_err(xml_error)
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.inner
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.inner
            .write_event(Event::Empty(Self::tag(name, attrs)))
            .map_err(xml_error)
    }

    pub fn text(&mut self, text: &str) -> Result<()> {
        let text = strip_control_chars(text);
        self.inner
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(xml_error)
    }

    /// `<name attrs>text</name>`
    pub fn element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_and_strips() {
        let mut xml = XmlWriter::new().unwrap();
        xml.start("w:t", &[("xml:space", "preserve")]).unwrap();
        xml.text("R&D <lead>\u{1}").unwrap();
        xml.end("w:t").unwrap();
        xml.empty("a", &[("href", "x?a=1&b=\"2\"")]).unwrap();
        let out = String::from_utf8(xml.finish()).unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(out.contains("<w:t xml:space=\"preserve\">R&amp;D &lt;lead&gt;</w:t>"));
        assert!(out.contains("x?a=1&amp;b=&quot;2&quot;"));
        assert!(!out.contains('\u{1}'));
    }
}
