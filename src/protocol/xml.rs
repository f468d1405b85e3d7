//! Thin XML helpers on top of `quick-xml`
//!
//! [`XmlWriter`] emits namespace-qualified elements strictly in call order.
//! [`XmlElement`] is a small owned tree used by the decoders; it keeps local
//! names only, so decoding is independent of the prefixes a hub picks.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::namespaces::Namespace;
use crate::support::errors::{CodecError, CodecResult};

// ── Writer ─────────────────────────────────────────────────────

pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> CodecResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| CodecError::Write(e.to_string()))
    }

    pub fn declaration(&mut self) -> CodecResult<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
    }

    pub fn start(&mut self, ns: Namespace, local: &str) -> CodecResult<()> {
        self.write(Event::Start(BytesStart::new(ns.qualify(local))))
    }

    /// Start an element declaring the given namespaces on it.
    pub fn start_declaring(
        &mut self,
        ns: Namespace,
        local: &str,
        declared: &[Namespace],
    ) -> CodecResult<()> {
        let mut start = BytesStart::new(ns.qualify(local));
        for declared_ns in declared {
            let attribute = declared_ns.xmlns_attribute();
            start.push_attribute((attribute.as_str(), declared_ns.uri()));
        }
        self.write(Event::Start(start))
    }

    pub fn end(&mut self, ns: Namespace, local: &str) -> CodecResult<()> {
        self.write(Event::End(BytesEnd::new(ns.qualify(local))))
    }

    pub fn empty(&mut self, ns: Namespace, local: &str) -> CodecResult<()> {
        self.write(Event::Empty(BytesStart::new(ns.qualify(local))))
    }

    /// `<ns:local>text</ns:local>`, text escaped. An empty string still
    /// produces the element.
    pub fn element(&mut self, ns: Namespace, local: &str, text: &str) -> CodecResult<()> {
        self.start(ns, local)?;
        if !text.is_empty() {
            self.write(Event::Text(BytesText::new(text)))?;
        }
        self.end(ns, local)
    }

    /// Emit the element only when a value is present.
    pub fn optional(&mut self, ns: Namespace, local: &str, text: Option<&str>) -> CodecResult<()> {
        match text {
            Some(text) => self.element(ns, local, text),
            None => Ok(()),
        }
    }

    /// Emit a schema-mandatory element, empty when no value is present.
    pub fn mandatory(&mut self, ns: Namespace, local: &str, text: Option<&str>) -> CodecResult<()> {
        self.element(ns, local, text.unwrap_or_default())
    }

    pub fn boolean(&mut self, ns: Namespace, local: &str, value: bool) -> CodecResult<()> {
        self.element(ns, local, if value { "true" } else { "false" })
    }

    /// Write `<ns:local>` with the content produced by `content`.
    pub fn nested<F>(&mut self, ns: Namespace, local: &str, content: F) -> CodecResult<()>
    where
        F: FnOnce(&mut Self) -> CodecResult<()>,
    {
        self.start(ns, local)?;
        content(self)?;
        self.end(ns, local)
    }

    pub fn into_string(self) -> CodecResult<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| CodecError::Write(e.to_string()))
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Reader ─────────────────────────────────────────────────────

/// An element of a parsed document: local name, text content and children.
///
/// `text` is kept exactly as it appeared, whitespace included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Parse a complete document into its root element.
    pub fn parse(xml: &str) -> CodecResult<XmlElement> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(Self::named(local_name(e)));
                }
                Ok(Event::Empty(ref e)) => {
                    attach(&mut stack, &mut root, Self::named(local_name(e)))?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| CodecError::Xml("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|e| CodecError::Xml(e.to_string()))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(CodecError::Xml(
                                "text outside of the root element".to_string(),
                            ))
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(CodecError::Xml(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(CodecError::Xml(format!("unclosed element {}", open.name)));
        }
        root.ok_or_else(|| CodecError::Xml("document has no root element".to_string()))
    }

    /// Text with surrounding whitespace removed, for typed values.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn first_child(&self) -> Option<&XmlElement> {
        self.children.first()
    }

    pub fn required_child(&self, name: &str) -> CodecResult<&XmlElement> {
        self.child(name)
            .ok_or_else(|| CodecError::missing(format!("{}/{}", self.name, name)))
    }

    /// Text of a child element, `None` when absent or empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text()).filter(|t| !t.is_empty())
    }

    /// Untrimmed text of a child element, `Some("")` when present but empty.
    pub fn child_string(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    pub fn required_text(&self, name: &str) -> CodecResult<&str> {
        self.child_text(name)
            .ok_or_else(|| CodecError::missing(format!("{}/{}", self.name, name)))
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn deep_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if !self.text().is_empty() {
            parts.push(self.text());
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    pub fn expect_name(&self, expected: &str) -> CodecResult<()> {
        if self.name == expected {
            Ok(())
        } else {
            Err(CodecError::UnexpectedElement {
                expected: expected.to_string(),
                actual: self.name.clone(),
            })
        }
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> CodecResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(CodecError::Xml("more than one root element".to_string()))
    } else {
        *root = Some(element);
        Ok(())
    }
}

/// Parse an `xsd:boolean`.
pub fn parse_bool(element: &str, value: &str) -> CodecResult<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(CodecError::invalid_value(element, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_keeps_call_order_and_escapes_text() {
        let mut w = XmlWriter::new();
        w.nested(Namespace::EvseStatus, "Record", |w| {
            w.element(Namespace::EvseStatus, "B", "x & y")?;
            w.element(Namespace::EvseStatus, "A", "<1>")
        })
        .unwrap();
        let xml = w.into_string().unwrap();
        assert_eq!(
            xml,
            "<EVSEStatus:Record><EVSEStatus:B>x &amp; y</EVSEStatus:B>\
             <EVSEStatus:A>&lt;1&gt;</EVSEStatus:A></EVSEStatus:Record>"
        );
    }

    #[test]
    fn optional_and_mandatory_elements() {
        let mut w = XmlWriter::new();
        w.optional(Namespace::CommonTypes, "Absent", None).unwrap();
        w.mandatory(Namespace::CommonTypes, "Required", None).unwrap();
        let xml = w.into_string().unwrap();
        assert_eq!(xml, "<CommonTypes:Required></CommonTypes:Required>");
    }

    #[test]
    fn parses_tree_with_local_names() {
        let root = XmlElement::parse(
            r#"<a:Root xmlns:a="urn:a"><a:Child>one</a:Child><b:Child xmlns:b="urn:b"> two </b:Child><Empty/></a:Root>"#,
        )
        .unwrap();
        assert_eq!(root.name, "Root");
        assert_eq!(root.children_named("Child").count(), 2);
        assert_eq!(root.child_text("Child"), Some("one"));
        assert_eq!(root.children[1].text(), "two");
        assert!(root.child("Empty").is_some());
        assert_eq!(root.child_text("Empty"), None);
        assert_eq!(root.deep_text(), "one two");
    }

    #[test]
    fn keeps_raw_text_for_free_form_strings() {
        let root = XmlElement::parse(
            "<?xml version=\"1.0\"?>\n<R>\n  <Padded>  two  </Padded>\n  <Empty/>\n  <Open></Open>\n</R>\n",
        )
        .unwrap();
        assert_eq!(root.child_string("Padded"), Some("  two  "));
        assert_eq!(root.child_text("Padded"), Some("two"));
        assert_eq!(root.child_string("Empty"), Some(""));
        assert_eq!(root.child_string("Open"), Some(""));
        assert_eq!(root.child_string("Missing"), None);
        assert_eq!(root.deep_text(), "two");
    }

    #[test]
    fn unescapes_entities() {
        let root = XmlElement::parse("<R>a &amp; b</R>").unwrap();
        assert_eq!(root.text(), "a & b");
    }

    #[test]
    fn rejects_non_xml() {
        assert!(XmlElement::parse("Internal Server Error").is_err());
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(XmlElement::parse("<a>").is_err());
    }

    #[test]
    fn required_child_reports_path() {
        let root = XmlElement::parse("<Ack><Result>true</Result></Ack>").unwrap();
        let err = root.required_text("StatusCode").unwrap_err();
        assert_eq!(err, CodecError::MalformedResponse("Ack/StatusCode".to_string()));
    }

    #[test]
    fn booleans() {
        assert_eq!(parse_bool("Result", "true"), Ok(true));
        assert_eq!(parse_bool("Result", "0"), Ok(false));
        assert!(parse_bool("Result", "yes").is_err());
    }
}
