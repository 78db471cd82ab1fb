//! A small owned XML element tree.
//!
//! The document model converts to and from [`Element`] and never sees
//! quick-xml types. Only element children and the leading text of each
//! element are kept; comments, processing instructions and text that
//! follows a child element are dropped.

use std::{
    borrow::Cow,
    io::{BufRead, Write},
};

use quick_xml::{
    NsReader, Writer,
    escape::{partial_escape, unescape},
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    name::ResolveResult,
};

use crate::error::Error;

pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: &str, local: &str) -> Self {
        QName {
            namespace: Some(namespace.to_string()),
            local: local.to_string(),
        }
    }

    pub fn local(local: &str) -> Self {
        QName {
            namespace: None,
            local: local.to_string(),
        }
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<(QName, String)>,
    /// Text before the first child element, `None` when there is none.
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: QName) -> Self {
        Element {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Value of an attribute without a namespace.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.namespace.is_none() && name.local == local)
            .map(|(_, value)| value.as_str())
    }

    /// Value of a namespaced attribute.
    pub fn attr_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.is(namespace, local))
            .map(|(_, value)| value.as_str())
    }

    /// Sets (or replaces) an attribute.
    pub fn set_attr(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Sets an attribute only when a value is present.
    pub fn set_attr_opt(&mut self, name: QName, value: Option<&str>) {
        if let Some(value) = value {
            self.set_attr(name, value);
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Child elements with the given name, in document order.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| child.name.is(namespace, local))
    }

    pub fn first_child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|child| child.name.is(namespace, local))
    }

    /// Leading text, empty when absent.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Structural limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Deepest allowed element nesting.
    pub max_depth: usize,
    /// Largest allowed text node, in bytes.
    pub max_text_len: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        ParseLimits {
            max_depth: 256,
            max_text_len: 10_000_000,
        }
    }
}

impl ParseLimits {
    /// Limits for very large localization files.
    pub fn relaxed() -> Self {
        ParseLimits {
            max_depth: 2048,
            max_text_len: 1_000_000_000,
        }
    }
}

/// Parses a whole document and returns its root element.
pub fn parse_document<R: BufRead>(reader: R, limits: ParseLimits) -> Result<Element, Error> {
    let mut xml_reader = NsReader::from_reader(reader);
    xml_reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if root.is_some() {
                    return Err(Error::InvalidDocument(
                        "content after the root element".to_string(),
                    ));
                }
                if stack.len() >= limits.max_depth {
                    return Err(Error::LimitExceeded(format!(
                        "element nesting deeper than {}",
                        limits.max_depth
                    )));
                }
                stack.push(start_element(&xml_reader, e)?);
            }
            Event::Empty(ref e) => {
                let element = start_element(&xml_reader, e)?;
                match stack.last_mut() {
                    Some(parent) => parent.push(element),
                    None if root.is_none() => root = Some(element),
                    None => {
                        return Err(Error::InvalidDocument(
                            "content after the root element".to_string(),
                        ));
                    }
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(Error::InvalidDocument("unbalanced end tag".to_string()));
                };
                match stack.last_mut() {
                    Some(parent) => parent.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(e) => {
                let bytes = e.into_inner();
                let raw = std::str::from_utf8(&bytes)
                    .map_err(|err| Error::DataMismatch(format!("text is not UTF-8: {err}")))?;
                // Line ends are normalised before references are expanded,
                // so `&#13;` still yields a carriage return.
                let raw = normalize_line_ends(raw);
                let text = unescape(&raw).map_err(quick_xml::Error::from)?;
                append_text(&mut stack, &text, &limits)?;
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|err| Error::DataMismatch(format!("CDATA is not UTF-8: {err}")))?;
                append_text(&mut stack, &normalize_line_ends(text), &limits)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::InvalidDocument(
            "unexpected end of document".to_string(),
        ));
    }
    root.ok_or_else(|| Error::InvalidDocument("document has no root element".to_string()))
}

fn start_element<R>(reader: &NsReader<R>, e: &BytesStart) -> Result<Element, Error> {
    let (ns, local) = reader.resolve_element(e.name());
    let mut element = Element::new(QName {
        namespace: namespace_of(ns)?,
        local: String::from_utf8_lossy(local.as_ref()).into_owned(),
    });

    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        let key = attr.key;
        if key.as_namespace_binding().is_some() {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(key);
        let name = QName {
            namespace: namespace_of(ns)?,
            local: String::from_utf8_lossy(local.as_ref()).into_owned(),
        };
        element
            .attributes
            .push((name, attr.unescape_value()?.into_owned()));
    }
    Ok(element)
}

fn namespace_of(ns: ResolveResult) -> Result<Option<String>, Error> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::DataMismatch(format!(
            "undeclared namespace prefix `{}`",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// XML end-of-line handling: `\r\n` and lone `\r` become `\n`.
fn normalize_line_ends(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

fn append_text(stack: &mut [Element], text: &str, limits: &ParseLimits) -> Result<(), Error> {
    let Some(current) = stack.last_mut() else {
        // Whitespace around the root element.
        return Ok(());
    };
    if !current.children.is_empty() {
        return Ok(());
    }
    let slot = current.text.get_or_insert_with(String::new);
    if slot.len() + text.len() > limits.max_text_len {
        return Err(Error::LimitExceeded(format!(
            "text node larger than {} bytes",
            limits.max_text_len
        )));
    }
    slot.push_str(text);
    Ok(())
}

/// Maps namespaces to the prefixes used when writing.
pub struct Prefixes<'a> {
    /// Namespace written without a prefix.
    pub default: &'a str,
    /// Namespaces written with a prefix, declared on the root element.
    pub bound: &'a [(&'a str, &'a str)],
}

impl Prefixes<'_> {
    fn qualify(&self, name: &QName, is_attribute: bool) -> String {
        match name.namespace.as_deref() {
            None => name.local.clone(),
            Some(ns) if ns == self.default && !is_attribute => name.local.clone(),
            Some(ns) if ns == XML_NS => format!("xml:{}", name.local),
            Some(ns) => match self.bound.iter().find(|(_, uri)| *uri == ns) {
                Some((prefix, _)) => format!("{}:{}", prefix, name.local),
                None => name.local.clone(),
            },
        }
    }
}

/// Writes `root` as a UTF-8 document with an XML declaration and two-space
/// indentation. Namespace declarations from `prefixes` go on the root.
pub fn write_document<W: Write>(
    writer: W,
    root: &Element,
    prefixes: &Prefixes,
) -> Result<(), Error> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);
    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut xml_writer, root, prefixes, true)?;
    xml_writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_element<W: Write>(
    xml_writer: &mut Writer<W>,
    element: &Element,
    prefixes: &Prefixes,
    is_root: bool,
) -> Result<(), Error> {
    let name = prefixes.qualify(&element.name, false);
    let mut start = BytesStart::new(name.as_str());
    if is_root {
        start.push_attribute(("xmlns", prefixes.default));
        for (prefix, uri) in prefixes.bound {
            let key = format!("xmlns:{prefix}");
            start.push_attribute((key.as_str(), *uri));
        }
    }
    for (attr_name, value) in &element.attributes {
        let key = prefixes.qualify(attr_name, true);
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        xml_writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    xml_writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        // Always emitted, even when empty, so the end tag stays on the same line.
        let escaped = partial_escape(text);
        xml_writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
    }
    for child in &element.children {
        write_element(xml_writer, child, prefixes, false)?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}
