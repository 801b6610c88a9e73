//! A small in-memory XML tree.
//!
//! The reader folds the quick-xml event stream into a tree of
//! [`XmlElement`]s, resolving each element name against the `xmlns`
//! declarations in scope while the tree is built. The whole document is held
//! in memory; both codec directions walk the finished tree.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ModelError, ModelResult};
use crate::ns;

/// One XML element: the name as written, its resolved namespace parts, its
/// attributes (unescaped, in document order), child elements and text
/// content. `text` is `Some` only if at least one text or CDATA node was
/// present.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct XmlElement {
    pub name: String,
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace_uri: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        let (prefix, local_name) = split_name(name);
        XmlElement {
            name: name.to_string(),
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            namespace_uri: String::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// The first attribute present among `names`, searched in the given
    /// order.
    pub fn attr(&self, names: &[&str]) -> Option<&str> {
        for name in names {
            if let Some((_, v)) = self.attributes.iter().find(|(k, _)| k == name) {
                return Some(v.as_str());
            }
        }
        None
    }

    /// Whether the element carries any attribute besides `xmlns`/`xml:*`
    /// declarations.
    pub fn has_rdf_attributes(&self) -> bool {
        self.attributes
            .iter()
            .any(|(k, _)| k != "xmlns" && !k.starts_with("xmlns:") && !k.starts_with("xml:"))
    }

    /// Whether the element has no child elements; whatever content it has
    /// (possibly none at all) is plain text. An empty element never gets a
    /// text node from the reader, so text presence cannot be part of this.
    pub fn is_text_only(&self) -> bool {
        self.children.is_empty()
    }

    /// Re-render the element's content (children and text) as markup.
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.render(&mut out);
        }
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        out
    }

    fn render(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(v);
            out.push('"');
        }
        if self.children.is_empty() && self.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&self.inner_xml());
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Namespace declarations visible at one nesting level.
#[derive(Clone, Debug, Default)]
struct NsScope {
    prefixes: HashMap<String, String>,
    default: Option<String>,
}

impl NsScope {
    fn declare(&mut self, attrs: &[(String, String)]) {
        for (k, v) in attrs {
            if let Some(prefix) = k.strip_prefix("xmlns:") {
                let (p, uri) = ns::resolve_declaration(prefix, v);
                self.prefixes.insert(p, uri);
            } else if k == "xmlns" {
                self.default = Some(v.clone());
            }
        }
    }

    fn resolve(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(p) => self.prefixes.get(p).cloned().unwrap_or_default(),
            None => self.default.clone().unwrap_or_default(),
        }
    }
}

/// Read a whole document into a tree, returning its root element.
pub(crate) fn read_document<R: BufRead>(reader: R) -> ModelResult<XmlElement> {
    let mut reader = Reader::from_reader(reader);
    let mut buf = Vec::new();
    // (element under construction, scope it opened)
    let mut stack: Vec<(XmlElement, NsScope)> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let elem = open_element(&e, stack.last().map(|(_, s)| s))?;
                stack.push(elem);
            }
            Event::Empty(e) => {
                let (elem, _) = open_element(&e, stack.last().map(|(_, s)| s))?;
                if let Some(done) = close_element(&mut stack, Some(elem))? {
                    return Ok(done);
                }
            }
            Event::End(_) => {
                if let Some(done) = close_element(&mut stack, None)? {
                    return Ok(done);
                }
            }
            Event::Text(e) => {
                if let Some((elem, _)) = stack.last_mut() {
                    let text = e.unescape()?;
                    if !text.trim().is_empty() || elem.text.is_some() {
                        elem.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            Event::CData(e) => {
                if let Some((elem, _)) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    elem.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::Eof => {
                return Err(ModelError::XmlShape(
                    "document ended before the root element was closed".to_string(),
                ));
            }
            // declarations, comments, processing instructions, doctypes
            _ => {}
        }
        buf.clear();
    }
}

fn open_element(
    e: &quick_xml::events::BytesStart,
    parent_scope: Option<&NsScope>,
) -> ModelResult<(XmlElement, NsScope)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut elem = XmlElement::new(&name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        elem.set_attr(key, value);
    }
    let mut scope = parent_scope.cloned().unwrap_or_default();
    scope.declare(&elem.attributes);
    elem.namespace_uri = scope.resolve(elem.prefix.as_deref());
    Ok((elem, scope))
}

/// Pop the current element (or attach `leaf`) into its parent; returns the
/// root once the outermost element closes.
fn close_element(
    stack: &mut Vec<(XmlElement, NsScope)>,
    leaf: Option<XmlElement>,
) -> ModelResult<Option<XmlElement>> {
    let elem = match leaf {
        Some(elem) => elem,
        None => {
            let (elem, _) = stack
                .pop()
                .ok_or_else(|| ModelError::XmlShape("unbalanced end tag".to_string()))?;
            elem
        }
    };
    match stack.last_mut() {
        Some((parent, _)) => {
            parent.children.push(elem);
            Ok(None)
        }
        None => Ok(Some(elem)),
    }
}
