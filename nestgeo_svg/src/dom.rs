//! A minimal DOM: the subset of an SVG document the converter needs,
//! built once from `quick_xml` events so the rest of the crate never
//! touches the XML reader directly.

use std::collections::HashMap;
use std::str;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use nestgeo_geom::{Diagnostic, DiagnosticKind};

/// One SVG element: its tag name, attributes, and children in document
/// order. Text content (used by `text` elements) is kept as a separate
/// field rather than a pseudo-child, since it's the only element kind
/// that carries character data the converter cares about.
#[derive(Clone, Debug, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attr_f64(&self, name: &str, default: f64) -> f64 {
        self.attr(name).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
    }

    pub fn attr_u32(&self, name: &str, default: u32) -> u32 {
        self.attr(name).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
    }
}

/// Parses `source` into an [`Element`] tree rooted at the outermost
/// `svg` element (or, failing that, the first element encountered).
pub fn parse(source: &str) -> Result<Element, Diagnostic> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text = true;

    // Stack of (element-so-far) frames; the top frame accumulates
    // children until its matching End event pops it onto its parent.
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                stack.push(read_element(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let el = read_element(&e)?;
                push_child(&mut stack, &mut root, el);
            }
            Ok(Event::End(_)) => {
                let el = stack.pop().ok_or_else(|| {
                    Diagnostic::new(DiagnosticKind::InvalidInput, "unbalanced closing tag in SVG source")
                })?;
                push_child(&mut stack, &mut root, el);
            }
            Ok(Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| {
                        Diagnostic::new(DiagnosticKind::InvalidInput, format!("invalid text content: {e}"))
                    })?;
                    top.text.push_str(text.as_ref());
                }
            }
            Ok(_) => {}
            Err(e) => {
                return Err(Diagnostic::new(DiagnosticKind::InvalidInput, format!("malformed SVG XML: {e}")));
            }
        }
    }

    root.ok_or_else(|| Diagnostic::new(DiagnosticKind::InvalidInput, "no root element found in SVG source"))
}

fn push_child(stack: &mut Vec<Element>, root: &mut Option<Element>, child: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(child),
        None => *root = Some(child),
    }
}

fn read_element(e: &quick_xml::events::BytesStart) -> Result<Element, Diagnostic> {
    let tag = local_name(e.name().as_ref());
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Diagnostic::new(DiagnosticKind::InvalidInput, format!("malformed attribute: {e}")))?;
        let key = local_name(attr.key.as_ref());
        let value = attr
            .unescape_value()
            .map_err(|e| Diagnostic::new(DiagnosticKind::InvalidInput, format!("malformed attribute value: {e}")))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(Element { tag, attrs, children: Vec::new(), text: String::new() })
}

/// Drops an `xlink:`/`svg:`-style namespace prefix; the converter
/// doesn't distinguish namespaces, only local tag/attribute names.
fn local_name(raw: &[u8]) -> String {
    let s = str::from_utf8(raw).unwrap_or_default();
    match s.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_with_attributes() {
        let src = r#"<svg width="100" height="100"><rect x="1" y="2" width="3" height="4"/></svg>"#;
        let root = parse(src).unwrap();
        assert_eq!(root.tag, "svg");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].tag, "rect");
        assert_eq!(root.children[0].attr("width"), Some("3"));
    }

    #[test]
    fn captures_text_content() {
        let src = r#"<svg><text x="0" y="0">Hi</text></svg>"#;
        let root = parse(src).unwrap();
        assert_eq!(root.children[0].text, "Hi");
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(parse("<svg><rect></svg>").is_err());
    }
}
