//! Lenient HTML loader
//!
//! Builds a small owned node tree from markup with `quick_xml` events.
//! The reader runs with end-name checks disabled, and the loader repairs
//! structure itself: void elements never take children, an end tag closes
//! the innermost matching element (and anything opened after it), stray end
//! tags are dropped, and elements still open at EOF are closed.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::HtmlError;

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "col", "area", "base", "embed", "source",
    "track", "wbr",
];

/// HTML entities outside the XML predefined set.
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("nbsp", "\u{a0}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("euro", "\u{20ac}"),
    ("laquo", "\u{ab}"),
    ("raquo", "\u{bb}"),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("hellip", "\u{2026}"),
    ("bull", "\u{2022}"),
];

/// Name of the synthetic document root.
const DOCUMENT_NAME: &str = "#document";

/// A loaded node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Element with attributes and children
    Element(Element),
    /// Character data (entities resolved)
    Text(String),
    /// Comment or any other node the parser skips
    Other,
}

/// An element node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name
    pub name: String,
    /// Attributes in source order, lowercase names
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    /// Value of an attribute by (lowercase) name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements, skipping text and other nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First element named `name` in document order, self included.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(name))
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

/// A loaded document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Synthetic root holding the top-level nodes
    pub root: Element,
}

impl Document {
    /// First `<body>` element in document order.
    pub fn body(&self) -> Option<&Element> {
        self.root.child_elements().find_map(|child| child.find("body"))
    }
}

/// Whether `name` is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Load markup into a [`Document`].
///
/// Fails on any reader error, or when more than `max_depth` elements are
/// open at once.
pub fn load(html: &str, max_depth: usize) -> Result<Document, HtmlError> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = false;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    // a bare `&` arrives as text and is kept literally
    config.allow_dangling_amp = true;

    let mut buf = Vec::new();
    // Open elements; index 0 is the document root.
    let mut stack: Vec<Element> = vec![Element::new(DOCUMENT_NAME.to_string(), Vec::new())];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let element = read_element(&e, &reader)?;
                if is_void_element(&element.name) {
                    append_node(&mut stack, Node::Element(element));
                } else {
                    if stack.len() > max_depth {
                        return Err(HtmlError::DepthExceeded { max: max_depth });
                    }
                    stack.push(element);
                }
            }
            Event::Empty(e) => {
                let element = read_element(&e, &reader)?;
                append_node(&mut stack, Node::Element(element));
            }
            Event::End(e) => {
                let name = decode_name(e.name().as_ref(), &reader)?;
                if let Some(position) = stack.iter().rposition(|open| open.name == name) {
                    if position > 0 {
                        close_to(&mut stack, position);
                    }
                }
            }
            Event::Text(e) => {
                let text = e.decode().map_err(decode_error)?;
                push_text(&mut stack, &text);
            }
            Event::CData(e) => {
                let text = reader.decoder().decode(&e).map_err(decode_error)?;
                push_text(&mut stack, &text);
            }
            Event::GeneralRef(e) => {
                let name = e.decode().map_err(decode_error)?;
                push_text(&mut stack, &resolve_entity(&name));
            }
            Event::Comment(_) => append_node(&mut stack, Node::Other),
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
        buf.clear();
    }

    close_to(&mut stack, 1);
    let root = stack.pop().unwrap_or_default();
    Ok(Document { root })
}

/// Resolve an entity name (without `&` and `;`).
///
/// XML predefined and numeric references go through `quick_xml`; a short
/// HTML table follows; anything else is kept literally.
pub fn resolve_entity(name: &str) -> String {
    let entity = format!("&{};", name);
    if let Ok(resolved) = unescape(&entity) {
        return resolved.into_owned();
    }
    HTML_ENTITIES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .unwrap_or(entity)
}

/// Pop every element at `position` and above, attaching each to its parent.
fn close_to(stack: &mut Vec<Element>, position: usize) {
    while stack.len() > position.max(1) {
        if let Some(element) = stack.pop() {
            append_node(stack, Node::Element(element));
        }
    }
}

fn append_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    if let Some(parent) = stack.last_mut() {
        parent.push_text(text);
    }
}

fn read_element(e: &BytesStart, reader: &Reader<&[u8]>) -> Result<Element, HtmlError> {
    let name = decode_name(e.name().as_ref(), reader)?;
    let mut attributes = Vec::new();
    for attr in e.html_attributes().flatten() {
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(decode_error)?
            .to_ascii_lowercase();
        let raw = reader.decoder().decode(&attr.value).map_err(decode_error)?;
        let value = match unescape(&raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw.into_owned(),
        };
        attributes.push((key, value));
    }
    Ok(Element::new(name, attributes))
}

fn decode_name(name: &[u8], reader: &Reader<&[u8]>) -> Result<String, HtmlError> {
    reader
        .decoder()
        .decode(name)
        .map(|s| s.to_ascii_lowercase())
        .map_err(decode_error)
}

fn decode_error<E: core::fmt::Debug>(err: E) -> HtmlError {
    HtmlError::Parse(format!("Decode error: {:?}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(html: &str) -> Element {
        load(html, 64).unwrap().body().cloned().unwrap()
    }

    #[test]
    fn test_loads_nested_elements() {
        let body = body("<html><body><p>Hi <b>there</b></p></body></html>");
        let p = body.child_elements().next().unwrap();
        assert_eq!(p.name, "p");
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.children[0], Node::Text("Hi ".into()));
    }

    #[test]
    fn test_names_are_lowercased() {
        let body = body("<BODY CLASS=\"x\"><P>a</P></BODY>");
        assert_eq!(body.attribute("class"), Some("x"));
        assert_eq!(body.child_elements().next().unwrap().name, "p");
    }

    #[test]
    fn test_unclosed_tags_close_at_eof() {
        let body = body("<body><p>one<p>two");
        let p = body.child_elements().next().unwrap();
        assert_eq!(p.children[0], Node::Text("one".into()));
        // the second <p> nests inside the first since nothing closed it
        assert_eq!(p.child_elements().next().unwrap().name, "p");
    }

    #[test]
    fn test_mismatched_end_closes_inner_elements() {
        let body = body("<body><p><b>bold</p>after</body>");
        let names: Vec<&str> = body.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["p"]);
        assert_eq!(body.children[1], Node::Text("after".into()));
    }

    #[test]
    fn test_stray_end_tag_is_ignored() {
        let body = body("<body></span><p>x</p></body>");
        assert_eq!(body.children.len(), 1);
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let body = body("<body>a<br>b<br/>c</body>");
        assert_eq!(body.children.len(), 5);
        assert_eq!(body.children[2], Node::Text("b".into()));
    }

    #[test]
    fn test_unquoted_and_valueless_attributes() {
        let body = body("<body><ol type=A start=3 reversed><li>x</li></ol></body>");
        let ol = body.child_elements().next().unwrap();
        assert_eq!(ol.attribute("type"), Some("A"));
        assert_eq!(ol.attribute("start"), Some("3"));
        assert_eq!(ol.attribute("reversed"), Some(""));
    }

    #[test]
    fn test_entities_merge_into_text() {
        let body = body("<body><p>Fish &amp; chips &copy; &#65;&unknown;</p></body>");
        let p = body.child_elements().next().unwrap();
        assert_eq!(
            p.children,
            vec![Node::Text("Fish & chips \u{a9} A&unknown;".into())]
        );
    }

    #[test]
    fn test_dangling_ampersand_is_literal_text() {
        let body = body("<body><p>AT&T and R&D</p><p>Terms & conditions</p><p>tail &</p></body>");
        let texts: Vec<&Node> = body
            .child_elements()
            .map(|p| &p.children[0])
            .collect();
        assert_eq!(
            texts,
            vec![
                &Node::Text("AT&T and R&D".into()),
                &Node::Text("Terms & conditions".into()),
                &Node::Text("tail &".into()),
            ]
        );
    }

    #[test]
    fn test_comments_become_other_nodes() {
        let body = body("<body><!-- note --><p>x</p></body>");
        assert_eq!(body.children[0], Node::Other);
    }

    #[test]
    fn test_depth_limit() {
        let html = "<body><span><span><span>deep</span></span></span></body>";
        assert!(matches!(
            load(html, 2),
            Err(HtmlError::DepthExceeded { max: 2 })
        ));
        assert!(load(html, 4).is_ok());
    }

    #[test]
    fn test_missing_body() {
        let doc = load("<div>no body</div>", 64).unwrap();
        assert!(doc.body().is_none());
    }
}
