//! HTML to chunk tree conversion
//!
//! `HtmlParser` normalizes whitespace, loads the markup leniently and walks
//! the `<body>` element in document order, creating one chunk per element
//! and per non-blank text node.

use crate::chunk::{ChunkId, ChunkKind, ChunkTree, OrderedList};
use crate::dom::{self, Element, Node};
use crate::error::HtmlError;
use crate::numbering::NumberingType;
use crate::tag::Tag;

/// Class token that turns any element into a page break.
pub const PAGE_BREAK_CLASS: &str = "page-break";

/// Limits applied while parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum input length in bytes, before normalization.
    pub max_input_bytes: usize,
    /// Maximum number of simultaneously open elements.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: 4 * 1024 * 1024,
            max_depth: 256,
        }
    }
}

/// Parser producing [`ChunkTree`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Parser with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with explicit limits.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Active limits.
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse a full document.
    ///
    /// Returns `None` when nothing renderable was produced; the reason is
    /// logged at debug level (see [`HtmlParser::try_parse`]).
    pub fn parse(&self, html: &str) -> Option<ChunkTree> {
        match self.try_parse(html) {
            Ok(tree) => Some(tree),
            Err(err) => {
                log::debug!("HTML rejected: {}", err);
                None
            }
        }
    }

    /// Parse a full document, reporting why nothing was produced.
    pub fn try_parse(&self, html: &str) -> Result<ChunkTree, HtmlError> {
        if html.len() > self.options.max_input_bytes {
            log::warn!(
                "HTML input of {} bytes exceeds limit of {} bytes",
                html.len(),
                self.options.max_input_bytes
            );
            return Err(HtmlError::InputTooLarge {
                len: html.len(),
                max: self.options.max_input_bytes,
            });
        }
        let normalized = normalize_html(html);
        if normalized.is_empty() {
            return Err(HtmlError::EmptyInput);
        }

        let document = dom::load(&normalized, self.options.max_depth).inspect_err(|err| {
            if matches!(err, HtmlError::DepthExceeded { .. }) {
                log::warn!("{}", err);
            }
        })?;
        let body = document.body().ok_or(HtmlError::MissingBody)?;

        let mut tree = ChunkTree::new();
        let root = tree.root();
        if let Some(class_name) = body.attribute("class") {
            tree.set_class_name(root, class_name);
        }
        build_children(&mut tree, root, body)?;

        if tree.children(root).is_empty() {
            return Err(HtmlError::Empty);
        }
        log::debug!("parsed HTML into {} chunks", tree.len());
        Ok(tree)
    }

    /// Parse markup that may lack a `<body>` element.
    pub fn parse_fragment(&self, html: &str) -> Option<ChunkTree> {
        self.parse(&wrap_fragment(html))
    }

    /// Like [`HtmlParser::parse_fragment`], reporting failures.
    pub fn try_parse_fragment(&self, html: &str) -> Result<ChunkTree, HtmlError> {
        self.try_parse(&wrap_fragment(html))
    }
}

/// Parse with default limits.
pub fn parse(html: &str) -> Option<ChunkTree> {
    HtmlParser::new().parse(html)
}

/// Strip `\n`/`\r`, collapse ASCII whitespace runs to one space and trim.
///
/// Non-breaking spaces are content and survive untouched.
pub fn normalize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pending_space = false;
    for c in html.chars().filter(|c| *c != '\n' && *c != '\r') {
        if c.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

fn is_blank(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_whitespace())
}

fn wrap_fragment(html: &str) -> String {
    if html.to_ascii_lowercase().contains("<body") {
        html.to_string()
    } else {
        format!("<body>{}</body>", html)
    }
}

fn build_children(tree: &mut ChunkTree, parent: ChunkId, element: &Element) -> Result<(), HtmlError> {
    for node in &element.children {
        match node {
            Node::Element(child) => {
                let id = build_element(tree, parent, child)?;
                let next_parent = if tree[id].kind().is_leaf() { parent } else { id };
                build_children(tree, next_parent, child)?;
            }
            Node::Text(text) => {
                if !is_blank(text) {
                    tree.append(parent, Tag::Text, ChunkKind::Text(text.clone()))?;
                }
            }
            Node::Other => {}
        }
    }
    Ok(())
}

fn build_element(tree: &mut ChunkTree, parent: ChunkId, element: &Element) -> Result<ChunkId, HtmlError> {
    let class_name = element.attribute("class");
    let is_page_break = class_name
        .is_some_and(|name| name.split_whitespace().any(|token| token == PAGE_BREAK_CLASS));
    let tag = Tag::from_name(&element.name);

    let kind = if is_page_break {
        ChunkKind::PageBreak
    } else {
        match tag {
            Tag::ListItem => ChunkKind::ListItem,
            Tag::OrderedList => ChunkKind::OrderedList(OrderedList {
                numbering: element
                    .attribute("type")
                    .map(NumberingType::from_attribute)
                    .unwrap_or_default(),
                start: 1,
            }),
            Tag::UnorderedList => ChunkKind::UnorderedList,
            Tag::LineBreak => ChunkKind::LineBreak,
            _ => ChunkKind::Parent,
        }
    };

    let id = tree.append(parent, tag, kind)?;
    if let Some(class_name) = class_name {
        tree.set_class_name(id, class_name);
    }
    if let Some(css) = element.attribute("style") {
        tree.set_css(id, css);
    }
    if let Some(start) = element.attribute("start") {
        match start.trim().parse::<i64>() {
            Ok(start) => {
                tree.set_start(id, start);
            }
            Err(_) => log::debug!("ignoring list start '{}'", start),
        }
    }
    Ok(id)
}
