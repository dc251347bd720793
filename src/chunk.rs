//! Chunk tree arena
//!
//! Chunks live in a [`ChunkTree`] and refer to each other by [`ChunkId`].
//! Parents own the ordered child list; the parent handle kept on a child is
//! only a back-reference used for traversal.

use core::ops::Index;

use crate::error::TreeError;
use crate::numbering::NumberingType;
use crate::style::{apply_inline_css, normalize_class_name, resolve_style, Style};
use crate::tag::Tag;

/// Bullet glyph of unordered lists.
pub const UNORDERED_BULLET: &str = "\u{2022}";

/// Handle of a chunk inside its [`ChunkTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(usize);

impl ChunkId {
    /// Arena slot of this chunk.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered-list settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderedList {
    /// Numbering system
    pub numbering: NumberingType,
    /// Value of the first item (at least 1)
    pub start: u32,
}

impl Default for OrderedList {
    fn default() -> Self {
        Self {
            numbering: NumberingType::Arabic,
            start: 1,
        }
    }
}

impl OrderedList {
    /// Bullet text for a 1-based item index.
    pub fn bullet(&self, index: u32) -> String {
        let value = index.max(1).saturating_add(self.start.max(1) - 1);
        self.numbering.format(value)
    }
}

/// What a chunk is and how it renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkKind {
    /// Generic container
    Parent,
    /// Literal text leaf
    Text(String),
    /// List item
    ListItem,
    /// `ol`
    OrderedList(OrderedList),
    /// `ul`
    UnorderedList,
    /// Leaf that starts a new page
    PageBreak,
    /// Leaf that forces a new line
    LineBreak,
}

impl ChunkKind {
    /// Leaves never take children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Text(_) | Self::PageBreak | Self::LineBreak)
    }

    /// `ol` or `ul`.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::OrderedList(_) | Self::UnorderedList)
    }

    /// Short kind label used in dumps.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Text(_) => "text",
            Self::ListItem => "list-item",
            Self::OrderedList(_) => "ordered-list",
            Self::UnorderedList => "unordered-list",
            Self::PageBreak => "page-break",
            Self::LineBreak => "line-break",
        }
    }
}

/// One node of the chunk tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    tag: Tag,
    kind: ChunkKind,
    class_name: Option<String>,
    css: Option<String>,
    style: Option<Style>,
    parent: Option<ChunkId>,
    children: Vec<ChunkId>,
}

impl Chunk {
    fn new(tag: Tag, kind: ChunkKind) -> Self {
        let style = resolve_style(&tag, core::iter::empty());
        Self {
            tag,
            kind,
            class_name: None,
            css: None,
            style,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Tag
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Kind
    pub fn kind(&self) -> &ChunkKind {
        &self.kind
    }

    /// Normalized class attribute
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Class tokens in order
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.class_name.iter().flat_map(|name| name.split(' '))
    }

    /// Inline CSS
    pub fn css(&self) -> Option<&str> {
        self.css.as_deref()
    }

    /// Own resolved style
    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// Parent handle
    pub fn parent(&self) -> Option<ChunkId> {
        self.parent
    }

    /// Children in order
    pub fn children(&self) -> &[ChunkId] {
        &self.children
    }

    /// Text of a text chunk
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ChunkKind::Text(text) => Some(text),
            _ => None,
        }
    }

    fn restyle(&mut self) {
        let style = resolve_style(&self.tag, self.class_tokens());
        self.style = match &self.css {
            Some(css) => apply_inline_css(style, css),
            None => style,
        };
    }
}

/// Arena owning every chunk of one parsed document.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkTree {
    chunks: Vec<Chunk>,
    root: ChunkId,
}

impl Default for ChunkTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkTree {
    /// Tree whose root is an empty `body` container.
    pub fn new() -> Self {
        Self::with_root(Tag::Body, ChunkKind::Parent)
    }

    /// Tree with a custom root chunk.
    pub fn with_root(tag: Tag, kind: ChunkKind) -> Self {
        Self {
            chunks: vec![Chunk::new(tag, kind)],
            root: ChunkId(0),
        }
    }

    /// Root handle.
    pub fn root(&self) -> ChunkId {
        self.root
    }

    /// Number of chunks, detached ones included.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false; a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk by handle.
    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(id.0)
    }

    /// Create a detached chunk styled from its tag.
    pub fn create(&mut self, tag: Tag, kind: ChunkKind) -> ChunkId {
        let id = ChunkId(self.chunks.len());
        self.chunks.push(Chunk::new(tag, kind));
        id
    }

    /// Create a chunk and add it as the last child of `parent`.
    pub fn append(&mut self, parent: ChunkId, tag: Tag, kind: ChunkKind) -> Result<ChunkId, TreeError> {
        self.check_parent(parent)?;
        let id = self.create(tag, kind);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Add `child` as the last child of `parent`.
    ///
    /// No-op when already present. A child attached elsewhere is moved.
    pub fn add_child(&mut self, parent: ChunkId, child: ChunkId) -> Result<(), TreeError> {
        self.check_parent(parent)?;
        if self.get(child).is_none() {
            return Err(TreeError::UnknownChunk);
        }
        if child == parent || self.ancestors(parent).any(|id| id == child) {
            return Err(TreeError::Cycle);
        }
        match self.chunks[child.0].parent {
            Some(current) if current == parent => return Ok(()),
            Some(current) => {
                self.remove_child(current, child);
            }
            None => {}
        }
        self.chunks[parent.0].children.push(child);
        self.chunks[child.0].parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`; returns whether it was present.
    pub fn remove_child(&mut self, parent: ChunkId, child: ChunkId) -> bool {
        let Some(chunk) = self.chunks.get_mut(parent.0) else {
            return false;
        };
        let Some(position) = chunk.children.iter().position(|id| *id == child) else {
            return false;
        };
        chunk.children.remove(position);
        if let Some(removed) = self.chunks.get_mut(child.0) {
            removed.parent = None;
        }
        true
    }

    /// Position among the parent's children; `None` for the root or a
    /// detached chunk.
    pub fn index(&self, id: ChunkId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// Children of a chunk (empty for unknown handles).
    pub fn children(&self, id: ChunkId) -> &[ChunkId] {
        match self.get(id) {
            Some(chunk) => &chunk.children,
            None => &[],
        }
    }

    /// Parent handle.
    pub fn parent(&self, id: ChunkId) -> Option<ChunkId> {
        self.get(id)?.parent
    }

    /// The sibling right after `id`.
    pub fn next_sibling(&self, id: ChunkId) -> Option<ChunkId> {
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: ChunkId) -> impl Iterator<Item = ChunkId> + '_ {
        core::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Set the class attribute and recompute the style.
    pub fn set_class_name(&mut self, id: ChunkId, class_name: &str) {
        if let Some(chunk) = self.chunks.get_mut(id.0) {
            chunk.class_name = normalize_class_name(class_name);
            chunk.restyle();
        }
    }

    /// Attach inline CSS and recompute the style.
    pub fn set_css(&mut self, id: ChunkId, css: &str) {
        if let Some(chunk) = self.chunks.get_mut(id.0) {
            let css = css.trim();
            chunk.css = (!css.is_empty()).then(|| css.to_string());
            chunk.restyle();
        }
    }

    /// Set the first value of an ordered list, clamped to at least 1.
    ///
    /// Returns false when `id` is not an ordered list.
    pub fn set_start(&mut self, id: ChunkId, start: i64) -> bool {
        match self.chunks.get_mut(id.0).map(|chunk| &mut chunk.kind) {
            Some(ChunkKind::OrderedList(list)) => {
                list.start = start.clamp(1, i64::from(u32::MAX)) as u32;
                true
            }
            _ => false,
        }
    }

    /// Set the numbering system of an ordered list.
    ///
    /// Returns false when `id` is not an ordered list.
    pub fn set_numbering(&mut self, id: ChunkId, numbering: NumberingType) -> bool {
        match self.chunks.get_mut(id.0).map(|chunk| &mut chunk.kind) {
            Some(ChunkKind::OrderedList(list)) => {
                list.numbering = numbering;
                true
            }
            _ => false,
        }
    }

    /// Whether the parent emits a line break after this chunk.
    pub fn is_new_line(&self, id: ChunkId) -> bool {
        let Some(chunk) = self.get(id) else {
            return false;
        };
        match chunk.kind {
            ChunkKind::LineBreak => true,
            ChunkKind::PageBreak => false,
            ChunkKind::Text(_) => self
                .next_sibling(id)
                .and_then(|next| self.get(next))
                .is_some_and(|next| next.kind.is_list()),
            ChunkKind::ListItem => !self.ends_with_new_line(id),
            ChunkKind::Parent | ChunkKind::OrderedList(_) | ChunkKind::UnorderedList => {
                matches!(chunk.tag, Tag::Heading(_) | Tag::Paragraph)
            }
        }
    }

    /// Whether the last-descendant chain of `id` already ends a line.
    pub fn ends_with_new_line(&self, id: ChunkId) -> bool {
        match self.children(id).last() {
            Some(last) => self.is_new_line(*last) || self.ends_with_new_line(*last),
            None => false,
        }
    }

    /// Own style, or the nearest styled ancestor's.
    pub fn nearest_style(&self, id: ChunkId) -> Option<&Style> {
        core::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|current| self.get(current)?.style())
    }

    /// Nearest `ol`/`ul` ancestor of a chunk.
    pub fn list_of(&self, id: ChunkId) -> Option<ChunkId> {
        self.ancestors(id)
            .find(|ancestor| self.get(*ancestor).is_some_and(|c| c.kind.is_list()))
    }

    /// 1-based position of a list item among its list-item siblings.
    pub fn item_number(&self, id: ChunkId) -> u32 {
        let Some(parent) = self.parent(id) else {
            return 1;
        };
        let preceding = self
            .children(parent)
            .iter()
            .take_while(|child| **child != id)
            .filter(|child| self.is_list_item(**child))
            .count();
        u32::try_from(preceding + 1).unwrap_or(u32::MAX)
    }

    /// Bullet text of a list item; `None` outside a list.
    pub fn bullet_text(&self, id: ChunkId) -> Option<String> {
        let list = self.list_of(id)?;
        self.list_bullet(list, self.item_number(id))
    }

    /// Widest bullet of the list containing `id`: the bullet of its last
    /// item.
    pub fn widest_bullet(&self, id: ChunkId) -> Option<String> {
        self.list_widest_bullet(self.list_of(id)?)
    }

    /// Widest bullet of `list` itself; `None` when it is not a list.
    pub(crate) fn list_widest_bullet(&self, list: ChunkId) -> Option<String> {
        if !self.get(list)?.kind.is_list() {
            return None;
        }
        let items = self
            .children(list)
            .iter()
            .filter(|child| self.is_list_item(**child))
            .count()
            .max(1);
        self.list_bullet(list, u32::try_from(items).unwrap_or(u32::MAX))
    }

    /// Handles in depth-first document order, root first.
    pub fn descendants(&self) -> Vec<ChunkId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub(crate) fn list_bullet(&self, list: ChunkId, index: u32) -> Option<String> {
        match &self.get(list)?.kind {
            ChunkKind::OrderedList(ordered) => Some(ordered.bullet(index)),
            ChunkKind::UnorderedList => Some(UNORDERED_BULLET.to_string()),
            _ => None,
        }
    }

    pub(crate) fn is_list_item(&self, id: ChunkId) -> bool {
        self.get(id)
            .is_some_and(|chunk| chunk.kind == ChunkKind::ListItem)
    }

    fn check_parent(&self, parent: ChunkId) -> Result<(), TreeError> {
        match self.get(parent) {
            None => Err(TreeError::UnknownChunk),
            Some(chunk) if chunk.kind.is_leaf() => Err(TreeError::LeafParent),
            Some(_) => Ok(()),
        }
    }
}

impl Index<ChunkId> for ChunkTree {
    type Output = Chunk;

    fn index(&self, id: ChunkId) -> &Chunk {
        &self.chunks[id.0]
    }
}
