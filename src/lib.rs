//! htmlpdf -- HTML subset to PDF chunk engine
//!
//! Parses a constrained HTML/CSS subset into a tree of typed chunks
//! (paragraphs, lists, text runs, line and page breaks), resolves each
//! chunk's style from its tag, class tokens and inline CSS, and walks the
//! tree to emit drawing calls against a [`Canvas`].
//!
//! Layout and PDF serialization live in the `htmlpdf-render` and
//! `htmlpdf-writer` workspace crates.
//!
//! # Example
//! ```
//! use htmlpdf::{parse, ChunkKind};
//!
//! let tree = parse("<body><ol type=\"I\"><li>First</li></ol></body>").unwrap();
//! let list = tree.children(tree.root())[0];
//! let item = tree.children(list)[0];
//! assert_eq!(tree[item].kind(), &ChunkKind::ListItem);
//! assert_eq!(tree.bullet_text(item).as_deref(), Some("I."));
//! ```
//!
//! # Features
//!
//! - `cli` -- builds the `htmlpdf` inspection binary

#![warn(missing_docs)]
#![deny(clippy::large_enum_variant, clippy::large_stack_arrays, clippy::redundant_clone)]
#![warn(
    clippy::box_collection,
    clippy::needless_collect,
    clippy::map_clone,
    clippy::implicit_clone,
    clippy::inefficient_to_string
)]

pub mod canvas;
pub mod chunk;
pub mod color;
pub mod dom;
pub mod error;
pub mod numbering;
pub mod output;
pub mod parser;
pub mod style;
pub mod tag;

// Re-export key types for convenience
pub use canvas::Canvas;
pub use chunk::{Chunk, ChunkId, ChunkKind, ChunkTree, OrderedList, UNORDERED_BULLET};
pub use color::{Color, PaletteColor};
pub use error::{HtmlError, TreeError};
pub use numbering::NumberingType;
pub use output::OutputOptions;
pub use parser::{normalize_html, parse, HtmlParser, ParseOptions, PAGE_BREAK_CLASS};
pub use style::{
    resolve_style, Alignment, Font, FontFamily, FontStyle, Margins, Style, StylePatch,
    DEFAULT_FONT_SIZE, MARGIN_SCALE,
};
pub use tag::Tag;
