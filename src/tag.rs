//! Closed set of tags the chunk engine distinguishes
//!
//! Anything outside the table is kept as [`Tag::Other`] with its lowercase
//! name so it can still carry classes and children.

use crate::color::PaletteColor;
use crate::style::{FontFamily, FontStyle, Style, DEFAULT_FONT_SIZE};

/// Size factors for `h1` .. `h6` relative to the default font size.
const HEADING_FACTORS: [f32; 6] = [2.5, 2.0, 1.75, 1.5, 1.25, 1.0];

/// Bottom margin of block-level tags, in points.
const BLOCK_BOTTOM_MARGIN: f32 = 2.0;

/// Tag of a chunk.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `body` (tree root)
    Body,
    /// `h1` .. `h6`, holding the level 1..=6
    Heading(u8),
    /// `p`
    Paragraph,
    /// `ul`
    UnorderedList,
    /// `ol`
    OrderedList,
    /// `li`
    ListItem,
    /// `b`
    Bold,
    /// `strong`
    Strong,
    /// `i`
    Italic,
    /// `em`
    Emphasis,
    /// `u`
    Underline,
    /// `code`
    Code,
    /// `var`
    Var,
    /// `samp`
    Samp,
    /// `kbd`
    Kbd,
    /// `span`
    Span,
    /// `br`
    LineBreak,
    /// Text node
    Text,
    /// Any other element, by lowercase name
    Other(String),
}

impl Tag {
    /// Classify a (case-insensitive) element name.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "body" => Self::Body,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" => Self::Paragraph,
            "ul" => Self::UnorderedList,
            "ol" => Self::OrderedList,
            "li" => Self::ListItem,
            "b" => Self::Bold,
            "strong" => Self::Strong,
            "i" => Self::Italic,
            "em" => Self::Emphasis,
            "u" => Self::Underline,
            "code" => Self::Code,
            "var" => Self::Var,
            "samp" => Self::Samp,
            "kbd" => Self::Kbd,
            "span" => Self::Span,
            "br" => Self::LineBreak,
            _ => Self::Other(lower),
        }
    }

    /// Lowercase element name (`#text` for text nodes).
    pub fn name(&self) -> &str {
        match self {
            Self::Body => "body",
            Self::Heading(level) => match level {
                1 => "h1",
                2 => "h2",
                3 => "h3",
                4 => "h4",
                5 => "h5",
                _ => "h6",
            },
            Self::Paragraph => "p",
            Self::UnorderedList => "ul",
            Self::OrderedList => "ol",
            Self::ListItem => "li",
            Self::Bold => "b",
            Self::Strong => "strong",
            Self::Italic => "i",
            Self::Emphasis => "em",
            Self::Underline => "u",
            Self::Code => "code",
            Self::Var => "var",
            Self::Samp => "samp",
            Self::Kbd => "kbd",
            Self::Span => "span",
            Self::LineBreak => "br",
            Self::Text => "#text",
            Self::Other(name) => name,
        }
    }

    /// Heading level for `h1` .. `h6`.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::Heading(level) => Some(*level),
            _ => None,
        }
    }

    /// `ul` or `ol`.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::UnorderedList | Self::OrderedList)
    }

    /// Tags whose single text child may be written as an aligned block.
    pub fn is_text_block(&self) -> bool {
        matches!(self, Self::Heading(_) | Self::Paragraph | Self::ListItem)
    }

    /// Style a chunk with this tag starts from, before class tokens.
    pub fn base_style(&self) -> Option<Style> {
        let style = match self {
            Self::Heading(level) => {
                let factor = HEADING_FACTORS[usize::from((*level).clamp(1, 6) - 1)];
                Style::bold()
                    .with_font_size(DEFAULT_FONT_SIZE * factor)
                    .with_bottom_margin(BLOCK_BOTTOM_MARGIN)
            }
            Self::Paragraph | Self::UnorderedList | Self::OrderedList => {
                Style::default().with_bottom_margin(BLOCK_BOTTOM_MARGIN)
            }
            Self::ListItem | Self::Span => Style::default(),
            Self::Bold | Self::Strong => Style::bold(),
            Self::Italic | Self::Emphasis => Style::italic(),
            Self::Underline => Style::underline(),
            Self::Code => Style::monospace().with_text_color(PaletteColor::Danger.color()),
            Self::Var => Style::monospace().with_font_style(FontStyle {
                italic: true,
                ..FontStyle::REGULAR
            }),
            Self::Samp | Self::Kbd => Style::default().with_family(FontFamily::Courier),
            Self::Body | Self::LineBreak | Self::Text | Self::Other(_) => return None,
        };
        Some(style)
    }
}
