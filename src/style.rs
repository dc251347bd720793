//! Chunk styles and the class/inline-CSS cascade
//!
//! A chunk's style is computed once from its tag's base style, then folded
//! with one [`StylePatch`] per class token (left to right), and finally
//! adjusted by inline `color` / `background-color` declarations.
//!
//! Supported class vocabulary:
//! - Alignment: `text-left`, `text-right`, `text-center`, `text-justify`
//! - Font: `font-weight-bold`, `font-italic`, `font-weight-normal`,
//!   `text-monospace`
//! - Colors: `text-<palette>`, `bg-<palette>` (see [`PaletteColor`])
//! - Margins: `m[tblrxy]?-[0-5]`

use crate::color::{Color, PaletteColor};
use crate::tag::Tag;

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 9.0;

/// Margin values, in points, for the digits of `m*-0` .. `m*-5`.
pub const MARGIN_SCALE: [f32; 6] = [0.0, 1.0, 2.0, 4.0, 6.0, 12.0];

/// Built-in font families.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// Proportional sans-serif (Arial/Helvetica metrics)
    #[default]
    Helvetica,
    /// Monospace
    Courier,
    /// Proportional serif
    Times,
}

impl FontFamily {
    /// Lower-case family name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Helvetica => "helvetica",
            Self::Courier => "courier",
            Self::Times => "times",
        }
    }
}

/// Bold / italic / underline flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    /// Bold weight
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Underlined
    pub underline: bool,
}

impl FontStyle {
    /// No flags set.
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: false,
    };

    /// True when no flag is set.
    pub fn is_regular(self) -> bool {
        self == Self::REGULAR
    }
}

/// Font selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    /// Family
    pub family: FontFamily,
    /// Size in points
    pub size: f32,
    /// Style flags
    pub style: FontStyle,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: FontFamily::Helvetica,
            size: DEFAULT_FONT_SIZE,
            style: FontStyle::REGULAR,
        }
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Left-aligned
    #[default]
    Left,
    /// Right-aligned
    Right,
    /// Centered
    Center,
    /// Justified
    Justify,
}

/// Four-sided margins in points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    /// Top margin
    pub top: f32,
    /// Right margin
    pub right: f32,
    /// Bottom margin
    pub bottom: f32,
    /// Left margin
    pub left: f32,
}

impl Margins {
    /// Margins with every side set to `value`.
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    fn set(&mut self, sides: Sides, value: f32) {
        let value = value.max(0.0);
        match sides {
            Sides::Top => self.top = value,
            Sides::Bottom => self.bottom = value,
            Sides::Left => self.left = value,
            Sides::Right => self.right = value,
            Sides::Horizontal => {
                self.left = value;
                self.right = value;
            }
            Sides::Vertical => {
                self.top = value;
                self.bottom = value;
            }
            Sides::All => *self = Margins::all(value),
        }
    }
}

/// Which sides a margin token addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sides {
    /// `mt-*`
    Top,
    /// `mb-*`
    Bottom,
    /// `ml-*`
    Left,
    /// `mr-*`
    Right,
    /// `mx-*`
    Horizontal,
    /// `my-*`
    Vertical,
    /// `m-*`
    All,
}

/// Resolved visual style of a chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Font
    pub font: Font,
    /// Text color
    pub text_color: Color,
    /// Fill (background) color
    pub fill_color: Color,
    /// Margins
    pub margins: Margins,
    /// Alignment
    pub alignment: Alignment,
}

impl Style {
    /// Default style with the bold flag.
    pub fn bold() -> Self {
        Self::default().with_font_style(FontStyle {
            bold: true,
            ..FontStyle::REGULAR
        })
    }

    /// Default style with the italic flag.
    pub fn italic() -> Self {
        Self::default().with_font_style(FontStyle {
            italic: true,
            ..FontStyle::REGULAR
        })
    }

    /// Default style with the underline flag.
    pub fn underline() -> Self {
        Self::default().with_font_style(FontStyle {
            underline: true,
            ..FontStyle::REGULAR
        })
    }

    /// Default style in the monospace family.
    pub fn monospace() -> Self {
        Self::default().with_family(FontFamily::Courier)
    }

    /// Replace the font family.
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.font.family = family;
        self
    }

    /// Replace the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font.size = size;
        self
    }

    /// Replace the font style flags.
    pub fn with_font_style(mut self, style: FontStyle) -> Self {
        self.font.style = style;
        self
    }

    /// Replace the text color.
    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    /// Replace the bottom margin.
    pub fn with_bottom_margin(mut self, margin: f32) -> Self {
        self.margins.bottom = margin.max(0.0);
        self
    }

    /// Apply one patch and return the result.
    pub fn apply(mut self, patch: StylePatch) -> Self {
        match patch {
            StylePatch::Align(alignment) => self.alignment = alignment,
            StylePatch::Bold => self.font.style.bold = true,
            StylePatch::Italic => self.font.style.italic = true,
            StylePatch::Regular => self.font.style = FontStyle::REGULAR,
            StylePatch::Monospace => {
                self.font.family = FontFamily::Courier;
                self.font.style = FontStyle::REGULAR;
            }
            StylePatch::TextColor(color) => self.text_color = color,
            StylePatch::FillColor(color) => self.fill_color = color,
            StylePatch::Margin(sides, value) => self.margins.set(sides, value),
            StylePatch::Ignored => {}
        }
        self
    }

    /// Apply inline CSS color declarations.
    ///
    /// Only `color` and `background-color` are honored; unparseable values
    /// and any other property are ignored.
    pub fn apply_css(self, css: &str) -> Self {
        css_patches(css).fold(self, Style::apply)
    }
}

/// A single style mutation produced by one class token or CSS declaration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StylePatch {
    /// Set alignment
    Align(Alignment),
    /// Set bold
    Bold,
    /// Set italic
    Italic,
    /// Clear bold, italic and underline
    Regular,
    /// Switch to monospace regular
    Monospace,
    /// Set text color
    TextColor(Color),
    /// Set fill color
    FillColor(Color),
    /// Set margin sides
    Margin(Sides, f32),
    /// Unrecognized token; no change
    Ignored,
}

impl StylePatch {
    /// Classify a class token.
    pub fn from_class(token: &str) -> Self {
        match token {
            "text-left" => Self::Align(Alignment::Left),
            "text-right" => Self::Align(Alignment::Right),
            "text-center" => Self::Align(Alignment::Center),
            "text-justify" => Self::Align(Alignment::Justify),
            "font-weight-bold" => Self::Bold,
            "font-italic" => Self::Italic,
            "font-weight-normal" => Self::Regular,
            "text-monospace" => Self::Monospace,
            _ => {
                if let Some(name) = token.strip_prefix("text-") {
                    return PaletteColor::from_name(name)
                        .map_or(Self::Ignored, |c| Self::TextColor(c.color()));
                }
                if let Some(name) = token.strip_prefix("bg-") {
                    return PaletteColor::from_name(name)
                        .map_or(Self::Ignored, |c| Self::FillColor(c.color()));
                }
                parse_margin_token(token).map_or(Self::Ignored, |(sides, value)| {
                    Self::Margin(sides, value)
                })
            }
        }
    }

    /// True for the no-op variant.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Resolve a chunk style from its tag and class tokens.
///
/// Returns `None` when the tag has no base style and no token is
/// recognized, meaning the chunk draws with the ambient canvas state.
pub fn resolve_style<'a, I>(tag: &Tag, class_tokens: I) -> Option<Style>
where
    I: IntoIterator<Item = &'a str>,
{
    let patches: Vec<StylePatch> = class_tokens
        .into_iter()
        .map(StylePatch::from_class)
        .filter(|patch| !patch.is_ignored())
        .collect();
    let base = match tag.base_style() {
        Some(style) => style,
        None if patches.is_empty() => return None,
        None => Style::default(),
    };
    Some(patches.into_iter().fold(base, Style::apply))
}

/// Apply inline CSS on top of an optional resolved style.
///
/// A missing style becomes [`Style::default`] only when at least one color
/// declaration applies.
pub fn apply_inline_css(style: Option<Style>, css: &str) -> Option<Style> {
    let mut patches = css_patches(css).peekable();
    if patches.peek().is_none() {
        return style;
    }
    Some(patches.fold(style.unwrap_or_default(), Style::apply))
}

/// Normalize a class attribute: split on whitespace, drop duplicates
/// (first occurrence wins), join with single spaces.
pub fn normalize_class_name(class_name: &str) -> Option<String> {
    let mut tokens: Vec<&str> = Vec::new();
    for token in class_name.split_whitespace() {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Parse `m[tblrxy]?-[0-5]`.
fn parse_margin_token(token: &str) -> Option<(Sides, f32)> {
    let rest = token.strip_prefix('m')?;
    let (sides, rest) = match rest.as_bytes().first()? {
        b't' => (Sides::Top, &rest[1..]),
        b'b' => (Sides::Bottom, &rest[1..]),
        b'l' => (Sides::Left, &rest[1..]),
        b'r' => (Sides::Right, &rest[1..]),
        b'x' => (Sides::Horizontal, &rest[1..]),
        b'y' => (Sides::Vertical, &rest[1..]),
        _ => (Sides::All, rest),
    };
    let digit = rest.strip_prefix('-')?;
    if digit.len() != 1 {
        return None;
    }
    let index = digit.chars().next()?.to_digit(10)? as usize;
    MARGIN_SCALE.get(index).map(|value| (sides, *value))
}

/// Iterate color patches from a `property: value;` declaration list.
fn css_patches(css: &str) -> impl Iterator<Item = StylePatch> + '_ {
    css.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        let color = Color::parse(value)?;
        match property.trim().to_ascii_lowercase().as_str() {
            "color" => Some(StylePatch::TextColor(color)),
            "background-color" => Some(StylePatch::FillColor(color)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = Style::default();
        assert_eq!(style.font.family, FontFamily::Helvetica);
        assert_eq!(style.font.size, DEFAULT_FONT_SIZE);
        assert!(style.font.style.is_regular());
        assert_eq!(style.text_color, Color::BLACK);
        assert_eq!(style.alignment, Alignment::Left);
        assert_eq!(style.margins, Margins::default());
    }

    #[test]
    fn test_alignment_last_token_wins() {
        let style = resolve_style(&Tag::Paragraph, ["text-right", "text-center"]).unwrap();
        assert_eq!(style.alignment, Alignment::Center);
    }

    #[test]
    fn test_margin_top_only() {
        let style = resolve_style(&Tag::Span, ["mt-3"]).unwrap();
        assert_eq!(style.margins.top, MARGIN_SCALE[3]);
        assert_eq!(style.margins.bottom, 0.0);
        assert_eq!(style.margins.left, 0.0);
        assert_eq!(style.margins.right, 0.0);
    }

    #[test]
    fn test_margin_horizontal() {
        let style = resolve_style(&Tag::Span, ["mx-2"]).unwrap();
        assert_eq!(style.margins.left, MARGIN_SCALE[2]);
        assert_eq!(style.margins.right, MARGIN_SCALE[2]);
        assert_eq!(style.margins.top, 0.0);
        assert_eq!(style.margins.bottom, 0.0);
    }

    #[test]
    fn test_margin_all_and_override() {
        let style = resolve_style(&Tag::Span, ["m-1", "mb-4"]).unwrap();
        assert_eq!(style.margins.top, MARGIN_SCALE[1]);
        assert_eq!(style.margins.left, MARGIN_SCALE[1]);
        assert_eq!(style.margins.right, MARGIN_SCALE[1]);
        assert_eq!(style.margins.bottom, MARGIN_SCALE[4]);
    }

    #[test]
    fn test_margin_token_rejects_out_of_scale() {
        assert!(StylePatch::from_class("mt-6").is_ignored());
        assert!(StylePatch::from_class("mt-10").is_ignored());
        assert!(StylePatch::from_class("mz-1").is_ignored());
        assert!(StylePatch::from_class("mt3").is_ignored());
        assert_eq!(
            StylePatch::from_class("my-5"),
            StylePatch::Margin(Sides::Vertical, 12.0)
        );
    }

    #[test]
    fn test_font_tokens() {
        let style = resolve_style(&Tag::Span, ["font-weight-bold", "font-italic"]).unwrap();
        assert!(style.font.style.bold);
        assert!(style.font.style.italic);

        let style = resolve_style(&Tag::Bold, ["font-weight-normal"]).unwrap();
        assert!(style.font.style.is_regular());

        let style = resolve_style(&Tag::Bold, ["text-monospace"]).unwrap();
        assert_eq!(style.font.family, FontFamily::Courier);
        assert!(!style.font.style.bold);
    }

    #[test]
    fn test_palette_tokens() {
        let style = resolve_style(&Tag::Paragraph, ["text-danger", "bg-light"]).unwrap();
        assert_eq!(style.text_color, PaletteColor::Danger.color());
        assert_eq!(style.fill_color, PaletteColor::Light.color());
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let style = resolve_style(&Tag::Paragraph, ["fancy", "text-fancy", "bg-"]).unwrap();
        assert_eq!(style, Tag::Paragraph.base_style().unwrap());
    }

    #[test]
    fn test_unstyled_tag_without_tokens_is_none() {
        assert_eq!(resolve_style(&Tag::Other("div".into()), ["fancy"]), None);
        assert_eq!(resolve_style(&Tag::Body, []), None);
    }

    #[test]
    fn test_unstyled_tag_with_token_gets_default_base() {
        let style = resolve_style(&Tag::Other("div".into()), ["text-center"]).unwrap();
        assert_eq!(style.alignment, Alignment::Center);
        assert_eq!(style.margins, Margins::default());
    }

    #[test]
    fn test_inline_css_colors() {
        let style = Style::default().apply_css("color: #ff0000; background-color: rgb(0, 0, 255)");
        assert_eq!(style.text_color, Color::rgb(255, 0, 0));
        assert_eq!(style.fill_color, Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_inline_css_ignores_other_properties() {
        let style = Style::default().apply_css("font-weight: bold; COLOR: blue; color: nonsense;");
        assert_eq!(style.text_color, Color::rgb(0, 0, 255));
        assert!(style.font.style.is_regular());
    }

    #[test]
    fn test_inline_css_creates_style_only_when_applied() {
        assert_eq!(apply_inline_css(None, "font-size: 12px"), None);
        let style = apply_inline_css(None, "color: red").unwrap();
        assert_eq!(style.text_color, Color::rgb(255, 0, 0));
        assert_eq!(style.font, Font::default());
    }

    #[test]
    fn test_normalize_class_name() {
        assert_eq!(
            normalize_class_name("  a b\ta  c "),
            Some("a b c".to_string())
        );
        assert_eq!(normalize_class_name("   "), None);
    }
}
