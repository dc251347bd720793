//! RGB colors, the utility-class palette, and CSS color values
//!
//! Class tokens such as `text-danger` or `bg-light` select a color from a
//! fixed Bootstrap-like palette. Inline `style` declarations accept hex,
//! `rgb(...)` and a handful of named colors.

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Black (default text color)
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// White (default fill color)
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Build a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a CSS color value.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)` and the named colors in
    /// [`named_color`]. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args);
        }
        named_color(&value)
    }

    /// Channels scaled to `0.0..=1.0`.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Palette names usable in `text-*` and `bg-*` class tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    /// `primary`
    Primary,
    /// `secondary`
    Secondary,
    /// `success`
    Success,
    /// `danger`
    Danger,
    /// `warning`
    Warning,
    /// `info`
    Info,
    /// `light`
    Light,
    /// `dark`
    Dark,
    /// `white`
    White,
    /// `muted` (grayed text)
    Muted,
    /// `body` (default text)
    Body,
}

impl PaletteColor {
    /// Look up a palette entry by its class suffix.
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name {
            "primary" => Self::Primary,
            "secondary" => Self::Secondary,
            "success" => Self::Success,
            "danger" => Self::Danger,
            "warning" => Self::Warning,
            "info" => Self::Info,
            "light" => Self::Light,
            "dark" => Self::Dark,
            "white" => Self::White,
            "muted" => Self::Muted,
            "body" => Self::Body,
            _ => return None,
        };
        Some(color)
    }

    /// RGB value of this palette entry.
    pub fn color(self) -> Color {
        match self {
            Self::Primary => Color::rgb(0x00, 0x7b, 0xff),
            Self::Secondary | Self::Muted => Color::rgb(0x6c, 0x75, 0x7d),
            Self::Success => Color::rgb(0x28, 0xa7, 0x45),
            Self::Danger => Color::rgb(0xdc, 0x35, 0x45),
            Self::Warning => Color::rgb(0xff, 0xc1, 0x07),
            Self::Info => Color::rgb(0x17, 0xa2, 0xb8),
            Self::Light => Color::rgb(0xf8, 0xf9, 0xfa),
            Self::Dark => Color::rgb(0x34, 0x3a, 0x40),
            Self::White => Color::WHITE,
            Self::Body => Color::rgb(0x21, 0x25, 0x29),
        }
    }
}

/// Small named-color table for inline CSS.
pub fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "maroon" => Color::rgb(128, 0, 0),
        "navy" => Color::rgb(0, 0, 128),
        "purple" => Color::rgb(128, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        _ => return None,
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = hex
                .chars()
                .map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
            Some(Color::rgb(
                channels.next()??,
                channels.next()??,
                channels.next()??,
            ))
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let channel = |s: &str| s.parse::<u16>().ok().filter(|v| *v <= 255).map(|v| v as u8);
    Some(Color::rgb(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
    ))
}
