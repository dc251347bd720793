use htmlpdf::{Color, FontFamily, FontStyle, Style};

/// Page represented as backend-agnostic draw commands.
///
/// Coordinates are points from the top-left corner of the page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// Draw commands in paint order.
    pub commands: Vec<DrawCommand>,
}

impl RenderPage {
    /// Create an empty page.
    pub fn new(page_number: usize, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Append a command.
    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    /// Text commands in paint order.
    pub fn text_commands(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text(text) => Some(text),
            DrawCommand::Rect(_) => None,
        })
    }

    /// Text runs joined per visual line, lines separated by `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        let mut last_y: Option<f32> = None;
        for text in self.text_commands() {
            match last_y {
                Some(y) if (y - text.y).abs() < f32::EPSILON => {}
                Some(_) => out.push('\n'),
                None => {}
            }
            out.push_str(&text.text);
            last_y = Some(text.y);
        }
        out
    }

    /// True when nothing was drawn.
    pub fn is_blank(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Layout output commands.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Draw text.
    Text(TextCommand),
    /// Draw rectangle.
    Rect(RectCommand),
}

/// Font and color of a text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font family.
    pub family: FontFamily,
    /// Size in points.
    pub size: f32,
    /// Bold, italic and underline flags.
    pub flags: FontStyle,
    /// Text color.
    pub color: Color,
}

impl TextStyle {
    /// Text style of a resolved chunk style.
    pub fn from_style(style: &Style) -> Self {
        Self {
            family: style.font.family,
            size: style.font.size,
            flags: style.font.style,
            color: style.text_color,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::from_style(&Style::default())
    }
}

/// Text draw command.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCommand {
    /// Left x of the first glyph.
    pub x: f32,
    /// Top of the line box.
    pub y: f32,
    /// Line box height.
    pub height: f32,
    /// Content.
    pub text: String,
    /// Resolved style.
    pub style: TextStyle,
    /// Extra space added to each space character (justified lines).
    pub word_spacing: f32,
    /// Measured width, word spacing included.
    pub width: f32,
}

/// Rectangle draw command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectCommand {
    /// Left x.
    pub x: f32,
    /// Top y.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Fill color, if filled.
    pub fill: Option<Color>,
    /// Stroke color, if outlined.
    pub stroke: Option<Color>,
}
