use htmlpdf::{Alignment, Canvas, Color, Font, FontFamily, Style};

use crate::render_ir::{DrawCommand, RectCommand, RenderPage, TextCommand, TextStyle};

/// 10 mm in points.
const DEFAULT_MARGIN: f32 = 28.35;

/// Page geometry for the layout canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageConfig {
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// Initial left margin.
    pub margin_left: f32,
    /// Top margin; new pages start here.
    pub margin_top: f32,
    /// Initial right margin.
    pub margin_right: f32,
    /// Bottom margin; the automatic page break triggers past it.
    pub margin_bottom: f32,
    /// Horizontal padding inside cells.
    pub cell_margin: f32,
    /// Start a new page before a line that would cross the bottom margin.
    pub auto_page_break: bool,
}

impl PageConfig {
    /// A4 portrait.
    pub fn a4() -> Self {
        Self::with_size(595.28, 841.89)
    }

    /// US Letter portrait.
    pub fn letter() -> Self {
        Self::with_size(612.0, 792.0)
    }

    /// Custom page size with default margins.
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            margin_left: DEFAULT_MARGIN,
            margin_top: DEFAULT_MARGIN,
            margin_right: DEFAULT_MARGIN,
            margin_bottom: DEFAULT_MARGIN,
            cell_margin: DEFAULT_MARGIN / 10.0,
            auto_page_break: true,
        }
    }

    fn page_break_trigger(self) -> f32 {
        self.height - self.margin_bottom
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::a4()
    }
}

/// Approximate advance width of `text` in `font`.
pub fn measure_text(text: &str, font: &Font) -> f32 {
    let chars = text.chars().count() as f32;
    if chars == 0.0 {
        return 0.0;
    }
    chars * font.size * width_factor(font)
}

fn width_factor(font: &Font) -> f32 {
    match font.family {
        FontFamily::Courier => 0.6,
        FontFamily::Helvetica if font.style.bold => 0.56,
        FontFamily::Helvetica => 0.52,
        FontFamily::Times if font.style.bold => 0.5,
        FontFamily::Times => 0.46,
    }
}

/// [`Canvas`] that lays text out into pages of draw commands.
#[derive(Clone, Debug)]
pub struct LayoutCanvas {
    cfg: PageConfig,
    pages: Vec<RenderPage>,
    page: RenderPage,
    x: f32,
    y: f32,
    left: f32,
    right: f32,
    style: Style,
    last_height: f32,
}

impl Default for LayoutCanvas {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}

impl LayoutCanvas {
    /// Canvas positioned at the top-left margin of page 1.
    pub fn new(cfg: PageConfig) -> Self {
        Self {
            cfg,
            pages: Vec::new(),
            page: RenderPage::new(1, cfg.width, cfg.height),
            x: cfg.margin_left,
            y: cfg.margin_top,
            left: cfg.margin_left,
            right: cfg.margin_right,
            style: Style::default(),
            last_height: 0.0,
        }
    }

    /// Page geometry.
    pub fn config(&self) -> PageConfig {
        self.cfg
    }

    /// Horizontal cursor position.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Move the horizontal cursor.
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    /// Number of the page being drawn.
    pub fn page_number(&self) -> usize {
        self.page.page_number
    }

    /// Active style.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Close the current page and return every page.
    pub fn finish(mut self) -> Vec<RenderPage> {
        self.pages.push(self.page);
        self.pages
    }

    fn max_x(&self) -> f32 {
        self.cfg.width - self.right
    }

    fn measure(&self, text: &str) -> f32 {
        measure_text(text, &self.style.font)
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cfg.auto_page_break
            && self.y + height > self.cfg.page_break_trigger()
            && self.y > self.cfg.margin_top
        {
            let x = self.x;
            self.add_page();
            self.x = x;
        }
    }

    fn fill_background(&mut self, x: f32, width: f32, height: f32) {
        let fill = self.style.fill_color;
        if fill == Color::WHITE || width <= 0.0 {
            return;
        }
        self.page.push(DrawCommand::Rect(RectCommand {
            x,
            y: self.y,
            width,
            height,
            fill: Some(fill),
            stroke: None,
        }));
    }

    fn push_text(&mut self, x: f32, text: &str, width: f32, height: f32, word_spacing: f32) {
        if text.is_empty() {
            return;
        }
        self.page.push(DrawCommand::Text(TextCommand {
            x,
            y: self.y,
            height,
            text: text.to_string(),
            style: TextStyle::from_style(&self.style),
            word_spacing,
            width,
        }));
    }

    /// One flowing run on the current line.
    fn place_run(&mut self, x: f32, text: &str, width: f32, height: f32) {
        if text.is_empty() {
            return;
        }
        self.ensure_room(height);
        self.fill_background(x, width, height);
        self.push_text(x, text, width, height, 0.0);
    }

    fn new_line(&mut self, height: f32) {
        self.x = self.left;
        self.y += height;
    }

    /// Longest prefix of `word` fitting `available` (at least one char).
    fn split_to_fit(&self, word: &str, available: f32) -> (String, String) {
        let mut head = String::new();
        for (offset, ch) in word.char_indices() {
            head.push(ch);
            if self.measure(&head) > available && head.chars().count() > 1 {
                head.pop();
                return (head, word[offset..].to_string());
            }
        }
        (head, String::new())
    }

    /// Greedy word wrap into lines no wider than `max_width`.
    fn wrap_lines(&self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if self.measure(&candidate) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(core::mem::take(&mut line));
            }
            let mut rest = word.to_string();
            while self.measure(&rest) > max_width && rest.chars().count() > 1 {
                let (head, tail) = self.split_to_fit(&rest, max_width);
                lines.push(head);
                rest = tail;
            }
            line = rest;
        }
        if !line.is_empty() || lines.is_empty() {
            lines.push(line);
        }
        lines
    }
}

impl Canvas for LayoutCanvas {
    fn left_margin(&self) -> f32 {
        self.left
    }

    fn set_left_margin(&mut self, margin: f32) {
        // a cursor at the start of a line follows the margin
        if self.x <= self.left || self.x < margin {
            self.x = margin;
        }
        self.left = margin;
    }

    fn right_margin(&self) -> f32 {
        self.right
    }

    fn set_right_margin(&mut self, margin: f32) {
        self.right = margin;
    }

    fn y(&self) -> f32 {
        self.y
    }

    fn set_y(&mut self, y: f32) {
        self.x = self.left;
        self.y = y;
    }

    fn font_size(&self) -> f32 {
        self.style.font.size
    }

    fn string_width(&self, text: &str) -> f32 {
        self.measure(text)
    }

    fn apply_style(&mut self, style: &Style) {
        self.style = style.clone();
    }

    fn write(&mut self, height: f32, text: &str) {
        self.last_height = height;
        let mut line = String::new();
        let mut line_x = self.x;
        let mut line_w = 0.0;

        for (i, word) in text.split(' ').enumerate() {
            let mut piece = if i == 0 {
                word.to_string()
            } else {
                format!(" {}", word)
            };
            let mut piece_w = self.measure(&piece);

            if line_x + line_w + piece_w > self.max_x() {
                if !(line.is_empty() && line_x <= self.left) {
                    self.place_run(line_x, &line, line_w, height);
                    self.new_line(height);
                    line.clear();
                    line_w = 0.0;
                    line_x = self.x;
                    piece = piece.trim_start().to_string();
                    piece_w = self.measure(&piece);
                }
                while line_x + piece_w > self.max_x() && piece.chars().count() > 1 {
                    let (head, tail) = self.split_to_fit(&piece, self.max_x() - line_x);
                    let head_w = self.measure(&head);
                    self.place_run(line_x, &head, head_w, height);
                    self.new_line(height);
                    line_x = self.x;
                    piece = tail;
                    piece_w = self.measure(&piece);
                }
            }
            line.push_str(&piece);
            line_w += piece_w;
        }

        self.place_run(line_x, &line, line_w, height);
        self.x = line_x + line_w;
    }

    fn multi_cell(&mut self, width: f32, height: f32, text: &str, align: Alignment) {
        self.last_height = height;
        let start_x = self.x;
        let width = if width <= 0.0 {
            self.max_x() - start_x
        } else {
            width
        };
        let margin = self.cfg.cell_margin;
        let inner = (width - 2.0 * margin).max(0.0);
        let lines = self.wrap_lines(text, inner);
        let count = lines.len();

        for (i, line) in lines.iter().enumerate() {
            self.ensure_room(height);
            let line_w = self.measure(line);
            let spaces = line.matches(' ').count();
            let is_last = i + 1 == count;
            let (offset, spacing) = match align {
                Alignment::Left => (margin, 0.0),
                Alignment::Right => (width - margin - line_w, 0.0),
                Alignment::Center => ((width - line_w) / 2.0, 0.0),
                Alignment::Justify if !is_last && spaces > 0 => {
                    (margin, (inner - line_w).max(0.0) / spaces as f32)
                }
                Alignment::Justify => (margin, 0.0),
            };
            self.fill_background(start_x, width, height);
            let drawn_w = line_w + spacing * spaces as f32;
            self.push_text(start_x + offset, line, drawn_w, height, spacing);
            self.y += height;
        }
        self.x = self.left;
    }

    fn cell(&mut self, width: f32, height: f32, text: &str, border: bool, align: Alignment) {
        self.last_height = height;
        self.ensure_room(height);
        let width = if width <= 0.0 {
            self.max_x() - self.x
        } else {
            width
        };
        let margin = self.cfg.cell_margin;
        let text_w = self.measure(text);
        let offset = match align {
            Alignment::Right => width - margin - text_w,
            Alignment::Center => (width - text_w) / 2.0,
            Alignment::Left | Alignment::Justify => margin,
        };
        let x = self.x;
        self.fill_background(x, width, height);
        if border {
            self.page.push(DrawCommand::Rect(RectCommand {
                x,
                y: self.y,
                width,
                height,
                fill: None,
                stroke: Some(Color::BLACK),
            }));
        }
        self.push_text(x + offset, text, text_w, height, 0.0);
        self.x += width;
    }

    fn line_break(&mut self, height: Option<f32>) {
        let height = height.unwrap_or(self.last_height);
        self.new_line(height);
    }

    fn add_page(&mut self) {
        let next = RenderPage::new(self.page.page_number + 1, self.cfg.width, self.cfg.height);
        let done = core::mem::replace(&mut self.page, next);
        log::debug!(
            "page {} closed with {} commands",
            done.page_number,
            done.commands.len()
        );
        self.pages.push(done);
        self.x = self.left;
        self.y = self.cfg.margin_top;
    }
}
