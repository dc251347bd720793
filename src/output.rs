//! Chunk tree traversal onto a [`Canvas`]

use std::borrow::Cow;

use crate::canvas::Canvas;
use crate::chunk::{ChunkId, ChunkKind, ChunkTree};
use crate::style::Alignment;

/// Output tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputOptions {
    /// Line height as a multiple of the current font size.
    pub line_height_factor: f32,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            line_height_factor: 1.25,
        }
    }
}

/// Bullet text of one list item and the widest bullet of its list.
struct Bullet<'a> {
    text: String,
    widest: Cow<'a, str>,
}

impl OutputOptions {
    fn line_height<C: Canvas + ?Sized>(&self, canvas: &C) -> f32 {
        canvas.font_size() * self.line_height_factor
    }
}

impl ChunkTree {
    /// Draw the whole tree with default options.
    pub fn output<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        self.output_with(canvas, &OutputOptions::default());
    }

    /// Draw the whole tree.
    pub fn output_with<C: Canvas + ?Sized>(&self, canvas: &mut C, options: &OutputOptions) {
        self.output_chunk(self.root(), canvas, options);
    }

    /// Draw one chunk and its subtree.
    pub fn output_chunk<C: Canvas + ?Sized>(&self, id: ChunkId, canvas: &mut C, options: &OutputOptions) {
        let Some(chunk) = self.get(id) else {
            return;
        };
        log::trace!("output {} <{}>", chunk.kind().label(), chunk.tag().name());
        match chunk.kind() {
            ChunkKind::Text(text) => self.output_text(id, text, canvas, options),
            ChunkKind::PageBreak => canvas.add_page(),
            // the parent emits the newline
            ChunkKind::LineBreak => {}
            ChunkKind::Parent
            | ChunkKind::ListItem
            | ChunkKind::OrderedList(_)
            | ChunkKind::UnorderedList => self.output_parent(id, canvas, options, None),
        }
    }

    /// Draw the children of `id`, breaking the line after each child that
    /// asks for it.
    pub fn output_children<C: Canvas + ?Sized>(&self, id: ChunkId, canvas: &mut C, options: &OutputOptions) {
        // bullet column of a list, computed once for all of its items
        let widest = self.list_widest_bullet(id);
        let mut number = 0u32;
        for child in self.children(id) {
            let bullet = match &widest {
                Some(widest) if self.is_list_item(*child) => {
                    number = number.saturating_add(1);
                    self.list_bullet(id, number)
                        .map(|text| Bullet {
                            text,
                            widest: Cow::Borrowed(widest.as_str()),
                        })
                }
                _ => None,
            };
            match bullet {
                Some(bullet) => self.output_parent(*child, canvas, options, Some(bullet)),
                None => self.output_chunk(*child, canvas, options),
            }
            if self.is_new_line(*child) {
                canvas.line_break(None);
            }
        }
    }

    fn output_parent<C: Canvas + ?Sized>(
        &self,
        id: ChunkId,
        canvas: &mut C,
        options: &OutputOptions,
        bullet: Option<Bullet<'_>>,
    ) {
        let chunk = &self[id];
        let left = canvas.left_margin();
        let right = canvas.right_margin();
        let margins = chunk.style().map(|style| style.margins).unwrap_or_default();

        let mut left_changed = false;
        let mut right_changed = false;
        if margins.left != 0.0 {
            canvas.set_left_margin(left + margins.left);
            left_changed = true;
        }
        if margins.right != 0.0 {
            canvas.set_right_margin(right + margins.right);
            right_changed = true;
        }
        if margins.top != 0.0 {
            canvas.set_y(canvas.y() + margins.top);
        }

        if *chunk.kind() == ChunkKind::ListItem {
            if let Some(bullet) = bullet.or_else(|| self.lone_item_bullet(id)) {
                let width = self.output_bullet(id, &bullet, canvas, options);
                canvas.set_left_margin(canvas.left_margin() + width);
                left_changed = true;
            }
        }

        if let Some(style) = chunk.style() {
            canvas.apply_style(style);
        }
        self.output_children(id, canvas, options);

        if margins.bottom != 0.0 {
            canvas.set_y(canvas.y() + margins.bottom);
        }
        if left_changed {
            canvas.set_left_margin(left);
        }
        if right_changed {
            canvas.set_right_margin(right);
        }

        let restore = self
            .parent(id)
            .and_then(|parent| self.nearest_style(parent))
            .cloned()
            .unwrap_or_default();
        canvas.apply_style(&restore);
    }

    /// Draw the bullet column of a list item; returns its width.
    ///
    /// The bullet takes the font of the nearest styled ancestor above the
    /// item, so a styled list styles its bullets.
    fn output_bullet<C: Canvas + ?Sized>(
        &self,
        id: ChunkId,
        bullet: &Bullet<'_>,
        canvas: &mut C,
        options: &OutputOptions,
    ) -> f32 {
        let style = self
            .parent(id)
            .and_then(|parent| self.nearest_style(parent))
            .cloned()
            .unwrap_or_default();
        canvas.apply_style(&style);
        let width = canvas.string_width(&bullet.widest) + canvas.string_width(" ");
        let height = options.line_height(canvas);
        canvas.cell(width, height, &bullet.text, false, Alignment::Right);
        width
    }

    /// Bullet of an item that is not a direct child of its list.
    fn lone_item_bullet(&self, id: ChunkId) -> Option<Bullet<'static>> {
        let text = self.bullet_text(id)?;
        let widest = self.widest_bullet(id)?;
        Some(Bullet {
            text,
            widest: Cow::Owned(widest),
        })
    }

    fn output_text<C: Canvas + ?Sized>(&self, id: ChunkId, text: &str, canvas: &mut C, options: &OutputOptions) {
        let height = options.line_height(canvas);
        if let Some(align) = self.block_alignment(id) {
            canvas.multi_cell(0.0, height, text, align);
            canvas.set_y(canvas.y() - height);
        } else {
            canvas.write(height, text);
        }
    }

    /// Alignment for a text chunk that is the only child of a heading,
    /// paragraph or list item, when that alignment is not left.
    fn block_alignment(&self, id: ChunkId) -> Option<Alignment> {
        let parent = self.parent(id)?;
        if self.children(parent).len() != 1 || !self[parent].tag().is_text_block() {
            return None;
        }
        let align = self.nearest_style(id)?.alignment;
        (align != Alignment::Left).then_some(align)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::style::Style;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        LeftMargin(f32),
        RightMargin(f32),
        SetY(f32),
        Style(f32),
        Write(String),
        MultiCell(String, Alignment),
        Cell(String, f32, Alignment),
        LineBreak,
        AddPage,
    }

    /// Canvas that records calls; every glyph is 1pt wide.
    struct Recorder {
        ops: Vec<Op>,
        left: f32,
        right: f32,
        y: f32,
        size: f32,
        style: Style,
        cell_styles: Vec<(String, Style)>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                ops: Vec::new(),
                left: 10.0,
                right: 10.0,
                y: 0.0,
                size: 9.0,
                style: Style::default(),
                cell_styles: Vec::new(),
            }
        }

        fn writes(&self) -> Vec<String> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Write(text) | Op::MultiCell(text, _) | Op::Cell(text, _, _) => {
                        Some(text.clone())
                    }
                    _ => None,
                })
                .collect()
        }

        fn count(&self, wanted: &Op) -> usize {
            self.ops.iter().filter(|op| *op == wanted).count()
        }
    }

    impl Canvas for Recorder {
        fn left_margin(&self) -> f32 {
            self.left
        }
        fn set_left_margin(&mut self, margin: f32) {
            self.left = margin;
            self.ops.push(Op::LeftMargin(margin));
        }
        fn right_margin(&self) -> f32 {
            self.right
        }
        fn set_right_margin(&mut self, margin: f32) {
            self.right = margin;
            self.ops.push(Op::RightMargin(margin));
        }
        fn y(&self) -> f32 {
            self.y
        }
        fn set_y(&mut self, y: f32) {
            self.y = y;
            self.ops.push(Op::SetY(y));
        }
        fn font_size(&self) -> f32 {
            self.size
        }
        fn string_width(&self, text: &str) -> f32 {
            text.chars().count() as f32
        }
        fn apply_style(&mut self, style: &Style) {
            self.size = style.font.size;
            self.style = style.clone();
            self.ops.push(Op::Style(style.font.size));
        }
        fn write(&mut self, _height: f32, text: &str) {
            self.ops.push(Op::Write(text.to_string()));
        }
        fn multi_cell(&mut self, _width: f32, height: f32, text: &str, align: Alignment) {
            self.y += height;
            self.ops.push(Op::MultiCell(text.to_string(), align));
        }
        fn cell(&mut self, width: f32, _height: f32, text: &str, _border: bool, align: Alignment) {
            self.cell_styles.push((text.to_string(), self.style.clone()));
            self.ops.push(Op::Cell(text.to_string(), width, align));
        }
        fn line_break(&mut self, _height: Option<f32>) {
            self.y += self.size * 1.25;
            self.ops.push(Op::LineBreak);
        }
        fn add_page(&mut self) {
            self.y = 0.0;
            self.ops.push(Op::AddPage);
        }
    }

    fn render(html: &str) -> Recorder {
        let tree = parse(html).unwrap();
        let mut canvas = Recorder::new();
        tree.output(&mut canvas);
        canvas
    }

    #[test]
    fn test_paragraph_writes_and_breaks() {
        let canvas = render("<body><p>Hello</p></body>");
        assert_eq!(canvas.writes(), vec!["Hello"]);
        assert_eq!(canvas.count(&Op::LineBreak), 1);
        // bottom margin 2 lands before the body breaks the line
        let margin = canvas.ops.iter().position(|op| *op == Op::SetY(2.0));
        let newline = canvas.ops.iter().position(|op| *op == Op::LineBreak);
        assert!(margin.unwrap() < newline.unwrap());
    }

    #[test]
    fn test_centered_single_text_uses_multi_cell() {
        let canvas = render("<body><p class=\"text-center\">Title</p></body>");
        assert!(canvas
            .ops
            .contains(&Op::MultiCell("Title".into(), Alignment::Center)));
        assert_eq!(canvas.count(&Op::Write("Title".into())), 0);
    }

    #[test]
    fn test_centered_mixed_content_flows() {
        let canvas = render("<body><p class=\"text-center\">a <b>b</b></p></body>");
        assert!(canvas.ops.contains(&Op::Write("a ".into())));
        assert!(canvas.ops.contains(&Op::Write("b".into())));
    }

    #[test]
    fn test_ordered_list_bullets() {
        let canvas = render("<body><ol type=\"a\"><li>x</li><li>y</li></ol></body>");
        let cells: Vec<&Op> = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Cell(..)))
            .collect();
        // widest bullet "b." plus a space
        assert_eq!(cells[0], &Op::Cell("a.".into(), 3.0, Alignment::Right));
        assert_eq!(cells[1], &Op::Cell("b.".into(), 3.0, Alignment::Right));
        assert_eq!(canvas.writes(), vec!["a.", "x", "b.", "y"]);
    }

    #[test]
    fn test_bullets_take_the_list_style() {
        let canvas = render(
            "<body><ol class=\"font-weight-bold text-danger\"><li>x</li><li class=\"font-italic\">y</li></ol></body>",
        );
        assert_eq!(canvas.cell_styles.len(), 2);
        for (text, style) in &canvas.cell_styles {
            assert!(style.font.style.bold, "bullet {}", text);
            assert!(!style.font.style.italic, "bullet {}", text);
            assert_eq!(style.text_color, crate::PaletteColor::Danger.color());
        }
        assert_eq!(canvas.cell_styles[0].0, "1.");
    }

    #[test]
    fn test_bullet_numbers_skip_non_items() {
        let canvas = render(
            "<body><ol><li>a</li><span>note</span><li>b</li><li>c</li></ol></body>",
        );
        let bullets: Vec<&str> = canvas.cell_styles.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(bullets, vec!["1.", "2.", "3."]);
        // widest bullet "3." plus a space
        assert!(canvas.ops.contains(&Op::Cell("1.".into(), 3.0, Alignment::Right)));
    }

    #[test]
    fn test_list_item_shifts_and_restores_margin() {
        let canvas = render("<body><ul><li>x</li></ul></body>");
        assert!(canvas.ops.contains(&Op::LeftMargin(12.0)));
        assert_eq!(canvas.left, 10.0);
    }

    #[test]
    fn test_margin_classes_restore() {
        let canvas = render("<body><div class=\"mx-3 mt-2\"><span>x</span></div></body>");
        assert!(canvas.ops.contains(&Op::LeftMargin(14.0)));
        assert!(canvas.ops.contains(&Op::RightMargin(14.0)));
        assert!(canvas.ops.contains(&Op::SetY(2.0)));
        assert_eq!(canvas.left, 10.0);
        assert_eq!(canvas.right, 10.0);
    }

    #[test]
    fn test_page_break_adds_page() {
        let canvas = render("<body><p>a</p><div class=\"page-break\"></div><p>b</p></body>");
        assert_eq!(canvas.count(&Op::AddPage), 1);
    }

    #[test]
    fn test_line_break_emits_newline_only() {
        let canvas = render("<body><span>a<br>b</span></body>");
        assert_eq!(canvas.writes(), vec!["a", "b"]);
        assert_eq!(canvas.count(&Op::LineBreak), 1);
    }

    #[test]
    fn test_style_restored_after_heading() {
        let canvas = render("<body><h1>T</h1><span>x</span></body>");
        let sizes: Vec<f32> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Style(size) => Some(*size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes[0], 22.5);
        assert_eq!(sizes[1], 9.0);
    }
}
