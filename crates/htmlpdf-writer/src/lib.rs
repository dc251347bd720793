//! PDF backend for `htmlpdf-render` pages.
//!
//! Text is set in the base-14 Type1 fonts with WinAnsi encoding, so no font
//! program is embedded. Only the faces a document actually uses are written
//! as resources.

use htmlpdf::{Color, FontFamily, FontStyle, HtmlError};
use htmlpdf_render::{DrawCommand, RectCommand, RenderEngine, RenderPage, TextCommand};
use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

/// Baseline offset below the vertical center of a line box, per point of
/// font size.
const BASELINE_SHIFT: f32 = 0.3;
/// Underline position below the baseline, per point of font size.
const UNDERLINE_OFFSET: f32 = 0.1;
/// Underline thickness, per point of font size.
const UNDERLINE_THICKNESS: f32 = 0.05;
const COMPRESSION_LEVEL: u8 = 6;

/// PDF serialization options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriterOptions<'a> {
    /// Flate-compress page content streams.
    pub compress: bool,
    /// Document title written to the info dictionary.
    pub title: Option<&'a str>,
}

impl Default for WriterOptions<'_> {
    fn default() -> Self {
        Self {
            compress: true,
            title: None,
        }
    }
}

/// One of the twelve base-14 text faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BaseFont {
    /// Family.
    pub family: FontFamily,
    /// Bold face.
    pub bold: bool,
    /// Italic/oblique face.
    pub italic: bool,
}

impl BaseFont {
    /// Face for a family and style flags; underline has no face of its own.
    pub fn new(family: FontFamily, flags: FontStyle) -> Self {
        Self {
            family,
            bold: flags.bold,
            italic: flags.italic,
        }
    }

    /// PostScript name of the face.
    pub fn postscript_name(self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
        }
    }
}

/// Map a character to its WinAnsiEncoding byte.
///
/// WinAnsiEncoding follows Windows-1252: printable ASCII and Latin-1 map to
/// themselves, and `0x80..=0x9F` holds quotes, dashes, the bullet and a
/// few letters.
pub fn winansi_byte(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    let byte = match cp {
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Encode text as WinAnsi bytes; unmappable characters become `?`.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| winansi_byte(ch).unwrap_or(b'?'))
        .collect()
}

/// Faces in order of first use; the index names the resource (`F1`, ...).
#[derive(Debug, Default)]
struct FontTable {
    faces: Vec<BaseFont>,
}

impl FontTable {
    fn collect(pages: &[RenderPage]) -> Self {
        let mut table = Self::default();
        for page in pages {
            for text in page.text_commands() {
                table.index_of(font_of(text));
            }
        }
        table
    }

    fn index_of(&mut self, face: BaseFont) -> usize {
        match self.faces.iter().position(|known| *known == face) {
            Some(index) => index,
            None => {
                self.faces.push(face);
                self.faces.len() - 1
            }
        }
    }

    fn position(&self, face: BaseFont) -> Option<usize> {
        self.faces.iter().position(|known| *known == face)
    }
}

fn resource_name(index: usize) -> String {
    format!("F{}", index + 1)
}

fn font_of(text: &TextCommand) -> BaseFont {
    BaseFont::new(text.style.family, text.style.flags)
}

/// Serialize pages into a PDF document.
pub fn write_pdf(pages: &[RenderPage], options: &WriterOptions<'_>) -> Vec<u8> {
    let fonts = FontTable::collect(pages);

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let font_ids: Vec<Ref> = fonts.faces.iter().map(|_| alloc.bump()).collect();
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    for (face, id) in fonts.faces.iter().zip(&font_ids) {
        pdf.type1_font(*id)
            .base_font(Name(face.postscript_name().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        let mut used: Vec<usize> = page
            .text_commands()
            .filter_map(|text| fonts.position(font_of(text)))
            .collect();
        used.sort_unstable();
        used.dedup();

        {
            let mut writer = pdf.page(*page_id);
            writer
                .media_box(Rect::new(0.0, 0.0, page.width, page.height))
                .parent(page_tree_id)
                .contents(*content_id);
            let mut resources = writer.resources();
            let mut font_dict = resources.fonts();
            for index in &used {
                let name = resource_name(*index);
                font_dict.pair(Name(name.as_bytes()), font_ids[*index]);
            }
        }

        let data = page_content(page, &fonts);
        if options.compress {
            let compressed = compress_to_vec_zlib(&data, COMPRESSION_LEVEL);
            pdf.stream(*content_id, &compressed)
                .filter(Filter::FlateDecode);
        } else {
            pdf.stream(*content_id, &data);
        }
    }

    if let Some(title) = options.title {
        let info_id = alloc.bump();
        pdf.document_info(info_id).title(TextStr(title));
    }

    log::debug!(
        "wrote PDF with {} page(s) and {} font(s)",
        pages.len(),
        fonts.faces.len()
    );
    pdf.finish()
}

/// Render HTML and serialize the pages in one step.
pub fn html_to_pdf(
    engine: &RenderEngine,
    html: &str,
    options: &WriterOptions<'_>,
) -> Result<Vec<u8>, HtmlError> {
    let pages = engine.try_render(html)?;
    Ok(write_pdf(&pages, options))
}

fn page_content(page: &RenderPage, fonts: &FontTable) -> Vec<u8> {
    let mut content = Content::new();
    for cmd in &page.commands {
        match cmd {
            DrawCommand::Rect(rect) => draw_rect(&mut content, page.height, rect),
            DrawCommand::Text(text) => draw_text(&mut content, page.height, text, fonts),
        }
    }
    content.finish()
}

fn set_fill(content: &mut Content, color: Color) {
    let (r, g, b) = color.to_unit();
    content.set_fill_rgb(r, g, b);
}

fn draw_rect(content: &mut Content, page_height: f32, rect: &RectCommand) {
    let bottom = page_height - rect.y - rect.height;
    if let Some(fill) = rect.fill {
        set_fill(content, fill);
        content.rect(rect.x, bottom, rect.width, rect.height);
        content.fill_nonzero();
    }
    if let Some(stroke) = rect.stroke {
        let (r, g, b) = stroke.to_unit();
        content.set_stroke_rgb(r, g, b);
        content.rect(rect.x, bottom, rect.width, rect.height);
        content.stroke();
    }
}

fn draw_text(content: &mut Content, page_height: f32, text: &TextCommand, fonts: &FontTable) {
    let Some(index) = fonts.position(font_of(text)) else {
        return;
    };
    let size = text.style.size;
    let baseline = page_height - (text.y + text.height / 2.0 + BASELINE_SHIFT * size);
    let name = resource_name(index);

    set_fill(content, text.style.color);
    content.begin_text();
    content.set_font(Name(name.as_bytes()), size);
    if text.word_spacing != 0.0 {
        content.set_word_spacing(text.word_spacing);
    }
    content.next_line(text.x, baseline);
    content.show(Str(&encode_winansi(&text.text)));
    if text.word_spacing != 0.0 {
        content.set_word_spacing(0.0);
    }
    content.end_text();

    if text.style.flags.underline {
        content.rect(
            text.x,
            baseline - UNDERLINE_OFFSET * size,
            text.width,
            UNDERLINE_THICKNESS * size,
        );
        content.fill_nonzero();
    }
}
