use htmlpdf::{ChunkTree, HtmlError, HtmlParser, OutputOptions, ParseOptions};

use crate::render_ir::RenderPage;
use crate::render_layout::{LayoutCanvas, PageConfig};

/// Render-engine options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderEngineOptions {
    /// Parser limits.
    pub parse: ParseOptions,
    /// Page geometry.
    pub page: PageConfig,
    /// Tree output tuning.
    pub output: OutputOptions,
}

impl RenderEngineOptions {
    /// Options for a page size with default margins.
    pub fn for_page_size(width: f32, height: f32) -> Self {
        Self {
            page: PageConfig::with_size(width, height),
            ..Self::default()
        }
    }
}

/// HTML to render pages: parse, walk the chunk tree onto a
/// [`LayoutCanvas`], collect its pages.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderEngine {
    opts: RenderEngineOptions,
    parser: HtmlParser,
}

impl RenderEngine {
    /// Create a render engine.
    pub fn new(opts: RenderEngineOptions) -> Self {
        Self {
            parser: HtmlParser::with_options(opts.parse),
            opts,
        }
    }

    /// Active options.
    pub fn options(&self) -> RenderEngineOptions {
        self.opts
    }

    /// Render a document; empty when there is nothing to render.
    pub fn render(&self, html: &str) -> Vec<RenderPage> {
        match self.parser.parse(html) {
            Some(tree) => self.render_tree(&tree),
            None => Vec::new(),
        }
    }

    /// Render markup that may lack a `<body>` element.
    pub fn render_fragment(&self, html: &str) -> Vec<RenderPage> {
        match self.parser.parse_fragment(html) {
            Some(tree) => self.render_tree(&tree),
            None => Vec::new(),
        }
    }

    /// Like [`RenderEngine::render`], reporting why nothing was rendered.
    pub fn try_render(&self, html: &str) -> Result<Vec<RenderPage>, HtmlError> {
        let tree = self.parser.try_parse(html)?;
        Ok(self.render_tree(&tree))
    }

    /// Lay out an already parsed tree.
    pub fn render_tree(&self, tree: &ChunkTree) -> Vec<RenderPage> {
        let mut canvas = LayoutCanvas::new(self.opts.page);
        tree.output_with(&mut canvas, &self.opts.output);
        let pages = canvas.finish();
        log::debug!("rendered {} page(s)", pages.len());
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_render_is_empty() {
        let engine = RenderEngine::default();
        assert!(engine.render("").is_empty());
        assert!(engine.render("<div>no body</div>").is_empty());
        assert_eq!(
            engine.try_render("<body></body>").err(),
            Some(HtmlError::Empty)
        );
    }

    #[test]
    fn test_render_fragment() {
        let engine = RenderEngine::default();
        let pages = engine.render_fragment("<p>Hello <b>world</b></p>");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].plain_text(), "Hello world");
    }

    #[test]
    fn test_page_size_option() {
        let engine = RenderEngine::new(RenderEngineOptions::for_page_size(300.0, 400.0));
        let pages = engine.render("<body><p>x</p></body>");
        assert_eq!((pages[0].width, pages[0].height), (300.0, 400.0));
    }
}
