//! Render IR, layout canvas, and orchestration for `htmlpdf`.

mod render_engine;
mod render_ir;
mod render_layout;

pub use render_engine::{RenderEngine, RenderEngineOptions};
pub use render_ir::{DrawCommand, RectCommand, RenderPage, TextCommand, TextStyle};
pub use render_layout::{measure_text, LayoutCanvas, PageConfig};
