use crate::error::SeriesResult;
use crate::render::{NodeShape, RenderFrame, Renderer};

/// No-op renderer used by tests and headless hosts.
///
/// It still validates frame content so tests can catch degenerate geometry
/// leaking into the paint list.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_marker_count: usize,
    pub last_path_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> SeriesResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_marker_count = frame.count_where(|shape| matches!(shape, NodeShape::Marker(_)));
        self.last_path_count = frame.count_where(|shape| matches!(shape, NodeShape::Path(_)));
        self.last_text_count = frame.count_where(|shape| matches!(shape, NodeShape::Text(_)));
        Ok(())
    }
}
