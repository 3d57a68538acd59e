mod frame;
mod null_renderer;
mod primitives;
mod scene;
mod selection;
pub mod z_order;

pub use frame::{DrawItem, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{MarkerShape, NodeKind, NodeShape, PathShape, RectShape, TextShape};
pub use scene::{NodeId, NodeOptions, Scene, SceneNode, SceneStats};
pub use selection::{Selection, SelectionChanges};
pub use z_order::ZSubOrder;

use crate::error::SeriesResult;

/// Contract implemented by any painting backend.
///
/// Backends receive a flattened, paint-ordered `RenderFrame` so drawing code
/// stays isolated from series reconciliation and hit-testing.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> SeriesResult<()>;
}
