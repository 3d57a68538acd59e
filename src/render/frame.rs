use crate::error::{SeriesError, SeriesResult};
use crate::render::{NodeId, NodeShape};

/// One shape to paint, already translated into scene space.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub opacity: f64,
    pub shape: NodeShape,
}

/// Backend-agnostic paint list for one scene draw pass, in paint order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    pub items: Vec<DrawItem>,
}

impl RenderFrame {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn validate(&self) -> SeriesResult<()> {
        for item in &self.items {
            if !item.opacity.is_finite() {
                return Err(SeriesError::InvalidData(format!(
                    "draw item {} has non-finite opacity",
                    item.node
                )));
            }
            if !item.shape.is_drawable() {
                return Err(SeriesError::InvalidData(format!(
                    "draw item {} has degenerate geometry",
                    item.node
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of `node` in paint order, if painted.
    #[must_use]
    pub fn paint_index(&self, node: NodeId) -> Option<usize> {
        self.items.iter().position(|item| item.node == node)
    }

    #[must_use]
    pub fn count_where(&self, predicate: impl Fn(&NodeShape) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(&item.shape)).count()
    }
}
