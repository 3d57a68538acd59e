use indexmap::IndexMap;

use crate::core::{
    ChartAxis, ItemId, LabelDatum, NodeDataContext, PointLabelDatum, SeriesId, SeriesNodeDatum,
};
use crate::error::SeriesResult;
use crate::render::{NodeId, NodeKind, Scene, Selection};

pub type NodeSelection<D> = Selection<SeriesNodeDatum<D>>;
pub type LabelSelection<D> = Selection<LabelDatum<D>>;

/// Which node set an update hook is refreshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesIdx {
    /// Sub-group at this position in the pool.
    Pooled(usize),
    /// The dedicated highlight node/label pair.
    Highlight,
}

impl SeriesIdx {
    #[must_use]
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Pooled(index) => Some(index),
            Self::Highlight => None,
        }
    }

    #[must_use]
    pub fn is_highlight(self) -> bool {
        self == Self::Highlight
    }
}

/// Inputs available to the data-transform step.
#[derive(Debug, Clone, Copy)]
pub struct NodeDataInput<'a> {
    pub series_id: &'a SeriesId,
    pub x_axis: Option<&'a ChartAxis>,
    pub y_axis: Option<&'a ChartAxis>,
    pub series_item_enabled: &'a IndexMap<ItemId, bool>,
}

impl NodeDataInput<'_> {
    /// Items absent from the toggle map count as enabled.
    #[must_use]
    pub fn item_enabled(&self, item_id: &ItemId) -> bool {
        self.series_item_enabled
            .get(item_id)
            .copied()
            .unwrap_or(true)
    }
}

/// Arguments of `SeriesHooks::update_paths`.
#[derive(Debug)]
pub struct PathsUpdate<'a, D> {
    pub series_highlighted: Option<bool>,
    pub item_id: &'a ItemId,
    pub context: &'a NodeDataContext<D>,
    pub paths: &'a [NodeId],
    pub series_idx: SeriesIdx,
}

/// Arguments of `SeriesHooks::update_path_nodes`.
#[derive(Debug, Clone, Copy)]
pub struct PathNodesUpdate<'a> {
    pub series_highlighted: Option<bool>,
    pub item_id: &'a ItemId,
    pub paths: &'a [NodeId],
    pub series_idx: SeriesIdx,
}

/// Per-variant strategy driving a `CartesianSeries`.
///
/// `create_node_data` and the two label hooks are required. Every other hook
/// has a safe default, so a minimal implementation renders nothing but stays
/// consistent: paths are hidden and datum/marker selections stay empty.
///
/// Selection hooks receive the current selection by value and return the one
/// to keep; node hooks only write geometry and styling into the scene.
pub trait SeriesHooks<D> {
    /// Node kind created for datum selections.
    const DATUM_NODE_KIND: NodeKind = NodeKind::Marker;

    fn create_node_data(&mut self, input: &NodeDataInput<'_>)
    -> SeriesResult<Vec<NodeDataContext<D>>>;

    fn update_label_selection(
        &mut self,
        scene: &mut Scene,
        label_data: &[LabelDatum<D>],
        selection: LabelSelection<D>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<LabelSelection<D>>;

    fn update_label_nodes(
        &mut self,
        scene: &mut Scene,
        selection: &LabelSelection<D>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<()>;

    fn update_paths(&mut self, scene: &mut Scene, update: PathsUpdate<'_, D>) -> SeriesResult<()> {
        for path in update.paths {
            scene.set_visible(*path, false)?;
        }
        Ok(())
    }

    fn update_path_nodes(
        &mut self,
        _scene: &mut Scene,
        _update: PathNodesUpdate<'_>,
    ) -> SeriesResult<()> {
        Ok(())
    }

    fn update_datum_selection(
        &mut self,
        _scene: &mut Scene,
        _node_data: &[SeriesNodeDatum<D>],
        selection: NodeSelection<D>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<NodeSelection<D>> {
        Ok(selection)
    }

    fn update_datum_nodes(
        &mut self,
        _scene: &mut Scene,
        _selection: &NodeSelection<D>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        Ok(())
    }

    fn update_marker_selection(
        &mut self,
        _scene: &mut Scene,
        _node_data: &[SeriesNodeDatum<D>],
        selection: NodeSelection<D>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<NodeSelection<D>> {
        Ok(selection)
    }

    fn update_marker_nodes(
        &mut self,
        _scene: &mut Scene,
        _selection: &NodeSelection<D>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        Ok(())
    }

    /// Toggleable items this variant renders, registered when the series is
    /// created or resynced. Variants without per-item toggling return none.
    fn item_ids(&self) -> Vec<ItemId> {
        Vec::new()
    }

    /// Forces the selection pass on a frame without stale node data.
    fn is_path_or_selection_dirty(&self) -> bool {
        false
    }

    fn labels_enabled(&self) -> bool {
        true
    }

    /// Label geometry for overlap avoidance.
    fn label_data(&self) -> Vec<PointLabelDatum> {
        Vec::new()
    }
}
