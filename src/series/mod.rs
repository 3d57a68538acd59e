//! Cartesian series pipeline.
//!
//! `CartesianSeries` owns the scene containers of one series and keeps them in
//! sync with the node data produced by its `SeriesHooks` implementation:
//!
//! - `update` runs once per frame: selections phase, then nodes phase.
//! - the sub-group pool tracks one container bundle per `NodeDataContext`.
//! - the highlight pair renders the chart-wide highlighted datum outside the pool.
//! - pick strategies resolve pointer positions to data between updates.

mod highlight;
pub mod hooks;
pub mod opts;
mod picking;
pub mod sub_group;
mod update;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::{ChartAxis, ItemId, NodeDataContext, PointLabelDatum, SeriesId};
use crate::error::SeriesResult;
use crate::interaction::{ChartHighlightState, HighlightStatus};
use crate::render::z_order::{SERIES_HIGHLIGHT_ZINDEX, SERIES_LAYER_ZINDEX};
use crate::render::{NodeId, NodeKind, NodeOptions, Scene, Selection};

pub use highlight::find_highlight_label;
pub use hooks::{
    LabelSelection, NodeDataInput, NodeSelection, PathNodesUpdate, PathsUpdate, SeriesHooks,
    SeriesIdx,
};
pub use opts::{HighlightStyle, PickGroupInclude, SeriesFeature, SeriesOpts};
pub use sub_group::{SubGroup, SubGroupPool};

/// One Cartesian series bound to a scene.
///
/// The scene is owned by the host and passed into every call, so several
/// series can share one scene graph. Hit-testing only borrows the series and
/// the scene immutably and may run between updates.
pub struct CartesianSeries<D, H: SeriesHooks<D>> {
    id: SeriesId,
    opts: SeriesOpts,
    hooks: H,
    visible: bool,
    root_group: NodeId,
    content_group: NodeId,
    highlight_group: NodeId,
    highlight_node: NodeId,
    highlight_label: NodeId,
    x_axis: Option<ChartAxis>,
    y_axis: Option<ChartAxis>,
    context_node_data: Vec<NodeDataContext<D>>,
    pool: SubGroupPool<D>,
    highlight_selection: NodeSelection<D>,
    highlight_label_selection: LabelSelection<D>,
    series_item_enabled: IndexMap<ItemId, bool>,
    node_data_refresh: bool,
}

impl<D, H: SeriesHooks<D>> CartesianSeries<D, H> {
    /// Creates the series containers below `parent`.
    ///
    /// The root group holds the content group, which parents every sub-group.
    /// The highlight group is attached to `parent` directly so it paints above
    /// all series content.
    pub fn new(
        scene: &mut Scene,
        parent: NodeId,
        id: SeriesId,
        opts: SeriesOpts,
        hooks: H,
    ) -> SeriesResult<Self> {
        let opts = opts.validate()?;

        let root_group = scene.create_group(
            NodeOptions::named(id.as_str()).with_z_index(SERIES_LAYER_ZINDEX),
        );
        let content_group = scene.create_group(
            NodeOptions::named(format!("{id}-content"))
                .as_layer()
                .with_z_index(SERIES_LAYER_ZINDEX),
        );
        let highlight_group = scene.create_group(
            NodeOptions::named(format!("{id}-highlight")).with_z_index(SERIES_HIGHLIGHT_ZINDEX),
        );
        let highlight_node = scene.create_group(NodeOptions::named(format!("{id}-highlight-node")));
        let highlight_label =
            scene.create_group(NodeOptions::named(format!("{id}-highlight-label")));

        scene.append_child(parent, root_group)?;
        scene.append_child(root_group, content_group)?;
        scene.append_child(parent, highlight_group)?;
        scene.append_child(highlight_group, highlight_node)?;
        scene.append_child(highlight_group, highlight_label)?;

        let highlight_kind = if opts.markers_enabled() {
            NodeKind::Marker
        } else {
            H::DATUM_NODE_KIND
        };
        debug!(series = %id, markers = opts.markers_enabled(), "create cartesian series");
        let series_item_enabled: IndexMap<ItemId, bool> =
            hooks.item_ids().into_iter().map(|item| (item, true)).collect();

        Ok(Self {
            pool: SubGroupPool::new(id.clone(), content_group, H::DATUM_NODE_KIND),
            id,
            opts,
            hooks,
            visible: true,
            root_group,
            content_group,
            highlight_group,
            highlight_node,
            highlight_label,
            x_axis: None,
            y_axis: None,
            context_node_data: Vec::new(),
            highlight_selection: Selection::select_all(highlight_node, highlight_kind),
            highlight_label_selection: Selection::select_all(highlight_label, NodeKind::Text),
            series_item_enabled,
            node_data_refresh: true,
        })
    }

    #[must_use]
    pub fn id(&self) -> &SeriesId {
        &self.id
    }

    #[must_use]
    pub fn opts(&self) -> &SeriesOpts {
        &self.opts
    }

    #[must_use]
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable access to the variant. Call `mark_node_data_dirty` after
    /// changing anything `create_node_data` reads.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_axes(&mut self, x_axis: ChartAxis, y_axis: ChartAxis) {
        self.x_axis = Some(x_axis);
        self.y_axis = Some(y_axis);
        self.node_data_refresh = true;
    }

    #[must_use]
    pub fn x_axis(&self) -> Option<&ChartAxis> {
        self.x_axis.as_ref()
    }

    #[must_use]
    pub fn y_axis(&self) -> Option<&ChartAxis> {
        self.y_axis.as_ref()
    }

    pub fn mark_node_data_dirty(&mut self) {
        self.node_data_refresh = true;
    }

    #[must_use]
    pub fn is_node_data_stale(&self) -> bool {
        self.node_data_refresh
    }

    /// Snapshot of the most recent node data. Mutating the returned vector
    /// does not affect the series.
    #[must_use]
    pub fn context_node_data(&self) -> Vec<NodeDataContext<D>> {
        self.context_node_data.clone()
    }

    #[must_use]
    pub fn sub_groups(&self) -> &SubGroupPool<D> {
        &self.pool
    }

    #[must_use]
    pub fn highlight_selection(&self) -> &NodeSelection<D> {
        &self.highlight_selection
    }

    #[must_use]
    pub fn highlight_label_selection(&self) -> &LabelSelection<D> {
        &self.highlight_label_selection
    }

    #[must_use]
    pub fn root_group(&self) -> NodeId {
        self.root_group
    }

    #[must_use]
    pub fn content_group(&self) -> NodeId {
        self.content_group
    }

    #[must_use]
    pub fn highlight_group(&self) -> NodeId {
        self.highlight_group
    }

    #[must_use]
    pub fn series_item_enabled(&self) -> &IndexMap<ItemId, bool> {
        &self.series_item_enabled
    }

    /// Registers the toggleable items of this series, all enabled.
    pub fn set_series_items(&mut self, items: impl IntoIterator<Item = ItemId>) {
        self.series_item_enabled = items.into_iter().map(|item| (item, true)).collect();
        self.node_data_refresh = true;
    }

    /// Re-registers the items reported by the hooks, all enabled. Call after
    /// changing the variant's item set.
    pub fn sync_items_from_hooks(&mut self) {
        let items = self.hooks.item_ids();
        self.set_series_items(items);
    }

    /// Per-item visibility toggle. Series without registered items toggle
    /// their overall visibility instead.
    pub fn toggle_series_item(&mut self, item_id: &ItemId, enabled: bool) {
        if self.series_item_enabled.is_empty() {
            self.visible = enabled;
            return;
        }
        self.series_item_enabled.insert(item_id.clone(), enabled);
        self.node_data_refresh = true;
    }

    #[must_use]
    pub fn any_series_item_enabled(&self) -> bool {
        (self.visible && self.series_item_enabled.is_empty())
            || self.series_item_enabled.values().any(|enabled| *enabled)
    }

    /// Opacity for the whole series (`item_id == None`) or one item, dimmed
    /// while something else is highlighted.
    #[must_use]
    pub fn opacity(&self, chart: &ChartHighlightState<D>, item_id: Option<&ItemId>) -> f64 {
        let style = self.opts.highlight_style;
        if !style.enabled || style.dim_opacity == 1.0 {
            return 1.0;
        }
        match chart.item_status(&self.id, item_id) {
            HighlightStatus::NoHighlight | HighlightStatus::Highlighted => 1.0,
            HighlightStatus::OtherHighlighted => style.dim_opacity,
        }
    }

    /// Label geometry for the label-overlap collaborator.
    #[must_use]
    pub fn label_data(&self) -> Vec<PointLabelDatum> {
        self.hooks.label_data()
    }

    /// Releases every scene node owned by this series.
    pub fn destroy(self, scene: &mut Scene) -> SeriesResult<()> {
        debug!(series = %self.id, "destroy cartesian series");
        scene.release(self.root_group)?;
        scene.release(self.highlight_group)?;
        Ok(())
    }
}
