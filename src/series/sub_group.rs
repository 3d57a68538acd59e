use smallvec::SmallVec;
use tracing::debug;

use crate::core::SeriesId;
use crate::error::SeriesResult;
use crate::render::z_order::{LABEL_SUB_ORDER_OFFSET, MARKER_SUB_ORDER_OFFSET, SERIES_LAYER_ZINDEX};
use crate::render::{NodeId, NodeKind, NodeOptions, Scene, Selection, ZSubOrder};

use super::hooks::{LabelSelection, NodeSelection};
use super::opts::{PickGroupInclude, SeriesOpts};

/// Scene containers and selections rendering one `NodeDataContext` slot.
#[derive(Debug)]
pub struct SubGroup<D> {
    pub(crate) paths: SmallVec<[NodeId; 2]>,
    pub(crate) group: NodeId,
    pub(crate) pick_group: NodeId,
    pub(crate) label_group: NodeId,
    pub(crate) marker_group: Option<NodeId>,
    pub(crate) datum_selection: NodeSelection<D>,
    pub(crate) label_selection: LabelSelection<D>,
    pub(crate) marker_selection: Option<NodeSelection<D>>,
}

impl<D> SubGroup<D> {
    #[must_use]
    pub fn paths(&self) -> &[NodeId] {
        &self.paths
    }

    #[must_use]
    pub fn group(&self) -> NodeId {
        self.group
    }

    #[must_use]
    pub fn pick_group(&self) -> NodeId {
        self.pick_group
    }

    #[must_use]
    pub fn label_group(&self) -> NodeId {
        self.label_group
    }

    #[must_use]
    pub fn marker_group(&self) -> Option<NodeId> {
        self.marker_group
    }

    #[must_use]
    pub fn datum_selection(&self) -> &NodeSelection<D> {
        &self.datum_selection
    }

    #[must_use]
    pub fn label_selection(&self) -> &LabelSelection<D> {
        &self.label_selection
    }

    #[must_use]
    pub fn marker_selection(&self) -> Option<&NodeSelection<D>> {
        self.marker_selection.as_ref()
    }
}

/// Positional pool of sub-groups under one series content group.
///
/// Sub-groups are only appended or truncated from the tail, so the group at
/// position `i` keeps its scene nodes for as long as the pool holds more
/// than `i` entries.
#[derive(Debug)]
pub struct SubGroupPool<D> {
    series_id: SeriesId,
    content: NodeId,
    datum_kind: NodeKind,
    sub_groups: Vec<SubGroup<D>>,
    next_allocation: i64,
}

impl<D> SubGroupPool<D> {
    #[must_use]
    pub fn new(series_id: SeriesId, content: NodeId, datum_kind: NodeKind) -> Self {
        Self {
            series_id,
            content,
            datum_kind,
            sub_groups: Vec::new(),
            next_allocation: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sub_groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sub_groups.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SubGroup<D>> {
        self.sub_groups.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubGroup<D>> + '_ {
        self.sub_groups.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SubGroup<D>> + '_ {
        self.sub_groups.iter_mut()
    }

    /// Grows or truncates the pool to exactly `target_len` sub-groups.
    pub fn reconcile(
        &mut self,
        scene: &mut Scene,
        opts: &SeriesOpts,
        target_len: usize,
    ) -> SeriesResult<()> {
        let current = self.sub_groups.len();
        if current == target_len {
            return Ok(());
        }

        if target_len < current {
            debug!(series = %self.series_id, from = current, to = target_len, "shrink sub-group pool");
            for sub_group in self.sub_groups.split_off(target_len) {
                self.retire(scene, opts, sub_group)?;
            }
        }

        if target_len > current {
            debug!(series = %self.series_id, from = current, to = target_len, "grow sub-group pool");
        }
        while self.sub_groups.len() < target_len {
            let sub_group = self.allocate(scene, opts)?;
            self.sub_groups.push(sub_group);
        }

        debug_assert_eq!(self.sub_groups.len(), target_len);
        Ok(())
    }

    fn retire(&self, scene: &mut Scene, opts: &SeriesOpts, sub_group: SubGroup<D>) -> SeriesResult<()> {
        scene.remove_child(self.content, sub_group.group)?;
        scene.release(sub_group.group)?;
        if let Some(marker_group) = sub_group.marker_group {
            scene.remove_child(self.content, marker_group)?;
            scene.release(marker_group)?;
        }
        if !opts.includes(PickGroupInclude::MainPath) {
            for path in sub_group.paths {
                scene.remove_child(self.content, path)?;
                scene.release(path)?;
            }
        }
        scene.remove_child(self.content, sub_group.label_group)?;
        scene.release(sub_group.label_group)?;
        Ok(())
    }

    fn allocate(&mut self, scene: &mut Scene, opts: &SeriesOpts) -> SeriesResult<SubGroup<D>> {
        let sub_group_id = self.next_allocation;
        self.next_allocation += 1;
        let series = &self.series_id;
        let sub_order = |order: i64| ZSubOrder::new(series.clone(), order);

        let group = scene.create_group(
            NodeOptions::named(format!("{series}-series-sub{sub_group_id}"))
                .as_layer()
                .with_z_index(SERIES_LAYER_ZINDEX)
                .with_z_sub_order(sub_order(sub_group_id)),
        );
        let marker_group = if opts.markers_enabled() {
            let name_id = self.next_allocation;
            self.next_allocation += 1;
            Some(
                scene.create_group(
                    NodeOptions::named(format!("{series}-series-sub{name_id}-markers"))
                        .as_layer()
                        .with_z_index(SERIES_LAYER_ZINDEX)
                        .with_z_sub_order(sub_order(MARKER_SUB_ORDER_OFFSET + sub_group_id)),
                ),
            )
        } else {
            None
        };
        let label_name_id = self.next_allocation;
        self.next_allocation += 1;
        let label_group = scene.create_group(
            NodeOptions::named(format!("{series}-series-sub{label_name_id}-labels"))
                .as_layer()
                .with_z_index(SERIES_LAYER_ZINDEX)
                .with_z_sub_order(sub_order(LABEL_SUB_ORDER_OFFSET + sub_group_id)),
        );
        let pick_name_id = self.next_allocation;
        self.next_allocation += 1;
        let pick_group = scene.create_group(
            NodeOptions::named(format!("{series}-series-sub{pick_name_id}-pickGroup"))
                .with_z_index(SERIES_LAYER_ZINDEX)
                .with_z_sub_order(sub_order(MARKER_SUB_ORDER_OFFSET + sub_group_id)),
        );

        let path_parent = if opts.includes(PickGroupInclude::MainPath) {
            pick_group
        } else {
            self.content
        };
        let datum_parent = if opts.includes(PickGroupInclude::DatumNodes) {
            pick_group
        } else {
            group
        };

        scene.append_child(self.content, group)?;
        scene.append_child(self.content, label_group)?;
        if let Some(marker_group) = marker_group {
            scene.append_child(self.content, marker_group)?;
        }

        let mut paths = SmallVec::with_capacity(opts.paths_per_series);
        for index in 0..opts.paths_per_series {
            let path = scene.create_node_with(
                NodeKind::Path,
                NodeOptions::default()
                    .with_z_index(SERIES_LAYER_ZINDEX)
                    .with_z_sub_order(sub_order(opts.path_sub_order_offset(index) + sub_group_id)),
            );
            scene.append_child(path_parent, path)?;
            paths.push(path);
        }
        scene.append_child(group, pick_group)?;

        Ok(SubGroup {
            paths,
            group,
            pick_group,
            label_group,
            marker_group,
            datum_selection: Selection::select_all(datum_parent, self.datum_kind),
            label_selection: Selection::select_all(label_group, NodeKind::Text),
            marker_selection: marker_group
                .map(|marker_group| Selection::select_all(marker_group, NodeKind::Marker)),
        })
    }
}
