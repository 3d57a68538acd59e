use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{SeriesError, SeriesResult};
use crate::interaction::ChartHighlightState;
use crate::render::Scene;
use crate::render::z_order::SERIES_LAYER_ZINDEX;

use super::CartesianSeries;
use super::hooks::{NodeDataInput, PathNodesUpdate, PathsUpdate, SeriesHooks, SeriesIdx};

impl<D, H: SeriesHooks<D>> CartesianSeries<D, H> {
    /// Per-frame update: rebuild selections when needed, then restyle nodes.
    pub fn update(&mut self, scene: &mut Scene, chart: &ChartHighlightState<D>) -> SeriesResult<()> {
        let series_highlighted = chart.series_highlighted(&self.id);
        let any_enabled = self.any_series_item_enabled();

        self.update_selections(scene, chart, series_highlighted, any_enabled)?;
        self.update_nodes(scene, chart, series_highlighted, any_enabled)
    }

    fn update_selections(
        &mut self,
        scene: &mut Scene,
        chart: &ChartHighlightState<D>,
        series_highlighted: Option<bool>,
        any_enabled: bool,
    ) -> SeriesResult<()> {
        self.update_highlight_selection(scene, chart, series_highlighted)?;

        if !any_enabled {
            trace!(series = %self.id, "skip selections: no item enabled");
            return Ok(());
        }
        if !self.node_data_refresh && !self.hooks.is_path_or_selection_dirty() {
            return Ok(());
        }

        if self.node_data_refresh {
            self.node_data_refresh = false;
            let input = NodeDataInput {
                series_id: &self.id,
                x_axis: self.x_axis.as_ref(),
                y_axis: self.y_axis.as_ref(),
                series_item_enabled: &self.series_item_enabled,
            };
            self.context_node_data = self.hooks.create_node_data(&input)?;
            debug!(
                series = %self.id,
                contexts = self.context_node_data.len(),
                "rebuilt node data"
            );
            self.pool
                .reconcile(scene, &self.opts, self.context_node_data.len())?;
        }

        let Self {
            hooks,
            pool,
            context_node_data,
            ..
        } = self;
        debug_assert_eq!(pool.len(), context_node_data.len());

        for (index, (sub_group, context)) in pool.iter_mut().zip(context_node_data.iter()).enumerate() {
            let series_idx = SeriesIdx::Pooled(index);
            hooks.update_paths(
                scene,
                PathsUpdate {
                    series_highlighted,
                    item_id: &context.item_id,
                    context,
                    paths: &sub_group.paths,
                    series_idx,
                },
            )?;

            let selection = sub_group.datum_selection.take();
            sub_group.datum_selection =
                hooks.update_datum_selection(scene, &context.node_data, selection, series_idx)?;

            let selection = sub_group.label_selection.take();
            sub_group.label_selection =
                hooks.update_label_selection(scene, &context.label_data, selection, series_idx)?;

            if let Some(marker_selection) = sub_group.marker_selection.as_mut() {
                let selection = marker_selection.take();
                *marker_selection =
                    hooks.update_marker_selection(scene, &context.node_data, selection, series_idx)?;
            }
        }
        Ok(())
    }

    fn update_nodes(
        &mut self,
        scene: &mut Scene,
        chart: &ChartHighlightState<D>,
        series_highlighted: Option<bool>,
        any_enabled: bool,
    ) -> SeriesResult<()> {
        let markers_enabled = self.opts.markers_enabled();
        let visible = self.visible && !self.context_node_data.is_empty() && any_enabled;

        scene.set_visible(self.root_group, visible)?;
        scene.set_visible(self.content_group, visible)?;
        scene.set_visible(self.highlight_group, visible && series_highlighted == Some(true))?;
        scene.set_opacity(self.content_group, self.opacity(chart, None))?;

        let opacities: SmallVec<[f64; 4]> = self
            .context_node_data
            .iter()
            .map(|context| self.opacity(chart, Some(&context.item_id)))
            .collect();

        let Self {
            hooks,
            pool,
            context_node_data,
            series_item_enabled,
            highlight_selection,
            highlight_label_selection,
            ..
        } = self;

        if markers_enabled {
            hooks.update_marker_nodes(scene, highlight_selection, SeriesIdx::Highlight)?;
        } else {
            hooks.update_datum_nodes(scene, highlight_selection, SeriesIdx::Highlight)?;
        }
        hooks.update_label_nodes(scene, highlight_label_selection, SeriesIdx::Highlight)?;

        for (index, (sub_group, context)) in pool.iter().zip(context_node_data.iter()).enumerate() {
            let series_idx = SeriesIdx::Pooled(index);
            let item_id = &context.item_id;
            let opacity = opacities.get(index).copied().unwrap_or(1.0);
            let sub_group_visible =
                visible && series_item_enabled.get(item_id).copied().unwrap_or(true);

            scene.set_opacity(sub_group.group, opacity)?;
            scene.set_visible(sub_group.group, sub_group_visible)?;

            if let Some(marker_group) = sub_group.marker_group {
                let group_z = scene
                    .node(sub_group.group)
                    .ok_or(SeriesError::UnknownNode(sub_group.group))?
                    .z_index();
                let marker_z = if group_z >= SERIES_LAYER_ZINDEX {
                    group_z
                } else {
                    group_z + 1
                };
                scene.set_opacity(marker_group, opacity)?;
                scene.set_z_index(marker_group, marker_z)?;
                scene.set_visible(marker_group, sub_group_visible)?;
            }

            for path in &sub_group.paths {
                scene.set_opacity(*path, opacity)?;
                scene.set_visible(*path, sub_group_visible)?;
            }

            if !sub_group_visible {
                continue;
            }

            hooks.update_path_nodes(
                scene,
                PathNodesUpdate {
                    series_highlighted,
                    item_id,
                    paths: &sub_group.paths,
                    series_idx,
                },
            )?;
            hooks.update_datum_nodes(scene, &sub_group.datum_selection, series_idx)?;
            hooks.update_label_nodes(scene, &sub_group.label_selection, series_idx)?;
            if markers_enabled {
                if let Some(marker_selection) = &sub_group.marker_selection {
                    hooks.update_marker_nodes(scene, marker_selection, series_idx)?;
                }
            }
        }
        Ok(())
    }
}
