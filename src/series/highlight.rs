use crate::core::{LabelDatum, NodeDataContext, SeriesNodeDatum};
use crate::error::SeriesResult;
use crate::interaction::ChartHighlightState;
use crate::render::Scene;

use super::CartesianSeries;
use super::hooks::{SeriesHooks, SeriesIdx};

impl<D, H: SeriesHooks<D>> CartesianSeries<D, H> {
    /// Rebinds the highlight node/label pair to the chart-wide highlighted
    /// datum, or empties it when this series does not own the highlight.
    pub(super) fn update_highlight_selection(
        &mut self,
        scene: &mut Scene,
        chart: &ChartHighlightState<D>,
        series_highlighted: Option<bool>,
    ) -> SeriesResult<()> {
        let item = match (series_highlighted, chart.highlighted()) {
            (Some(true), Some(highlighted)) => Some(highlighted.datum.clone()),
            _ => None,
        };

        let label = match &item {
            Some(item) if self.hooks.labels_enabled() => {
                find_highlight_label(&self.context_node_data, item)
            }
            _ => None,
        };

        let node_data: Vec<SeriesNodeDatum<D>> = item.into_iter().collect();
        let selection = self.highlight_selection.take();
        self.highlight_selection = if self.opts.markers_enabled() {
            self.hooks
                .update_marker_selection(scene, &node_data, selection, SeriesIdx::Highlight)?
        } else {
            self.hooks
                .update_datum_selection(scene, &node_data, selection, SeriesIdx::Highlight)?
        };

        let label_data: Vec<LabelDatum<D>> = label.into_iter().collect();
        let selection = self.highlight_label_selection.take();
        self.highlight_label_selection =
            self.hooks
                .update_label_selection(scene, &label_data, selection, SeriesIdx::Highlight)?;
        Ok(())
    }
}

/// First label, in context then label order, belonging to `item`.
#[must_use]
pub fn find_highlight_label<D>(
    contexts: &[NodeDataContext<D>],
    item: &SeriesNodeDatum<D>,
) -> Option<LabelDatum<D>> {
    contexts
        .iter()
        .flat_map(|context| context.label_data.iter())
        .find(|label| label.matches(item))
        .cloned()
}
