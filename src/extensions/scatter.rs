use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{
    DomainValue, ItemId, LabelDatum, LabelExtent, NodeDataContext, NodePoint, PointLabelDatum,
    SeriesNodeDatum, check_domain_xy, check_range_xy,
};
use crate::error::SeriesResult;
use crate::extensions::{
    MarkerFormatter, MarkerFormatterParams, MarkerStyle, apply_label_shapes, apply_marker_shapes,
    marker_diameter,
};
use crate::render::Scene;
use crate::series::{
    LabelSelection, NodeDataInput, NodeSelection, PickGroupInclude, SeriesFeature, SeriesHooks,
    SeriesIdx, SeriesOpts,
};

/// Key names passed to marker formatters.
pub const SCATTER_X_KEY: &str = "x";
pub const SCATTER_Y_KEY: &str = "y";

/// One scatter point in domain units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterRecord {
    pub x: DomainValue,
    pub y: DomainValue,
    pub label: Option<String>,
}

impl ScatterRecord {
    #[must_use]
    pub fn new(x: impl Into<DomainValue>, y: impl Into<DomainValue>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub item_id: String,
    pub labels_enabled: bool,
    pub marker: MarkerStyle,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            item_id: "scatter".to_owned(),
            labels_enabled: true,
            marker: MarkerStyle::default(),
        }
    }
}

/// Single-context marker series with optional per-point labels.
#[derive(Debug)]
pub struct ScatterSeries {
    config: ScatterConfig,
    item_id: ItemId,
    records: Vec<Rc<ScatterRecord>>,
    label_points: Vec<PointLabelDatum>,
    marker_formatter: Option<MarkerFormatter<ScatterRecord>>,
}

impl ScatterSeries {
    pub fn new(config: ScatterConfig) -> SeriesResult<Self> {
        let marker = config.marker.validate()?;
        Ok(Self {
            item_id: ItemId::new(config.item_id.clone()),
            config: ScatterConfig { marker, ..config },
            records: Vec::new(),
            label_points: Vec::new(),
            marker_formatter: None,
        })
    }

    /// Options the series should be constructed with.
    #[must_use]
    pub fn series_opts() -> SeriesOpts {
        SeriesOpts::default()
            .with_feature(SeriesFeature::Markers)
            .with_pick_group_includes([PickGroupInclude::Markers, PickGroupInclude::DatumNodes])
    }

    /// Replaces the data. Callers mark the owning series dirty afterwards.
    pub fn set_records(&mut self, records: impl IntoIterator<Item = ScatterRecord>) {
        self.records = records.into_iter().map(Rc::new).collect();
    }

    #[must_use]
    pub fn records(&self) -> &[Rc<ScatterRecord>] {
        &self.records
    }

    #[must_use]
    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// Installs a per-record marker callback. Callers mark the owning series
    /// dirty afterwards.
    pub fn set_marker_formatter(&mut self, formatter: Option<MarkerFormatter<ScatterRecord>>) {
        self.marker_formatter = formatter;
    }

    fn diameter(&self, record: &ScatterRecord, highlighted: bool) -> f64 {
        let marker = self.config.marker;
        marker_diameter(
            self.marker_formatter.as_ref(),
            MarkerFormatterParams {
                datum: record,
                x_key: SCATTER_X_KEY,
                y_key: SCATTER_Y_KEY,
                size: if highlighted {
                    marker.highlight_size_px
                } else {
                    marker.size_px
                },
                highlighted,
            },
        )
    }
}

impl SeriesHooks<ScatterRecord> for ScatterSeries {
    fn create_node_data(
        &mut self,
        input: &NodeDataInput<'_>,
    ) -> SeriesResult<Vec<NodeDataContext<ScatterRecord>>> {
        self.label_points.clear();
        let (Some(x_axis), Some(y_axis)) = (input.x_axis, input.y_axis) else {
            return Ok(Vec::new());
        };
        let continuous_x = x_axis.is_continuous();
        let continuous_y = y_axis.is_continuous();
        let marker = self.config.marker;

        let mut node_data = Vec::with_capacity(self.records.len());
        let mut label_data = Vec::new();
        for record in &self.records {
            let Some((x_value, y_value)) =
                check_domain_xy(&record.x, &record.y, continuous_x, continuous_y)
            else {
                continue;
            };
            let (Some(x), Some(y)) = (x_axis.convert(x_value), y_axis.convert(y_value)) else {
                continue;
            };
            let point = NodePoint::new(x, y, 0.5 * self.diameter(record, false));
            node_data.push(
                SeriesNodeDatum::new(Rc::clone(record))
                    .with_item_id(self.item_id.clone())
                    .with_point(point),
            );

            let Some(text) = record.label.as_deref() else {
                continue;
            };
            if !check_range_xy(x, y, x_axis, y_axis) {
                continue;
            }
            let label_y = y - marker.label_offset_px - point.size;
            label_data.push(
                LabelDatum::new(Rc::clone(record), text, x, label_y)
                    .with_item_id(self.item_id.clone()),
            );
            self.label_points.push(PointLabelDatum {
                point,
                label: Some(LabelExtent {
                    text: text.to_owned(),
                    width: marker.label_width(text),
                    height: marker.label_height_px,
                }),
            });
        }
        trace!(points = node_data.len(), labels = label_data.len(), "scatter node data");

        Ok(vec![
            NodeDataContext::new(self.item_id.clone())
                .with_node_data(node_data)
                .with_label_data(label_data),
        ])
    }

    fn update_marker_selection(
        &mut self,
        scene: &mut Scene,
        node_data: &[SeriesNodeDatum<ScatterRecord>],
        selection: NodeSelection<ScatterRecord>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<NodeSelection<ScatterRecord>> {
        selection.update_keyed(scene, node_data.to_vec(), |datum| {
            Rc::as_ptr(&datum.datum) as usize
        })
    }

    fn update_marker_nodes(
        &mut self,
        scene: &mut Scene,
        selection: &NodeSelection<ScatterRecord>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        if series_idx.is_highlight() {
            apply_marker_shapes(scene, selection, |datum, _| self.diameter(&datum.datum, true))
        } else {
            apply_marker_shapes(scene, selection, |_, point| 2.0 * point.size)
        }
    }

    fn update_label_selection(
        &mut self,
        scene: &mut Scene,
        label_data: &[LabelDatum<ScatterRecord>],
        selection: LabelSelection<ScatterRecord>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<LabelSelection<ScatterRecord>> {
        let label_data = if self.config.labels_enabled {
            label_data.to_vec()
        } else {
            Vec::new()
        };
        selection.update(scene, label_data)
    }

    fn update_label_nodes(
        &mut self,
        scene: &mut Scene,
        selection: &LabelSelection<ScatterRecord>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        apply_label_shapes(scene, selection, self.config.labels_enabled)
    }

    fn labels_enabled(&self) -> bool {
        self.config.labels_enabled
    }

    fn label_data(&self) -> Vec<PointLabelDatum> {
        if self.config.labels_enabled {
            self.label_points.clone()
        } else {
            Vec::new()
        }
    }
}
