use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{
    DomainValue, ItemId, LabelDatum, LabelExtent, NodeDataContext, NodePoint, Point,
    PointLabelDatum, SeriesNodeDatum, check_domain_xy, check_range_xy,
};
use crate::error::{SeriesError, SeriesResult};
use crate::extensions::{
    MarkerFormatter, MarkerFormatterParams, MarkerStyle, apply_label_shapes, apply_marker_shapes,
    marker_diameter,
};
use crate::render::{NodeShape, PathShape, Scene};
use crate::series::{
    LabelSelection, NodeDataInput, NodeSelection, PathsUpdate, PickGroupInclude,
    SeriesFeature, SeriesHooks, SeriesIdx, SeriesOpts,
};

static MISSING: DomainValue = DomainValue::Missing;

/// X key name passed to marker formatters.
pub const LINE_X_KEY: &str = "x";

/// One x position with a value per configured y key.
///
/// `ys[k]` belongs to `LineConfig::y_keys[k]`; missing entries are gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub x: DomainValue,
    pub ys: Vec<DomainValue>,
}

impl LineRecord {
    #[must_use]
    pub fn new(x: impl Into<DomainValue>, ys: impl IntoIterator<Item = DomainValue>) -> Self {
        Self {
            x: x.into(),
            ys: ys.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn y(&self, key_index: usize) -> &DomainValue {
        self.ys.get(key_index).unwrap_or(&MISSING)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub y_keys: Vec<String>,
    pub stroke_width: f64,
    pub labels_enabled: bool,
    pub marker: MarkerStyle,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            y_keys: vec!["y".to_owned()],
            stroke_width: 2.0,
            labels_enabled: false,
            marker: MarkerStyle::default(),
        }
    }
}

/// Multi-key line series: one context, one stroked path and one marker set
/// per y key.
#[derive(Debug)]
pub struct LineSeries {
    config: LineConfig,
    y_keys: Vec<ItemId>,
    records: Vec<Rc<LineRecord>>,
    label_points: Vec<PointLabelDatum>,
    marker_formatter: Option<MarkerFormatter<LineRecord>>,
}

impl LineSeries {
    pub fn new(config: LineConfig) -> SeriesResult<Self> {
        if config.y_keys.is_empty() {
            return Err(SeriesError::InvalidOptions(
                "line series needs at least one y key".to_owned(),
            ));
        }
        if !config.stroke_width.is_finite() || config.stroke_width <= 0.0 {
            return Err(SeriesError::InvalidOptions(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        let marker = config.marker.validate()?;
        Ok(Self {
            y_keys: config.y_keys.iter().map(ItemId::new).collect(),
            config: LineConfig { marker, ..config },
            records: Vec::new(),
            label_points: Vec::new(),
            marker_formatter: None,
        })
    }

    /// Options the series should be constructed with: the stroke sits in the
    /// pick group, markers take part in exact picking.
    #[must_use]
    pub fn series_opts() -> SeriesOpts {
        SeriesOpts::default()
            .with_feature(SeriesFeature::Markers)
            .with_pick_group_includes([PickGroupInclude::MainPath, PickGroupInclude::Markers])
            .with_paths_per_series(1)
    }

    pub fn set_records(&mut self, records: impl IntoIterator<Item = LineRecord>) {
        self.records = records.into_iter().map(Rc::new).collect();
    }

    #[must_use]
    pub fn records(&self) -> &[Rc<LineRecord>] {
        &self.records
    }

    #[must_use]
    pub fn y_keys(&self) -> &[ItemId] {
        &self.y_keys
    }

    /// Replaces the y keys. Records keep their positional values, so
    /// `ys[k]` now belongs to the new key at `k`. Callers resync the owning
    /// series' items afterwards.
    pub fn set_y_keys(&mut self, y_keys: impl IntoIterator<Item = String>) -> SeriesResult<()> {
        let y_keys: Vec<String> = y_keys.into_iter().collect();
        if y_keys.is_empty() {
            return Err(SeriesError::InvalidOptions(
                "line series needs at least one y key".to_owned(),
            ));
        }
        self.y_keys = y_keys.iter().map(ItemId::new).collect();
        self.config.y_keys = y_keys;
        Ok(())
    }

    /// Installs a per-record marker callback. Callers mark the owning series
    /// dirty afterwards.
    pub fn set_marker_formatter(&mut self, formatter: Option<MarkerFormatter<LineRecord>>) {
        self.marker_formatter = formatter;
    }

    fn diameter(&self, record: &LineRecord, y_key: &ItemId, highlighted: bool) -> f64 {
        let marker = self.config.marker;
        marker_diameter(
            self.marker_formatter.as_ref(),
            MarkerFormatterParams {
                datum: record,
                x_key: LINE_X_KEY,
                y_key: y_key.as_str(),
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

impl SeriesHooks<LineRecord> for LineSeries {
    fn create_node_data(
        &mut self,
        input: &NodeDataInput<'_>,
    ) -> SeriesResult<Vec<NodeDataContext<LineRecord>>> {
        self.label_points.clear();
        let (Some(x_axis), Some(y_axis)) = (input.x_axis, input.y_axis) else {
            return Ok(Vec::new());
        };
        let continuous_x = x_axis.is_continuous();
        let continuous_y = y_axis.is_continuous();
        let marker = self.config.marker;

        let mut contexts = Vec::with_capacity(self.y_keys.len());
        for (key_index, item_id) in self.y_keys.iter().enumerate() {
            let mut context = NodeDataContext::new(item_id.clone());
            if !input.item_enabled(item_id) {
                contexts.push(context);
                continue;
            }

            for record in &self.records {
                let Some((x_value, y_value)) =
                    check_domain_xy(&record.x, record.y(key_index), continuous_x, continuous_y)
                else {
                    continue;
                };
                let (Some(x), Some(y)) = (x_axis.convert(x_value), y_axis.convert(y_value)) else {
                    continue;
                };
                let point = NodePoint::new(x, y, 0.5 * self.diameter(record, item_id, false));
                context.node_data.push(
                    SeriesNodeDatum::new(Rc::clone(record))
                        .with_item_id(item_id.clone())
                        .with_point(point),
                );

                if !self.config.labels_enabled || !check_range_xy(x, y, x_axis, y_axis) {
                    continue;
                }
                let Some(value) = y_value.as_continuous() else {
                    continue;
                };
                let text = format!("{value}");
                self.label_points.push(PointLabelDatum {
                    point,
                    label: Some(LabelExtent {
                        text: text.clone(),
                        width: marker.label_width(&text),
                        height: marker.label_height_px,
                    }),
                });
                context.label_data.push(
                    LabelDatum::new(
                        Rc::clone(record),
                        text,
                        x,
                        y - marker.label_offset_px - point.size,
                    )
                    .with_item_id(item_id.clone()),
                );
            }
            trace!(item = %item_id, points = context.node_data.len(), "line node data");
            contexts.push(context);
        }
        Ok(contexts)
    }

    fn update_paths(
        &mut self,
        scene: &mut Scene,
        update: PathsUpdate<'_, LineRecord>,
    ) -> SeriesResult<()> {
        let points: Vec<Point> = update
            .context
            .node_data
            .iter()
            .filter_map(|datum| datum.point.map(NodePoint::position))
            .collect();
        let shape = if points.len() < 2 {
            NodeShape::Empty
        } else {
            NodeShape::Path(PathShape {
                points,
                closed: false,
                stroke_width: self.config.stroke_width,
            })
        };
        if let Some(path) = update.paths.first() {
            scene.set_shape(*path, shape)?;
        }
        for path in update.paths.iter().skip(1) {
            scene.set_visible(*path, false)?;
        }
        Ok(())
    }

    fn update_marker_selection(
        &mut self,
        scene: &mut Scene,
        node_data: &[SeriesNodeDatum<LineRecord>],
        selection: NodeSelection<LineRecord>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<NodeSelection<LineRecord>> {
        selection.update(scene, node_data.to_vec())
    }

    fn update_marker_nodes(
        &mut self,
        scene: &mut Scene,
        selection: &NodeSelection<LineRecord>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        if !series_idx.is_highlight() {
            return apply_marker_shapes(scene, selection, |_, point| 2.0 * point.size);
        }
        apply_marker_shapes(scene, selection, |datum, point| match &datum.item_id {
            Some(y_key) => self.diameter(&datum.datum, y_key, true),
            None => 2.0 * point.size,
        })
    }

    fn update_label_selection(
        &mut self,
        scene: &mut Scene,
        label_data: &[LabelDatum<LineRecord>],
        selection: LabelSelection<LineRecord>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<LabelSelection<LineRecord>> {
        selection.update(scene, label_data.to_vec())
    }

    fn update_label_nodes(
        &mut self,
        scene: &mut Scene,
        selection: &LabelSelection<LineRecord>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        apply_label_shapes(scene, selection, self.config.labels_enabled)
    }

    fn item_ids(&self) -> Vec<ItemId> {
        self.y_keys.clone()
    }

    fn labels_enabled(&self) -> bool {
        self.config.labels_enabled
    }

    fn label_data(&self) -> Vec<PointLabelDatum> {
        self.label_points.clone()
    }
}
