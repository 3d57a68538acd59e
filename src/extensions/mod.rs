//! Concrete series variants built on `CartesianSeries`.
//!
//! Each variant is a `SeriesHooks` implementation plus the `SeriesOpts` it is
//! meant to run with.

pub mod line;
pub mod scatter;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{LabelDatum, NodePoint, SeriesNodeDatum};
use crate::error::{SeriesError, SeriesResult};
use crate::render::{MarkerShape, NodeShape, Scene, Selection, TextShape};

pub use line::{LINE_X_KEY, LineConfig, LineRecord, LineSeries};
pub use scatter::{SCATTER_X_KEY, SCATTER_Y_KEY, ScatterConfig, ScatterRecord, ScatterSeries};

/// Marker and label sizing shared by the bundled variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub size_px: f64,
    pub highlight_size_px: f64,
    pub label_char_width_px: f64,
    pub label_height_px: f64,
    pub label_offset_px: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size_px: 8.0,
            highlight_size_px: 12.0,
            label_char_width_px: 7.0,
            label_height_px: 14.0,
            label_offset_px: 6.0,
        }
    }
}

impl MarkerStyle {
    pub(crate) fn validate(self) -> SeriesResult<Self> {
        for (value, name) in [
            (self.size_px, "size_px"),
            (self.highlight_size_px, "highlight_size_px"),
            (self.label_char_width_px, "label_char_width_px"),
            (self.label_height_px, "label_height_px"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SeriesError::InvalidOptions(format!(
                    "marker style `{name}` must be finite and > 0"
                )));
            }
        }
        if !self.label_offset_px.is_finite() {
            return Err(SeriesError::InvalidOptions(
                "marker style `label_offset_px` must be finite".to_owned(),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn label_width(&self, text: &str) -> f64 {
        self.label_char_width_px * text.chars().count() as f64
    }
}

/// Arguments of a marker formatter call.
#[derive(Debug)]
pub struct MarkerFormatterParams<'a, D> {
    pub datum: &'a D,
    pub x_key: &'a str,
    pub y_key: &'a str,
    /// Diameter the marker would get without the formatter.
    pub size: f64,
    pub highlighted: bool,
}

/// Per-datum marker overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerFormat {
    pub size: Option<f64>,
}

/// Per-datum marker callback.
///
/// A size override changes both the rendered marker and the extent used by
/// nearest-style picking. Overrides that are not finite and positive are
/// ignored.
pub struct MarkerFormatter<D>(Box<dyn Fn(&MarkerFormatterParams<'_, D>) -> MarkerFormat>);

impl<D> MarkerFormatter<D> {
    pub fn new(formatter: impl Fn(&MarkerFormatterParams<'_, D>) -> MarkerFormat + 'static) -> Self {
        Self(Box::new(formatter))
    }

    #[must_use]
    pub fn format(&self, params: &MarkerFormatterParams<'_, D>) -> MarkerFormat {
        (self.0)(params)
    }
}

impl<D> fmt::Debug for MarkerFormatter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MarkerFormatter(..)")
    }
}

/// Marker diameter for one datum after the optional formatter.
pub(crate) fn marker_diameter<D>(
    formatter: Option<&MarkerFormatter<D>>,
    params: MarkerFormatterParams<'_, D>,
) -> f64 {
    formatter
        .and_then(|formatter| formatter.format(&params).size)
        .filter(|size| size.is_finite() && *size > 0.0)
        .unwrap_or(params.size)
}

/// Writes one marker shape per bound datum, sized by `diameter`. Data without
/// a projected point get an empty shape.
pub(crate) fn apply_marker_shapes<D>(
    scene: &mut Scene,
    selection: &Selection<SeriesNodeDatum<D>>,
    diameter: impl Fn(&SeriesNodeDatum<D>, NodePoint) -> f64,
) -> SeriesResult<()> {
    for (node, datum) in selection.iter() {
        let shape = match datum.point {
            Some(point) => NodeShape::Marker(MarkerShape {
                x: point.x,
                y: point.y,
                size: diameter(datum, point),
            }),
            None => NodeShape::Empty,
        };
        scene.set_shape(node, shape)?;
    }
    Ok(())
}

pub(crate) fn apply_label_shapes<D>(
    scene: &mut Scene,
    selection: &Selection<LabelDatum<D>>,
    visible: bool,
) -> SeriesResult<()> {
    for (node, label) in selection.iter() {
        scene.set_shape(
            node,
            NodeShape::Text(TextShape {
                text: label.text.clone(),
                x: label.x,
                y: label.y,
            }),
        )?;
        scene.set_visible(node, visible)?;
    }
    Ok(())
}
