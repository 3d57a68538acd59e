use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::error::{SeriesError, SeriesResult};
use crate::interaction::PickMode;

/// Visual elements that take part in pointer hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PickGroupInclude {
    MainPath,
    DatumNodes,
    Markers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesFeature {
    Markers,
}

/// Series-level dimming applied while another series or item is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightStyle {
    pub enabled: bool,
    pub dim_opacity: f64,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            dim_opacity: 1.0,
        }
    }
}

/// Construction-time configuration of a Cartesian series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesOpts {
    pub pick_group_includes: SmallVec<[PickGroupInclude; 3]>,
    pub paths_per_series: usize,
    pub paths_z_index_sub_order_offset: Vec<i64>,
    pub features: SmallVec<[SeriesFeature; 1]>,
    pub pick_modes: SmallVec<[PickMode; 4]>,
    pub highlight_style: HighlightStyle,
}

impl Default for SeriesOpts {
    fn default() -> Self {
        Self {
            pick_group_includes: smallvec![PickGroupInclude::DatumNodes],
            paths_per_series: 1,
            paths_z_index_sub_order_offset: Vec::new(),
            features: SmallVec::new(),
            pick_modes: smallvec![PickMode::ExactShapeMatch],
            highlight_style: HighlightStyle::default(),
        }
    }
}

impl SeriesOpts {
    #[must_use]
    pub fn with_pick_group_includes(
        mut self,
        includes: impl IntoIterator<Item = PickGroupInclude>,
    ) -> Self {
        self.pick_group_includes = includes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_paths_per_series(mut self, paths_per_series: usize) -> Self {
        self.paths_per_series = paths_per_series;
        self
    }

    #[must_use]
    pub fn with_paths_z_index_sub_order_offset(mut self, offsets: Vec<i64>) -> Self {
        self.paths_z_index_sub_order_offset = offsets;
        self
    }

    #[must_use]
    pub fn with_feature(mut self, feature: SeriesFeature) -> Self {
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
        self
    }

    #[must_use]
    pub fn with_pick_modes(mut self, modes: impl IntoIterator<Item = PickMode>) -> Self {
        self.pick_modes = modes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_highlight_style(mut self, style: HighlightStyle) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub fn includes(&self, include: PickGroupInclude) -> bool {
        self.pick_group_includes.contains(&include)
    }

    #[must_use]
    pub fn markers_enabled(&self) -> bool {
        self.features.contains(&SeriesFeature::Markers)
    }

    /// Sort-order offset of path `index`; missing entries count as 0 and
    /// entries past `paths_per_series` are never read.
    #[must_use]
    pub fn path_sub_order_offset(&self, index: usize) -> i64 {
        self.paths_z_index_sub_order_offset
            .get(index)
            .copied()
            .unwrap_or(0)
    }

    pub fn validate(self) -> SeriesResult<Self> {
        let dim = self.highlight_style.dim_opacity;
        if !dim.is_finite() || !(0.0..=1.0).contains(&dim) {
            return Err(SeriesError::InvalidOptions(
                "highlight dim opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Parses and validates options from JSON; absent fields take defaults.
    pub fn from_json_str(input: &str) -> SeriesResult<Self> {
        let opts: Self = serde_json::from_str(input).map_err(|e| {
            SeriesError::InvalidOptions(format!("failed to parse series options json: {e}"))
        })?;
        opts.validate()
    }

    pub fn to_json_pretty(&self) -> SeriesResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SeriesError::InvalidOptions(format!("failed to serialize series options: {e}"))
        })
    }
}
