use serde::{Deserialize, Serialize};

use crate::core::{ItemId, SeriesId, SeriesNodeDatum};

/// Hit-test strategy a series may be asked to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PickMode {
    /// Pointer must lie inside a rendered shape.
    ExactShapeMatch,
    /// Closest datum by Euclidean distance.
    NearestNode,
    /// Closest datum along the category axis (x when none), ties by the other axis.
    NearestByMainAxisFirst,
    /// Like `NearestByMainAxisFirst` but only when a category axis exists.
    NearestByMainCategoryAxisFirst,
}

/// Datum resolved by one pick strategy.
#[derive(Debug)]
pub struct PickMatch<D> {
    pub datum: SeriesNodeDatum<D>,
    pub distance: f64,
}

impl<D> Clone for PickMatch<D> {
    fn clone(&self) -> Self {
        Self {
            datum: self.datum.clone(),
            distance: self.distance,
        }
    }
}

/// Result of `CartesianSeries::pick_node`: the match plus the mode that produced it.
#[derive(Debug)]
pub struct SeriesPickResult<D> {
    pub pick_mode: PickMode,
    pub datum: SeriesNodeDatum<D>,
    pub distance: f64,
}

/// Chart-wide hovered/selected datum, owned by the host.
#[derive(Debug)]
pub struct HighlightedDatum<D> {
    pub series_id: SeriesId,
    pub datum: SeriesNodeDatum<D>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightStatus {
    NoHighlight,
    Highlighted,
    OtherHighlighted,
}

/// Host-side highlight state read once per series update.
#[derive(Debug)]
pub struct ChartHighlightState<D> {
    highlighted: Option<HighlightedDatum<D>>,
}

impl<D> Default for ChartHighlightState<D> {
    fn default() -> Self {
        Self { highlighted: None }
    }
}

impl<D> ChartHighlightState<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight(&mut self, series_id: SeriesId, datum: SeriesNodeDatum<D>) {
        self.highlighted = Some(HighlightedDatum { series_id, datum });
    }

    pub fn clear(&mut self) {
        self.highlighted = None;
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&HighlightedDatum<D>> {
        self.highlighted.as_ref()
    }

    /// `None` when nothing is highlighted, otherwise whether `series_id` owns
    /// the highlighted datum.
    #[must_use]
    pub fn series_highlighted(&self, series_id: &SeriesId) -> Option<bool> {
        self.highlighted
            .as_ref()
            .map(|highlighted| &highlighted.series_id == series_id)
    }

    /// Classifies an item of `series_id` relative to the current highlight.
    ///
    /// A highlight without an item id covers the whole series.
    #[must_use]
    pub fn item_status(&self, series_id: &SeriesId, item_id: Option<&ItemId>) -> HighlightStatus {
        let Some(highlighted) = &self.highlighted else {
            return HighlightStatus::NoHighlight;
        };
        if &highlighted.series_id != series_id {
            return HighlightStatus::OtherHighlighted;
        }
        match (&highlighted.datum.item_id, item_id) {
            (None, _) => HighlightStatus::Highlighted,
            (Some(highlighted_item), Some(item_id)) if highlighted_item != item_id => {
                HighlightStatus::OtherHighlighted
            }
            _ => HighlightStatus::Highlighted,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{ChartHighlightState, HighlightStatus};
    use crate::core::{ItemId, SeriesId, SeriesNodeDatum};

    #[test]
    fn item_status_distinguishes_series_and_items() {
        let mut state = ChartHighlightState::new();
        let series = SeriesId::new("a");
        assert_eq!(state.item_status(&series, None), HighlightStatus::NoHighlight);
        assert_eq!(state.series_highlighted(&series), None);

        state.highlight(
            series.clone(),
            SeriesNodeDatum::new(Rc::new(1)).with_item_id(ItemId::new("y1")),
        );
        assert_eq!(state.series_highlighted(&series), Some(true));
        assert_eq!(
            state.item_status(&SeriesId::new("b"), None),
            HighlightStatus::OtherHighlighted
        );
        assert_eq!(
            state.item_status(&series, Some(&ItemId::new("y2"))),
            HighlightStatus::OtherHighlighted
        );
        assert_eq!(
            state.item_status(&series, Some(&ItemId::new("y1"))),
            HighlightStatus::Highlighted
        );
        assert_eq!(state.item_status(&series, None), HighlightStatus::Highlighted);
    }
}
