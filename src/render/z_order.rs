//! Paint-order conventions for series-generated scene nodes.
//!
//! Siblings paint in ascending `(z_index, z_sub_order)` order, ties broken by
//! child position. Every container a series allocates shares
//! `SERIES_LAYER_ZINDEX`; the sub-order bands below keep
//! path → datum → marker → label order for every sub-group regardless of when
//! it was allocated.

use serde::{Deserialize, Serialize};

use crate::core::SeriesId;

/// Base z-index shared by all series content.
pub const SERIES_LAYER_ZINDEX: i32 = 500;
/// Highlight overlay paints above every series.
pub const SERIES_HIGHLIGHT_ZINDEX: i32 = 15_000;

/// Sub-order band for marker and pick-test containers.
pub const MARKER_SUB_ORDER_OFFSET: i64 = 10_000;
/// Sub-order band for label containers.
pub const LABEL_SUB_ORDER_OFFSET: i64 = 20_000;

/// Secondary sort key: owning series, then allocation-derived order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZSubOrder {
    pub series: SeriesId,
    pub order: i64,
}

impl ZSubOrder {
    #[must_use]
    pub fn new(series: SeriesId, order: i64) -> Self {
        Self { series, order }
    }
}

#[cfg(test)]
mod tests {
    use super::{LABEL_SUB_ORDER_OFFSET, MARKER_SUB_ORDER_OFFSET, ZSubOrder};
    use crate::core::SeriesId;

    #[test]
    fn bands_order_late_main_groups_below_early_markers() {
        let series = SeriesId::new("s");
        let late_main = ZSubOrder::new(series.clone(), 9_999);
        let early_marker = ZSubOrder::new(series.clone(), MARKER_SUB_ORDER_OFFSET);
        let early_label = ZSubOrder::new(series, LABEL_SUB_ORDER_OFFSET);
        assert!(late_main < early_marker);
        assert!(early_marker < early_label);
    }
}
