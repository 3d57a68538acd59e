pub mod axis;
pub mod datum;
pub mod range_filter;
pub mod types;

pub use axis::{AxisDirection, AxisKind, AxisScale, ChartAxis};
pub use datum::{LabelDatum, LabelExtent, NodeDataContext, PointLabelDatum, SeriesNodeDatum};
pub use range_filter::{DomainValue, check_domain_xy, check_range_xy};
pub use types::{ItemId, NodePoint, Point, SeriesId};
