use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::core::ChartAxis;

/// Raw domain value of one datum field before projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainValue {
    Number(f64),
    Decimal(Decimal),
    Time(DateTime<Utc>),
    Category(String),
    Missing,
}

impl DomainValue {
    /// Finite numbers, decimals representable as `f64`, and timestamps.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.as_continuous().is_some()
    }

    #[must_use]
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Category(_))
    }

    /// Numeric value used by continuous scales; timestamps map to unix seconds.
    #[must_use]
    pub fn as_continuous(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Decimal(value) => value.to_f64().filter(|v| v.is_finite()),
            Self::Time(time) => Some(time.timestamp_millis() as f64 / 1000.0),
            Self::Number(_) | Self::Category(_) | Self::Missing => None,
        }
    }

    #[must_use]
    pub fn as_discrete(&self) -> Option<&str> {
        match self {
            Self::Category(value) => Some(value),
            _ => None,
        }
    }
}

impl From<f64> for DomainValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DomainValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_owned())
    }
}

/// Returns the pair when both values are plottable on their axes.
///
/// `continuous_x`/`continuous_y` are resolved once by the caller so the check
/// stays cheap inside projection loops.
#[must_use]
pub fn check_domain_xy<'a>(
    x: &'a DomainValue,
    y: &'a DomainValue,
    continuous_x: bool,
    continuous_y: bool,
) -> Option<(&'a DomainValue, &'a DomainValue)> {
    let valid_x = if continuous_x {
        x.is_continuous()
    } else {
        x.is_discrete()
    };
    let valid_y = if continuous_y {
        y.is_continuous()
    } else {
        y.is_discrete()
    };
    (valid_x && valid_y).then_some((x, y))
}

/// Returns whether a projected pixel pair lies inside both visible axis ranges.
#[must_use]
pub fn check_range_xy(x: f64, y: f64, x_axis: &ChartAxis, y_axis: &ChartAxis) -> bool {
    !x.is_nan() && !y.is_nan() && x_axis.in_range(x) && y_axis.in_range(y)
}
