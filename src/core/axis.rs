use serde::{Deserialize, Serialize};

use crate::core::DomainValue;
use crate::error::{SeriesError, SeriesResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisDirection {
    X,
    Y,
}

/// Type tag used by pick strategies to prefer categorical axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    Continuous,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisScale {
    Linear { domain_start: f64, domain_end: f64 },
    Category { categories: Vec<String> },
}

/// Axis collaborator: maps domain values into a pixel range and answers
/// visibility queries for projected coordinates.
///
/// Series never mutate axes; hosts rebuild them on layout changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAxis {
    direction: AxisDirection,
    scale: AxisScale,
    range: (f64, f64),
}

impl ChartAxis {
    pub fn linear(
        direction: AxisDirection,
        domain_start: f64,
        domain_end: f64,
        range: (f64, f64),
    ) -> SeriesResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(SeriesError::InvalidData(
                "axis domain must be finite and non-zero".to_owned(),
            ));
        }
        validate_range(range)?;

        Ok(Self {
            direction,
            scale: AxisScale::Linear {
                domain_start,
                domain_end,
            },
            range,
        })
    }

    pub fn category(
        direction: AxisDirection,
        categories: Vec<String>,
        range: (f64, f64),
    ) -> SeriesResult<Self> {
        validate_range(range)?;

        Ok(Self {
            direction,
            scale: AxisScale::Category { categories },
            range,
        })
    }

    #[must_use]
    pub fn direction(&self) -> AxisDirection {
        self.direction
    }

    #[must_use]
    pub fn kind(&self) -> AxisKind {
        match self.scale {
            AxisScale::Linear { .. } => AxisKind::Continuous,
            AxisScale::Category { .. } => AxisKind::Category,
        }
    }

    #[must_use]
    pub fn is_category(&self) -> bool {
        self.kind() == AxisKind::Category
    }

    /// Continuous axes accept continuous domain values, category axes accept
    /// discrete ones.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.kind() == AxisKind::Continuous
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn scale(&self) -> &AxisScale {
        &self.scale
    }

    #[must_use]
    pub fn in_range(&self, x: f64) -> bool {
        self.in_range_with(x, 0.0, 0.0)
    }

    /// Returns whether `[x, x + width]` touches the visible range.
    ///
    /// NaN never lies in range.
    #[must_use]
    pub fn in_range_with(&self, x: f64, width: f64, tolerance: f64) -> bool {
        let min = self.range.0.min(self.range.1);
        let max = self.range.0.max(self.range.1);
        x + width >= min - tolerance && x <= max + tolerance
    }

    /// Width of one category band; 0 for continuous axes.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        match &self.scale {
            AxisScale::Linear { .. } => 0.0,
            AxisScale::Category { categories } if categories.is_empty() => 0.0,
            AxisScale::Category { categories } => {
                (self.range.1 - self.range.0).abs() / categories.len() as f64
            }
        }
    }

    /// Projects a domain value into pixels.
    ///
    /// Returns `None` when the value is not plottable on this axis.
    #[must_use]
    pub fn convert(&self, value: &DomainValue) -> Option<f64> {
        match &self.scale {
            AxisScale::Linear {
                domain_start,
                domain_end,
            } => {
                let value = value.as_continuous()?;
                let normalized = (value - domain_start) / (domain_end - domain_start);
                Some(self.range.0 + normalized * (self.range.1 - self.range.0))
            }
            AxisScale::Category { categories } => {
                let key = value.as_discrete()?;
                let index = categories.iter().position(|category| category == key)?;
                let step = (self.range.1 - self.range.0) / categories.len() as f64;
                Some(self.range.0 + step * (index as f64 + 0.5))
            }
        }
    }
}

fn validate_range(range: (f64, f64)) -> SeriesResult<()> {
    if !range.0.is_finite() || !range.1.is_finite() {
        return Err(SeriesError::InvalidData(
            "axis range must be finite".to_owned(),
        ));
    }
    Ok(())
}
