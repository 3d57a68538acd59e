use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Point;

/// Node type fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Group,
    Path,
    Marker,
    Rect,
    Text,
}

impl NodeKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Path => "path",
            Self::Marker => "marker",
            Self::Rect => "rect",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Polyline or polygon in the owning node's local space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathShape {
    pub points: Vec<Point>,
    pub closed: bool,
    pub stroke_width: f64,
}

/// Centred marker glyph; `size` is the glyph diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerShape {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShape {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Geometry attached to a scene node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum NodeShape {
    #[default]
    Empty,
    Path(PathShape),
    Marker(MarkerShape),
    Rect(RectShape),
    Text(TextShape),
}

impl NodeShape {
    /// Node kind able to carry this shape. `Empty` fits every kind.
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            Self::Empty => None,
            Self::Path(_) => Some(NodeKind::Path),
            Self::Marker(_) => Some(NodeKind::Marker),
            Self::Rect(_) => Some(NodeKind::Rect),
            Self::Text(_) => Some(NodeKind::Text),
        }
    }

    /// Whether all coordinates are finite; degenerate shapes are skipped when painting.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Path(path) => {
                !path.points.is_empty()
                    && path.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            }
            Self::Marker(marker) => {
                marker.x.is_finite() && marker.y.is_finite() && marker.size.is_finite()
            }
            Self::Rect(rect) => {
                rect.x.is_finite()
                    && rect.y.is_finite()
                    && rect.width.is_finite()
                    && rect.height.is_finite()
            }
            Self::Text(text) => !text.text.is_empty() && text.x.is_finite() && text.y.is_finite(),
        }
    }

    /// Exact hit test in local coordinates.
    ///
    /// Text has no measured extent and never hits.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        if !self.is_drawable() {
            return false;
        }
        match self {
            Self::Empty | Self::Text(_) => false,
            Self::Marker(marker) => {
                let radius = 0.5 * marker.size;
                point.distance_squared(Point::new(marker.x, marker.y)) <= radius * radius
            }
            Self::Rect(rect) => {
                let (x0, x1) = ordered(rect.x, rect.x + rect.width);
                let (y0, y1) = ordered(rect.y, rect.y + rect.height);
                point.x >= x0 && point.x <= x1 && point.y >= y0 && point.y <= y1
            }
            Self::Path(path) => path_contains(path, point),
        }
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Path(path) => Self::Path(PathShape {
                points: path
                    .points
                    .iter()
                    .map(|p| Point::new(p.x + dx, p.y + dy))
                    .collect(),
                closed: path.closed,
                stroke_width: path.stroke_width,
            }),
            Self::Marker(marker) => Self::Marker(MarkerShape {
                x: marker.x + dx,
                y: marker.y + dy,
                size: marker.size,
            }),
            Self::Rect(rect) => Self::Rect(RectShape {
                x: rect.x + dx,
                y: rect.y + dy,
                ..*rect
            }),
            Self::Text(text) => Self::Text(TextShape {
                text: text.text.clone(),
                x: text.x + dx,
                y: text.y + dy,
            }),
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn path_contains(path: &PathShape, point: Point) -> bool {
    let tolerance = (0.5 * path.stroke_width).max(0.5);
    let tolerance_sq = tolerance * tolerance;

    let segment_count = if path.closed {
        path.points.len()
    } else {
        path.points.len().saturating_sub(1)
    };
    for index in 0..segment_count {
        let a = path.points[index];
        let b = path.points[(index + 1) % path.points.len()];
        if segment_distance_sq(point, a, b) <= tolerance_sq {
            return true;
        }
    }
    if path.points.len() == 1 {
        return point.distance_squared(path.points[0]) <= tolerance_sq;
    }

    path.closed && polygon_contains(&path.points, point)
}

fn segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance_squared(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(Point::new(a.x + t * dx, a.y + t * dy))
}

// Even-odd rule.
fn polygon_contains(points: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::{MarkerShape, NodeShape, PathShape, RectShape};
    use crate::core::Point;

    #[test]
    fn marker_hit_uses_half_size_radius() {
        let marker = NodeShape::Marker(MarkerShape {
            x: 10.0,
            y: 10.0,
            size: 8.0,
        });
        assert!(marker.contains(Point::new(14.0, 10.0)));
        assert!(!marker.contains(Point::new(14.5, 10.0)));
    }

    #[test]
    fn open_path_hits_near_stroke_only() {
        let path = NodeShape::Path(PathShape {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            closed: false,
            stroke_width: 2.0,
        });
        assert!(path.contains(Point::new(5.0, 0.8)));
        assert!(!path.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn closed_path_hits_interior() {
        let path = NodeShape::Path(PathShape {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            closed: true,
            stroke_width: 1.0,
        });
        assert!(path.contains(Point::new(5.0, 5.0)));
        assert!(!path.contains(Point::new(15.0, 5.0)));
    }

    #[test]
    fn negative_rect_extent_is_normalized() {
        let rect = NodeShape::Rect(RectShape {
            x: 10.0,
            y: 10.0,
            width: -5.0,
            height: 5.0,
        });
        assert!(rect.contains(Point::new(7.0, 12.0)));
        assert!(!NodeShape::Rect(RectShape {
            x: f64::NAN,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        })
        .contains(Point::new(0.0, 0.0)));
    }
}
