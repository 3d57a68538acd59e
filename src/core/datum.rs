use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::{ItemId, NodePoint};

/// One rendered data point.
///
/// `datum` is a back-reference to the source record; two node datums refer to
/// the same record when their `Rc`s are pointer-equal.
#[derive(Debug)]
pub struct SeriesNodeDatum<D> {
    pub item_id: Option<ItemId>,
    pub datum: Rc<D>,
    pub point: Option<NodePoint>,
}

impl<D> SeriesNodeDatum<D> {
    #[must_use]
    pub fn new(datum: Rc<D>) -> Self {
        Self {
            item_id: None,
            datum,
            point: None,
        }
    }

    #[must_use]
    pub fn with_item_id(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    #[must_use]
    pub fn with_point(mut self, point: NodePoint) -> Self {
        self.point = Some(point);
        self
    }

    /// Marker radius, 0 when the datum has no projected point.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.point.map_or(0.0, |point| point.size)
    }

    #[must_use]
    pub fn refers_to(&self, datum: &Rc<D>) -> bool {
        Rc::ptr_eq(&self.datum, datum)
    }
}

impl<D> Clone for SeriesNodeDatum<D> {
    fn clone(&self) -> Self {
        Self {
            item_id: self.item_id.clone(),
            datum: Rc::clone(&self.datum),
            point: self.point,
        }
    }
}

/// Label anchored to one source record.
#[derive(Debug)]
pub struct LabelDatum<D> {
    pub item_id: Option<ItemId>,
    pub datum: Rc<D>,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl<D> LabelDatum<D> {
    #[must_use]
    pub fn new(datum: Rc<D>, text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            item_id: None,
            datum,
            text: text.into(),
            x,
            y,
        }
    }

    #[must_use]
    pub fn with_item_id(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    /// Whether this label belongs to the given rendered datum.
    #[must_use]
    pub fn matches(&self, node: &SeriesNodeDatum<D>) -> bool {
        node.refers_to(&self.datum) && self.item_id == node.item_id
    }
}

impl<D> Clone for LabelDatum<D> {
    fn clone(&self) -> Self {
        Self {
            item_id: self.item_id.clone(),
            datum: Rc::clone(&self.datum),
            text: self.text.clone(),
            x: self.x,
            y: self.y,
        }
    }
}

/// One frame's data for one logical sub-series partition.
#[derive(Debug)]
pub struct NodeDataContext<D> {
    pub item_id: ItemId,
    pub node_data: Vec<SeriesNodeDatum<D>>,
    pub label_data: Vec<LabelDatum<D>>,
}

impl<D> NodeDataContext<D> {
    #[must_use]
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            node_data: Vec::new(),
            label_data: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_node_data(mut self, node_data: Vec<SeriesNodeDatum<D>>) -> Self {
        self.node_data = node_data;
        self
    }

    #[must_use]
    pub fn with_label_data(mut self, label_data: Vec<LabelDatum<D>>) -> Self {
        self.label_data = label_data;
        self
    }
}

impl<D> Clone for NodeDataContext<D> {
    fn clone(&self) -> Self {
        Self {
            item_id: self.item_id.clone(),
            node_data: self.node_data.clone(),
            label_data: self.label_data.clone(),
        }
    }
}

/// Measured label text handed to label-overlap avoidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelExtent {
    pub text: String,
    pub width: f64,
    pub height: f64,
}

/// Label geometry exported by `CartesianSeries::label_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLabelDatum {
    pub point: NodePoint,
    pub label: Option<LabelExtent>,
}
