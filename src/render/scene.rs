use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::Point;
use crate::error::{SeriesError, SeriesResult};
use crate::render::{DrawItem, NodeKind, NodeShape, RenderFrame, ZSubOrder};

/// Stable handle of one scene node. Ids are never reused within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Creation options for containers and other ordered nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeOptions {
    pub name: Option<String>,
    pub z_index: i32,
    pub z_sub_order: Option<ZSubOrder>,
    pub layer: bool,
}

impl NodeOptions {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    #[must_use]
    pub fn with_z_sub_order(mut self, z_sub_order: ZSubOrder) -> Self {
        self.z_sub_order = Some(z_sub_order);
        self
    }

    /// Marks the container as a separately composited layer.
    #[must_use]
    pub fn as_layer(mut self) -> Self {
        self.layer = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    id: NodeId,
    kind: NodeKind,
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: bool,
    opacity: f64,
    z_index: i32,
    z_sub_order: Option<ZSubOrder>,
    layer: bool,
    translation: Point,
    shape: NodeShape,
}

impl SceneNode {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    #[must_use]
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    #[must_use]
    pub fn z_sub_order(&self) -> Option<&ZSubOrder> {
        self.z_sub_order.as_ref()
    }

    #[must_use]
    pub fn is_layer(&self) -> bool {
        self.layer
    }

    #[must_use]
    pub fn translation(&self) -> Point {
        self.translation
    }

    #[must_use]
    pub fn shape(&self) -> &NodeShape {
        &self.shape
    }
}

/// Lifetime counters used to observe reconciliation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneStats {
    pub created: u64,
    pub released: u64,
}

impl SceneStats {
    #[must_use]
    pub fn live(self) -> u64 {
        self.created - self.released
    }
}

/// Arena-backed retained scene graph.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: IndexMap<NodeId, SceneNode>,
    root: NodeId,
    next_id: u64,
    stats: SceneStats,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let mut scene = Self {
            nodes: IndexMap::new(),
            root: NodeId(0),
            next_id: 0,
            stats: SceneStats::default(),
        };
        scene.root = scene.create_node_with(NodeKind::Group, NodeOptions::named("root"));
        scene
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Creates a detached node with default options.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.create_node_with(kind, NodeOptions::default())
    }

    pub fn create_group(&mut self, options: NodeOptions) -> NodeId {
        self.create_node_with(NodeKind::Group, options)
    }

    pub fn create_node_with(&mut self, kind: NodeKind, options: NodeOptions) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.stats.created += 1;
        self.nodes.insert(
            id,
            SceneNode {
                id,
                kind,
                name: options.name,
                parent: None,
                children: Vec::new(),
                visible: true,
                opacity: 1.0,
                z_index: options.z_index,
                z_sub_order: options.z_sub_order,
                layer: options.layer,
                translation: Point::default(),
                shape: NodeShape::Empty,
            },
        );
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SeriesResult<()> {
        self.node_checked(child)?;
        if self.node_checked(parent)?.kind != NodeKind::Group {
            return Err(SeriesError::InvalidNodeKind {
                node: parent,
                expected: NodeKind::Group.name(),
                actual: self.node_checked(parent)?.kind.name(),
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SeriesError::InvalidData(format!(
                "cannot append {child} below its own descendant {parent}"
            )));
        }

        self.detach(child);
        self.node_mut_checked(parent)?.children.push(child);
        self.node_mut_checked(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detaches `child` from `parent`. Returns `false` when it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SeriesResult<bool> {
        self.node_checked(parent)?;
        if self.node_checked(child)?.parent != Some(parent) {
            return Ok(false);
        }
        self.detach(child);
        Ok(true)
    }

    /// Detaches and drops `id` together with its subtree. Returns the number
    /// of nodes dropped.
    pub fn release(&mut self, id: NodeId) -> SeriesResult<usize> {
        if id == self.root {
            return Err(SeriesError::InvalidData(
                "scene root cannot be released".to_owned(),
            ));
        }
        self.node_checked(id)?;
        self.detach(id);

        let mut stack = vec![id];
        let mut released = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.swap_remove(&next) {
                stack.extend(node.children);
                released += 1;
            }
        }
        self.stats.released += released as u64;
        trace!(node = %id, released, "release scene subtree");
        Ok(released)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> SeriesResult<()> {
        self.node_mut_checked(id)?.visible = visible;
        Ok(())
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) -> SeriesResult<()> {
        if !opacity.is_finite() {
            return Err(SeriesError::InvalidData(
                "opacity must be finite".to_owned(),
            ));
        }
        self.node_mut_checked(id)?.opacity = opacity;
        Ok(())
    }

    pub fn set_z_index(&mut self, id: NodeId, z_index: i32) -> SeriesResult<()> {
        self.node_mut_checked(id)?.z_index = z_index;
        Ok(())
    }

    pub fn set_z_sub_order(&mut self, id: NodeId, z_sub_order: Option<ZSubOrder>) -> SeriesResult<()> {
        self.node_mut_checked(id)?.z_sub_order = z_sub_order;
        Ok(())
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Point) -> SeriesResult<()> {
        self.node_mut_checked(id)?.translation = translation;
        Ok(())
    }

    /// Replaces the node geometry. The shape must match the node kind.
    pub fn set_shape(&mut self, id: NodeId, shape: NodeShape) -> SeriesResult<()> {
        let node = self.node_mut_checked(id)?;
        if let Some(kind) = shape.kind() {
            if kind != node.kind {
                return Err(SeriesError::InvalidNodeKind {
                    node: id,
                    expected: kind.name(),
                    actual: node.kind.name(),
                });
            }
        }
        node.shape = shape;
        Ok(())
    }

    /// Whether the node and all of its ancestors are visible.
    #[must_use]
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            match self.nodes.get(&next) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Converts a scene-space point into the local space of `id`.
    #[must_use]
    pub fn transform_point(&self, id: NodeId, point: Point) -> Point {
        let mut local = point;
        let mut current = Some(id);
        while let Some(next) = current {
            let Some(node) = self.nodes.get(&next) else {
                break;
            };
            local.x -= node.translation.x;
            local.y -= node.translation.y;
            current = node.parent;
        }
        local
    }

    /// Returns the topmost visible shape below `id` containing the scene-space point.
    #[must_use]
    pub fn pick_node(&self, id: NodeId, point: Point) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        let parent_local = match node.parent {
            Some(parent) => self.transform_point(parent, point),
            None => point,
        };
        self.pick_local(id, parent_local)
    }

    fn pick_local(&self, id: NodeId, point: Point) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        if !node.visible {
            return None;
        }
        let local = Point::new(point.x - node.translation.x, point.y - node.translation.y);
        if node.kind == NodeKind::Group {
            return self
                .sorted_children(id)
                .into_iter()
                .rev()
                .find_map(|child| self.pick_local(child, local));
        }
        node.shape.contains(local).then_some(id)
    }

    /// Children of `id` in paint order.
    #[must_use]
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut children = node.children.clone();
        // Stable: equal keys keep child position.
        children.sort_by_cached_key(|child| {
            self.nodes
                .get(child)
                .map(|node| (node.z_index, node.z_sub_order.clone()))
        });
        children
    }

    /// Visible nodes in paint order, depth first from the root.
    #[must_use]
    pub fn painted_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_painted(self.root, &mut out);
        out
    }

    fn collect_painted(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        out.push(id);
        for child in self.sorted_children(id) {
            self.collect_painted(child, out);
        }
    }

    /// Flattens the visible scene into scene-space draw items.
    #[must_use]
    pub fn render_frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::new();
        self.collect_draw_items(self.root, Point::default(), 1.0, &mut frame);
        frame
    }

    fn collect_draw_items(&self, id: NodeId, offset: Point, opacity: f64, frame: &mut RenderFrame) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let offset = Point::new(offset.x + node.translation.x, offset.y + node.translation.y);
        let opacity = opacity * node.opacity;
        if node.shape.is_drawable() {
            frame.items.push(DrawItem {
                node: id,
                opacity,
                shape: node.shape.translated(offset.x, offset.y),
            });
        }
        for child in self.sorted_children(id) {
            self.collect_draw_items(child, offset, opacity, frame);
        }
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            if next == candidate {
                return true;
            }
            current = self.nodes.get(&next).and_then(|node| node.parent);
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|id| *id != child);
        }
    }

    fn node_checked(&self, id: NodeId) -> SeriesResult<&SceneNode> {
        self.nodes.get(&id).ok_or(SeriesError::UnknownNode(id))
    }

    fn node_mut_checked(&mut self, id: NodeId) -> SeriesResult<&mut SceneNode> {
        self.nodes.get_mut(&id).ok_or(SeriesError::UnknownNode(id))
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeOptions, Scene};
    use crate::core::{Point, SeriesId};
    use crate::render::{MarkerShape, NodeKind, NodeShape, ZSubOrder};

    fn marker(scene: &mut Scene, parent: super::NodeId, x: f64) -> super::NodeId {
        let id = scene.create_node(NodeKind::Marker);
        scene.append_child(parent, id).expect("append");
        scene
            .set_shape(id, NodeShape::Marker(MarkerShape { x, y: 0.0, size: 10.0 }))
            .expect("shape");
        id
    }

    #[test]
    fn release_drops_whole_subtree() {
        let mut scene = Scene::new();
        let group = scene.create_group(NodeOptions::named("g"));
        scene.append_child(scene.root(), group).expect("append");
        let child = marker(&mut scene, group, 0.0);

        assert_eq!(scene.release(group).expect("release"), 2);
        assert!(!scene.contains(child));
        assert!(scene.node(scene.root()).expect("root").children().is_empty());
        assert_eq!(scene.stats().live(), 1);
    }

    #[test]
    fn pick_prefers_topmost_sibling_and_respects_translation() {
        let mut scene = Scene::new();
        let group = scene.create_group(NodeOptions::default());
        scene.append_child(scene.root(), group).expect("append");
        scene.set_translation(group, Point::new(100.0, 0.0)).expect("translate");
        let below = marker(&mut scene, group, 0.0);
        let above = marker(&mut scene, group, 2.0);

        assert_eq!(scene.pick_node(group, Point::new(101.0, 0.0)), Some(above));
        scene.set_visible(above, false).expect("hide");
        assert_eq!(scene.pick_node(group, Point::new(101.0, 0.0)), Some(below));
        assert_eq!(scene.pick_node(group, Point::new(1.0, 0.0)), None);
        assert_eq!(scene.transform_point(below, Point::new(101.0, 3.0)), Point::new(1.0, 3.0));
    }

    #[test]
    fn sorted_children_follow_z_then_sub_order_then_position() {
        let mut scene = Scene::new();
        let series = SeriesId::new("s");
        let late = scene.create_group(
            NodeOptions::default().with_z_sub_order(ZSubOrder::new(series.clone(), 5)),
        );
        let early = scene.create_group(
            NodeOptions::default().with_z_sub_order(ZSubOrder::new(series, 1)),
        );
        let top = scene.create_group(NodeOptions::default().with_z_index(1));
        for id in [top, late, early] {
            scene.append_child(scene.root(), id).expect("append");
        }
        assert_eq!(scene.sorted_children(scene.root()), vec![early, late, top]);
    }

    #[test]
    fn append_rejects_cycles_and_shape_kind_mismatch() {
        let mut scene = Scene::new();
        let outer = scene.create_group(NodeOptions::default());
        let inner = scene.create_group(NodeOptions::default());
        scene.append_child(outer, inner).expect("append");
        assert!(scene.append_child(inner, outer).is_err());

        let text = scene.create_node(NodeKind::Text);
        assert!(
            scene
                .set_shape(text, NodeShape::Marker(MarkerShape { x: 0.0, y: 0.0, size: 1.0 }))
                .is_err()
        );
        assert!(scene.append_child(text, inner).is_err());
    }
}
