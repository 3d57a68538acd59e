use std::collections::VecDeque;
use std::hash::Hash;

use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::error::SeriesResult;
use crate::render::{NodeId, NodeKind, Scene};

/// Node creation/destruction performed by the most recent reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionChanges {
    pub created: usize,
    pub removed: usize,
    pub reused: usize,
}

impl SelectionChanges {
    #[must_use]
    pub fn is_structural(self) -> bool {
        self.created > 0 || self.removed > 0
    }
}

/// Persistent binding between an ordered data sequence and owned scene nodes.
///
/// All nodes share one `NodeKind` and live directly under `container`.
/// `nodes[i]` renders `data[i]`.
#[derive(Debug)]
pub struct Selection<T> {
    container: NodeId,
    kind: NodeKind,
    nodes: Vec<NodeId>,
    data: Vec<T>,
    last_changes: SelectionChanges,
}

impl<T> Selection<T> {
    /// Empty selection of `kind` nodes under `container`.
    #[must_use]
    pub fn select_all(container: NodeId, kind: NodeKind) -> Self {
        Self {
            container,
            kind,
            nodes: Vec::new(),
            data: Vec::new(),
            last_changes: SelectionChanges::default(),
        }
    }

    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
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
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[must_use]
    pub fn last_changes(&self) -> SelectionChanges {
        self.last_changes
    }

    /// `(node, datum)` pairs in data order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.nodes.iter().copied().zip(self.data.iter())
    }

    #[must_use]
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|id| *id == node)
    }

    #[must_use]
    pub fn datum_of(&self, node: NodeId) -> Option<&T> {
        self.index_of(node).and_then(|index| self.data.get(index))
    }

    /// Moves the handle out, leaving an empty selection on the same container.
    ///
    /// Used to pass ownership through update hooks that re-issue selections.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            container: self.container,
            kind: self.kind,
            nodes: std::mem::take(&mut self.nodes),
            data: std::mem::take(&mut self.data),
            last_changes: self.last_changes,
        }
    }

    /// Positional reconciliation: node `i` is reused for `data[i]` when it
    /// already exists, extra nodes are released from the tail and missing
    /// ones are appended.
    pub fn update(mut self, scene: &mut Scene, data: Vec<T>) -> SeriesResult<Self> {
        let keep = self.nodes.len().min(data.len());
        let mut changes = SelectionChanges {
            reused: keep,
            ..SelectionChanges::default()
        };

        for node in self.nodes.split_off(keep) {
            release_owned(scene, node)?;
            changes.removed += 1;
        }
        while self.nodes.len() < data.len() {
            let node = scene.create_node(self.kind);
            scene.append_child(self.container, node)?;
            self.nodes.push(node);
            changes.created += 1;
        }

        self.data = data;
        self.last_changes = changes;
        trace!(
            container = %self.container,
            created = changes.created,
            removed = changes.removed,
            "reconcile selection"
        );
        Ok(self)
    }

    /// Keyed reconciliation: a node whose key persists anywhere in the new
    /// sequence is reused and moved into the new position. Duplicate keys are
    /// matched in order of appearance.
    pub fn update_keyed<K, F>(mut self, scene: &mut Scene, data: Vec<T>, key: F) -> SeriesResult<Self>
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut previous: IndexMap<K, VecDeque<NodeId>> = IndexMap::new();
        for (node, datum) in self.nodes.drain(..).zip(self.data.iter()) {
            previous.entry(key(datum)).or_default().push_back(node);
        }

        let mut changes = SelectionChanges::default();
        let mut nodes = Vec::with_capacity(data.len());
        for datum in &data {
            let reused = previous
                .get_mut(&key(datum))
                .and_then(|queue| queue.pop_front());
            let node = match reused {
                Some(node) => {
                    changes.reused += 1;
                    node
                }
                None => {
                    changes.created += 1;
                    scene.create_node(self.kind)
                }
            };
            // Re-appending keeps child order aligned with data order.
            scene.append_child(self.container, node)?;
            nodes.push(node);
        }

        for node in previous.into_values().flatten() {
            release_owned(scene, node)?;
            changes.removed += 1;
        }

        self.nodes = nodes;
        self.data = data;
        self.last_changes = changes;
        trace!(
            container = %self.container,
            created = changes.created,
            removed = changes.removed,
            reused = changes.reused,
            "reconcile keyed selection"
        );
        Ok(self)
    }
}

fn release_owned(scene: &mut Scene, node: NodeId) -> SeriesResult<()> {
    if scene.contains(node) {
        scene.release(node)?;
    } else {
        warn!(node = %node, "selection referenced a node already released from the scene");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Selection;
    use crate::render::{NodeKind, NodeOptions, Scene};

    #[test]
    fn positional_update_reuses_prefix_and_trims_tail() {
        let mut scene = Scene::new();
        let container = scene.create_group(NodeOptions::default());
        let selection = Selection::select_all(container, NodeKind::Marker)
            .update(&mut scene, vec![1, 2, 3])
            .expect("grow");
        let first = selection.nodes().to_vec();

        let selection = selection.update(&mut scene, vec![7, 8]).expect("shrink");
        assert_eq!(selection.nodes(), &first[..2]);
        assert_eq!(selection.last_changes().removed, 1);
        assert!(!scene.contains(first[2]));
        assert_eq!(selection.datum_of(first[1]), Some(&8));

        let selection = selection.update(&mut scene, vec![7, 8]).expect("idle");
        assert!(!selection.last_changes().is_structural());
    }

    #[test]
    fn keyed_update_follows_moved_keys() {
        let mut scene = Scene::new();
        let container = scene.create_group(NodeOptions::default());
        let selection = Selection::select_all(container, NodeKind::Text)
            .update_keyed(&mut scene, vec!["a", "b", "c"], |d| *d)
            .expect("init");
        let before = selection.nodes().to_vec();

        let selection = selection
            .update_keyed(&mut scene, vec!["c", "a", "d"], |d| *d)
            .expect("reorder");
        assert_eq!(selection.nodes()[0], before[2]);
        assert_eq!(selection.nodes()[1], before[0]);
        assert_eq!(selection.last_changes().created, 1);
        assert_eq!(selection.last_changes().removed, 1);
        assert!(!scene.contains(before[1]));
        assert_eq!(
            scene.node(container).expect("container").children(),
            selection.nodes()
        );
    }

    #[test]
    fn take_leaves_empty_handle_on_same_container() {
        let mut scene = Scene::new();
        let container = scene.create_group(NodeOptions::default());
        let mut selection = Selection::select_all(container, NodeKind::Marker)
            .update(&mut scene, vec![1])
            .expect("grow");
        let taken = selection.take();
        assert_eq!(taken.len(), 1);
        assert!(selection.is_empty());
        assert_eq!(selection.container(), container);
    }
}
