use std::rc::Rc;

use cartesian_series::core::{
    AxisDirection, ChartAxis, ItemId, LabelDatum, NodeDataContext, NodePoint, SeriesId,
    SeriesNodeDatum,
};
use cartesian_series::error::SeriesResult;
use cartesian_series::interaction::ChartHighlightState;
use cartesian_series::render::Scene;
use cartesian_series::series::{
    CartesianSeries, LabelSelection, NodeDataInput, NodeSelection, PathNodesUpdate, PathsUpdate,
    SeriesFeature, SeriesHooks, SeriesIdx, SeriesOpts,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
    Paths,
    PathNodes,
    DatumSelection,
    DatumNodes,
    LabelSelection,
    LabelNodes,
    MarkerSelection,
    MarkerNodes,
}

const SELECTION_HOOKS: [Hook; 4] = [
    Hook::Paths,
    Hook::DatumSelection,
    Hook::LabelSelection,
    Hook::MarkerSelection,
];
const NODE_HOOKS: [Hook; 4] = [
    Hook::PathNodes,
    Hook::DatumNodes,
    Hook::LabelNodes,
    Hook::MarkerNodes,
];

/// One context per item, each with one datum and one label. Records every
/// hook call made for a pooled sub-group.
struct RecordingHooks {
    items: Vec<ItemId>,
    selection_dirty: bool,
    node_data_builds: usize,
    calls: Vec<(Hook, usize)>,
}

impl RecordingHooks {
    fn new(items: &[&str]) -> Self {
        Self {
            items: items.iter().map(|item| ItemId::new(*item)).collect(),
            selection_dirty: false,
            node_data_builds: 0,
            calls: Vec::new(),
        }
    }

    fn record(&mut self, hook: Hook, series_idx: SeriesIdx) {
        if let Some(index) = series_idx.index() {
            self.calls.push((hook, index));
        }
    }

    fn count(&self, hook: Hook, index: usize) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == (hook, index))
            .count()
    }

    fn reset(&mut self) {
        self.node_data_builds = 0;
        self.calls.clear();
    }
}

impl SeriesHooks<usize> for RecordingHooks {
    fn create_node_data(
        &mut self,
        _input: &NodeDataInput<'_>,
    ) -> SeriesResult<Vec<NodeDataContext<usize>>> {
        self.node_data_builds += 1;
        Ok(self
            .items
            .iter()
            .enumerate()
            .map(|(index, item_id)| {
                let record = Rc::new(index);
                NodeDataContext::new(item_id.clone())
                    .with_node_data(vec![
                        SeriesNodeDatum::new(Rc::clone(&record))
                            .with_item_id(item_id.clone())
                            .with_point(NodePoint::new(10.0 * index as f64, 10.0, 4.0)),
                    ])
                    .with_label_data(vec![LabelDatum::new(record, "label", 0.0, 0.0)])
            })
            .collect())
    }

    fn update_paths(&mut self, scene: &mut Scene, update: PathsUpdate<'_, usize>) -> SeriesResult<()> {
        self.record(Hook::Paths, update.series_idx);
        for path in update.paths {
            scene.set_visible(*path, false)?;
        }
        Ok(())
    }

    fn update_path_nodes(
        &mut self,
        _scene: &mut Scene,
        update: PathNodesUpdate<'_>,
    ) -> SeriesResult<()> {
        self.record(Hook::PathNodes, update.series_idx);
        Ok(())
    }

    fn update_datum_selection(
        &mut self,
        _scene: &mut Scene,
        _node_data: &[SeriesNodeDatum<usize>],
        selection: NodeSelection<usize>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<NodeSelection<usize>> {
        self.record(Hook::DatumSelection, series_idx);
        Ok(selection)
    }

    fn update_datum_nodes(
        &mut self,
        _scene: &mut Scene,
        _selection: &NodeSelection<usize>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        self.record(Hook::DatumNodes, series_idx);
        Ok(())
    }

    fn update_marker_selection(
        &mut self,
        scene: &mut Scene,
        node_data: &[SeriesNodeDatum<usize>],
        selection: NodeSelection<usize>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<NodeSelection<usize>> {
        self.record(Hook::MarkerSelection, series_idx);
        selection.update(scene, node_data.to_vec())
    }

    fn update_marker_nodes(
        &mut self,
        _scene: &mut Scene,
        _selection: &NodeSelection<usize>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        self.record(Hook::MarkerNodes, series_idx);
        Ok(())
    }

    fn update_label_selection(
        &mut self,
        scene: &mut Scene,
        label_data: &[LabelDatum<usize>],
        selection: LabelSelection<usize>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<LabelSelection<usize>> {
        self.record(Hook::LabelSelection, series_idx);
        selection.update(scene, label_data.to_vec())
    }

    fn update_label_nodes(
        &mut self,
        _scene: &mut Scene,
        _selection: &LabelSelection<usize>,
        series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        self.record(Hook::LabelNodes, series_idx);
        Ok(())
    }

    fn item_ids(&self) -> Vec<ItemId> {
        self.items.clone()
    }

    fn is_path_or_selection_dirty(&self) -> bool {
        self.selection_dirty
    }
}

fn build(items: &[&str]) -> (Scene, CartesianSeries<usize, RecordingHooks>) {
    let mut scene = Scene::new();
    let root = scene.root();
    let mut series = CartesianSeries::new(
        &mut scene,
        root,
        SeriesId::new("gate"),
        SeriesOpts::default().with_feature(SeriesFeature::Markers),
        RecordingHooks::new(items),
    )
    .expect("series init");
    series.set_axes(
        ChartAxis::linear(AxisDirection::X, 0.0, 100.0, (0.0, 100.0)).expect("x axis"),
        ChartAxis::linear(AxisDirection::Y, 0.0, 100.0, (0.0, 100.0)).expect("y axis"),
    );
    series
        .update(&mut scene, &ChartHighlightState::new())
        .expect("first update");
    (scene, series)
}

#[test]
fn first_update_runs_every_hook_once_per_sub_group() {
    let (_scene, series) = build(&["a", "b"]);
    let hooks = series.hooks();

    assert_eq!(hooks.node_data_builds, 1);
    for index in 0..2 {
        for hook in SELECTION_HOOKS.into_iter().chain(NODE_HOOKS) {
            assert_eq!(hooks.count(hook, index), 1, "{hook:?} for sub-group {index}");
        }
    }
}

#[test]
fn idle_update_skips_node_data_and_selection_hooks() {
    let (mut scene, mut series) = build(&["a", "b"]);
    series.hooks_mut().reset();

    series
        .update(&mut scene, &ChartHighlightState::new())
        .expect("idle update");

    let hooks = series.hooks();
    assert_eq!(hooks.node_data_builds, 0);
    for index in 0..2 {
        for hook in SELECTION_HOOKS {
            assert_eq!(hooks.count(hook, index), 0, "{hook:?} for sub-group {index}");
        }
        for hook in NODE_HOOKS {
            assert_eq!(hooks.count(hook, index), 1, "{hook:?} for sub-group {index}");
        }
    }
}

#[test]
fn dirty_selections_rerun_selection_hooks_without_rebuilding_node_data() {
    let (mut scene, mut series) = build(&["a", "b"]);
    series.hooks_mut().reset();
    series.hooks_mut().selection_dirty = true;

    series
        .update(&mut scene, &ChartHighlightState::new())
        .expect("dirty update");

    let hooks = series.hooks();
    assert_eq!(hooks.node_data_builds, 0);
    assert!(!series.is_node_data_stale());
    for index in 0..2 {
        for hook in SELECTION_HOOKS {
            assert_eq!(hooks.count(hook, index), 1, "{hook:?} for sub-group {index}");
        }
    }
    assert_eq!(series.sub_groups().len(), 2);
}

#[test]
fn hidden_sub_group_skips_node_hooks() {
    let (mut scene, mut series) = build(&["a", "b"]);
    series.toggle_series_item(&ItemId::new("b"), false);
    series.hooks_mut().reset();

    series
        .update(&mut scene, &ChartHighlightState::new())
        .expect("update");

    let hooks = series.hooks();
    assert_eq!(hooks.node_data_builds, 1);
    for hook in NODE_HOOKS {
        assert_eq!(hooks.count(hook, 0), 1, "{hook:?} for the visible sub-group");
        assert_eq!(hooks.count(hook, 1), 0, "{hook:?} for the hidden sub-group");
    }
    // The selection pass still covers hidden sub-groups.
    for hook in SELECTION_HOOKS {
        assert_eq!(hooks.count(hook, 1), 1, "{hook:?} for the hidden sub-group");
    }
    let hidden = series.sub_groups().get(1).expect("hidden").group();
    assert!(!scene.is_rendered(hidden));
}
