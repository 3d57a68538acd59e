use std::rc::Rc;

use cartesian_series::core::{
    AxisDirection, ChartAxis, ItemId, LabelDatum, NodeDataContext, NodePoint, SeriesId,
    SeriesNodeDatum,
};
use cartesian_series::error::SeriesResult;
use cartesian_series::interaction::ChartHighlightState;
use cartesian_series::render::{NodeId, Scene};
use cartesian_series::series::{
    CartesianSeries, LabelSelection, NodeDataInput, PickGroupInclude, SeriesFeature, SeriesHooks,
    SeriesIdx, SeriesOpts,
};
use proptest::prelude::*;

/// Emits `contexts` contexts with one datum and one label each. Datum
/// selections keep the default hook and stay empty.
struct CountingHooks {
    contexts: usize,
}

impl SeriesHooks<usize> for CountingHooks {
    fn create_node_data(
        &mut self,
        _input: &NodeDataInput<'_>,
    ) -> SeriesResult<Vec<NodeDataContext<usize>>> {
        Ok((0..self.contexts)
            .map(|index| {
                let record = Rc::new(index);
                NodeDataContext::new(ItemId::new(format!("item-{index}")))
                    .with_node_data(vec![
                        SeriesNodeDatum::new(Rc::clone(&record))
                            .with_point(NodePoint::new(index as f64, 1.0, 4.0)),
                    ])
                    .with_label_data(vec![LabelDatum::new(record, "label", index as f64, 0.0)])
            })
            .collect())
    }

    fn update_label_selection(
        &mut self,
        scene: &mut Scene,
        label_data: &[LabelDatum<usize>],
        selection: LabelSelection<usize>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<LabelSelection<usize>> {
        selection.update(scene, label_data.to_vec())
    }

    fn update_label_nodes(
        &mut self,
        _scene: &mut Scene,
        _selection: &LabelSelection<usize>,
        _series_idx: SeriesIdx,
    ) -> SeriesResult<()> {
        Ok(())
    }
}

fn axes() -> (ChartAxis, ChartAxis) {
    (
        ChartAxis::linear(AxisDirection::X, 0.0, 100.0, (0.0, 100.0)).expect("x axis"),
        ChartAxis::linear(AxisDirection::Y, 0.0, 100.0, (0.0, 100.0)).expect("y axis"),
    )
}

fn build(opts: SeriesOpts) -> (Scene, CartesianSeries<usize, CountingHooks>) {
    let mut scene = Scene::new();
    let root = scene.root();
    let mut series = CartesianSeries::new(
        &mut scene,
        root,
        SeriesId::new("pool"),
        opts,
        CountingHooks { contexts: 0 },
    )
    .expect("series init");
    let (x_axis, y_axis) = axes();
    series.set_axes(x_axis, y_axis);
    (scene, series)
}

fn apply(scene: &mut Scene, series: &mut CartesianSeries<usize, CountingHooks>, len: usize) {
    series.hooks_mut().contexts = len;
    series.mark_node_data_dirty();
    series
        .update(scene, &ChartHighlightState::new())
        .expect("update");
}

fn groups(series: &CartesianSeries<usize, CountingHooks>) -> Vec<NodeId> {
    series.sub_groups().iter().map(|sub_group| sub_group.group()).collect()
}

#[test]
fn pool_grows_and_shrinks_from_the_tail() {
    let (mut scene, mut series) = build(SeriesOpts::default());

    apply(&mut scene, &mut series, 3);
    let before = groups(&series);
    assert_eq!(before.len(), 3);

    apply(&mut scene, &mut series, 1);
    assert_eq!(groups(&series), before[..1].to_vec());
    assert!(!scene.contains(before[1]));
    assert!(!scene.contains(before[2]));

    apply(&mut scene, &mut series, 2);
    let after = groups(&series);
    assert_eq!(after[0], before[0]);
    assert!(!before.contains(&after[1]));
}

#[test]
fn shrinking_releases_every_container_of_the_removed_sub_group() {
    let opts = SeriesOpts::default().with_feature(SeriesFeature::Markers);
    let (mut scene, mut series) = build(opts);
    let baseline = scene.len();

    apply(&mut scene, &mut series, 2);
    let removed = series.sub_groups().get(1).expect("second sub-group");
    let containers = [
        removed.group(),
        removed.pick_group(),
        removed.label_group(),
        removed.marker_group().expect("marker group"),
    ];
    let paths = removed.paths().to_vec();

    apply(&mut scene, &mut series, 1);
    for node in containers.iter().chain(paths.iter()) {
        assert!(!scene.contains(*node), "{node} should be released");
    }

    apply(&mut scene, &mut series, 0);
    assert_eq!(scene.len(), baseline);
}

#[test]
fn main_paths_live_in_the_pick_group_when_included() {
    let opts = SeriesOpts::default()
        .with_pick_group_includes([PickGroupInclude::MainPath])
        .with_paths_per_series(2)
        .with_paths_z_index_sub_order_offset(vec![0, 1_000]);
    let (mut scene, mut series) = build(opts);
    apply(&mut scene, &mut series, 1);

    let sub_group = series.sub_groups().get(0).expect("sub-group");
    assert_eq!(sub_group.paths().len(), 2);
    for path in sub_group.paths() {
        let parent = scene.node(*path).and_then(|node| node.parent());
        assert_eq!(parent, Some(sub_group.pick_group()));
    }
    let second = scene.node(sub_group.paths()[1]).expect("path");
    assert_eq!(second.z_sub_order().map(|order| order.order), Some(1_000));

    // Datum nodes fall back to the main group.
    assert_eq!(sub_group.datum_selection().container(), sub_group.group());
}

#[test]
fn container_names_follow_allocation_counter() {
    let opts = SeriesOpts::default().with_feature(SeriesFeature::Markers);
    let (mut scene, mut series) = build(opts);
    apply(&mut scene, &mut series, 1);

    let sub_group = series.sub_groups().get(0).expect("sub-group");
    let name = |id: NodeId| scene.node(id).and_then(|node| node.name()).map(str::to_owned);
    assert_eq!(name(sub_group.group()).as_deref(), Some("pool-series-sub0"));
    assert_eq!(
        name(sub_group.marker_group().expect("markers")).as_deref(),
        Some("pool-series-sub1-markers")
    );
    assert_eq!(name(sub_group.label_group()).as_deref(), Some("pool-series-sub2-labels"));
    assert_eq!(name(sub_group.pick_group()).as_deref(), Some("pool-series-sub3-pickGroup"));
}

proptest! {
    #[test]
    fn pool_length_tracks_latest_context_count(lengths in prop::collection::vec(0usize..6, 1..12)) {
        let (mut scene, mut series) = build(SeriesOpts::default());
        let baseline = scene.len();
        let mut previous: Vec<NodeId> = Vec::new();

        for len in lengths {
            apply(&mut scene, &mut series, len);
            let current = groups(&series);
            prop_assert_eq!(current.len(), len);

            // Surviving positions keep their containers.
            let kept = previous.len().min(len);
            prop_assert_eq!(&current[..kept], &previous[..kept]);

            // group, pick group, label group, one path and one label node.
            prop_assert_eq!(scene.len(), baseline + 5 * len);
            previous = current;
        }
    }
}
