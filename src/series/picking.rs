use ordered_float::OrderedFloat;
use tracing::trace;

use crate::core::{AxisDirection, Point, SeriesNodeDatum};
use crate::interaction::{PickMatch, PickMode, SeriesPickResult};
use crate::render::{NodeId, Scene};

use super::CartesianSeries;
use super::hooks::SeriesHooks;
use super::opts::PickGroupInclude;
use super::sub_group::SubGroup;

impl<D, H: SeriesHooks<D>> CartesianSeries<D, H> {
    /// Tries the configured pick modes in order and returns the first match.
    ///
    /// `limit` restricts the attempt to the listed modes without changing
    /// their configured order.
    #[must_use]
    pub fn pick_node(
        &self,
        scene: &Scene,
        point: Point,
        limit: Option<&[PickMode]>,
    ) -> Option<SeriesPickResult<D>> {
        let root_visible = scene.node(self.root_group).is_some_and(|node| node.visible());
        if !self.visible || !root_visible {
            return None;
        }

        for mode in &self.opts.pick_modes {
            if limit.is_some_and(|allowed| !allowed.contains(mode)) {
                continue;
            }
            let found = match mode {
                PickMode::ExactShapeMatch => self.pick_node_exact_shape(scene, point),
                PickMode::NearestNode => self.pick_node_closest_datum(scene, point),
                PickMode::NearestByMainAxisFirst => {
                    self.pick_node_main_axis_first(scene, point, false)
                }
                PickMode::NearestByMainCategoryAxisFirst => {
                    self.pick_node_main_axis_first(scene, point, true)
                }
            };
            if let Some(found) = found {
                trace!(series = %self.id, mode = ?mode, distance = found.distance, "pick hit");
                return Some(SeriesPickResult {
                    pick_mode: *mode,
                    datum: found.datum,
                    distance: found.distance,
                });
            }
        }
        None
    }

    /// Datum whose rendered shape contains `point`, at distance 0.
    ///
    /// Datum nodes anywhere under the content group are tried first, then
    /// each sub-group's pick group and, when markers take part in picking,
    /// its marker group. Hits on nodes not bound to a datum are ignored.
    #[must_use]
    pub fn pick_node_exact_shape(&self, scene: &Scene, point: Point) -> Option<PickMatch<D>> {
        let exact = |datum: &SeriesNodeDatum<D>| PickMatch {
            datum: datum.clone(),
            distance: 0.0,
        };

        if let Some(node) = scene.pick_node(self.content_group, point) {
            if let Some(datum) = self
                .pool
                .iter()
                .find_map(|sub_group| sub_group.datum_selection.datum_of(node))
            {
                return Some(exact(datum));
            }
        }

        let markers_pickable = self.opts.includes(PickGroupInclude::Markers);
        for sub_group in self.pool.iter() {
            if let Some(datum) = scene
                .pick_node(sub_group.pick_group, point)
                .and_then(|node| bound_datum(sub_group, node))
            {
                return Some(exact(datum));
            }
            if !markers_pickable {
                continue;
            }
            if let Some(datum) = sub_group
                .marker_group
                .and_then(|marker_group| scene.pick_node(marker_group, point))
                .and_then(|node| bound_datum(sub_group, node))
            {
                return Some(exact(datum));
            }
        }
        None
    }

    /// Closest in-range datum by Euclidean distance.
    ///
    /// The reported distance is measured to the datum's marker edge and is
    /// never negative. Ties keep the first datum encountered.
    #[must_use]
    pub fn pick_node_closest_datum(&self, scene: &Scene, point: Point) -> Option<PickMatch<D>> {
        let (x_axis, y_axis) = (self.x_axis.as_ref()?, self.y_axis.as_ref()?);
        let hit = scene.transform_point(self.root_group, point);

        let mut min_distance = f64::INFINITY;
        let mut closest: Option<&SeriesNodeDatum<D>> = None;
        for datum in self.pickable_data() {
            let Some(datum_point) = datum.point else {
                continue;
            };
            if !(x_axis.in_range(datum_point.x) && y_axis.in_range(datum_point.y)) {
                continue;
            }
            let distance = hit.distance_squared(datum_point.position()).max(0.0);
            if distance < min_distance {
                min_distance = distance;
                closest = Some(datum);
            }
        }

        closest.map(|datum| PickMatch {
            distance: (min_distance.sqrt() - datum.size()).max(0.0),
            datum: datum.clone(),
        })
    }

    /// Closest in-range datum along the primary axis, ties resolved on the
    /// secondary axis.
    ///
    /// The primary axis is the first category axis (x before y), or x when
    /// neither is categorical. With `require_category_axis` set and no
    /// category axis, nothing is picked.
    #[must_use]
    pub fn pick_node_main_axis_first(
        &self,
        scene: &Scene,
        point: Point,
        require_category_axis: bool,
    ) -> Option<PickMatch<D>> {
        let (x_axis, y_axis) = (self.x_axis.as_ref()?, self.y_axis.as_ref()?);
        let category_direction = [x_axis, y_axis]
            .into_iter()
            .find(|axis| axis.is_category())
            .map(|axis| axis.direction());
        if require_category_axis && category_direction.is_none() {
            return None;
        }
        let primary = category_direction.unwrap_or(AxisDirection::X);
        let split = |p: Point| match primary {
            AxisDirection::X => (p.x, p.y),
            AxisDirection::Y => (p.y, p.x),
        };

        let hit = scene.transform_point(self.root_group, point);
        let (hit_primary, hit_secondary) = split(hit);

        let mut best: Option<((OrderedFloat<f64>, OrderedFloat<f64>), &SeriesNodeDatum<D>)> = None;
        for datum in self.pickable_data() {
            let Some(datum_point) = datum.point else {
                continue;
            };
            if !(x_axis.in_range(datum_point.x) && y_axis.in_range(datum_point.y)) {
                continue;
            }
            let (datum_primary, datum_secondary) = split(datum_point.position());
            let key = (
                OrderedFloat((datum_primary - hit_primary).abs()),
                OrderedFloat((datum_secondary - hit_secondary).abs()),
            );
            if best.as_ref().is_none_or(|(best_key, _)| key < *best_key) {
                best = Some((key, datum));
            }
        }

        best.map(|((primary_gap, secondary_gap), datum)| PickMatch {
            distance: (primary_gap.0.hypot(secondary_gap.0) - datum.size()).max(0.0),
            datum: datum.clone(),
        })
    }

    fn pickable_data(&self) -> impl Iterator<Item = &SeriesNodeDatum<D>> + '_ {
        self.context_node_data
            .iter()
            .flat_map(|context| context.node_data.iter())
    }
}

fn bound_datum<D>(sub_group: &SubGroup<D>, node: NodeId) -> Option<&SeriesNodeDatum<D>> {
    sub_group.datum_selection.datum_of(node).or_else(|| {
        sub_group
            .marker_selection
            .as_ref()
            .and_then(|selection| selection.datum_of(node))
    })
}
