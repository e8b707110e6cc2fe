/*
    Sattrain, parallel satellite train detection
    Copyright (C) 2024 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! Groups the sorted objects into trains: a single linear scan closes a
//! candidate group whenever the next object jumps in mean motion or
//! inclination, and a quadratic post-pass coalesces groups whose leading
//! mean motions nearly coincide. Satellites of a train share an orbital
//! shell but are spread along it, so membership is decided in element space
//! and the longitude sort only orders the report.

use log::debug;

use crate::resolver::PositionedObject;

/// Near-equality tolerances for the grouping scan. These are empirical
/// thresholds on element scalars, not physical distances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainConfig {
    /// Maximum mean-motion step (rev/day) between consecutive members.
    pub motion_tolerance: f64,
    /// Maximum inclination step (deg) between consecutive members.
    pub inclination_tolerance: f64,
    /// Trains whose leading mean motions differ by less than this coalesce.
    pub coalesce_tolerance: f64,
    /// Smallest surviving train. Historical revisions of this filter
    /// disagreed between 3 and 4; both are reachable through this knob.
    pub min_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            motion_tolerance: 1e-4,
            inclination_tolerance: 1e-4,
            coalesce_tolerance: 1e-3,
            min_size: 4,
        }
    }
}

/// An ordered group of objects flying the same shell, reported sorted by
/// longitude. No identity beyond its member list.
#[derive(Clone, Debug, Default)]
pub struct Train {
    pub members: Vec<PositionedObject>,
}

impl Train {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The member the coalescing pass compares trains by.
    pub fn lead(&self) -> &PositionedObject {
        &self.members[0]
    }

    fn sort_by_longitude(&mut self) {
        self.members
            .sort_by(|a, b| a.longitude_deg.total_cmp(&b.longitude_deg));
    }
}

/// One pass over the mean-motion-sorted sequence, then coalescing.
///
/// The scan tracks the previous object's mean motion and inclination
/// (starting from zero, so the very first object always opens a fresh
/// candidate); a step beyond either tolerance closes the current candidate.
/// Candidates below `min_size` are discarded at close, uniformly for
/// mid-scan closes and the final flush.
pub fn build_trains(sorted: Vec<PositionedObject>, config: &TrainConfig) -> Vec<Train> {
    let mut trains: Vec<Train> = Vec::new();
    let mut candidate: Vec<PositionedObject> = Vec::new();
    let mut prev_mean_motion = 0.0_f64;
    let mut prev_inclination = 0.0_f64;

    for object in sorted {
        let delta_motion = (object.mean_motion - prev_mean_motion).abs();
        let delta_inclination = (object.inclination_deg - prev_inclination).abs();
        if (delta_motion > config.motion_tolerance
            || delta_inclination > config.inclination_tolerance)
            && !candidate.is_empty()
        {
            close_candidate(&mut candidate, &mut trains, config);
        }
        prev_mean_motion = object.mean_motion;
        prev_inclination = object.inclination_deg;
        candidate.push(object);
    }
    close_candidate(&mut candidate, &mut trains, config);

    coalesce(&mut trains, config);

    // Splicing during coalescing concatenates member lists; restore the
    // within-train longitude order for the report.
    for train in &mut trains {
        train.sort_by_longitude();
    }
    trains
}

fn close_candidate(
    candidate: &mut Vec<PositionedObject>,
    trains: &mut Vec<Train>,
    config: &TrainConfig,
) {
    if candidate.is_empty() {
        return;
    }
    let mut train = Train {
        members: std::mem::take(candidate),
    };
    train.sort_by_longitude();
    if train.len() >= config.min_size {
        trains.push(train);
    } else {
        debug!("discarding undersized candidate of {} members", train.len());
    }
}

/// Merges trains whose *leading* members' mean motions nearly coincide. The
/// lead is whatever the longitude sort left in front when the train closed,
/// so this comparison is deliberately as arbitrary as the original behavior
/// it reproduces; all comparisons run before any train is re-sorted.
fn coalesce(trains: &mut Vec<Train>, config: &TrainConfig) {
    let mut i = 0;
    while i < trains.len() {
        let mut j = i + 1;
        while j < trains.len() {
            let delta = (trains[i].lead().mean_motion - trains[j].lead().mean_motion).abs();
            if delta < config.coalesce_tolerance {
                let tail = trains.remove(j);
                trains[i].members.extend(tail.members);
                // Retry the same index: the next train shifted into it.
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::positioned;

    fn longitudes(train: &Train) -> Vec<f64> {
        train.members.iter().map(|m| m.longitude_deg).collect()
    }

    #[test]
    fn groups_similar_neighbors_and_drops_the_outlier() {
        let sorted = vec![
            positioned("A", 15.05000, 53.05000, 40.0),
            positioned("B", 15.05002, 53.05001, -10.0),
            positioned("C", 15.05004, 53.05003, 170.0),
            positioned("D", 15.05005, 53.05004, 0.0),
            positioned("OUTLIER", 16.05005, 53.05004, 10.0),
        ];
        let trains = build_trains(sorted, &TrainConfig::default());

        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].len(), 4);
        assert!(trains[0].members.iter().all(|m| m.name() != "OUTLIER"));
        assert_eq!(longitudes(&trains[0]), vec![-10.0, 0.0, 40.0, 170.0]);
    }

    #[test]
    fn undersized_groups_are_discarded() {
        let sorted = vec![
            positioned("A", 15.05000, 53.05, 0.0),
            positioned("B", 15.05002, 53.05, 1.0),
            positioned("C", 15.05004, 53.05, 2.0),
        ];
        assert!(build_trains(sorted, &TrainConfig::default()).is_empty());
    }

    #[test]
    fn min_size_is_configurable() {
        let sorted = vec![
            positioned("A", 15.05000, 53.05, 0.0),
            positioned("B", 15.05002, 53.05, 1.0),
            positioned("C", 15.05004, 53.05, 2.0),
        ];
        let config = TrainConfig {
            min_size: 3,
            ..Default::default()
        };
        let trains = build_trains(sorted, &config);
        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].len(), 3);
    }

    #[test]
    fn a_trailing_group_is_flushed_with_the_same_filter() {
        // The batch ends inside a valid group; the flush must keep it.
        let mut sorted = vec![positioned("LONER", 14.0, 51.0, 0.0)];
        for i in 0..5 {
            sorted.push(positioned(
                &format!("TAIL-{i}"),
                15.05 + i as f64 * 2e-5,
                53.05,
                i as f64 * 10.0,
            ));
        }
        let trains = build_trains(sorted, &TrainConfig::default());
        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].len(), 5);
    }

    #[test]
    fn inclination_jump_splits_a_motion_run() {
        // Same mean motion throughout, but two inclination shells. Each
        // shell has four members; the coalescing pass then rejoins them
        // because their leading mean motions coincide.
        let mut sorted = Vec::new();
        for i in 0..4 {
            sorted.push(positioned(&format!("LOW-{i}"), 15.05, 53.0, i as f64));
        }
        for i in 0..4 {
            sorted.push(positioned(&format!("HIGH-{i}"), 15.05, 70.0, i as f64));
        }
        let trains = build_trains(sorted, &TrainConfig::default());
        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].len(), 8);
    }

    #[test]
    fn nearby_trains_coalesce() {
        // Two well-formed groups 0.0005 rev/day apart: split by the scan
        // (step > 1e-4), rejoined by coalescing (lead delta < 1e-3).
        let mut sorted = Vec::new();
        for i in 0..4 {
            sorted.push(positioned(
                &format!("ALPHA-{i}"),
                15.0500 + i as f64 * 1e-5,
                53.05,
                i as f64 * 20.0 - 30.0,
            ));
        }
        for i in 0..4 {
            sorted.push(positioned(
                &format!("BETA-{i}"),
                15.0505 + i as f64 * 1e-5,
                53.05,
                i as f64 * 20.0 - 100.0,
            ));
        }
        let trains = build_trains(sorted, &TrainConfig::default());
        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].len(), 8);

        // Spliced members are re-sorted by longitude for the report.
        let lons = longitudes(&trains[0]);
        assert!(lons.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn distant_trains_stay_apart() {
        let mut sorted = Vec::new();
        for i in 0..4 {
            sorted.push(positioned(
                &format!("ALPHA-{i}"),
                15.05 + i as f64 * 1e-5,
                53.05,
                i as f64,
            ));
        }
        for i in 0..4 {
            sorted.push(positioned(
                &format!("BETA-{i}"),
                15.06 + i as f64 * 1e-5,
                53.05,
                i as f64,
            ));
        }
        let trains = build_trains(sorted, &TrainConfig::default());
        assert_eq!(trains.len(), 2);
        assert!(trains[0].lead().mean_motion < trains[1].lead().mean_motion);
    }

    #[test]
    fn no_surviving_train_pair_is_within_coalescing_range() {
        let mut sorted = Vec::new();
        for group in 0..5 {
            for i in 0..4 {
                sorted.push(positioned(
                    &format!("G{group}-{i}"),
                    15.0 + group as f64 * 7e-4 + i as f64 * 1e-5,
                    53.05,
                    i as f64,
                ));
            }
        }
        let config = TrainConfig::default();
        let trains = build_trains(sorted, &config);
        for (a, left) in trains.iter().enumerate() {
            for right in &trains[a + 1..] {
                assert!(
                    (left.lead().mean_motion - right.lead().mean_motion).abs()
                        >= config.coalesce_tolerance
                );
            }
        }
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(build_trains(Vec::new(), &TrainConfig::default()).is_empty());
    }
}
