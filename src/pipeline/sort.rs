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

use std::ops::Range;
use std::thread;

use super::partition;
use crate::resolver::PositionedObject;

/// Parallel merge sort by mean motion, ascending. The sequence is split into
/// contiguous shards with the same rule as the compute stage; one scoped
/// worker sorts each shard in place, and sorted neighbors are then merged
/// pairwise, concurrently, over as many rounds as it takes to get back to a
/// single segment. An odd trailing segment carries forward to the next round
/// untouched. One worker degenerates to a plain sort.
///
/// Mean motion is treated as a plain total-order key (`total_cmp`); ties are
/// broken arbitrarily in the shard sort, and the pairwise merge is stable.
pub fn sort_by_mean_motion(objects: &mut [PositionedObject], workers: usize) {
    if objects.len() < 2 {
        return;
    }

    let mut segments: Vec<Range<usize>> = partition(objects.len(), workers);

    thread::scope(|scope| {
        let mut rest = &mut *objects;
        let mut handles = Vec::with_capacity(segments.len());
        for segment in &segments {
            let (shard, tail) = std::mem::take(&mut rest).split_at_mut(segment.len());
            rest = tail;
            handles.push(scope.spawn(move || {
                shard.sort_unstable_by(|a, b| a.mean_motion.total_cmp(&b.mean_motion));
            }));
        }
        for handle in handles {
            handle.join().expect("shard sort worker panicked");
        }
    });

    while segments.len() > 1 {
        let mut merged = Vec::with_capacity(segments.len().div_ceil(2));

        thread::scope(|scope| {
            let mut rest = &mut *objects;
            let mut offset = 0;
            let mut handles = Vec::with_capacity(segments.len() / 2);
            for pair in segments.chunks(2) {
                if let [odd] = pair {
                    // Trailing segment with no partner this round.
                    merged.push(odd.clone());
                    continue;
                }
                let (left, right) = (&pair[0], &pair[1]);
                // Structural precondition of the whole scheme: segments are
                // contiguous and touching.
                assert_eq!(left.start, offset, "segment out of place");
                assert_eq!(left.end, right.start, "paired segments must touch");

                let (run, tail) = std::mem::take(&mut rest).split_at_mut(right.end - left.start);
                rest = tail;
                offset = right.end;

                let mid = left.len();
                handles.push(scope.spawn(move || merge_sorted_halves(run, mid)));
                merged.push(left.start..right.end);
            }
            for handle in handles {
                handle.join().expect("merge worker panicked");
            }
        });

        segments = merged;
    }

    debug_assert!(is_sorted_by_mean_motion(objects));
}

/// Stable in-place merge of `run[..mid]` and `run[mid..]`, both sorted. The
/// left run is buffered; the write cursor never catches up with the read
/// cursor of the right run, so the right run needs no copy.
fn merge_sorted_halves(run: &mut [PositionedObject], mid: usize) {
    debug_assert!(is_sorted_by_mean_motion(&run[..mid]));
    debug_assert!(is_sorted_by_mean_motion(&run[mid..]));

    if mid == 0 || mid == run.len() {
        return;
    }
    if run[mid - 1].mean_motion <= run[mid].mean_motion {
        return;
    }

    let left: Vec<PositionedObject> = run[..mid].to_vec();
    let mut take_left = 0;
    let mut take_right = mid;
    let mut write = 0;
    while take_left < left.len() {
        if take_right < run.len() && run[take_right].mean_motion < left[take_left].mean_motion {
            run.swap(write, take_right);
            take_right += 1;
        } else {
            run[write] = left[take_left].clone();
            take_left += 1;
        }
        write += 1;
    }
    // Whatever remains of the right run is already in place.
}

fn is_sorted_by_mean_motion(objects: &[PositionedObject]) -> bool {
    objects
        .windows(2)
        .all(|pair| pair[0].mean_motion <= pair[1].mean_motion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::positioned;
    use rand::seq::SliceRandom;
    use rand_pcg::Pcg64Mcg;

    fn batch(count: usize, seed: u64) -> Vec<PositionedObject> {
        let mut objects: Vec<_> = (0..count)
            .map(|i| {
                positioned(
                    &format!("SAT-{i}"),
                    13.0 + (i as f64) * 0.017,
                    53.0,
                    (i as f64 * 37.0) % 360.0 - 180.0,
                )
            })
            .collect();
        objects.shuffle(&mut Pcg64Mcg::new(seed as u128));
        objects
    }

    #[test]
    fn merge_is_stable_and_ordered() {
        let mut run = vec![
            positioned("LEFT-A", 1.0, 0.0, 0.0),
            positioned("LEFT-B", 2.0, 0.0, 0.0),
            positioned("RIGHT-C", 1.0, 0.0, 0.0),
            positioned("RIGHT-D", 2.0, 0.0, 0.0),
        ];
        merge_sorted_halves(&mut run, 2);
        let names: Vec<_> = run.iter().map(|object| object.name()).collect();
        assert_eq!(names, ["LEFT-A", "RIGHT-C", "LEFT-B", "RIGHT-D"]);
    }

    #[test]
    fn merge_handles_disjoint_ranges() {
        // Entire right run below the left run.
        let mut run = vec![
            positioned("L1", 10.0, 0.0, 0.0),
            positioned("L2", 11.0, 0.0, 0.0),
            positioned("R1", 1.0, 0.0, 0.0),
            positioned("R2", 2.0, 0.0, 0.0),
            positioned("R3", 3.0, 0.0, 0.0),
        ];
        merge_sorted_halves(&mut run, 2);
        let names: Vec<_> = run.iter().map(|object| object.name()).collect();
        assert_eq!(names, ["R1", "R2", "R3", "L1", "L2"]);
    }

    #[test]
    fn merge_of_empty_half_is_a_no_op() {
        let mut run = vec![positioned("ONLY", 1.0, 0.0, 0.0)];
        merge_sorted_halves(&mut run, 0);
        merge_sorted_halves(&mut run, 1);
        assert_eq!(run[0].name(), "ONLY");
    }

    #[test]
    fn sorts_like_the_standard_sort() {
        for workers in [1, 2, 3, 4, 7, 16] {
            let mut objects = batch(101, 0xdead_beef);
            let mut expected: Vec<f64> = objects.iter().map(|o| o.mean_motion).collect();
            expected.sort_unstable_by(f64::total_cmp);

            sort_by_mean_motion(&mut objects, workers);

            let sorted: Vec<f64> = objects.iter().map(|o| o.mean_motion).collect();
            assert_eq!(sorted, expected, "workers = {workers}");
        }
    }

    #[test]
    fn output_is_a_permutation_of_the_input() {
        let mut objects = batch(64, 42);
        let mut names_before: Vec<_> =
            objects.iter().map(|o| o.name().to_string()).collect();
        names_before.sort();

        sort_by_mean_motion(&mut objects, 5);

        let mut names_after: Vec<_> = objects.iter().map(|o| o.name().to_string()).collect();
        names_after.sort();
        assert_eq!(names_before, names_after);
    }

    #[test]
    fn odd_segment_counts_converge() {
        // Seven shards: rounds of 7 -> 4 -> 2 -> 1 segments.
        let mut objects = batch(70, 7);
        sort_by_mean_motion(&mut objects, 7);
        assert!(is_sorted_by_mean_motion(&objects));
    }

    #[test]
    fn tiny_inputs() {
        let mut empty: Vec<PositionedObject> = Vec::new();
        sort_by_mean_motion(&mut empty, 4);

        let mut one = vec![positioned("ONE", 1.0, 0.0, 0.0)];
        sort_by_mean_motion(&mut one, 4);
        assert_eq!(one[0].name(), "ONE");

        let mut two = vec![
            positioned("HIGH", 2.0, 0.0, 0.0),
            positioned("LOW", 1.0, 0.0, 0.0),
        ];
        sort_by_mean_motion(&mut two, 4);
        assert_eq!(two[0].name(), "LOW");
    }

    #[test]
    fn more_workers_than_objects() {
        let mut objects = batch(3, 3);
        sort_by_mean_motion(&mut objects, 32);
        assert!(is_sorted_by_mean_motion(&objects));
    }
}
