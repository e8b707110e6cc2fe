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

use std::thread;

use hifitime::Epoch;
use log::debug;

use super::partition;
use crate::elements::ElementRecord;
use crate::resolver::{PositionResolver, PositionedObject};

/// Result of the parallel compute stage. No ordering is guaranteed across
/// shard boundaries.
#[derive(Clone, Debug, Default)]
pub struct ComputeOutcome {
    pub positioned: Vec<PositionedObject>,
    /// Records whose resolution failed; they are absent from `positioned`.
    pub dropped: usize,
}

/// Resolves every record at the shared reference instant, one scoped worker
/// per contiguous shard. Workers accumulate into task-local vectors and hand
/// them back by value through their join handle; the calling thread blocks
/// until every worker is done and concatenates. Resolution failures are
/// dropped, not propagated.
pub fn compute_positions<R: PositionResolver + ?Sized>(
    records: &[ElementRecord],
    resolver: &R,
    epoch: Epoch,
    workers: usize,
) -> ComputeOutcome {
    let shards = partition(records.len(), workers);
    let mut outcome = ComputeOutcome {
        positioned: Vec::with_capacity(records.len()),
        dropped: 0,
    };

    thread::scope(|scope| {
        let handles: Vec<_> = shards
            .into_iter()
            .map(|shard| {
                scope.spawn(move || {
                    let mut local = Vec::with_capacity(shard.len());
                    let mut dropped = 0;
                    for record in &records[shard] {
                        match resolver
                            .resolve(epoch, record)
                            .and_then(|resolved| PositionedObject::new(record.clone(), &resolved))
                        {
                            Ok(object) => local.push(object),
                            Err(error) => {
                                debug!("dropping `{}`: {error}", record.name);
                                dropped += 1;
                            }
                        }
                    }
                    (local, dropped)
                })
            })
            .collect();

        for handle in handles {
            let (local, dropped) = handle.join().expect("compute worker panicked");
            outcome.positioned.extend(local);
            outcome.dropped += dropped;
        }
    });

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::record_with_elements;
    use crate::resolver::{ResolveError, ResolvedPosition};
    use hifitime::Duration;

    /// Succeeds with a fixed position unless the record name starts with `FAIL`.
    struct StubResolver;

    impl PositionResolver for StubResolver {
        fn resolve(
            &self,
            _epoch: Epoch,
            record: &ElementRecord,
        ) -> Result<ResolvedPosition, ResolveError> {
            if record.name.starts_with("FAIL") {
                return Err(ResolveError::Propagation {
                    name: record.name.clone(),
                    details: "stubbed failure".to_string(),
                });
            }
            Ok(ResolvedPosition {
                age: Duration::ZERO,
                latitude_deg: 10.0,
                longitude_deg: 20.0,
                altitude_km: 550.0,
            })
        }
    }

    fn epoch() -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(2024, 1, 1)
    }

    #[test]
    fn caches_grouping_scalars_from_the_record() {
        let records = vec![record_with_elements("SAT-1", 53.05, 15.0543)];
        let outcome = compute_positions(&records, &StubResolver, epoch(), 2);
        assert_eq!(outcome.dropped, 0);
        let object = &outcome.positioned[0];
        assert_eq!(object.mean_motion, 15.0543);
        assert_eq!(object.inclination_deg, 53.05);
        assert_eq!(object.latitude_deg, 10.0);
        assert_eq!(object.record, records[0]);
    }

    #[test]
    fn every_record_is_resolved_exactly_once() {
        let records: Vec<_> = (0..37)
            .map(|i| record_with_elements(&format!("SAT-{i}"), 53.0, 15.0 + i as f64 * 0.01))
            .collect();
        for workers in [1, 2, 3, 8, 64] {
            let outcome = compute_positions(&records, &StubResolver, epoch(), workers);
            assert_eq!(outcome.positioned.len(), 37, "workers = {workers}");
            assert_eq!(outcome.dropped, 0);
            let mut names: Vec<_> = outcome
                .positioned
                .iter()
                .map(|object| object.name().to_string())
                .collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), 37, "workers = {workers}");
        }
    }

    #[test]
    fn failed_resolutions_are_dropped_silently() {
        let mut records = vec![
            record_with_elements("SAT-A", 53.0, 15.05),
            record_with_elements("FAIL-B", 53.0, 15.05),
            record_with_elements("SAT-C", 53.0, 15.05),
            record_with_elements("FAIL-D", 53.0, 15.05),
        ];
        records.push(record_with_elements("SAT-E", 53.0, 15.05));
        let outcome = compute_positions(&records, &StubResolver, epoch(), 3);
        assert_eq!(outcome.positioned.len(), 3);
        assert_eq!(outcome.dropped, 2);
        assert!(outcome
            .positioned
            .iter()
            .all(|object| !object.name().starts_with("FAIL")));
    }

    #[test]
    fn unparsable_scalars_also_drop_the_record() {
        // The resolver succeeds but the record's own columns are garbage.
        let mut record = record_with_elements("SAT-BROKEN", 53.0, 15.05);
        record.line2.replace_range(52..63, "xx.xxxxxxxx");
        let outcome = compute_positions(&[record], &StubResolver, epoch(), 1);
        assert!(outcome.positioned.is_empty());
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn empty_batch() {
        let outcome = compute_positions(&[], &StubResolver, epoch(), 4);
        assert!(outcome.positioned.is_empty());
        assert_eq!(outcome.dropped, 0);
    }
}
