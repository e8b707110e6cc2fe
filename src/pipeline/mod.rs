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

//! The batch pipeline: records are resolved to positions on a worker pool,
//! sorted by mean motion with a parallel merge sort, and handed to the
//! sequential train builder. Each stage joins all of its workers before the
//! next stage starts; a worker panic aborts the run.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::Instant;

use hifitime::Epoch;
use log::{info, warn};

use crate::elements::ElementRecord;
use crate::resolver::PositionResolver;
use crate::trains::{build_trains, Train, TrainConfig};

mod compute;
mod sort;

pub use self::compute::{compute_positions, ComputeOutcome};
pub use self::sort::sort_by_mean_motion;

/// Splits `[0, len)` into up to `workers` contiguous half-open shards: each of
/// size `len / workers`, with the final shard absorbing the remainder. When
/// `len < workers` the quotient is zero and the degenerate empty shards are
/// skipped, leaving a single shard with everything.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(workers >= 1, "worker count must be at least one");
    let chunk = len / workers;
    if chunk == 0 {
        return if len == 0 { Vec::new() } else { vec![0..len] };
    }
    (0..workers)
        .map(|w| {
            let start = w * chunk;
            let end = if w == workers - 1 { len } else { start + chunk };
            start..end
        })
        .collect()
}

/// Worker count to use when none is requested.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// One-shot batch pipeline: compute, sort, group. A worker count of one runs
/// every stage sequentially.
#[derive(Clone, Debug)]
pub struct TrainPipeline {
    pub workers: usize,
    /// The single instant every record of the batch is positioned at.
    pub epoch: Epoch,
    pub config: TrainConfig,
}

impl TrainPipeline {
    pub fn new(epoch: Epoch) -> Self {
        Self {
            workers: default_workers(),
            epoch,
            config: TrainConfig::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_config(mut self, config: TrainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run<R: PositionResolver + ?Sized>(
        &self,
        records: &[ElementRecord],
        resolver: &R,
    ) -> Vec<Train> {
        let start = Instant::now();
        let ComputeOutcome { positioned, dropped } =
            compute_positions(records, resolver, self.epoch, self.workers);
        info!(
            "resolved {}/{} records on {} workers in {:.1} ms",
            positioned.len(),
            records.len(),
            self.workers,
            start.elapsed().as_secs_f64() * 1e3,
        );
        if dropped > 0 {
            warn!("dropped {dropped} records that failed to resolve");
        }

        let mut positioned = positioned;
        let start = Instant::now();
        sort_by_mean_motion(&mut positioned, self.workers);
        info!(
            "sorted {} objects by mean motion in {:.1} ms",
            positioned.len(),
            start.elapsed().as_secs_f64() * 1e3,
        );

        let start = Instant::now();
        let trains = build_trains(positioned, &self.config);
        info!(
            "built {} trains in {:.1} ms",
            trains.len(),
            start.elapsed().as_secs_f64() * 1e3,
        );
        trains
    }
}
