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

/*! # sattrain

Detects satellite "trains" (freshly launched constellation batches still flying
in formation) from a batch of three-line element sets. Every record is
propagated to a single shared reference instant on a pool of OS threads, the
resolved positions are sorted by mean motion with a parallel merge sort, and a
sequential proximity scan groups neighbors in (mean motion, inclination) space
into trains, reported sorted by longitude.
*/

/// Ingestion of three-line element sets and fixed-column field extraction.
pub mod elements;

mod errors;
pub use self::errors::SattrainError;

/// The parallel compute and sort stages, and the pipeline orchestrator.
pub mod pipeline;

/// Renders the final train list as text or CSV.
pub mod report;

/// The position resolution seam: from an element record and an instant to a geographic position.
pub mod resolver;

/// Groups the sorted objects into trains and coalesces near-duplicates.
pub mod trains;

pub use self::elements::ElementRecord;
pub use self::pipeline::TrainPipeline;
pub use self::resolver::{PositionResolver, PositionedObject, ResolvedPosition};
pub use self::trains::{Train, TrainConfig};
