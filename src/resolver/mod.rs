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

use hifitime::{Duration, Epoch};
use snafu::{ResultExt, Snafu};

use crate::elements::{ElementRecord, ElementsError};

pub(crate) mod geodesy;
mod sgp4;
mod site;

pub use self::sgp4::Sgp4Resolver;
pub use self::site::{GroundSite, LookAngle};

/// A resolution failure drops the record from the pipeline. The resolver is
/// deterministic for identical inputs, so nothing is ever retried.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResolveError {
    #[snafu(display("malformed element set for `{name}`: {source}"))]
    MalformedElements { name: String, source: ElementsError },
    #[snafu(display("element set `{name}` rejected: {details}"))]
    ElementsRejected { name: String, details: String },
    #[snafu(display("propagation failed for `{name}`: {details}"))]
    Propagation { name: String, details: String },
}

/// Geographic position of one object at the reference instant.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPosition {
    /// Signed duration from the record's element-set epoch to the reference instant.
    pub age: Duration,
    /// Geodetic latitude in degrees, south negative.
    pub latitude_deg: f64,
    /// Longitude in degrees, normalized to [-180, 180).
    pub longitude_deg: f64,
    /// Altitude above the reference ellipsoid in km.
    pub altitude_km: f64,
}

/// Converts one element record plus the shared reference instant into a
/// geographic position. Implementations must be pure: same inputs, same
/// output. The compute stage shares one resolver across all of its workers.
pub trait PositionResolver: Sync {
    fn resolve(&self, epoch: Epoch, record: &ElementRecord) -> Result<ResolvedPosition, ResolveError>;
}

/// One successfully resolved object: its source record, its geographic
/// position, and the two element scalars the train builder keeps comparing.
///
/// Only the sort stage moves these around; the content never changes after
/// construction.
#[derive(Clone, Debug)]
pub struct PositionedObject {
    pub record: ElementRecord,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    /// Mean motion in revolutions per day, cached from the record.
    pub mean_motion: f64,
    /// Inclination in degrees, cached from the record.
    pub inclination_deg: f64,
}

impl PositionedObject {
    pub fn new(record: ElementRecord, resolved: &ResolvedPosition) -> Result<Self, ResolveError> {
        let mean_motion = record.mean_motion().context(MalformedElementsSnafu {
            name: record.name.as_str(),
        })?;
        let inclination_deg = record.inclination_deg().context(MalformedElementsSnafu {
            name: record.name.as_str(),
        })?;
        Ok(Self {
            latitude_deg: resolved.latitude_deg,
            longitude_deg: resolved.longitude_deg,
            altitude_km: resolved.altitude_km,
            mean_motion,
            inclination_deg,
            record,
        })
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::PositionedObject;
    use crate::elements::ElementRecord;

    /// Builds a record whose element lines carry the given scalars in the
    /// proper fixed columns (checksums are not valid: for stub resolvers only).
    pub(crate) fn record_with_elements(name: &str, inclination_deg: f64, mean_motion: f64) -> ElementRecord {
        let line1 = "1 00001U 24001A   24001.00000000  .00000000  00000-0  00000-0 0    10";
        let line2 = format!(
            "2 00001 {inclination_deg:8.4} 000.0000 0000000 000.0000 000.0000 {mean_motion:11.8}    10"
        );
        ElementRecord::new(name, line1, line2)
    }

    pub(crate) fn positioned(
        name: &str,
        mean_motion: f64,
        inclination_deg: f64,
        longitude_deg: f64,
    ) -> PositionedObject {
        PositionedObject {
            record: record_with_elements(name, inclination_deg, mean_motion),
            latitude_deg: 0.0,
            longitude_deg,
            altitude_km: 550.0,
            mean_motion,
            inclination_deg,
        }
    }
}
