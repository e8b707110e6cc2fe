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

use hifitime::{Epoch, Unit};
use nalgebra::Vector3;
use snafu::ResultExt;

use super::geodesy;
use super::{MalformedElementsSnafu, PositionResolver, ResolveError, ResolvedPosition};
use crate::elements::ElementRecord;

/// The production resolver: SGP4 propagation of the record to the reference
/// instant, then TEME through GMST into geodetic coordinates.
///
/// Stateless; every call re-parses its record, so workers share nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sgp4Resolver;

impl PositionResolver for Sgp4Resolver {
    fn resolve(&self, epoch: Epoch, record: &ElementRecord) -> Result<ResolvedPosition, ResolveError> {
        let elements = sgp4::Elements::from_tle(
            Some(record.name.clone()),
            record.line1.as_bytes(),
            record.line2.as_bytes(),
        )
        .map_err(|error| ResolveError::ElementsRejected {
            name: record.name.clone(),
            details: format!("{error:?}"),
        })?;
        let constants = sgp4::Constants::from_elements(&elements).map_err(|error| {
            ResolveError::ElementsRejected {
                name: record.name.clone(),
                details: format!("{error:?}"),
            }
        })?;

        let age = epoch
            - record.epoch().context(MalformedElementsSnafu {
                name: record.name.as_str(),
            })?;
        let prediction = constants
            .propagate(age.to_unit(Unit::Minute))
            .map_err(|error| ResolveError::Propagation {
                name: record.name.clone(),
                details: format!("{error:?}"),
            })?;

        let teme_km = Vector3::new(
            prediction.position[0],
            prediction.position[1],
            prediction.position[2],
        );
        let ecef_km = geodesy::teme_to_ecef(&teme_km, geodesy::gmst_rad(epoch));
        let geo = geodesy::ecef_to_geodetic(&ecef_km);

        Ok(ResolvedPosition {
            age,
            latitude_deg: geo.latitude_deg,
            longitude_deg: geo.longitude_deg,
            altitude_km: geo.altitude_km,
        })
    }
}
