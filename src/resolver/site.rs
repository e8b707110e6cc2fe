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

use snafu::ensure;

use super::geodesy::{self, Geodetic};
use super::PositionedObject;
use crate::errors::{SattrainError, SiteFormatSnafu};

/// A fixed observer on the ground, for pointing at reported trains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSite {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Topocentric pointing from a [GroundSite] to an object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookAngle {
    /// Azimuth in degrees, clockwise from north, in [0, 360).
    pub azimuth_deg: f64,
    /// Elevation above the local horizon in degrees; negative means below it.
    pub elevation_deg: f64,
}

impl GroundSite {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }

    /// Parses a `LAT,LON,ALT_KM` triple, as passed on the command line.
    pub fn from_spec(spec: &str) -> Result<Self, SattrainError> {
        let fields: Vec<f64> = spec
            .split(',')
            .map(|field| field.trim().parse())
            .collect::<Result<_, _>>()
            .ok()
            .unwrap_or_default();
        ensure!(fields.len() == 3, SiteFormatSnafu { site: spec });
        Ok(Self::new(fields[0], fields[1], fields[2]))
    }

    /// Look angle from this site to a geodetic position, through the
    /// south-east-zenith frame at the site.
    pub fn look_angle(
        &self,
        latitude_deg: f64,
        longitude_deg: f64,
        altitude_km: f64,
    ) -> LookAngle {
        let site_ecef = geodesy::geodetic_to_ecef(&Geodetic {
            latitude_deg: self.latitude_deg,
            longitude_deg: self.longitude_deg,
            altitude_km: self.altitude_km,
        });
        let object_ecef = geodesy::geodetic_to_ecef(&Geodetic {
            latitude_deg,
            longitude_deg,
            altitude_km,
        });
        let range = object_ecef - site_ecef;

        let (sin_lat, cos_lat) = self.latitude_deg.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude_deg.to_radians().sin_cos();

        let south = sin_lat * cos_lon * range.x + sin_lat * sin_lon * range.y - cos_lat * range.z;
        let east = -sin_lon * range.x + cos_lon * range.y;
        let zenith = cos_lat * cos_lon * range.x + cos_lat * sin_lon * range.y + sin_lat * range.z;

        LookAngle {
            azimuth_deg: east.atan2(-south).to_degrees().rem_euclid(360.0),
            elevation_deg: (zenith / range.norm()).asin().to_degrees(),
        }
    }

    pub fn look_at(&self, object: &PositionedObject) -> LookAngle {
        self.look_angle(
            object.latitude_deg,
            object.longitude_deg,
            object.altitude_km,
        )
    }
}
