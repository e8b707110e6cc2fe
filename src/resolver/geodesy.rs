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

//! Frame plumbing between the propagator output and geographic coordinates:
//! GMST rotation from TEME to an Earth-fixed frame, and conversions between
//! Earth-fixed Cartesian and geodetic coordinates on the WGS-72 ellipsoid
//! (the ellipsoid the SGP4 constants are tied to).

use hifitime::Epoch;
use nalgebra::Vector3;

pub(crate) const WGS72_SEMI_MAJOR_KM: f64 = 6378.135;
pub(crate) const WGS72_FLATTENING: f64 = 1.0 / 298.26;

const J2000_JDE: f64 = 2_451_545.0;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Greenwich mean sidereal time in radians (IAU 1982 model, UT1 ~ UTC).
pub(crate) fn gmst_rad(epoch: Epoch) -> f64 {
    let d = epoch.to_jde_utc_days() - J2000_JDE;
    let t = d / 36_525.0;
    let gmst_deg =
        280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t - t * t * t / 38_710_000.0;
    gmst_deg.rem_euclid(360.0).to_radians()
}

/// Rotates a TEME position into the Earth-fixed frame (rotation about the
/// pole by GMST; polar motion is ignored at this accuracy).
pub(crate) fn teme_to_ecef(teme_km: &Vector3<f64>, gmst: f64) -> Vector3<f64> {
    let (sin_theta, cos_theta) = gmst.sin_cos();
    Vector3::new(
        cos_theta * teme_km.x + sin_theta * teme_km.y,
        -sin_theta * teme_km.x + cos_theta * teme_km.y,
        teme_km.z,
    )
}

/// Earth-fixed Cartesian to geodetic coordinates, by fixed-point iteration on
/// the geodetic latitude.
pub(crate) fn ecef_to_geodetic(ecef_km: &Vector3<f64>) -> Geodetic {
    let e2 = WGS72_FLATTENING * (2.0 - WGS72_FLATTENING);
    let r = ecef_km.x.hypot(ecef_km.y);
    let longitude_deg = normalize_longitude_deg(ecef_km.y.atan2(ecef_km.x).to_degrees());

    // Geocentric seed; converges to sub-millimeter in a handful of rounds.
    let mut latitude = ecef_km.z.atan2(r);
    let mut c = 1.0;
    for _ in 0..8 {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (ecef_km.z + WGS72_SEMI_MAJOR_KM * c * e2 * sin_lat).atan2(r);
    }

    // The cosine form degenerates over the poles.
    let altitude_km = if latitude.cos().abs() > 1e-6 {
        r / latitude.cos() - WGS72_SEMI_MAJOR_KM * c
    } else {
        ecef_km.z.abs() / latitude.sin().abs() - WGS72_SEMI_MAJOR_KM * c * (1.0 - e2)
    };

    Geodetic {
        latitude_deg: latitude.to_degrees(),
        longitude_deg,
        altitude_km,
    }
}

/// Geodetic coordinates to Earth-fixed Cartesian.
pub(crate) fn geodetic_to_ecef(geo: &Geodetic) -> Vector3<f64> {
    let e2 = WGS72_FLATTENING * (2.0 - WGS72_FLATTENING);
    let latitude = geo.latitude_deg.to_radians();
    let longitude = geo.longitude_deg.to_radians();
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let n = WGS72_SEMI_MAJOR_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    Vector3::new(
        (n + geo.altitude_km) * cos_lat * longitude.cos(),
        (n + geo.altitude_km) * cos_lat * longitude.sin(),
        (n * (1.0 - e2) + geo.altitude_km) * sin_lat,
    )
}

/// Wraps a longitude in degrees into [-180, 180).
pub(crate) fn normalize_longitude_deg(longitude_deg: f64) -> f64 {
    (longitude_deg + 180.0).rem_euclid(360.0) - 180.0
}
