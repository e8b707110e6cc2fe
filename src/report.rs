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

use std::io::Write;
use std::path::Path;

use log::info;
use serde_derive::Serialize;
use snafu::ResultExt;

use crate::errors::{CsvExportSnafu, ReportWriteSnafu, SattrainError};
use crate::resolver::GroundSite;
use crate::trains::Train;

/// Writes the train list as text: per train an index and member count, then
/// per member the name, mean motion and geographic position. With a ground
/// site, each member also gets its look angle from that site.
pub fn render_trains<W: Write>(
    out: &mut W,
    trains: &[Train],
    site: Option<&GroundSite>,
) -> Result<(), SattrainError> {
    for (index, train) in trains.iter().enumerate() {
        writeln!(out, "TRAIN #{index}").context(ReportWriteSnafu)?;
        writeln!(out, "COUNT: {}", train.len()).context(ReportWriteSnafu)?;
        for member in &train.members {
            writeln!(out, "{}: {} rev/day", member.name(), member.mean_motion)
                .context(ReportWriteSnafu)?;
            writeln!(out, "Lat: {:.4} deg", member.latitude_deg).context(ReportWriteSnafu)?;
            writeln!(out, "Lon: {:.4} deg", member.longitude_deg).context(ReportWriteSnafu)?;
            writeln!(out, "Alt: {:.1} km", member.altitude_km).context(ReportWriteSnafu)?;
            if let Some(site) = site {
                let look = site.look_at(member);
                writeln!(
                    out,
                    "Az/El: {:.1}/{:.1} deg",
                    look.azimuth_deg, look.elevation_deg
                )
                .context(ReportWriteSnafu)?;
            }
        }
        writeln!(out).context(ReportWriteSnafu)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct TrainRow<'a> {
    train: usize,
    name: &'a str,
    mean_motion: f64,
    inclination_deg: f64,
    latitude_deg: f64,
    longitude_deg: f64,
    altitude_km: f64,
}

/// Exports one CSV row per train member.
pub fn export_csv<P: AsRef<Path>>(path: P, trains: &[Train]) -> Result<(), SattrainError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).context(CsvExportSnafu { path })?;
    let mut rows = 0;
    for (index, train) in trains.iter().enumerate() {
        for member in &train.members {
            writer
                .serialize(TrainRow {
                    train: index,
                    name: member.name(),
                    mean_motion: member.mean_motion,
                    inclination_deg: member.inclination_deg,
                    latitude_deg: member.latitude_deg,
                    longitude_deg: member.longitude_deg,
                    altitude_km: member.altitude_km,
                })
                .context(CsvExportSnafu { path })?;
            rows += 1;
        }
    }
    writer
        .flush()
        .map_err(csv::Error::from)
        .context(CsvExportSnafu { path })?;
    info!("exported {rows} rows to {}", path.display());
    Ok(())
}
