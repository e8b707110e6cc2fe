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

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::Path;

use hifitime::{Epoch, Unit};
use log::info;
use snafu::{ensure, OptionExt, ResultExt, Snafu};

use crate::errors::{ElementFileMissingSnafu, ElementFileReadSnafu, SattrainError};

/// Fixed column ranges of the two element lines, zero-indexed half-open.
const EPOCH_YEAR_COLS: Range<usize> = 18..20;
const EPOCH_DAY_COLS: Range<usize> = 20..32;
const INCLINATION_COLS: Range<usize> = 8..16;
const MEAN_MOTION_COLS: Range<usize> = 52..63;

#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ElementsError {
    #[snafu(display("element line {line} of `{name}` is too short"))]
    LineTooShort { name: String, line: u8 },
    #[snafu(display("could not parse {field} of `{name}`: {source}"))]
    Field {
        name: String,
        field: &'static str,
        source: std::num::ParseFloatError,
    },
}

/// One object's orbital elements in the external three-line text format.
///
/// The record is created at ingestion and never mutated. The scalar accessors
/// parse the fixed columns of the element lines on demand; the pipeline caches
/// the two grouping scalars on [crate::resolver::PositionedObject] instead of
/// re-reading them per comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl ElementRecord {
    pub fn new(name: impl Into<String>, line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    /// Epoch of this element set (UTC), from the year and fractional day of year of line 1.
    pub fn epoch(&self) -> Result<Epoch, ElementsError> {
        let year = self.field(1, EPOCH_YEAR_COLS, "epoch year")?;
        let day = self.field(1, EPOCH_DAY_COLS, "epoch day")?;
        // Two digit years: 57 and above are in the 1900s (Sputnik rule).
        let year = if (year as i32) < 57 {
            year as i32 + 2000
        } else {
            year as i32 + 1900
        };
        Ok(Epoch::from_gregorian_utc_at_midnight(year, 1, 1) + (day - 1.0) * Unit::Day)
    }

    /// Orbital plane inclination in degrees, from line 2.
    pub fn inclination_deg(&self) -> Result<f64, ElementsError> {
        self.field(2, INCLINATION_COLS, "inclination")
    }

    /// Mean motion in revolutions per day, from line 2.
    pub fn mean_motion(&self) -> Result<f64, ElementsError> {
        self.field(2, MEAN_MOTION_COLS, "mean motion")
    }

    fn field(&self, line: u8, cols: Range<usize>, field: &'static str) -> Result<f64, ElementsError> {
        let text = if line == 1 { &self.line1 } else { &self.line2 };
        let value = text.get(cols).context(LineTooShortSnafu {
            name: self.name.as_str(),
            line,
        })?;
        value.trim().parse().context(FieldSnafu {
            name: self.name.as_str(),
            field,
        })
    }
}

/// Reads records from the three-line format: a name line followed by the two
/// element lines, repeated. A trailing partial record is ignored.
pub fn load_elements<R: BufRead>(reader: R) -> Result<Vec<ElementRecord>, std::io::Error> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    Ok(lines
        .chunks_exact(3)
        .map(|chunk| {
            ElementRecord::new(
                chunk[0].trim(),
                chunk[1].trim_end(),
                chunk[2].trim_end(),
            )
        })
        .collect())
}

/// Reads records from the file at `path`. A missing or unreadable file is fatal.
pub fn load_elements_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ElementRecord>, SattrainError> {
    let path = path.as_ref();
    ensure!(path.exists(), ElementFileMissingSnafu { path });
    let file = File::open(path).context(ElementFileReadSnafu { path })?;
    let records =
        load_elements(BufReader::new(file)).context(ElementFileReadSnafu { path })?;
    info!(
        "loaded {} element records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}
