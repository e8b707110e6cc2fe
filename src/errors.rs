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

use std::path::PathBuf;

use snafu::Snafu;

/// Top level errors. Per-record resolution failures are not errors: those
/// records are dropped from the pipeline (cf. [crate::resolver::ResolveError]).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SattrainError {
    #[snafu(display("element file {} does not exist", path.display()))]
    ElementFileMissing { path: PathBuf },
    #[snafu(display("could not read element file {}: {source}", path.display()))]
    ElementFileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("could not parse reference epoch `{epoch}`: {details}"))]
    EpochFormat { epoch: String, details: String },
    #[snafu(display("could not parse ground site `{site}`: expected LAT,LON,ALT_KM"))]
    SiteFormat { site: String },
    #[snafu(display("could not write report: {source}"))]
    ReportWrite { source: std::io::Error },
    #[snafu(display("could not export CSV to {}: {source}", path.display()))]
    CsvExport { path: PathBuf, source: csv::Error },
}
