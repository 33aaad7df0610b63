//! CSV rendering of a [`Report`].
//!
//! Race-level columns are repeated on every row so the file can be opened
//! as a flat sheet downstream.

use crate::aggregator::Report;
use crate::errors::ReportError;
use csv::{Terminator, WriterBuilder};
use race_api::Season;
use serde::{Serialize, Serializer};
use serde_json::Number;

pub const COLUMNS: [&str; 9] = [
    "race_name",
    "year",
    "race_date",
    "circuit_name",
    "team_name",
    "driver_name",
    "current_points",
    "previous_year_winner",
    "fastest_lap_driver",
];

#[derive(Serialize)]
struct CsvRecord<'a> {
    race_name: &'a str,
    year: Season,
    race_date: &'a str,
    circuit_name: &'a str,
    team_name: &'a str,
    driver_name: &'a str,
    current_points: &'a Number,
    #[serde(serialize_with = "title_case_bool")]
    previous_year_winner: bool,
    #[serde(serialize_with = "title_case_bool")]
    fastest_lap_driver: bool,
}

// Consumers of the existing reports expect `True`/`False`.
fn title_case_bool<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Renders the header and one line per driver row, UTF-8, `\n` terminated.
pub fn to_csv(report: &Report) -> Result<Vec<u8>, ReportError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    // Written explicitly so an empty roster still yields a header.
    writer.write_record(COLUMNS)?;

    let race = &report.race;
    for row in &report.rows {
        writer.serialize(CsvRecord {
            race_name: &race.race_name,
            year: race.year,
            race_date: &race.race_date,
            circuit_name: &race.circuit_name,
            team_name: &row.team_name,
            driver_name: &row.driver_name,
            current_points: &row.current_points,
            previous_year_winner: row.previous_year_winner,
            fastest_lap_driver: row.fastest_lap_driver,
        })?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))
}
