//! Joins the next race, the previous season's results, the roster and the
//! standings into one row per driver.

use crate::config::MissingPointsPolicy;
use crate::errors::ReportError;
use race_api::{Race, RaceDataSource, Roster, Season, Standing};
use serde_json::Number;
use std::collections::HashMap;
use std::sync::Arc;

/// Race-level fields shared by every row of a report.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceSummary {
    pub race_name: String,
    pub year: Season,
    pub race_date: String,
    pub circuit_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DriverRow {
    pub team_name: String,
    pub driver_name: String,
    pub current_points: Number,
    pub previous_year_winner: bool,
    pub fastest_lap_driver: bool,
}

/// One row per roster driver, in roster order.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub race: RaceSummary,
    pub rows: Vec<DriverRow>,
}

pub struct Aggregator {
    source: Arc<dyn RaceDataSource>,
    missing_points: MissingPointsPolicy,
}

impl Aggregator {
    pub fn new(source: Arc<dyn RaceDataSource>, missing_points: MissingPointsPolicy) -> Self {
        Aggregator {
            source,
            missing_points,
        }
    }

    pub async fn build_report(&self) -> Result<Report, ReportError> {
        let next = self.source.next_race().await?;
        let season = next.season;

        if next.races.len() > 1 {
            tracing::warn!(
                count = next.races.len(),
                "Race API returned more than one upcoming race, using the first"
            );
        }
        let race = next
            .races
            .into_iter()
            .next()
            .ok_or(ReportError::NoUpcomingRace)?;

        // Everything below depends only on the season.
        let (previous_races, roster, standings) = tokio::try_join!(
            self.source.season_races(season - 1),
            self.source.season_roster(season),
            self.source.drivers_championship(season),
        )?;

        let winner = previous_year_winner(&previous_races, &race.circuit.circuit_id);
        if winner.is_none() {
            tracing::info!(
                circuit = %race.circuit.circuit_id,
                season = season - 1,
                "No previous year winner at this circuit"
            );
        }

        let rows = build_rows(
            &roster,
            &standings,
            winner,
            race.circuit.fastest_lap_driver(),
            self.missing_points,
        )?;

        Ok(Report {
            race: RaceSummary {
                race_name: race.race_name,
                year: season,
                race_date: race.schedule.race.date.unwrap_or_default(),
                circuit_name: race.circuit.circuit_name,
            },
            rows,
        })
    }
}

/// Winner of the first race in `races` held at `circuit_id`, if it has one.
pub fn previous_year_winner<'a>(races: &'a [Race], circuit_id: &str) -> Option<&'a str> {
    races
        .iter()
        .find(|race| race.circuit.circuit_id == circuit_id)
        .and_then(|race| race.winner.as_ref())
        .map(|winner| winner.driver_id.as_str())
        .filter(|id| !id.is_empty())
}

fn build_rows(
    roster: &Roster,
    standings: &[Standing],
    previous_winner: Option<&str>,
    fastest_lap_driver: Option<&str>,
    missing_points: MissingPointsPolicy,
) -> Result<Vec<DriverRow>, ReportError> {
    let team_names: HashMap<&str, &str> = roster
        .teams
        .iter()
        .map(|team| (team.team_id.as_str(), team.team_name.as_str()))
        .collect();

    let points: HashMap<&str, &Number> = standings
        .iter()
        .map(|standing| (standing.driver_id.as_str(), &standing.points))
        .collect();

    roster
        .drivers
        .iter()
        .map(|driver| {
            let team_name = team_names.get(driver.team_id.as_str()).ok_or_else(|| {
                ReportError::UnknownTeam {
                    driver_id: driver.driver_id.clone(),
                    team_id: driver.team_id.clone(),
                }
            })?;

            let current_points = match (points.get(driver.driver_id.as_str()), missing_points) {
                (Some(points), _) => (*points).clone(),
                (None, MissingPointsPolicy::Zero) => {
                    tracing::warn!(driver = %driver.driver_id, "No standing for driver, reporting 0 points");
                    Number::from(0)
                }
                (None, MissingPointsPolicy::Fail) => {
                    return Err(ReportError::MissingStanding {
                        driver_id: driver.driver_id.clone(),
                    });
                }
            };

            let driver_id = Some(driver.driver_id.as_str());

            Ok(DriverRow {
                team_name: team_name.to_string(),
                driver_name: driver.full_name(),
                current_points,
                previous_year_winner: driver_id == previous_winner,
                fastest_lap_driver: driver_id == fastest_lap_driver,
            })
        })
        .collect()
}
