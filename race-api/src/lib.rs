//! Client for the public race-data API (`https://f1api.dev/api/...`).
//!
//! The [`RaceDataSource`] trait is the seam the report aggregator depends on;
//! [`RaceApiClient`] is the HTTP implementation.

pub mod client;
pub mod metrics_defs;
pub mod types;

#[cfg(test)]
mod testutils;

use async_trait::async_trait;
use reqwest::StatusCode;

pub use client::RaceApiClient;
pub use types::{
    Circuit, Driver, NextRace, Race, Roster, Schedule, Season, Session, Standing, Team, Winner,
};

#[derive(thiserror::Error, Debug)]
pub enum RaceApiError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RaceApiError {
    /// Short label used to tag metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RaceApiError::Client(_) => "client",
            RaceApiError::Request { source, .. } if source.is_timeout() => "timeout",
            RaceApiError::Request { .. } => "request",
            RaceApiError::Status { .. } => "status",
            RaceApiError::Decode { .. } => "decode",
        }
    }
}

/// Read-only access to season data. Every method is a single upstream call
/// except [`RaceDataSource::season_roster`], which combines two.
#[async_trait]
pub trait RaceDataSource: Send + Sync {
    async fn next_race(&self) -> Result<NextRace, RaceApiError>;

    async fn season_races(&self, season: Season) -> Result<Vec<Race>, RaceApiError>;

    async fn season_teams(&self, season: Season) -> Result<Vec<Team>, RaceApiError>;

    async fn season_drivers(&self, season: Season) -> Result<Vec<Driver>, RaceApiError>;

    async fn drivers_championship(&self, season: Season) -> Result<Vec<Standing>, RaceApiError>;

    async fn season_roster(&self, season: Season) -> Result<Roster, RaceApiError> {
        let (teams, drivers) =
            tokio::try_join!(self.season_teams(season), self.season_drivers(season))?;
        Ok(Roster { teams, drivers })
    }
}
