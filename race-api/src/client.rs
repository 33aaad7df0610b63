use crate::metrics_defs::UPSTREAM_REQUEST_DURATION;
use crate::types::{Driver, NextRace, Race, Season, Standing, Team};
use crate::{RaceApiError, RaceDataSource};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use url::Url;

#[derive(Deserialize)]
struct SeasonRaces {
    races: Vec<Race>,
}

#[derive(Deserialize)]
struct SeasonTeams {
    teams: Vec<Team>,
}

#[derive(Deserialize)]
struct SeasonDrivers {
    drivers: Vec<Driver>,
}

#[derive(Deserialize)]
struct DriversChampionship {
    drivers_championship: Vec<Standing>,
}

/// HTTP client for the race API. One GET per call, no retries.
pub struct RaceApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl RaceApiClient {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, RaceApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RaceApiError::Client)?;

        Ok(RaceApiClient {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, selector: &str) -> String {
        format!("{}/{}", self.base_url, selector)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        selector: &str,
    ) -> Result<T, RaceApiError> {
        let url = self.endpoint_url(selector);
        let start = Instant::now();

        let result = self.fetch(&url).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        shared::histogram!(UPSTREAM_REQUEST_DURATION, "endpoint" => endpoint, "outcome" => outcome)
            .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => tracing::debug!(%url, "Fetched race data"),
            Err(e) => tracing::warn!(%url, error = %e, "Race API request failed"),
        }

        result
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, RaceApiError> {
        let request_error = |source| RaceApiError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RaceApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(request_error)?;

        serde_json::from_slice(&body).map_err(|source| RaceApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl RaceDataSource for RaceApiClient {
    async fn next_race(&self) -> Result<NextRace, RaceApiError> {
        self.get_json("next_race", "current/next").await
    }

    async fn season_races(&self, season: Season) -> Result<Vec<Race>, RaceApiError> {
        let data: SeasonRaces = self.get_json("season", &season.to_string()).await?;
        Ok(data.races)
    }

    async fn season_teams(&self, season: Season) -> Result<Vec<Team>, RaceApiError> {
        let data: SeasonTeams = self.get_json("teams", &format!("{season}/teams")).await?;
        Ok(data.teams)
    }

    async fn season_drivers(&self, season: Season) -> Result<Vec<Driver>, RaceApiError> {
        let data: SeasonDrivers = self
            .get_json("drivers", &format!("{season}/drivers"))
            .await?;
        Ok(data.drivers)
    }

    async fn drivers_championship(&self, season: Season) -> Result<Vec<Standing>, RaceApiError> {
        let data: DriversChampionship = self
            .get_json("championship", &format!("{season}/drivers-championship"))
            .await?;
        Ok(data.drivers_championship)
    }
}
