use http::StatusCode;
use race_api::RaceApiError;
use thiserror::Error;

/// Errors that can occur while building or publishing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("race data unavailable: {0}")]
    Upstream(#[from] RaceApiError),

    #[error("race API returned no upcoming race")]
    NoUpcomingRace,

    #[error("driver {driver_id} references unknown team {team_id}")]
    UnknownTeam { driver_id: String, team_id: String },

    #[error("no championship standing for driver {driver_id}")]
    MissingStanding { driver_id: String },

    #[error("could not serialize report: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Short label used to tag metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Upstream(_) => "upstream",
            ReportError::NoUpcomingRace => "no_upcoming_race",
            ReportError::UnknownTeam { .. } => "unknown_team",
            ReportError::MissingStanding { .. } => "missing_standing",
            ReportError::Csv(_) => "csv",
            ReportError::Publish(PublishError::Exhausted { .. }) => "publish_exhausted",
            ReportError::Publish(PublishError::Transport(_)) => "publish_transport",
            ReportError::Io(_) => "io",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ReportError::Upstream(_)
            | ReportError::NoUpcomingRace
            | ReportError::Publish(PublishError::Transport(_)) => StatusCode::BAD_GATEWAY,
            ReportError::UnknownTeam { .. }
            | ReportError::MissingStanding { .. }
            | ReportError::Csv(_)
            | ReportError::Publish(PublishError::Exhausted { .. })
            | ReportError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error` field of the JSON error body.
    pub fn summary(&self) -> &'static str {
        match self {
            ReportError::Upstream(_) | ReportError::NoUpcomingRace => "Race data unavailable",
            ReportError::Publish(PublishError::Exhausted { .. }) => "Upload failed after retries",
            ReportError::Publish(PublishError::Transport(_)) => "Upload failed",
            ReportError::UnknownTeam { .. }
            | ReportError::MissingStanding { .. }
            | ReportError::Csv(_)
            | ReportError::Io(_) => "Report aggregation failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("upload failed after {attempts} attempts, last status {status}")]
    Exhausted {
        attempts: u32,
        status: StatusCode,
        body: String,
    },

    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
