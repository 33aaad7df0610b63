use serde::Deserialize;
use serde_json::Number;

pub type Season = i32;

/// Response of `current/next`. The API wraps the upcoming race in a list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NextRace {
    pub season: Season,
    #[serde(rename = "race", default)]
    pub races: Vec<Race>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    #[serde(default)]
    pub race_name: String,
    #[serde(default)]
    pub schedule: Schedule,
    pub circuit: Circuit,
    /// Null for races that have not been run.
    #[serde(default)]
    pub winner: Option<Winner>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Schedule {
    #[serde(default)]
    pub race: Session,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Circuit {
    pub circuit_id: String,
    #[serde(default)]
    pub circuit_name: String,
    /// Holder of the all-time fastest lap at this circuit.
    #[serde(default)]
    pub fastest_lap_driver_id: Option<String>,
}

impl Circuit {
    pub fn fastest_lap_driver(&self) -> Option<&str> {
        self.fastest_lap_driver_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub driver_id: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: String,
    pub team_name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub driver_id: String,
    pub name: String,
    pub surname: String,
    pub team_id: String,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub driver_id: String,
    pub points: Number,
}

/// Teams and drivers registered for one season.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster {
    pub teams: Vec<Team>,
    pub drivers: Vec<Driver>,
}
