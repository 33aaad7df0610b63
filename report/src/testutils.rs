use crate::errors::PublishError;
use crate::publisher::{UploadResponse, Uploader};
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use race_api::{
    Circuit, Driver, NextRace, Race, RaceApiError, RaceDataSource, Roster, Schedule, Season,
    Session, Standing, Team, Winner,
};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

pub fn team(team_id: &str, team_name: &str) -> Team {
    Team {
        team_id: team_id.into(),
        team_name: team_name.into(),
    }
}

pub fn driver(driver_id: &str, name: &str, surname: &str, team_id: &str) -> Driver {
    Driver {
        driver_id: driver_id.into(),
        name: name.into(),
        surname: surname.into(),
        team_id: team_id.into(),
    }
}

pub fn standing(driver_id: &str, points: serde_json::Value) -> Standing {
    serde_json::from_value(serde_json::json!({"driverId": driver_id, "points": points})).unwrap()
}

pub fn race_at(circuit_id: &str, winner: Option<&str>) -> Race {
    Race {
        race_name: format!("{circuit_id} Grand Prix"),
        schedule: Schedule::default(),
        circuit: Circuit {
            circuit_id: circuit_id.into(),
            circuit_name: circuit_id.into(),
            fastest_lap_driver_id: None,
        },
        winner: winner.map(|id| Winner {
            driver_id: id.into(),
        }),
    }
}

/// In-memory race data. `fail_on` names a method that returns a 503 instead.
pub struct FakeRaceSource {
    pub next: NextRace,
    pub previous_races: Vec<Race>,
    pub roster: Roster,
    pub standings: Vec<Standing>,
    pub fail_on: Option<&'static str>,
    requested_seasons: Mutex<Vec<Season>>,
}

impl FakeRaceSource {
    /// Monaco 2024: Verstappen won Monaco in 2023, Norris holds the lap record.
    pub fn monaco() -> Self {
        let mut monaco = race_at("monaco", None);
        monaco.race_name = "Monaco Grand Prix".into();
        monaco.schedule = Schedule {
            race: Session {
                date: Some("2024-05-26".into()),
                time: Some("13:00:00Z".into()),
            },
        };
        monaco.circuit.circuit_name = "Circuit de Monaco".into();
        monaco.circuit.fastest_lap_driver_id = Some("norris".into());

        FakeRaceSource {
            next: NextRace {
                season: 2024,
                races: vec![monaco],
            },
            previous_races: vec![
                race_at("bahrain", Some("max_verstappen")),
                race_at("monaco", Some("max_verstappen")),
            ],
            roster: Roster {
                teams: vec![
                    team("ferrari", "Ferrari"),
                    team("red_bull", "Red Bull Racing"),
                    team("mclaren", "McLaren"),
                ],
                drivers: vec![
                    driver("leclerc", "Charles", "Leclerc", "ferrari"),
                    driver("max_verstappen", "Max", "Verstappen", "red_bull"),
                    driver("norris", "Lando", "Norris", "mclaren"),
                ],
            },
            standings: vec![
                standing("max_verstappen", 25.into()),
                standing("leclerc", 18.into()),
                standing("norris", 15.into()),
            ],
            fail_on: None,
            requested_seasons: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_seasons(&self) -> Vec<Season> {
        self.requested_seasons.lock().unwrap().clone()
    }

    fn check(&self, method: &'static str) -> Result<(), RaceApiError> {
        match self.fail_on {
            Some(failing) if failing == method => Err(RaceApiError::Status {
                url: format!("http://race-api.test/{method}"),
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RaceDataSource for FakeRaceSource {
    async fn next_race(&self) -> Result<NextRace, RaceApiError> {
        self.check("next_race")?;
        Ok(self.next.clone())
    }

    async fn season_races(&self, season: Season) -> Result<Vec<Race>, RaceApiError> {
        self.check("season_races")?;
        self.requested_seasons.lock().unwrap().push(season);
        Ok(self.previous_races.clone())
    }

    async fn season_teams(&self, _season: Season) -> Result<Vec<Team>, RaceApiError> {
        self.check("season_teams")?;
        Ok(self.roster.teams.clone())
    }

    async fn season_drivers(&self, _season: Season) -> Result<Vec<Driver>, RaceApiError> {
        self.check("season_drivers")?;
        Ok(self.roster.drivers.clone())
    }

    async fn drivers_championship(&self, _season: Season) -> Result<Vec<Standing>, RaceApiError> {
        self.check("drivers_championship")?;
        Ok(self.standings.clone())
    }
}

/// Answers uploads with scripted statuses; the n-th response body is `response n`.
pub struct ScriptedUploader {
    url: Url,
    responses: Mutex<VecDeque<UploadResponse>>,
    bodies: Mutex<Vec<Bytes>>,
    calls: AtomicU32,
}

impl ScriptedUploader {
    pub fn new(statuses: &[u16]) -> Self {
        let responses = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| UploadResponse {
                status: StatusCode::from_u16(*status).unwrap(),
                body: format!("response {}", i + 1),
            })
            .collect();

        ScriptedUploader {
            url: Url::parse("https://filebin.test/bin/next_race_results.csv").unwrap(),
            responses: Mutex::new(responses),
            bodies: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Bytes> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for ScriptedUploader {
    fn destination(&self) -> &Url {
        &self.url
    }

    async fn upload(&self, body: Bytes) -> Result<UploadResponse, PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(body);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left");
        Ok(response)
    }
}

/// Local HTTP server that records request bodies and replies with scripted statuses.
pub struct UploadSinkServer {
    pub url: Url,
    received: Arc<Mutex<Vec<Bytes>>>,
    handle: JoinHandle<()>,
}

impl UploadSinkServer {
    pub async fn spawn(statuses: Vec<u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();

        let received = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(VecDeque::from(statuses)));

        let received_clone = received.clone();
        let handle = tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                let received = received_clone.clone();
                let statuses = statuses.clone();

                tokio::spawn(async move {
                    let svc = service_fn(move |req: Request<Incoming>| {
                        let received = received.clone();
                        let statuses = statuses.clone();
                        async move {
                            let body = req.into_body().collect().await.unwrap().to_bytes();
                            received.lock().unwrap().push(body);
                            let status = statuses.lock().unwrap().pop_front().unwrap_or(500);
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .body(Full::new(Bytes::from(format!("status {status}"))))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = Builder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await;
                });
            }
        });

        UploadSinkServer {
            url: Url::parse(&format!("http://127.0.0.1:{port}/bin/next_race_results.csv"))
                .unwrap(),
            received,
            handle,
        }
    }

    pub fn received(&self) -> Vec<Bytes> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for UploadSinkServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
