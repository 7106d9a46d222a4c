// Remote race service client.
//
// The service is consumed, never implemented here: a REST API with JSON
// bodies under /api (tracks and cars catalogs, race create/start/status/
// accelerate). `RaceService` is the boundary trait the orchestrator and
// app loop program against; `HttpRaceService` is the reqwest-backed
// implementation. Tests substitute a scripted in-memory service.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::ServerConfig;
use crate::protocol::{CreatedRace, RaceSnapshot, Racer, Track};

// ---------------------------------------------------------------------------
// Race addressing
// ---------------------------------------------------------------------------

/// Offset between the id in the create response and the id the start,
/// status, and accelerate routes expect.
///
/// The create endpoint numbers races from 1, the per-race routes from 0, so
/// every follow-up call is addressed with `ID - 1`. This is a contract of
/// the race service, not client arithmetic to be tidied away; the
/// subtraction lives here and nowhere else.
pub const CREATE_ID_OFFSET: u64 = 1;

/// The id a created race is addressed by on all subsequent endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RaceHandle(u64);

impl RaceHandle {
    /// Derive the handle from a create response (`ID - 1`).
    ///
    /// Create ids start at 1; `saturating_sub` keeps a malformed `ID: 0`
    /// response from panicking the client.
    pub fn from_created(created: &CreatedRace) -> Self {
        RaceHandle(created.id.saturating_sub(CREATE_ID_OFFSET))
    }

    /// The raw path segment for `/api/races/{id}` routes.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport-level failure: connection refused, timeout, DNS.
    #[error("request to race service failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("race service returned {status} for {operation}")]
    Status {
        operation: &'static str,
        status: StatusCode,
    },
}

// ---------------------------------------------------------------------------
// RaceService trait
// ---------------------------------------------------------------------------

/// Boundary to the remote race service.
///
/// All callers go through this trait so the orchestration layer can be
/// exercised against a scripted service in tests.
#[async_trait]
pub trait RaceService: Send + Sync {
    /// `GET /api/tracks`
    async fn list_tracks(&self) -> Result<Vec<Track>, ServiceError>;

    /// `GET /api/cars`
    async fn list_racers(&self) -> Result<Vec<Racer>, ServiceError>;

    /// `POST /api/races` with `{player_id, track_id}`.
    async fn create_race(&self, racer_id: u64, track_id: u64)
        -> Result<CreatedRace, ServiceError>;

    /// `POST /api/races/{id}/start`
    async fn start_race(&self, race: RaceHandle) -> Result<(), ServiceError>;

    /// `GET /api/races/{id}`
    async fn get_race(&self, race: RaceHandle) -> Result<RaceSnapshot, ServiceError>;

    /// `POST /api/races/{id}/accelerate` — response body is ignored.
    async fn accelerate(&self, race: RaceHandle) -> Result<(), ServiceError>;
}

// ---------------------------------------------------------------------------
// HttpRaceService
// ---------------------------------------------------------------------------

/// reqwest-backed race service client.
///
/// Sends `Content-Type: application/json` on POSTs and never authenticates;
/// the service is assumed to sit on a trusted local network.
pub struct HttpRaceService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRaceService {
    /// Build a client from the server section of the config.
    pub fn new(server: &ServerConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(server.request_timeout())
            .build()?;
        Ok(HttpRaceService {
            http,
            base_url: server.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check(
        operation: &'static str,
        response: &reqwest::Response,
    ) -> Result<(), ServiceError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status { operation, status })
        }
    }
}

#[async_trait]
impl RaceService for HttpRaceService {
    async fn list_tracks(&self) -> Result<Vec<Track>, ServiceError> {
        let response = self.http.get(self.url("/api/tracks")).send().await?;
        Self::check("list_tracks", &response)?;
        Ok(response.json().await?)
    }

    async fn list_racers(&self) -> Result<Vec<Racer>, ServiceError> {
        let response = self.http.get(self.url("/api/cars")).send().await?;
        Self::check("list_racers", &response)?;
        Ok(response.json().await?)
    }

    async fn create_race(
        &self,
        racer_id: u64,
        track_id: u64,
    ) -> Result<CreatedRace, ServiceError> {
        let body = serde_json::json!({
            "player_id": racer_id,
            "track_id": track_id,
        });
        let response = self
            .http
            .post(self.url("/api/races"))
            .json(&body)
            .send()
            .await?;
        Self::check("create_race", &response)?;
        let created: CreatedRace = response.json().await?;
        debug!(created_id = created.id, "race created");
        Ok(created)
    }

    async fn start_race(&self, race: RaceHandle) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.url(&format!("/api/races/{race}/start")))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Self::check("start_race", &response)
    }

    async fn get_race(&self, race: RaceHandle) -> Result<RaceSnapshot, ServiceError> {
        let response = self
            .http
            .get(self.url(&format!("/api/races/{race}")))
            .send()
            .await?;
        Self::check("get_race", &response)?;
        Ok(response.json().await?)
    }

    async fn accelerate(&self, race: RaceHandle) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.url(&format!("/api/races/{race}/accelerate")))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Self::check("accelerate", &response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
