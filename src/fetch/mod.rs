//! Remote API client.
//!
//! Wraps the game-statistics web API behind four typed calls: account
//! search, per-account stats, per-account vehicles, and the global vehicle
//! catalog. Every payload arrives inside a status envelope; normalization of
//! that envelope happens here so the rest of the pipeline never sees wire
//! conventions.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::AppConfig;
use crate::models::{CatalogVehicle, PlayerIdentity, PlayerStats, TierCatalog, VehicleRecord};

/// Candidates requested per search; two is enough to observe ambiguity.
const SEARCH_LIMIT: &str = "2";

/// Errors that can occur while talking to the remote API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Player not found: {player} ({reason})")]
    PlayerNotFound { player: String, reason: String },

    #[error("Stats unavailable: remote status {status}: {message}")]
    StatsUnavailable { status: String, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Status envelope wrapping every remote payload.
///
/// The remote API signals per-request errors in-band: `status` is `"ok"` on
/// success, anything else (with an optional `status_code` detail) on failure.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    status: String,

    #[serde(default)]
    status_code: Option<String>,

    #[serde(default)]
    data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, mapping a non-ok status to `StatsUnavailable`
    /// and a missing payload to `MalformedResponse`.
    fn into_data(self) -> Result<T, FetchError> {
        if self.status != "ok" {
            return Err(FetchError::StatsUnavailable {
                status: self.status,
                message: self.status_code.unwrap_or_default(),
            });
        }

        self.data
            .ok_or_else(|| FetchError::MalformedResponse("missing data payload".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SearchData {
    items: Vec<SearchCandidate>,
}

#[derive(Debug, Deserialize)]
struct SearchCandidate {
    name: String,
    id: u64,
}

/// A single rating counter in the remote API's nested-value shape.
#[derive(Debug, Deserialize)]
struct RatingValue {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Ratings {
    battles: RatingValue,
    xp: RatingValue,
    spotted: RatingValue,
    frags: RatingValue,
    damage_dealt: RatingValue,
    battle_wins: RatingValue,
    losses: RatingValue,
    draws: RatingValue,
    capture_points: RatingValue,
    dropped_capture_points: RatingValue,
}

#[derive(Debug, Deserialize)]
struct StatsData {
    ratings: Ratings,
}

#[derive(Debug, Deserialize)]
struct VehiclesData {
    vehicles: Vec<WireVehicle>,
}

#[derive(Debug, Deserialize)]
struct WireVehicle {
    id: u64,
    level: u8,
    battle_count: u64,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    items: Vec<WireCatalogVehicle>,
}

#[derive(Debug, Deserialize)]
struct WireCatalogVehicle {
    id: u64,
    name: String,
    level: u8,
}

/// Client for the remote statistics API.
///
/// Holds the region base URL and credential token from the run
/// configuration. No retries, no caching: each method is one round trip.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl ApiClient {
    /// Create a client from the run configuration.
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("stat-grabber/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(config.region.base_url())
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Resolve a player name to its stable account id.
    ///
    /// Resolution is case-insensitive server-side; the candidate's name must
    /// still case-insensitively equal the query. Zero candidates, more than
    /// one candidate, or a name mismatch all fail with `PlayerNotFound`.
    pub async fn resolve(&self, name: &str) -> Result<PlayerIdentity, FetchError> {
        info!("Resolving player: {}", name);

        let data: SearchData = self
            .get("accounts/search", &[("search", name), ("limit", SEARCH_LIMIT)])
            .await?;

        select_candidate(name, data.items)
    }

    /// Fetch a player's aggregate battle statistics.
    pub async fn fetch_player_stats(&self, id: u64) -> Result<PlayerStats, FetchError> {
        debug!("Fetching stats for account {}", id);

        let data: StatsData = self.get(&format!("accounts/{}/stats", id), &[]).await?;
        let r = data.ratings;

        Ok(PlayerStats {
            battles: r.battles.value,
            experience: r.xp.value,
            spots: r.spotted.value,
            kills: r.frags.value,
            damage: r.damage_dealt.value,
            wins: r.battle_wins.value,
            losses: r.losses.value,
            draws: r.draws.value,
            capture_points: r.capture_points.value,
            dropped_capture_points: r.dropped_capture_points.value,
        })
    }

    /// Fetch a player's per-vehicle battle records.
    pub async fn fetch_player_vehicles(&self, id: u64) -> Result<Vec<VehicleRecord>, FetchError> {
        debug!("Fetching vehicles for account {}", id);

        let data: VehiclesData = self.get(&format!("accounts/{}/vehicles", id), &[]).await?;
        data.vehicles.into_iter().map(vehicle_record).collect()
    }

    /// Fetch the global vehicle catalog (vehicle id → name/tier).
    ///
    /// Called at most once per run, before any per-player processing in
    /// extended mode.
    pub async fn fetch_tier_catalog(&self) -> Result<TierCatalog, FetchError> {
        info!("Fetching vehicle catalog");

        let data: CatalogData = self.get("vehicles", &[]).await?;

        let mut vehicles = BTreeMap::new();
        for item in data.items {
            check_tier(item.level, item.id)?;
            vehicles.insert(
                item.id,
                CatalogVehicle {
                    name: item.name,
                    tier: item.level,
                },
            );
        }

        info!("Catalog loaded: {} vehicles", vehicles.len());
        Ok(TierCatalog::new(vehicles))
    }

    /// Issue one GET request and unwrap the status envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = endpoint(&self.base_url, path)?;

        let response = self
            .client
            .get(url)
            .query(&[("source_token", self.token.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        envelope.into_data()
    }
}

/// Resolve an endpoint path against the region base URL. Paths carry the
/// trailing slash the remote API expects.
fn endpoint(base: &Url, path: &str) -> Result<Url, FetchError> {
    base.join(&format!("{}/", path))
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))
}

/// Pick the resolved identity out of the search candidates.
fn select_candidate(
    query: &str,
    items: Vec<SearchCandidate>,
) -> Result<PlayerIdentity, FetchError> {
    if items.len() > 1 {
        return Err(FetchError::PlayerNotFound {
            player: query.to_string(),
            reason: "multiple players found".to_string(),
        });
    }

    match items.into_iter().next() {
        Some(c) if c.name.to_lowercase() == query.to_lowercase() => {
            Ok(PlayerIdentity::new(c.name, c.id))
        }
        _ => Err(FetchError::PlayerNotFound {
            player: query.to_string(),
            reason: "player was not found".to_string(),
        }),
    }
}

fn vehicle_record(v: WireVehicle) -> Result<VehicleRecord, FetchError> {
    check_tier(v.level, v.id)?;
    Ok(VehicleRecord::new(v.id, v.level, v.battle_count))
}

fn check_tier(level: u8, vehicle_id: u64) -> Result<(), FetchError> {
    if !(1..=10).contains(&level) {
        return Err(FetchError::MalformedResponse(format!(
            "vehicle {} has tier {} outside 1..=10",
            vehicle_id, level
        )));
    }
    Ok(())
}
