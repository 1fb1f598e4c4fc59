use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::provider::{OddsApi, DEFAULT_TRIALS};
use crate::error::{OddsError, Result};
use crate::models::{Matchup, OddsSnapshot};

/// Public deployment of the prediction service.
pub const DEFAULT_API_BASE_URL: &str = "https://fantasyprediction.onrender.com";

/// Odds source backed by the prediction service's read-only HTTP API.
#[derive(Clone)]
pub struct HttpOddsSource {
    http: Client,
    base_url: Url,
}

impl HttpOddsSource {
    /// `timeout` of `None` keeps the transport default (no deadline).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| OddsError::Client(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(OddsError::Client(format!(
                "Not a usable base URL: {}",
                base_url
            )));
        }
        Ok(HttpOddsSource { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of `/odds/today`.
    pub fn today_url(&self) -> Result<Url> {
        self.endpoint(&["odds", "today"])
    }

    /// URL of `/odds/custom` with encoded query parameters.
    pub fn custom_matchup_url(&self, team_a: &str, team_b: &str, trials: u32) -> Result<Url> {
        let mut url = self.endpoint(&["odds", "custom"])?;
        url.query_pairs_mut()
            .append_pair("team1", team_a)
            .append_pair("team2", team_b)
            .append_pair("trials", &trials.to_string());
        Ok(url)
    }

    /// Same as [`OddsApi::fetch_custom_matchup`] with the default trial count.
    pub async fn fetch_custom_matchup_default(&self, team_a: &str, team_b: &str) -> Result<Matchup> {
        self.fetch_custom_matchup(team_a, team_b, DEFAULT_TRIALS).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OddsError::Client(format!("Not a usable base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        let body = resp.bytes().await?;
        decode_body(&body)
    }
}

#[async_trait]
impl OddsApi for HttpOddsSource {
    fn name(&self) -> &str {
        "prediction-service"
    }

    async fn fetch_today_snapshot(&self) -> Result<OddsSnapshot> {
        let raw = self.get_json(self.today_url()?).await?;
        let snapshot = OddsSnapshot::from_value(&raw, Utc::now());
        debug!(
            "Fetched snapshot '{}' ({} matchups, live={})",
            snapshot.date,
            snapshot.matchups.len(),
            snapshot.is_live
        );
        Ok(snapshot)
    }

    async fn fetch_custom_matchup(
        &self,
        team_a: &str,
        team_b: &str,
        trials: u32,
    ) -> Result<Matchup> {
        let url = self.custom_matchup_url(team_a, team_b, trials)?;
        let raw = self.get_json(url).await?;
        let matchup = Matchup::from_value(&raw);
        info!(
            "Custom matchup {} vs {} simulated ({} trials)",
            matchup.home_team, matchup.away_team, matchup.trials
        );
        Ok(matchup)
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.ok();
    Err(OddsError::Network(failure_message(status, body)))
}

/// Body text when there is some; status text when the body could not be read.
fn failure_message(status: StatusCode, body: Option<String>) -> String {
    let fallback = || format!("Request failed with status {}", status.as_u16());
    match body {
        Some(text) if !text.trim().is_empty() => text,
        Some(_) => fallback(),
        None => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(fallback),
    }
}

fn decode_body(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| OddsError::Decode(e.to_string()))
}

// ── Custom matchup input ───────────────────────────────────────────────────────

/// Normalised custom-matchup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomQuery {
    pub team_a: String,
    pub team_b: String,
    pub trials: u32,
}

impl CustomQuery {
    /// Trim both names and fall back to the default trial count when `trials`
    /// is absent, not a number, or not positive.
    pub fn new(team_a: &str, team_b: &str, trials: Option<&str>) -> Result<Self> {
        let team_a = team_a.trim();
        let team_b = team_b.trim();
        if team_a.is_empty() || team_b.is_empty() {
            return Err(OddsError::InvalidQuery("Enter both team names".to_string()));
        }
        // Strict parse: "12abc" and "-5" fall back to the default rather than
        // reading a numeric prefix or passing a negative count upstream.
        let trials = trials
            .and_then(|t| t.trim().parse::<u32>().ok())
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_TRIALS);
        Ok(CustomQuery {
            team_a: team_a.to_string(),
            team_b: team_b.to_string(),
            trials,
        })
    }

    pub async fn run(&self, api: &dyn OddsApi) -> Result<Matchup> {
        api.fetch_custom_matchup(&self.team_a, &self.team_b, self.trials)
            .await
    }
}
