/// FootySignal — Live Monitor
///
/// Polluje live-events endpoint (RapidAPI, bet365 data) a normalizuje
/// různé tvary JSONu do plochého `LiveEvent`.
///
/// Co NEDĚLÁ: žádné retry v rámci cyklu; chyba = cyklus se přeskočí.

pub mod fields;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use fields::*;

#[derive(Debug, Error)]
pub enum LiveFeedError {
    #[error("live-events request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("live-events returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("live-events JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One in-play fixture as reported by the live API. Lives for a single cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveEvent {
    /// Empty when the provider sends no id.
    pub event_id: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub elapsed_minutes: Option<u32>,
    pub kickoff: Option<DateTime<Utc>>,
}

impl LiveEvent {
    pub fn score(&self) -> Option<(u32, u32)> {
        Some((self.home_score?, self.away_score?))
    }
}

#[derive(Debug, Clone)]
pub struct LiveFeedConfig {
    pub base_url: String,
    pub host: String,
    pub api_key: String,
    pub events_path: String,
    /// Raw query, e.g. "sport=soccer&live=1".
    pub events_params: String,
}

pub struct LiveMonitor {
    client: reqwest::Client,
    url: String,
    host: String,
    api_key: String,
    params: Vec<(String, String)>,
}

impl LiveMonitor {
    pub fn new(cfg: &LiveFeedConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            url: format!("{}{}", cfg.base_url.trim_end_matches('/'), cfg.events_path),
            host: cfg.host.clone(),
            api_key: cfg.api_key.clone(),
            params: parse_query_params(&cfg.events_params),
        }
    }

    pub async fn fetch_events(&self) -> Result<Vec<LiveEvent>, LiveFeedError> {
        debug!("Calling live-events: {} {:?}", self.url, self.params);
        let resp = self.client.get(&self.url)
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", &self.api_key)
            .header("accept", "application/json")
            .query(&self.params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: String = resp.text().await.unwrap_or_default().chars().take(200).collect();
            warn!("Live API failed {status}: {body}");
            return Err(LiveFeedError::Status { status: status.as_u16(), body });
        }

        let raw = resp.text().await?;
        let payload: Value = serde_json::from_str(&raw)?;
        let events = normalize_payload(&payload);
        info!("Live API: {} live events", events.len());
        Ok(events)
    }
}

/// "a=1&b=2" → [("a","1"), ("b","2")]; fragments without '=' are dropped.
pub fn parse_query_params(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Locate the event list inside the payload and normalise every record.
/// Records that cannot be normalised are skipped.
pub fn normalize_payload(payload: &Value) -> Vec<LiveEvent> {
    let Some(list) = event_list(payload) else {
        warn!("Live payload has no recognisable event list");
        return Vec::new();
    };

    let mut events = Vec::with_capacity(list.len());
    for raw in list {
        match normalize_event(raw) {
            Some(ev) => events.push(ev),
            None => debug!("Live record skipped (no team names): {}", truncate(raw)),
        }
    }
    events
}

fn event_list(payload: &Value) -> Option<&Vec<Value>> {
    if let Some(list) = payload.as_array() {
        return Some(list);
    }
    EVENT_LIST_PATHS
        .iter()
        .find_map(|p| payload.pointer(p).and_then(Value::as_array))
}

pub fn normalize_event(ev: &Value) -> Option<LiveEvent> {
    let home_team = first_of(ev, HOME_PATHS, as_text)?;
    let away_team = first_of(ev, AWAY_PATHS, as_text)?;

    let (home_score, away_score) = match first_of(ev, SCORE_TEXT_PATHS, as_score_text) {
        Some((h, a)) => (Some(h), Some(a)),
        None => (
            first_of(ev, HOME_SCORE_PATHS, as_count),
            first_of(ev, AWAY_SCORE_PATHS, as_count),
        ),
    };

    Some(LiveEvent {
        event_id: first_of(ev, ID_PATHS, as_text).unwrap_or_default(),
        league: first_of(ev, LEAGUE_PATHS, as_text).unwrap_or_default(),
        home_team,
        away_team,
        home_score,
        away_score,
        elapsed_minutes: first_of(ev, ELAPSED_PATHS, as_minute),
        kickoff: first_of(ev, KICKOFF_PATHS, as_timestamp),
    })
}

fn truncate(v: &Value) -> String {
    v.to_string().chars().take(120).collect()
}
