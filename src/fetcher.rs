use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::{Config, InsightPolicy};
use crate::error::{AppError, Result};
use crate::metrics::compute_metrics;
use crate::scoreboard::{classify_event, EventDisposition};
use crate::types::{GameSnapshot, LiveGame};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStats {
    pub api_total: usize,
    pub rejected_final: usize,
    pub rejected_not_live: usize,
    pub rejected_malformed: usize,
    pub live: usize,
}

pub fn build_client(cfg: &Config) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()?)
}

/// Fetch the scoreboard once and return the live games with metrics attached.
pub async fn fetch_live_games(
    client: &reqwest::Client,
    cfg: &Config,
) -> Result<(Vec<LiveGame>, FetchStats)> {
    let resp = client.get(&cfg.scoreboard_url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::Upstream(status.as_u16()));
    }
    let body = resp.text().await?;

    let (snapshots, stats) = parse_scoreboard(&body)?;
    debug!(
        api_total = stats.api_total,
        live = stats.live,
        "Scoreboard parsed: {} live of {} events",
        stats.live,
        stats.api_total,
    );
    Ok((to_live_games(snapshots, &cfg.policy), stats))
}

/// Parse a scoreboard document into live game snapshots.
///
/// Only a document that is not JSON, or whose `events` is not an array, is an
/// error. Individual bad records are counted and skipped; a missing `events`
/// key means no games.
pub fn parse_scoreboard(body: &str) -> Result<(Vec<GameSnapshot>, FetchStats)> {
    let doc: Value = serde_json::from_str(body)?;
    let events = match doc.get("events") {
        None | Some(Value::Null) => return Ok((Vec::new(), FetchStats::default())),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(AppError::Schema(format!(
                "`events` must be an array, got {}",
                json_kind(other)
            )))
        }
    };

    let mut stats = FetchStats {
        api_total: events.len(),
        ..FetchStats::default()
    };
    let mut games = Vec::new();
    for (index, raw) in events.iter().enumerate() {
        match classify_event(index, raw) {
            EventDisposition::Live(g) => games.push(g),
            EventDisposition::Final => stats.rejected_final += 1,
            EventDisposition::NotLive => stats.rejected_not_live += 1,
            EventDisposition::Malformed => stats.rejected_malformed += 1,
        }
    }
    stats.live = games.len();
    Ok((games, stats))
}

pub fn to_live_games(snapshots: Vec<GameSnapshot>, policy: &InsightPolicy) -> Vec<LiveGame> {
    snapshots
        .into_iter()
        .map(|g| {
            let metrics = compute_metrics(&g, policy);
            LiveGame::new(g, metrics)
        })
        .collect()
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
