use crate::error::{AppError, Result};

pub const SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/basketball/mens-college-basketball/scoreboard";

/// Poll period (seconds). One fetch → transform → publish per tick.
pub const POLL_INTERVAL_SECS: u64 = 8;

/// Scoreboard request timeout (seconds). Must stay below the poll period.
pub const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Status name ESPN uses for a finished game.
pub const STATUS_FINAL: &str = "STATUS_FINAL";

/// Substring of the status detail that marks an in-progress clock/period line,
/// e.g. "8:45 - 2nd Half". Halftime and scheduled tip-off lines lack it.
pub const LIVE_DETAIL_SEPARATOR: &str = " - ";

/// Placeholder for any missing textual field.
pub const UNKNOWN_TEAM: &str = "Unknown";

/// Game clock model: two 20-minute halves.
pub mod game_clock {
    pub const HALF_MINUTES: f64 = 20.0;
    pub const GAME_MINUTES: f64 = 40.0;
}

/// Reference pace for a men's college game (points per 40 minutes).
pub const AVERAGE_PACE: f64 = 70.0;

/// Blowout risk: margins at or below this are 0%, each extra point adds 5%.
pub mod blowout {
    pub const SAFE_MARGIN: u32 = 15;
    pub const PERCENT_PER_POINT: u32 = 5;
}

/// Default "standard" insight policy thresholds.
pub mod insight_thresholds {
    /// Projected total above this → OVER_LEAN.
    pub const OVER_TOTAL: f64 = 140.0;
    /// Projected total below this → UNDER_LEAN.
    pub const UNDER_TOTAL: f64 = 130.0;
    /// Pace above this → HOT.
    pub const HOT_PACE: f64 = 75.0;
    /// Pace below this → COLD.
    pub const COLD_PACE: f64 = 65.0;
}

/// Named threshold set for the O/U edge and tempo classifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightPolicy {
    pub over_total: f64,
    pub under_total: f64,
    pub hot_pace: f64,
    pub cold_pace: f64,
}

impl InsightPolicy {
    pub const fn standard() -> Self {
        Self {
            over_total: insight_thresholds::OVER_TOTAL,
            under_total: insight_thresholds::UNDER_TOTAL,
            hot_pace: insight_thresholds::HOT_PACE,
            cold_pace: insight_thresholds::COLD_PACE,
        }
    }

    /// Thresholds must be finite, with under <= over and cold <= hot.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("OU_OVER_TOTAL", self.over_total),
            ("OU_UNDER_TOTAL", self.under_total),
            ("TEMPO_HOT_PACE", self.hot_pace),
            ("TEMPO_COLD_PACE", self.cold_pace),
        ];
        if let Some((key, value)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AppError::Config(format!(
                "{key} must be a finite number, got {value}"
            )));
        }
        if self.under_total > self.over_total {
            return Err(AppError::Config(
                "OU_UNDER_TOTAL must not exceed OU_OVER_TOTAL".to_string(),
            ));
        }
        if self.cold_pace > self.hot_pace {
            return Err(AppError::Config(
                "TEMPO_COLD_PACE must not exceed TEMPO_HOT_PACE".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// What the board shows after a failed poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMode {
    /// Keep the last known games and mark the board stale.
    Retain,
    /// Replace the board with the static demo games.
    Demo,
}

impl std::str::FromStr for FallbackMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(FallbackMode::Retain),
            "demo" => Ok(FallbackMode::Demo),
            other => Err(AppError::Config(format!(
                "FALLBACK_MODE must be 'retain' or 'demo', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackMode::Retain => write!(f, "retain"),
            FallbackMode::Demo => write!(f, "demo"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scoreboard_url: String,
    pub log_level: String,
    pub api_port: u16,
    /// Seconds between polls (POLL_INTERVAL_SECS)
    pub poll_interval_secs: u64,
    /// Scoreboard request timeout (REQUEST_TIMEOUT_SECS)
    pub request_timeout_secs: u64,
    /// Behaviour on a failed poll (FALLBACK_MODE=retain|demo)
    pub fallback_mode: FallbackMode,
    /// O/U and tempo thresholds (OU_OVER_TOTAL, OU_UNDER_TOTAL, TEMPO_HOT_PACE, TEMPO_COLD_PACE)
    pub policy: InsightPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let poll_interval_secs = env_parse("POLL_INTERVAL_SECS", POLL_INTERVAL_SECS).max(1);
        let request_timeout_secs = env_parse("REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS).max(1);

        let policy = InsightPolicy {
            over_total: env_parse("OU_OVER_TOTAL", insight_thresholds::OVER_TOTAL),
            under_total: env_parse("OU_UNDER_TOTAL", insight_thresholds::UNDER_TOTAL),
            hot_pace: env_parse("TEMPO_HOT_PACE", insight_thresholds::HOT_PACE),
            cold_pace: env_parse("TEMPO_COLD_PACE", insight_thresholds::COLD_PACE),
        };
        policy.validate()?;

        Ok(Self {
            scoreboard_url: std::env::var("SCOREBOARD_URL")
                .unwrap_or_else(|_| SCOREBOARD_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            poll_interval_secs,
            request_timeout_secs,
            fallback_mode: std::env::var("FALLBACK_MODE")
                .unwrap_or_else(|_| "retain".to_string())
                .parse()?,
            policy,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
