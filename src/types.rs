use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Game snapshot — validated at the scoreboard boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Halftime,
    EndOfPeriod,
    Final,
    Other(String),
}

impl GameStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "STATUS_SCHEDULED" => GameStatus::Scheduled,
            "STATUS_IN_PROGRESS" => GameStatus::InProgress,
            "STATUS_HALFTIME" => GameStatus::Halftime,
            "STATUS_END_PERIOD" => GameStatus::EndOfPeriod,
            crate::config::STATUS_FINAL => GameStatus::Final,
            other => GameStatus::Other(other.to_string()),
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, GameStatus::Final)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Scheduled => write!(f, "scheduled"),
            GameStatus::InProgress => write!(f, "in_progress"),
            GameStatus::Halftime => write!(f, "halftime"),
            GameStatus::EndOfPeriod => write!(f, "end_of_period"),
            GameStatus::Final => write!(f, "final"),
            GameStatus::Other(name) => write!(f, "{name}"),
        }
    }
}

/// One game as read from the scoreboard, with every optional field defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    /// Raw clock display ("M:SS"); `None` reads as "0:00".
    pub clock: Option<String>,
    /// 1 = first half, anything later runs on the 40-minute model.
    pub period: u32,
    /// Human status line, e.g. "8:45 - 2nd Half".
    pub status_detail: String,
    pub status: GameStatus,
}

// ---------------------------------------------------------------------------
// Derived metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverUnderEdge {
    OverLean,
    UnderLean,
    Neutral,
}

impl std::fmt::Display for OverUnderEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OverUnderEdge::OverLean => "OVER LEAN",
            OverUnderEdge::UnderLean => "UNDER LEAN",
            OverUnderEdge::Neutral => "NEUTRAL",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OverUnderEdge {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "over_lean" | "over" => Ok(OverUnderEdge::OverLean),
            "under_lean" | "under" => Ok(OverUnderEdge::UnderLean),
            "neutral" => Ok(OverUnderEdge::Neutral),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tempo {
    Hot,
    Cold,
    Neutral,
}

impl std::fmt::Display for Tempo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tempo::Hot => "HOT",
            Tempo::Cold => "COLD",
            Tempo::Neutral => "NEUTRAL",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Tempo {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "hot" => Ok(Tempo::Hot),
            "cold" => Ok(Tempo::Cold),
            "neutral" => Ok(Tempo::Neutral),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Points per 40 minutes of elapsed game time.
    pub pace: u32,
    pub projected_total: u32,
    pub pace_vs_average: i32,
    pub over_under_edge: OverUnderEdge,
    pub game_tempo: Tempo,
    /// 0–100.
    pub blowout_risk: u8,
}

/// Display record for one live game. Rebuilt on every poll; `id` is the only
/// thing that carries across polls, and only as a display key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveGame {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    /// Status detail shown as the clock line.
    pub clock: String,
    pub period: u32,
    /// Scoreboard status name, e.g. "in_progress".
    pub status: String,
    pub metrics: GameMetrics,
}

impl LiveGame {
    pub fn new(snapshot: GameSnapshot, metrics: GameMetrics) -> Self {
        Self {
            id: snapshot.id,
            home_team: snapshot.home_team,
            away_team: snapshot.away_team,
            home_score: snapshot.home_score,
            away_score: snapshot.away_score,
            clock: snapshot.status_detail,
            period: snapshot.period,
            status: snapshot.status.to_string(),
            metrics,
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardSource {
    /// No poll has completed yet.
    Empty,
    /// Last poll succeeded.
    Live,
    /// Last poll failed; games are from an earlier success.
    Stale,
    /// Last poll failed; games are the static demo set.
    Demo,
}

impl std::fmt::Display for BoardSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BoardSource::Empty => "empty",
            BoardSource::Live => "live",
            BoardSource::Stale => "stale",
            BoardSource::Demo => "demo",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub games: Vec<LiveGame>,
    pub source: BoardSource,
    /// Nanosecond UTC epoch of the last replacement (0 = never).
    pub updated_at_ns: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            games: Vec::new(),
            source: BoardSource::Empty,
            updated_at_ns: 0,
        }
    }
}
