use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct BoardResponse {
    pub source: String,
    pub updated_at_ns: u64,
    pub games: Vec<GameResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct GameResponse {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub clock: String,
    pub period: u32,
    #[serde(default)]
    pub status: String,
    pub metrics: MetricsResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsResponse {
    pub pace: u32,
    pub projected_total: u32,
    pub pace_vs_average: i32,
    /// OVER_LEAN | UNDER_LEAN | NEUTRAL
    pub over_under_edge: String,
    /// HOT | COLD | NEUTRAL
    pub game_tempo: String,
    pub blowout_risk: u8,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct HealthResponse {
    pub poller_running: bool,
    pub poll_in_flight: bool,
    pub source: String,
    pub live_games: usize,
    pub last_success_at_ns: Option<u64>,
    pub polls_total: u64,
    pub polls_failed: u64,
    pub consecutive_failures: u64,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub board: BoardResponse,
    pub health: HealthResponse,
    /// False until the first board arrives.
    pub loaded: bool,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            board: BoardResponse::default(),
            health: HealthResponse::default(),
            loaded: false,
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    /// Ask the scanner to poll now, then pull the board.
    pub async fn force_refresh(&mut self, client: &reqwest::Client) {
        let url = format!("{}/refresh", self.base_url);
        let _ = client.post(&url).send().await;
        self.refresh(client).await;
    }

    /// On any error the previous board stays on screen and the header shows
    /// the error.
    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let games_url = format!("{}/games", self.base_url);
        let health_url = format!("{}/health", self.base_url);

        let (games_res, health_res) = tokio::join!(
            client.get(&games_url).send(),
            client.get(&health_url).send(),
        );

        let resp = match games_res {
            Ok(r) => r,
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("{e}"));
                return;
            }
        };
        if !resp.status().is_success() {
            self.status = ConnectionStatus::Error(format!("HTTP {}", resp.status()));
            return;
        }

        match resp.json::<BoardResponse>().await {
            Ok(board) => {
                self.board = board;
                self.loaded = true;
                self.status = ConnectionStatus::Connected;
                self.last_refresh = std::time::Instant::now();

                if let Ok(h) = health_res {
                    if let Ok(health) = h.json::<HealthResponse>().await {
                        self.health = health;
                    }
                }
            }
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("parse error: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// "+12", "-4", "0".
pub fn format_signed(v: i32) -> String {
    if v > 0 {
        format!("+{v}")
    } else {
        v.to_string()
    }
}

/// "OVER_LEAN" → "OVER LEAN".
pub fn format_label(raw: &str) -> String {
    raw.replace('_', " ")
}

/// Colour band for blowout risk: 0 = green, 1 = yellow (>30), 2 = red (>60).
pub fn blowout_band(risk: u8) -> u8 {
    if risk > 60 {
        2
    } else if risk > 30 {
        1
    } else {
        0
    }
}

pub fn format_age(last_refresh: std::time::Instant) -> String {
    let secs = last_refresh.elapsed().as_secs();
    if secs < 60 {
        format!("{secs}s ago")
    } else {
        format!("{}m ago", secs / 60)
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
