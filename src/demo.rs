//! Static fallback games shown when the scoreboard is unreachable and the
//! scanner runs with `FALLBACK_MODE=demo`.

use crate::config::InsightPolicy;
use crate::fetcher::to_live_games;
use crate::types::{GameSnapshot, GameStatus, LiveGame};

struct DemoGame {
    id: &'static str,
    home: &'static str,
    away: &'static str,
    home_score: u32,
    away_score: u32,
    clock: &'static str,
    period: u32,
    detail: &'static str,
}

const DEMO_GAMES: &[DemoGame] = &[
    DemoGame {
        id: "demo-1",
        home: "Duke Blue Devils",
        away: "North Carolina Tar Heels",
        home_score: 45,
        away_score: 42,
        clock: "12:34",
        period: 2,
        detail: "12:34 - 2nd Half",
    },
    DemoGame {
        id: "demo-2",
        home: "Kentucky Wildcats",
        away: "Tennessee Volunteers",
        home_score: 28,
        away_score: 31,
        clock: "5:12",
        period: 1,
        detail: "5:12 - 1st Half",
    },
    DemoGame {
        id: "demo-3",
        home: "Gonzaga Bulldogs",
        away: "Saint Mary's Gaels",
        home_score: 61,
        away_score: 39,
        clock: "9:50",
        period: 2,
        detail: "9:50 - 2nd Half",
    },
];

pub fn demo_snapshots() -> Vec<GameSnapshot> {
    DEMO_GAMES
        .iter()
        .map(|d| GameSnapshot {
            id: d.id.to_string(),
            home_team: d.home.to_string(),
            away_team: d.away.to_string(),
            home_score: d.home_score,
            away_score: d.away_score,
            clock: Some(d.clock.to_string()),
            period: d.period,
            status_detail: d.detail.to_string(),
            status: GameStatus::InProgress,
        })
        .collect()
}

pub fn demo_games(policy: &InsightPolicy) -> Vec<LiveGame> {
    to_live_games(demo_snapshots(), policy)
}
