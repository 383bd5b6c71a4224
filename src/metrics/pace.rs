use crate::config::game_clock::{GAME_MINUTES, HALF_MINUTES};
use crate::config::{InsightPolicy, AVERAGE_PACE};
use crate::metrics::classifier;
use crate::types::{GameMetrics, GameSnapshot};

/// Derive the pace and insight metrics for one game.
///
/// Pure: the result depends only on `game` and `policy`. Never panics; any
/// missing or malformed input has already been defaulted to zero at the
/// scoreboard boundary, and the clock parser defaults its own parts.
pub fn compute_metrics(game: &GameSnapshot, policy: &InsightPolicy) -> GameMetrics {
    let minutes_left = parse_clock(game.clock.as_deref());
    let first_half = game.period <= 1;

    let minutes_played = if first_half {
        HALF_MINUTES - minutes_left
    } else {
        GAME_MINUTES - minutes_left
    };
    let total_points = f64::from(game.home_score) + f64::from(game.away_score);

    // Unrounded pace feeds every downstream figure; only the display is rounded.
    let pace = if minutes_played > 0.0 {
        total_points / minutes_played * GAME_MINUTES
    } else {
        0.0
    };

    let minutes_remaining = if first_half {
        HALF_MINUTES + minutes_left
    } else {
        minutes_left
    };
    let projected_total = round_half_up(total_points + pace / GAME_MINUTES * minutes_remaining);

    GameMetrics {
        pace: round_half_up(pace).max(0.0) as u32,
        projected_total: projected_total.max(0.0) as u32,
        pace_vs_average: round_half_up(pace - AVERAGE_PACE) as i32,
        over_under_edge: classifier::over_under_edge(projected_total, policy),
        game_tempo: classifier::tempo(pace, policy),
        blowout_risk: classifier::blowout_risk(game.home_score, game.away_score),
    }
}

/// Minutes left in the current period.
///
/// Accepts "M:SS" and ESPN's sub-minute "SS.s" form. `None` reads as "0:00";
/// a malformed component reads as 0.
pub fn parse_clock(clock: Option<&str>) -> f64 {
    let Some(raw) = clock.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0.0;
    };
    let minutes_left = match raw.split_once(':') {
        Some((m, s)) => leading_number(m) + leading_number(s) / 60.0,
        None => leading_number(raw) / 60.0,
    };
    minutes_left.max(0.0)
}

/// Rounds .5 toward +∞, so -2.5 → -2 and 2.5 → 3.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Parses the leading numeric prefix of `s` ("08" → 8, "45.3" → 45.3,
/// "1x" → 1). Anything without a numeric prefix is 0.
fn leading_number(s: &str) -> f64 {
    let s = s.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}
