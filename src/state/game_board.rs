use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Board, BoardSource, LiveGame};

// ---------------------------------------------------------------------------
// GameBoard
// ---------------------------------------------------------------------------

/// The single "current games" value for a scanner session.
///
/// Written only by the poller, one whole board at a time; readers always see
/// either the previous board or the next one, never a mix.
pub struct GameBoard {
    inner: RwLock<Arc<Board>>,
}

impl GameBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(Arc::new(Board::default())),
        })
    }

    /// Publish the result of a successful poll. An empty list is a valid
    /// result (no games on right now).
    pub fn replace_live(&self, games: Vec<LiveGame>) {
        self.publish(Board {
            games,
            source: BoardSource::Live,
            updated_at_ns: now_ns(),
        });
    }

    /// Publish the static fallback set after a failed poll.
    pub fn replace_demo(&self, games: Vec<LiveGame>) {
        self.publish(Board {
            games,
            source: BoardSource::Demo,
            updated_at_ns: now_ns(),
        });
    }

    /// Keep the current games after a failed poll. A live board becomes
    /// stale; empty, stale and demo boards are left as they are.
    pub fn mark_stale(&self) {
        let current = self.current();
        if current.source != BoardSource::Live {
            return;
        }
        self.publish(Board {
            games: current.games.clone(),
            source: BoardSource::Stale,
            updated_at_ns: current.updated_at_ns,
        });
    }

    /// Cheap handle on the current board.
    pub fn current(&self) -> Arc<Board> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn find(&self, game_id: &str) -> Option<LiveGame> {
        self.current().games.iter().find(|g| g.id == game_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.current().games.len()
    }

    pub fn source(&self) -> BoardSource {
        self.current().source
    }

    fn publish(&self, board: Board) {
        let next = Arc::new(board);
        match self.inner.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameMetrics, OverUnderEdge, Tempo};

    fn game(id: &str) -> LiveGame {
        LiveGame {
            id: id.to_string(),
            home_team: "Arizona Wildcats".to_string(),
            away_team: "UCLA Bruins".to_string(),
            home_score: 40,
            away_score: 38,
            clock: "2:10 - 1st Half".to_string(),
            period: 1,
            status: "in_progress".to_string(),
            metrics: GameMetrics {
                pace: 88,
                projected_total: 170,
                pace_vs_average: 18,
                over_under_edge: OverUnderEdge::OverLean,
                game_tempo: Tempo::Hot,
                blowout_risk: 0,
            },
        }
    }

    #[test]
    fn starts_empty() {
        let board = GameBoard::new();
        assert_eq!(board.source(), BoardSource::Empty);
        assert_eq!(board.len(), 0);
        assert_eq!(board.current().updated_at_ns, 0);
    }

    #[test]
    fn replace_live_swaps_whole_list() {
        let board = GameBoard::new();
        board.replace_live(vec![game("a"), game("b")]);
        board.replace_live(vec![game("c")]);
        assert_eq!(board.len(), 1);
        assert!(board.find("a").is_none());
        assert_eq!(board.find("c").unwrap().id, "c");
        assert_eq!(board.source(), BoardSource::Live);
    }

    #[test]
    fn held_snapshot_survives_replacement() {
        let board = GameBoard::new();
        board.replace_live(vec![game("a")]);
        let held = board.current();
        board.replace_live(Vec::new());
        assert_eq!(held.games.len(), 1);
        assert_eq!(board.len(), 0);
    }

    #[test]
    fn mark_stale_keeps_games() {
        let board = GameBoard::new();
        board.replace_live(vec![game("a")]);
        let stamped = board.current().updated_at_ns;
        board.mark_stale();
        assert_eq!(board.source(), BoardSource::Stale);
        assert_eq!(board.len(), 1);
        assert_eq!(board.current().updated_at_ns, stamped);
    }

    #[test]
    fn mark_stale_leaves_empty_and_demo_alone() {
        let board = GameBoard::new();
        board.mark_stale();
        assert_eq!(board.source(), BoardSource::Empty);

        board.replace_demo(vec![game("demo")]);
        board.mark_stale();
        assert_eq!(board.source(), BoardSource::Demo);
    }
}
