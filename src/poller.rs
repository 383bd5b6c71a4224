use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::{Config, FallbackMode};
use crate::demo::demo_games;
use crate::error::Result;
use crate::fetcher::{build_client, fetch_live_games, FetchStats};
use crate::state::GameBoard;
use crate::types::LiveGame;

/// What a single poll did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Board replaced with this many live games.
    Live(usize),
    /// Poll failed; previous games kept.
    Retained,
    /// Poll failed; demo games published.
    Demo,
}

/// Cloneable "poll now" button, handed to the API.
#[derive(Clone, Default)]
pub struct PollTrigger(Arc<Notify>);

impl PollTrigger {
    pub fn new() -> Self {
        Self(Arc::new(Notify::new()))
    }

    /// Requests an immediate poll. Requests made while a poll is in flight
    /// collapse into a single follow-up poll.
    pub fn trigger(&self) {
        self.0.notify_one();
    }
}

/// Owner of a running poller. Dropping it without `stop` also ends the loop
/// at its next wakeup.
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    trigger: PollTrigger,
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub fn trigger_handle(&self) -> PollTrigger {
        self.trigger.clone()
    }

    /// Stop the timer and wait for the loop to exit. An in-flight fetch is
    /// abandoned; the board keeps whatever was last published.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            warn!("Poller task ended abnormally: {e}");
        }
    }
}

/// Fetches the scoreboard on a fixed period and publishes live games to the
/// board. Ticks run strictly one after another on a single task, so two polls
/// never overlap; ticks that come due during a slow poll are skipped.
pub struct ScoreboardPoller {
    cfg: Config,
    client: reqwest::Client,
    board: Arc<GameBoard>,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
    /// Precomputed fallback set; only used with `FallbackMode::Demo`.
    demo: Vec<LiveGame>,
}

impl ScoreboardPoller {
    pub fn new(
        cfg: Config,
        board: Arc<GameBoard>,
        health: Arc<HealthState>,
        latency: Arc<LatencyStats>,
    ) -> Result<Self> {
        let client = build_client(&cfg)?;
        let demo = demo_games(&cfg.policy);
        Ok(Self { cfg, client, board, health, latency, demo })
    }

    pub fn start(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let trigger = PollTrigger::new();
        let join = tokio::spawn(self.run(shutdown_rx, Arc::clone(&trigger.0)));
        PollerHandle { shutdown_tx, trigger, join }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, refresh: Arc<Notify>) {
        let period = Duration::from_secs(self.cfg.poll_interval_secs);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.health.set_poller_running(true);
        info!(
            interval_secs = self.cfg.poll_interval_secs,
            fallback = %self.cfg.fallback_mode,
            "Poller started against {}",
            self.cfg.scoreboard_url,
        );

        loop {
            // The first tick completes immediately.
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
                _ = refresh.notified() => ticker.reset(),
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    self.health.set_poll_in_flight(false);
                    break;
                }
                outcome = self.poll_once() => debug!(?outcome, "Poll finished"),
            }
        }

        self.health.set_poller_running(false);
        info!("Poller stopped");
    }

    /// One fetch → transform → publish cycle. Never returns an error; failures
    /// are logged and resolved by the fallback mode.
    pub async fn poll_once(&self) -> PollOutcome {
        self.health.set_poll_in_flight(true);
        let started = Instant::now();
        let result = fetch_live_games(&self.client, &self.cfg).await;
        self.health.set_poll_in_flight(false);

        if result.is_ok() {
            self.latency.record(started.elapsed());
        }
        self.apply(result)
    }

    fn apply(&self, result: Result<(Vec<LiveGame>, FetchStats)>) -> PollOutcome {
        match result {
            Ok((games, stats)) => {
                let live = games.len();
                self.board.replace_live(games);
                self.health.record_success(self.board.current().updated_at_ns);
                info!(
                    event = "POLL_OK",
                    live,
                    api_total = stats.api_total,
                    final_games = stats.rejected_final,
                    not_live = stats.rejected_not_live,
                    malformed = stats.rejected_malformed,
                    "Board updated: {live} live of {} events",
                    stats.api_total,
                );
                PollOutcome::Live(live)
            }
            Err(e) => {
                let failures = self.health.record_failure();
                error!(event = "POLL_FAILED", consecutive = failures, "Scoreboard poll failed: {e}");
                match self.cfg.fallback_mode {
                    FallbackMode::Retain => {
                        self.board.mark_stale();
                        PollOutcome::Retained
                    }
                    FallbackMode::Demo => {
                        self.board.replace_demo(self.demo.clone());
                        PollOutcome::Demo
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightPolicy;
    use crate::error::AppError;
    use crate::fetcher::{parse_scoreboard, to_live_games};
    use crate::types::BoardSource;

    const ONE_LIVE: &str = r#"{"events":[{
        "id": "77",
        "status": { "type": { "name": "STATUS_IN_PROGRESS" } },
        "competitions": [{
            "competitors": [
                { "homeAway": "home", "team": { "displayName": "Auburn Tigers" }, "score": "33" },
                { "homeAway": "away", "team": { "displayName": "Alabama Crimson Tide" }, "score": "30" }
            ],
            "status": { "clockDisplayValue": "3:00", "period": 1, "type": { "detail": "3:00 - 1st Half" } }
        }]
    }]}"#;

    fn test_config(url: &str, fallback_mode: FallbackMode, poll_interval_secs: u64) -> Config {
        Config {
            scoreboard_url: url.to_string(),
            log_level: "debug".to_string(),
            api_port: 0,
            poll_interval_secs,
            request_timeout_secs: 1,
            fallback_mode,
            policy: InsightPolicy::standard(),
        }
    }

    fn poller(fallback_mode: FallbackMode) -> ScoreboardPoller {
        poller_at("http://127.0.0.1:9/scoreboard", fallback_mode)
    }

    fn poller_at(url: &str, fallback_mode: FallbackMode) -> ScoreboardPoller {
        ScoreboardPoller::new(
            test_config(url, fallback_mode, 3600),
            GameBoard::new(),
            Arc::new(HealthState::new()),
            Arc::new(LatencyStats::new()),
        )
        .unwrap()
    }

    fn live_result() -> Result<(Vec<LiveGame>, FetchStats)> {
        let (snapshots, stats) = parse_scoreboard(ONE_LIVE)?;
        Ok((to_live_games(snapshots, &InsightPolicy::standard()), stats))
    }

    #[tokio::test]
    async fn success_publishes_live_board() {
        let p = poller(FallbackMode::Retain);
        assert_eq!(p.apply(live_result()), PollOutcome::Live(1));
        assert_eq!(p.board.source(), BoardSource::Live);
        assert_eq!(p.board.find("77").unwrap().home_team, "Auburn Tigers");
        assert_eq!(p.health.consecutive_failures(), 0);
        assert!(p.health.last_success_at_ns() > 0);
        assert_eq!(p.health.last_success_at_ns(), p.board.current().updated_at_ns);
    }

    #[tokio::test]
    async fn retain_mode_keeps_last_known_games() {
        let p = poller(FallbackMode::Retain);
        p.apply(live_result());
        let outcome = p.apply(Err(AppError::Upstream(503)));
        assert_eq!(outcome, PollOutcome::Retained);
        assert_eq!(p.board.source(), BoardSource::Stale);
        assert_eq!(p.board.len(), 1);
        assert_eq!(p.health.consecutive_failures(), 1);
    }

    #[tokio::test]
    async fn retain_mode_before_any_success_stays_empty() {
        let p = poller(FallbackMode::Retain);
        p.apply(Err(AppError::Upstream(500)));
        assert_eq!(p.board.source(), BoardSource::Empty);
        assert_eq!(p.board.len(), 0);
    }

    #[tokio::test]
    async fn demo_mode_replaces_with_demo_set() {
        let p = poller(FallbackMode::Demo);
        p.apply(live_result());
        assert_eq!(p.apply(Err(AppError::Upstream(502))), PollOutcome::Demo);
        assert_eq!(p.board.source(), BoardSource::Demo);
        assert!(p.board.find("77").is_none());
        assert!(p.board.find("demo-1").is_some());
    }

    #[tokio::test]
    async fn recovery_replaces_demo_with_live() {
        let p = poller(FallbackMode::Demo);
        p.apply(Err(AppError::Upstream(502)));
        p.apply(live_result());
        assert_eq!(p.board.source(), BoardSource::Live);
        assert_eq!(p.board.len(), 1);
    }

    async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if cond() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    #[tokio::test]
    async fn start_polls_immediately_and_stop_ends_loop() {
        let p = poller(FallbackMode::Demo);
        let board = Arc::clone(&p.board);
        let health = Arc::clone(&p.health);

        let handle = p.start();
        assert!(wait_for(|| board.source() == BoardSource::Demo).await);
        assert!(health.poller_running());

        handle.stop().await;
        assert!(!health.poller_running());
    }

    #[tokio::test]
    async fn trigger_runs_an_extra_poll() {
        let p = poller(FallbackMode::Retain);
        let health = Arc::clone(&p.health);

        let handle = p.start();
        assert!(wait_for(|| health.polls_total() == 1).await);
        handle.trigger_handle().trigger();
        assert!(wait_for(|| health.polls_total() == 2).await);

        handle.stop().await;
    }

    /// Accepts connections and never answers, so every fetch runs until the
    /// request timeout.
    async fn stalled_scoreboard() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}/scoreboard")
    }

    #[tokio::test]
    async fn triggers_during_a_poll_collapse_into_one_follow_up() {
        let url = stalled_scoreboard().await;
        let p = poller_at(&url, FallbackMode::Retain);
        let health = Arc::clone(&p.health);

        let handle = p.start();
        assert!(wait_for(|| health.poll_in_flight()).await);
        assert_eq!(health.polls_total(), 0);

        let trigger = handle.trigger_handle();
        for _ in 0..5 {
            trigger.trigger();
        }

        // First poll times out after 1s, then exactly one follow-up runs.
        assert!(wait_for(|| health.polls_total() == 2).await);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(health.polls_total(), 2);
        assert!(!health.poll_in_flight());

        handle.stop().await;
    }
}
