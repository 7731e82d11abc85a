//! Game session: single owner of board, state, timers and distraction policy
//!
//! The host feeds three inputs - `flip`, `start_or_restart` and `advance` - and
//! drains `SessionEvent`s to update the screen and kick off content fetches.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::deal::{Board, build_board};
use super::distraction::{
    DistractionConfig, DistractionOrigin, DistractionRequest, DistractionScheduler, PolicyDecision,
};
use super::state::{FlipOutcome, FlipResult, GamePhase, GameState, RejectReason, Summary};
use super::timers::{TimerKind, TimerQueue};
use crate::consts::*;
use crate::error::Result;

/// Fixed parameters of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub dimension: u32,
    pub max_unique_images: usize,
    pub time_limit_secs: u32,
    pub flip_back_delay_ms: u64,
    pub distractions: DistractionConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            max_unique_images: ARTWORK_COUNT,
            time_limit_secs: TIME_LIMIT_SECS,
            flip_back_delay_ms: FLIP_BACK_DELAY_MS,
            distractions: DistractionConfig::default(),
        }
    }
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Fresh board dealt (page load or restart)
    Dealt,
    /// Clock started
    Started,
    /// An accepted flip
    Flipped(FlipOutcome),
    /// Unmatched cards turned face-down
    FlippedBack { indices: Vec<usize> },
    /// Game clock advanced
    Clock { elapsed_seconds: u32 },
    /// Show a distraction
    Distraction(DistractionRequest),
    /// Terminal transition; emitted once per game
    Finished(Summary),
}

pub struct GameSession {
    config: SessionConfig,
    rng: Pcg32,
    state: GameState,
    scheduler: DistractionScheduler,
    timers: TimerQueue,
    /// Queue time when the current game's clock started
    started_at_ms: Option<u64>,
    events: Vec<SessionEvent>,
    torn_down: bool,
}

impl GameSession {
    /// Deal the first board. The ambient schedule starts immediately.
    pub fn new(config: SessionConfig, seed: u64) -> Result<Self> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = build_board(config.dimension, config.max_unique_images, &mut rng)?;
        let mut session = Self {
            config,
            rng,
            state: GameState::with_time_limit(board, config.time_limit_secs),
            scheduler: DistractionScheduler::new(config.distractions, config.time_limit_secs),
            timers: TimerQueue::new(),
            started_at_ms: None,
            events: vec![SessionEvent::Dealt],
            torn_down: false,
        };
        if config.distractions.ambient_enabled {
            session.arm_ambient(0);
        }
        log::info!("Session created with seed {}", seed);
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn summary(&self) -> Option<Summary> {
        self.state.summary()
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Everything that happened since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// New-game button: deal a fresh board and start the clock
    pub fn start_or_restart(&mut self) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        let board = build_board(self.config.dimension, self.config.max_unique_images, &mut self.rng)?;

        for kind in [
            TimerKind::GameClock,
            TimerKind::PolicyStart,
            TimerKind::PolicyTick,
            TimerKind::FlipBack,
        ] {
            self.timers.cancel_kind(kind);
        }
        self.state = GameState::with_time_limit(board, self.config.time_limit_secs);
        self.started_at_ms = None;
        self.events.push(SessionEvent::Dealt);
        log::info!("New game dealt");

        if self.state.start() {
            self.begin_play();
        }
        Ok(())
    }

    /// Player clicked the card at `index`
    pub fn flip(&mut self, index: usize) -> FlipResult {
        if self.torn_down {
            return FlipResult {
                outcome: FlipOutcome::Rejected(RejectReason::GameOver),
                started: false,
                finished: None,
            };
        }
        let result = self.state.flip(index);
        if result.started {
            self.begin_play();
        }
        if result.outcome.accepted() {
            self.events.push(SessionEvent::Flipped(result.outcome));
        }
        if result.outcome.completes_pair() {
            self.timers.once(TimerKind::FlipBack, self.config.flip_back_delay_ms);
        }
        if let Some(summary) = result.finished {
            self.end_game(summary);
        }
        result
    }

    /// Let `dt_ms` of host time pass, firing every timer that comes due
    pub fn advance(&mut self, dt_ms: u64) {
        if self.torn_down {
            return;
        }
        let until = self.timers.now_ms() + dt_ms;
        while let Some(fired) = self.timers.pop_due(until) {
            match fired.kind {
                TimerKind::GameClock => self.on_clock(),
                TimerKind::FlipBack => {
                    let indices = self.state.flip_back();
                    self.events.push(SessionEvent::FlippedBack { indices });
                }
                TimerKind::PolicyStart => {
                    self.timers
                        .every(TimerKind::PolicyTick, self.config.distractions.policy_interval_ms);
                }
                TimerKind::PolicyTick => self.on_policy_tick(fired.at_ms),
                TimerKind::Ambient => {
                    self.request_distraction(DistractionOrigin::Ambient);
                    self.arm_ambient(until);
                }
            }
        }
        self.timers.settle(until);
    }

    /// Page is going away: cancel everything, including the ambient timer
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timers.clear();
        self.torn_down = true;
        log::info!("Session torn down");
    }

    fn begin_play(&mut self) {
        self.started_at_ms = Some(self.timers.now_ms());
        self.scheduler = DistractionScheduler::new(self.config.distractions, self.config.time_limit_secs);
        self.timers.every(TimerKind::GameClock, CLOCK_TICK_MS);
        if self.config.distractions.policy_enabled {
            self.timers
                .once(TimerKind::PolicyStart, self.config.distractions.policy_start_delay_ms);
        }
        self.events.push(SessionEvent::Started);
    }

    fn end_game(&mut self, summary: Summary) {
        for kind in [TimerKind::GameClock, TimerKind::PolicyStart, TimerKind::PolicyTick] {
            self.timers.cancel_kind(kind);
        }
        self.events.push(SessionEvent::Finished(summary));
    }

    fn on_clock(&mut self) {
        let finished = self.state.tick();
        self.events.push(SessionEvent::Clock {
            elapsed_seconds: self.state.elapsed_seconds,
        });
        if let Some(summary) = finished {
            self.end_game(summary);
        }
    }

    fn on_policy_tick(&mut self, at_ms: u64) {
        let Some(started) = self.started_at_ms else {
            return;
        };
        let elapsed_secs = ((at_ms - started) / 1000) as u32;
        match self.scheduler.decide(elapsed_secs, &mut self.rng) {
            PolicyDecision::Emit => self.request_distraction(DistractionOrigin::Policy),
            PolicyDecision::Skip => {}
            PolicyDecision::Stop => {
                self.timers.cancel_kind(TimerKind::PolicyTick);
            }
        }
    }

    fn request_distraction(&mut self, origin: DistractionOrigin) {
        let kind = self.scheduler.choose_kind(&mut self.rng);
        log::debug!("Distraction requested: {:?} ({:?})", kind, origin);
        self.events
            .push(SessionEvent::Distraction(DistractionRequest { kind, origin }));
    }

    /// Schedule the next ambient request. A deadline that would land inside the
    /// current `advance` window is pushed past `window_end_ms`, so a long host
    /// gap yields one request rather than a replay of every missed one.
    fn arm_ambient(&mut self, window_end_ms: u64) {
        let delay = self.scheduler.ambient_delay_ms(&mut self.rng);
        let mut due_ms = self.timers.now_ms() + delay;
        if due_ms <= window_end_ms {
            due_ms = window_end_ms + delay;
        }
        self.timers.once_at(TimerKind::Ambient, due_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Outcome;

    fn quiet() -> SessionConfig {
        SessionConfig {
            distractions: DistractionConfig::disabled(),
            ..SessionConfig::default()
        }
    }

    fn finished_count(events: &[SessionEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Finished(_)))
            .count()
    }

    fn distractions(events: &[SessionEvent], origin: DistractionOrigin) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Distraction(r) if r.origin == origin))
            .count()
    }

    #[test]
    fn test_new_session_is_not_started() {
        let mut session = GameSession::new(quiet(), 1).unwrap();
        assert_eq!(session.phase(), GamePhase::NotStarted);
        assert_eq!(session.board().len(), 16);
        assert_eq!(session.drain_events(), vec![SessionEvent::Dealt]);

        // Clock does not run before the first flip
        session.advance(10_000);
        assert_eq!(session.state().elapsed_seconds, 0);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_invalid_dimension_surfaces_before_board() {
        let config = SessionConfig {
            dimension: 5,
            ..quiet()
        };
        assert!(matches!(
            GameSession::new(config, 1),
            Err(crate::GameError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_first_flip_starts_clock() {
        let mut session = GameSession::new(quiet(), 2).unwrap();
        session.flip(0);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(session.timers().is_pending(TimerKind::GameClock));
        session.advance(3_500);
        assert_eq!(session.state().elapsed_seconds, 3);
    }

    #[test]
    fn test_out_of_range_click_leaves_clock_stopped() {
        let mut session = GameSession::new(quiet(), 2).unwrap();
        session.drain_events();
        let result = session.flip(999);
        assert!(!result.started);
        assert_eq!(session.phase(), GamePhase::NotStarted);
        assert!(!session.timers().is_pending(TimerKind::GameClock));

        session.advance(5_000);
        assert_eq!(session.state().elapsed_seconds, 0);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_mismatch_flips_back_after_delay() {
        let mut session = GameSession::new(quiet(), 3).unwrap();
        let partner = session.board().partner_of(0).unwrap();
        let other = (1..16).find(|&i| i != partner).unwrap();

        session.flip(0);
        let result = session.flip(other);
        assert!(matches!(result.outcome, FlipOutcome::Mismatched { .. }));

        session.advance(999);
        assert!(!session.board().cards()[0].is_face_down());
        session.advance(1);
        assert!(session.board().cards()[0].is_face_down());
        assert!(session.board().cards()[other].is_face_down());
        assert_eq!(session.state().flipped_count, 0);
    }

    #[test]
    fn test_match_survives_flip_back() {
        let mut session = GameSession::new(quiet(), 4).unwrap();
        let partner = session.board().partner_of(0).unwrap();
        session.flip(0);
        assert!(matches!(
            session.flip(partner).outcome,
            FlipOutcome::Matched { .. }
        ));
        session.advance(2_000);
        assert!(session.board().cards()[0].is_matched());
        assert!(session.board().cards()[partner].is_matched());
    }

    #[test]
    fn test_timeout_ends_once_and_stops_clock() {
        let mut session = GameSession::new(quiet(), 5).unwrap();
        session.flip(0);
        session.advance(300_000);
        assert_eq!(session.phase(), GamePhase::TimedOut);
        assert!(!session.timers().is_pending(TimerKind::GameClock));

        session.advance(60_000);
        let events = session.drain_events();
        assert_eq!(finished_count(&events), 1);
        assert_eq!(session.state().elapsed_seconds, 300);
        assert_eq!(session.summary().unwrap().outcome, Outcome::TimedOut);
    }

    #[test]
    fn test_full_game_in_twenty_moves() {
        let mut session = GameSession::new(quiet(), 2024).unwrap();
        assert_eq!(session.board().pair_count(), 8);

        // Two deliberate misses
        for start in [0usize, 1] {
            let partner = session.board().partner_of(start).unwrap();
            let miss = (0..16)
                .find(|&i| i != start && i != partner)
                .unwrap();
            session.flip(start);
            assert!(matches!(
                session.flip(miss).outcome,
                FlipOutcome::Mismatched { .. }
            ));
            session.advance(1_500);
        }

        // Then clear the board
        for i in 0..16 {
            if !session.board().cards()[i].is_face_down() {
                continue;
            }
            let partner = session.board().partner_of(i).unwrap();
            session.flip(i);
            session.flip(partner);
            session.advance(1_500);
        }

        let summary = session.summary().expect("game finished");
        assert_eq!(summary.outcome, Outcome::Won);
        assert_eq!(summary.total_moves, 20);
        assert!(summary.elapsed_seconds <= 50);
        assert_eq!(session.phase(), GamePhase::Won);
        assert_eq!(finished_count(&session.drain_events()), 1);
        assert!(!session.timers().is_pending(TimerKind::GameClock));
    }

    #[test]
    fn test_restart_deals_fresh_game() {
        let mut session = GameSession::new(quiet(), 6).unwrap();
        session.flip(0);
        session.advance(5_000);
        session.start_or_restart().unwrap();

        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.state().total_moves, 0);
        assert_eq!(session.state().elapsed_seconds, 0);
        assert!(session.board().cards().iter().all(|c| c.is_face_down()));
        session.advance(2_000);
        assert_eq!(session.state().elapsed_seconds, 2);
    }

    #[test]
    fn test_policy_window() {
        let config = SessionConfig {
            distractions: DistractionConfig {
                ambient_enabled: false,
                // Always emit so every poll is visible
                base_chance: 1.0,
                urgent_chance: 1.0,
                ..DistractionConfig::default()
            },
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(config, 7).unwrap();
        session.flip(0);

        session.advance(39_999);
        assert_eq!(distractions(&session.drain_events(), DistractionOrigin::Policy), 0);

        // Polls at 40s, 50s, ... 260s emit; 270s (30s left) stops
        session.advance(240_001);
        assert_eq!(distractions(&session.drain_events(), DistractionOrigin::Policy), 23);
        assert!(!session.timers().is_pending(TimerKind::PolicyTick));
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_ambient_runs_without_play_until_teardown() {
        let config = SessionConfig {
            distractions: DistractionConfig {
                policy_enabled: false,
                ..DistractionConfig::default()
            },
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(config, 8).unwrap();
        // Step like the host driver does
        for _ in 0..600 {
            session.advance(100);
        }
        let count = distractions(&session.drain_events(), DistractionOrigin::Ambient);
        assert!((12..=30).contains(&count), "got {count}");
        assert_eq!(session.phase(), GamePhase::NotStarted);

        session.teardown();
        session.advance(60_000);
        assert!(session.drain_events().is_empty());
        assert!(session.timers().is_empty());
    }

    #[test]
    fn test_long_host_gap_yields_one_ambient_request() {
        let config = SessionConfig {
            distractions: DistractionConfig {
                policy_enabled: false,
                ..DistractionConfig::default()
            },
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(config, 9).unwrap();
        session.drain_events();

        session.advance(120_000);
        assert_eq!(distractions(&session.drain_events(), DistractionOrigin::Ambient), 1);
        assert!(session.timers().is_pending(TimerKind::Ambient));

        // Normal cadence resumes afterwards
        session.advance(AMBIENT_MIN_DELAY_MS - 1);
        assert!(session.drain_events().is_empty());
        session.advance(AMBIENT_MAX_DELAY_MS - AMBIENT_MIN_DELAY_MS + 1);
        assert_eq!(distractions(&session.drain_events(), DistractionOrigin::Ambient), 1);
    }

    #[test]
    fn test_game_continues_after_host_pause_without_teardown() {
        let mut session = GameSession::new(quiet(), 10).unwrap();
        session.flip(0);
        session.advance(4_000);
        // Host frozen, then resumed without counting the frozen time
        session.advance(0);
        let partner = session.board().partner_of(0).unwrap();
        assert!(matches!(
            session.flip(partner).outcome,
            FlipOutcome::Matched { .. }
        ));
        session.advance(1_000);
        assert!(!session.is_torn_down());
        assert_eq!(session.state().elapsed_seconds, 5);
        assert!(session.timers().is_pending(TimerKind::GameClock));
    }
}
