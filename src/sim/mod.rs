//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time only advances through the session's timer queue
//! - No rendering or platform dependencies

pub mod deal;
pub mod distraction;
pub mod session;
pub mod shuffle;
pub mod state;
pub mod timers;

pub use deal::{Board, Card, CardFace, PairKey, build_board, parse_dimension};
pub use distraction::{
    DistractionConfig, DistractionEvent, DistractionKind, DistractionOrigin, DistractionRequest,
    DistractionScheduler, PolicyDecision,
};
pub use session::{GameSession, SessionConfig, SessionEvent};
pub use shuffle::{pick_random, shuffle};
pub use state::{FlipOutcome, FlipResult, GamePhase, GameState, Outcome, RejectReason, Summary};
pub use timers::{TimerKind, TimerQueue};
