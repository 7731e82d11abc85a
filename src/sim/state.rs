//! Game state and the flip/match/win/timeout state machine
//!
//! Everything here is synchronous. Delays (flip-back, the clock) belong to the
//! session driving this state; the state only reports when they are needed.

use serde::{Deserialize, Serialize};

use super::deal::{Board, CardFace};
use crate::consts::*;

/// Top-level lifecycle. Transitions only move forward:
/// NotStarted -> Playing -> Won | TimedOut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Board dealt, clock not running
    #[default]
    NotStarted,
    /// Clock running, flips accepted
    Playing,
    /// Every pair matched
    Won,
    /// Time limit reached first
    TimedOut,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::TimedOut)
    }
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    TimedOut,
}

/// Final tally shown on the end screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_moves: u32,
    pub elapsed_seconds: u32,
    pub outcome: Outcome,
}

/// Why a flip was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Game already over
    GameOver,
    /// No card at that index
    OutOfRange,
    /// Card is face-up or matched
    NotFaceDown,
    /// Two cards are already waiting to flip back
    HandFull,
}

/// Result of a single flip attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Ignored; no move counted
    Rejected(RejectReason),
    /// First card of a pair turned over
    Revealed { index: usize },
    /// Second card matched the first
    Matched { first: usize, second: usize },
    /// Second card did not match the first
    Mismatched { first: usize, second: usize },
}

impl FlipOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, FlipOutcome::Rejected(_))
    }

    /// A pair was completed and the flip-back delay should start
    pub fn completes_pair(&self) -> bool {
        matches!(self, FlipOutcome::Matched { .. } | FlipOutcome::Mismatched { .. })
    }
}

/// Everything a caller needs to react to a flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipResult {
    pub outcome: FlipOutcome,
    /// This flip moved the game from NotStarted to Playing
    pub started: bool,
    /// This flip ended the game
    pub finished: Option<Summary>,
}

/// Complete game state for one deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub started: bool,
    /// Cards turned over since the last flip-back (0..=2)
    pub flipped_count: u8,
    pub total_moves: u32,
    pub elapsed_seconds: u32,
    pub phase: GamePhase,
    pub time_limit_secs: u32,
    /// Set once, by the terminal transition
    summary: Option<Summary>,
}

impl GameState {
    pub fn new(board: Board) -> Self {
        Self::with_time_limit(board, TIME_LIMIT_SECS)
    }

    pub fn with_time_limit(board: Board, time_limit_secs: u32) -> Self {
        Self {
            board,
            started: false,
            flipped_count: 0,
            total_moves: 0,
            elapsed_seconds: 0,
            phase: GamePhase::NotStarted,
            time_limit_secs,
            summary: None,
        }
    }

    /// NotStarted -> Playing. Returns false if the game had already started.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::NotStarted {
            return false;
        }
        self.started = true;
        self.phase = GamePhase::Playing;
        log::info!("Game started ({} pairs)", self.board.pair_count());
        true
    }

    /// Turn over the card at `index`
    pub fn flip(&mut self, index: usize) -> FlipResult {
        // Only a card that can actually turn over starts the game
        let flippable = self.board.card(index).is_some_and(|c| c.is_face_down());
        let started = flippable && self.start();
        let outcome = self.flip_inner(index);
        let finished = if matches!(outcome, FlipOutcome::Matched { .. }) {
            self.check_win()
        } else {
            None
        };
        FlipResult {
            outcome,
            started,
            finished,
        }
    }

    fn flip_inner(&mut self, index: usize) -> FlipOutcome {
        if self.phase.is_terminal() {
            return FlipOutcome::Rejected(RejectReason::GameOver);
        }
        match self.board.card(index) {
            None => return FlipOutcome::Rejected(RejectReason::OutOfRange),
            Some(card) if !card.is_face_down() => {
                return FlipOutcome::Rejected(RejectReason::NotFaceDown);
            }
            Some(_) => {}
        }
        if self.flipped_count >= MAX_FACE_UP {
            return FlipOutcome::Rejected(RejectReason::HandFull);
        }

        // Only accepted flips count as moves
        self.total_moves += 1;
        self.flipped_count += 1;
        if let Some(card) = self.board.card_mut(index) {
            card.face = CardFace::FaceUp;
        }
        log::debug!("Flip #{} -> card {}", self.total_moves, index);

        if self.flipped_count < MAX_FACE_UP {
            return FlipOutcome::Revealed { index };
        }

        let pending = self.board.pending_indices();
        let (first, second) = match pending.as_slice() {
            [a, b] => (*a, *b),
            // Unreachable while flipped_count tracks face-up cards
            _ => return FlipOutcome::Revealed { index },
        };
        // Keep the earlier flip as `first`
        let (first, second) = if second == index { (first, second) } else { (second, first) };

        let cards = self.board.cards();
        if cards[first].key == cards[second].key {
            for i in [first, second] {
                if let Some(card) = self.board.card_mut(i) {
                    card.face = CardFace::Matched;
                }
            }
            log::debug!("Matched cards {} and {}", first, second);
            FlipOutcome::Matched { first, second }
        } else {
            FlipOutcome::Mismatched { first, second }
        }
    }

    /// Turn every face-up, unmatched card back over and reset the hand.
    /// Returns the indices that were turned.
    pub fn flip_back(&mut self) -> Vec<usize> {
        let pending = self.board.pending_indices();
        for &i in &pending {
            if let Some(card) = self.board.card_mut(i) {
                card.face = CardFace::FaceDown;
            }
        }
        self.flipped_count = 0;
        pending
    }

    /// One second of game clock. Returns the summary if this tick ended the game.
    pub fn tick(&mut self) -> Option<Summary> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        self.elapsed_seconds += 1;

        // A win resolved on the same instant beats the timeout
        if let Some(summary) = self.check_win() {
            return Some(summary);
        }
        if self.elapsed_seconds >= self.time_limit_secs {
            return self.finish(Outcome::TimedOut);
        }
        None
    }

    /// Playing -> Won when every card is matched
    pub fn check_win(&mut self) -> Option<Summary> {
        if self.phase == GamePhase::Playing && self.board.all_matched() {
            self.finish(Outcome::Won)
        } else {
            None
        }
    }

    /// Single terminal transition. Only the first call produces a summary.
    fn finish(&mut self, outcome: Outcome) -> Option<Summary> {
        if self.phase.is_terminal() {
            return None;
        }
        self.phase = match outcome {
            Outcome::Won => GamePhase::Won,
            Outcome::TimedOut => GamePhase::TimedOut,
        };
        let summary = Summary {
            total_moves: self.total_moves,
            elapsed_seconds: self.elapsed_seconds,
            outcome,
        };
        self.summary = Some(summary);
        log::info!(
            "Game over: {:?} with {} moves in {} sec",
            outcome,
            summary.total_moves,
            summary.elapsed_seconds
        );
        Some(summary)
    }

    /// Summary of a finished game
    pub fn summary(&self) -> Option<Summary> {
        self.summary
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.time_limit_secs.saturating_sub(self.elapsed_seconds)
    }
}
