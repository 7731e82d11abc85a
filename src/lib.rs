//! Memory Match - a card matching game that fights back
//!
//! Core modules:
//! - `sim`: Deterministic game core (shuffle, deal, state machine, timers, distraction policy)
//! - `content`: Distraction content payloads and URL handling
//! - `platform`: Browser DOM rendering, input and fetch (wasm32 only)
//! - `settings`: Player-tunable game configuration

pub mod content;
pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use settings::{DistractionPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Game clock resolution (one tick per second)
    pub const CLOCK_TICK_MS: u64 = 1_000;
    /// Time limit before the game is lost
    pub const TIME_LIMIT_SECS: u32 = 300;
    /// Delay before unmatched face-up cards turn back over
    pub const FLIP_BACK_DELAY_MS: u64 = 1_000;
    /// Cards allowed face-up and unmatched at once
    pub const MAX_FACE_UP: u8 = 2;

    /// Default board is 4x4 (8 pairs)
    pub const DEFAULT_DIMENSION: u32 = 4;
    /// Number of artwork images shipped in assets/Artwork
    pub const ARTWORK_COUNT: usize = 23;

    /// Policy distractions begin this long after play starts
    pub const POLICY_START_DELAY_MS: u64 = 30_000;
    /// Policy distraction polling interval
    pub const POLICY_INTERVAL_MS: u64 = 10_000;
    /// Policy stops for good once this little time is left
    pub const POLICY_QUIET_SECS: u32 = 30;
    /// Below this much remaining time the policy gets pushier
    pub const POLICY_URGENT_SECS: u32 = 60;
    /// Emission chance in the last minute
    pub const URGENT_EMIT_CHANCE: f64 = 0.5;
    /// Emission chance otherwise
    pub const BASE_EMIT_CHANCE: f64 = 0.3;
    /// Chance that a distraction is an image rather than a video
    pub const IMAGE_CHANCE: f64 = 0.5;

    /// Ambient distraction delay range (ms, half-open)
    pub const AMBIENT_MIN_DELAY_MS: u64 = 2_000;
    pub const AMBIENT_MAX_DELAY_MS: u64 = 5_000;

    /// Popup footprint used to keep modals on screen
    pub const MODAL_WIDTH: f64 = 400.0;
    pub const MODAL_HEIGHT: f64 = 500.0;
}

/// Format the HUD move counter
#[inline]
pub fn format_moves(moves: u32) -> String {
    format!("{moves} moves")
}

/// Format the HUD timer
#[inline]
pub fn format_time(secs: u32) -> String {
    format!("time: {secs} sec")
}
