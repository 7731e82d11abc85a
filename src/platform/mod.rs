//! Platform abstraction layer (browser only)
//!
//! Handles everything the deterministic core must not touch:
//! - DOM rendering of the board, HUD and end screen
//! - Distraction modals
//! - Remote content fetching

pub mod dom;
pub mod fetch;

pub use dom::BoardView;
pub use fetch::realize;
