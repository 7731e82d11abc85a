//! Distraction scheduling policy
//!
//! Decides *when* to interrupt the player and with *what kind* of content. It
//! never fetches or displays anything; the session turns decisions into
//! `DistractionRequest`s and the platform layer realizes them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Image meme or embedded video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistractionKind {
    Image,
    Video,
}

/// Which schedule produced a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistractionOrigin {
    /// Self re-arming 2-5 second timer
    Ambient,
    /// Periodic time-pressure policy
    Policy,
}

/// Ask the presentation layer for one distraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistractionRequest {
    pub kind: DistractionKind,
    pub origin: DistractionOrigin,
}

/// A distraction ready to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistractionEvent {
    pub kind: DistractionKind,
    pub source_url: String,
}

/// What the policy wants at a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Request a distraction now
    Emit,
    /// Not this time
    Skip,
    /// Stop polling for the rest of this game
    Stop,
}

/// Tunables for both schedules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistractionConfig {
    /// Master switch for the policy schedule
    pub policy_enabled: bool,
    /// Ambient schedule on/off
    pub ambient_enabled: bool,
    pub policy_start_delay_ms: u64,
    pub policy_interval_ms: u64,
    /// Remaining time at or below which the policy stops
    pub quiet_secs: u32,
    /// Remaining time at or below which `urgent_chance` applies
    pub urgent_secs: u32,
    pub urgent_chance: f64,
    pub base_chance: f64,
    pub image_chance: f64,
    /// Ambient delay range, half-open
    pub ambient_min_ms: u64,
    pub ambient_max_ms: u64,
}

impl Default for DistractionConfig {
    fn default() -> Self {
        Self {
            policy_enabled: true,
            ambient_enabled: true,
            policy_start_delay_ms: POLICY_START_DELAY_MS,
            policy_interval_ms: POLICY_INTERVAL_MS,
            quiet_secs: POLICY_QUIET_SECS,
            urgent_secs: POLICY_URGENT_SECS,
            urgent_chance: URGENT_EMIT_CHANCE,
            base_chance: BASE_EMIT_CHANCE,
            image_chance: IMAGE_CHANCE,
            ambient_min_ms: AMBIENT_MIN_DELAY_MS,
            ambient_max_ms: AMBIENT_MAX_DELAY_MS,
        }
    }
}

impl DistractionConfig {
    /// Both schedules off
    pub fn disabled() -> Self {
        Self {
            policy_enabled: false,
            ambient_enabled: false,
            ..Self::default()
        }
    }
}

/// Time-pressure policy for one game
#[derive(Debug, Clone)]
pub struct DistractionScheduler {
    config: DistractionConfig,
    time_limit_secs: u32,
    stopped: bool,
}

impl DistractionScheduler {
    pub fn new(config: DistractionConfig, time_limit_secs: u32) -> Self {
        Self {
            config,
            time_limit_secs,
            stopped: !config.policy_enabled,
        }
    }

    pub fn config(&self) -> &DistractionConfig {
        &self.config
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Emission probability at `elapsed_secs`, or None once the policy is done
    pub fn emission_chance(&self, elapsed_secs: u32) -> Option<f64> {
        let remaining = self.time_limit_secs.saturating_sub(elapsed_secs);
        if remaining <= self.config.quiet_secs {
            None
        } else if remaining <= self.config.urgent_secs {
            Some(self.config.urgent_chance)
        } else {
            Some(self.config.base_chance)
        }
    }

    /// Poll the policy. Once it returns `Stop` it keeps returning `Stop`.
    pub fn decide<R: Rng + ?Sized>(&mut self, elapsed_secs: u32, rng: &mut R) -> PolicyDecision {
        if self.stopped {
            return PolicyDecision::Stop;
        }
        match self.emission_chance(elapsed_secs) {
            None => {
                self.stopped = true;
                log::debug!("Distraction policy stopped at {}s", elapsed_secs);
                PolicyDecision::Stop
            }
            Some(chance) => {
                if rng.random::<f64>() < chance {
                    PolicyDecision::Emit
                } else {
                    PolicyDecision::Skip
                }
            }
        }
    }

    /// Coin flip between image and video
    pub fn choose_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> DistractionKind {
        choose_kind(&self.config, rng)
    }

    /// Delay before the next ambient distraction
    pub fn ambient_delay_ms<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        ambient_delay_ms(&self.config, rng)
    }
}

pub fn choose_kind<R: Rng + ?Sized>(config: &DistractionConfig, rng: &mut R) -> DistractionKind {
    if rng.random::<f64>() < config.image_chance {
        DistractionKind::Image
    } else {
        DistractionKind::Video
    }
}

pub fn ambient_delay_ms<R: Rng + ?Sized>(config: &DistractionConfig, rng: &mut R) -> u64 {
    if config.ambient_max_ms <= config.ambient_min_ms {
        return config.ambient_min_ms;
    }
    rng.random_range(config.ambient_min_ms..config.ambient_max_ms)
}

#[cfg(test)]
pub(crate) mod test_rng {
    use rand::RngCore;

    /// RNG whose `random::<f64>()` always yields `unit`
    pub struct FixedRng {
        raw: u64,
    }

    impl FixedRng {
        pub fn unit(unit: f64) -> Self {
            // f64 sampling keeps the top 53 bits
            let mantissa = (unit * (1u64 << 53) as f64) as u64;
            Self { raw: mantissa << 11 }
        }
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            (self.raw >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.raw
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for (i, byte) in dst.iter_mut().enumerate() {
                *byte = (self.raw >> ((i % 8) * 8)) as u8;
            }
        }
    }
}
