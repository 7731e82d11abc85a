//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web. Only preferences live here, never scores.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{DistractionConfig, SessionConfig};

/// How hard the game tries to distract the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistractionPreset {
    Off,
    Calm,
    #[default]
    Normal,
    Chaotic,
}

impl DistractionPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistractionPreset::Off => "Off",
            DistractionPreset::Calm => "Calm",
            DistractionPreset::Normal => "Normal",
            DistractionPreset::Chaotic => "Chaotic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Some(DistractionPreset::Off),
            "calm" => Some(DistractionPreset::Calm),
            "normal" => Some(DistractionPreset::Normal),
            "chaotic" | "chaos" => Some(DistractionPreset::Chaotic),
            _ => None,
        }
    }

    /// Whether the time-pressure policy runs
    pub fn policy_enabled(&self) -> bool {
        !matches!(self, DistractionPreset::Off)
    }

    /// Whether the 2-5 second ambient popups run
    pub fn ambient_enabled(&self) -> bool {
        matches!(self, DistractionPreset::Normal | DistractionPreset::Chaotic)
    }

    /// Policy polling interval
    pub fn policy_interval_ms(&self) -> u64 {
        match self {
            DistractionPreset::Chaotic => POLICY_INTERVAL_MS / 2,
            _ => POLICY_INTERVAL_MS,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Distraction intensity
    pub preset: DistractionPreset,

    // === Board ===
    /// Size of the artwork catalog
    pub max_unique_images: usize,
    /// Artwork path, `{n}` is the 1-based image number
    pub artwork_path: String,

    // === Timing ===
    pub time_limit_secs: u32,
    pub flip_back_delay_ms: u64,

    // === Distractions ===
    /// Master switch for all popups
    pub distractions: bool,
    /// Ambient popups independent of the policy
    pub ambient_distractions: bool,
    pub meme_endpoint: String,
    pub video_list_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: DistractionPreset::Normal,

            max_unique_images: ARTWORK_COUNT,
            artwork_path: "./assets/Artwork/{n}.jpg".to_string(),

            time_limit_secs: TIME_LIMIT_SECS,
            flip_back_delay_ms: FLIP_BACK_DELAY_MS,

            distractions: true,
            ambient_distractions: true,
            meme_endpoint: "https://meme-api.com/gimme".to_string(),
            video_list_path: "assets/videos.json".to_string(),
        }
    }
}

impl Settings {
    /// Create settings from a distraction preset (applies preset defaults)
    pub fn from_preset(preset: DistractionPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a distraction preset
    pub fn apply_preset(&mut self, preset: DistractionPreset) {
        self.preset = preset;
        self.distractions = preset.policy_enabled();
        self.ambient_distractions = preset.ambient_enabled();
    }

    /// Distraction schedule for these settings
    pub fn distraction_config(&self) -> DistractionConfig {
        DistractionConfig {
            policy_enabled: self.distractions,
            ambient_enabled: self.distractions && self.ambient_distractions,
            policy_interval_ms: self.preset.policy_interval_ms(),
            ..DistractionConfig::default()
        }
    }

    /// Session parameters for a board of `dimension`
    pub fn session_config(&self, dimension: u32) -> SessionConfig {
        SessionConfig {
            dimension,
            max_unique_images: self.max_unique_images,
            time_limit_secs: self.time_limit_secs,
            flip_back_delay_ms: self.flip_back_delay_ms,
            distractions: self.distraction_config(),
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "memory_match_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_game() {
        let config = Settings::default().session_config(4);
        assert_eq!(config.dimension, 4);
        assert_eq!(config.time_limit_secs, 300);
        assert_eq!(config.flip_back_delay_ms, 1000);
        assert_eq!(config.max_unique_images, 23);
        assert!(config.distractions.policy_enabled);
        assert!(config.distractions.ambient_enabled);
        assert_eq!(config.distractions.policy_interval_ms, 10_000);
    }

    #[test]
    fn test_presets() {
        let off = Settings::from_preset(DistractionPreset::Off).distraction_config();
        assert!(!off.policy_enabled && !off.ambient_enabled);

        let calm = Settings::from_preset(DistractionPreset::Calm).distraction_config();
        assert!(calm.policy_enabled && !calm.ambient_enabled);

        let chaotic = Settings::from_preset(DistractionPreset::Chaotic).distraction_config();
        assert_eq!(chaotic.policy_interval_ms, 5_000);
    }

    #[test]
    fn test_master_switch_wins_over_ambient() {
        let settings = Settings {
            distractions: false,
            ambient_distractions: true,
            ..Settings::default()
        };
        assert!(!settings.distraction_config().ambient_enabled);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(DistractionPreset::from_str("CHAOS"), Some(DistractionPreset::Chaotic));
        assert_eq!(DistractionPreset::from_str("calm"), Some(DistractionPreset::Calm));
        assert_eq!(DistractionPreset::from_str("loud"), None);
        assert_eq!(DistractionPreset::Normal.as_str(), "Normal");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"preset":"Calm","time_limit_secs":120}"#).unwrap();
        assert_eq!(settings.preset, DistractionPreset::Calm);
        assert_eq!(settings.time_limit_secs, 120);
        assert_eq!(settings.max_unique_images, 23);
    }
}
