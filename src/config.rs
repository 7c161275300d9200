//! Field configuration and named presets
//!
//! One configurable `FieldConfig` replaces the three near-duplicate
//! particle variants: drift (plain wanderers), network (attraction +
//! trails + glow), and energy (glowing motes, hard clear).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunable parameters for a particle field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Fixed particle population, set once at field construction
    pub count: usize,
    /// Per-particle position history length; 0 disables trails
    pub trail_len: usize,
    /// Pull particles toward the pointer while it is present
    pub has_attraction: bool,
    /// Attraction takes effect inside this radius (pixels)
    pub attraction_radius: f32,
    /// Velocity nudge scale at zero distance
    pub attraction_strength: f32,
    /// Additive radial glow behind each particle
    pub has_glow: bool,
    /// Particles closer than this get a connecting line (pixels)
    pub connection_threshold: f32,
    /// Peak connection alpha at zero distance, in [0, 1]
    pub connection_alpha: f32,
    /// Interpolate connection color between the two endpoint hues
    pub gradient_links: bool,
    /// Velocity magnitude scale at spawn
    pub speed: f32,
    /// Optional speed cap; None reproduces unbounded attraction build-up
    pub max_speed: Option<f32>,
    /// Spawn radius range (pixels)
    pub size_range: (f32, f32),
    /// Spawn hue range (degrees)
    pub hue_range: (f32, f32),
    /// Spawn opacity range
    pub opacity_range: (f32, f32),
    /// Spawn lifetime range (frames)
    pub life_range: (u32, u32),
    /// Frame persistence in [0, 1): fade previous frame toward black
    /// instead of clearing, leaving canvas-level motion trails.
    /// None clears hard to `background` every frame.
    pub fade: Option<f32>,
    /// Clear color when `fade` is None
    pub background: (u8, u8, u8),
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::network()
    }
}

impl FieldConfig {
    /// Sparse, slow wanderers with dim links
    pub fn drift() -> Self {
        Self {
            count: 20,
            trail_len: 0,
            has_attraction: false,
            attraction_radius: 150.0,
            attraction_strength: 0.01,
            has_glow: false,
            connection_threshold: 100.0,
            connection_alpha: 0.2,
            gradient_links: false,
            speed: 1.0,
            max_speed: None,
            size_range: (1.0, 3.0),
            hue_range: (180.0, 240.0),
            opacity_range: (0.2, 0.5),
            life_range: (100, 200),
            fade: None,
            background: (0, 0, 0),
        }
    }

    /// Dense constellation with pointer attraction, trails, and glow
    pub fn network() -> Self {
        Self {
            count: 80,
            trail_len: 10,
            has_attraction: true,
            attraction_radius: 150.0,
            attraction_strength: 0.01,
            has_glow: true,
            connection_threshold: 120.0,
            connection_alpha: 0.3,
            gradient_links: true,
            speed: 2.0,
            max_speed: Some(6.0),
            size_range: (1.0, 4.0),
            hue_range: (180.0, 240.0),
            opacity_range: (0.5, 1.0),
            life_range: (100, 200),
            fade: Some(0.9),
            background: (10, 10, 10),
        }
    }

    /// Glowing motes over a hard-cleared background
    pub fn energy() -> Self {
        Self {
            count: 30,
            trail_len: 0,
            has_attraction: false,
            attraction_radius: 150.0,
            attraction_strength: 0.01,
            has_glow: true,
            connection_threshold: 100.0,
            connection_alpha: 0.3,
            gradient_links: false,
            speed: 2.0,
            max_speed: None,
            size_range: (1.0, 4.0),
            hue_range: (180.0, 240.0),
            opacity_range: (0.5, 1.0),
            life_range: (100, 200),
            fade: None,
            background: (4, 4, 10),
        }
    }

    /// Clamp ranges and counts to sane values after deserialization
    pub fn sanitized(mut self) -> Self {
        self.count = self.count.max(1);
        self.size_range.0 = self.size_range.0.max(0.1);
        self.size_range.1 = self.size_range.1.max(self.size_range.0);
        self.life_range.0 = self.life_range.0.max(1);
        self.life_range.1 = self.life_range.1.max(self.life_range.0);
        self.opacity_range.0 = self.opacity_range.0.clamp(0.0, 1.0);
        self.opacity_range.1 = self.opacity_range.1.clamp(self.opacity_range.0, 1.0);
        if let Some(f) = self.fade {
            self.fade = Some(f.clamp(0.0, 0.999));
        }
        self
    }
}

/// A named preset in the bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub config: FieldConfig,
}

/// Named preset collection, persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetBank {
    pub presets: Vec<Preset>,
}

impl PresetBank {
    /// The built-in presets
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                Preset {
                    name: "drift".to_string(),
                    config: FieldConfig::drift(),
                },
                Preset {
                    name: "network".to_string(),
                    config: FieldConfig::network(),
                },
                Preset {
                    name: "energy".to_string(),
                    config: FieldConfig::energy(),
                },
            ],
        }
    }

    /// Look up a preset by name
    pub fn get(&self, name: &str) -> Option<&FieldConfig> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.config)
    }

    /// Save to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut bank: Self = serde_json::from_str(&json).map_err(|e| e.to_string())?;
        for preset in &mut bank.presets {
            preset.config = preset.config.clone().sanitized();
        }
        Ok(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_presets_present() {
        let bank = PresetBank::builtin();
        assert!(bank.get("drift").is_some());
        assert!(bank.get("network").is_some());
        assert!(bank.get("energy").is_some());
        assert!(bank.get("nope").is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        // Unknown keys rejected is not required; missing keys must default
        let cfg: FieldConfig = serde_json::from_str(r#"{"count": 5}"#).unwrap();
        assert_eq!(cfg.count, 5);
        assert_eq!(cfg.trail_len, FieldConfig::network().trail_len);
    }

    #[test]
    fn test_sanitized_repairs_ranges() {
        let mut cfg = FieldConfig::drift();
        cfg.count = 0;
        cfg.life_range = (0, 0);
        cfg.fade = Some(2.0);
        let cfg = cfg.sanitized();
        assert_eq!(cfg.count, 1);
        assert_eq!(cfg.life_range, (1, 1));
        assert!(cfg.fade.unwrap() < 1.0);
    }

    #[test]
    fn test_bank_round_trips_through_json() {
        let bank = PresetBank::builtin();
        let json = serde_json::to_string(&bank).unwrap();
        let back: PresetBank = serde_json::from_str(&json).unwrap();
        assert_eq!(back.presets.len(), bank.presets.len());
        assert_eq!(back.presets[1].name, "network");
        assert_eq!(back.presets[1].config.count, 80);
    }
}
