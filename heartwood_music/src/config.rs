// Data-driven generator configuration.
//
// The tunable numbers of note assembly, groove humanization, and MIDI
// output live in `GeneratorConfig`, loadable from JSON. Every struct uses
// `#[serde(default)]`, so a config file only needs the fields it changes.
// Defaults reproduce the stock pipeline exactly.
//
// See also: assemble.rs (reads `AssemblyParams`), groove.rs (reads
// `GrooveLimits`), render.rs (reads `TrackParams` and timing).

use crate::error::ConfigError;
use crate::midi::MAX_TICKS_PER_QUARTER;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Velocity model for raw chord tones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyParams {
    /// Velocity at tension 1.0; scaled by the bar's tension value.
    pub base_velocity: f64,
    /// Standard deviation of the per-note velocity draw.
    pub velocity_sigma: f64,
    pub velocity_min: u8,
    pub velocity_max: u8,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        AssemblyParams {
            base_velocity: 90.0,
            velocity_sigma: 5.0,
            velocity_min: 20,
            velocity_max: 120,
        }
    }
}

/// Safety limits and scales for humanization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrooveLimits {
    /// Largest allowed timing shift in ticks, either direction.
    pub drift_limit: u32,
    /// Timing sigma in ticks at complexity 1.0.
    pub timing_sigma_scale: f64,
    pub velocity_min: u8,
    pub velocity_max: u8,
    /// Loudest target velocity (vulnerability 0.0).
    pub confident_velocity: f64,
    /// How far vulnerability 1.0 pulls the target down.
    pub vulnerability_velocity_drop: f64,
    /// Velocity sigma at vulnerability 0.0.
    pub velocity_sigma_base: f64,
    /// Extra velocity sigma at vulnerability 1.0.
    pub velocity_sigma_vulnerability: f64,
    /// Dropout is enabled only above this complexity.
    pub dropout_complexity: f64,
    /// A note drops when its uniform draw is strictly greater than this.
    pub dropout_draw: f64,
}

impl Default for GrooveLimits {
    fn default() -> Self {
        GrooveLimits {
            drift_limit: 40,
            timing_sigma_scale: 20.0,
            velocity_min: 20,
            velocity_max: 120,
            confident_velocity: 90.0,
            vulnerability_velocity_drop: 30.0,
            velocity_sigma_base: 5.0,
            velocity_sigma_vulnerability: 15.0,
            dropout_complexity: 0.8,
            dropout_draw: 0.8,
        }
    }
}

/// Output track settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    pub project_name: String,
    pub track_name: String,
    /// MIDI channel, 0–15. 0 is the keys channel.
    pub channel: u8,
    /// General MIDI instrument tag (see midi.rs), or none for the player's default.
    pub instrument: Option<String>,
}

impl Default for TrackParams {
    fn default() -> Self {
        TrackParams {
            project_name: "Heartwood_Session".to_owned(),
            track_name: "Harmony".to_owned(),
            channel: 0,
            instrument: None,
        }
    }
}

/// Top-level configuration for the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// MIDI resolution (PPQ), 1..=32767. The same value lays out the note
    /// grid and goes into the file header.
    pub ticks_per_quarter: u16,
    /// MIDI pitch of the chord-root octave's C. 48 is C3.
    pub base_octave_root: u8,
    pub assembly: AssemblyParams,
    pub groove: GrooveLimits,
    pub track: TrackParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            ticks_per_quarter: 480,
            base_octave_root: 48,
            assembly: AssemblyParams::default(),
            groove: GrooveLimits::default(),
            track: TrackParams::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the MIDI writer cannot represent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TICKS_PER_QUARTER).contains(&self.ticks_per_quarter) {
            return Err(ConfigError::Resolution(self.ticks_per_quarter));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GeneratorConfig::from_json(&text)
    }
}
