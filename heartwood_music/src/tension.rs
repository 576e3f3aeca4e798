// Tension curves: per-bar loudness multipliers over a song.
//
// A small catalog of structural archetypes, each an 8-section template
// where 1.0 is neutral. A template becomes a per-bar curve in one of two
// ways:
//
// - Repeat: each section covers `max(1, bars / 8)` consecutive bars. Bars
//   past the last full section keep the last template value (clamp, never
//   wrap), so a rising template stays rising for any bar count.
// - Stretch: the template is read as a continuous shape over [0, 1) and
//   sampled at `bar / bars`, optionally interpolating between sections.
//
// `curve_from_sections` is a second source of curves, built from an
// intro/verse/chorus/bridge/outro pattern string and smoothed with a 3-bar
// moving average.
//
// Consumed by session.rs (precomputed curve on the plan) and assemble.rs
// (velocity scaling per bar).

use crate::affect::Affect;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of sections in every archetype template.
pub const SECTIONS: usize = 8;

/// Named structural archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    /// Steady rise from 0.6 to 1.4.
    Climb,
    /// Verse, chorus, verse, chorus, bridge peak, outro.
    Standard,
    /// Verse/chorus alternation with no bridge.
    VerseChorus,
    /// Flat 1.0 throughout.
    Constant,
    /// Falling energy.
    Descent,
    /// Escalating zig-zag.
    Spiral,
    /// Ebb and flow.
    Wave,
    /// Build to a release near the end.
    Catharsis,
    /// Hypnotic, near-flat.
    Static,
    /// Gradual build to a late climax.
    SlowBuild,
    /// Big start, settle, return.
    FrontLoaded,
}

impl Structure {
    pub const ALL: [Structure; 11] = [
        Structure::Climb,
        Structure::Standard,
        Structure::VerseChorus,
        Structure::Constant,
        Structure::Descent,
        Structure::Spiral,
        Structure::Wave,
        Structure::Catharsis,
        Structure::Static,
        Structure::SlowBuild,
        Structure::FrontLoaded,
    ];

    pub fn template(self) -> [f64; SECTIONS] {
        match self {
            Structure::Climb => [0.6, 0.7, 0.8, 0.9, 1.0, 1.1, 1.25, 1.4],
            Structure::Standard => [0.6, 0.7, 1.1, 1.1, 0.7, 1.1, 1.5, 0.8],
            Structure::VerseChorus => [0.6, 0.6, 1.0, 1.0, 0.6, 1.0, 1.0, 0.8],
            Structure::Constant => [1.0; SECTIONS],
            Structure::Descent => [1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.35],
            Structure::Spiral => [0.5, 0.7, 0.6, 0.9, 0.7, 1.0, 0.9, 1.2],
            Structure::Wave => [0.6, 0.9, 0.6, 1.0, 0.5, 1.1, 0.6, 0.8],
            Structure::Catharsis => [0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.2, 1.0],
            Structure::Static => [0.8, 0.8, 0.8, 0.85, 0.8, 0.85, 0.8, 0.8],
            Structure::SlowBuild => [0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.1],
            Structure::FrontLoaded => [1.1, 1.0, 0.6, 0.6, 0.8, 0.8, 1.0, 1.0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Structure::Climb => "climb",
            Structure::Standard => "standard",
            Structure::VerseChorus => "verse_chorus",
            Structure::Constant => "constant",
            Structure::Descent => "descent",
            Structure::Spiral => "spiral",
            Structure::Wave => "wave",
            Structure::Catharsis => "catharsis",
            Structure::Static => "static",
            Structure::SlowBuild => "slow_build",
            Structure::FrontLoaded => "front_loaded",
        }
    }

    /// Exact, case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Structure> {
        let wanted = name.trim().to_lowercase();
        Structure::ALL.into_iter().find(|s| s.name() == wanted)
    }

    /// Lookup that never fails: unknown names fall back to `Standard`.
    pub fn resolve(name: &str) -> Structure {
        Structure::from_name(name).unwrap_or_else(|| {
            warn!(requested = name, fallback = "standard", "unknown structure type");
            Structure::Standard
        })
    }
}

impl std::fmt::Display for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a template is laid over the bars of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tiling {
    /// Each section repeats for `max(1, bars / 8)` bars; overflow clamps.
    #[default]
    Repeat,
    /// Sample the template by relative position.
    Stretch { smooth: bool },
}

/// Per-bar tension multipliers. Length is exactly the bar count requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TensionCurve {
    values: Vec<f64>,
}

impl TensionCurve {
    pub fn from_values(values: Vec<f64>) -> Self {
        TensionCurve { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for `bar`, clamped to the nearest valid bar. 1.0 when empty.
    pub fn at(&self, bar: usize) -> f64 {
        match self.values.len() {
            0 => 1.0,
            n => self.values[bar.min(n - 1)],
        }
    }
}

/// Section index for `bar` under repeat tiling.
fn repeat_section(bar: usize, total_bars: usize) -> usize {
    let per_section = (total_bars / SECTIONS).max(1);
    (bar / per_section).min(SECTIONS - 1)
}

/// Build the full curve for a song of `total_bars` bars.
pub fn curve_for(total_bars: usize, structure: Structure, tiling: Tiling) -> TensionCurve {
    let template = structure.template();
    let values = (0..total_bars)
        .map(|bar| match tiling {
            Tiling::Repeat => template[repeat_section(bar, total_bars)],
            Tiling::Stretch { smooth } => stretch_sample(&template, bar, total_bars, smooth),
        })
        .collect();
    TensionCurve { values }
}

fn stretch_sample(template: &[f64; SECTIONS], bar: usize, total_bars: usize, smooth: bool) -> f64 {
    let pos = bar as f64 / total_bars as f64 * SECTIONS as f64;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    if idx >= SECTIONS - 1 {
        template[SECTIONS - 1]
    } else if smooth && frac > 0.0 {
        template[idx] + (template[idx + 1] - template[idx]) * frac
    } else {
        template[idx]
    }
}

/// Repeat-tiling value at one bar without building the curve.
///
/// `bar` clamps to the last bar; a zero-length song is neutral (1.0).
pub fn value_at(bar: usize, total_bars: usize, structure: Structure) -> f64 {
    if total_bars == 0 {
        return 1.0;
    }
    let bar = bar.min(total_bars - 1);
    structure.template()[repeat_section(bar, total_bars)]
}

/// Archetype for a mood: rising for the heavy, introspective affects,
/// verse/chorus for the aggressive ones, flat otherwise.
pub fn structure_for_mood(affect: Affect) -> Structure {
    match affect {
        Affect::Grief | Affect::Dissociation => Structure::Climb,
        Affect::Rage | Affect::Defiance => Structure::Standard,
        Affect::Awe
        | Affect::Nostalgia
        | Affect::Fear
        | Affect::Tenderness
        | Affect::Confusion
        | Affect::Neutral => Structure::Constant,
    }
}

/// Intro, verse, verse, chorus, chorus, bridge, outro.
pub const DEFAULT_SECTION_PATTERN: &str = "ivvccbo";

fn section_energy(letter: char) -> f64 {
    match letter {
        'i' => 0.6,
        'v' => 0.75,
        'c' => 1.1,
        'b' => 1.3,
        'o' => 0.5,
        _ => 1.0,
    }
}

/// Curve from a section pattern string, one letter per section, spread
/// evenly over the bars and smoothed with a 3-bar moving average.
///
/// Edge bars average only the neighbours they have. An empty pattern is
/// treated as flat.
pub fn curve_from_sections(total_bars: usize, pattern: &str) -> TensionCurve {
    let letters: Vec<char> = pattern.to_lowercase().chars().collect();
    let raw: Vec<f64> = (0..total_bars)
        .map(|bar| {
            if letters.is_empty() {
                return 1.0;
            }
            let idx = (bar * letters.len() / total_bars).min(letters.len() - 1);
            section_energy(letters[idx])
        })
        .collect();

    let values = (0..raw.len())
        .map(|i| {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(raw.len() - 1);
            let window = &raw[lo..=hi];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect();
    TensionCurve { values }
}
