// HarmonyPlan: the blueprint the planner hands to the assembler.
//
// Root, mode, tempo, length, meter, chord symbols, and the tension curve
// precomputed for the chosen length. Built once by `Session::generate_plan`
// and read-only afterwards. Serializable so the CLI can print it as JSON.

use crate::affect::Affect;
use crate::chord::{ParsedChord, pitch_class_name};
use crate::mode::Mode;
use crate::tension::{Structure, TensionCurve};
use serde::{Deserialize, Serialize};

/// Meter as numerator over denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };

    /// Parse `"3/4"`-style text. Anything malformed (or zero) is 4/4.
    pub fn parse_or_common(text: &str) -> TimeSignature {
        let parsed = text.split_once('/').and_then(|(n, d)| {
            let numerator = n.trim().parse::<u8>().ok()?;
            let denominator = d.trim().parse::<u8>().ok()?;
            (numerator > 0 && denominator > 0).then_some(TimeSignature {
                numerator,
                denominator,
            })
        });
        parsed.unwrap_or(TimeSignature::COMMON)
    }

    /// Length of one bar in ticks at `ticks_per_quarter`. Saturates.
    pub fn bar_ticks(self, ticks_per_quarter: u32) -> u32 {
        let quarters_x4 = self.numerator as u32 * 4;
        quarters_x4.saturating_mul(ticks_per_quarter) / self.denominator.max(1) as u32
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::COMMON
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// How often the chord changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonicRhythm {
    #[default]
    OneChordPerBar,
}

/// Complete blueprint for one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyPlan {
    /// Root pitch class (0 = C).
    pub root_pc: u8,
    pub mode: Mode,
    pub tempo_bpm: u16,
    pub length_bars: u32,
    pub time_signature: TimeSignature,
    pub chord_symbols: Vec<String>,
    pub harmonic_rhythm: HarmonicRhythm,
    pub mood: Affect,
    /// Chaos/complexity dial, 0.0–1.0.
    pub complexity: f64,
    pub structure: Structure,
    pub tension: Option<TensionCurve>,
}

impl HarmonyPlan {
    pub fn root_name(&self) -> &'static str {
        pitch_class_name(self.root_pc)
    }

    /// Chord symbols joined the way chord parsers expect (`"C-Am-F-G"`).
    pub fn progression(&self) -> String {
        self.chord_symbols.join("-")
    }

    /// Whether a chord's root is a degree of the plan's mode.
    pub fn is_diatonic(&self, chord: &ParsedChord) -> bool {
        self.mode.contains(self.root_pc, chord.root_pc)
    }

    /// Human-readable key, e.g. `"C aeolian"`.
    pub fn key_name(&self) -> String {
        format!("{} {}", self.root_name(), self.mode)
    }
}
