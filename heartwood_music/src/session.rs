// Session state and harmony planning.
//
// A `Session` is owned by the caller for one generation request (or reused
// across inputs). It holds the last affect analysis, the two user dials
// (motivation 1–10, chaos tolerance 0–1), and the mode suggested by the
// affect. `generate_plan` turns that state into a `HarmonyPlan`:
//
// - tempo from an affect tier plus a chaos offset of ±20 BPM
// - length from a 3-tier motivation table (16 / 32 / 64 bars)
// - complexity = chaos, nudged up for very high motivation
// - a fixed 4-chord progression per mode, rooted on C
// - a structure archetype from the mood, with its tension curve
//
// Empty input is reported as `InputOutcome::Silence`, distinct from text
// that was analyzed and found neutral. Internal state is neutral either way.

use crate::affect::{Affect, AffectAnalyzer, AffectResult};
use crate::groove::clamp_unit;
use crate::mode::Mode;
use crate::plan::{HarmonicRhythm, HarmonyPlan, TimeSignature};
use crate::tension::{Tiling, curve_for, structure_for_mood};
use heartwood_prng::HumanRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MOTIVATION_MIN: u8 = 1;
pub const MOTIVATION_MAX: u8 = 10;

/// What `process_input` saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputOutcome {
    /// Empty or whitespace-only text.
    Silence,
    /// Text was analyzed; `Neutral` if nothing matched.
    Analyzed(Affect),
}

impl InputOutcome {
    /// The affect now held by the session (`Neutral` for silence).
    pub fn affect(self) -> Affect {
        match self {
            InputOutcome::Silence => Affect::Neutral,
            InputOutcome::Analyzed(affect) => affect,
        }
    }

    /// Tag for display: `"silence"` or the affect name.
    pub fn tag(self) -> &'static str {
        match self {
            InputOutcome::Silence => "silence",
            InputOutcome::Analyzed(affect) => affect.name(),
        }
    }
}

/// Mutable state of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Last non-empty text processed.
    pub core_text: String,
    pub motivation: u8,
    pub chaos_tolerance: f64,
    pub affect: Option<AffectResult>,
    pub suggested_mode: Mode,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            core_text: String::new(),
            motivation: 5,
            chaos_tolerance: 0.3,
            affect: None,
            suggested_mode: Mode::Ionian,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    analyzer: AffectAnalyzer,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn with_analyzer(analyzer: AffectAnalyzer) -> Self {
        Session {
            state: SessionState::default(),
            analyzer,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Analyze `text` and set the affect and suggested mode.
    pub fn process_input(&mut self, text: &str) -> InputOutcome {
        if text.trim().is_empty() {
            self.state.affect = Some(AffectResult::neutral());
            self.state.suggested_mode = Mode::Ionian;
            return InputOutcome::Silence;
        }

        let result = self.analyzer.analyze(text);
        let primary = result.primary;
        self.state.core_text = text.to_owned();
        self.state.suggested_mode = Mode::for_affect(primary);
        self.state.affect = Some(result);
        InputOutcome::Analyzed(primary)
    }

    /// Set the two dials. Out-of-range values are clamped.
    pub fn set_scales(&mut self, motivation: i64, chaos: f64) {
        self.state.motivation =
            motivation.clamp(MOTIVATION_MIN as i64, MOTIVATION_MAX as i64) as u8;
        self.state.chaos_tolerance = clamp_unit(chaos);
    }

    pub fn generate_plan(&self) -> HarmonyPlan {
        let mood = self
            .state
            .affect
            .as_ref()
            .map_or(Affect::Neutral, |r| r.primary);
        let chaos = self.state.chaos_tolerance;
        let motivation = self.state.motivation;
        let mode = self.state.suggested_mode;

        let tempo = base_tempo(mood) + (chaos * 40.0 - 20.0).trunc() as i32;
        let length_bars = bars_for_motivation(motivation);
        let complexity = if motivation > 8 {
            (chaos + 0.1).min(1.0)
        } else {
            chaos
        };
        let structure = structure_for_mood(mood);
        let tension = curve_for(length_bars as usize, structure, Tiling::Repeat);

        let plan = HarmonyPlan {
            root_pc: 0,
            mode,
            tempo_bpm: tempo.max(1) as u16,
            length_bars,
            time_signature: TimeSignature::COMMON,
            chord_symbols: progression_for(mode).iter().map(|s| s.to_string()).collect(),
            harmonic_rhythm: HarmonicRhythm::OneChordPerBar,
            mood,
            complexity,
            structure,
            tension: Some(tension),
        };
        debug!(
            mood = %plan.mood,
            mode = %plan.mode,
            tempo = plan.tempo_bpm,
            bars = plan.length_bars,
            structure = %plan.structure,
            "generated harmony plan"
        );
        plan
    }
}

fn base_tempo(mood: Affect) -> i32 {
    match mood {
        Affect::Rage | Affect::Fear | Affect::Defiance => 130,
        Affect::Grief | Affect::Dissociation => 70,
        Affect::Awe | Affect::Tenderness => 90,
        Affect::Nostalgia | Affect::Confusion | Affect::Neutral => 100,
    }
}

/// Low motivation gets a sketch, high motivation a full structure.
pub fn bars_for_motivation(motivation: u8) -> u32 {
    match motivation {
        0..=3 => 16,
        4..=7 => 32,
        _ => 64,
    }
}

/// Four-chord progression for a mode, rooted on C.
pub fn progression_for(mode: Mode) -> [&'static str; 4] {
    match mode {
        Mode::Locrian => ["Cdim", "DbMaj7", "Ebm", "Cdim"],
        Mode::Phrygian => ["Cm", "Db", "Bbm", "Cm"],
        Mode::Lydian => ["C", "D", "Bm", "C"],
        Mode::Mixolydian => ["C", "Bb", "F", "C"],
        Mode::Aeolian => ["Cm", "Ab", "Fm", "Cm"],
        Mode::Dorian => ["Cm", "F", "Gm", "Cm"],
        Mode::Ionian => ["C", "Am", "F", "G"],
    }
}

const SAFETY_STRATEGY: &str = "Trust in the you of now.";

const STRATEGIES_MILD: [&str; 5] = [
    "Remove specifics and convert to ambiguities.",
    "Work at a different speed.",
    "Use fewer notes.",
    "Repetition is a form of change.",
    "What would your closest friend do?",
];

const STRATEGIES_WILD: [&str; 6] = [
    "Honor thy error as a hidden intention.",
    "Use an unacceptable color.",
    "Make a sudden, destructive unpredictable action.",
    "Turn it upside down.",
    "Disconnect from desire.",
    "Abandon normal instruments.",
];

/// A creative prompt scaled to chaos tolerance. Low tolerance always gets
/// the same reassuring card; high tolerance draws from a deck weighted
/// twice toward the wild cards.
pub fn oblique_strategy(tolerance: f64, rng: &mut HumanRng) -> &'static str {
    let tolerance = clamp_unit(tolerance);
    if tolerance < 0.3 {
        return SAFETY_STRATEGY;
    }
    let deck: Vec<&'static str> = if tolerance < 0.7 {
        STRATEGIES_MILD.to_vec()
    } else {
        STRATEGIES_MILD
            .iter()
            .chain(STRATEGIES_WILD.iter())
            .chain(STRATEGIES_WILD.iter())
            .copied()
            .collect()
    };
    rng.choose(&deck).copied().unwrap_or(SAFETY_STRATEGY)
}

/// Chaos tolerance above which a session is offered a strategy card.
pub const STRATEGY_THRESHOLD: f64 = 0.6;

/// A strategy card for sessions that asked for chaos, none otherwise.
/// Draws from `rng` only when a card is dealt.
pub fn strategy_prompt(tolerance: f64, rng: &mut HumanRng) -> Option<&'static str> {
    (clamp_unit(tolerance) > STRATEGY_THRESHOLD).then(|| oblique_strategy(tolerance, rng))
}
