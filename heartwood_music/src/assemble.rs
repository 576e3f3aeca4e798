// Note assembly: expands a HarmonyPlan into raw chord tones, bar by bar.
//
// Bar `b` plays chord `b % chords.len()` for one full bar. Every chord tone
// becomes one NoteEvent; its velocity is drawn around `90 * tension[b]` so
// louder sections of the tension curve come out louder. Draws happen once
// per note in ascending bar, then interval, order.
//
// Input comes from session.rs (plan) and chord.rs (parsed chords). Output
// goes to groove.rs for humanization.

use crate::chord::{ChordParser, ParsedChord, SymbolChordParser};
use crate::config::{AssemblyParams, GeneratorConfig};
use crate::note::NoteEvent;
use crate::plan::HarmonyPlan;
use crate::rng::rng_for;
use crate::tension::{TensionCurve, Tiling, curve_for};
use heartwood_prng::HumanRng;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct NoteAssembler {
    ticks_per_quarter: u32,
    base_octave_root: u8,
    params: AssemblyParams,
}

impl NoteAssembler {
    pub fn new(config: &GeneratorConfig) -> Self {
        NoteAssembler {
            ticks_per_quarter: config.ticks_per_quarter.into(),
            base_octave_root: config.base_octave_root,
            params: config.assembly.clone(),
        }
    }

    /// Assemble using the built-in chord-symbol parser.
    pub fn assemble(&self, plan: &HarmonyPlan, seed: Option<u64>) -> Vec<NoteEvent> {
        let chords = SymbolChordParser.parse(&plan.progression());
        let mut rng = rng_for(seed);
        self.assemble_chords(plan, &chords, &mut rng)
    }

    /// Assemble from already-parsed chords. Empty `chords` yields no notes.
    pub fn assemble_chords(
        &self,
        plan: &HarmonyPlan,
        chords: &[ParsedChord],
        rng: &mut HumanRng,
    ) -> Vec<NoteEvent> {
        if chords.is_empty() {
            return Vec::new();
        }

        let bars = plan.length_bars as usize;
        let computed;
        let tension: &TensionCurve = match &plan.tension {
            Some(curve) => curve,
            None => {
                computed = curve_for(bars, plan.structure, Tiling::Repeat);
                &computed
            }
        };
        let bar_ticks = plan.time_signature.bar_ticks(self.ticks_per_quarter);
        let borrowed = chords.iter().filter(|c| !plan.is_diatonic(c)).count();
        let vel_min = self.params.velocity_min;
        let vel_max = self.params.velocity_max.max(vel_min);

        let mut notes = Vec::new();
        for (bar, chord) in (0..bars).zip(chords.iter().cycle()) {
            // Bars past the end of a short curve are neutral.
            let t = tension.values().get(bar).copied().unwrap_or(1.0);
            let root = self.base_octave_root as u32 + chord.root_pc as u32;
            let start_tick = (bar as u32).saturating_mul(bar_ticks);

            for &interval in chord.intervals() {
                let velocity = rng
                    .gauss(self.params.base_velocity * t, self.params.velocity_sigma)
                    .round()
                    .clamp(vel_min as f64, vel_max as f64) as u8;
                notes.push(NoteEvent {
                    pitch: (root + interval as u32).min(127) as u8,
                    velocity,
                    start_tick,
                    duration_ticks: bar_ticks,
                    bar: bar as u32,
                });
            }
        }

        debug!(
            bars,
            chords = chords.len(),
            borrowed,
            notes = notes.len(),
            bar_ticks,
            "assembled notes"
        );
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::tension::Structure;

    fn plan(text: &str, motivation: i64) -> HarmonyPlan {
        let mut session = Session::new();
        session.set_scales(motivation, 0.4);
        session.process_input(text);
        session.generate_plan()
    }

    fn assembler() -> NoteAssembler {
        NoteAssembler::new(&GeneratorConfig::default())
    }

    #[test]
    fn test_one_chord_per_bar_cycling() {
        let plan = plan("", 5); // C-Am-F-G, 32 bars
        let notes = assembler().assemble(&plan, Some(1));
        assert_eq!(notes.len(), 32 * 3);
        // Bar 5 wraps to Am: A2 + minor triad.
        let bar5: Vec<u8> = notes.iter().filter(|n| n.bar == 5).map(|n| n.pitch).collect();
        assert_eq!(bar5, vec![57, 60, 64]);
        for n in &notes {
            assert_eq!(n.start_tick, n.bar * 1920);
            assert_eq!(n.duration_ticks, 1920);
        }
    }

    #[test]
    fn test_seventh_chords_have_four_tones() {
        let plan = plan("numb", 2); // locrian: Cdim-DbMaj7-Ebm-Cdim, 16 bars
        let notes = assembler().assemble(&plan, Some(1));
        let bar1: Vec<u8> = notes.iter().filter(|n| n.bar == 1).map(|n| n.pitch).collect();
        assert_eq!(bar1, vec![49, 53, 56, 60]);
        assert_eq!(notes.len(), 4 * (3 + 4 + 3 + 3));
    }

    #[test]
    fn test_velocity_in_range_and_follows_tension() {
        let plan = plan("grief loss gone", 9); // climb over 64 bars
        let notes = assembler().assemble(&plan, Some(21));
        assert!(notes.iter().all(|n| (20..=120).contains(&n.velocity)));
        let mean = |bars: std::ops::Range<u32>| {
            let v: Vec<f64> = notes
                .iter()
                .filter(|n| bars.contains(&n.bar))
                .map(|n| n.velocity as f64)
                .collect();
            v.iter().sum::<f64>() / v.len() as f64
        };
        assert!(mean(56..64) > mean(0..8) + 30.0);
    }

    #[test]
    fn test_seeded_assembly_is_deterministic() {
        let plan = plan("wonder", 5);
        assert_eq!(assembler().assemble(&plan, Some(5)), assembler().assemble(&plan, Some(5)));
    }

    #[test]
    fn test_missing_tension_is_computed_from_structure() {
        let mut with_curve = plan("", 5);
        with_curve.structure = Structure::Climb;
        with_curve.tension = Some(curve_for(32, Structure::Climb, Tiling::Repeat));
        let mut without = with_curve.clone();
        without.tension = None;
        assert_eq!(
            assembler().assemble(&with_curve, Some(2)),
            assembler().assemble(&without, Some(2))
        );
    }

    #[test]
    fn test_huge_resolution_saturates_instead_of_overflowing() {
        let mut config = GeneratorConfig::default();
        config.ticks_per_quarter = u16::MAX;
        let mut plan = plan("", 5);
        plan.length_bars = 20_000;
        plan.tension = None;
        let notes = NoteAssembler::new(&config).assemble(&plan, Some(1));
        assert_eq!(notes.len(), 20_000 * 3);
        assert_eq!(notes[3].start_tick, 4 * 65535);
        assert_eq!(notes.last().map(|n| n.start_tick), Some(u32::MAX));
    }

    #[test]
    fn test_empty_chords_yield_no_notes() {
        let plan = plan("", 5);
        let mut rng = HumanRng::new(0);
        assert!(assembler().assemble_chords(&plan, &[], &mut rng).is_empty());
    }
}
