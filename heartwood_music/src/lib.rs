// Heartwood: affect-to-performance music pipeline
//
// Turns a short piece of emotional text into a humanized harmony track. The
// text is classified into an affect, the affect and two user dials
// (motivation, chaos tolerance) become a harmony plan, the plan becomes raw
// chord tones shaped by a tension curve, and the tones are humanized and
// written to a Standard MIDI File.
//
// Architecture:
// - affect.rs: Keyword lexicon and affect classification, drum-kit mapping
// - mode.rs: The seven diatonic modes and the affect → mode table
// - tension.rs: Structure archetypes, tension-curve tiling, section patterns
// - session.rs: Session state, harmony planning, oblique strategies
// - plan.rs: HarmonyPlan, time signatures, harmonic rhythm
// - chord.rs: Chord-symbol parsing and the quality → interval table
// - note.rs: NoteEvent, the unit passed between stages
// - assemble.rs: Plan + chords → raw per-bar chord tones
// - groove.rs: Timing jitter, velocity shaping and dropout
// - midi.rs: MidiSink trait and the midly-backed SMF writer
// - render.rs: RenderBridge orchestration and degraded-mode handling
// - config.rs: JSON-loadable tunables
// - rng.rs: Seed resolution for the stochastic stages
// - error.rs: Config and sink error types
//
// Everything is deterministic given a seed. The PRNG lives in the
// heartwood_prng crate.

pub mod affect;
pub mod assemble;
pub mod chord;
pub mod config;
pub mod error;
pub mod groove;
pub mod midi;
pub mod mode;
pub mod note;
pub mod plan;
pub mod render;
pub mod rng;
pub mod session;
pub mod tension;
