// Render bridge: plan in, MIDI file out.
//
// Orchestrates the back half of the pipeline for one HarmonyPlan:
// chord parsing, note assembly, groove humanization, and the MIDI sink.
// The parser and sink are pluggable collaborators held as trait objects;
// either may be absent. Rendering never fails. Every problem (missing
// collaborator, empty chord parse, sink error) becomes a `Degraded`
// outcome with a warning in the log, and the intended path is returned
// unchanged.
//
// A single RNG stream is seeded once per render and feeds the assembler
// first, then the humanizer, so a seeded render is fully reproducible.
//
// `render_phrase` is the one-shot entry point used by the CLI: phrase in,
// session and plan built internally, file named after the phrase.

use crate::assemble::NoteAssembler;
use crate::chord::{ChordParser, SymbolChordParser};
use crate::config::GeneratorConfig;
use crate::groove::GrooveHumanizer;
use crate::midi::{MidiSink, SmfSink, TrackRequest};
use crate::plan::HarmonyPlan;
use crate::rng::rng_for;
use crate::session::{InputOutcome, Session};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Why a render produced no file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    ParserUnavailable,
    /// The parser returned no chords for the plan's progression.
    NoChords,
    SinkUnavailable,
    SinkFailed(String),
}

impl std::fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradedReason::ParserUnavailable => write!(f, "chord parser unavailable"),
            DegradedReason::NoChords => write!(f, "no chords parsed"),
            DegradedReason::SinkUnavailable => write!(f, "MIDI sink unavailable"),
            DegradedReason::SinkFailed(msg) => write!(f, "MIDI sink failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Written { notes: usize },
    Degraded(DegradedReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub status: RenderStatus,
}

impl RenderOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, RenderStatus::Written { .. })
    }
}

pub struct RenderBridge {
    parser: Option<Box<dyn ChordParser>>,
    sink: Option<Box<dyn MidiSink>>,
    config: GeneratorConfig,
}

impl RenderBridge {
    /// Bridge with the built-in symbol parser and SMF writer installed.
    pub fn probe(config: GeneratorConfig) -> Self {
        RenderBridge {
            parser: Some(Box::new(SymbolChordParser)),
            sink: Some(Box::new(SmfSink)),
            config,
        }
    }

    pub fn with_parser(mut self, parser: Option<Box<dyn ChordParser>>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_sink(mut self, sink: Option<Box<dyn MidiSink>>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn render(
        &self,
        plan: &HarmonyPlan,
        path: &Path,
        vulnerability: f64,
        seed: Option<u64>,
    ) -> RenderOutcome {
        let degraded = |reason: DegradedReason| {
            warn!(
                chords = %plan.progression(),
                path = %path.display(),
                %reason,
                "render degraded, no MIDI written"
            );
            RenderOutcome {
                path: path.to_path_buf(),
                status: RenderStatus::Degraded(reason),
            }
        };

        let Some(parser) = &self.parser else {
            return degraded(DegradedReason::ParserUnavailable);
        };
        let Some(sink) = &self.sink else {
            return degraded(DegradedReason::SinkUnavailable);
        };

        let chords = parser.parse(&plan.progression());
        if chords.is_empty() {
            return degraded(DegradedReason::NoChords);
        }

        let mut rng = rng_for(seed);
        let raw = NoteAssembler::new(&self.config).assemble_chords(plan, &chords, &mut rng);
        let humanizer =
            GrooveHumanizer::new(plan.complexity, vulnerability, self.config.groove.clone());
        let notes = humanizer.apply(&raw, &mut rng);
        let note_count = notes.len();
        debug!(raw = raw.len(), humanized = note_count, "performance ready");

        let track = &self.config.track;
        let request = TrackRequest {
            project_name: track.project_name.clone(),
            track_name: track.track_name.clone(),
            channel: track.channel.min(15),
            instrument: track.instrument.clone(),
            notes,
            tempo_bpm: plan.tempo_bpm,
            time_signature: plan.time_signature,
            ticks_per_quarter: self.config.ticks_per_quarter,
        };

        match sink.write(&request, path) {
            Ok(written) => RenderOutcome {
                path: written,
                status: RenderStatus::Written { notes: note_count },
            },
            Err(e) => degraded(DegradedReason::SinkFailed(e.to_string())),
        }
    }
}

/// Inputs for a one-shot phrase render.
#[derive(Debug, Clone)]
pub struct PhraseRequest {
    pub motivation: i64,
    pub chaos: f64,
    pub vulnerability: f64,
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for PhraseRequest {
    fn default() -> Self {
        PhraseRequest {
            motivation: 5,
            chaos: 0.5,
            vulnerability: 0.5,
            seed: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// What a phrase render decided and produced.
#[derive(Debug, Clone)]
pub struct PhraseRender {
    pub input: InputOutcome,
    pub plan: HarmonyPlan,
    pub outcome: RenderOutcome,
}

/// Output file name for a phrase: `heartwood_<clean>_<unix_secs>.mid`.
pub fn phrase_file_name(phrase: &str, unix_secs: u64) -> String {
    let mut clean = String::new();
    for c in phrase.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            clean.push(c);
        } else if !clean.ends_with('_') {
            clean.push('_');
        }
    }
    let clean: String = clean.chars().take(30).collect();
    let clean = clean.trim_matches('_');
    let clean = if clean.is_empty() { "untitled" } else { clean };
    format!("heartwood_{clean}_{unix_secs}.mid")
}

impl RenderBridge {
    pub fn render_phrase(&self, phrase: &str, request: &PhraseRequest) -> PhraseRender {
        let mut session = Session::new();
        session.set_scales(request.motivation, request.chaos);
        let input = session.process_input(phrase);
        let plan = session.generate_plan();

        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = request.output_dir.join(phrase_file_name(phrase, unix_secs));
        let outcome = self.render(&plan, &path, request.vulnerability, request.seed);
        PhraseRender {
            input,
            plan,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::ParsedChord;
    use crate::error::SinkError;
    use crate::note::NoteEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records what it was asked to write instead of touching the disk.
    /// Clones share the same buffer, so the test keeps one to inspect.
    #[derive(Clone, Default)]
    struct CaptureSink {
        notes: Rc<RefCell<Vec<NoteEvent>>>,
    }

    impl MidiSink for CaptureSink {
        fn write(&self, track: &TrackRequest, path: &Path) -> Result<PathBuf, SinkError> {
            *self.notes.borrow_mut() = track.notes.clone();
            Ok(path.to_path_buf())
        }
    }

    struct FailingSink;

    impl MidiSink for FailingSink {
        fn write(&self, _: &TrackRequest, _: &Path) -> Result<PathBuf, SinkError> {
            Err(SinkError::Io(std::io::Error::other("disk full")))
        }
    }

    struct EmptyParser;

    impl ChordParser for EmptyParser {
        fn parse(&self, _: &str) -> Vec<ParsedChord> {
            Vec::new()
        }
    }

    fn plan() -> HarmonyPlan {
        let mut session = Session::new();
        session.set_scales(5, 0.5);
        session.process_input("I feel so lost and alone");
        session.generate_plan()
    }

    fn capture() -> CaptureSink {
        CaptureSink::default()
    }

    #[test]
    fn test_render_writes_humanized_notes() {
        let sink = capture();
        let bridge = RenderBridge::probe(GeneratorConfig::default())
            .with_sink(Some(Box::new(sink.clone())));
        let plan = plan();
        let out = bridge.render(&plan, Path::new("x.mid"), 0.5, Some(42));
        let RenderStatus::Written { notes } = out.status else {
            panic!("expected written, got {:?}", out.status);
        };
        assert_eq!(notes, sink.notes.borrow().len());
        assert!(notes > 0);
        assert_eq!(out.path, PathBuf::from("x.mid"));
    }

    #[test]
    fn test_seeded_render_reproducible() {
        let plan = plan();
        let run = || {
            let sink = capture();
            let bridge = RenderBridge::probe(GeneratorConfig::default())
                .with_sink(Some(Box::new(sink.clone())));
            bridge.render(&plan, Path::new("x.mid"), 0.3, Some(7));
            sink.notes.borrow().clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_missing_collaborators_degrade() {
        let plan = plan();
        let path = Path::new("never.mid");

        let no_parser = RenderBridge::probe(GeneratorConfig::default()).with_parser(None);
        let out = no_parser.render(&plan, path, 0.5, Some(1));
        assert_eq!(out.status, RenderStatus::Degraded(DegradedReason::ParserUnavailable));
        assert_eq!(out.path, path);

        let no_sink = RenderBridge::probe(GeneratorConfig::default()).with_sink(None);
        let out = no_sink.render(&plan, path, 0.5, Some(1));
        assert_eq!(out.status, RenderStatus::Degraded(DegradedReason::SinkUnavailable));
    }

    #[test]
    fn test_empty_parse_degrades() {
        let bridge = RenderBridge::probe(GeneratorConfig::default())
            .with_parser(Some(Box::new(EmptyParser)));
        let out = bridge.render(&plan(), Path::new("y.mid"), 0.5, Some(1));
        assert_eq!(out.status, RenderStatus::Degraded(DegradedReason::NoChords));
        assert!(!out.is_written());
    }

    #[test]
    fn test_sink_failure_degrades() {
        let bridge =
            RenderBridge::probe(GeneratorConfig::default()).with_sink(Some(Box::new(FailingSink)));
        let out = bridge.render(&plan(), Path::new("z.mid"), 0.5, Some(1));
        match out.status {
            RenderStatus::Degraded(DegradedReason::SinkFailed(msg)) => {
                assert!(msg.contains("disk full"), "{msg}")
            }
            other => panic!("expected sink failure, got {other:?}"),
        }
        assert_eq!(out.path, PathBuf::from("z.mid"));
    }

    #[test]
    fn test_unwritable_resolution_degrades_without_panicking() {
        let mut config = GeneratorConfig::default();
        config.ticks_per_quarter = u16::MAX;
        let path = std::env::temp_dir().join("heartwood_unwritable_ppq.mid");
        let out = RenderBridge::probe(config).render(&plan(), &path, 0.5, Some(1));
        match out.status {
            RenderStatus::Degraded(DegradedReason::SinkFailed(msg)) => {
                assert!(msg.contains("65535"), "{msg}")
            }
            other => panic!("expected sink failure, got {other:?}"),
        }
        assert_eq!(out.path, path);
        assert!(!path.exists());
    }

    #[test]
    fn test_phrase_file_name() {
        assert_eq!(
            phrase_file_name("I feel so lost & alone!", 1700000000),
            "heartwood_i_feel_so_lost_alone_1700000000.mid"
        );
        assert_eq!(phrase_file_name("   ", 5), "heartwood_untitled_5.mid");
        assert_eq!(phrase_file_name("", 5), "heartwood_untitled_5.mid");
        let long = phrase_file_name("the quick brown fox jumps over the lazy dog", 1);
        assert_eq!(long, "heartwood_the_quick_brown_fox_jumps_over_1.mid");
    }

    #[test]
    fn test_render_phrase_uses_session() {
        let sink = capture();
        let bridge = RenderBridge::probe(GeneratorConfig::default())
            .with_sink(Some(Box::new(sink.clone())));
        let request = PhraseRequest {
            seed: Some(3),
            output_dir: PathBuf::from("out"),
            ..PhraseRequest::default()
        };
        let result = bridge.render_phrase("so angry I could scream", &request);
        assert!(result.outcome.is_written());
        assert!(result.outcome.path.starts_with("out"));
        assert_eq!(result.plan.length_bars, 32);
    }
}
