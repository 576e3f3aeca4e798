// MIDI output for humanized performances.
//
// `MidiSink` is the collaborator the render bridge hands its final note
// sequence to. `SmfSink` is the built-in implementation: a Standard MIDI File
// (format 1) written with the `midly` crate.
//
// Layout: track 0 carries tempo, time signature, and the project name;
// track 1 carries the harmony part (track name, optional program change,
// note on/off pairs). Notes are converted to absolute-tick events, sorted,
// and re-expressed as deltas. At equal ticks note-offs go first, so a pitch
// re-struck on the next bar is never cut short by its own release.

use crate::error::SinkError;
use crate::note::NoteEvent;
use crate::plan::TimeSignature;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Largest resolution an SMF header can carry (15 bits).
pub const MAX_TICKS_PER_QUARTER: u16 = 0x7fff;

/// Everything a sink needs to write one harmony track.
#[derive(Debug, Clone)]
pub struct TrackRequest {
    pub project_name: String,
    pub track_name: String,
    /// 0–15; larger values are clamped.
    pub channel: u8,
    pub instrument: Option<String>,
    pub notes: Vec<NoteEvent>,
    pub tempo_bpm: u16,
    pub time_signature: TimeSignature,
    /// Must match the resolution the notes were laid out at.
    pub ticks_per_quarter: u16,
}

/// Writes a track to a file and returns the realized path.
pub trait MidiSink {
    fn write(&self, track: &TrackRequest, path: &Path) -> Result<PathBuf, SinkError>;
}

/// General MIDI program for an instrument tag.
pub fn gm_program(tag: &str) -> Option<u8> {
    match tag.trim().to_lowercase().as_str() {
        "piano" => Some(0),
        "electric_piano" => Some(4),
        "organ" => Some(19),
        "guitar" => Some(24),
        "bass" => Some(33),
        "strings" => Some(48),
        "choir" => Some(52),
        "pad" => Some(88),
        _ => None,
    }
}

/// `midly`-backed Standard MIDI File writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmfSink;

impl MidiSink for SmfSink {
    fn write(&self, track: &TrackRequest, path: &Path) -> Result<PathBuf, SinkError> {
        let smf = track_to_smf(track)?;
        let mut buf = Vec::new();
        smf.write_std(&mut buf)?;
        std::fs::write(path, &buf)?;
        info!(path = %path.display(), notes = track.notes.len(), "MIDI written");
        Ok(path.to_path_buf())
    }
}

/// Build the in-memory SMF for a track request.
pub fn track_to_smf(track: &TrackRequest) -> Result<Smf<'_>, SinkError> {
    let denominator = track.time_signature.denominator;
    if !denominator.is_power_of_two() {
        return Err(SinkError::TimeSignature(denominator));
    }
    let ppq = track.ticks_per_quarter;
    if !(1..=MAX_TICKS_PER_QUARTER).contains(&ppq) {
        return Err(SinkError::Resolution(ppq));
    }

    let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(ppq))));

    let mut meta_track: Track<'_> = Vec::new();
    let tempo_us = 60_000_000 / track.tempo_bpm.max(1) as u32;
    meta_track.push(meta(MetaMessage::Tempo(u24::new(tempo_us.min(0xff_ffff)))));
    meta_track.push(meta(MetaMessage::TimeSignature(
        track.time_signature.numerator,
        denominator.trailing_zeros() as u8,
        24,
        8,
    )));
    meta_track.push(meta(MetaMessage::TrackName(track.project_name.as_bytes())));
    meta_track.push(meta(MetaMessage::EndOfTrack));
    smf.tracks.push(meta_track);

    let channel = u4::new(track.channel.min(15));
    let mut part: Track<'_> = Vec::new();
    part.push(meta(MetaMessage::TrackName(track.track_name.as_bytes())));

    if let Some(tag) = &track.instrument {
        match gm_program(tag) {
            Some(program) => part.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange {
                        program: u7::new(program),
                    },
                },
            }),
            None => warn!(instrument = %tag, "unknown instrument tag, no program change"),
        }
    }

    // (tick, is_on, pitch, velocity); false sorts before true.
    let mut events: Vec<(u32, bool, u8, u8)> = Vec::with_capacity(track.notes.len() * 2);
    for note in &track.notes {
        let pitch = note.pitch.min(127);
        events.push((note.start_tick, true, pitch, note.velocity.min(127)));
        events.push((note.end_tick(), false, pitch, 0));
    }
    events.sort_by_key(|&(tick, is_on, _, _)| (tick, is_on));

    let mut last_tick = 0u32;
    for (tick, is_on, pitch, vel) in events {
        let key = u7::new(pitch);
        let message = if is_on {
            MidiMessage::NoteOn { key, vel: u7::new(vel) }
        } else {
            MidiMessage::NoteOff { key, vel: u7::new(0) }
        };
        part.push(TrackEvent {
            delta: u28::new((tick - last_tick).min(0x0fff_ffff)),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }
    part.push(meta(MetaMessage::EndOfTrack));
    smf.tracks.push(part);

    Ok(smf)
}

fn meta(message: MetaMessage<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(notes: Vec<NoteEvent>) -> TrackRequest {
        TrackRequest {
            project_name: "Test".into(),
            track_name: "Harmony".into(),
            channel: 0,
            instrument: Some("piano".into()),
            notes,
            tempo_bpm: 100,
            time_signature: TimeSignature::COMMON,
            ticks_per_quarter: 480,
        }
    }

    fn note(pitch: u8, start_tick: u32) -> NoteEvent {
        NoteEvent {
            pitch,
            velocity: 80,
            start_tick,
            duration_ticks: 480,
            bar: 0,
        }
    }

    #[test]
    fn test_track_layout() {
        let req = request(vec![note(60, 0), note(64, 0), note(67, 480)]);
        let smf = track_to_smf(&req).unwrap();
        assert_eq!(smf.tracks.len(), 2);
        // name + program change + 6 note events + end of track
        assert_eq!(smf.tracks[1].len(), 9);
    }

    #[test]
    fn test_note_off_precedes_note_on_at_same_tick() {
        let req = request(vec![note(60, 0), note(60, 480)]);
        let smf = track_to_smf(&req).unwrap();
        let kinds: Vec<bool> = smf.tracks[1]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. } => Some(true),
                TrackEventKind::Midi { message: MidiMessage::NoteOff { .. }, .. } => Some(false),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![true, false, true, false]);
    }

    #[test]
    fn test_unknown_instrument_skips_program_change() {
        let mut req = request(vec![note(60, 0)]);
        req.instrument = Some("theremin".into());
        let smf = track_to_smf(&req).unwrap();
        assert!(!smf.tracks[1].iter().any(|e| matches!(
            e.kind,
            TrackEventKind::Midi { message: MidiMessage::ProgramChange { .. }, .. }
        )));
    }

    #[test]
    fn test_bad_denominator_rejected() {
        let mut req = request(vec![]);
        req.time_signature = TimeSignature {
            numerator: 4,
            denominator: 3,
        };
        assert!(matches!(track_to_smf(&req), Err(SinkError::TimeSignature(3))));
    }

    #[test]
    fn test_unrepresentable_resolution_rejected() {
        let mut req = request(vec![note(60, 0)]);
        req.ticks_per_quarter = 40_000;
        assert!(matches!(track_to_smf(&req), Err(SinkError::Resolution(40_000))));
        req.ticks_per_quarter = 0;
        assert!(matches!(track_to_smf(&req), Err(SinkError::Resolution(0))));
        req.ticks_per_quarter = MAX_TICKS_PER_QUARTER;
        let smf = track_to_smf(&req).unwrap();
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(MAX_TICKS_PER_QUARTER)));
    }

    #[test]
    fn test_gm_program_table() {
        assert_eq!(gm_program("Piano"), Some(0));
        assert_eq!(gm_program("pad"), Some(88));
        assert_eq!(gm_program("kazoo"), None);
    }
}
