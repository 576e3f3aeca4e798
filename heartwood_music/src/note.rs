// The note record shared by every stage after planning.
//
// The assembler creates these in bulk, the humanizer returns perturbed
// copies, and the MIDI sink consumes the final sequence. Stages never share
// a sequence: each returns a fresh `Vec<NoteEvent>`.

use serde::{Deserialize, Serialize};

/// One pitched, timed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number.
    pub pitch: u8,
    /// MIDI velocity. Assembler and humanizer both clamp to 20–120.
    pub velocity: u8,
    /// Onset in ticks from the start of the song.
    pub start_tick: u32,
    pub duration_ticks: u32,
    /// Bar the note was generated for (unchanged by humanization).
    pub bar: u32,
}

impl NoteEvent {
    pub fn end_tick(&self) -> u32 {
        self.start_tick.saturating_add(self.duration_ticks)
    }
}
