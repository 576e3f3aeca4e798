// Modal vocabulary for harmony plans.
//
// The seven diatonic modes, each defined by its interval pattern from the
// tonic. The planner picks one per request from the listener's affect
// (`Mode::for_affect`), and the mode then selects a chord progression in
// session.rs.
//
// The affect→mode table is an exhaustive match so adding an affect without
// deciding its mode is a compile error.

use crate::affect::Affect;
use serde::{Deserialize, Serialize};

/// The seven modes of the diatonic scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major scale.
    Ionian,
    /// Minor with a raised 6th.
    Dorian,
    /// Minor with the half-step from 1 to 2.
    Phrygian,
    /// Major with a raised 4th.
    Lydian,
    /// Major with a lowered 7th.
    Mixolydian,
    /// Natural minor.
    Aeolian,
    /// Diminished 5th above the tonic; the least stable mode.
    Locrian,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Ionian,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Aeolian,
        Mode::Locrian,
    ];

    /// Semitone intervals from the tonic to each of the 7 degrees.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Ionian => [0, 2, 4, 5, 7, 9, 11],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
            Mode::Aeolian => [0, 2, 3, 5, 7, 8, 10],
            Mode::Locrian => [0, 1, 3, 5, 6, 8, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Locrian => "locrian",
        }
    }

    pub fn from_name(name: &str) -> Option<Mode> {
        let wanted = name.trim().to_lowercase();
        Mode::ALL.into_iter().find(|m| m.name() == wanted)
    }

    /// Mode suggested for a listener's primary affect.
    pub fn for_affect(affect: Affect) -> Mode {
        match affect {
            Affect::Grief => Mode::Aeolian,
            Affect::Rage => Mode::Phrygian,
            Affect::Awe => Mode::Lydian,
            Affect::Nostalgia => Mode::Dorian,
            Affect::Fear => Mode::Phrygian,
            Affect::Dissociation => Mode::Locrian,
            Affect::Defiance => Mode::Mixolydian,
            Affect::Tenderness => Mode::Ionian,
            Affect::Confusion => Mode::Locrian,
            Affect::Neutral => Mode::Ionian,
        }
    }

    /// Whether a pitch class (relative to C) belongs to this mode on `tonic_pc`.
    pub fn contains(self, tonic_pc: u8, pc: u8) -> bool {
        let rel = (pc % 12 + 12 - tonic_pc % 12) % 12;
        self.intervals().contains(&rel)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
