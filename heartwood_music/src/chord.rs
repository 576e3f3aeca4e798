// Chord symbols: pitch classes, quality→interval table, and the parser
// collaborator that turns a hyphen-joined progression into parsed chords.
//
// The parser sits behind the `ChordParser` trait so the render bridge can
// run without one (or with a stand-in) and report that as a degraded
// outcome. `SymbolChordParser` is the built-in implementation.

use tracing::warn;

const PITCH_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Display name for a pitch class (flats preferred).
pub fn pitch_class_name(pc: u8) -> &'static str {
    PITCH_NAMES[(pc % 12) as usize]
}

/// Parse a note name like `C`, `F#`, `Bb` into a pitch class.
pub fn parse_pitch_class(name: &str) -> Option<u8> {
    let mut chars = name.trim().chars();
    let letter = chars.next()?;
    let natural: u8 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let pc = match chars.next() {
        None => natural,
        Some('#') => (natural + 1) % 12,
        Some('b') => (natural + 11) % 12,
        Some(_) => return None,
    };
    match chars.next() {
        None => Some(pc),
        Some(_) => None,
    }
}

/// Semitone offsets above the root for a quality string.
///
/// Lookup is exact first, then tries a few common spellings. Returns `None`
/// for anything unrecognized; callers pick their own fallback.
pub fn quality_intervals(quality: &str) -> Option<&'static [u8]> {
    let intervals: &'static [u8] = match quality {
        "" | "maj" | "M" => &[0, 4, 7],
        "m" | "min" | "-" => &[0, 3, 7],
        "dim" | "°" | "o" => &[0, 3, 6],
        "aug" | "+" => &[0, 4, 8],
        "maj7" | "Maj7" | "M7" | "Δ7" => &[0, 4, 7, 11],
        "min7" | "m7" | "-7" => &[0, 3, 7, 10],
        "7" | "dom7" => &[0, 4, 7, 10],
        "dim7" | "°7" => &[0, 3, 6, 9],
        "m7b5" | "ø" | "ø7" => &[0, 3, 6, 10],
        "sus2" => &[0, 2, 7],
        "sus4" | "sus" => &[0, 5, 7],
        "6" => &[0, 4, 7, 9],
        "m6" => &[0, 3, 7, 9],
        "9" => &[0, 4, 7, 10, 14],
        "maj9" => &[0, 4, 7, 11, 14],
        "m9" => &[0, 3, 7, 10, 14],
        "add9" => &[0, 4, 7, 14],
        "5" => &[0, 7],
        _ => return None,
    };
    Some(intervals)
}

/// One chord from a progression string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChord {
    /// Root pitch class, 0–11.
    pub root_pc: u8,
    /// Quality suffix: `maj`, `min`, or the symbol's suffix verbatim.
    pub quality: String,
}

impl ParsedChord {
    /// Intervals for this chord. Unknown qualities containing `m` become a
    /// minor triad, anything else a major triad.
    pub fn intervals(&self) -> &'static [u8] {
        quality_intervals(&self.quality).unwrap_or_else(|| {
            if self.quality.contains('m') {
                &[0, 3, 7]
            } else {
                &[0, 4, 7]
            }
        })
    }
}

/// Turns a hyphen-joined progression (`"C-Am-F-G"`) into parsed chords.
pub trait ChordParser {
    fn parse(&self, progression: &str) -> Vec<ParsedChord>;
}

/// Built-in parser for plain chord symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolChordParser;

impl SymbolChordParser {
    pub fn parse_symbol(symbol: &str) -> Option<ParsedChord> {
        let symbol = symbol.trim();
        let mut chars = symbol.chars();
        let letter = chars.next()?;
        // A `b` right after the letter is always a flat: "Bb" is B-flat.
        let root_len = match chars.next() {
            Some('#' | 'b') => letter.len_utf8() + 1,
            _ => letter.len_utf8(),
        };
        let root_pc = parse_pitch_class(&symbol[..root_len])?;
        let quality = match &symbol[root_len..] {
            "" => "maj".to_owned(),
            "m" => "min".to_owned(),
            suffix => suffix.to_owned(),
        };
        Some(ParsedChord { root_pc, quality })
    }
}

impl ChordParser for SymbolChordParser {
    fn parse(&self, progression: &str) -> Vec<ParsedChord> {
        progression
            .split('-')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|symbol| {
                let parsed = SymbolChordParser::parse_symbol(symbol);
                if parsed.is_none() {
                    warn!(symbol, "skipping unparseable chord symbol");
                }
                parsed
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_parsing() {
        assert_eq!(parse_pitch_class("C"), Some(0));
        assert_eq!(parse_pitch_class("F#"), Some(6));
        assert_eq!(parse_pitch_class("Bb"), Some(10));
        assert_eq!(parse_pitch_class("Cb"), Some(11));
        assert_eq!(parse_pitch_class("H"), None);
        assert_eq!(parse_pitch_class("C##"), None);
        assert_eq!(pitch_class_name(13), "Db");
    }

    #[test]
    fn test_parse_progression() {
        let chords = SymbolChordParser.parse("C-Am-F-G");
        let roots: Vec<u8> = chords.iter().map(|c| c.root_pc).collect();
        assert_eq!(roots, vec![0, 9, 5, 7]);
        assert_eq!(chords[0].quality, "maj");
        assert_eq!(chords[1].quality, "min");
    }

    #[test]
    fn test_parse_accidentals_and_suffixes() {
        let chords = SymbolChordParser.parse("Cdim-DbMaj7-Ebm-Bb-F#m7");
        assert_eq!(chords.len(), 5);
        assert_eq!((chords[1].root_pc, chords[1].quality.as_str()), (1, "Maj7"));
        assert_eq!((chords[2].root_pc, chords[2].quality.as_str()), (3, "min"));
        assert_eq!((chords[3].root_pc, chords[3].quality.as_str()), (10, "maj"));
        assert_eq!((chords[4].root_pc, chords[4].quality.as_str()), (6, "m7"));
        assert_eq!(chords[1].intervals(), &[0, 4, 7, 11]);
    }

    #[test]
    fn test_b_flat_vs_b_with_suffix() {
        let c = SymbolChordParser::parse_symbol("Bbm").unwrap();
        assert_eq!((c.root_pc, c.quality.as_str()), (10, "min"));
        let c = SymbolChordParser::parse_symbol("Bm").unwrap();
        assert_eq!((c.root_pc, c.quality.as_str()), (11, "min"));
    }

    #[test]
    fn test_unparseable_symbols_skipped() {
        let chords = SymbolChordParser.parse("C--X7-G");
        assert_eq!(chords.len(), 2);
        assert!(SymbolChordParser.parse("").is_empty());
    }

    #[test]
    fn test_quality_table_covers_required() {
        for q in ["maj", "min", "dim", "aug", "maj7", "min7", "7"] {
            assert!(quality_intervals(q).is_some(), "missing quality {q}");
        }
    }

    #[test]
    fn test_unknown_quality_fallback() {
        let minorish = ParsedChord { root_pc: 0, quality: "mystery-m".into() };
        assert_eq!(minorish.intervals(), &[0, 3, 7]);
        let majorish = ParsedChord { root_pc: 0, quality: "13#11".into() };
        assert_eq!(majorish.intervals(), &[0, 4, 7]);
    }
}
