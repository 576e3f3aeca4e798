// Affect analysis: scores free text against a fixed emotional lexicon.
//
// Each affect in the catalog owns a keyword set. Input text is lower-cased
// and tokenized into words (alphanumerics plus apostrophes, so "can't" and
// "won't" stay whole), and every keyword -- single word or multi-word
// phrase -- is counted wherever its token sequence appears. Matching is
// whole-word: "impatient" never scores for "patient", "freedom" never
// scores for "free".
//
// Primary selection is a strict maximum with ties broken by catalog order
// (first declared wins). A zero top score means the text carries no
// recognizable affect and yields `Affect::Neutral`.
//
// The result feeds session.rs (mode and tempo selection) and tension.rs
// (structure archetype). The kit mapper at the bottom is a pure lookup used
// by downstream sample selection; the pipeline itself never calls it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Closed set of affect tags, in catalog (tie-break) order, plus `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affect {
    Grief,
    Rage,
    Awe,
    Nostalgia,
    Fear,
    Dissociation,
    Defiance,
    Tenderness,
    Confusion,
    Neutral,
}

impl Affect {
    /// Scored affects in declaration order. `Neutral` is never scored.
    pub const CATALOG: [Affect; 9] = [
        Affect::Grief,
        Affect::Rage,
        Affect::Awe,
        Affect::Nostalgia,
        Affect::Fear,
        Affect::Dissociation,
        Affect::Defiance,
        Affect::Tenderness,
        Affect::Confusion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Affect::Grief => "grief",
            Affect::Rage => "rage",
            Affect::Awe => "awe",
            Affect::Nostalgia => "nostalgia",
            Affect::Fear => "fear",
            Affect::Dissociation => "dissociation",
            Affect::Defiance => "defiance",
            Affect::Tenderness => "tenderness",
            Affect::Confusion => "confusion",
            Affect::Neutral => "neutral",
        }
    }

    /// Case-insensitive tag lookup.
    pub fn from_name(name: &str) -> Option<Affect> {
        let wanted = name.trim().to_lowercase();
        Affect::CATALOG
            .into_iter()
            .chain(std::iter::once(Affect::Neutral))
            .find(|a| a.name() == wanted)
    }
}

impl std::fmt::Display for Affect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of analyzing one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectResult {
    pub primary: Affect,
    pub secondary: Option<Affect>,
    /// Raw keyword hits per catalog affect. Empty for empty input.
    pub scores: BTreeMap<Affect, u32>,
    /// `min(1, primary_hits / 3)`.
    pub intensity: f64,
}

impl AffectResult {
    pub fn neutral() -> Self {
        AffectResult {
            primary: Affect::Neutral,
            secondary: None,
            scores: BTreeMap::new(),
            intensity: 0.0,
        }
    }

    /// Hit count for one affect (0 when absent).
    pub fn score(&self, affect: Affect) -> u32 {
        self.scores.get(&affect).copied().unwrap_or(0)
    }
}

/// Keyword hits at which intensity saturates.
const INTENSITY_SATURATION: f64 = 3.0;

const STANDARD_KEYWORDS: [(Affect, &[&str]); 9] = [
    (
        Affect::Grief,
        &["loss", "gone", "miss", "dead", "died", "funeral", "mourning", "never again", "empty"],
    ),
    (
        Affect::Rage,
        &["angry", "furious", "hate", "betrayed", "unfair", "revenge", "burn", "fight", "destroy"],
    ),
    (
        Affect::Awe,
        &["wonder", "beautiful", "infinite", "god", "universe", "transcend", "light", "vast"],
    ),
    (
        Affect::Nostalgia,
        &["remember", "used to", "childhood", "back when", "old days", "memory", "home"],
    ),
    (
        Affect::Fear,
        &["scared", "terrified", "panic", "can't breathe", "trapped", "anxious", "dread"],
    ),
    (
        Affect::Dissociation,
        &["numb", "nothing", "floating", "unreal", "detached", "fog", "grey", "wall"],
    ),
    (
        Affect::Defiance,
        &["won't", "refuse", "stand", "strong", "break", "free", "my own", "no more"],
    ),
    (
        Affect::Tenderness,
        &["soft", "gentle", "hold", "love", "kind", "care", "fragile", "warm"],
    ),
    (
        Affect::Confusion,
        &["why", "lost", "don't know", "spinning", "chaos", "strange", "question"],
    ),
];

/// One affect's keywords, pre-tokenized.
#[derive(Debug, Clone)]
struct LexiconEntry {
    affect: Affect,
    phrases: Vec<Vec<String>>,
}

/// Keyword table used by the analyzer.
#[derive(Debug, Clone)]
pub struct AffectLexicon {
    entries: Vec<LexiconEntry>,
}

impl AffectLexicon {
    /// The built-in lexicon covering every catalog affect.
    pub fn standard() -> Self {
        let mut lexicon = AffectLexicon { entries: Vec::new() };
        for (affect, words) in STANDARD_KEYWORDS {
            lexicon.extend(affect, words.iter().copied());
        }
        lexicon
    }

    /// Add keywords for an affect. Keywords that tokenize to nothing are
    /// ignored. Entries stay in catalog order regardless of insertion order.
    pub fn extend<'a>(&mut self, affect: Affect, keywords: impl IntoIterator<Item = &'a str>) {
        if affect == Affect::Neutral {
            return;
        }
        let phrases = keywords
            .into_iter()
            .map(tokenize)
            .filter(|p| !p.is_empty());
        match self.entries.iter_mut().find(|e| e.affect == affect) {
            Some(entry) => entry.phrases.extend(phrases),
            None => {
                self.entries.push(LexiconEntry {
                    affect,
                    phrases: phrases.collect(),
                });
                self.entries.sort_by_key(|e| e.affect);
            }
        }
    }

    /// Count whole-word keyword occurrences per affect.
    fn score_tokens(&self, tokens: &[String]) -> BTreeMap<Affect, u32> {
        self.entries
            .iter()
            .map(|entry| {
                let hits: usize = entry
                    .phrases
                    .iter()
                    .map(|phrase| count_phrase(tokens, phrase))
                    .sum();
                (entry.affect, hits as u32)
            })
            .collect()
    }
}

impl Default for AffectLexicon {
    fn default() -> Self {
        AffectLexicon::standard()
    }
}

/// Lower-case word tokens; apostrophes (straight or curly) stay inside words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

fn count_phrase(tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return 0;
    }
    tokens.windows(phrase.len()).filter(|w| *w == phrase).count()
}

/// Weighted-keyword affect classifier.
#[derive(Debug, Clone, Default)]
pub struct AffectAnalyzer {
    lexicon: AffectLexicon,
}

impl AffectAnalyzer {
    pub fn new() -> Self {
        AffectAnalyzer::default()
    }

    pub fn with_lexicon(lexicon: AffectLexicon) -> Self {
        AffectAnalyzer { lexicon }
    }

    pub fn analyze(&self, text: &str) -> AffectResult {
        if text.trim().is_empty() {
            return AffectResult::neutral();
        }

        let tokens = tokenize(text);
        let scores = self.lexicon.score_tokens(&tokens);

        let primary = strongest(&scores, None);
        let result = match primary {
            None => AffectResult {
                primary: Affect::Neutral,
                secondary: None,
                scores,
                intensity: 0.0,
            },
            Some((primary, hits)) => AffectResult {
                primary,
                secondary: strongest(&scores, Some(primary)).map(|(a, _)| a),
                intensity: (hits as f64 / INTENSITY_SATURATION).min(1.0),
                scores,
            },
        };

        debug!(
            primary = %result.primary,
            secondary = ?result.secondary,
            intensity = result.intensity,
            tokens = tokens.len(),
            "analyzed affect"
        );
        result
    }
}

/// Highest nonzero score, first in catalog order on ties.
fn strongest(scores: &BTreeMap<Affect, u32>, exclude: Option<Affect>) -> Option<(Affect, u32)> {
    let mut best: Option<(Affect, u32)> = None;
    for (&affect, &hits) in scores {
        if Some(affect) == exclude || hits == 0 {
            continue;
        }
        if best.is_none_or(|(_, top)| hits > top) {
            best = Some((affect, hits));
        }
    }
    best
}

/// Suggested sample kit for a mood tag. Unknown tags get the standard kit.
pub fn kit_for_mood(tag: &str) -> &'static str {
    match tag.trim().to_lowercase().as_str() {
        "grief" | "dissociation" | "broken" => "LoFi_Bedroom_Kit",
        "rage" | "defiance" | "fear" => "Industrial_Glitch_Kit",
        "awe" | "tenderness" => "Ambient_Kit",
        "nostalgia" => "Vinyl_Kit",
        _ => "Standard_Kit",
    }
}
