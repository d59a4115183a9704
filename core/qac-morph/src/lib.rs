#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use qac_protocol::{
    Case, Letter, LetterBuffer, Number, PartOfSpeech, Person, PronounRole, Segment, SegmentKind,
};

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Lemmas whose genitive is written with a fatha, sorted for binary search.
const DIPTOTE_LEMMAS: [&str; 41] = [
    "<iboraAhiym",
    "<idoriys",
    "<iloyaAs",
    "<iram",
    "<isoHaAq",
    "<isomaAEiyl",
    "<isoraA}iyl",
    ">a$ad~",
    ">aHosan",
    ">aqorab",
    ">asofal",
    ">ay~uwb",
    "A^dam",
    "A^zar",
    "Eimora`n",
    "baAbil",
    "bak~ap",
    "daAwud",
    "firoEawon",
    "ha`ruwn",
    "ha`ruwt",
    "jaAluwt",
    "jahan~am",
    "jiboriyl",
    "luqoma`n",
    "ma`ruwt",
    "madoyan",
    "mak~ap",
    "maroyam",
    "miSor",
    "miykaY`l",
    "qa`ruwn",
    "ramaDaAn",
    "saqar",
    "sayonaA^'",
    "siyniyn",
    "sulayoma`n",
    "vamuwd",
    "yaEoquwb",
    "yuwnus",
    "yuwsuf",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphError {
    BaselineMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for MorphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorphError::BaselineMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "Baseline mismatch for {}: expected {}, found {}",
                name, expected, actual
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MorphError {}

/// The word's stem (the first one for a two-stem contraction).
pub fn stem_of(segments: &[Segment]) -> Option<&Segment> {
    segments.iter().find(|segment| segment.kind == SegmentKind::Stem)
}

pub fn is_determiner_al(segments: &[Segment]) -> bool {
    has_prefix(segments, PartOfSpeech::Determiner)
}

pub fn is_interrogative_alif(segments: &[Segment]) -> bool {
    has_prefix(segments, PartOfSpeech::Interrogative)
}

fn has_prefix(segments: &[Segment], pos: PartOfSpeech) -> bool {
    segments
        .iter()
        .take_while(|segment| segment.kind == SegmentKind::Prefix)
        .any(|segment| segment.pos == pos)
}

fn last_letter(letters: &LetterBuffer) -> Option<Letter> {
    let last = letters.len().checked_sub(1)?;
    letters.letter_at(last).ok().flatten()
}

/// Emphatic nun written as tanwin over an alif.
pub fn is_emphatic_noon_with_tanween(segment: &Segment) -> bool {
    segment.kind == SegmentKind::Suffix
        && segment.pos == PartOfSpeech::Emphatic
        && last_letter(&segment.letters) == Some(Letter::Alif)
}

/// First person singular object pronoun whose ya is not written.
///
/// `word` is the full word the suffix was cut from, needed when the suffix
/// is empty and the letter before it decides.
pub fn is_suffix_elision(word: &LetterBuffer, suffix: &Segment) -> bool {
    let features = &suffix.features;
    if features.pronoun_role != Some(PronounRole::Object)
        || features.person != Some(Person::First)
        || features.number != Some(Number::Singular)
    {
        return false;
    }

    match suffix.letters.len() {
        0 => {
            let before = suffix
                .span
                .start
                .checked_sub(1)
                .and_then(|index| word.letter_at(index).ok().flatten());
            before != Some(Letter::AlifMaqsura)
        }
        // ha + ya
        2 => false,
        _ => !matches!(
            last_letter(&suffix.letters),
            Some(Letter::AlifMaqsura) | Some(Letter::Ya)
        ),
    }
}

pub fn is_diptote_lemma(key: &str) -> bool {
    DIPTOTE_LEMMAS
        .binary_search_by(|probe| (*probe).cmp(key))
        .is_ok()
}

pub fn is_diptote_with_genitive_fatha(segment: &Segment) -> bool {
    let ends_in_fatha = segment
        .letters
        .len()
        .checked_sub(1)
        .map_or(false, |last| segment.letters.is_fatha(last).unwrap_or(false));

    segment.features.case == Some(Case::Genitive)
        && ends_in_fatha
        && segment.features.number != Some(Number::Plural)
        && segment.lemma_key().map_or(false, is_diptote_lemma)
}

/// Running totals over a segmented corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeSerialize))]
pub struct CorpusStats {
    pub words: usize,
    pub segments: usize,
    pub prefixes: usize,
    pub stems: usize,
    pub suffixes: usize,
    pub pronoun_suffixes: usize,
    pub subject_pronouns: usize,
    pub suffix_elisions: usize,
    pub diptote_genitives: usize,
    pub emphatic_noon_with_tanween: usize,
}

impl CorpusStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, word: &LetterBuffer, segments: &[Segment]) {
        self.words += 1;
        self.segments += segments.len();

        for segment in segments {
            match segment.kind {
                SegmentKind::Prefix => self.prefixes += 1,
                SegmentKind::Stem => self.stems += 1,
                SegmentKind::Suffix => {
                    self.suffixes += 1;
                    if segment.pos == PartOfSpeech::Pronoun {
                        self.pronoun_suffixes += 1;
                    }
                }
            }
            if segment.features.pronoun_role == Some(PronounRole::Subject) {
                self.subject_pronouns += 1;
            }
            if is_suffix_elision(word, segment) {
                self.suffix_elisions += 1;
            }
            if is_emphatic_noon_with_tanween(segment) {
                self.emphatic_noon_with_tanween += 1;
            }
        }

        if stem_of(segments).map_or(false, is_diptote_with_genitive_fatha) {
            self.diptote_genitives += 1;
        }
    }

    pub fn merge(&mut self, other: &CorpusStats) {
        self.words += other.words;
        self.segments += other.segments;
        self.prefixes += other.prefixes;
        self.stems += other.stems;
        self.suffixes += other.suffixes;
        self.pronoun_suffixes += other.pronoun_suffixes;
        self.subject_pronouns += other.subject_pronouns;
        self.suffix_elisions += other.suffix_elisions;
        self.diptote_genitives += other.diptote_genitives;
        self.emphatic_noon_with_tanween += other.emphatic_noon_with_tanween;
    }
}

/// Expected totals for a regression run. Unset fields are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Baselines {
    pub words: Option<usize>,
    pub segments: Option<usize>,
    pub suffix_elisions: Option<usize>,
    pub diptote_genitives: Option<usize>,
    pub emphatic_noon_with_tanween: Option<usize>,
}

impl Baselines {
    /// Known totals for the complete Quran.
    pub const QURAN: Baselines = Baselines {
        words: None,
        segments: None,
        suffix_elisions: Some(225),
        diptote_genitives: Some(330),
        emphatic_noon_with_tanween: Some(2),
    };

    pub fn check(&self, stats: &CorpusStats) -> Result<(), MorphError> {
        let checks = [
            ("words", self.words, stats.words),
            ("segments", self.segments, stats.segments),
            ("suffix_elisions", self.suffix_elisions, stats.suffix_elisions),
            ("diptote_genitives", self.diptote_genitives, stats.diptote_genitives),
            (
                "emphatic_noon_with_tanween",
                self.emphatic_noon_with_tanween,
                stats.emphatic_noon_with_tanween,
            ),
        ];

        for (name, expected, actual) in checks {
            if let Some(expected) = expected {
                if expected != actual {
                    return Err(MorphError::BaselineMismatch {
                        name,
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use qac_protocol::{Diacritics, Features, Gender, Lemma, Slot, Span};

    fn buffer(slots: &[(Letter, Diacritics)]) -> LetterBuffer {
        LetterBuffer::from_slots(
            slots
                .iter()
                .map(|(letter, marks)| Slot::letter(*letter).with(*marks))
                .collect(),
        )
    }

    fn segment(
        kind: SegmentKind,
        pos: PartOfSpeech,
        word: &LetterBuffer,
        span: Span,
        features: Features,
        lemma: Option<&str>,
    ) -> Segment {
        Segment {
            kind,
            ordinal: 1,
            span,
            pos,
            features,
            lemma: lemma.map(|key| Lemma::new(key, LetterBuffer::empty())),
            letters: word.slice(span.start, span.end).unwrap(),
        }
    }

    fn first_person_object() -> Features {
        Features {
            person: Some(Person::First),
            number: Some(Number::Singular),
            pronoun_role: Some(PronounRole::Object),
            ..Features::default()
        }
    }

    #[test]
    fn test_diptote_table_is_sorted() {
        assert!(DIPTOTE_LEMMAS.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(is_diptote_lemma("<iboraAhiym"));
        assert!(is_diptote_lemma("yuwsuf"));
        assert!(!is_diptote_lemma("muwsaY"));
    }

    #[test]
    fn test_diptote_with_genitive_fatha() {
        // <iboraAhiyma
        let word = buffer(&[
            (Letter::Alif, Diacritics::HAMZA_BELOW | Diacritics::KASRA),
            (Letter::Ba, Diacritics::SUKUN),
            (Letter::Ra, Diacritics::FATHA),
            (Letter::Alif, Diacritics::empty()),
            (Letter::Ha, Diacritics::KASRA),
            (Letter::Ya, Diacritics::SUKUN),
            (Letter::Mim, Diacritics::FATHA),
        ]);
        let features = Features {
            case: Some(Case::Genitive),
            gender: Some(Gender::Masculine),
            ..Features::default()
        };
        let stem = segment(
            SegmentKind::Stem,
            PartOfSpeech::ProperNoun,
            &word,
            Span::new(0, 7),
            features.clone(),
            Some("<iboraAhiym"),
        );
        assert!(is_diptote_with_genitive_fatha(&stem));

        let nominative = Segment {
            features: Features {
                case: Some(Case::Nominative),
                ..features.clone()
            },
            ..stem.clone()
        };
        assert!(!is_diptote_with_genitive_fatha(&nominative));

        let other_lemma = Segment {
            lemma: Some(Lemma::new("muwsaY", LetterBuffer::empty())),
            ..stem
        };
        assert!(!is_diptote_with_genitive_fatha(&other_lemma));
    }

    #[test]
    fn test_empty_first_person_suffix_is_elision() {
        // qawomi + (ya)
        let word = buffer(&[
            (Letter::Qaf, Diacritics::FATHA),
            (Letter::Waw, Diacritics::SUKUN),
            (Letter::Mim, Diacritics::KASRA),
        ]);
        let suffix = segment(
            SegmentKind::Suffix,
            PartOfSpeech::Pronoun,
            &word,
            Span::new(3, 3),
            first_person_object(),
            None,
        );
        assert!(is_suffix_elision(&word, &suffix));

        // Object pronoun hidden in a shadda over alif maqsura is not elided.
        let word = buffer(&[
            (Letter::Ain, Diacritics::FATHA),
            (Letter::Lam, Diacritics::FATHA),
            (Letter::AlifMaqsura, Diacritics::SHADDA | Diacritics::FATHA),
        ]);
        let suffix = segment(
            SegmentKind::Suffix,
            PartOfSpeech::Pronoun,
            &word,
            Span::new(3, 3),
            first_person_object(),
            None,
        );
        assert!(!is_suffix_elision(&word, &suffix));
    }

    #[test]
    fn test_written_first_person_suffix() {
        // fa{t~aquwni: the nun of protection is written, the ya is not
        let word = buffer(&[
            (Letter::Waw, Diacritics::DAMMA),
            (Letter::Nun, Diacritics::KASRA),
        ]);
        let nun_only = segment(
            SegmentKind::Suffix,
            PartOfSpeech::Pronoun,
            &word,
            Span::new(1, 2),
            first_person_object(),
            None,
        );
        assert!(is_suffix_elision(&word, &nun_only));

        let word = buffer(&[
            (Letter::Nun, Diacritics::KASRA),
            (Letter::Ya, Diacritics::empty()),
        ]);
        let nun_ya = segment(
            SegmentKind::Suffix,
            PartOfSpeech::Pronoun,
            &word,
            Span::new(0, 2),
            first_person_object(),
            None,
        );
        assert!(!is_suffix_elision(&word, &nun_ya));

        let ya_only = segment(
            SegmentKind::Suffix,
            PartOfSpeech::Pronoun,
            &word,
            Span::new(1, 2),
            first_person_object(),
            None,
        );
        assert!(!is_suffix_elision(&word, &ya_only));

        let third_person = segment(
            SegmentKind::Suffix,
            PartOfSpeech::Pronoun,
            &word,
            Span::new(1, 2),
            Features {
                person: Some(Person::Third),
                ..first_person_object()
            },
            None,
        );
        assert!(!is_suffix_elision(&word, &third_person));
    }

    #[test]
    fn test_emphatic_noon_with_tanween() {
        let word = buffer(&[
            (Letter::Lam, Diacritics::FATHA),
            (Letter::Nun, Diacritics::FATHA),
            (Letter::Sin, Diacritics::SUKUN),
            (Letter::Fa, Diacritics::FATHA),
            (Letter::Ain, Diacritics::FATHATAN),
            (Letter::Alif, Diacritics::empty()),
        ]);
        let suffix = segment(
            SegmentKind::Suffix,
            PartOfSpeech::Emphatic,
            &word,
            Span::new(5, 6),
            Features::default(),
            Some("n"),
        );
        assert!(is_emphatic_noon_with_tanween(&suffix));

        let prefix = Segment {
            kind: SegmentKind::Prefix,
            ..suffix
        };
        assert!(!is_emphatic_noon_with_tanween(&prefix));
    }

    #[test]
    fn test_prefix_lookups_stop_at_stem() {
        let word = buffer(&[
            (Letter::Alif, Diacritics::HAMZA_ABOVE | Diacritics::FATHA),
            (Letter::Alif, Diacritics::HAMZAT_WASL),
            (Letter::Lam, Diacritics::SUKUN),
            (Letter::Kaf, Diacritics::FATHA),
        ]);
        let segments = vec![
            segment(
                SegmentKind::Prefix,
                PartOfSpeech::Interrogative,
                &word,
                Span::new(0, 1),
                Features::default(),
                None,
            ),
            segment(
                SegmentKind::Prefix,
                PartOfSpeech::Determiner,
                &word,
                Span::new(1, 3),
                Features::default(),
                None,
            ),
            segment(
                SegmentKind::Stem,
                PartOfSpeech::Noun,
                &word,
                Span::new(3, 4),
                Features::default(),
                None,
            ),
        ];
        assert!(is_interrogative_alif(&segments));
        assert!(is_determiner_al(&segments));
        assert_eq!(stem_of(&segments).map(|stem| stem.pos), Some(PartOfSpeech::Noun));
        assert!(!is_determiner_al(&segments[2..]));
    }

    #[test]
    fn test_baseline_mismatch_names_the_counter() {
        let stats = CorpusStats {
            suffix_elisions: 224,
            diptote_genitives: 330,
            emphatic_noon_with_tanween: 2,
            ..CorpusStats::default()
        };
        let err = Baselines::QURAN.check(&stats).unwrap_err();
        assert_eq!(
            err,
            MorphError::BaselineMismatch {
                name: "suffix_elisions",
                expected: 225,
                actual: 224
            }
        );
        assert_eq!(
            err.to_string(),
            "Baseline mismatch for suffix_elisions: expected 225, found 224"
        );
        assert!(Baselines::default().check(&stats).is_ok());
    }

    proptest! {
        #[test]
        fn test_stats_partition_segments(kinds in proptest::collection::vec(0u8..3, 1..8)) {
            let word = buffer(&vec![(Letter::Ba, Diacritics::FATHA); kinds.len()]);
            let segments: Vec<Segment> = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| {
                    let kind = match kind {
                        0 => SegmentKind::Prefix,
                        1 => SegmentKind::Stem,
                        _ => SegmentKind::Suffix,
                    };
                    segment(kind, PartOfSpeech::Noun, &word, Span::new(i, i + 1), Features::default(), None)
                })
                .collect();

            let mut stats = CorpusStats::new();
            stats.record(&word, &segments);

            prop_assert_eq!(stats.words, 1);
            prop_assert_eq!(stats.segments, segments.len());
            prop_assert_eq!(stats.prefixes + stats.stems + stats.suffixes, stats.segments);

            let mut doubled = stats;
            doubled.merge(&stats);
            prop_assert_eq!(doubled.segments, 2 * stats.segments);
        }
    }
}
