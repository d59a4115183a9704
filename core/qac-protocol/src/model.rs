use rkyv::{Archive, Deserialize, Serialize};
use crate::ids::Location;
use crate::letters::{LetterBuffer, Slot};
use crate::morphology::*;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Canonical lemma reference. Two lemmas are the same lemma when their keys
/// match; `letters` is the decoded form used for display and attribution.
#[derive(Debug, Clone)]
pub struct Lemma {
    pub key: String,
    pub letters: LetterBuffer,
}

impl Lemma {
    pub fn new(key: impl Into<String>, letters: LetterBuffer) -> Self {
        Self {
            key: key.into(),
            letters,
        }
    }
}

impl PartialEq for Lemma {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Lemma {}

/// Half-open letter range `[start, end)` within a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Independently optional grammatical features of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Features {
    pub person: Option<Person>,
    pub gender: Option<Gender>,
    pub number: Option<Number>,
    pub aspect: Option<Aspect>,
    pub mood: Option<Mood>,
    pub voice: Option<Voice>,
    pub form: Option<Form>,
    pub derivation: Option<Derivation>,
    pub state: Option<State>,
    pub case: Option<Case>,
    pub pronoun_role: Option<PronounRole>,
    pub special: Option<Special>,
    /// Root radicals, letters only in practice but kept as slots so hamza
    /// carriers survive a round trip.
    pub root: Option<Vec<Slot>>,
}

impl Features {
    pub fn pgn(&self) -> Pgn {
        Pgn::new(self.person, self.gender, self.number)
    }

    pub fn set_pgn(&mut self, pgn: Pgn) {
        self.person = pgn.person;
        self.gender = pgn.gender;
        self.number = pgn.number;
    }
}

/// One prefix, stem or suffix of a segmented word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// 1-based position among the word's segments.
    pub ordinal: usize,
    pub span: Span,
    pub pos: PartOfSpeech,
    pub features: Features,
    pub lemma: Option<Lemma>,
    /// View of the word's letters over `span`.
    pub letters: LetterBuffer,
}

impl Segment {
    pub fn is_stem(&self) -> bool {
        self.kind == SegmentKind::Stem
    }

    pub fn is_verb(&self) -> bool {
        self.is_stem() && self.pos == PartOfSpeech::Verb
    }

    pub fn lemma_key(&self) -> Option<&str> {
        self.lemma.as_ref().map(|lemma| lemma.key.as_str())
    }
}

// Compiled corpus format (rkyv)

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SegmentRecord {
    pub kind: SegmentKind,
    pub pos: PartOfSpeech,
    pub start: u16,
    pub end: u16,
    pub features: Features,
    pub lemma: Option<String>,
}

/// A span past the archive's `u16` letter offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanOverflow {
    pub span: Span,
}

impl fmt::Display for SpanOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "span {}..{} does not fit a u16 offset",
            self.span.start, self.span.end
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SpanOverflow {}

impl TryFrom<&Segment> for SegmentRecord {
    type Error = SpanOverflow;

    fn try_from(segment: &Segment) -> Result<Self, Self::Error> {
        let offset = |index: usize| {
            u16::try_from(index).map_err(|_| SpanOverflow { span: segment.span })
        };
        Ok(Self {
            kind: segment.kind,
            pos: segment.pos,
            start: offset(segment.span.start)?,
            end: offset(segment.span.end)?,
            features: segment.features.clone(),
            lemma: segment.lemma.as_ref().map(|lemma| lemma.key.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct WordRecord {
    pub location: Location,
    /// Buckwalter spelling of the word.
    pub word: String,
    /// Tag string the segments were read from.
    pub tags: String,
    pub segments: Vec<SegmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct CompiledCorpus {
    pub version: u32,
    pub words: Vec<WordRecord>,
}

impl CompiledCorpus {
    pub const VERSION: u32 = 1;
}
