//! Segmentation engine.
//!
//! Reconciles a word's tag atoms with its letters. Prefixes are consumed
//! left to right from the prefix cursor, suffixes right to left from the
//! suffix cursor, and whatever lies between belongs to the stem. Implicit
//! morphemes (subject pronouns, the second stem of a contraction) are found
//! afterwards from letter evidence alone.

use std::fmt;

use qac_protocol::{
    Features, Letter, LetterBuffer, Lemma, Location, PartOfSpeech, PronounRole, Segment,
    SegmentKind, Span,
};
use tracing::{debug, trace};

use crate::atoms::{
    apply_feature, parse_atoms, skeletons, PrefixRule, PrefixShape, Skeleton, TagAtom, UnknownAtom,
};
use crate::buckwalter;
use crate::error::{EncodingError, SegmentationError};
use crate::lexicon::{ClosedClassLemmas, Lexicon};
use crate::pronoun::{self, PronounError, PronounQuery};

/// Second stems of two-stem contractions, by lemma key, and the letters each
/// may end with.
static SECOND_STEMS: &[(&str, &[Letter])] = &[
    ("maA", &[Letter::Mim, Letter::Alif]),
    ("maA", &[Letter::Mim]),
    ("man", &[Letter::Mim, Letter::Nun]),
    ("laA", &[Letter::Lam, Letter::Alif]),
    ("lan", &[Letter::Lam, Letter::Nun]),
    ("law", &[Letter::Lam, Letter::Waw]),
    (">um~", &[Letter::Waw, Letter::Mim]),
];

/// Splits words into segments. One instance serves any number of words;
/// each call to [`Segmenter::segment`] is independent.
pub struct Segmenter<L> {
    lexicon: L,
    closed: ClosedClassLemmas,
}

impl<L: Lexicon> Segmenter<L> {
    pub fn new(lexicon: L) -> Result<Self, EncodingError> {
        let closed = ClosedClassLemmas::resolve(&lexicon)?;
        Ok(Self { lexicon, closed })
    }

    pub fn lexicon(&self) -> &L {
        &self.lexicon
    }

    /// Segments one word. Either every atom is reconciled with the letters
    /// and the full, contiguous segment list is returned, or nothing is.
    pub fn segment(
        &self,
        location: Location,
        word: &LetterBuffer,
        tags: &str,
    ) -> Result<Vec<Segment>, SegmentationError> {
        WordRun::new(self, location, word, tags).run()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    PrefixScan,
    StemOpen,
    SuffixScan,
    Done,
}

/// A segment under construction. Suffix starts are only known once the
/// suffix cursor reaches them.
#[derive(Debug, Clone)]
struct Draft {
    kind: SegmentKind,
    pos: PartOfSpeech,
    start: Option<usize>,
    end: usize,
    features: Features,
    lemma: Option<Lemma>,
}

impl Draft {
    fn new(kind: SegmentKind, pos: PartOfSpeech, start: Option<usize>, end: usize) -> Self {
        Self {
            kind,
            pos,
            start,
            end,
            features: Features::default(),
            lemma: None,
        }
    }

    /// Only an elided object pronoun may occupy no letters.
    fn may_be_empty(&self) -> bool {
        self.kind == SegmentKind::Suffix
            && self.pos == PartOfSpeech::Pronoun
            && matches!(
                self.features.pronoun_role,
                Some(PronounRole::Object | PronounRole::SecondObject)
            )
    }
}

/// State of one word's segmentation.
struct WordRun<'a, L> {
    segmenter: &'a Segmenter<L>,
    location: Location,
    word: &'a LetterBuffer,
    tags: &'a str,
    drafts: Vec<Draft>,
    phase: Phase,
    prefix_cursor: usize,
    suffix_cursor: usize,
    /// Most recently opened stem.
    stem: Option<usize>,
    emphatic: Option<usize>,
}

impl<'a, L: Lexicon> WordRun<'a, L> {
    fn new(segmenter: &'a Segmenter<L>, location: Location, word: &'a LetterBuffer, tags: &'a str) -> Self {
        // Trailing Quranic marks stay inside the last segment.
        let mut suffix_cursor = word.len();
        if suffix_cursor > 0 && !word.is_letter(suffix_cursor - 1).unwrap_or(false) {
            suffix_cursor -= 1;
        }

        Self {
            segmenter,
            location,
            word,
            tags,
            drafts: Vec::new(),
            phase: Phase::PrefixScan,
            prefix_cursor: 0,
            suffix_cursor,
            stem: None,
            emphatic: None,
        }
    }

    fn run(&mut self) -> Result<Vec<Segment>, SegmentationError> {
        if self.phase == Phase::Done {
            return Err(self.invariant("segmentation already ran for this word"));
        }
        let result = self.sweep();
        self.phase = Phase::Done;
        result
    }

    fn sweep(&mut self) -> Result<Vec<Segment>, SegmentationError> {
        let atoms = parse_atoms(self.tags).map_err(|UnknownAtom(atom)| self.parse_error(atom))?;
        for atom in &atoms {
            trace!("{}: {}", self.location, atom);
            self.consume(atom)?;
        }

        if let Some(index) = self.emphatic {
            self.emphatic_suffix(index)?;
        }
        self.subject_pronoun()?;
        self.split_stems()?;
        self.finish()
    }

    /// Opens the segments the atom names, then fixes the ranges it can.
    fn consume(&mut self, atom: &TagAtom<'_>) -> Result<(), SegmentationError> {
        let mut drafts = skeletons(atom, self.stem.is_some())
            .into_iter()
            .map(|skeleton| self.draft(skeleton))
            .collect::<Result<Vec<_>, _>>()?;
        if matches!(atom, TagAtom::Pronoun(_) | TagAtom::PronounPair(..)) {
            return self.object_pronouns(drafts, atom);
        }
        let Some(draft) = drafts.pop() else {
            return self.feature(atom);
        };

        match atom {
            TagAtom::Prefix(rule) if draft.kind == SegmentKind::Suffix => {
                self.preposition_suffix(rule.atom, draft)
            }
            TagAtom::Prefix(rule) => self.prefix(rule, draft),
            TagAtom::Stem(_) => self.open_stem(draft, atom),
            TagAtom::Vocative => self.vocative_suffix(draft, atom),
            TagAtom::EmphaticNun => self.emphatic_draft(draft, atom),
            _ => Err(self.parse_error(atom)),
        }
    }

    /// A draft with the skeleton's identity and no range yet.
    fn draft(&self, skeleton: Skeleton) -> Result<Draft, SegmentationError> {
        Ok(Draft {
            kind: skeleton.kind,
            pos: skeleton.pos,
            start: None,
            end: self.word.len(),
            features: skeleton.features,
            lemma: self.closed_lemma(skeleton.lemma)?,
        })
    }

    // Prefixes

    fn prefix(&mut self, rule: &PrefixRule, mut draft: Draft) -> Result<(), SegmentationError> {
        if self.phase != Phase::PrefixScan {
            return Err(self.parse_error(rule.atom));
        }

        let length = self
            .prefix_length(rule)
            .ok_or_else(|| self.alignment(rule.atom, self.prefix_cursor))?;
        draft.start = Some(self.prefix_cursor);
        self.prefix_cursor += length;
        draft.end = self.prefix_cursor;
        self.drafts.push(draft);
        Ok(())
    }

    /// Letters the prefix occupies at the prefix cursor, if they have the
    /// expected shape.
    fn prefix_length(&self, rule: &PrefixRule) -> Option<usize> {
        let cursor = self.prefix_cursor;
        let at = |offset: usize| self.letter(Some(cursor + offset));

        match rule.shape {
            PrefixShape::Letter(letters) => at(0).filter(|letter| letters.contains(letter)).map(|_| 1),
            PrefixShape::Vocative { letter, short_at } => {
                if at(0) != Some(letter) {
                    None
                } else if short_at.contains(&self.location) {
                    Some(1)
                } else {
                    (at(1) == Some(Letter::Alif)).then_some(2)
                }
            }
            PrefixShape::Determiner => {
                if self.letter(cursor.checked_sub(1)) == Some(Letter::Lam) {
                    (at(0) == Some(Letter::Lam)).then_some(1)
                } else if at(0) == Some(Letter::Alif) && at(1) == Some(Letter::Lam) {
                    Some(2)
                } else if at(0) == Some(Letter::Lam) && self.word.is_sukun(cursor).unwrap_or(false) {
                    Some(1)
                } else {
                    None
                }
            }
            PrefixShape::PrepositionLam => (at(0) == Some(Letter::Lam)).then_some(1),
        }
    }

    // Stems

    fn open_stem(&mut self, mut draft: Draft, atom: &TagAtom<'_>) -> Result<(), SegmentationError> {
        if self.phase == Phase::SuffixScan {
            return Err(self.parse_error(atom));
        }
        self.phase = Phase::StemOpen;
        self.stem = Some(self.drafts.len());
        draft.start = Some(self.prefix_cursor);
        self.drafts.push(draft);
        Ok(())
    }

    fn feature(&mut self, atom: &TagAtom<'_>) -> Result<(), SegmentationError> {
        let index = match self.stem {
            Some(index) if self.phase == Phase::StemOpen => index,
            _ => return Err(self.parse_error(atom)),
        };

        match atom {
            TagAtom::Root(root) => {
                let letters = buckwalter::decode(root).map_err(|_| self.parse_error(atom))?;
                self.drafts[index].features.root = Some(letters.as_slots().to_vec());
            }
            TagAtom::Lemma(key) => {
                let lemma = self
                    .segmenter
                    .lexicon
                    .lemma_for(key)
                    .map_err(|_| self.parse_error(atom))?;
                self.drafts[index].lemma = Some(lemma);
            }
            _ => {
                if !apply_feature(&mut self.drafts[index].features, atom) {
                    return Err(self.parse_error(atom));
                }
            }
        }
        Ok(())
    }

    // Suffixes

    fn push_suffix(&mut self, draft: Draft) -> usize {
        self.phase = Phase::SuffixScan;
        self.drafts.push(draft);
        self.drafts.len() - 1
    }

    /// Moves the suffix cursor left by `length`, which fixes where the
    /// suffix at `index` starts and where the segment before it ends.
    fn set_suffix_length(&mut self, index: usize, length: usize) -> Result<(), SegmentationError> {
        let cursor = self
            .suffix_cursor
            .checked_sub(length)
            .ok_or_else(|| self.invariant(format!("suffix of {length} letters passes the start of the word")))?;
        let previous = index
            .checked_sub(1)
            .ok_or_else(|| self.invariant("suffix without a preceding segment"))?;

        self.suffix_cursor = cursor;
        self.drafts[index].start = Some(cursor);
        self.drafts[previous].end = cursor;
        Ok(())
    }

    fn require_stem(&self, atom: &TagAtom<'_>) -> Result<usize, SegmentationError> {
        self.stem.ok_or_else(|| self.parse_error(atom))
    }

    fn preposition_suffix(&mut self, atom: &str, draft: Draft) -> Result<(), SegmentationError> {
        if self.letter_before_suffix() != Some(Letter::Lam) {
            return Err(self.alignment(atom, self.suffix_cursor));
        }
        let index = self.push_suffix(draft);
        self.set_suffix_length(index, 1)
    }

    fn vocative_suffix(&mut self, draft: Draft, atom: &TagAtom<'_>) -> Result<(), SegmentationError> {
        self.require_stem(atom)?;
        if self.letter_before_suffix() != Some(Letter::Mim) {
            return Err(self.alignment("+VOC", self.suffix_cursor));
        }
        let index = self.push_suffix(draft);
        self.set_suffix_length(index, 1)
    }

    /// The emphatic nun is placed now and measured after every other atom.
    fn emphatic_draft(&mut self, draft: Draft, atom: &TagAtom<'_>) -> Result<(), SegmentationError> {
        self.require_stem(atom)?;
        if self.emphatic.is_some() {
            return Err(self.parse_error(atom));
        }
        self.emphatic = Some(self.push_suffix(draft));
        Ok(())
    }

    fn emphatic_suffix(&mut self, index: usize) -> Result<(), SegmentationError> {
        // Alif where the nun is written as tanwin.
        if !matches!(self.letter_before_suffix(), Some(Letter::Nun | Letter::Alif)) {
            return Err(self.alignment("+n:EMPH", self.suffix_cursor));
        }
        self.set_suffix_length(index, 1)
    }

    /// Object pronouns, in tag order. Of a pair, the second object is
    /// written last, so it is measured first.
    fn object_pronouns(&mut self, drafts: Vec<Draft>, atom: &TagAtom<'_>) -> Result<(), SegmentationError> {
        let stem = self.require_stem(atom)?;
        let stem_pos = self.drafts[stem].pos;
        let double = drafts.len() == 2;

        let indices: Vec<usize> = drafts.into_iter().map(|draft| self.push_suffix(draft)).collect();
        for (position, index) in indices.into_iter().enumerate().rev() {
            self.object_pronoun(index, stem_pos, double && position == 0)?;
        }
        Ok(())
    }

    fn object_pronoun(
        &mut self,
        index: usize,
        stem_pos: PartOfSpeech,
        first_of_double: bool,
    ) -> Result<(), SegmentationError> {
        let pgn = self.drafts[index].features.pgn();
        let query = PronounQuery {
            first_of_double,
            emphatic: self.emphatic.is_some(),
            ..PronounQuery::object(pgn, stem_pos, self.location)
        };
        let length = self.resolve(&query)?;
        self.set_suffix_length(index, length)
    }

    /// Splices the subject pronoun implied by a verb stem in right after the
    /// stem.
    fn subject_pronoun(&mut self) -> Result<(), SegmentationError> {
        let has_emphatic = self
            .drafts
            .iter()
            .any(|draft| draft.kind == SegmentKind::Suffix && draft.pos == PartOfSpeech::Emphatic);
        if has_emphatic {
            return Ok(());
        }

        let Some(stem) = self.stem else {
            return Ok(());
        };
        let draft = &self.drafts[stem];
        let (PartOfSpeech::Verb, Some(aspect)) = (draft.pos, draft.features.aspect) else {
            return Ok(());
        };

        let pgn = draft.features.pgn();
        let query = PronounQuery {
            object_attached: self
                .drafts
                .last()
                .map_or(false, |last| last.pos == PartOfSpeech::Pronoun),
            ..PronounQuery::subject(aspect, pgn, draft.features.mood, self.location)
        };

        let length = self.resolve(&query)?;
        if length == 0 {
            return Ok(());
        }

        let start = self
            .suffix_cursor
            .checked_sub(length)
            .ok_or_else(|| self.invariant("subject pronoun passes the start of the word"))?;
        let end = self.drafts[stem].end;

        let mut pronoun = Draft::new(SegmentKind::Suffix, PartOfSpeech::Pronoun, Some(start), end);
        pronoun.features.set_pgn(pgn);
        pronoun.features.pronoun_role = Some(PronounRole::Subject);

        self.drafts[stem].end = start;
        self.drafts.insert(stem + 1, pronoun);
        self.suffix_cursor = start;

        debug!("{}: subject pronoun {} at {}..{}", self.location, pgn, start, end);
        Ok(())
    }

    /// Moves the boundary between the two stems of a contraction to where
    /// the second stem's letters begin.
    fn split_stems(&mut self) -> Result<(), SegmentationError> {
        let stems: Vec<usize> = self
            .drafts
            .iter()
            .enumerate()
            .filter(|(_, draft)| draft.kind == SegmentKind::Stem)
            .map(|(index, _)| index)
            .collect();

        let (first, second) = match stems.as_slice() {
            [_] => return Ok(()),
            [first, second] => (*first, *second),
            _ => return Err(self.parse_error(self.tags)),
        };

        let key = self.drafts[second]
            .lemma
            .as_ref()
            .map(|lemma| lemma.key.clone())
            .unwrap_or_default();
        let length = SECOND_STEMS
            .iter()
            .filter(|(lemma, _)| *lemma == key)
            .find(|(_, letters)| self.ends_with(letters))
            .map(|(_, letters)| letters.len())
            .ok_or_else(|| self.alignment(format!("second stem, LEM:{key}"), self.suffix_cursor))?;

        let boundary = self
            .suffix_cursor
            .checked_sub(length)
            .ok_or_else(|| self.invariant("second stem passes the start of the word"))?;
        self.suffix_cursor = boundary;
        self.drafts[first].end = boundary;
        self.drafts[second].start = Some(boundary);

        debug!("{}: second stem {} starts at {}", self.location, key, boundary);
        Ok(())
    }

    // Output

    /// Checks coverage and hands every segment its view of the word.
    /// Ordinals are assigned here, after any splice.
    fn finish(&mut self) -> Result<Vec<Segment>, SegmentationError> {
        let drafts = std::mem::take(&mut self.drafts);
        let mut segments = Vec::with_capacity(drafts.len());
        let mut position = 0;

        for (index, draft) in drafts.into_iter().enumerate() {
            let ordinal = index + 1;
            let start = draft
                .start
                .ok_or_else(|| self.invariant(format!("segment {ordinal} has no start")))?;
            if start != position {
                return Err(self.invariant(format!(
                    "segment {ordinal} starts at {start}, expected {position}"
                )));
            }
            if draft.end < start || (draft.end == start && !draft.may_be_empty()) {
                return Err(self.invariant(format!(
                    "segment {ordinal} has an empty range {start}..{}",
                    draft.end
                )));
            }

            let letters = self
                .word
                .slice(start, draft.end)
                .map_err(|err| SegmentationError::out_of_range(self.location, err))?;
            position = draft.end;

            segments.push(Segment {
                kind: draft.kind,
                ordinal,
                span: Span::new(start, draft.end),
                pos: draft.pos,
                features: draft.features,
                lemma: draft.lemma,
                letters,
            });
        }

        if position != self.word.len() {
            return Err(self.invariant(format!(
                "segments cover {position} of {} letters",
                self.word.len()
            )));
        }

        let stems: Vec<usize> = segments
            .iter()
            .filter(|segment| segment.is_stem())
            .map(|segment| segment.ordinal)
            .collect();
        match stems.as_slice() {
            [_] => {}
            [first, second] if *second == first + 1 => {}
            _ => return Err(self.invariant("stems must be one, or two adjacent")),
        }

        Ok(segments)
    }

    // Helpers

    fn letter(&self, index: Option<usize>) -> Option<Letter> {
        index.and_then(|index| self.word.letter_at(index).ok().flatten())
    }

    fn letter_before_suffix(&self) -> Option<Letter> {
        self.letter(self.suffix_cursor.checked_sub(1))
    }

    fn ends_with(&self, letters: &[Letter]) -> bool {
        let Some(start) = self.suffix_cursor.checked_sub(letters.len()) else {
            return false;
        };
        letters
            .iter()
            .enumerate()
            .all(|(offset, letter)| self.letter(Some(start + offset)) == Some(*letter))
    }

    fn closed_lemma(&self, key: Option<&str>) -> Result<Option<Lemma>, SegmentationError> {
        key.map(|key| {
            self.segmenter
                .closed
                .get(key)
                .cloned()
                .ok_or_else(|| self.invariant(format!("no lemma for closed-class key {key}")))
        })
        .transpose()
    }

    fn resolve(&self, query: &PronounQuery) -> Result<usize, SegmentationError> {
        pronoun::resolve(query, self.word, self.suffix_cursor).map_err(|err| match err {
            PronounError::Unmatched { feature } => self.alignment(feature, self.suffix_cursor),
            PronounError::OutOfRange(err) => SegmentationError::out_of_range(self.location, err),
        })
    }

    fn parse_error(&self, atom: impl fmt::Display) -> SegmentationError {
        SegmentationError::Parse {
            location: self.location,
            atom: atom.to_string(),
        }
    }

    fn alignment(&self, feature: impl Into<String>, cursor: usize) -> SegmentationError {
        SegmentationError::Alignment {
            location: self.location,
            word: buckwalter::encode(self.word),
            tags: self.tags.to_owned(),
            feature: feature.into(),
            cursor,
        }
    }

    fn invariant(&self, reason: impl Into<String>) -> SegmentationError {
        SegmentationError::InvariantViolation {
            location: self.location,
            reason: reason.into(),
        }
    }
}
