//! Pronoun suffix lengths.
//!
//! Object pronouns are spelled out in the tag string (`PRON:3MS`); subject
//! pronouns are implied by the person, gender and number of a verb stem.
//! Either way the number of letters the pronoun occupies is found by matching
//! literal letter patterns that end at the suffix cursor. Each paradigm is an
//! ordered rule list and the first rule that matches wins.

use qac_protocol::{
    Aspect, Diacritics, Gender, LetterBuffer, Letter, Location, Mood, Number, PartOfSpeech,
    Person, Pgn, RangeError,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Object,
    Subject(Aspect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LetterTest {
    Is(Letter),
    OneOf(&'static [Letter]),
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkTest {
    Any,
    With(Diacritics),
    Without(Diacritics),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Expect {
    letter: LetterTest,
    mark: MarkTest,
}

const fn is(letter: Letter) -> Expect {
    Expect {
        letter: LetterTest::Is(letter),
        mark: MarkTest::Any,
    }
}

const fn one_of(letters: &'static [Letter]) -> Expect {
    Expect {
        letter: LetterTest::OneOf(letters),
        mark: MarkTest::Any,
    }
}

const fn with(letter: Letter, marks: Diacritics) -> Expect {
    Expect {
        letter: LetterTest::Is(letter),
        mark: MarkTest::With(marks),
    }
}

const fn without(letter: Letter, marks: Diacritics) -> Expect {
    Expect {
        letter: LetterTest::Is(letter),
        mark: MarkTest::Without(marks),
    }
}

const fn any_with(marks: Diacritics) -> Expect {
    Expect {
        letter: LetterTest::Any,
        mark: MarkTest::With(marks),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    Always,
    FirstOfDouble,
    ObjectAttached,
    NotObjectAttached,
    Emphatic,
    NotEmphatic,
    StemAccusative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rule {
    guard: Guard,
    /// Letters ending at the cursor, leftmost first.
    expect: &'static [Expect],
    consume: usize,
}

const fn rule(expect: &'static [Expect], consume: usize) -> Rule {
    Rule {
        guard: Guard::Always,
        expect,
        consume,
    }
}

const fn when(guard: Guard, expect: &'static [Expect], consume: usize) -> Rule {
    Rule {
        guard,
        expect,
        consume,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StemFilter {
    Any,
    Verb,
    NonVerb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoodFilter {
    Any,
    /// Unmarked or indicative.
    Indicative,
    Is(Mood),
}

#[derive(Debug, Clone, Copy)]
struct Paradigm {
    table: Table,
    person: Person,
    /// `None` matches either gender.
    gender: Option<Gender>,
    number: Number,
    mood: MoodFilter,
    stem: StemFilter,
    feature: &'static str,
    rules: &'static [Rule],
}

const fn paradigm(
    table: Table,
    person: Person,
    gender: Option<Gender>,
    number: Number,
    feature: &'static str,
    rules: &'static [Rule],
) -> Paradigm {
    Paradigm {
        table,
        person,
        gender,
        number,
        mood: MoodFilter::Any,
        stem: StemFilter::Any,
        feature,
        rules,
    }
}

impl Paradigm {
    const fn for_stem(mut self, stem: StemFilter) -> Self {
        self.stem = stem;
        self
    }

    const fn for_mood(mut self, mood: MoodFilter) -> Self {
        self.mood = mood;
        self
    }

    fn applies(&self, query: &PronounQuery) -> bool {
        let pgn = query.pgn;
        let stem = match self.stem {
            StemFilter::Any => true,
            StemFilter::Verb => query.stem_pos == PartOfSpeech::Verb,
            StemFilter::NonVerb => query.stem_pos != PartOfSpeech::Verb,
        };
        let mood = match self.mood {
            MoodFilter::Any => true,
            MoodFilter::Indicative => matches!(query.mood, None | Some(Mood::Indicative)),
            MoodFilter::Is(mood) => query.mood == Some(mood),
        };
        self.table == query.table
            && pgn.person == Some(self.person)
            && pgn.number == Some(self.number)
            && self.gender.map_or(true, |gender| pgn.gender == Some(gender))
            && stem
            && mood
    }
}

use Gender::{Feminine as F, Masculine as M};
use Letter::*;
use Number::{Dual, Plural, Singular};
use Person::{First, Second, Third};

const SHADDA: Diacritics = Diacritics::SHADDA;

const OBJECT: Table = Table::Object;
const PERFECT: Table = Table::Subject(Aspect::Perfect);
const IMPERFECT: Table = Table::Subject(Aspect::Imperfect);
const IMPERATIVE: Table = Table::Subject(Aspect::Imperative);

const IMPERFECT_DUAL: &[Rule] = &[rule(&[is(Alif)], 1), rule(&[is(Alif), is(Nun)], 2)];

const IMPERFECT_PLURAL_INDICATIVE: &[Rule] = &[
    rule(&[is(Waw), is(Nun)], 2),
    rule(&[is(Waw), is(SmallWaw), is(Nun)], 3),
    when(Guard::ObjectAttached, &[is(Waw)], 1),
];

const IMPERFECT_PLURAL_SUBJUNCTIVE: &[Rule] = &[
    rule(&[is(Waw), is(Alif)], 2),
    rule(&[is(Waw), is(SmallWaw), is(Alif)], 2),
    when(Guard::ObjectAttached, &[is(Waw)], 1),
];

const IMPERFECT_PLURAL_JUSSIVE: &[Rule] = &[
    rule(&[is(Waw), is(Nun)], 2),
    rule(&[is(Waw), is(Alif)], 2),
    rule(&[is(Waw), is(SmallWaw), is(Alif)], 2),
    when(Guard::ObjectAttached, &[is(Waw)], 1),
];

const FEMININE_PLURAL_NUN: &[Rule] = &[rule(&[is(Nun)], 1)];

static PARADIGMS: &[Paradigm] = &[
    // Object pronouns.
    paradigm(OBJECT, First, None, Singular, "PRON:1S", &[
        when(Guard::FirstOfDouble, &[is(Nun), is(Ya)], 2),
        when(Guard::Emphatic, &[is(Nun), is(AlifMaqsura)], 1),
        when(Guard::NotEmphatic, &[is(Nun), is(AlifMaqsura)], 2),
        rule(&[is(Nun)], 1),
    ])
    .for_stem(StemFilter::Verb),
    paradigm(OBJECT, First, None, Singular, "PRON:1S", &[
        when(
            Guard::StemAccusative,
            &[without(Nun, SHADDA), without(AlifMaqsura, SHADDA)],
            2,
        ),
        rule(&[without(AlifMaqsura, SHADDA)], 1),
        // Only a kasra is written.
        rule(&[any_with(Diacritics::KASRA)], 0),
        rule(&[with(AlifMaqsura, SHADDA)], 0),
        rule(&[is(Ya), is(Ha)], 2),
    ])
    .for_stem(StemFilter::NonVerb),
    paradigm(OBJECT, First, None, Plural, "PRON:1P", &[
        rule(&[with(Nun, SHADDA), is(Alif)], 1),
        rule(&[is(Nun), is(Alif)], 2),
    ]),
    paradigm(OBJECT, Second, None, Dual, "PRON:2D", &[rule(&[is(Kaf), is(Mim), is(Alif)], 3)]),
    paradigm(OBJECT, Second, Some(M), Plural, "PRON:2MP", &[
        when(Guard::FirstOfDouble, &[is(Kaf), is(Mim), is(Waw)], 3),
        rule(&[is(Kaf), is(Mim)], 2),
    ]),
    paradigm(OBJECT, Second, Some(M), Singular, "PRON:2MS", &[rule(&[is(Kaf)], 1)]),
    paradigm(OBJECT, Second, Some(F), Singular, "PRON:2FS", &[rule(&[is(Kaf)], 1)]),
    paradigm(OBJECT, Second, Some(F), Plural, "PRON:2FP", &[rule(&[is(Kaf), is(Nun)], 2)]),
    paradigm(OBJECT, Third, None, Dual, "PRON:3D", &[rule(&[is(Ha), is(Mim), is(Alif)], 3)]),
    paradigm(OBJECT, Third, Some(M), Singular, "PRON:3MS", &[rule(&[is(Ha)], 1)]),
    paradigm(OBJECT, Third, Some(M), Plural, "PRON:3MP", &[rule(&[is(Ha), is(Mim)], 2)]),
    paradigm(OBJECT, Third, Some(F), Singular, "PRON:3FS", &[
        rule(&[is(Ha), is(Alif)], 2),
        rule(&[with(Ha, Diacritics::FATHA)], 1),
    ]),
    paradigm(OBJECT, Third, Some(F), Plural, "PRON:3FP", &[rule(&[is(Ha), is(Nun)], 2)]),
    // Perfect verbs.
    paradigm(PERFECT, First, None, Singular, "1S", &[rule(&[with(Ta, Diacritics::DAMMA)], 1)]),
    paradigm(PERFECT, First, None, Plural, "1P", &[rule(&[is(Nun), is(Alif)], 2)]),
    paradigm(PERFECT, Second, Some(M), Singular, "2MS", &[rule(&[with(Ta, Diacritics::FATHA)], 1)]),
    paradigm(PERFECT, Second, Some(F), Singular, "2FS", &[rule(&[with(Ta, Diacritics::KASRA)], 1)]),
    paradigm(PERFECT, Second, None, Dual, "2D", &[rule(&[is(Ta), is(Mim), is(Alif)], 3)]),
    paradigm(PERFECT, Second, Some(M), Plural, "2MP", &[
        when(Guard::ObjectAttached, &[is(Ta), is(Mim), is(Waw)], 3),
        when(Guard::NotObjectAttached, &[is(Ta), is(Mim)], 2),
    ]),
    paradigm(PERFECT, Second, Some(F), Plural, "2FP", &[rule(&[is(Ta), is(Nun)], 2)]),
    paradigm(PERFECT, Third, Some(M), Dual, "3MD", &[rule(&[is(Alif)], 1)]),
    paradigm(PERFECT, Third, Some(F), Dual, "3FD", &[rule(&[is(Ta), is(Alif)], 2)]),
    paradigm(PERFECT, Third, Some(M), Plural, "3MP", &[
        rule(&[is(Waw), is(Alif)], 2),
        rule(&[is(Waw)], 1),
    ]),
    paradigm(PERFECT, Third, Some(F), Plural, "3FP", FEMININE_PLURAL_NUN),
    // Imperfect verbs.
    paradigm(IMPERFECT, Second, None, Dual, "2D", IMPERFECT_DUAL),
    paradigm(IMPERFECT, Third, None, Dual, "3D", IMPERFECT_DUAL),
    paradigm(IMPERFECT, Second, Some(M), Plural, "2MP", IMPERFECT_PLURAL_INDICATIVE)
        .for_mood(MoodFilter::Indicative),
    paradigm(IMPERFECT, Third, Some(M), Plural, "3MP", IMPERFECT_PLURAL_INDICATIVE)
        .for_mood(MoodFilter::Indicative),
    paradigm(IMPERFECT, Second, Some(M), Plural, "2MP", IMPERFECT_PLURAL_SUBJUNCTIVE)
        .for_mood(MoodFilter::Is(Mood::Subjunctive)),
    paradigm(IMPERFECT, Third, Some(M), Plural, "3MP", IMPERFECT_PLURAL_SUBJUNCTIVE)
        .for_mood(MoodFilter::Is(Mood::Subjunctive)),
    paradigm(IMPERFECT, Second, Some(M), Plural, "2MP", IMPERFECT_PLURAL_JUSSIVE)
        .for_mood(MoodFilter::Is(Mood::Jussive)),
    paradigm(IMPERFECT, Third, Some(M), Plural, "3MP", IMPERFECT_PLURAL_JUSSIVE)
        .for_mood(MoodFilter::Is(Mood::Jussive)),
    paradigm(IMPERFECT, Third, Some(F), Plural, "3FP", FEMININE_PLURAL_NUN),
    paradigm(IMPERFECT, Second, Some(F), Plural, "2FP", FEMININE_PLURAL_NUN),
    // Imperative verbs.
    paradigm(IMPERATIVE, Second, None, Dual, "2D", &[rule(&[is(Alif)], 1)]),
    paradigm(IMPERATIVE, Second, Some(F), Singular, "2FS", &[
        rule(&[one_of(&[AlifMaqsura, Ya])], 1),
    ]),
    paradigm(IMPERATIVE, Second, Some(M), Plural, "2MP", &[
        rule(&[is(Waw), is(Alif)], 2),
        when(Guard::ObjectAttached, &[is(Waw)], 1),
        rule(&[is(SmallWaw), is(Alif)], 2),
        rule(&[is(Hamza), is(Waw)], 2),
    ]),
    paradigm(IMPERATIVE, Second, Some(F), Plural, "2FP", FEMININE_PLURAL_NUN),
];

/// Irregular spellings of otherwise regular pronouns, by word location.
struct LexicalException {
    location: Location,
    table: Table,
    pgn: Pgn,
    consume: usize,
}

const fn exception(location: Location, table: Table, pgn: Pgn, consume: usize) -> LexicalException {
    LexicalException {
        location,
        table,
        pgn,
        consume,
    }
}

const FIRST_SINGULAR: Pgn = Pgn::new(Some(First), None, Some(Singular));
const SECOND_MASCULINE_PLURAL: Pgn = Pgn::new(Some(Second), Some(M), Some(Plural));

static EXCEPTIONS: &[LexicalException] = &[
    // yabona&um~a
    exception(Location::new(20, 94, 2), OBJECT, FIRST_SINGULAR, 0),
    // >um~a
    exception(Location::new(7, 150, 25), OBJECT, FIRST_SINGULAR, 0),
    // halum~a
    exception(Location::new(6, 150, 2), IMPERATIVE, SECOND_MASCULINE_PLURAL, 0),
    exception(Location::new(33, 18, 8), IMPERATIVE, SECOND_MASCULINE_PLURAL, 0),
];

/// Everything the resolver needs to know about the pronoun being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PronounQuery {
    pub table: Table,
    /// The pronoun's own code for objects, the stem's for subjects.
    pub pgn: Pgn,
    pub mood: Option<Mood>,
    pub stem_pos: PartOfSpeech,
    /// Outer pronoun of a double-object pair.
    pub first_of_double: bool,
    /// An emphatic nun suffix has been seen.
    pub emphatic: bool,
    /// The word ends in an object pronoun.
    pub object_attached: bool,
    pub location: Location,
}

impl PronounQuery {
    pub fn object(pgn: Pgn, stem_pos: PartOfSpeech, location: Location) -> Self {
        Self {
            table: Table::Object,
            pgn,
            mood: None,
            stem_pos,
            first_of_double: false,
            emphatic: false,
            object_attached: false,
            location,
        }
    }

    pub fn subject(aspect: Aspect, pgn: Pgn, mood: Option<Mood>, location: Location) -> Self {
        Self {
            table: Table::Subject(aspect),
            pgn,
            mood,
            stem_pos: PartOfSpeech::Verb,
            first_of_double: false,
            emphatic: false,
            object_attached: false,
            location,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PronounError {
    #[error("no spelling of {feature} ends at the cursor")]
    Unmatched { feature: &'static str },

    #[error(transparent)]
    OutOfRange(#[from] RangeError),
}

/// Number of letters (0-3) the pronoun occupies immediately before `cursor`.
///
/// An object pronoun with no paradigm is unmatched; a subject with no
/// paradigm has no letters.
pub fn resolve(
    query: &PronounQuery,
    letters: &LetterBuffer,
    cursor: usize,
) -> Result<usize, PronounError> {
    if cursor > letters.len() {
        return Err(RangeError {
            index: cursor,
            length: letters.len(),
        }
        .into());
    }

    if let Some(exception) = EXCEPTIONS.iter().find(|exception| {
        exception.location == query.location
            && exception.table == query.table
            && exception.pgn == query.pgn
    }) {
        return Ok(exception.consume);
    }

    let Some(paradigm) = PARADIGMS.iter().find(|paradigm| paradigm.applies(query)) else {
        return match query.table {
            Table::Object => Err(PronounError::Unmatched { feature: "PRON" }),
            Table::Subject(_) => Ok(0),
        };
    };

    for rule in paradigm.rules {
        if guard_holds(rule.guard, query) && ends_with(letters, cursor, rule.expect)? {
            return Ok(rule.consume);
        }
    }

    Err(PronounError::Unmatched {
        feature: paradigm.feature,
    })
}

fn guard_holds(guard: Guard, query: &PronounQuery) -> bool {
    match guard {
        Guard::Always => true,
        Guard::FirstOfDouble => query.first_of_double,
        Guard::ObjectAttached => query.object_attached,
        Guard::NotObjectAttached => !query.object_attached,
        Guard::Emphatic => query.emphatic,
        Guard::NotEmphatic => !query.emphatic,
        Guard::StemAccusative => query.stem_pos == PartOfSpeech::Accusative,
    }
}

fn ends_with(letters: &LetterBuffer, cursor: usize, expect: &[Expect]) -> Result<bool, RangeError> {
    let Some(start) = cursor.checked_sub(expect.len()) else {
        return Ok(false);
    };

    for (offset, expect) in expect.iter().enumerate() {
        let index = start + offset;
        let letter_ok = match (expect.letter, letters.letter_at(index)?) {
            (LetterTest::Any, _) => true,
            (_, None) => false,
            (LetterTest::Is(wanted), Some(letter)) => letter == wanted,
            (LetterTest::OneOf(wanted), Some(letter)) => wanted.contains(&letter),
        };
        if !letter_ok {
            return Ok(false);
        }

        let marks = letters.diacritics_at(index)?;
        let mark_ok = match expect.mark {
            MarkTest::Any => true,
            MarkTest::With(flags) => marks.contains(flags),
            MarkTest::Without(flags) => !marks.intersects(flags),
        };
        if !mark_ok {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckwalter::decode;

    const HERE: Location = Location::new(1, 1, 1);

    fn pgn(code: &str) -> Pgn {
        Pgn::parse(code).unwrap()
    }

    fn object(code: &str, stem_pos: PartOfSpeech, word: &str) -> Result<usize, PronounError> {
        let letters = decode(word).unwrap();
        resolve(&PronounQuery::object(pgn(code), stem_pos, HERE), &letters, letters.len())
    }

    fn subject(aspect: Aspect, code: &str, mood: Option<Mood>, word: &str) -> Result<usize, PronounError> {
        let letters = decode(word).unwrap();
        resolve(&PronounQuery::subject(aspect, pgn(code), mood, HERE), &letters, letters.len())
    }

    fn unmatched(feature: &'static str) -> Result<usize, PronounError> {
        Err(PronounError::Unmatched { feature })
    }

    #[test]
    fn test_first_person_singular_object_on_verbs() {
        let letters = decode("xalaqaniY").unwrap();
        let mut query = PronounQuery::object(pgn("1S"), PartOfSpeech::Verb, HERE);
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(2));
        query.emphatic = true;
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(1));

        let letters = decode("xalaqaniy").unwrap();
        let mut query = PronounQuery::object(pgn("1S"), PartOfSpeech::Verb, HERE);
        assert_eq!(resolve(&query, &letters, letters.len()), unmatched("PRON:1S"));
        query.first_of_double = true;
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(2));

        assert_eq!(object("1S", PartOfSpeech::Verb, "yaHozununi"), Ok(1));
    }

    #[test]
    fn test_first_person_singular_object_on_nouns() {
        assert_eq!(object("1S", PartOfSpeech::Noun, "rab~iY"), Ok(1));
        assert_eq!(object("1S", PartOfSpeech::Accusative, "<in~aniY"), Ok(2));
        assert_eq!(object("1S", PartOfSpeech::Noun, "<in~aniY"), Ok(1));
        assert_eq!(object("1S", PartOfSpeech::Noun, "rab~i"), Ok(0));
        assert_eq!(object("1S", PartOfSpeech::Noun, "kitaAbiyah"), Ok(2));
        assert_eq!(object("1S", PartOfSpeech::Noun, ">um~a"), unmatched("PRON:1S"));
    }

    #[test]
    fn test_object_paradigms() {
        let cases = [
            ("1P", "rab~anaA", 2),
            ("1P", "<in~aA", 1),
            ("2D", "EalayokumaA", 3),
            ("2MP", "Ealayokum", 2),
            ("2MS", "rab~uka", 1),
            ("2FS", "rab~uki", 1),
            ("2FP", "Ealayokun~a", 2),
            ("3D", "lahumaA", 3),
            ("3MD", "lahumaA", 3),
            ("3MS", "lahu", 1),
            ("3MP", "lahum", 2),
            ("3FS", "lahaA", 2),
            ("3FS", "biha", 1),
            ("3FP", "lahun~a", 2),
        ];
        for (code, word, expected) in cases {
            assert_eq!(object(code, PartOfSpeech::Preposition, word), Ok(expected), "{code} {word}");
        }
    }

    #[test]
    fn test_second_masculine_plural_object_of_a_pair() {
        let letters = decode("Ealayokumuw").unwrap();
        let mut query = PronounQuery::object(pgn("2MP"), PartOfSpeech::Verb, HERE);
        assert_eq!(resolve(&query, &letters, letters.len()), unmatched("PRON:2MP"));
        query.first_of_double = true;
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(3));
    }

    #[test]
    fn test_object_without_paradigm() {
        assert_eq!(object("1", PartOfSpeech::Noun, "lahu"), unmatched("PRON"));
        assert_eq!(object("3MS", PartOfSpeech::Noun, "lahum"), unmatched("PRON:3MS"));
    }

    #[test]
    fn test_perfect_subjects() {
        let cases = [
            ("1S", "qulotu", 1),
            ("1P", "qulonaA", 2),
            ("2MS", "qulota", 1),
            ("2FS", "quloti", 1),
            ("2D", "qulotumaA", 3),
            ("2MP", "qulotum", 2),
            ("2FP", "qulotun~a", 2),
            ("3MD", "qaAlaA", 1),
            ("3FD", "qaAlataA", 2),
            ("3MP", "qaAluwA", 2),
            ("3MP", "qaAluw", 1),
            ("3FP", "qulona", 1),
            ("3MS", "qaAla", 0),
            ("3FS", "qaAlato", 0),
        ];
        for (code, word, expected) in cases {
            assert_eq!(subject(Aspect::Perfect, code, None, word), Ok(expected), "{code} {word}");
        }
        assert_eq!(subject(Aspect::Perfect, "1S", None, "qaAla"), unmatched("1S"));
    }

    #[test]
    fn test_perfect_subject_before_an_object() {
        let letters = decode("ra>ayotumuw").unwrap();
        let mut query = PronounQuery::subject(Aspect::Perfect, pgn("2MP"), None, HERE);
        assert_eq!(resolve(&query, &letters, letters.len()), unmatched("2MP"));
        query.object_attached = true;
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(3));
    }

    #[test]
    fn test_imperfect_subjects() {
        let subjunctive = Some(Mood::Subjunctive);
        let jussive = Some(Mood::Jussive);
        let indicative = Some(Mood::Indicative);
        let cases = [
            ("3D", None, "yaquwlaAni", 2),
            ("2D", jussive, "taquwlaA", 1),
            ("3MP", None, "yaquwluwna", 2),
            ("3MP", indicative, "yalowu,na", 3),
            ("2MP", subjunctive, "taquwluwA", 2),
            ("3MP", subjunctive, "yalowu,A", 2),
            ("3MP", jussive, "yaquwluwna", 2),
            ("3MP", jussive, "yaquwluwA", 2),
            ("3FP", None, "yaqulona", 1),
            ("2FP", None, "taqulona", 1),
            ("3MS", None, "yaquwlu", 0),
        ];
        for (code, mood, word, expected) in cases {
            assert_eq!(subject(Aspect::Imperfect, code, mood, word), Ok(expected), "{code} {word}");
        }
        assert_eq!(subject(Aspect::Imperfect, "3MP", subjunctive, "yaquwluwna"), unmatched("3MP"));
    }

    #[test]
    fn test_imperfect_plural_waw_needs_an_object() {
        let letters = decode("yaquwluw").unwrap();
        let mut query = PronounQuery::subject(Aspect::Imperfect, pgn("3MP"), None, HERE);
        assert_eq!(resolve(&query, &letters, letters.len()), unmatched("3MP"));
        query.object_attached = true;
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(1));
    }

    #[test]
    fn test_imperative_subjects() {
        let cases = [
            ("2D", "quwlaA", 1),
            ("2FS", "quwliY", 1),
            ("2FS", "quwliy", 1),
            ("2MP", "quwluwA", 2),
            ("2MP", "qu,A", 2),
            ("2MP", "jiy'uw", 2),
            ("2FP", "qulona", 1),
            ("2MS", "qul", 0),
        ];
        for (code, word, expected) in cases {
            assert_eq!(subject(Aspect::Imperative, code, None, word), Ok(expected), "{code} {word}");
        }
    }

    #[test]
    fn test_lexical_exceptions() {
        let letters = decode("halum~a").unwrap();
        let query = PronounQuery::subject(Aspect::Imperative, pgn("2MP"), None, Location::new(6, 150, 2));
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(0));
        let query = PronounQuery::subject(Aspect::Imperative, pgn("2MP"), None, HERE);
        assert_eq!(resolve(&query, &letters, letters.len()), unmatched("2MP"));

        let letters = decode(">um~a").unwrap();
        let query = PronounQuery::object(pgn("1S"), PartOfSpeech::Noun, Location::new(7, 150, 25));
        assert_eq!(resolve(&query, &letters, letters.len()), Ok(0));
    }

    #[test]
    fn test_short_words_and_bad_cursors() {
        let letters = decode("ka").unwrap();
        let query = PronounQuery::object(pgn("2D"), PartOfSpeech::Noun, HERE);
        assert_eq!(resolve(&query, &letters, 1), unmatched("PRON:2D"));
        assert_eq!(
            resolve(&query, &letters, 5),
            Err(PronounError::OutOfRange(RangeError { index: 5, length: 1 }))
        );
    }

    #[test]
    fn test_paradigms_do_not_overlap() {
        for (i, a) in PARADIGMS.iter().enumerate() {
            for b in &PARADIGMS[i + 1..] {
                let same = a.table == b.table
                    && a.person == b.person
                    && a.number == b.number
                    && a.gender == b.gender
                    && a.mood == b.mood
                    && a.stem == b.stem;
                assert!(!same, "{} is declared twice", a.feature);
            }
            assert!(!a.rules.is_empty());
            for rule in a.rules {
                assert!(rule.consume <= rule.expect.len() && rule.consume <= 3);
            }
        }
    }
}
